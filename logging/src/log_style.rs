// Copyright (c) 2021-2024 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

use crate::{get_from_env, GetFromEnvError};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LogStyle {
    Colored,
    Uncolored,
    #[default]
    Auto,
}

impl LogStyle {
    pub fn parse(str: &str) -> Result<LogStyle, LogStyleParseError> {
        let str = str.to_lowercase();
        match str.as_str() {
            "text" => Ok(LogStyle::Auto),
            "text-colored" => Ok(LogStyle::Colored),
            "text-uncolored" => Ok(LogStyle::Uncolored),
            _ => Err(LogStyleParseError::UnrecognizedFormat(str)),
        }
    }

    pub fn write_style(&self) -> env_logger::WriteStyle {
        match self {
            LogStyle::Colored => env_logger::WriteStyle::Always,
            LogStyle::Uncolored => env_logger::WriteStyle::Never,
            LogStyle::Auto => env_logger::WriteStyle::Auto,
        }
    }
}

pub fn get_log_style_from_env(env_var_name: &str) -> Result<Option<LogStyle>, LogStyleParseError> {
    get_from_env(env_var_name)?.map(|val| LogStyle::parse(&val)).transpose()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogStyleParseError {
    #[error("Unrecognized format: {0}")]
    UnrecognizedFormat(String),
    #[error("Env var error: {0}")]
    GetFromEnvError(#[from] GetFromEnvError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!(LogStyle::parse("text"), Ok(LogStyle::Auto));
        assert_eq!(LogStyle::parse("TEXT-Colored"), Ok(LogStyle::Colored));
        assert_eq!(LogStyle::parse("text-uncolored"), Ok(LogStyle::Uncolored));
        assert_eq!(
            LogStyle::parse("json"),
            Err(LogStyleParseError::UnrecognizedFormat("json".to_owned()))
        );
    }

    #[test]
    fn write_style_mapping() {
        assert_eq!(
            LogStyle::Uncolored.write_style(),
            env_logger::WriteStyle::Never
        );
        assert_eq!(LogStyle::default().write_style(), env_logger::WriteStyle::Auto);
    }
}
