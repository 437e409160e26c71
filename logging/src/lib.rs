// Copyright (c) 2022 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://spdx.org/licenses/MIT
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod log_style;

pub use log;

pub use log_style::{get_log_style_from_env, LogStyle, LogStyleParseError};

/// The environment variable that selects the log output style.
pub const LOG_STYLE_ENV_VAR_NAME: &str = "GOLDRIVER_LOG_STYLE";

static INITIALIZE_LOGGER_ONCE_FLAG: std::sync::Once = std::sync::Once::new();

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum GetFromEnvError {
    #[error("Env var {var_name}'s contents are not valid unicode: {data:?}")]
    NotUnicode { var_name: String, data: String },
}

/// Read an environment variable, treating "not present" as `None`.
pub fn get_from_env(var_name: &str) -> Result<Option<String>, GetFromEnvError> {
    match std::env::var(var_name) {
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(data)) => Err(GetFromEnvError::NotUnicode {
            var_name: var_name.to_owned(),
            data: data.to_string_lossy().into_owned(),
        }),
    }
}

/// Initialize the global logger. Only the first call has an effect.
///
/// The filter comes from `RUST_LOG`, as usual for `env_logger`; the output
/// coloring comes from [`LOG_STYLE_ENV_VAR_NAME`].
pub fn init_logging() {
    INITIALIZE_LOGGER_ONCE_FLAG.call_once(|| {
        let log_style = match get_log_style_from_env(LOG_STYLE_ENV_VAR_NAME) {
            Ok(style) => style.unwrap_or_default(),
            Err(err) => {
                eprintln!("Ignoring {LOG_STYLE_ENV_VAR_NAME}: {err}");
                LogStyle::default()
            }
        };

        let mut builder = env_logger::Builder::from_default_env();
        builder.write_style(log_style.write_style());
        // Another logger may already be installed by the embedding application.
        let _ = builder.try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_twice() {
        init_logging();
        init_logging();
        log::info!("logging initialized");
    }

    #[test]
    fn missing_env_var_is_none() {
        assert_eq!(
            get_from_env("GOLDRIVER_SURELY_UNDEFINED_ENV_VAR_FOR_TESTS"),
            Ok(None)
        );
    }
}
