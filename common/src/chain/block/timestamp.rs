// Copyright (c) 2022 RBB S.r.l
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

use std::{fmt, time::Duration};

use parity_scale_codec::{Decode, Encode};

/// Block time in whole seconds since the unix epoch.
///
/// Signed, because retargeting subtracts timestamps of blocks whose
/// ordering is not guaranteed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct BlockTimestamp {
    timestamp: i64,
}

impl BlockTimestamp {
    pub const fn from_int_seconds(timestamp: i64) -> Self {
        Self { timestamp }
    }

    pub const fn as_int_seconds(&self) -> i64 {
        self.timestamp
    }

    pub fn add_int_seconds(&self, seconds: i64) -> Option<Self> {
        self.timestamp.checked_add(seconds).map(Self::from_int_seconds)
    }

    pub fn add_duration(&self, duration: Duration) -> Option<Self> {
        i64::try_from(duration.as_secs()).ok().and_then(|secs| self.add_int_seconds(secs))
    }
}

impl fmt::Display for BlockTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.timestamp.fmt(f)
    }
}
