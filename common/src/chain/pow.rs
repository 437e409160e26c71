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

use std::time::Duration;

use crate::chain::config::ChainType;
use crate::primitives::{BlockHeight, Compact};
use crate::Uint256;

/// Chain Parameters for Proof of Work.
///
/// See in Bitcoin's [chainparams.cpp](https://github.com/bitcoin/bitcoin/blob/eca694a4e78d54ce4e29b388b3e81b06e55c2293/src/chainparams.cpp)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoWChainConfig {
    no_retargeting: bool,
    /// Checks whether minimum difficulty can be used for the block
    allow_min_difficulty_blocks: bool,
    /// The lowest possible difficulty
    limit: Uint256,
    /// The lowest possible difficulty once GoldenRiver retargeting is active
    golden_river_limit: Uint256,
    /// The first block height retargeted per block
    golden_river_fork_height: BlockHeight,
    target_spacing: Duration,
    target_timespan: Duration,
}

impl PoWChainConfig {
    pub(crate) const fn new(chain_type: ChainType) -> Self {
        PoWChainConfig {
            no_retargeting: no_retargeting(chain_type),
            allow_min_difficulty_blocks: allow_min_difficulty_blocks(chain_type),
            limit: limit(chain_type),
            golden_river_limit: golden_river_limit(chain_type),
            golden_river_fork_height: golden_river_fork_height(chain_type),
            target_spacing: Duration::from_secs(2 * 60),
            target_timespan: Duration::from_secs(2 * 60 * 60),
        }
    }

    pub const fn no_retargeting(&self) -> bool {
        self.no_retargeting
    }

    pub const fn allow_min_difficulty_blocks(&self) -> bool {
        self.allow_min_difficulty_blocks
    }

    pub const fn limit(&self) -> Uint256 {
        self.limit
    }

    pub fn limit_compact(&self) -> Compact {
        Compact::from(self.limit)
    }

    pub const fn golden_river_limit(&self) -> Uint256 {
        self.golden_river_limit
    }

    pub fn golden_river_limit_compact(&self) -> Compact {
        Compact::from(self.golden_river_limit)
    }

    pub const fn golden_river_fork_height(&self) -> BlockHeight {
        self.golden_river_fork_height
    }

    /// The timespan that the classic retarget aims one adjustment interval to take.
    pub const fn target_timespan(&self) -> Duration {
        self.target_timespan
    }

    /// The expected time between two blocks under classic retargeting.
    pub const fn target_spacing(&self) -> Duration {
        self.target_spacing
    }

    /// A single classic retarget never changes the target by more than a factor of 4.
    /// See Bitcoin's [Target](https://en.bitcoin.it/wiki/Target) article.
    pub const fn max_retarget_factor(&self) -> u64 {
        4
    }

    /// Number of blocks between two classic retargets.
    ///
    /// Panics if the spacing is longer than the timespan; such a configuration can't be used.
    pub fn difficulty_adjustment_interval(&self) -> u64 {
        let interval = self
            .target_timespan
            .as_secs()
            .checked_div(self.target_spacing.as_secs())
            .expect("Target spacing must not be zero");
        assert!(interval > 0, "Difficulty adjustment interval must not be zero");
        interval
    }
}

macro_rules! builder_method {
    ($name:ident: $type:ty) => {
        #[doc = concat!("Set the `", stringify!($name), "` field.")]
        #[must_use = "PoWChainConfigBuilder dropped prematurely"]
        pub fn $name(mut self, $name: $type) -> Self {
            self.config.$name = $name;
            self
        }
    };
}

/// Builder for [`PoWChainConfig`], starting from the defaults of a chain type.
#[derive(Debug, Clone)]
pub struct PoWChainConfigBuilder {
    config: PoWChainConfig,
}

impl PoWChainConfigBuilder {
    pub fn new(chain_type: ChainType) -> Self {
        Self {
            config: PoWChainConfig::new(chain_type),
        }
    }

    pub fn from_config(config: PoWChainConfig) -> Self {
        Self { config }
    }

    builder_method!(no_retargeting: bool);
    builder_method!(allow_min_difficulty_blocks: bool);
    builder_method!(limit: Uint256);
    builder_method!(golden_river_limit: Uint256);
    builder_method!(golden_river_fork_height: BlockHeight);
    builder_method!(target_spacing: Duration);
    builder_method!(target_timespan: Duration);

    pub fn build(self) -> PoWChainConfig {
        self.config
    }
}

const fn no_retargeting(chain_type: ChainType) -> bool {
    match chain_type {
        ChainType::Mainnet | ChainType::Testnet => false,
        ChainType::Regtest => true,
    }
}

const fn allow_min_difficulty_blocks(chain_type: ChainType) -> bool {
    match chain_type {
        ChainType::Mainnet => false,
        ChainType::Testnet | ChainType::Regtest => true,
    }
}

pub(crate) const fn limit(chain_type: ChainType) -> Uint256 {
    match chain_type {
        ChainType::Mainnet | ChainType::Testnet => Uint256([
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0x00000FFFFFFFFFFF,
        ]),
        ChainType::Regtest => Uint256([
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0x7FFFFFFFFFFFFFFF,
        ]),
    }
}

pub(crate) const fn golden_river_limit(chain_type: ChainType) -> Uint256 {
    match chain_type {
        ChainType::Mainnet | ChainType::Testnet => Uint256([
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0x0000FFFFFFFFFFFF,
        ]),
        ChainType::Regtest => limit(ChainType::Regtest),
    }
}

const fn golden_river_fork_height(chain_type: ChainType) -> BlockHeight {
    match chain_type {
        ChainType::Mainnet => BlockHeight::new(245_000),
        ChainType::Testnet => BlockHeight::new(1_000),
        ChainType::Regtest => BlockHeight::new(1_000_000),
    }
}
