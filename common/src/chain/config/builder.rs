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

use crate::chain::{
    config::{ChainConfig, ChainType},
    pow::{PoWChainConfig, PoWChainConfigBuilder},
};

/// Builder for [`ChainConfig`], with the given chain type as a basis.
#[derive(Debug, Clone)]
pub struct Builder {
    chain_type: ChainType,
    pow_chain_config: PoWChainConfig,
}

impl Builder {
    /// A new chain config builder, with given chain type as a basis
    pub fn new(chain_type: ChainType) -> Self {
        Self {
            chain_type,
            pow_chain_config: PoWChainConfigBuilder::new(chain_type).build(),
        }
    }

    /// Tweak the proof-of-work parameters, starting from the current ones.
    #[must_use = "chain::config::Builder dropped prematurely"]
    pub fn pow_chain_config_with(
        mut self,
        f: impl FnOnce(PoWChainConfigBuilder) -> PoWChainConfigBuilder,
    ) -> Self {
        let builder = PoWChainConfigBuilder::from_config(self.pow_chain_config);
        self.pow_chain_config = f(builder).build();
        self
    }

    pub fn build(self) -> ChainConfig {
        let Self {
            chain_type,
            pow_chain_config,
        } = self;

        ChainConfig {
            chain_type,
            pow_chain_config,
        }
    }
}

macro_rules! builder_method {
    ($name:ident: $type:ty) => {
        #[doc = concat!("Set the `", stringify!($name), "` field.")]
        #[must_use = "chain::config::Builder dropped prematurely"]
        pub fn $name(mut self, $name: $type) -> Self {
            self.$name = $name;
            self
        }
    };
}

impl Builder {
    builder_method!(chain_type: ChainType);
    builder_method!(pow_chain_config: PoWChainConfig);
}

#[cfg(test)]
mod tests {
    use crate::primitives::BlockHeight;

    use super::*;

    #[test]
    fn pow_overrides_keep_the_rest() {
        let config = Builder::new(ChainType::Mainnet)
            .pow_chain_config_with(|pow| pow.golden_river_fork_height(BlockHeight::new(500)))
            .build();

        let pow = config.pow_chain_config();
        assert_eq!(pow.golden_river_fork_height(), BlockHeight::new(500));
        assert_eq!(pow.limit(), crate::chain::pow::limit(ChainType::Mainnet));
        assert!(!pow.allow_min_difficulty_blocks());
    }
}
