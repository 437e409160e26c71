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

mod builder;

use crate::chain::pow::PoWChainConfig;

pub use builder::Builder;

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum ChainType {
    Mainnet,
    Testnet,
    Regtest,
}

impl ChainType {
    pub const fn name(&self) -> &'static str {
        match self {
            ChainType::Mainnet => "mainnet",
            ChainType::Testnet => "testnet",
            ChainType::Regtest => "regtest",
        }
    }
}

/// Parameters of a chain, as far as block validation is concerned.
///
/// Built once per process and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    chain_type: ChainType,
    pow_chain_config: PoWChainConfig,
}

impl ChainConfig {
    pub fn chain_type(&self) -> &ChainType {
        &self.chain_type
    }

    pub fn pow_chain_config(&self) -> &PoWChainConfig {
        &self.pow_chain_config
    }
}

pub fn create_mainnet() -> ChainConfig {
    Builder::new(ChainType::Mainnet).build()
}

pub fn create_testnet() -> ChainConfig {
    Builder::new(ChainType::Testnet).build()
}

pub fn create_regtest() -> ChainConfig {
    Builder::new(ChainType::Regtest).build()
}
