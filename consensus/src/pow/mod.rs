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

mod error;
mod golden_river;
pub mod helpers;
mod work;

use chainstate_types::BlockIndexHandle;
use common::{
    chain::{BlockHeader, PoWChainConfig},
    primitives::{id::Idable, BlockHeight},
    Uint256,
};

pub use self::{
    error::ConsensusPoWError,
    work::{calculate_next_work, check_proof_of_work, get_next_work_required},
};

/// The retargeting rule that applies at a given block height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetargetAlgorithm {
    /// Retarget once per difficulty adjustment interval, before the GoldenRiver fork.
    Classic,
    /// The first blocks after the fork, up to and including `fork height + 240`, all get
    /// the GoldenRiver limit while the sampling window fills up.
    GoldenRiverWarmUp,
    /// Retarget every block.
    GoldenRiver,
}

impl RetargetAlgorithm {
    pub fn select(pow_config: &PoWChainConfig, next_height: BlockHeight) -> Self {
        let fork_height = pow_config.golden_river_fork_height();
        if next_height < fork_height {
            return Self::Classic;
        }

        match fork_height.checked_add(golden_river::WINDOW_DEPTH) {
            Some(warm_up_end) if next_height > warm_up_end => Self::GoldenRiver,
            _ => Self::GoldenRiverWarmUp,
        }
    }

    /// The easiest target a block retargeted by this algorithm may have.
    pub fn difficulty_limit(&self, pow_config: &PoWChainConfig) -> Uint256 {
        match self {
            Self::Classic => pow_config.limit(),
            Self::GoldenRiverWarmUp | Self::GoldenRiver => pow_config.golden_river_limit(),
        }
    }
}

/// Check that `header` carries the target required after its previous block and meets it.
pub fn check_pow_consensus<H: BlockIndexHandle>(
    pow_config: &PoWChainConfig,
    header: &BlockHeader,
    block_index_handle: &H,
) -> Result<(), ConsensusPoWError> {
    let block_id = header.get_id();
    let prev_block_id =
        *header.prev_block_id().ok_or(ConsensusPoWError::NoPrevBlock(block_id))?;

    let prev_block_index = block_index_handle
        .get_block_index(&prev_block_id)
        .map_err(|err| ConsensusPoWError::PrevBlockLoadError(prev_block_id, block_id, err))?
        .ok_or(ConsensusPoWError::PrevBlockNotFound(prev_block_id, block_id))?;

    let work_required =
        get_next_work_required(pow_config, &prev_block_index, header, block_index_handle)?;
    if header.bits() != work_required {
        return Err(ConsensusPoWError::InvalidTargetBits(
            header.bits(),
            work_required,
        ));
    }

    let algorithm =
        RetargetAlgorithm::select(pow_config, prev_block_index.block_height().next_height());
    let difficulty_limit = algorithm.difficulty_limit(pow_config);
    if !work::check_hash_against_target(block_id.to_hash(), header.bits(), difficulty_limit) {
        return Err(ConsensusPoWError::InvalidPoW(block_id));
    }

    Ok(())
}
