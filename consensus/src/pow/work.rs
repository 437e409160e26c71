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

use chainstate_types::{BlockIndex, BlockIndexHandle};
use common::{
    chain::{BlockHeader, BlockTimestamp, PoWChainConfig},
    primitives::{Compact, H256},
    Uint256,
};
use logging::log;

use crate::pow::{
    error::ConsensusPoWError,
    golden_river,
    helpers::{
        actual_timespan, calculate_new_target, due_for_retarget, get_starting_block_time,
        special_rules,
    },
    RetargetAlgorithm,
};

/// Whether `block_hash` meets the target encoded in `block_bits`.
///
/// Bits that are negative, overflow, zero or easier than the chain's limit are never met.
pub fn check_proof_of_work(
    block_hash: H256,
    block_bits: Compact,
    pow_config: &PoWChainConfig,
) -> bool {
    check_hash_against_target(block_hash, block_bits, pow_config.limit())
}

pub(crate) fn check_hash_against_target(
    block_hash: H256,
    block_bits: Compact,
    difficulty_limit: Uint256,
) -> bool {
    match Uint256::try_from(block_bits) {
        Ok(target) if target <= difficulty_limit => {
            let hash: Uint256 = block_hash.into();
            hash <= target
        }
        Ok(_) | Err(_) => false,
    }
}

/// The target the block following `prev_block_index` has to meet.
pub fn get_next_work_required<H: BlockIndexHandle>(
    pow_config: &PoWChainConfig,
    prev_block_index: &BlockIndex,
    candidate_header: &BlockHeader,
    block_index_handle: &H,
) -> Result<Compact, ConsensusPoWError> {
    let next_height = prev_block_index.block_height().next_height();
    let algorithm = RetargetAlgorithm::select(pow_config, next_height);
    log::trace!("Calculating work required at height {next_height} with {algorithm:?}");

    match algorithm {
        RetargetAlgorithm::GoldenRiverWarmUp => Ok(pow_config.golden_river_limit_compact()),
        RetargetAlgorithm::GoldenRiver => golden_river::next_work_required(
            prev_block_index,
            pow_config.golden_river_limit(),
            block_index_handle,
        ),
        RetargetAlgorithm::Classic => classic_work_required(
            pow_config,
            prev_block_index,
            candidate_header.timestamp(),
            block_index_handle,
        ),
    }
}

fn classic_work_required<H: BlockIndexHandle>(
    pow_config: &PoWChainConfig,
    prev_block_index: &BlockIndex,
    new_block_time: BlockTimestamp,
    block_index_handle: &H,
) -> Result<Compact, ConsensusPoWError> {
    let adjustment_interval = pow_config.difficulty_adjustment_interval();
    let next_height = prev_block_index.block_height().next_height();

    if due_for_retarget(adjustment_interval, next_height) {
        let retarget_block_time =
            get_starting_block_time(adjustment_interval, prev_block_index, block_index_handle)?;
        return Ok(calculate_next_work(
            pow_config,
            prev_block_index,
            retarget_block_time,
        ));
    }

    // special difficulty rules
    if pow_config.allow_min_difficulty_blocks() {
        return next_work_required_for_min_difficulty(
            pow_config,
            prev_block_index,
            new_block_time,
            block_index_handle,
        );
    }

    Ok(prev_block_index.bits())
}

/// Classic retargeting at the end of an interval that started at `first_block_time`
/// and ended with `last_block`.
pub fn calculate_next_work(
    pow_config: &PoWChainConfig,
    last_block: &BlockIndex,
    first_block_time: BlockTimestamp,
) -> Compact {
    if pow_config.no_retargeting() {
        return last_block.bits();
    }

    let target_timespan = pow_config.target_timespan().as_secs();
    let actual_timespan_of_last_interval = actual_timespan(
        last_block.block_timestamp(),
        first_block_time,
        target_timespan,
        pow_config.max_retarget_factor(),
    );

    calculate_new_target(
        actual_timespan_of_last_interval,
        target_timespan,
        last_block.bits(),
        pow_config.limit(),
    )
}

fn next_work_required_for_min_difficulty<H: BlockIndexHandle>(
    pow_config: &PoWChainConfig,
    prev_block_index: &BlockIndex,
    new_block_time: BlockTimestamp,
    block_index_handle: &H,
) -> Result<Compact, ConsensusPoWError> {
    // If the new block's timestamp is more than 2 * target spacing
    // then allow mining of a min-difficulty block.
    if special_rules::block_production_stalled(
        pow_config.target_spacing(),
        new_block_time,
        prev_block_index.block_timestamp(),
    ) {
        return Ok(pow_config.limit_compact());
    }

    // Return the last non-special-min-difficulty-rules-block
    special_rules::last_non_special_min_difficulty(
        prev_block_index,
        pow_config.difficulty_adjustment_interval(),
        pow_config.limit_compact(),
        block_index_handle,
    )
}
