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
    chain::BlockTimestamp,
    primitives::{BlockHeight, Compact},
    Uint256,
};

use crate::pow::error::ConsensusPoWError;

/// checks if retargeting is due for the provided block_height
pub fn due_for_retarget(difficulty_adjustment_interval: u64, block_height: BlockHeight) -> bool {
    block_height.is_multiple_of(difficulty_adjustment_interval)
}

/// The block time of the first block of the interval that ends with `block_index`,
/// i.e. of its ancestor `difficulty_adjustment_interval - 1` blocks back (off by one).
///
/// Panics if `block_index` is lower than that.
pub fn get_starting_block_time<H: BlockIndexHandle>(
    difficulty_adjustment_interval: u64,
    block_index: &BlockIndex,
    block_index_handle: &H,
) -> Result<BlockTimestamp, ConsensusPoWError> {
    let retarget_height = block_index
        .block_height()
        .checked_sub(difficulty_adjustment_interval - 1)
        .expect("retargeting below the first full interval");

    let retarget_block_index = block_index_handle
        .get_ancestor(block_index, retarget_height)
        .map_err(|err| {
            ConsensusPoWError::AncestorAtHeightNotFound(
                *block_index.block_id(),
                retarget_height,
                err,
            )
        })?;

    Ok(retarget_block_index.block_timestamp())
}

/// The time the last interval actually took, clamped to `target_timespan` divided or
/// multiplied by `max_factor`.
pub fn actual_timespan(
    last_block_time: BlockTimestamp,
    first_block_time: BlockTimestamp,
    target_timespan: u64,
    max_factor: u64,
) -> u64 {
    let elapsed = last_block_time.as_int_seconds().saturating_sub(first_block_time.as_int_seconds());
    // A negative span clamps to the lower bound like any other short one.
    let elapsed = u64::try_from(elapsed).unwrap_or(0);

    num::clamp(
        elapsed,
        target_timespan / max_factor,
        target_timespan.saturating_mul(max_factor),
    )
}

/// Returns a calculated new target as Compact datatype.
/// See Bitcoin's Protocol rules of [Difficulty change](https://en.bitcoin.it/wiki/Protocol_rules)
/// # Arguments
/// `actual_timespan_of_last_interval` - the clamped time the last interval took, in seconds.
/// `target_timespan` - found in the `PoWChainConfig`. This should be in seconds.
/// `old_target` - the `bits` of the last block. Sign and overflow flags are ignored.
/// `difficulty_limit` - found in the PoWChainConfig, as `limit`
pub fn calculate_new_target(
    actual_timespan_of_last_interval: u64,
    target_timespan: u64,
    old_target: Compact,
    difficulty_limit: Uint256,
) -> Compact {
    let new_target = old_target
        .decode_lossy()
        .mul_div_u64(actual_timespan_of_last_interval, target_timespan);

    Compact::from(std::cmp::min(new_target, difficulty_limit))
}

/// The parent of `block_index`, or `None` for genesis.
pub(crate) fn load_parent<H: BlockIndexHandle>(
    block_index: &BlockIndex,
    block_index_handle: &H,
) -> Result<Option<BlockIndex>, ConsensusPoWError> {
    block_index_handle
        .get_prev_block_index(block_index)
        .map_err(|err| ConsensusPoWError::ParentLoadError(*block_index.block_id(), err))
}

pub mod special_rules {
    use std::time::Duration;

    use super::*;

    /// Checks if it took more than two target spacings to find a block
    pub fn block_production_stalled(
        target_spacing: Duration,
        new_block_time: BlockTimestamp,
        prev_block_time: BlockTimestamp,
    ) -> bool {
        let allowed_gap = i128::from(target_spacing.as_secs()) * 2;
        i128::from(new_block_time.as_int_seconds())
            > i128::from(prev_block_time.as_int_seconds()) + allowed_gap
    }

    /// Return the bits of the last block that was not mined under the min difficulty rule.
    ///
    /// The walk stops at genesis, at a retarget boundary, or at the first block whose
    /// bits differ from `limit_bits`.
    pub fn last_non_special_min_difficulty<H: BlockIndexHandle>(
        block_index: &BlockIndex,
        difficulty_adjustment_interval: u64,
        limit_bits: Compact,
        block_index_handle: &H,
    ) -> Result<Compact, ConsensusPoWError> {
        let mut current = block_index.clone();
        loop {
            if due_for_retarget(difficulty_adjustment_interval, current.block_height())
                || current.bits() != limit_bits
            {
                return Ok(current.bits());
            }

            match load_parent(&current, block_index_handle)? {
                Some(parent) => current = parent,
                None => return Ok(current.bits()),
            }
        }
    }
}
