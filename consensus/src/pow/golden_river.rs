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

//! GoldenRiver: per-block retargeting from the median block time.
//!
//! Every block after the warm-up window is retargeted from the gaps between the last
//! 60 and 120 block timestamps. The step is capped in both directions per block, and
//! over 60 and 240 blocks, so that a miner with a majority of the hash rate cannot
//! walk the difficulty to an arbitrary value.
//!
//! The algorithm has its own fixed spacing and timespan; the classic parameters of
//! the chain config don't apply to it.

use std::cmp::min;

use itertools::Itertools;
use logging::log;

use chainstate_types::{BlockIndex, BlockIndexHandle};
use common::{primitives::Compact, Uint256};

use crate::pow::{error::ConsensusPoWError, helpers::load_parent};

/// Two hours.
const TARGET_TIMESPAN: u64 = 2 * 60 * 60;
/// Two minutes.
const TARGET_SPACING: u64 = 2 * 60;
const INTERVAL: u64 = TARGET_TIMESPAN / TARGET_SPACING;

/// How many blocks back (from the previous block) the oldest sample is taken.
pub const WINDOW_DEPTH: u64 = 240;
const SHORT_SAMPLE: usize = 60;
const LONG_SAMPLE: usize = 120;
/// Position of the median among the short sample gaps, sorted from the longest.
const MEDIAN_POSITION: usize = 29;

/// Blocks found `DEADLOCK_SPAN` blocks apart in exactly `DEADLOCK_GAP` seconds.
const DEADLOCK_SPAN: usize = 5;
const DEADLOCK_GAP: u64 = 600;
/// Number of positions in the short sample compared for the deadlock pattern.
const DEADLOCK_CHECKS: usize = 54;

static_assertions::const_assert!(MEDIAN_POSITION < SHORT_SAMPLE - 1);
static_assertions::const_assert!(DEADLOCK_CHECKS + DEADLOCK_SPAN < SHORT_SAMPLE);
static_assertions::const_assert!(SHORT_SAMPLE <= LONG_SAMPLE);

/// Timestamps and targets sampled from the blocks before the one being retargeted.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockWindow {
    /// The newest `LONG_SAMPLE` timestamps, newest first. The first `SHORT_SAMPLE` of them
    /// form the short sample.
    timestamps: Vec<i64>,
    bits_60_ago: Compact,
    bits_240_ago: Compact,
}

impl BlockWindow {
    /// Walk `WINDOW_DEPTH` parents back from `last_block`. Once genesis is reached it is
    /// sampled again for every remaining step.
    fn collect<H: BlockIndexHandle>(
        last_block: &BlockIndex,
        block_index_handle: &H,
    ) -> Result<Self, ConsensusPoWError> {
        let mut timestamps = Vec::with_capacity(LONG_SAMPLE);
        let mut bits_60_ago = Compact(0);
        let mut bits_240_ago = Compact(0);

        let mut current = last_block.clone();
        for depth in 0..=WINDOW_DEPTH {
            if depth == SHORT_SAMPLE as u64 {
                bits_60_ago = current.bits();
            }
            if depth == WINDOW_DEPTH {
                bits_240_ago = current.bits();
            }
            if timestamps.len() < LONG_SAMPLE {
                timestamps.push(current.block_timestamp().as_int_seconds());
            }

            if depth < WINDOW_DEPTH {
                if let Some(parent) = load_parent(&current, block_index_handle)? {
                    current = parent;
                }
            }
        }

        Ok(Self {
            timestamps,
            bits_60_ago,
            bits_240_ago,
        })
    }

    fn short_sample(&self) -> &[i64] {
        &self.timestamps[..SHORT_SAMPLE]
    }
}

/// Calculate the target of the block following `last_block`.
pub fn next_work_required<H: BlockIndexHandle>(
    last_block: &BlockIndex,
    limit: Uint256,
    block_index_handle: &H,
) -> Result<Compact, ConsensusPoWError> {
    check_first_period(last_block, block_index_handle)?;

    let window = BlockWindow::collect(last_block, block_index_handle)?;
    Ok(retarget(&window, last_block.bits(), limit))
}

/// The full retarget period before `last_block` must be in storage. On the very first
/// retarget one block less is available.
///
/// Panics if `last_block` is lower than that period.
fn check_first_period<H: BlockIndexHandle>(
    last_block: &BlockIndex,
    block_index_handle: &H,
) -> Result<(), ConsensusPoWError> {
    let next_height = last_block.block_height().next_height();
    let blocks_to_go_back = if next_height.into_int() == INTERVAL {
        INTERVAL - 1
    } else {
        INTERVAL
    };
    let first_height = last_block
        .block_height()
        .checked_sub(blocks_to_go_back)
        .expect("GoldenRiver needs a full retarget period");

    block_index_handle
        .get_ancestor(last_block, first_height)
        .map_err(|err| {
            ConsensusPoWError::AncestorAtHeightNotFound(*last_block.block_id(), first_height, err)
        })?;

    Ok(())
}

fn retarget(window: &BlockWindow, last_bits: Compact, limit: Uint256) -> Compact {
    let long_gaps = window
        .timestamps
        .iter()
        .tuple_windows()
        .map(|(newer, older)| newer.abs_diff(*older))
        .collect_vec();
    let short_gaps = long_gaps[..SHORT_SAMPLE - 1]
        .iter()
        .copied()
        .sorted_unstable_by(|a, b| b.cmp(a))
        .collect_vec();

    let median = short_gaps[MEDIAN_POSITION];
    log::debug!("Median time between blocks is: {median}");

    let total = long_gaps.iter().fold(0u64, |total, gap| total.saturating_add(*gap));
    let average = total / long_gaps.len() as u64;
    log::debug!("Average time between blocks: {average}");

    let mut block_time = min(median, average);

    // Blocks have become very slow, allow a big difficulty fall.
    let half_adjust = average >= 180 && long_gaps[0] >= 1200 && long_gaps[1] >= 1200;
    if half_adjust {
        block_time = 240;
    }

    // Without this, blocks held at just above the target time by the caps below would
    // let the difficulty fall forever.
    if block_time >= TARGET_SPACING {
        if deadlock_detected(window.short_sample()) {
            log::debug!("Deadlock detected and fixed, difficulty increased");
            block_time = 119;
        } else {
            log::debug!("Deadlock not detected");
        }
    }

    let block_time = bounded_block_time(block_time, average, half_adjust);

    let last_target = last_bits.decode_lossy();
    let mut new_target = last_target.mul_div_u64(block_time * INTERVAL, TARGET_TIMESPAN);

    // At most 20% easier than the last block, unless halving.
    let floor = last_target.mul_div_u64(10, 8);
    if !half_adjust && new_target > floor {
        new_target = round_trip(floor);
    }

    // At most 2% harder than 60 blocks ago and 4 * 2% harder than 240 blocks ago.
    let ceilings = [
        window.bits_60_ago.decode_lossy().mul_div_u64(100, 102),
        window.bits_240_ago.decode_lossy().mul_div_u64(100, 408),
    ];
    for ceiling in ceilings {
        if new_target < ceiling {
            new_target = round_trip(ceiling);
        }
    }

    Compact::from(min(new_target, limit))
}

/// Any two blocks five apart in the short sample that were found exactly ten minutes apart.
fn deadlock_detected(short_sample: &[i64]) -> bool {
    let len = short_sample.len();
    (1..=DEADLOCK_CHECKS).any(|index| {
        short_sample[len - index].abs_diff(short_sample[len - index - DEADLOCK_SPAN])
            == DEADLOCK_GAP
    })
}

/// Limit the per block change: at most 2% harder, and either 120/119 or (when halving)
/// 142/100 easier.
fn bounded_block_time(block_time: u64, average: u64, half_adjust: bool) -> u64 {
    if average > 216 || block_time > 122 {
        if half_adjust {
            170
        } else {
            121
        }
    } else if average < 117 || block_time < 117 {
        117
    } else {
        block_time
    }
}

fn round_trip(target: Uint256) -> Uint256 {
    Compact::from(target).decode_lossy()
}
