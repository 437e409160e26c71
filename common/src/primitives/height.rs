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

use std::{
    fmt,
    ops::{Add, Sub},
};

use parity_scale_codec::{Decode, Encode};

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Encode, Decode)]
pub struct BlockHeight(u64);

const ZERO: BlockHeight = BlockHeight(0);
const ONE: BlockHeight = BlockHeight(1);
const MAX: BlockHeight = BlockHeight(u64::MAX);

impl BlockHeight {
    pub const fn new(height: u64) -> BlockHeight {
        BlockHeight(height)
    }

    pub const fn zero() -> BlockHeight {
        ZERO
    }

    pub const fn one() -> BlockHeight {
        ONE
    }

    pub const fn max() -> BlockHeight {
        MAX
    }

    pub const fn into_int(self) -> u64 {
        self.0
    }

    pub fn next_height(&self) -> BlockHeight {
        self.checked_add(1).expect("Block height overflow")
    }

    pub fn prev_height(&self) -> Option<BlockHeight> {
        self.checked_sub(1)
    }

    pub fn checked_add(&self, rhs: u64) -> Option<Self> {
        self.0.checked_add(rhs).map(BlockHeight::new)
    }

    pub fn checked_sub(&self, rhs: u64) -> Option<Self> {
        self.0.checked_sub(rhs).map(BlockHeight::new)
    }

    /// Whether this height is a multiple of `interval`.
    pub fn is_multiple_of(&self, interval: u64) -> bool {
        self.0 % interval == 0
    }
}

impl From<u64> for BlockHeight {
    fn from(height: u64) -> Self {
        BlockHeight(height)
    }
}

impl From<BlockHeight> for u64 {
    fn from(height: BlockHeight) -> Self {
        height.0
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Add<u64> for BlockHeight {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        BlockHeight::new(self.0 + rhs)
    }
}

impl Sub<u64> for BlockHeight {
    type Output = Self;

    fn sub(self, rhs: u64) -> Self::Output {
        BlockHeight(self.0 - rhs)
    }
}
