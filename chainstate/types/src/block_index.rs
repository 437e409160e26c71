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

use common::chain::block::timestamp::BlockTimestamp;
use common::chain::{Block, BlockHeader};
use common::primitives::{id::Idable, BlockHeight, Compact, Id};
use parity_scale_codec::{Decode, Encode};

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct BlockIndex {
    block_id: Id<Block>,
    block_header: BlockHeader,
    height: BlockHeight,
}

impl BlockIndex {
    pub fn new(block_header: BlockHeader, height: BlockHeight) -> Self {
        Self {
            block_id: block_header.get_id(),
            block_header,
            height,
        }
    }

    pub fn block_id(&self) -> &Id<Block> {
        &self.block_id
    }

    /// `None` for the genesis block.
    pub fn prev_block_id(&self) -> Option<&Id<Block>> {
        self.block_header.prev_block_id()
    }

    pub fn block_timestamp(&self) -> BlockTimestamp {
        self.block_header.timestamp()
    }

    pub fn bits(&self) -> Compact {
        self.block_header.bits()
    }

    pub fn block_height(&self) -> BlockHeight {
        self.height
    }

    pub fn block_header(&self) -> &BlockHeader {
        &self.block_header
    }
}
