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

//! An in-memory block tree.
//!
//! Block indexes live in a vector and refer to their parent by position, so
//! walking towards genesis is a chain of index lookups. Blocks are never
//! removed, which keeps every stored position valid.

use std::collections::BTreeMap;

use thiserror::Error;

use common::{
    chain::{Block, BlockHeader},
    primitives::{id::Idable, BlockHeight, Id},
};

use crate::{BlockIndex, BlockIndexHandle, GetAncestorError, PropertyQueryError};

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ArenaError {
    #[error("Block {0} is already in the tree")]
    DuplicateBlock(Id<Block>),
    #[error("Parent {parent} of block {block} is not in the tree")]
    OrphanBlock { block: Id<Block>, parent: Id<Block> },
    #[error("The tree already has a genesis block {0}")]
    SecondGenesis(Id<Block>),
}

#[derive(Debug)]
struct Entry {
    block_index: BlockIndex,
    parent: Option<usize>,
}

#[derive(Debug, Default)]
pub struct BlockIndexArena {
    entries: Vec<Entry>,
    positions: BTreeMap<Id<Block>, usize>,
}

impl BlockIndexArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn genesis(&self) -> Option<&BlockIndex> {
        self.entries.first().map(|entry| &entry.block_index)
    }

    pub fn get(&self, block_id: &Id<Block>) -> Option<&BlockIndex> {
        self.positions.get(block_id).map(|pos| &self.entries[*pos].block_index)
    }

    /// Add a header whose parent is already in the tree (or a genesis header to an empty tree).
    /// The height is derived from the parent.
    pub fn insert(&mut self, header: BlockHeader) -> Result<&BlockIndex, ArenaError> {
        let (parent, height) = match header.prev_block_id() {
            None => {
                if let Some(genesis) = self.genesis() {
                    return Err(ArenaError::SecondGenesis(*genesis.block_id()));
                }
                (None, BlockHeight::zero())
            }
            Some(prev_block_id) => {
                let parent_pos = self.positions.get(prev_block_id).copied().ok_or_else(|| {
                    ArenaError::OrphanBlock {
                        block: header.get_id(),
                        parent: *prev_block_id,
                    }
                })?;
                let parent_height = self.entries[parent_pos].block_index.block_height();
                (Some(parent_pos), parent_height.next_height())
            }
        };

        let block_index = BlockIndex::new(header, height);
        let block_id = *block_index.block_id();
        if self.positions.contains_key(&block_id) {
            return Err(ArenaError::DuplicateBlock(block_id));
        }

        let pos = self.entries.len();
        self.entries.push(Entry {
            block_index,
            parent,
        });
        self.positions.insert(block_id, pos);

        Ok(&self.entries[pos].block_index)
    }

    fn ancestor_position(
        &self,
        block_index: &BlockIndex,
        ancestor_height: BlockHeight,
    ) -> Result<usize, GetAncestorError> {
        if ancestor_height > block_index.block_height() {
            return Err(GetAncestorError::InvalidAncestorHeight {
                block_height: block_index.block_height(),
                ancestor_height,
            });
        }

        let mut pos = *self
            .positions
            .get(block_index.block_id())
            .ok_or(GetAncestorError::StartingPointNotFound(*block_index.block_id()))?;

        while self.entries[pos].block_index.block_height() > ancestor_height {
            let entry = &self.entries[pos];
            pos = entry.parent.ok_or_else(|| {
                GetAncestorError::PrevBlockIndexNotFound(*entry.block_index.block_id())
            })?;
        }

        Ok(pos)
    }
}

impl BlockIndexHandle for BlockIndexArena {
    fn get_block_index(
        &self,
        block_id: &Id<Block>,
    ) -> Result<Option<BlockIndex>, PropertyQueryError> {
        Ok(self.get(block_id).cloned())
    }

    fn get_ancestor(
        &self,
        block_index: &BlockIndex,
        ancestor_height: BlockHeight,
    ) -> Result<BlockIndex, PropertyQueryError> {
        let pos = self.ancestor_position(block_index, ancestor_height)?;
        Ok(self.entries[pos].block_index.clone())
    }
}
