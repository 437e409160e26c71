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

use common::{chain::Block, primitives::BlockHeight, primitives::Id};

use crate::{BlockIndex, PropertyQueryError};

/// Read access to block indexes, implemented by chain storage.
///
/// Implementations must be safe for concurrent reads if consensus checks
/// are run from several threads.
pub trait BlockIndexHandle {
    /// Get block index for given block ID
    fn get_block_index(&self, block_id: &Id<Block>)
        -> Result<Option<BlockIndex>, PropertyQueryError>;

    /// Get the ancestor of `block_index` at `ancestor_height`, which must not exceed the
    /// height of `block_index` itself.
    fn get_ancestor(
        &self,
        block_index: &BlockIndex,
        ancestor_height: BlockHeight,
    ) -> Result<BlockIndex, PropertyQueryError>;

    /// Get the parent of `block_index`, or `None` for genesis
    fn get_prev_block_index(
        &self,
        block_index: &BlockIndex,
    ) -> Result<Option<BlockIndex>, PropertyQueryError> {
        match block_index.prev_block_id() {
            None => Ok(None),
            Some(prev_block_id) => self
                .get_block_index(prev_block_id)?
                .ok_or(PropertyQueryError::PrevBlockIndexNotFound(*prev_block_id))
                .map(Some),
        }
    }
}
