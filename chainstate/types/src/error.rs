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

use thiserror::Error;

use common::{
    chain::Block,
    primitives::{BlockHeight, Id},
};

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum PropertyQueryError {
    #[error("Block index not found for block {0}")]
    BlockIndexNotFound(Id<Block>),
    #[error("Previous block index not found: {0}")]
    PrevBlockIndexNotFound(Id<Block>),
    #[error("Failed to get ancestor: {0}")]
    GetAncestorError(#[from] GetAncestorError),
}

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum GetAncestorError {
    #[error("Invalid ancestor height: sought ancestor with height {ancestor_height} for block with height {block_height}")]
    InvalidAncestorHeight {
        block_height: BlockHeight,
        ancestor_height: BlockHeight,
    },
    #[error("Previous block index not found {0}")]
    PrevBlockIndexNotFound(Id<Block>),
    #[error("Starting point in ancestor getter not found {0}")]
    StartingPointNotFound(Id<Block>),
}
