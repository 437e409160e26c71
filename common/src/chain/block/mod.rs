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

pub mod timestamp;

use blake2::{
    digest::{consts::U32, typenum::Unsigned, OutputSizeUser},
    Blake2b, Digest,
};
use parity_scale_codec::{Decode, Encode};

use crate::primitives::{id::Idable, Compact, Id, H256};

use self::timestamp::BlockTimestamp;

type Blake2b256 = Blake2b<U32>;

/// Tag type for block ids. Block bodies are handled elsewhere.
#[derive(Debug)]
pub enum Block {}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct BlockHeader {
    version: u32,
    /// `None` only for the genesis block.
    prev_block_id: Option<Id<Block>>,
    merkle_root: H256,
    timestamp: BlockTimestamp,
    bits: Compact,
    nonce: u32,
}

impl BlockHeader {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(
        prev_block_id: Option<Id<Block>>,
        merkle_root: H256,
        timestamp: BlockTimestamp,
        bits: Compact,
        nonce: u32,
    ) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            prev_block_id,
            merkle_root,
            timestamp,
            bits,
            nonce,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn prev_block_id(&self) -> Option<&Id<Block>> {
        self.prev_block_id.as_ref()
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_block_id.is_none()
    }

    pub fn merkle_root(&self) -> &H256 {
        &self.merkle_root
    }

    pub fn timestamp(&self) -> BlockTimestamp {
        self.timestamp
    }

    pub fn bits(&self) -> Compact {
        self.bits
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.nonce = nonce;
        self
    }
}

impl Idable for BlockHeader {
    type Tag = Block;

    /// BLAKE2b-256 of the SCALE-encoded header.
    fn get_id(&self) -> Id<Block> {
        static_assertions::const_assert_eq!(
            <<Blake2b256 as OutputSizeUser>::OutputSize as Unsigned>::USIZE,
            H256::len_bytes()
        );

        let digest = Blake2b256::digest(self.encode());
        Id::new(H256::from_slice(digest.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(nonce: u32) -> BlockHeader {
        BlockHeader::new(
            Some(Id::new(H256::repeat_byte(0x11))),
            H256::zero(),
            BlockTimestamp::from_int_seconds(1_600_000_000),
            Compact(0x1e0f_fff0),
            nonce,
        )
    }

    #[test]
    fn id_depends_on_every_field() {
        let h = header(0);
        assert_eq!(h.get_id(), header(0).get_id());
        assert_ne!(h.get_id(), header(1).get_id());
        assert_ne!(
            h.get_id(),
            BlockHeader::new(None, H256::zero(), h.timestamp(), h.bits(), 0).get_id()
        );
    }

    #[test]
    fn encoding_round_trip() {
        let h = header(42);
        let decoded = BlockHeader::decode(&mut h.encode().as_slice()).expect("valid encoding");
        assert_eq!(decoded, h);
        assert!(!decoded.is_genesis());
    }
}
