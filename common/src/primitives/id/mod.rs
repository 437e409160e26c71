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
    fmt::{Debug, Display},
    hash::Hash,
    marker::PhantomData,
};

use parity_scale_codec::{Decode, Encode};

use crate::Uint256;

fixed_hash::construct_fixed_hash! {
    #[derive(Encode, Decode)]
    pub struct H256(32);
}

impl H256 {
    /// Hashes are shown in reverse byte order, the way bitcoin-derived chains print them.
    pub fn as_bitcoin_uint256_hex(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        hex::encode(bytes)
    }
}

/// The bytes of a hash are the little-endian representation of the number.
impl From<H256> for Uint256 {
    fn from(hash: H256) -> Self {
        Uint256::from_le_bytes(hash.0)
    }
}

impl From<Uint256> for H256 {
    fn from(val: Uint256) -> Self {
        H256(val.to_le_bytes())
    }
}

/// A typed wrapper around a hash, identifying an object of type `T`.
pub struct Id<T> {
    hash: H256,
    _shadow: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn new(hash: H256) -> Self {
        Self {
            hash,
            _shadow: PhantomData,
        }
    }

    pub const fn to_hash(&self) -> H256 {
        self.hash
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.hash.cmp(&other.hash)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state)
    }
}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id{{0x{:x}}}", self.hash)
    }
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:x}", self.hash)
    }
}

impl<T> From<H256> for Id<T> {
    fn from(hash: H256) -> Self {
        Self::new(hash)
    }
}

impl<T> Encode for Id<T> {
    fn size_hint(&self) -> usize {
        self.hash.size_hint()
    }

    fn encode_to<W: parity_scale_codec::Output + ?Sized>(&self, dest: &mut W) {
        self.hash.encode_to(dest)
    }
}

impl<T> Decode for Id<T> {
    fn decode<I: parity_scale_codec::Input>(
        input: &mut I,
    ) -> Result<Self, parity_scale_codec::Error> {
        H256::decode(input).map(Self::new)
    }
}

/// Objects that have an id derived from their contents.
pub trait Idable {
    type Tag;
    fn get_id(&self) -> Id<Self::Tag>;
}
