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

//! The "compact" encoding of a 256-bit target, as stored in block headers.
//!
//! `bits = exponent << 24 | mantissa`, where the target is
//! `mantissa * 256^(exponent - 3)`. Bit `0x0080_0000` is a sign bit, so only
//! 23 bits of mantissa carry magnitude. The encoding keeps at most three
//! significant bytes; everything below them is truncated.
//!
//! Consensus code re-encodes intermediate targets at fixed points, so both
//! directions here must stay bit-for-bit compatible with bitcoin's
//! `arith_uint256::SetCompact`/`GetCompact`.

use std::fmt;

use parity_scale_codec::{Decode, Encode};
use thiserror::Error;

use crate::Uint256;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Encode, Decode)]
pub struct Compact(pub u32);

/// The result of decoding compact bits without rejecting anything.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecodedCompact {
    pub value: Uint256,
    pub negative: bool,
    pub overflow: bool,
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum CompactConversionError {
    #[error("Compact bits {0} encode a negative value")]
    Negative(Compact),
    #[error("Compact bits {0} encode a value wider than 256 bits")]
    Overflow(Compact),
    #[error("Compact bits {0} encode zero")]
    Zero(Compact),
}

impl Compact {
    pub const fn inner(&self) -> u32 {
        self.0
    }

    /// Decode the bits. Never fails; callers must look at the `negative` and `overflow` flags.
    ///
    /// Bits shifted past the 256th are dropped, so an overflowing encoding still yields a
    /// (meaningless) value.
    pub fn decode(self) -> DecodedCompact {
        let size = self.0 >> 24;
        let mut word = self.0 & MANTISSA_MASK;

        let value = if size <= 3 {
            word >>= 8 * (3 - size);
            Uint256::from(word)
        } else {
            Uint256::from(word) << (8 * (size - 3))
        };

        let negative = word != 0 && (self.0 & SIGN_BIT) != 0;
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

        DecodedCompact {
            value,
            negative,
            overflow,
        }
    }

    /// The decoded magnitude, ignoring the sign and overflow flags.
    pub fn decode_lossy(self) -> Uint256 {
        self.decode().value
    }
}

impl fmt::Display for Compact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl From<Uint256> for Compact {
    fn from(value: Uint256) -> Self {
        let mut size = value.bits().div_ceil(8);
        let mut compact = if size <= 3 {
            (value.low_u64() << (8 * (3 - size))) as u32
        } else {
            (value >> (8 * (size - 3))).low_u32()
        };

        // The mantissa would read as negative, so give up its lowest byte.
        if compact & SIGN_BIT != 0 {
            compact >>= 8;
            size += 1;
        }

        Compact(compact | ((size as u32) << 24))
    }
}

impl TryFrom<Compact> for Uint256 {
    type Error = CompactConversionError;

    fn try_from(bits: Compact) -> Result<Self, Self::Error> {
        let DecodedCompact {
            value,
            negative,
            overflow,
        } = bits.decode();

        if negative {
            return Err(CompactConversionError::Negative(bits));
        }
        if overflow {
            return Err(CompactConversionError::Overflow(bits));
        }
        if value.is_zero() {
            return Err(CompactConversionError::Zero(bits));
        }

        Ok(value)
    }
}
