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

//! 256-bit unsigned arithmetic used for proof-of-work targets.
//!
//! Consensus arithmetic on targets must behave like a fixed-width machine
//! integer: products wrap modulo 2^256 and division truncates. The
//! `uint` crate provides the representation; the helpers below spell out
//! the wrapping operations consensus code relies on.

uint::construct_uint! {
    /// Little-endian limbs: `Uint256([least significant, .., most significant])`.
    pub struct Uint256(4);
}

impl Uint256 {
    pub const ZERO: Uint256 = Uint256([0, 0, 0, 0]);
    pub const ONE: Uint256 = Uint256([1, 0, 0, 0]);

    pub const fn from_u64(value: u64) -> Self {
        Uint256([value, 0, 0, 0])
    }

    /// Multiply by a machine word, discarding any bits above 2^256.
    pub fn wrapping_mul_u64(self, rhs: u64) -> Self {
        self.overflowing_mul(Uint256::from_u64(rhs)).0
    }

    /// Multiply by `numerator` (wrapping) and then divide by `denominator` (truncating).
    ///
    /// Panics if `denominator` is zero.
    pub fn mul_div_u64(self, numerator: u64, denominator: u64) -> Self {
        assert!(denominator != 0, "division of a target by zero");
        self.wrapping_mul_u64(numerator) / Uint256::from_u64(denominator)
    }

    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Uint256::from_little_endian(&bytes)
    }

    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.to_little_endian(&mut bytes);
        bytes
    }

    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.to_big_endian(&mut bytes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use test_utils::random::{make_seedable_rng, Rng, Seed};

    use super::*;

    #[test]
    fn limbs_are_little_endian() {
        let value = Uint256([0x01, 0, 0, 0x8000_0000_0000_0000]);
        let be = value.to_be_bytes();
        assert_eq!(be[0], 0x80);
        assert_eq!(be[31], 0x01);
        assert_eq!(Uint256::from_le_bytes(value.to_le_bytes()), value);
    }

    #[test]
    fn multiplication_wraps() {
        assert_eq!(Uint256::MAX.wrapping_mul_u64(2), Uint256::MAX - Uint256::ONE);
        assert_eq!(Uint256::from_u64(7).wrapping_mul_u64(6), Uint256::from_u64(42));
    }

    #[test]
    fn division_truncates() {
        assert_eq!(Uint256::from_u64(10).mul_div_u64(10, 8), Uint256::from_u64(12));
        assert_eq!(Uint256::from_u64(101).mul_div_u64(100, 102), Uint256::from_u64(99));
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn mul_div_matches_narrow_arithmetic(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);
        for _ in 0..1000 {
            let value = rng.gen::<u64>();
            let numerator = rng.gen::<u32>();
            let denominator = rng.gen_range(1..=u64::MAX);
            let expected = u128::from(value) * u128::from(numerator) / u128::from(denominator);
            let result = Uint256::from_u64(value).mul_div_u64(u64::from(numerator), denominator);
            assert_eq!(result, Uint256([expected as u64, (expected >> 64) as u64, 0, 0]));
        }
    }

    #[test]
    #[should_panic]
    fn zero_denominator_panics() {
        let _ = Uint256::ONE.mul_div_u64(1, 0);
    }
}
