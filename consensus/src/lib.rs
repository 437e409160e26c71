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

//! Proof of work consensus rules: the target each block must meet and the check that it did.

mod pow;

pub use crate::pow::{
    calculate_next_work, check_pow_consensus, check_proof_of_work, get_next_work_required,
    helpers::{calculate_new_target, due_for_retarget, get_starting_block_time, special_rules},
    ConsensusPoWError, RetargetAlgorithm,
};
