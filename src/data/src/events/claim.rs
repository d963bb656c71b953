// Copyright © ravenkeeper 2025-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};

use crate::core::time::Time;
use crate::events::role_action::{RoleAction, RoleActionRecord};
use crate::script::{Role, RoleType};

/// Who heard a claim. The encoder only trusts claims made to the whole town
/// square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience {
    pub players: Vec<usize>,
    pub townsquare: bool,
}

impl Audience {
    pub fn townsquare() -> Self {
        Self { players: vec![], townsquare: true }
    }

    pub fn nobody() -> Self {
        Self { players: vec![], townsquare: false }
    }

    pub fn is_empty(&self) -> bool {
        !self.townsquare && self.players.is_empty()
    }
}

impl Default for Audience {
    fn default() -> Self {
        Self::townsquare()
    }
}

/// A vague role statement ("I am one of these", "I am not a Minion").
/// Recorded in the transcript but not encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftRole {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_type: Option<RoleType>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_not: bool,
}

/// The payload of a claim.
///
/// Only [ClaimDetails::Role] and well-defined [ClaimDetails::RoleAction]
/// claims are "strong" and feed the encoder; the other forms are recorded
/// for completeness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimDetails {
    /// "My token on the claimed night was this role."
    Role(Role),
    SoftRole(SoftRole),
    /// "My role action on the claimed night (or day) was this."
    RoleAction(RoleAction),
    /// "This happened to me" (e.g. a Monk reporting who they protected).
    RoleEffect(RoleAction),
    /// Relaying someone else's claim.
    Propagation(Box<Claim>),
    Retraction(Box<Claim>),
}

/// A public statement by a player, made during some day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// When the claim was made. Stamped during event ingestion.
    pub claim_time: Option<Time>,
    /// The player making the claim.
    pub player: usize,
    pub audience: Audience,
    /// The time the claim pertains to. May be omitted, in which case it is
    /// deduced from the claim contents.
    pub time: Option<Time>,
    pub details: ClaimDetails,
}

/// Wire form of [Audience].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceRecord {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub players: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nobody: bool,
}

/// Wire form of [ClaimDetails].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimDetailsRecord {
    Role(Role),
    SoftRole(SoftRole),
    RoleAction(RoleActionRecord),
    RoleEffect(RoleActionRecord),
    Claim(Box<ClaimRecord>),
    Retraction(Box<ClaimRecord>),
}

/// Wire form of [Claim].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub player: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<AudienceRecord>,
    pub details: ClaimDetailsRecord,
}
