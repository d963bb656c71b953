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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::primitives::{Perspective, Script, Team};
use crate::events::claim::ClaimRecord;
use crate::events::role_action::RoleActionRecord;
use crate::script::Role;

/// Setup facts that precede the event stream: the storyteller's actual role
/// assignment and red herring (storyteller perspective only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setup {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub player_roles: BTreeMap<String, Role>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub red_herring: String,
}

/// A private packet shown to a storyteller interaction's subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionDetails {
    ShownToken(Role),
    MinionInfo { demon: String, minions: Vec<String> },
    DemonInfo { minions: Vec<String>, bluffs: Vec<Role> },
    RoleAction(RoleActionRecord),
}

/// One storyteller interaction: the storyteller privately engages `player`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub player: String,
    pub details: InteractionDetails,
}

/// One transcript event, in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventRecord {
    Night(u32),
    Day(u32),
    StorytellerInteraction(InteractionRecord),
    Nomination { nominator: String, nominee: String },
    Vote { #[serde(default, skip_serializing_if = "Vec::is_empty")] votes: Vec<String>, num_votes: usize, #[serde(default, skip_serializing_if = "String::is_empty")] on_the_block: String },
    Execution(String),
    Death(String),
    NightDeath(String),
    Claim(ClaimRecord),
    Whisper { players: Vec<String>, #[serde(default, skip_serializing_if = "String::is_empty")] initiator: String },
    Victory(Team),
}

/// The full textual form of one game transcript. A [GameLog] round-trips
/// through serialization byte-for-byte and replays into an identical
/// game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLog {
    pub perspective: Perspective,
    pub script: Script,
    pub players: Vec<String>,
    #[serde(default, skip_serializing_if = "setup_is_empty")]
    pub setup: Setup,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventRecord>,
}

fn setup_is_empty(setup: &Setup) -> bool {
    setup.player_roles.is_empty() && setup.red_herring.is_empty()
}
