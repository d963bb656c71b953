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
use crate::script::Role;

/// One entry of a Spy's view of the grimoire: the token in front of a seat,
/// plus the reminder markers the Spy can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrimoireEntry {
    pub player: usize,
    /// The shown token; for the Drunk this is their fake Townsfolk token.
    pub role: Role,
    pub is_drunk: bool,
    pub shroud: bool,
}

/// A Spy's full grimoire snapshot, one entry per seat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpyGrimoire {
    pub entries: Vec<GrimoireEntry>,
}

/// A uniform record of one role's night or day action, used both for
/// storyteller interactions and for role-action claims. Which fields are
/// populated depends on the acting role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAction {
    /// When the action took place. Unset on construction, stamped during
    /// event ingestion.
    pub time: Option<Time>,
    /// Who acted. Stamped during event ingestion.
    pub player: Option<usize>,
    pub acting: Option<Role>,
    /// Picks or pings (e.g. Fortune Teller picks, Washerwoman pings).
    pub players: Vec<usize>,
    /// Role picks or learned roles (e.g. Undertaker, Ravenkeeper).
    pub roles: Vec<Role>,
    /// e.g. Chef or Empath numbers.
    pub number: i32,
    /// e.g. Fortune Teller answers, Slayer shot outcomes.
    pub yes: bool,
    /// The Spy is special.
    pub grimoire: Option<SpyGrimoire>,
}

impl RoleAction {
    /// Whether a claim of this action carries enough detail to constrain the
    /// solve. Claims that omit mandatory fields are treated as weak and
    /// ignored by the encoder.
    pub fn is_well_defined(&self) -> bool {
        match self.acting {
            Some(Role::Washerwoman) | Some(Role::Investigator) => {
                self.players.len() == 2 && self.roles.len() == 1
            }
            Some(Role::Librarian) => {
                (self.players.len() == 2 && self.roles.len() == 1)
                    || (self.players.is_empty() && self.roles.is_empty()) // No outsiders.
            }
            // The number may be 0.
            Some(Role::Chef) | Some(Role::Empath) => true,
            Some(Role::FortuneTeller) => self.players.len() == 2,
            Some(Role::Undertaker) => self.roles.len() == 1,
            Some(Role::Monk) | Some(Role::Butler) => self.players.len() == 1,
            Some(Role::Ravenkeeper) => self.players.len() == 1 && self.roles.len() == 1,
            _ => false,
        }
    }
}

/// Wire form of [GrimoireEntry], with the player referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrimoireEntryRecord {
    pub player: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_drunk: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub shroud: bool,
}

/// Wire form of [SpyGrimoire].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpyGrimoireRecord {
    pub entries: Vec<GrimoireEntryRecord>,
}

/// Wire form of [RoleAction], with players referenced by name. The action
/// time and actor are carried by the surrounding event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleActionRecord {
    pub acting: Option<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub players: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub number: i32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub yes: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grimoire: Option<SpyGrimoireRecord>,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}
