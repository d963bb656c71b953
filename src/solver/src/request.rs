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

use data::script::Role;
use serde::{Deserialize, Serialize};

/// An assumption about one player's role, positive or negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssumption {
    pub player: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_not: bool,
}

/// An assumption about one player's poison status on a given night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoisonedAssumption {
    pub player: String,
    pub night: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_not: bool,
}

/// Extra facts conjoined onto the model before solving. Adding assumptions
/// can only ever shrink the set of worlds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assumptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub starting_roles: Vec<RoleAssumption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub current_roles: Vec<RoleAssumption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles_in_play: Vec<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles_not_in_play: Vec<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub is_good: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub is_evil: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub poisoned_players: Vec<PoisonedAssumption>,
}

/// Options for one solve call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverRequest {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stop_after_first_solution: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub debug_mode: bool,
    /// Opt-in: skip encoding info claims the perspective already knows to be
    /// bluffs. Benchmark before enabling.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub prune_claim_bluffs: bool,
    #[serde(default)]
    pub assumptions: Assumptions,
}

/// Fluent construction of [SolverRequest]s.
#[derive(Debug, Clone, Default)]
pub struct SolverRequestBuilder {
    request: SolverRequest,
}

impl SolverRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_starting_role(mut self, player: &str, role: Role) -> Self {
        self.request.assumptions.starting_roles.push(RoleAssumption {
            player: player.to_owned(),
            role,
            is_not: false,
        });
        self
    }

    pub fn add_starting_role_not(mut self, player: &str, role: Role) -> Self {
        self.request.assumptions.starting_roles.push(RoleAssumption {
            player: player.to_owned(),
            role,
            is_not: true,
        });
        self
    }

    pub fn add_current_roles(mut self, player_roles: &[(&str, Role)]) -> Self {
        for (player, role) in player_roles {
            self.request.assumptions.current_roles.push(RoleAssumption {
                player: (*player).to_owned(),
                role: *role,
                is_not: false,
            });
        }
        self
    }

    pub fn add_current_roles_not(mut self, player_roles: &[(&str, Role)]) -> Self {
        for (player, role) in player_roles {
            self.request.assumptions.current_roles.push(RoleAssumption {
                player: (*player).to_owned(),
                role: *role,
                is_not: true,
            });
        }
        self
    }

    pub fn add_roles_in_play(mut self, roles: &[Role]) -> Self {
        self.request.assumptions.roles_in_play.extend_from_slice(roles);
        self
    }

    pub fn add_roles_not_in_play(mut self, roles: &[Role]) -> Self {
        self.request.assumptions.roles_not_in_play.extend_from_slice(roles);
        self
    }

    pub fn add_good(mut self, players: &[&str]) -> Self {
        self.request.assumptions.is_good.extend(players.iter().map(|p| (*p).to_owned()));
        self
    }

    pub fn add_evil(mut self, players: &[&str]) -> Self {
        self.request.assumptions.is_evil.extend(players.iter().map(|p| (*p).to_owned()));
        self
    }

    pub fn add_poisoned(mut self, player: &str, night: u32) -> Self {
        self.request.assumptions.poisoned_players.push(PoisonedAssumption {
            player: player.to_owned(),
            night,
            is_not: false,
        });
        self
    }

    pub fn add_healthy(mut self, player: &str, night: u32) -> Self {
        self.request.assumptions.poisoned_players.push(PoisonedAssumption {
            player: player.to_owned(),
            night,
            is_not: true,
        });
        self
    }

    pub fn build(self) -> SolverRequest {
        self.request
    }

    pub fn from_current_roles(player_roles: &[(&str, Role)]) -> SolverRequest {
        Self::new().add_current_roles(player_roles).build()
    }

    pub fn from_current_roles_not(player_roles: &[(&str, Role)]) -> SolverRequest {
        Self::new().add_current_roles_not(player_roles).build()
    }
}
