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

use data::script::Role;
use serde::{Deserialize, Serialize};

/// One internally consistent role assignment. `current_roles` is total;
/// `starting_roles` only lists players whose night-1 role differs from their
/// current one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub starting_roles: BTreeMap<String, Role>,
    pub current_roles: BTreeMap<String, Role>,
}

/// How many worlds each candidate demon appears alive in. The name
/// `<Dead player>` collects worlds where no live player holds a demon role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliveDemonOption {
    pub name: String,
    pub count: usize,
}

/// The result of one solve: every world consistent with the transcript and
/// the request assumptions, with a histogram over the currently alive demon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverResponse {
    pub worlds: Vec<World>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alive_demon_options: Vec<AliveDemonOption>,
}
