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

use std::fmt;

use enum_iterator::Sequence;
use enumset::EnumSetType;
use serde::{Deserialize, Serialize};

/// The two teams. Every role belongs to exactly one team; Townsfolk and
/// Outsiders are good, Minions and Demons are evil.
#[derive(Debug, Hash, Serialize, Deserialize, EnumSetType, Ord, PartialOrd, Sequence)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    Good,
    Evil,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Good => write!(f, "GOOD"),
            Team::Evil => write!(f, "EVIL"),
        }
    }
}

/// Who is looking at the transcript.
///
/// The perspective determines which storyteller interactions may appear in
/// the event log and which facts the rule encoder may treat as ground truth.
#[derive(Debug, Hash, Serialize, Deserialize, EnumSetType, Sequence)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Perspective {
    /// Sees everything: true roles, shown tokens, all private night actions.
    Storyteller,
    /// One seat at the table: own token and own private actions, plus all
    /// public events. The perspective player is deduced from the first token
    /// shown.
    Player,
    /// Public events only.
    Observer,
}

/// Supported scripts. Only Trouble Brewing for now; the role tables leave
/// room for more.
#[derive(Debug, Hash, Serialize, Deserialize, EnumSetType, Sequence)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Script {
    TroubleBrewing,
}

/// Base number of Townsfolk for 5..=15 players, before Baron adjustment.
pub const NUM_TOWNSFOLK: [usize; 11] = [3, 3, 5, 5, 5, 7, 7, 7, 9, 9, 9];
/// Base number of Outsiders for 5..=15 players, before Baron adjustment.
pub const NUM_OUTSIDERS: [usize; 11] = [0, 1, 0, 1, 2, 0, 1, 2, 0, 1, 2];
/// Number of Minions for 5..=15 players.
pub const NUM_MINIONS: [usize; 11] = [1, 1, 1, 1, 1, 2, 2, 2, 3, 3, 3];
