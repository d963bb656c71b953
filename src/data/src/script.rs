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
use enum_map::{enum_map, Enum, EnumMap};
use enumset::EnumSetType;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{Script, Team};

/// All roles the solver knows about, i.e. the Trouble Brewing script.
#[derive(
    Debug, Hash, Serialize, Deserialize, EnumSetType, Enum, Ord, PartialOrd, Sequence,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Washerwoman,
    Librarian,
    Investigator,
    Chef,
    Empath,
    FortuneTeller,
    Undertaker,
    Monk,
    Ravenkeeper,
    Virgin,
    Slayer,
    Soldier,
    Mayor,
    Butler,
    Drunk,
    Recluse,
    Saint,
    Poisoner,
    Spy,
    ScarletWoman,
    Baron,
    Imp,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Washerwoman => "WASHERWOMAN",
            Role::Librarian => "LIBRARIAN",
            Role::Investigator => "INVESTIGATOR",
            Role::Chef => "CHEF",
            Role::Empath => "EMPATH",
            Role::FortuneTeller => "FORTUNE_TELLER",
            Role::Undertaker => "UNDERTAKER",
            Role::Monk => "MONK",
            Role::Ravenkeeper => "RAVENKEEPER",
            Role::Virgin => "VIRGIN",
            Role::Slayer => "SLAYER",
            Role::Soldier => "SOLDIER",
            Role::Mayor => "MAYOR",
            Role::Butler => "BUTLER",
            Role::Drunk => "DRUNK",
            Role::Recluse => "RECLUSE",
            Role::Saint => "SAINT",
            Role::Poisoner => "POISONER",
            Role::Spy => "SPY",
            Role::ScarletWoman => "SCARLET_WOMAN",
            Role::Baron => "BARON",
            Role::Imp => "IMP",
        };
        write!(f, "{name}")
    }
}

/// The setup category of a role.
#[derive(Debug, Hash, Serialize, Deserialize, EnumSetType, Ord, PartialOrd, Sequence)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleType {
    Townsfolk,
    Outsider,
    Minion,
    Demon,
}

/// Static, script-level facts about a role.
#[derive(Debug, Clone, Copy)]
pub struct RoleMetadata {
    pub role_type: RoleType,
    /// The order in which the role wakes on the first night (0 for not
    /// waking). The numbers are copied from Bra1n's town square tool:
    /// <https://github.com/bra1n/townsquare/blob/main/src/roles.json>
    pub first_night: u32,
    /// Wake order on every other night (0 for not waking).
    pub other_night: u32,
    /// Whether the role has an optional daytime action.
    pub day_action: bool,
    /// May have an action or not, depending on a custom trigger
    /// (e.g. the Undertaker only wakes after an execution).
    pub optional_trigger: bool,
    /// Whether the role's action is used openly in the town square.
    pub public_action: bool,
}

const TOWNSFOLK: RoleMetadata = RoleMetadata {
    role_type: RoleType::Townsfolk,
    first_night: 0,
    other_night: 0,
    day_action: false,
    optional_trigger: false,
    public_action: false,
};
const OUTSIDER: RoleMetadata = RoleMetadata { role_type: RoleType::Outsider, ..TOWNSFOLK };
const MINION: RoleMetadata = RoleMetadata { role_type: RoleType::Minion, ..TOWNSFOLK };
const DEMON: RoleMetadata = RoleMetadata { role_type: RoleType::Demon, ..TOWNSFOLK };

static METADATA: Lazy<EnumMap<Role, RoleMetadata>> = Lazy::new(|| {
    enum_map! {
        Role::Washerwoman => RoleMetadata { first_night: 32, ..TOWNSFOLK },
        Role::Librarian => RoleMetadata { first_night: 33, ..TOWNSFOLK },
        Role::Investigator => RoleMetadata { first_night: 34, ..TOWNSFOLK },
        Role::Chef => RoleMetadata { first_night: 35, ..TOWNSFOLK },
        Role::Empath => RoleMetadata { first_night: 36, other_night: 53, ..TOWNSFOLK },
        Role::FortuneTeller => RoleMetadata { first_night: 37, other_night: 54, ..TOWNSFOLK },
        Role::Undertaker => RoleMetadata { other_night: 56, optional_trigger: true, ..TOWNSFOLK },
        Role::Monk => RoleMetadata { other_night: 13, ..TOWNSFOLK },
        Role::Ravenkeeper => RoleMetadata { other_night: 42, optional_trigger: true, ..TOWNSFOLK },
        Role::Virgin => TOWNSFOLK,
        Role::Slayer => RoleMetadata {
            day_action: true,
            optional_trigger: true,
            public_action: true,
            ..TOWNSFOLK
        },
        Role::Soldier => TOWNSFOLK,
        Role::Mayor => TOWNSFOLK,
        Role::Butler => RoleMetadata { first_night: 38, other_night: 55, ..OUTSIDER },
        Role::Drunk => OUTSIDER,
        Role::Recluse => OUTSIDER,
        Role::Saint => OUTSIDER,
        Role::Poisoner => RoleMetadata { first_night: 17, other_night: 8, ..MINION },
        Role::Spy => RoleMetadata { first_night: 48, other_night: 68, ..MINION },
        Role::ScarletWoman => RoleMetadata { other_night: 20, optional_trigger: true, ..MINION },
        Role::Baron => MINION,
        Role::Imp => RoleMetadata { other_night: 24, ..DEMON },
    }
});

impl Role {
    pub fn metadata(self) -> &'static RoleMetadata {
        &METADATA[self]
    }

    pub fn role_type(self) -> RoleType {
        self.metadata().role_type
    }

    pub fn team(self) -> Team {
        match self.role_type() {
            RoleType::Townsfolk | RoleType::Outsider => Team::Good,
            RoleType::Minion | RoleType::Demon => Team::Evil,
        }
    }

    pub fn is_townsfolk(self) -> bool {
        self.role_type() == RoleType::Townsfolk
    }

    pub fn is_outsider(self) -> bool {
        self.role_type() == RoleType::Outsider
    }

    pub fn is_minion(self) -> bool {
        self.role_type() == RoleType::Minion
    }

    pub fn is_demon(self) -> bool {
        self.role_type() == RoleType::Demon
    }

    pub fn is_good(self) -> bool {
        self.team() == Team::Good
    }

    pub fn is_evil(self) -> bool {
        self.team() == Team::Evil
    }

    pub fn has_day_action(self) -> bool {
        self.metadata().day_action
    }

    pub fn has_public_action(self) -> bool {
        self.metadata().public_action
    }

    pub fn has_optional_trigger(self) -> bool {
        self.metadata().optional_trigger
    }

    /// Wakes on the first night and never again (e.g. Washerwoman).
    pub fn is_first_night_only(self) -> bool {
        let m = self.metadata();
        m.first_night > 0 && m.other_night == 0
    }
}

/// The full Trouble Brewing script, in canonical order.
pub const TROUBLE_BREWING_ROLES: [Role; 22] = [
    Role::Washerwoman,
    Role::Librarian,
    Role::Investigator,
    Role::Chef,
    Role::Empath,
    Role::FortuneTeller,
    Role::Undertaker,
    Role::Monk,
    Role::Ravenkeeper,
    Role::Virgin,
    Role::Slayer,
    Role::Soldier,
    Role::Mayor,
    Role::Butler,
    Role::Drunk,
    Role::Recluse,
    Role::Saint,
    Role::Poisoner,
    Role::Spy,
    Role::ScarletWoman,
    Role::Baron,
    Role::Imp,
];

pub fn all_roles(script: Script) -> &'static [Role] {
    match script {
        Script::TroubleBrewing => &TROUBLE_BREWING_ROLES,
    }
}

pub fn filter_roles(script: Script, f: impl Fn(Role) -> bool) -> Vec<Role> {
    all_roles(script).iter().copied().filter(|r| f(*r)).collect()
}

pub fn good_roles(script: Script) -> Vec<Role> {
    filter_roles(script, Role::is_good)
}

pub fn evil_roles(script: Script) -> Vec<Role> {
    filter_roles(script, Role::is_evil)
}

pub fn townsfolk_roles(script: Script) -> Vec<Role> {
    filter_roles(script, Role::is_townsfolk)
}

pub fn outsider_roles(script: Script) -> Vec<Role> {
    filter_roles(script, Role::is_outsider)
}

pub fn minion_roles(script: Script) -> Vec<Role> {
    filter_roles(script, Role::is_minion)
}

pub fn demon_roles(script: Script) -> Vec<Role> {
    filter_roles(script, Role::is_demon)
}
