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

//! Derived queries over the transcript: deaths, claims, expected info and
//! the conservative role-possibility filter.

use std::collections::HashMap;

use color_eyre::eyre::eyre;
use utils::outcome::{Outcome, OK};

use crate::core::primitives::Perspective;
use crate::core::time::Time;
use crate::events::claim::ClaimDetails;
use crate::events::role_action::RoleAction;
use crate::game_states::game_state::GameState;
use crate::script::Role;

impl GameState {
    /// The deaths of the given day or night, chronologically. For a day,
    /// Slayer kills precede the execution death.
    pub fn deaths(&self, time: Time) -> Vec<usize> {
        let mut result = vec![];
        if time.is_day() {
            for shot in self.role_actions_of_role(Role::Slayer) {
                if shot.yes && shot.time == Some(time) {
                    result.push(shot.players[0]);
                }
            }
            if let Some(death) = self.execution_death(time) {
                result.push(death);
            }
        } else if let Some(death) = self.night_death(time) {
            result.push(death);
        }
        result
    }

    pub fn deaths_names(&self, time: Time) -> Vec<String> {
        self.deaths(time).into_iter().map(|i| self.player_name(i).to_owned()).collect()
    }

    /// The earliest phase at whose end the player is dead, or `None` while
    /// they live.
    pub fn time_of_death(&self, player: usize) -> Option<Time> {
        let cur = self.current_time()?;
        let mut t = Time::night(1);
        while t < cur {
            if self.is_alive_at(player, t) && !self.is_alive_at(player, t + 1) {
                return Some(t);
            }
            t += 1;
        }
        None
    }

    pub(crate) fn died_at_night(&self, player: usize, time: Time) -> bool {
        self.time_of_death(player).is_some_and(|death| death <= time && death.is_night())
    }

    /// The two nearest living players, clockwise and counter-clockwise.
    pub fn alive_neighbors(&self, player: usize, time: Time) -> [usize; 2] {
        assert!(self.num_alive_at(time) >= 3, "Less than 3 alive players, game didn't end");
        let n = self.num_players();
        let mut up = (player + 1) % n;
        while !self.is_alive_at(up, time) {
            up = (up + 1) % n;
        }
        let mut down = (player + n - 1) % n;
        while !self.is_alive_at(down, time) {
            down = (down + n - 1) % n;
        }
        [up, down]
    }

    /// For each night up to now, the latest role claim made by the player
    /// about that night. Claims propagate forward: a claim about night t
    /// covers every night from t on, until overridden.
    pub fn role_claims_of(&self, player: usize) -> Vec<Option<Role>> {
        let cur = self.now().expect("time must be set");
        let mut result = vec![None; cur.count as usize];
        for c in self.claims() {
            if let ClaimDetails::Role(role) = &c.details {
                if c.player != player {
                    continue;
                }
                let mut t = c.time.unwrap();
                while t < cur {
                    result[t.index()] = Some(*role);
                    t += 2;
                }
            }
        }
        result
    }

    /// [GameState::role_claims_of] for every player.
    pub fn role_claims_by_night(&self) -> Vec<Vec<Option<Role>>> {
        let cur = self.now().expect("time must be set");
        let mut result = vec![vec![None; cur.count as usize]; self.num_players()];
        for c in self.claims() {
            if let ClaimDetails::Role(role) = &c.details {
                let mut t = c.time.unwrap();
                while t < cur {
                    result[c.player][t.index()] = Some(*role);
                    t += 2;
                }
            }
        }
        result
    }

    /// For every claimed role, the night-indexed role-action claims whose
    /// acting role matches the claimer's role claim for that night. A later
    /// claim by the same player for the same night overrides an earlier one.
    pub fn role_action_claims_by_night(&self) -> HashMap<Role, Vec<Vec<RoleAction>>> {
        let cur = self.now().expect("time must be set");
        let counts = cur.count as usize;
        let role_claims = self.role_claims_by_night();
        let mut result: HashMap<Role, Vec<Vec<RoleAction>>> = HashMap::new();
        for c in self.claims() {
            let ClaimDetails::RoleAction(ra) = &c.details else {
                continue;
            };
            let acting = ra.acting.unwrap();
            let night = ra.time.unwrap().index();
            if role_claims[c.player][night] != Some(acting) {
                continue;
            }
            let nights = result.entry(acting).or_insert_with(|| vec![vec![]; counts]);
            let night_actions = &mut nights[night];
            if let Some(action) = night_actions.iter_mut().find(|a| a.player == ra.player) {
                // Override the earlier action claim.
                *action = ra.clone();
            } else {
                night_actions.push(ra.clone());
            }
        }
        result
    }

    /// Whether a player with the given role should have produced a role
    /// action on the given night. Trouble Brewing only: on a role change,
    /// what info the previous role still owes depends on the night order
    /// relative to the cause of the change, which does not generalize.
    pub fn is_info_expected(&self, player: usize, role: Role, t: Time) -> bool {
        assert!(t.is_night(), "Only night roles are supported for now");
        let m = role.metadata();
        if t == Time::night(1) {
            return m.first_night > 0;
        }
        if role == Role::Ravenkeeper {
            // Only if they died that very night.
            return self.night_death(t) == Some(player);
        }
        // An Imp claim following a Recluse claim is the starpass claim; the
        // role only changes as a result of the Imp action, so no info is
        // expected on the starpass night.
        if role == Role::Imp && t.count >= 2 {
            let claims = self.role_claims_of(player);
            if claims[t.index() - 1] == Some(Role::Recluse) {
                return false;
            }
        }
        // Otherwise, the player needs to be alive for info, or to wake before
        // the Imp.
        if !self.is_alive_at(player, t + 1)
            && (self.night_death(t) != Some(player)
                || m.other_night >= Role::Imp.metadata().other_night)
        {
            return false;
        }
        if m.optional_trigger {
            if role == Role::Undertaker {
                // The trigger is public: the previous day's execution.
                return self.execution_death(t).is_some();
            }
            return false; // In general, we cannot expect info for sure.
        }
        m.other_night > 0
    }

    /// Whether every player has claimed a role for every elapsed night and
    /// delivered the role-action claims their claimed roles owe. Only fully
    /// claimed games are solvable; the error lists every missing claim.
    pub fn is_fully_claimed(&self) -> Outcome {
        let cur = self.now()?;
        let role_claims = self.role_claims_by_night();
        let action_claims = self.role_action_claims_by_night();
        let mut missing = vec![];
        for i in 0..self.num_players() {
            let mut n = Time::night(1);
            while n <= cur && role_claims[i][n.index()].is_none() {
                n += 2;
            }
            if n > Time::night(1) {
                let mut error = format!("{} is missing a role claim", self.player_name(i));
                if n <= cur {
                    error.push_str(&format!(" for nights 1-{}", n.count - 1));
                }
                missing.push(error);
            }
            // For info roles, check that we have all the expected claims.
            while n <= cur {
                let Some(role) = role_claims[i][n.index()] else {
                    n += 2;
                    continue;
                };
                if self.is_info_expected(i, role, n) {
                    let found = action_claims
                        .get(&role)
                        .is_some_and(|nights| {
                            nights[n.index()].iter().any(|ra| ra.player == Some(i))
                        });
                    if !found {
                        missing.push(format!(
                            "{} is missing a {role} role action claim for night {}",
                            self.player_name(i),
                            n.count
                        ));
                    }
                }
                n += 2;
            }
        }
        if missing.is_empty() {
            OK
        } else {
            Err(eyre!("Missing claims: {}", missing.join(", ")))
        }
    }

    fn is_known_demon_bluff(&self, role: Role) -> bool {
        self.demon_info().is_some_and(|info| info.bluffs.contains(&role))
    }

    fn is_known_starting_demon(&self, player: usize) -> bool {
        if self.minion_info().is_some_and(|info| info.demon == player) {
            return true;
        }
        if self.perspective() == Perspective::Player {
            if let Some(me) = self.perspective_player() {
                if self.shown_token_of(me, Time::night(1)).is_some_and(Role::is_demon) {
                    return player == me;
                }
            }
        }
        false
    }

    fn is_known_starting_minion(&self, player: usize) -> bool {
        if self.minion_info().is_some_and(|info| info.minions.contains(&player)) {
            return true;
        }
        if self.demon_info().is_some_and(|info| info.minions.contains(&player)) {
            return true;
        }
        if self.perspective() == Perspective::Player {
            if let Some(me) = self.perspective_player() {
                if self.shown_token_of(me, Time::night(1)).is_some_and(Role::is_minion) {
                    return player == me;
                }
            }
        }
        false
    }

    fn is_known_evil(&self, player: usize) -> bool {
        self.is_known_starting_demon(player) || self.is_known_starting_minion(player)
    }

    /// From the transcript's perspective, can the player conceivably hold the
    /// role at the given time? This is an optimization filter: it must only
    /// ever return false when the role is truly impossible, and it relies on
    /// the game being fully claimed. Its main use is ruling out options via
    /// known-evil info.
    pub fn is_role_possible(&self, player: usize, role: Role, time: Time) -> bool {
        if self.perspective() == Perspective::Observer {
            return true; // The observer makes no inferences for now.
        }
        if let Some(player_role) = self.shown_token_of(player, time) {
            return player_role == role
                || (role == Role::Drunk && player_role.is_townsfolk());
        }
        // From now on, this is the player perspective.
        let Some(me) = self.perspective_player() else {
            return true;
        };
        let Some(my_role) = self.shown_token_of(me, time) else {
            return true;
        };
        if role.is_good() {
            if my_role.is_evil() {
                // We can rule out known evil players and demon bluff roles.
                return !(self.is_known_evil(player) || self.is_known_demon_bluff(role));
            }
            if role == my_role {
                return player == me; // Nobody else can be my role.
            }
            return true;
        }
        if my_role.is_good() {
            return true; // No inferences.
        }
        // From now on, both my role and the queried role are evil.
        if role.is_minion() {
            return role != my_role && self.is_known_starting_minion(player);
        }
        // From now on, we try to rule out a possible demon.
        if time == Time::night(1) {
            return role != my_role && self.is_known_starting_demon(player);
        }
        let claims = self.role_claims_of(player);
        let claim_recluse_starpass = claims.first().copied().flatten() == Some(Role::Recluse)
            && claims.last().copied().flatten() == Some(Role::Imp);
        let possible_starpass = self.is_known_starting_minion(player) || claim_recluse_starpass;
        if my_role.is_minion() {
            // They could be the starting demon, or the starting demon might
            // be dead and they caught a starpass (as a starting minion or a
            // Recluse), or they caught a Scarlet Woman proc.
            if self.is_known_starting_demon(player) {
                return true;
            }
            let Some(demon) = self.minion_info().map(|info| info.demon) else {
                return true;
            };
            let tod = self.time_of_death(demon);
            let sw_valid = tod.is_some_and(|t| t < time && self.num_alive_at(t) >= 5);
            return (sw_valid
                && self.is_role_possible(player, Role::ScarletWoman, tod.unwrap()))
                || (self.died_at_night(demon, time) && possible_starpass);
        }
        // They were a demon at some point and died, and I caught a starpass
        // (or a Scarlet Woman proc), or I'm a dead Imp and they caught the
        // starpass.
        let tod = self.time_of_death(player);
        let starting_sw =
            self.shown_token_of(me, Time::night(1)) == Some(Role::ScarletWoman);
        let sw_valid = tod.is_some_and(|t| t < time && self.num_alive_at(t) >= 5);
        (self.died_at_night(me, time) && possible_starpass)
            || (sw_valid && starting_sw)
            || (self.died_at_night(player, time)
                && self.is_role_possible(player, Role::Imp, time - 1))
    }
}
