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

//! Night-1 setup constraints: role counts, token assignment, role claims and
//! the private minion/demon info packets, plus the pre-solve passes that run
//! after all lazily created variables exist.

use data::core::primitives::Perspective;
use data::core::time::Time;
use data::script::{
    all_roles, demon_roles, filter_roles, minion_roles, outsider_roles, townsfolk_roles,
    Role,
};
use model::not_all;

use crate::encoder::Encoder;

impl Encoder<'_> {
    /// Role counts per the player-count table (with the Baron adjustment),
    /// uniqueness of non-Imp roles, exactly one role per player per time,
    /// and the storyteller's ground truth when available.
    pub(crate) fn add_role_setup_constraints(&mut self) {
        let night1 = Time::night(1);
        let script = self.game.script();
        let demons = self.collect_roles(night1, &demon_roles(script), false);
        self.model.add_equality_sum(&demons, 1);
        let minions = self.collect_roles(night1, &minion_roles(script), false);
        self.model.add_equality_sum(&minions, self.game.num_minions());
        let baron_in_play = self.role_in_play_var(Role::Baron);
        let outsiders = self.collect_roles(night1, &outsider_roles(script), false);
        let townsfolk = self.collect_roles(night1, &townsfolk_roles(script), false);
        let num_outsiders = self.game.num_outsiders();
        let num_townsfolk = self.game.num_townsfolk();
        self.model.add_implies_sum(baron_in_play.negate(), &outsiders, num_outsiders);
        self.model.add_implies_sum(baron_in_play, &outsiders, num_outsiders + 2);
        self.model.add_implies_sum(baron_in_play.negate(), &townsfolk, num_townsfolk);
        self.model.add_implies_sum(baron_in_play, &townsfolk, num_townsfolk - 2);
        let now = self.game.now().unwrap();
        let roles = all_roles(script).to_vec();
        let mut time = night1;
        while time <= now {
            for &role in &roles {
                // Each role other than the Imp is held by at most one player
                // at a time.
                if role != Role::Imp {
                    let lits = self.collect_roles(time, &[role], false);
                    self.model.add_at_most_one(&lits);
                }
            }
            for i in 0..self.game.num_players() {
                if self.game.perspective() == Perspective::Storyteller {
                    // Fix all the role variables to the actual roles.
                    let actual = self.game.role_at(i, time);
                    for &role in &roles {
                        let var = self.role_var(i, role, time);
                        self.model.add_equal_const(var, role == actual);
                    }
                }
                // Each player holds exactly one role at a time.
                let lits = self.collect_roles_for_player(time, i, &roles, false);
                self.model.add_equality_sum(&lits, 1);
            }
            self.add_role_propagation_constraints(time);
            time += 1;
        }
        self.add_demon_info_constraints();
        self.add_minion_info_constraints();
    }

    /// Night-1 token rules: every player is shown exactly one non-Drunk
    /// token, tokens are unique, a Townsfolk token means the role or the
    /// Drunk, any other token means exactly that role, and the Drunk is
    /// never shown an in-play Townsfolk token.
    pub(crate) fn add_shown_token_constraints(&mut self) {
        let night1 = Time::night(1);
        let script = self.game.script();
        for i in 0..self.game.num_players() {
            let shown: Vec<_> = filter_roles(script, |r| r != Role::Drunk)
                .into_iter()
                .map(|role| self.shown_token_var(i, role))
                .collect();
            self.model.add_equality_sum(&shown, 1);
            let drunk_token = self.shown_token_var(i, Role::Drunk);
            self.model.add_equal_const(drunk_token, false);
            if let Some(shown) = self.game.shown_token_of(i, night1) {
                let var = self.shown_token_var(i, shown);
                self.model.add_equal_const(var, true);
            }
        }
        for role in all_roles(script) {
            let shown: Vec<_> =
                (0..self.game.num_players()).map(|i| self.shown_token_var(i, *role)).collect();
            self.model.add_at_most_one(&shown);
        }
        for i in 0..self.game.num_players() {
            for role in townsfolk_roles(script) {
                // Being shown a Townsfolk token means you are that role or
                // the Drunk.
                let shown = self.shown_token_var(i, role);
                let is_role = self.role_var(i, role, night1);
                let is_drunk = self.role_var(i, Role::Drunk, night1);
                self.model.add_implies_or(shown, &[is_role, is_drunk]);
                // The Drunk cannot be shown an in-play token.
                let in_play = self.role_in_play_var(role);
                self.model.add_or(&[
                    is_drunk.negate(),
                    shown.negate(),
                    in_play.negate(),
                ]);
            }
            // Being shown any other token means you are that role.
            for role in filter_roles(script, |r| r != Role::Drunk && !r.is_townsfolk()) {
                let shown = self.shown_token_var(i, role);
                let is_role = self.role_var(i, role, night1);
                self.model.add_equal(shown, is_role);
            }
        }
    }

    /// A night-1 role claim means the claimer was shown that token or is
    /// starting evil; a later evil-role claim (the Imp starpass claim) means
    /// the claimer holds that role by the following day or is starting evil.
    pub(crate) fn add_role_claims_constraints(&mut self) {
        for i in 0..self.game.num_players() {
            if let Some(role) = self.role_claims[i][0] {
                let shown = self.shown_token_var(i, role);
                let evil = self.starting_evil_var(i);
                self.model.add_or(&[shown, evil]);
            }
        }
        for i in 0..self.game.num_players() {
            for n in 0..self.role_claims[i].len() {
                let Some(role) = self.role_claims[i][n] else {
                    continue;
                };
                if role.is_evil() {
                    let holds = self.role_var(i, role, Time::day(n as u32 + 1));
                    let evil = self.starting_evil_var(i);
                    self.model.add_or(&[holds, evil]);
                }
            }
        }
    }

    /// The demon's night-1 packet: each named minion holds some minion role,
    /// and no bluff token is shown to anyone (including the Drunk).
    pub(crate) fn add_demon_info_constraints(&mut self) {
        let Some(info) = self.game.demon_info().cloned() else {
            return;
        };
        let night1 = Time::night(1);
        for &minion in &info.minions {
            let lits: Vec<_> = minion_roles(self.game.script())
                .into_iter()
                .map(|role| self.role_var(minion, role, night1))
                .collect();
            self.model.add_equality_sum(&lits, 1);
        }
        for &bluff in &info.bluffs {
            for i in 0..self.game.num_players() {
                let shown = self.shown_token_var(i, bluff);
                self.model.add_equal_const(shown, false);
            }
        }
    }

    /// A minion's night-1 packet: the named demon holds a demon role, and
    /// each fellow minion holds a minion role other than the recipient's.
    pub(crate) fn add_minion_info_constraints(&mut self) {
        let Some(info) = self.game.minion_info().cloned() else {
            return;
        };
        let night1 = Time::night(1);
        let demon: Vec<_> = demon_roles(self.game.script())
            .into_iter()
            .map(|role| self.role_var(info.demon, role, night1))
            .collect();
        self.model.add_equality_sum(&demon, 1);
        let my_role = self.game.shown_token_of(info.player, night1);
        for &minion in &info.minions {
            let lits: Vec<_> = minion_roles(self.game.script())
                .into_iter()
                .filter(|role| Some(*role) != my_role) // They are a different minion.
                .map(|role| self.role_var(minion, role, night1))
                .collect();
            self.model.add_equality_sum(&lits, 1);
        }
    }

    pub(crate) fn add_presolve_constraints(&mut self) {
        self.add_presolve_red_herring_constraints();
        self.add_presolve_poisoner_constraints();
    }

    /// If a Fortune Teller is in play there is exactly one red herring, and
    /// only a good player can be it. Red-herring variables are created
    /// lazily by the Fortune Teller constraints, so this pass only binds the
    /// ones that exist.
    fn add_presolve_red_herring_constraints(&mut self) {
        if self.game.red_herring().is_none()
            && !self.is_role_in_play_possible(Role::FortuneTeller)
        {
            return;
        }
        let mut red_herring = vec![];
        let mut remaining_good = vec![];
        let ft_in_play = self.role_in_play_var(Role::FortuneTeller);
        for i in 0..self.game.num_players() {
            if self.game.perspective() == Perspective::Storyteller {
                let var = self.red_herring_var(i);
                self.model.add_equal_const(var, self.game.red_herring() == Some(i));
            }
            let Some(var) = self.model.find_var(&self.red_herring_var_name(i)) else {
                let evil = self.starting_evil_var(i);
                remaining_good.push(evil.negate());
                continue;
            };
            red_herring.push(var);
            // Only a good player can be a red herring.
            let evil = self.starting_evil_var(i);
            self.model.add_implies(var, evil.negate());
            self.model.add_implies(ft_in_play.negate(), var.negate());
        }
        if red_herring.len() == self.game.num_players() {
            self.model.add_implies_sum(ft_in_play, &red_herring, 1);
        } else if self.game.num_players() - red_herring.len() <= 1 + self.game.num_minions() {
            // If the Fortune Teller is in play and no tracked variable is the
            // red herring, it must be one of the remaining players, who is
            // therefore good.
            let mut other = not_all(&red_herring);
            other.push(ft_in_play);
            let var = self.model.reified_and(&other, "red_herring_other");
            self.model.add_implies_or(var, &remaining_good);
        }
    }

    /// At most one Poisoner pick per night, and no picks on a night where no
    /// Poisoner is alive. Pick variables are created lazily, so this pass
    /// runs after all other constraint groups.
    fn add_presolve_poisoner_constraints(&mut self) {
        let now = self.game.now().unwrap();
        let mut time = Time::night(1);
        while time <= now {
            let mut picks = vec![];
            for i in 0..self.game.num_players() {
                if let Some(pick) = self.model.find_var(&self.poisoner_pick_var_name(i, time)) {
                    picks.push(pick);
                }
            }
            if !picks.is_empty() {
                self.model.add_at_most_one(&picks);
                let alive = self.alive_role_var(Role::Poisoner, time);
                self.model.add_implies_and(alive.negate(), &not_all(&picks));
            }
            time += 2;
        }
    }
}
