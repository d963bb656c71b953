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

//! Constraints for the information roles: the shared "one of k pings is one
//! of n roles" template (Washerwoman, Librarian, Investigator, Undertaker,
//! Ravenkeeper), plus the Chef, Empath and Fortune Teller.

use data::core::time::Time;
use data::events::role_action::RoleAction;
use data::script::{outsider_roles, Role};
use model::Lit;

use crate::encoder::Encoder;

impl Encoder<'_> {
    /// The shared template: every claimed result is explained by at least
    /// one of (a) the claimer doesn't hold the role, (b) the claimer was
    /// poisoned, (c) some ping actually holds the stated role, or (d) some
    /// ping holds the matching false-trigger role (a healthy Recluse for
    /// good-role info, the Spy for evil-role info).
    pub(crate) fn add_learning_role_info_constraints(&mut self, role: Role) {
        for ra in self.action_claims_of(role) {
            self.add_learning_role_info_claim(&ra);
        }
    }

    fn add_learning_role_info_claim(&mut self, ra: &RoleAction) {
        let player = ra.player.unwrap();
        let acting = ra.acting.unwrap();
        let time = ra.time.unwrap();
        if self.prune_claim_bluffs && !self.is_role_possible(player, acting, time) {
            return; // We know it's a bluff.
        }
        let mut cases = vec![
            self.role_var(player, acting, time).negate(),
            self.poisoned_var(player, time),
        ];
        if ra.roles.is_empty() {
            // Specifically a Librarian learning that there are no outsiders.
            let outsiders: Vec<Lit> = outsider_roles(self.game.script())
                .into_iter()
                .map(|role| self.role_in_play_var(role).negate())
                .collect();
            let name = format!("{}_LIBRARIAN_no_outsiders", self.game.player_name(player));
            cases.push(self.model.reified_and(&outsiders, &name));
        } else {
            for &role in &ra.roles {
                let false_trigger =
                    if role.is_good() { Role::Spy } else { Role::Recluse };
                for &ping in &ra.players {
                    cases.push(self.role_var(ping, role, time));
                    if !self.is_role_possible(ping, false_trigger, time) {
                        continue;
                    }
                    let ping_false = self.role_var(ping, false_trigger, time);
                    cases.push(if false_trigger.is_minion() {
                        ping_false
                    } else {
                        let poisoned = self.poisoned_var(ping, time);
                        self.model.reified_and(
                            &[ping_false, poisoned.negate()],
                            &format!(
                                "{acting}_ping_{}_healthy_{false_trigger}",
                                self.game.player_name(ping)
                            ),
                        )
                    });
                }
            }
        }
        self.model.add_or(&cases);
    }

    /// The Chef learns the number of adjacent evil pairs around the ring,
    /// where a healthy Recluse may register evil and the Spy may register
    /// good.
    pub(crate) fn add_chef_constraints(&mut self) {
        for ra in self.action_claims_of(Role::Chef) {
            self.add_chef_claim(ra.player.unwrap(), ra.number);
        }
    }

    fn add_chef_claim(&mut self, chef: usize, chef_number: i32) {
        let night1 = Time::night(1);
        if self.prune_claim_bluffs && !self.is_role_possible(chef, Role::Chef, night1) {
            return; // We know it's a bluff.
        }
        // How everyone registered to the Chef.
        let mut registered_evil = vec![];
        for i in 0..self.game.num_players() {
            if i == chef {
                registered_evil.push(self.model.false_lit()); // The Chef is good.
                continue;
            }
            let reg_evil = self.model.new_var(&format!(
                "chef_{}_registered_evil_{}",
                self.game.player_name(chef),
                self.game.player_name(i)
            ));
            registered_evil.push(reg_evil);
            let mut evil_options = vec![self.starting_evil_var(i)];
            if self.role_claims[i][0] == Some(Role::Recluse) {
                let recluse = self.role_var(i, Role::Recluse, night1);
                let picked = self.poisoner_pick_var(i, night1);
                evil_options.push(self.model.reified_and(
                    &[recluse, picked.negate()],
                    &format!("healthy_recluse_{}_{night1}", self.game.player_name(i)),
                ));
            }
            self.model.add_implies_or(reg_evil, &evil_options);
            // We assume a Spy cannot be poisoned.
            let evil = self.starting_evil_var(i);
            let spy = self.role_var(i, Role::Spy, night1);
            self.model.add_implies_or(reg_evil.negate(), &[evil.negate(), spy]);
        }
        let mut evil_pairs = vec![];
        for i in 0..self.game.num_players() {
            let j = (i + 1) % self.game.num_players();
            evil_pairs.push(self.model.reified_and(
                &[registered_evil[i], registered_evil[j]],
                &format!(
                    "chef_evil_pair_{}_{}",
                    self.game.player_name(i),
                    self.game.player_name(j)
                ),
            ));
        }
        let correct = self.model.reified_sum_eq(
            &evil_pairs,
            chef_number.max(0) as usize,
            &format!("chef_{}_number_{chef_number}", self.game.player_name(chef)),
        );
        let not_chef = self.role_var(chef, Role::Chef, night1).negate();
        let picked = self.poisoner_pick_var(chef, night1);
        self.model.add_or(&[not_chef, picked, correct]);
    }

    /// The Empath learns how many of their two living neighbors register
    /// evil. Only 0, 1 and 2 are explainable; any other number forces "not
    /// the Empath or poisoned".
    pub(crate) fn add_empath_constraints(&mut self) {
        for ra in self.action_claims_of(Role::Empath) {
            self.add_empath_claim(ra.player.unwrap(), ra.number, ra.time.unwrap());
        }
    }

    fn empath_ping_registers_good(&mut self, player: usize, ping: usize, time: Time) -> Lit {
        // We assume a Spy will not be poisoned. The Empath goes after the
        // Imp, so the Spy check is against the next day's roles.
        let evil = self.starting_evil_var(ping);
        let spy = self.role_var(ping, Role::Spy, time + 1);
        self.model.reified_or(
            &[evil.negate(), spy],
            &format!(
                "empath_{}_registers_{}_good_{time}",
                self.game.player_name(player),
                self.game.player_name(ping)
            ),
        )
    }

    fn empath_ping_registers_evil(&mut self, player: usize, ping: usize, time: Time) -> Lit {
        let mut cases = vec![self.starting_evil_var(ping)];
        if self.is_role_possible(ping, Role::Recluse, time) {
            let recluse = self.role_var(ping, Role::Recluse, time);
            let poisoned = self.poisoned_var(ping, time);
            cases.push(self.model.reified_and(
                &[recluse, poisoned.negate()],
                &format!("healthy_recluse_{}_{time}", self.game.player_name(ping)),
            ));
        }
        self.model.reified_or(
            &cases,
            &format!(
                "empath_{}_registers_{}_evil_{time}",
                self.game.player_name(player),
                self.game.player_name(ping)
            ),
        )
    }

    fn add_empath_claim(&mut self, player: usize, number: i32, time: Time) {
        let [ping1, ping2] = self.game.alive_neighbors(player, time);
        let ping1_good = self.empath_ping_registers_good(player, ping1, time);
        let ping2_good = self.empath_ping_registers_good(player, ping2, time);
        let ping1_evil = self.empath_ping_registers_evil(player, ping1, time);
        let ping2_evil = self.empath_ping_registers_evil(player, ping2, time);
        // A healthy Recluse *may* register as evil; a healthy alive Spy
        // *may* register as good.
        let mut cases = vec![
            self.role_var(player, Role::Empath, time).negate(),
            self.poisoned_var(player, time),
        ];
        let names = (self.game.player_name(player), self.game.player_name(ping1), self.game.player_name(ping2));
        match number {
            0 => {
                cases.push(self.model.reified_and(
                    &[ping1_good, ping2_good],
                    &format!("empath_0_{}_on_{}_and_{}_{time}", names.0, names.1, names.2),
                ));
            }
            1 => {
                cases.push(self.model.reified_and(
                    &[ping1_good, ping2_evil],
                    &format!("empath_1_{}_on_{}_and_{}_{time}_case1", names.0, names.1, names.2),
                ));
                cases.push(self.model.reified_and(
                    &[ping1_evil, ping2_good],
                    &format!("empath_1_{}_on_{}_and_{}_{time}_case2", names.0, names.1, names.2),
                ));
            }
            2 => {
                cases.push(self.model.reified_and(
                    &[ping1_evil, ping2_evil],
                    &format!("empath_2_{}_on_{}_and_{}_{time}", names.0, names.1, names.2),
                ));
            }
            _ => {
                // The Empath is definitely lying, drunk or poisoned.
            }
        }
        self.model.add_or(&cases);
    }

    /// The Fortune Teller's yes/no answer about two picks, including the red
    /// herring and the healthy-Recluse false positive.
    pub(crate) fn add_fortune_teller_constraints(&mut self) {
        for ra in self.action_claims_of(Role::FortuneTeller) {
            self.add_fortune_teller_claim(
                ra.player.unwrap(),
                ra.players[0],
                ra.players[1],
                ra.yes,
                ra.time.unwrap(),
            );
        }
    }

    fn add_fortune_teller_claim(
        &mut self,
        player: usize,
        pick1: usize,
        pick2: usize,
        yes: bool,
        time: Time,
    ) {
        // The Fortune Teller goes after the Imp, so demon checks are against
        // the next day's roles.
        let mut yes_options = vec![
            self.role_var(pick1, Role::Imp, time + 1),
            self.red_herring_var(pick1),
            self.role_var(pick2, Role::Imp, time + 1),
            self.red_herring_var(pick2),
        ];
        if yes {
            // We can only infer Recluse possibilities from a yes answer.
            for pick in [pick1, pick2] {
                if self.is_role_possible(pick, Role::Recluse, time) {
                    let recluse = self.role_var(pick, Role::Recluse, time);
                    let poisoned = self.poisoned_var(pick, time);
                    yes_options.push(self.model.reified_and(
                        &[recluse, poisoned.negate()],
                        &format!("healthy_recluse_{}_{time}", self.game.player_name(pick)),
                    ));
                }
            }
        }
        let is_yes = self
            .model
            .reified_or(&yes_options, &format!("fortune_teller_yes_cases_{time}"));
        let cases = vec![
            self.role_var(player, Role::FortuneTeller, time).negate(),
            self.poisoned_var(player, time),
            if yes { is_yes } else { is_yes.negate() },
        ];
        self.model.add_or(&cases);
    }
}
