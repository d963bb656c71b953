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

//! Role continuity between adjacent phases. In Trouble Brewing roles only
//! ever change through the Scarlet Woman proc (across a day-to-night
//! boundary, after a day demon death) and the Imp starpass (across a
//! night-to-day boundary, after a self-kill).

use data::core::time::Time;
use data::script::{all_roles, good_roles, townsfolk_roles, Role};

use crate::encoder::Encoder;

impl Encoder<'_> {
    pub(crate) fn add_role_propagation_constraints(&mut self, time: Time) {
        if time >= self.game.now().unwrap() {
            return; // Nothing to propagate.
        }
        self.propagate_dead_roles(time, time + 1);
        if time.is_day() {
            self.add_scarlet_woman_proc_constraints(time);
        } else {
            self.add_imp_starpass_constraints(time);
        }
    }

    /// The Scarlet Woman becomes the Imp across the day-to-night boundary
    /// iff she is alive, the demon died during the day, and at least 4
    /// players remain alive afterwards.
    fn add_scarlet_woman_proc_constraints(&mut self, time: Time) {
        let script = self.game.script();
        let deaths = self.game.deaths(time); // Chronological day deaths.
        // How many of the day deaths could have triggered the proc.
        let num_candidates = self.game.num_alive_at(time) as i64 - 4;
        let mut demon_candidates = vec![];
        for (i, &death) in deaths.iter().enumerate() {
            if (i as i64) < num_candidates && self.game.is_role_possible(death, Role::Imp, time)
            {
                demon_candidates.push(death);
            }
        }
        if demon_candidates.is_empty() {
            // The Scarlet Woman cannot trigger, so no role changes.
            self.propagate_alive_roles(time, time + 1, &all_roles(script).to_vec());
            return;
        }
        let mut sw_candidates = vec![];
        for i in 0..self.game.num_players() {
            if self.game.is_alive_at(i, time + 1)
                && self.game.is_role_possible(i, Role::ScarletWoman, time)
            {
                sw_candidates.push(i);
            }
        }
        if sw_candidates.is_empty() {
            self.propagate_alive_roles(time, time + 1, &all_roles(script).to_vec());
            return;
        }

        // The Scarlet Woman can trigger and turn into the Imp. Everything
        // except her role and the Imp's propagates unchanged.
        self.propagate_alive_roles(time, time + 1, &good_roles(script));
        self.propagate_alive_roles(
            time,
            time + 1,
            &[Role::Poisoner, Role::Spy, Role::Baron],
        );
        let dead_demon_cases: Vec<_> = demon_candidates
            .iter()
            .map(|&i| self.role_var(i, Role::Imp, time))
            .collect();
        let imp_died =
            self.model.reified_or(&dead_demon_cases, &format!("demon_died_{time}"));
        for i in 0..self.game.num_players() {
            if !self.game.is_alive_at(i, time) {
                continue;
            }
            if !sw_candidates.contains(&i) {
                self.propagate_roles_for_player(
                    i,
                    time,
                    time + 1,
                    &[Role::ScarletWoman, Role::Imp],
                );
                continue;
            }
            let day_imp = self.role_var(i, Role::Imp, time);
            let day_sw = self.role_var(i, Role::ScarletWoman, time);
            let night_imp = self.role_var(i, Role::Imp, time + 1);
            let night_sw = self.role_var(i, Role::ScarletWoman, time + 1);
            // No proc: roles propagate.
            self.model.add_implies_eq(imp_died.negate(), day_imp, night_imp);
            self.model.add_implies_eq(imp_died.negate(), day_sw, night_sw);
            // Otherwise the Scarlet Woman turns into the Imp.
            self.model.add_implies(imp_died, night_sw.negate());
            self.model.add_implies_eq(imp_died, day_sw, night_imp);
        }
    }

    /// A self-killed Imp passes the demon role across the night-to-day
    /// boundary to a living minion or healthy Recluse. With 5 or more alive,
    /// a living Scarlet Woman must be the catcher.
    fn add_imp_starpass_constraints(&mut self, time: Time) {
        let script = self.game.script();
        let mut dead_imp_candidate = None;
        for i in self.game.deaths(time) {
            if self.game.is_role_possible(i, Role::Imp, time) {
                dead_imp_candidate = Some(i); // At most one night death in TB.
            }
        }
        let Some(dead_imp) = dead_imp_candidate else {
            // No possible starpass, all roles propagate.
            self.propagate_alive_roles(time, time + 1, &all_roles(script).to_vec());
            return;
        };
        let mut catch_candidates = vec![];
        for i in 0..self.game.num_players() {
            if self.game.shown_token_of(i, time) == Some(Role::Imp)
                && self.game.shown_token_of(i, time - 1) != Some(Role::Imp)
            {
                // We know there was a starpass, and we found who caught it.
                for j in 0..self.game.num_players() {
                    if j != i && self.game.is_alive_at(j, time) {
                        self.propagate_roles_for_player(
                            j,
                            time,
                            time + 1,
                            &all_roles(script).to_vec(),
                        );
                    }
                }
                let was_imp = self.role_var(dead_imp, Role::Imp, time);
                self.model.add_equal_const(was_imp, true);
                let caught = self.role_var(i, Role::Imp, time + 1);
                self.model.add_equal_const(caught, true);
                return;
            }
            if self.game.is_alive_at(i, time + 1)
                && self.game.is_role_possible(i, Role::Imp, time + 1)
            {
                catch_candidates.push(i);
            }
        }
        if catch_candidates.is_empty() {
            self.propagate_alive_roles(time, time + 1, &all_roles(script).to_vec());
            return;
        }
        // All good roles except the Recluse always propagate from night 1.
        self.propagate_alive_roles(Time::night(1), time + 1, &townsfolk_roles(script));
        self.propagate_alive_roles(
            Time::night(1),
            time + 1,
            &[Role::Butler, Role::Drunk, Role::Saint],
        );
        // The minions and the Recluse can catch a starpass.
        let starpass = self.role_var(dead_imp, Role::Imp, time);

        let mut catch_cases = vec![];
        let mut eligible = vec![];
        let num_alive = self.game.num_alive_at(time);
        for &i in &catch_candidates {
            let night_imp = self.role_var(i, Role::Imp, time);
            let day_imp = self.role_var(i, Role::Imp, time + 1);
            self.model.add_implies(night_imp, day_imp);
            let catch = self.model.reified_and(
                &[night_imp.negate(), day_imp],
                &format!("{}_catches_starpass_{time}", self.game.player_name(i)),
            );
            catch_cases.push(catch);
            if self.game.shown_token_of(i, time) == Some(Role::Imp)
                && self.game.shown_token_of(i, time - 1) != Some(Role::Imp)
            {
                self.model.add_equal_const(catch, true);
            }
            // The Scarlet Woman must catch the starpass with 5 or more
            // living players.
            if num_alive >= 5 {
                let sw = self.role_var(i, Role::ScarletWoman, time);
                self.model.add_implies_or(starpass, &[sw.negate(), catch]);
            }
            let healthy_recluse = if self.role_claims[i][time.index()] == Some(Role::Imp) {
                let recluse = self.role_var(i, Role::Recluse, time);
                let picked = self.poisoner_pick_var(i, time);
                self.model.reified_and(
                    &[recluse, picked.negate()],
                    &format!("healthy_recluse_{}_{time}", self.game.player_name(i)),
                )
            } else {
                self.model.false_lit()
            };
            for role in
                [Role::Poisoner, Role::Spy, Role::ScarletWoman, Role::Baron, Role::Recluse]
            {
                let night_role = self.role_var(i, role, time);
                let day_role = self.role_var(i, role, time + 1);
                let is_eligible =
                    if role == Role::Recluse { healthy_recluse } else { night_role };
                eligible.push(is_eligible);
                self.model.add_implies_eq(starpass.negate(), night_role, day_role);
                self.model.add_or(&[
                    starpass.negate(),
                    is_eligible.negate(),
                    day_role,
                    day_imp,
                ]);
            }
        }
        for i in 0..self.game.num_players() {
            if !catch_candidates.contains(&i) && self.game.is_alive_at(i, time) {
                self.propagate_roles_for_player(
                    i,
                    time,
                    time + 1,
                    &[
                        Role::Imp,
                        Role::Poisoner,
                        Role::Spy,
                        Role::ScarletWoman,
                        Role::Baron,
                        Role::Recluse,
                    ],
                );
            }
        }
        // A starpass means exactly one catcher, or nobody was eligible.
        let nobody_eligible = self.model.reified_and(
            &model::not_all(&eligible),
            &format!("nobody_eligible_for_starpass_catch_{time}"),
        );
        catch_cases.push(nobody_eligible);
        self.model.add_implies_sum(starpass, &catch_cases, 1);
    }
}
