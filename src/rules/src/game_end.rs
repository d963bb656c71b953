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

//! Game-end constraints: every elapsed day without a victory announcement
//! must not have ended the game, and an announced victory must be
//! explainable.

use data::core::primitives::Team;
use data::core::time::Time;
use data::script::{demon_roles, Role};

use crate::encoder::Encoder;

impl Encoder<'_> {
    pub(crate) fn add_game_end_constraints(&mut self) {
        let now = self.game.now().unwrap();
        let mut time = Time::day(1);
        while time < now {
            self.add_no_victory_constraints(time);
            time += 2;
        }
        match self.game.winning_team() {
            Some(Team::Good) => self.add_good_won_constraints(),
            Some(Team::Evil) => self.add_evil_won_constraints(),
            None => self.add_no_victory_constraints(now),
        }
    }

    /// The given day did not end the game: the demon survived (or a Scarlet
    /// Woman could catch), no healthy-Mayor final-3 win, no executed healthy
    /// Saint.
    fn add_no_victory_constraints(&mut self, time: Time) {
        // Exactly one alive demon at the start of the day.
        let demons = self.collect_alive_roles(time, &demon_roles(self.game.script()));
        self.model.add_equality_sum(&demons, 1);
        let mut num_alive = self.game.num_alive_at(time);
        if num_alive <= 2 {
            self.model.add_contradiction(&format!(
                "{num_alive} players alive on {time}, yet game is not over"
            ));
            return;
        }
        let deaths = self.game.deaths(time);
        let mut cases = vec![];
        // No Mayor win.
        if num_alive - deaths.len() == 3 && self.game.execution(time).is_none() {
            // Any candidate Mayor was not the Mayor, or was poisoned.
            for mayor in self.alive_role_possibilities(Role::Mayor, time) {
                let is_mayor = self.role_var(mayor, Role::Mayor, time);
                let poisoned = self.poisoned_var(mayor, time);
                cases.push(self.model.reified_or(
                    &[is_mayor.negate(), poisoned],
                    &format!("not_healthy_mayor_{}_{time}", self.game.player_name(mayor)),
                ));
            }
        }
        let alive_sw = self.collect_alive_roles(time, &[Role::ScarletWoman]);
        let sw_alive = self.model.reified_or(&alive_sw, &format!("sw_alive_{time}"));
        for death in deaths {
            num_alive -= 1;
            // The death was not the demon's, or a Scarlet Woman could catch.
            let mut demon_kill_cases = vec![self.role_var(death, Role::Imp, time).negate()];
            if num_alive >= 4 {
                demon_kill_cases.push(sw_alive);
            }
            cases.push(self.model.reified_or(
                &demon_kill_cases,
                &format!(
                    "not_imp_{}_killed_no_sw_save_{time}",
                    self.game.player_name(death)
                ),
            ));
        }
        self.model.add_and(&cases);
        // Did not execute a healthy Saint.
        if let Some(death) = self.game.execution_death(time) {
            if self.is_role_possible(death, Role::Saint, time) {
                let saint = self.role_var(death, Role::Saint, time);
                let poisoned = self.poisoned_var(death, time);
                self.model.add_or(&[saint.negate(), poisoned]);
            }
        }
    }

    /// Good won today: a healthy-Mayor final-3 win, an Imp suicide with no
    /// catch, or a demon kill with no possible Scarlet Woman save.
    fn add_good_won_constraints(&mut self) {
        let time = self.game.now().unwrap();
        let mut cases = vec![];
        if self.game.num_alive_at(time) == 3 && self.game.execution(time).is_none() {
            for mayor in self.alive_role_possibilities(Role::Mayor, time) {
                let is_mayor = self.role_var(mayor, Role::Mayor, time);
                let poisoned = self.poisoned_var(mayor, time);
                cases.push(self.model.reified_and(
                    &[is_mayor, poisoned.negate()],
                    &format!("healthy_mayor_{}_{time}", self.game.player_name(mayor)),
                ));
            }
        }
        // The Imp committed suicide and nobody caught the starpass.
        let alive_imps = self.collect_roles(time, &[Role::Imp], true);
        cases.push(self.model.reified_and(
            &model::not_all(&alive_imps),
            &format!("imp_suicide_evil_lose_{time}"),
        ));
        let mut num_alive = self.game.num_alive_at(time);
        let alive_sw = self.collect_alive_roles(time, &[Role::ScarletWoman]);
        let sw_alive = self.model.reified_or(&alive_sw, &format!("sw_alive_{time}"));
        for death in self.game.deaths(time) {
            // Killed the demon with no possible Scarlet Woman proc.
            let mut demon_kill_cases = vec![self.role_var(death, Role::Imp, time)];
            if num_alive >= 5 {
                demon_kill_cases.push(sw_alive.negate());
            }
            cases.push(self.model.reified_and(
                &demon_kill_cases,
                &format!(
                    "imp_{}_killed_on_{num_alive}_no_sw_save_{time}",
                    self.game.player_name(death)
                ),
            ));
            num_alive -= 1;
        }
        self.model.add_or(&cases);
    }

    /// Evil won today: an executed healthy Saint, or the demon is alive with
    /// only two players remaining.
    fn add_evil_won_constraints(&mut self) {
        let time = self.game.now().unwrap();
        let num_alive = self.game.num_alive_at(time) - self.game.deaths(time).len();
        if let Some(death) = self.game.execution_death(time) {
            if num_alive > 2 {
                if !self.is_role_possible(death, Role::Saint, time) {
                    self.model.add_contradiction(&format!(
                        "No reason for Evil victory on {num_alive} alive at {time}"
                    ));
                    return;
                }
                let saint = self.role_var(death, Role::Saint, time);
                let poisoned = self.poisoned_var(death, time);
                self.model.add_and(&[saint, poisoned.negate()]);
                return;
            }
        }
        if num_alive > 2 {
            self.model.add_contradiction(&format!(
                "No execution and {num_alive} players alive after {time}, yet Evil wins"
            ));
            return;
        }
        let demons = self.collect_roles(time, &demon_roles(self.game.script()), true);
        self.model.add_equality_sum(&demons, 1);
    }
}
