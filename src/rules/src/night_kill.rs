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

//! Night mechanics: Poisoner picks, the Spy's grimoire, and the Imp's kill
//! resolved against Soldier, Monk protection and Mayor bounces.

use data::core::time::Time;
use data::events::role_action::RoleAction;
use data::script::{demon_roles, Role};

use crate::encoder::Encoder;

impl Encoder<'_> {
    /// Observed Poisoner picks (storyteller or Poisoner perspective). The
    /// generic per-night pick constraints live in the pre-solve pass, which
    /// runs once all pick variables exist.
    pub(crate) fn add_poisoner_constraints(&mut self) {
        let picks: Vec<_> =
            self.game.role_actions_of_role(Role::Poisoner).into_iter().cloned().collect();
        for ra in picks {
            let target = ra.players[0];
            let time = ra.time.unwrap();
            let pick = self.poisoner_pick_var(target, time);
            self.model.add_equal_const(pick, true);
            // If there was a night death and the pick is alive, the pick
            // cannot be a living demon: the Poisoner goes before the demon,
            // and in Trouble Brewing there is no other source of night
            // deaths.
            if !self.game.deaths(time).is_empty() && self.game.is_alive_at(target, time) {
                for role in demon_roles(self.game.script()) {
                    if self.game.is_role_possible(target, role, time) {
                        let var = self.role_var(target, role, time);
                        self.model.add_equal_const(var, false);
                    }
                }
            }
        }
    }

    /// The Spy's self-observed grimoire pins the reported day roles. We
    /// assume the Spy cannot be poisoned, so the snapshot is accurate.
    pub(crate) fn add_spy_constraints(&mut self) {
        let infos: Vec<_> =
            self.game.role_actions_of_role(Role::Spy).into_iter().cloned().collect();
        for ra in infos {
            let time = ra.time.unwrap();
            let Some(grimoire) = &ra.grimoire else {
                continue;
            };
            for entry in &grimoire.entries {
                let role = if entry.is_drunk { Role::Drunk } else { entry.role };
                let var = self.role_var(entry.player, role, time + 1);
                self.model.add_equal_const(var, true);
            }
        }
    }

    /// Night kills from night 2 on. An observed Imp action overrides any
    /// claims; absent one, the observable deaths (or their absence) still
    /// constrain the night.
    pub(crate) fn add_imp_constraints(&mut self) {
        let now = self.game.now().unwrap();
        if now <= Time::night(2) {
            return; // Day 2 is the first day we might get an Imp kill.
        }
        let mut actions_by_night: Vec<Option<RoleAction>> = vec![None; now.count as usize];
        for ra in self.game.role_actions_of_role(Role::Imp) {
            actions_by_night[ra.time.unwrap().index()] = Some(ra.clone());
        }
        let mut time = Time::night(2);
        while time < now {
            self.add_imp_night_constraints(time, actions_by_night[time.index()].clone());
            time += 2;
        }
    }

    fn add_imp_night_constraints(&mut self, time: Time, imp_action: Option<RoleAction>) {
        if let Some(ra) = imp_action {
            self.add_imp_action_constraints(&ra);
            return;
        }
        let deaths = self.game.deaths(time);
        if let Some(&imp_kill) = deaths.first() {
            // The victim was not a healthy Soldier and not healthy-Monk
            // protected.
            if self.is_role_possible(imp_kill, Role::Soldier, time) {
                let soldier = self.role_var(imp_kill, Role::Soldier, time);
                let picked = self.poisoner_pick_var(imp_kill, time);
                self.model.add_or(&[soldier.negate(), picked]);
            }
            for monk in self.possible_monk_protecting(imp_kill, time) {
                let is_monk = self.role_var(monk, Role::Monk, time);
                let picked = self.poisoner_pick_var(monk, time);
                self.model.add_or(&[is_monk.negate(), picked]);
            }
            return;
        }
        // We can only deduce info from a no-death night if no death ever
        // occurred: the Imp's choice is mandatory, and with nobody dead
        // there is no sink kill.
        if self.game.num_alive_at(time) < self.game.num_players() {
            return;
        }
        // A healthy Monk, Soldier, or alive Poisoner must explain the quiet
        // night.
        let mut cases = vec![self.alive_role_var(Role::Poisoner, time)];
        for role in [Role::Soldier, Role::Monk] {
            for i in self.alive_role_possibilities(role, time) {
                let is_role = self.role_var(i, role, time);
                let picked = self.poisoner_pick_var(i, time);
                cases.push(self.model.reified_and(
                    &[is_role, picked.negate()],
                    &format!("healthy_{role}_{}_{time}", self.game.player_name(i)),
                ));
            }
        }
        self.model.add_or(&cases);
    }

    fn add_imp_action_constraints(&mut self, ra: &RoleAction) {
        let time = ra.time.unwrap();
        let player = ra.player.unwrap();
        let target = ra.players[0];
        let is_imp = self.role_var(player, Role::Imp, time);
        self.model.add_equal_const(is_imp, true);
        // "The Imp was not poisoned" is handled by the Poisoner constraints.
        let deaths = self.game.deaths(time);
        let imp_kill = deaths.first().copied();
        if !self.game.is_alive_at(target, time) {
            // A sink kill on a dead player.
            if let Some(imp_kill) = imp_kill {
                self.model.add_contradiction(&format!(
                    "Imp {} chose to kill a dead player {} on {time}, but {} died.",
                    self.game.player_name(player),
                    self.game.player_name(target),
                    self.game.player_name(imp_kill)
                ));
            }
            return;
        }
        if imp_kill == Some(target) {
            // The kill worked: the target was not a healthy Soldier and not
            // healthy-Monk protected.
            if self.is_role_possible(target, Role::Soldier, time) {
                let soldier = self.role_var(target, Role::Soldier, time);
                let picked = self.poisoner_pick_var(target, time);
                self.model.add_or(&[soldier.negate(), picked]);
            }
            for monk in self.possible_monk_protecting(target, time) {
                let is_monk = self.role_var(monk, Role::Monk, time);
                let picked = self.poisoner_pick_var(monk, time);
                self.model.add_or(&[is_monk.negate(), picked]);
            }
            return;
        }
        if imp_kill.is_none() {
            // The kill failed entirely.
            let mut cases = vec![self.poisoner_pick_var(player, time)];
            if self.is_role_possible(target, Role::Soldier, time) {
                let soldier = self.role_var(target, Role::Soldier, time);
                let picked = self.poisoner_pick_var(target, time);
                cases.push(self.model.reified_and(
                    &[soldier, picked.negate()],
                    &format!("healthy_SOLDIER_{}_{time}", self.game.player_name(target)),
                ));
            }
            for monk in self.possible_monk_protecting(target, time) {
                let is_monk = self.role_var(monk, Role::Monk, time);
                let picked = self.poisoner_pick_var(monk, time);
                cases.push(self.model.reified_and(
                    &[is_monk, picked.negate()],
                    &format!("healthy_MONK_{}_{time}", self.game.player_name(monk)),
                ));
            }
            // Or the target was a healthy Mayor, not healthy-Monk protected,
            // and the kill bounced to nobody.
            if self.is_role_possible(target, Role::Mayor, time) {
                let mayor = self.role_var(target, Role::Mayor, time);
                let target_picked = self.poisoner_pick_var(target, time);
                let mut mayor_bounce_no_kill = vec![mayor, target_picked.negate()];
                for monk in self.possible_monk_protecting(target, time) {
                    let is_monk = self.role_var(monk, Role::Monk, time);
                    let picked = self.poisoner_pick_var(monk, time);
                    mayor_bounce_no_kill.push(self.model.reified_or(
                        &[is_monk.negate(), picked],
                        &format!("not_healthy_MONK_{}_{time}", self.game.player_name(monk)),
                    ));
                }
                if self.game.num_alive_at(time) == self.game.num_players() {
                    // With nobody dead, a no-kill bounce needs a live
                    // protected target somewhere.
                    let mut no_kill_cases = vec![];
                    for i in 0..self.game.num_players() {
                        if self.is_role_possible(i, Role::Soldier, time) {
                            let soldier = self.role_var(i, Role::Soldier, time);
                            let picked = self.poisoner_pick_var(i, time);
                            no_kill_cases.push(self.model.reified_and(
                                &[soldier, picked.negate()],
                                &format!(
                                    "healthy_SOLDIER_{}_{time}",
                                    self.game.player_name(i)
                                ),
                            ));
                        }
                        for monk in self.possible_monk_protecting(i, time) {
                            let is_monk = self.role_var(monk, Role::Monk, time);
                            let picked = self.poisoner_pick_var(monk, time);
                            no_kill_cases.push(self.model.reified_and(
                                &[is_monk, picked.negate()],
                                &format!("healthy_MONK_{}_{time}", self.game.player_name(monk)),
                            ));
                        }
                    }
                    mayor_bounce_no_kill.push(self.model.reified_or(
                        &no_kill_cases,
                        &format!(
                            "mayor_{}_bounce_no_kill_cases_{time}",
                            self.game.player_name(target)
                        ),
                    ));
                }
                cases.push(self.model.reified_and(
                    &mayor_bounce_no_kill,
                    &format!(
                        "mayor_{}_bounce_no_kill_{time}",
                        self.game.player_name(target)
                    ),
                ));
            }
            self.model.add_or(&cases);
            return;
        }
        // The kill bounced: the target is a healthy Mayor, not healthy-Monk
        // protected, and the actual victim satisfies the usual constraints.
        if self.is_role_possible(target, Role::Mayor, time) {
            let mayor = self.role_var(target, Role::Mayor, time);
            self.model.add_equal_const(mayor, true);
            let picked = self.poisoner_pick_var(target, time);
            self.model.add_equal_const(picked, false);
            for monk in self.possible_monk_protecting(target, time) {
                let is_monk = self.role_var(monk, Role::Monk, time);
                let picked = self.poisoner_pick_var(monk, time);
                self.model.add_or(&[is_monk.negate(), picked]);
            }
            let victim = imp_kill.unwrap();
            if self.is_role_possible(victim, Role::Soldier, time) {
                let soldier = self.role_var(victim, Role::Soldier, time);
                let picked = self.poisoner_pick_var(victim, time);
                self.model.add_or(&[soldier.negate(), picked]);
            }
            for monk in self.possible_monk_protecting(victim, time) {
                let is_monk = self.role_var(monk, Role::Monk, time);
                let picked = self.poisoner_pick_var(monk, time);
                self.model.add_or(&[is_monk.negate(), picked]);
            }
            return;
        }
        self.model.add_contradiction(&format!(
            "No possible reason for Imp kill of {} to bounce to {}",
            self.game.player_name(target),
            self.game.player_name(imp_kill.unwrap())
        ));
    }
}
