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

//! Constraints driven by public day events: Virgin procs and Slayer shots.

use data::core::time::Time;
use data::script::{townsfolk_roles, Role};

use crate::encoder::Encoder;

impl Encoder<'_> {
    /// Everyone who claimed Virgin, was alive, and had not been nominated
    /// before could trigger a proc when first nominated.
    pub(crate) fn add_virgin_constraints(&mut self) {
        let mut nominated = vec![false; self.game.num_players()];
        for n in self.game.nominations().to_vec() {
            let possible_proc = self.game.is_alive_at(n.nominee, n.time)
                && !nominated[n.nominee]
                && self.role_claims[n.nominee][n.time.index()] == Some(Role::Virgin);
            nominated[n.nominee] = true;
            if possible_proc {
                self.add_virgin_nomination(n.nominator, n.nominee, n.time, n.virgin_proc);
            }
        }
    }

    fn add_virgin_nomination(
        &mut self,
        nominator: usize,
        nominee: usize,
        time: Time,
        virgin_proc: bool,
    ) {
        let mut townsfolk_cases = self.collect_roles_for_player(
            time,
            nominator,
            &townsfolk_roles(self.game.script()),
            true,
        );
        if virgin_proc {
            // An observed proc may also be explained by a Spy registering as
            // a Townsfolk.
            townsfolk_cases.push(self.role_var(nominator, Role::Spy, time));
        }
        let proc_townsfolk = self.model.reified_sum(
            &townsfolk_cases,
            &format!(
                "{}_registers_townsfolk_to_virgin_{time}",
                self.game.player_name(nominator)
            ),
        );
        let virgin = self.role_var(nominee, Role::Virgin, time);
        let poisoned = self.poisoned_var(nominee, time);
        if virgin_proc {
            self.model.add_and(&[virgin, poisoned.negate(), proc_townsfolk]);
        } else {
            self.model.add_or(&[virgin.negate(), poisoned, proc_townsfolk.negate()]);
        }
    }

    /// Slayer shots are public role actions; the outcome constrains the
    /// shooter's and the target's roles.
    pub(crate) fn add_slayer_constraints(&mut self) {
        let shots: Vec<_> =
            self.game.role_actions_of_role(Role::Slayer).into_iter().cloned().collect();
        for ra in shots {
            let slayer = ra.player.unwrap();
            let target = ra.players[0];
            let time = ra.time.unwrap();
            if ra.yes {
                let mut cases = vec![
                    self.role_var(slayer, Role::Slayer, time),
                    self.poisoned_var(slayer, time).negate(),
                ];
                let imp = self.role_var(target, Role::Imp, time);
                if self.is_role_possible(target, Role::Recluse, time) {
                    let recluse = self.role_var(target, Role::Recluse, time);
                    let poisoned = self.poisoned_var(target, time);
                    let healthy_recluse = self.model.reified_and(
                        &[recluse, poisoned.negate()],
                        &format!("healthy_recluse_{}_{time}", self.game.player_name(target)),
                    );
                    cases.push(self.model.reified_or(
                        &[imp, healthy_recluse],
                        &format!(
                            "healthy_recluse_or_imp_{}_{time}",
                            self.game.player_name(target)
                        ),
                    ));
                } else {
                    cases.push(imp);
                }
                self.model.add_and(&cases);
            } else {
                let not_slayer = self.role_var(slayer, Role::Slayer, time).negate();
                let poisoned = self.poisoned_var(slayer, time);
                let not_imp = self.role_var(target, Role::Imp, time).negate();
                self.model.add_or(&[not_slayer, poisoned, not_imp]);
            }
        }
    }
}
