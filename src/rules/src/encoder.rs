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

//! Compiles a fully claimed game state into a boolean constraint model.
//!
//! The compilation relies on a few simplifying assumptions: the game is
//! fully claimed (akin to a final-3 situation, where every player's most
//! recent claims are either honest or evil); minions are never poisoned
//! (poisoning a fellow minion is strictly bad for evil); demon bluffs are
//! not shown to the Drunk; and the solve happens at daytime, after all
//! pertinent storyteller announcements have been made.

use std::collections::HashMap;

use color_eyre::eyre::ensure;
use data::core::time::Time;
use data::events::role_action::RoleAction;
use data::game_states::game_state::GameState;
use data::script::{all_roles, Role};
use model::{Lit, Model};
use tracing::debug;
use utils::outcome::Value;

/// The rule encoder: holds a read-only view of the game and exclusive
/// ownership of the constraint model it populates. Construction runs the
/// full compilation; afterwards the model only grows through lazy variable
/// creation when assumption literals are collected.
pub struct Encoder<'a> {
    pub(crate) game: &'a GameState,
    pub(crate) model: Model,
    /// Per player and night, the effective role claim.
    pub(crate) role_claims: Vec<Vec<Option<Role>>>,
    /// Per claimed role and night, the matching role-action claims.
    pub(crate) action_claims: HashMap<Role, Vec<Vec<RoleAction>>>,
    /// Opt-in: skip encoding info claims the perspective already knows to be
    /// bluffs. Benchmark before enabling; this has been observed to slow
    /// enumeration down by an order of magnitude on some games.
    pub(crate) prune_claim_bluffs: bool,
}

impl<'a> Encoder<'a> {
    pub fn new(game: &'a GameState) -> Value<Self> {
        Self::with_options(game, false)
    }

    pub fn with_options(game: &'a GameState, prune_claim_bluffs: bool) -> Value<Self> {
        let now = game.now()?;
        ensure!(now.is_day(), "Can only solve during the day");
        game.is_fully_claimed()?;
        let role_claims = game.role_claims_by_night();
        for (i, claims) in role_claims.iter().enumerate() {
            for d in 1..claims.len() {
                ensure!(
                    claims[d - 1] == claims[d]
                        || (claims[d - 1] == Some(Role::Recluse)
                            && claims[d] == Some(Role::Imp)),
                    "Inconsistent claims: {} claimed to be {} on day {} and {} on {}",
                    game.player_name(i),
                    role_name(claims[d - 1]),
                    d,
                    role_name(claims[d]),
                    d + 1
                );
            }
        }
        let action_claims = game.role_action_claims_by_night();
        let mut encoder = Self {
            game,
            model: Model::new(),
            role_claims,
            action_claims,
            prune_claim_bluffs,
        };
        encoder.compile()?;
        Ok(encoder)
    }

    fn compile(&mut self) -> Value<()> {
        self.add_role_setup_constraints();
        self.add_shown_token_constraints();
        self.add_role_claims_constraints();
        for role in all_roles(self.game.script()) {
            self.add_role_constraints(*role)?;
        }
        self.add_game_end_constraints();
        self.add_presolve_constraints();
        debug!(
            variables = self.model.num_vars(),
            constraints = self.model.constraints().count(),
            "compiled game model"
        );
        Ok(())
    }

    /// Every role has exactly one constraint adder. Roles without one of
    /// their own are covered by another group: the Monk, Soldier and Mayor
    /// by the Imp night-kill logic, the Drunk by every Townsfolk role, the
    /// Recluse and Spy by the info-role false triggers, the Saint by the
    /// game-end logic, the Scarlet Woman by role propagation, and the Baron
    /// by the role setup counts. The Butler's master-voting restriction is
    /// not encoded.
    fn add_role_constraints(&mut self, role: Role) -> Value<()> {
        match role {
            Role::Washerwoman
            | Role::Librarian
            | Role::Investigator
            | Role::Undertaker
            | Role::Ravenkeeper => self.add_learning_role_info_constraints(role),
            Role::Chef => self.add_chef_constraints(),
            Role::Empath => self.add_empath_constraints(),
            Role::FortuneTeller => self.add_fortune_teller_constraints(),
            Role::Virgin => self.add_virgin_constraints(),
            Role::Slayer => self.add_slayer_constraints(),
            Role::Poisoner => self.add_poisoner_constraints(),
            Role::Spy => self.add_spy_constraints(),
            Role::Imp => self.add_imp_constraints(),
            Role::Monk
            | Role::Soldier
            | Role::Mayor
            | Role::Butler
            | Role::Drunk
            | Role::Recluse
            | Role::Saint
            | Role::ScarletWoman
            | Role::Baron => {}
        }
        Ok(())
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    // Variable accessors, cached by the model.

    pub fn role_var(&mut self, player: usize, role: Role, time: Time) -> Lit {
        let name = format!("role_{}_{role}_{time}", self.game.player_name(player));
        self.model.new_var(&name)
    }

    /// Night 1 only.
    pub fn shown_token_var(&mut self, player: usize, role: Role) -> Lit {
        let name = format!("shown_token_{}_{role}", self.game.player_name(player));
        self.model.new_var(&name)
    }

    pub(crate) fn red_herring_var_name(&self, player: usize) -> String {
        format!("red_herring_{}", self.game.player_name(player))
    }

    pub fn red_herring_var(&mut self, player: usize) -> Lit {
        let name = self.red_herring_var_name(player);
        self.model.new_var(&name)
    }

    pub(crate) fn poisoner_pick_var_name(&self, player: usize, time: Time) -> String {
        format!("poisoner_pick_{}_night_{}", self.game.player_name(player), time.count)
    }

    pub fn poisoner_pick_var(&mut self, player: usize, time: Time) -> Lit {
        let name = self.poisoner_pick_var_name(player, time);
        self.model.new_var(&name)
    }

    pub fn find_poisoner_pick_var(&self, player: usize, time: Time) -> Option<Lit> {
        self.model.find_var(&self.poisoner_pick_var_name(player, time))
    }

    pub fn find_role_var(&self, player: usize, role: Role, time: Time) -> Option<Lit> {
        self.model
            .find_var(&format!("role_{}_{role}_{time}", self.game.player_name(player)))
    }

    /// The Poisoner picked the player that night and the poison held: i.e.
    /// the Poisoner was not the night's victim.
    pub fn poisoned_var(&mut self, player: usize, time: Time) -> Lit {
        let night = if time.is_day() { time - 1 } else { time };
        let picked = self.poisoner_pick_var(player, night);
        let night_deaths = self.game.deaths(night);
        if night_deaths.is_empty() {
            return picked;
        }
        // At most one night death in Trouble Brewing.
        let not_poisoner = self.role_var(night_deaths[0], Role::Poisoner, night).negate();
        let name = format!("poisoned_{}_{night}", self.game.player_name(player));
        self.model.reified_and(&[not_poisoner, picked], &name)
    }

    /// Some player holds the role on night 1.
    pub fn role_in_play_var(&mut self, role: Role) -> Lit {
        let lits: Vec<Lit> = (0..self.game.num_players())
            .map(|i| self.role_var(i, role, Time::night(1)))
            .collect();
        self.model.reified_sum(&lits, &format!("in_play_{role}"))
    }

    /// The player started the game evil.
    pub fn starting_evil_var(&mut self, player: usize) -> Lit {
        let lits: Vec<Lit> = data::script::evil_roles(self.game.script())
            .into_iter()
            .map(|role| self.role_var(player, role, Time::night(1)))
            .collect();
        let name = format!("starting_evil_{}", self.game.player_name(player));
        self.model.reified_sum(&lits, &name)
    }

    /// Some player alive at `time` holds the role.
    pub fn alive_role_var(&mut self, role: Role, time: Time) -> Lit {
        let lits = self.collect_alive_roles(time, &[role]);
        self.model.reified_sum(&lits, &format!("alive_{role}_{time}"))
    }

    // Literal collection helpers.

    pub(crate) fn collect_roles_for_player(
        &mut self,
        time: Time,
        player: usize,
        roles: &[Role],
        only_alive: bool,
    ) -> Vec<Lit> {
        if only_alive && !self.game.is_alive_at(player, time) {
            return vec![];
        }
        roles.iter().map(|&role| self.role_var(player, role, time)).collect()
    }

    pub(crate) fn collect_roles(
        &mut self,
        time: Time,
        roles: &[Role],
        only_alive: bool,
    ) -> Vec<Lit> {
        let mut result = vec![];
        for i in 0..self.game.num_players() {
            result.extend(self.collect_roles_for_player(time, i, roles, only_alive));
        }
        result
    }

    pub(crate) fn collect_alive_roles(&mut self, time: Time, roles: &[Role]) -> Vec<Lit> {
        self.collect_roles(time, roles, true)
    }

    // Possibility filters.

    /// The perspective-based filter, additionally requiring good roles to be
    /// claimed: a good player who has not claimed a role cannot hold it.
    pub(crate) fn is_role_possible(&self, player: usize, role: Role, time: Time) -> bool {
        self.game.is_role_possible(player, role, time)
            && (!role.is_good() || self.role_claims[player][time.index()] == Some(role))
    }

    pub(crate) fn is_role_in_play_possible(&self, role: Role) -> bool {
        !self.alive_role_possibilities(role, Time::night(1)).is_empty()
    }

    pub(crate) fn alive_role_possibilities(&self, role: Role, time: Time) -> Vec<usize> {
        (0..self.game.num_players())
            .filter(|&i| {
                self.game.is_alive_at(i, time) && self.is_role_possible(i, role, time)
            })
            .collect()
    }

    /// All players who claimed to have Monk-protected the target that night.
    pub(crate) fn possible_monk_protecting(&self, target: usize, time: Time) -> Vec<usize> {
        let Some(nights) = self.action_claims.get(&Role::Monk) else {
            return vec![];
        };
        nights[time.index()]
            .iter()
            .filter(|ra| {
                ra.players[0] == target
                    && self.is_role_possible(ra.player.unwrap(), Role::Monk, time)
            })
            .map(|ra| ra.player.unwrap())
            .collect()
    }

    // Role propagation.

    pub(crate) fn propagate_roles_for_player(
        &mut self,
        player: usize,
        from: Time,
        to: Time,
        roles: &[Role],
    ) {
        for &role in roles {
            let a = self.role_var(player, role, from);
            let b = self.role_var(player, role, to);
            self.model.add_equal(a, b);
        }
    }

    pub(crate) fn propagate_alive_roles(&mut self, from: Time, to: Time, roles: &[Role]) {
        for i in 0..self.game.num_players() {
            if self.game.is_alive_at(i, from) {
                self.propagate_roles_for_player(i, from, to, roles);
            }
        }
    }

    /// In Trouble Brewing, the dead don't change roles.
    pub(crate) fn propagate_dead_roles(&mut self, from: Time, to: Time) {
        let roles = all_roles(self.game.script()).to_vec();
        for i in 0..self.game.num_players() {
            if !self.game.is_alive_at(i, from) {
                self.propagate_roles_for_player(i, from, to, &roles);
            }
        }
    }

    pub(crate) fn action_claims_of(&self, role: Role) -> Vec<RoleAction> {
        self.action_claims
            .get(&role)
            .map(|nights| nights.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }
}

pub(crate) fn role_name(role: Option<Role>) -> String {
    role.map(|r| r.to_string()).unwrap_or_else(|| "no role".to_owned())
}
