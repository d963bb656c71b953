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

//! The enumeration driver: feeds the compiled clause set to the SAT engine
//! and enumerates every satisfying assignment, distinct in its projection
//! onto the current-role variables. Enumeration works by adding a blocking
//! clause per found solution, so the engine never revisits a world.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{eyre, Context};
use data::core::time::Time;
use data::game_states::game_state::GameState;
use data::script::{all_roles, demon_roles};
use rules::Encoder;
use tracing::{debug, info};
use utils::outcome::{Outcome, Value, OK};
use varisat::{ExtendFormula, Solver};

use crate::request::{Assumptions, SolverRequest};
use crate::response::{AliveDemonOption, SolverResponse, World};

/// Compiles a game into a model once and serves any number of solve calls
/// against it.
pub struct GameSolver<'a> {
    game: &'a GameState,
    encoder: Encoder<'a>,
}

impl<'a> GameSolver<'a> {
    pub fn new(game: &'a GameState) -> Value<Self> {
        Ok(Self { game, encoder: Encoder::new(game)? })
    }

    pub fn with_options(game: &'a GameState, prune_claim_bluffs: bool) -> Value<Self> {
        Ok(Self { game, encoder: Encoder::with_options(game, prune_claim_bluffs)? })
    }

    /// Solves the game and returns all valid worlds.
    pub fn solve(&mut self, request: &SolverRequest) -> Value<SolverResponse> {
        let now = self.game.now()?;
        let assumptions = self.assumption_literals(&request.assumptions)?;
        let num_players = self.game.num_players();
        let roles = all_roles(self.game.script());
        // We only care about the current (and starting) role assignments:
        // worlds are distinct in their current-role projection.
        let mut current_vars = vec![];
        let mut starting_vars = vec![];
        for i in 0..num_players {
            for &role in roles {
                current_vars.push(self.encoder.role_var(i, role, now));
                starting_vars.push(self.encoder.role_var(i, role, Time::night(1)));
            }
        }
        let cnf = self.encoder.model().to_cnf();
        if request.debug_mode {
            fs::create_dir_all("tmp/solutions").wrap_err("creating tmp/solutions")?;
            self.write_model(Path::new("tmp/model.txt"))?;
        }
        let mut solver = Solver::new();
        for clause in &cnf.clauses {
            let lits: Vec<varisat::Lit> =
                clause.iter().map(|&l| varisat::Lit::from_dimacs(l as isize)).collect();
            solver.add_clause(&lits);
        }
        for &lit in &assumptions {
            solver.add_clause(&[varisat::Lit::from_dimacs(dimacs(lit))]);
        }
        let mut result = SolverResponse::default();
        let mut num_worlds_per_demon: BTreeMap<String, usize> = BTreeMap::new();
        let mut solutions = 0usize;
        loop {
            let satisfiable = solver
                .solve()
                .map_err(|e| eyre!("solver error: {e}"))?;
            if !satisfiable {
                break;
            }
            let sat_model = solver.model().ok_or_else(|| eyre!("missing model"))?;
            let mut values = vec![false; cnf.num_vars + 1];
            for lit in &sat_model {
                let index = lit.to_dimacs().unsigned_abs() as usize;
                if index < values.len() {
                    values[index] = lit.is_positive();
                }
            }
            let value_of = |lit: model::Lit| values[lit.var().index() + 1] != lit.is_negated();
            solutions += 1;
            let world =
                self.world_from_assignment(&value_of, &current_vars, &starting_vars);
            let demon = self.solution_alive_demon(&value_of, now);
            let demon_name = match demon {
                Some(i) => self.game.player_name(i).to_owned(),
                None => "<Dead player>".to_owned(),
            };
            *num_worlds_per_demon.entry(demon_name).or_default() += 1;
            if request.debug_mode {
                let path = format!("tmp/solutions/world_{solutions}.json");
                fs::write(&path, serde_json::to_string_pretty(&world)?)
                    .wrap_err_with(|| format!("writing {path}"))?;
            }
            result.worlds.push(world);
            if solutions % 50 == 0 {
                debug!(solutions, ?num_worlds_per_demon, "enumeration progress");
            }
            if request.stop_after_first_solution {
                break;
            }
            // Block this world: some current-role variable must differ.
            let blocking: Vec<varisat::Lit> = current_vars
                .iter()
                .map(|&v| {
                    let d = dimacs(v);
                    varisat::Lit::from_dimacs(if value_of(v) { -d } else { d })
                })
                .collect();
            solver.add_clause(&blocking);
        }
        info!(solutions, ?num_worlds_per_demon, "enumeration finished");
        for (name, count) in num_worlds_per_demon {
            result.alive_demon_options.push(AliveDemonOption { name, count });
        }
        Ok(result)
    }

    /// Returns whether a valid world exists given all assumptions in the
    /// request.
    pub fn is_valid_world(&mut self, request: &SolverRequest) -> Value<bool> {
        let mut request = request.clone();
        request.stop_after_first_solution = true;
        Ok(!self.solve(&request)?.worlds.is_empty())
    }

    /// Writes the normalized form of every model constraint, one per line.
    pub fn write_model(&self, path: &Path) -> Outcome {
        let mut out = String::new();
        for (name, _) in self.encoder.model().constraints() {
            out.push_str(name);
            out.push('\n');
        }
        fs::write(path, out).wrap_err_with(|| format!("writing {}", path.display()))?;
        OK
    }

    /// Writes the model's variable table, one `index: name` per line.
    pub fn write_model_variables(&self, path: &Path) -> Outcome {
        let model = self.encoder.model();
        let mut out = String::new();
        for index in 0..model.num_vars() {
            out.push_str(&format!("{index}: {}\n", model.var_name(model::VarId::from_index(index))));
        }
        fs::write(path, out).wrap_err_with(|| format!("writing {}", path.display()))?;
        OK
    }

    fn world_from_assignment(
        &self,
        value_of: &dyn Fn(model::Lit) -> bool,
        current_vars: &[model::Lit],
        starting_vars: &[model::Lit],
    ) -> World {
        let roles = all_roles(self.game.script());
        let mut world = World::default();
        for i in 0..self.game.num_players() {
            let player = self.game.player_name(i);
            for (r, &role) in roles.iter().enumerate() {
                let index = i * roles.len() + r;
                if value_of(current_vars[index]) {
                    let previous = world.current_roles.insert(player.to_owned(), role);
                    if let Some(previous) = previous {
                        panic!(
                            "Double current role assignment for player {player}: found both \
                             {previous} and {role}"
                        );
                    }
                } else if value_of(starting_vars[index]) {
                    let previous = world.starting_roles.insert(player.to_owned(), role);
                    assert!(
                        previous.is_none(),
                        "Double starting role assignment for player {player}"
                    );
                }
            }
        }
        assert!(
            world.current_roles.len() == self.game.num_players(),
            "Not all players assigned current roles."
        );
        world
    }

    fn solution_alive_demon(
        &self,
        value_of: &dyn Fn(model::Lit) -> bool,
        now: Time,
    ) -> Option<usize> {
        for i in 0..self.game.num_players() {
            if !self.game.is_alive_index(i) {
                continue;
            }
            for role in demon_roles(self.game.script()) {
                if let Some(var) = self.encoder.find_role_var(i, role, now) {
                    if value_of(var) {
                        return Some(i);
                    }
                }
            }
        }
        None
    }

    fn assumption_literals(&mut self, assumptions: &Assumptions) -> Value<Vec<model::Lit>> {
        let now = self.game.now()?;
        let mut literals = vec![];
        for pr in &assumptions.current_roles {
            let i = self.game.player_index(&pr.player)?;
            let v = self.encoder.role_var(i, pr.role, now);
            literals.push(if pr.is_not { v.negate() } else { v });
        }
        for pr in &assumptions.starting_roles {
            let i = self.game.player_index(&pr.player)?;
            let v = self.encoder.role_var(i, pr.role, Time::night(1));
            literals.push(if pr.is_not { v.negate() } else { v });
        }
        for &role in &assumptions.roles_in_play {
            literals.push(self.encoder.role_in_play_var(role));
        }
        for &role in &assumptions.roles_not_in_play {
            literals.push(self.encoder.role_in_play_var(role).negate());
        }
        for player in &assumptions.is_evil {
            let i = self.game.player_index(player)?;
            literals.push(self.encoder.starting_evil_var(i));
        }
        for player in &assumptions.is_good {
            let i = self.game.player_index(player)?;
            literals.push(self.encoder.starting_evil_var(i).negate());
        }
        for p in &assumptions.poisoned_players {
            let i = self.game.player_index(&p.player)?;
            let night = Time::night(p.night);
            if self.encoder.find_poisoner_pick_var(i, night).is_none() && p.is_not {
                continue; // This assumption does not change anything.
            }
            let v = self.encoder.poisoned_var(i, night);
            literals.push(if p.is_not { v.negate() } else { v });
        }
        Ok(literals)
    }
}

fn dimacs(lit: model::Lit) -> isize {
    let index = lit.var().index() as isize + 1;
    if lit.is_negated() {
        -index
    } else {
        index
    }
}

/// Solves the game and returns all valid worlds.
pub fn solve(game: &GameState) -> Value<SolverResponse> {
    solve_with(game, &SolverRequest::default())
}

/// Solves the game using options from the request.
pub fn solve_with(game: &GameState, request: &SolverRequest) -> Value<SolverResponse> {
    GameSolver::with_options(game, request.prune_claim_bluffs)?.solve(request)
}

/// Returns whether a valid world exists.
pub fn is_valid_world(game: &GameState) -> Value<bool> {
    is_valid_world_with(game, &SolverRequest::default())
}

/// Returns whether a valid world exists given all assumptions in the request.
pub fn is_valid_world_with(game: &GameState, request: &SolverRequest) -> Value<bool> {
    GameSolver::with_options(game, request.prune_claim_bluffs)?.is_valid_world(request)
}
