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

use std::fs;

use color_eyre::eyre::{bail, Context, Result};
use data::core::primitives::{Perspective, Script};
use data::events::log::GameLog;
use data::game_states::game_state::GameState;
use data::script::Role;
use solver::{GameSolver, SolverRequest};
use tracing::info;

use crate::Args;

pub fn run(args: Args) -> Result<()> {
    let game = if args.sample_game {
        sample_game()?
    } else {
        let Some(path) = &args.game_log else {
            bail!("either --game-log or --sample-game is required");
        };
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        let log: GameLog = serde_json::from_str(&text)
            .wrap_err_with(|| format!("parsing {}", path.display()))?;
        GameState::from_log(&log)?
    };

    let request = match &args.solver_parameters {
        Some(path) => {
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<SolverRequest>(&text)
                .wrap_err_with(|| format!("parsing {}", path.display()))?
        }
        None => SolverRequest::default(),
    };

    let mut game_solver = GameSolver::with_options(&game, request.prune_claim_bluffs)?;
    if let Some(path) = &args.output_model {
        game_solver.write_model(path)?;
    }
    if let Some(path) = &args.output_model_vars {
        game_solver.write_model_variables(path)?;
    }

    let response = game_solver.solve(&request)?;
    info!(worlds = response.worlds.len(), "solve finished");
    println!("Found {} worlds", response.worlds.len());
    for option in &response.alive_demon_options {
        println!("  demon {}: {} worlds", option.name, option.count);
    }
    if let Some(path) = &args.output_solution {
        fs::write(path, serde_json::to_string_pretty(&response)?)
            .wrap_err_with(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

/// A small built-in game, handy for exercising the solver without a log
/// file: the Scarlet Woman's view of a 7-player game where the Slayer shoots
/// the Imp dead on day 1.
fn sample_game() -> Result<GameState> {
    let mut g = GameState::new(
        Perspective::Player,
        Script::TroubleBrewing,
        &["P1", "P2", "P3", "P4", "P5", "P6", "P7"],
    )?;
    g.add_night(1)?;
    g.add_shown_token("P5", Role::ScarletWoman)?;
    g.add_minion_info("P5", "P1", &[])?;
    g.add_day(1)?;
    g.add_claim_role("P1", Role::Soldier)?; // The Imp lies.
    g.add_claim_role("P2", Role::Mayor)?;
    g.add_claim_role("P3", Role::Chef)?;
    g.add_claim_role("P4", Role::Virgin)?;
    g.add_claim_role("P5", Role::FortuneTeller)?; // So does the Scarlet Woman.
    g.add_claim_role("P6", Role::Slayer)?;
    g.add_claim_role("P7", Role::Ravenkeeper)?;
    g.add_claim_action("P3", g.chef_info(0))?;
    let ft_action = g.fortune_teller_action("P1", "P2", false)?;
    g.add_claim_action("P5", ft_action)?;
    let shot = g.slayer_action("P1")?;
    g.add_role_action("P6", shot)?;
    g.add_death("P1")?;
    Ok(g)
}
