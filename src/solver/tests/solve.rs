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

use std::collections::BTreeMap;

use color_eyre::Result;
use data::core::primitives::{Perspective, Script, Team};
use data::core::time::Time;
use data::game_states::game_state::GameState;
use data::script::Role::{self, *};
use solver::{
    is_valid_world, is_valid_world_with, solve, solve_with, GameSolver, SolverRequestBuilder,
    SolverResponse,
};

fn make_players(num_players: usize) -> Vec<String> {
    (1..=num_players).map(|i| format!("P{i}")).collect()
}

fn new_game(perspective: Perspective, num_players: usize) -> GameState {
    GameState::new(perspective, Script::TroubleBrewing, &make_players(num_players)).unwrap()
}

fn world(roles: &[(&str, Role)]) -> BTreeMap<String, Role> {
    roles.iter().map(|(player, role)| ((*player).to_owned(), *role)).collect()
}

#[track_caller]
fn expect_worlds(response: &SolverResponse, expected: &[&[(&str, Role)]]) {
    let mut actual: Vec<BTreeMap<String, Role>> =
        response.worlds.iter().map(|w| w.current_roles.clone()).collect();
    let mut expected: Vec<BTreeMap<String, Role>> =
        expected.iter().map(|roles| world(roles)).collect();
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}

#[test]
fn storyteller_setup_5_players_no_baron() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 5);
    g.set_roles(&[Imp, Monk, Spy, Mayor, Virgin])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Imp, Monk, Spy, Mayor, Virgin])?;
    g.add_day(1)?;
    g.add_role_claims(&[Slayer, Monk, Ravenkeeper, Mayor, Virgin], "P1")?;
    expect_worlds(
        &solve(&g)?,
        &[&[("P1", Imp), ("P2", Monk), ("P3", Spy), ("P4", Mayor), ("P5", Virgin)]],
    );
    Ok(())
}

#[test]
fn storyteller_setup_5_players_baron() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 5);
    g.set_roles(&[Imp, Saint, Baron, Recluse, Virgin])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Imp, Saint, Baron, Recluse, Virgin])?;
    g.add_day(1)?;
    g.add_role_claims(&[Slayer, Saint, Ravenkeeper, Recluse, Virgin], "P1")?;
    expect_worlds(
        &solve(&g)?,
        &[&[("P1", Imp), ("P2", Saint), ("P3", Baron), ("P4", Recluse), ("P5", Virgin)]],
    );
    Ok(())
}

#[test]
fn storyteller_setup_6_players_no_baron() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 6);
    g.set_roles(&[Drunk, Slayer, Monk, ScarletWoman, Soldier, Imp])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Ravenkeeper, Slayer, Monk, ScarletWoman, Soldier, Imp])?;
    g.add_day(1)?;
    g.add_role_claims(&[Ravenkeeper, Slayer, Monk, Monk, Soldier, Virgin], "P1")?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Drunk),
            ("P2", Slayer),
            ("P3", Monk),
            ("P4", ScarletWoman),
            ("P5", Soldier),
            ("P6", Imp),
        ]],
    );
    Ok(())
}

#[test]
fn storyteller_setup_6_players_baron() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 6);
    g.set_roles(&[Drunk, Recluse, Monk, Baron, Saint, Imp])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Mayor, Recluse, Monk, Baron, Saint, Imp])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Recluse, Monk, Monk, Saint, Virgin], "P1")?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Drunk),
            ("P2", Recluse),
            ("P3", Monk),
            ("P4", Baron),
            ("P5", Saint),
            ("P6", Imp),
        ]],
    );
    Ok(())
}

#[test]
fn storyteller_setup_without_imp_is_invalid() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 6);
    g.set_roles(&[Drunk, Slayer, Monk, ScarletWoman, Mayor, Ravenkeeper])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Virgin, Slayer, Monk, Poisoner, Mayor, Ravenkeeper])?;
    g.add_day(1)?;
    g.add_role_claims(&[Virgin, Slayer, Monk, Virgin, Mayor, Ravenkeeper], "P1")?;
    assert!(!is_valid_world(&g)?);
    Ok(())
}

#[test]
fn storyteller_setup_without_minion_is_invalid() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 6);
    g.set_roles(&[Drunk, Slayer, Monk, Ravenkeeper, Mayor, Imp])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Virgin, Slayer, Monk, Ravenkeeper, Mayor, Imp])?;
    g.add_day(1)?;
    g.add_role_claims(&[Virgin, Slayer, Monk, Ravenkeeper, Mayor, Saint], "P1")?;
    assert!(!is_valid_world(&g)?);
    Ok(())
}

#[test]
fn storyteller_setup_repeated_role_is_invalid() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 5);
    g.set_roles(&[Imp, Virgin, Spy, Virgin, Soldier])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Imp, Virgin, Spy, Virgin, Soldier])?;
    g.add_day(1)?;
    g.add_role_claims(&[Saint, Virgin, Saint, Virgin, Soldier], "P1")?;
    assert!(!is_valid_world(&g)?);
    Ok(())
}

#[test]
fn fortune_teller_red_herring() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 6);
    g.set_roles(&[Drunk, Slayer, FortuneTeller, ScarletWoman, Soldier, Imp])?;
    g.set_red_herring("P2")?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Virgin, Slayer, FortuneTeller, ScarletWoman, Soldier, Imp])?;
    g.add_day(1)?;
    g.add_role_claims(&[Virgin, Slayer, FortuneTeller, Slayer, Soldier, Slayer], "P1")?;
    g.add_claim_action("P3", g.fortune_teller_action("P5", "P6", true)?)?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Drunk),
            ("P2", Slayer),
            ("P3", FortuneTeller),
            ("P4", ScarletWoman),
            ("P5", Soldier),
            ("P6", Imp),
        ]],
    );
    Ok(())
}

#[test]
fn scarlet_woman_cannot_be_the_red_herring() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 6);
    g.set_roles(&[Drunk, Slayer, FortuneTeller, ScarletWoman, Soldier, Imp])?;
    g.set_red_herring("P4")?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Virgin, Slayer, FortuneTeller, ScarletWoman, Soldier, Imp])?;
    g.add_day(1)?;
    g.add_role_claims(&[Virgin, Slayer, FortuneTeller, Saint, Soldier, Saint], "P1")?;
    g.add_claim_action("P3", g.fortune_teller_action("P5", "P6", true)?)?;
    assert!(!is_valid_world(&g)?);
    Ok(())
}

#[test]
fn minion_perspective_baron_full_setup() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Baron)?;
    g.add_minion_info("P1", "P2", &[])?; // P1 Baron, P2 Imp.
    g.add_day(1)?;
    g.add_role_claims(
        &[Ravenkeeper, Slayer, Undertaker, Saint, Recluse, Mayor, Monk],
        "P1",
    )?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Baron),
            ("P2", Imp),
            ("P3", Undertaker),
            ("P4", Saint),
            ("P5", Recluse),
            ("P6", Mayor),
            ("P7", Monk),
        ]],
    );
    Ok(())
}

#[test]
fn minion_perspective_baron_finds_the_drunk() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Baron)?;
    g.add_minion_info("P1", "P2", &[])?; // P1 Baron, P2 Imp.
    g.add_day(1)?;
    g.add_role_claims(
        &[Ravenkeeper, Slayer, Undertaker, Saint, Mayor, Virgin, Monk],
        "P1",
    )?;
    expect_worlds(
        &solve(&g)?,
        &[
            &[
                ("P1", Baron),
                ("P2", Imp),
                ("P3", Undertaker),
                ("P4", Saint),
                ("P5", Mayor),
                ("P6", Virgin),
                ("P7", Drunk),
            ],
            &[
                ("P1", Baron),
                ("P2", Imp),
                ("P3", Undertaker),
                ("P4", Saint),
                ("P5", Mayor),
                ("P6", Drunk),
                ("P7", Monk),
            ],
            &[
                ("P1", Baron),
                ("P2", Imp),
                ("P3", Drunk),
                ("P4", Saint),
                ("P5", Mayor),
                ("P6", Virgin),
                ("P7", Monk),
            ],
            &[
                ("P1", Baron),
                ("P2", Imp),
                ("P3", Undertaker),
                ("P4", Saint),
                ("P5", Drunk),
                ("P6", Virgin),
                ("P7", Monk),
            ],
        ],
    );
    Ok(())
}

#[test]
fn minion_perspective_poisoner_full_setup() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Poisoner)?;
    g.add_minion_info("P1", "P2", &[])?; // P1 Poisoner, P2 Imp.
    g.add_day(1)?;
    g.add_role_claims(
        &[Ravenkeeper, Slayer, Undertaker, Virgin, Soldier, Mayor, Monk],
        "P1",
    )?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Poisoner),
            ("P2", Imp),
            ("P3", Undertaker),
            ("P4", Virgin),
            ("P5", Soldier),
            ("P6", Mayor),
            ("P7", Monk),
        ]],
    );
    Ok(())
}

#[test]
fn minion_perspective_poisoner_5_players() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Poisoner)?; // P1 Poisoner, but they don't know the Imp.
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Slayer, Monk, Virgin, Soldier], "P1")?;
    expect_worlds(
        &solve(&g)?,
        &[
            &[("P1", Poisoner), ("P2", Slayer), ("P3", Monk), ("P4", Virgin), ("P5", Imp)],
            &[("P1", Poisoner), ("P2", Slayer), ("P3", Monk), ("P4", Imp), ("P5", Soldier)],
            &[("P1", Poisoner), ("P2", Imp), ("P3", Monk), ("P4", Virgin), ("P5", Soldier)],
            &[("P1", Poisoner), ("P2", Slayer), ("P3", Imp), ("P4", Virgin), ("P5", Soldier)],
        ],
    );
    Ok(())
}

#[test]
fn minion_perspective_outsider_claim_pins_the_imp() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Poisoner)?;
    g.add_day(1)?;
    g.add_role_claims(&[Slayer, Saint, Monk, Virgin, Soldier], "P1")?;
    // P2 claimed an outsider, which P1 knows is a lie (no Baron with the
    // Poisoner as the sole minion means no outsiders). So P2 is the Imp.
    expect_worlds(
        &solve(&g)?,
        &[&[("P1", Poisoner), ("P2", Imp), ("P3", Monk), ("P4", Virgin), ("P5", Soldier)]],
    );
    Ok(())
}

#[test]
fn demon_perspective_7_players() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Empath, Chef, Soldier])?;
    g.add_day(1)?;
    g.add_role_claims(
        &[Soldier, Saint, Undertaker, Virgin, Mayor, Slayer, Ravenkeeper],
        "P1",
    )?;
    // No true outsider claims, so no Baron.
    expect_worlds(
        &solve(&g)?,
        &[
            &[
                ("P1", Imp),
                ("P2", Spy),
                ("P3", Undertaker),
                ("P4", Virgin),
                ("P5", Mayor),
                ("P6", Slayer),
                ("P7", Ravenkeeper),
            ],
            &[
                ("P1", Imp),
                ("P2", Poisoner),
                ("P3", Undertaker),
                ("P4", Virgin),
                ("P5", Mayor),
                ("P6", Slayer),
                ("P7", Ravenkeeper),
            ],
            &[
                ("P1", Imp),
                ("P2", ScarletWoman),
                ("P3", Undertaker),
                ("P4", Virgin),
                ("P5", Mayor),
                ("P6", Slayer),
                ("P7", Ravenkeeper),
            ],
        ],
    );
    Ok(())
}

#[test]
fn demon_bluff_claims_are_invalid() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Undertaker, Monk, Soldier])?;
    g.add_day(1)?;
    g.add_role_claims(
        &[Undertaker, Saint, Monk, Virgin, Mayor, Slayer, Ravenkeeper],
        "P1",
    )?;
    // Impossible: Monk is a demon bluff, so P3's claim can't be true, yet
    // there aren't enough evil players for two liars.
    assert!(!is_valid_world(&g)?);
    Ok(())
}

#[test]
fn chef_learns_zero() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Chef)?;
    g.add_role_action("P1", g.chef_info(0))?;
    g.add_day(1)?;
    g.add_role_claims(&[Chef, Mayor, Virgin, Slayer, Recluse], "P1")?;
    g.add_claim_action("P1", g.chef_info(0))?;
    let mut s = GameSolver::new(&g)?;
    let roles = [("P1", Chef), ("P2", Imp), ("P3", Drunk), ("P4", Baron), ("P5", Recluse)];
    expect_worlds(&s.solve(&SolverRequestBuilder::from_current_roles(&roles))?, &[&roles]);
    let roles =
        [("P1", Chef), ("P2", Imp), ("P3", Virgin), ("P4", Slayer), ("P5", ScarletWoman)];
    expect_worlds(&s.solve(&SolverRequestBuilder::from_current_roles(&roles))?, &[&roles]);
    // A drunk Chef.
    let roles = [("P1", Drunk), ("P2", Imp), ("P3", Baron), ("P4", Slayer), ("P5", Recluse)];
    expect_worlds(&s.solve(&SolverRequestBuilder::from_current_roles(&roles))?, &[&roles]);
    // A poisoned Chef.
    let roles = [("P1", Chef), ("P2", Mayor), ("P3", Virgin), ("P4", Poisoner), ("P5", Imp)];
    expect_worlds(&s.solve(&SolverRequestBuilder::from_current_roles(&roles))?, &[&roles]);
    // The Spy reads as good.
    let roles = [("P1", Chef), ("P2", Mayor), ("P3", Virgin), ("P4", Spy), ("P5", Imp)];
    expect_worlds(&s.solve(&SolverRequestBuilder::from_current_roles(&roles))?, &[&roles]);
    // A sober Chef next to a Scarlet Woman and Imp pair would have seen 1.
    let roles =
        [("P1", Chef), ("P2", Mayor), ("P3", Virgin), ("P4", ScarletWoman), ("P5", Imp)];
    assert!(!s.is_valid_world(&SolverRequestBuilder::from_current_roles(&roles))?);
    Ok(())
}

#[test]
fn chef_learns_one() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P3", Chef)?;
    g.add_role_action("P3", g.chef_info(1))?;
    g.add_day(1)?;
    g.add_role_claims(&[Ravenkeeper, Mayor, Chef, Slayer, Recluse], "P1")?;
    g.add_claim_action("P3", g.chef_info(1))?;
    let roles = [("P1", Drunk), ("P2", Imp), ("P3", Chef), ("P4", Baron), ("P5", Recluse)];
    expect_worlds(
        &solve_with(&g, &SolverRequestBuilder::from_current_roles(&roles))?,
        &[&roles],
    );
    Ok(())
}

#[test]
fn investigator_demon_learns_minion_role() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Monk, Chef, Soldier])?;
    g.add_day(1)?;
    g.add_role_claims(
        &[Monk, Saint, Investigator, Virgin, Mayor, Slayer, Ravenkeeper],
        "P1",
    )?;
    // The minion claims the only outsider, so no Baron.
    g.add_claim_action("P3", g.investigator_info("P2", "P5", Poisoner)?)?;
    // The minion can only be a Poisoner.
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Imp),
            ("P2", Poisoner),
            ("P3", Investigator),
            ("P4", Virgin),
            ("P5", Mayor),
            ("P6", Slayer),
            ("P7", Ravenkeeper),
        ]],
    );
    Ok(())
}

#[test]
fn virgin_proc_confirms_washerwoman() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Baron)?;
    g.add_minion_info("P1", "P2", &[])?;
    g.add_day(1)?;
    g.add_role_claims(
        &[Monk, Saint, Washerwoman, Virgin, Mayor, Slayer, Recluse],
        "P1",
    )?;
    // The Baron learns that P6 is the Drunk, not the Slayer.
    g.add_claim_action("P3", g.washerwoman_info("P4", "P5", Mayor)?)?;
    g.add_nomination("P3", "P4")?;
    g.add_execution("P3")?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Baron),
            ("P2", Imp),
            ("P3", Washerwoman),
            ("P4", Virgin),
            ("P5", Mayor),
            ("P6", Drunk),
            ("P7", Recluse),
        ]],
    );
    Ok(())
}

#[test]
fn virgin_proc_confirms_librarian() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Baron)?;
    g.add_minion_info("P1", "P2", &[])?;
    g.add_day(1)?;
    g.add_role_claims(&[Monk, Saint, Librarian, Virgin, Mayor, Slayer, Recluse], "P1")?;
    // The Baron learns that P6 is the Drunk.
    g.add_claim_action("P3", g.librarian_info("P1", "P6", Drunk)?)?;
    g.add_nomination("P3", "P4")?;
    g.add_execution("P3")?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Baron),
            ("P2", Imp),
            ("P3", Librarian),
            ("P4", Virgin),
            ("P5", Mayor),
            ("P6", Drunk),
            ("P7", Recluse),
        ]],
    );
    Ok(())
}

#[test]
fn healthy_virgin_proc() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Baron)?;
    g.add_minion_info("P1", "P2", &[])?; // P1 Baron, P2 Imp.
    g.add_day(1)?;
    g.add_role_claims(
        &[Monk, Mayor, Undertaker, Virgin, Saint, Soldier, Ravenkeeper],
        "P1",
    )?;
    g.add_nomination("P3", "P4")?;
    g.add_execution("P3")?;
    expect_worlds(
        &solve(&g)?,
        &[
            &[
                ("P1", Baron),
                ("P2", Imp),
                ("P3", Undertaker),
                ("P4", Virgin),
                ("P5", Saint),
                ("P6", Drunk),
                ("P7", Ravenkeeper),
            ],
            &[
                ("P1", Baron),
                ("P2", Imp),
                ("P3", Undertaker),
                ("P4", Virgin),
                ("P5", Saint),
                ("P6", Soldier),
                ("P7", Drunk),
            ],
        ],
    );
    Ok(())
}

#[test]
fn virgin_non_proc_means_drunk_virgin_or_drunk_nominator() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Baron)?;
    g.add_minion_info("P1", "P2", &[])?; // P1 Baron, P2 Imp.
    g.add_day(1)?;
    g.add_role_claims(
        &[Monk, Mayor, Undertaker, Virgin, Saint, Soldier, Ravenkeeper],
        "P1",
    )?;
    g.add_nomination("P3", "P4")?;
    expect_worlds(
        &solve(&g)?,
        &[
            &[
                ("P1", Baron),
                ("P2", Imp),
                ("P3", Undertaker),
                ("P4", Drunk),
                ("P5", Saint),
                ("P6", Soldier),
                ("P7", Ravenkeeper),
            ],
            &[
                ("P1", Baron),
                ("P2", Imp),
                ("P3", Drunk),
                ("P4", Virgin),
                ("P5", Saint),
                ("P6", Soldier),
                ("P7", Ravenkeeper),
            ],
        ],
    );
    Ok(())
}

#[test]
fn poisoned_virgin_does_not_proc() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Poisoner)?;
    g.add_minion_info("P1", "P2", &[])?;
    g.add_role_action("P1", g.poisoner_action("P4")?)?;
    g.add_day(1)?;
    g.add_role_claims(
        &[Monk, Saint, Undertaker, Virgin, Mayor, Soldier, Ravenkeeper],
        "P1",
    )?;
    g.add_nomination("P5", "P4")?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Poisoner),
            ("P2", Imp),
            ("P3", Undertaker),
            ("P4", Virgin),
            ("P5", Mayor),
            ("P6", Soldier),
            ("P7", Ravenkeeper),
        ]],
    );
    Ok(())
}

#[test]
fn virgin_proc_exposes_drunk_undertaker() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Baron)?;
    g.add_minion_info("P1", "P2", &[])?; // P1 Baron, P2 Imp.
    g.add_day(1)?;
    g.add_role_claims(
        &[Mayor, Mayor, Ravenkeeper, Virgin, Saint, Soldier, Undertaker],
        "P1",
    )?;
    g.add_nomination("P3", "P4")?;
    g.add_execution("P3")?;
    g.add_death("P3")?;
    g.add_night(2)?;
    g.add_day(2)?;
    g.add_claim_action("P7", g.undertaker_info(Spy))?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Baron),
            ("P2", Imp),
            ("P3", Ravenkeeper),
            ("P4", Virgin),
            ("P5", Saint),
            ("P6", Soldier),
            ("P7", Drunk),
        ]],
    );
    Ok(())
}

#[test]
fn undertaker_spy_false_registers() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Undertaker)?;
    g.add_day(1)?;
    g.add_role_claims(&[Undertaker, Mayor, Virgin, Slayer, Investigator], "P1")?;
    g.add_claim_action("P5", g.investigator_info("P1", "P2", Poisoner)?)?;
    g.add_nomination("P5", "P3")?;
    g.add_execution("P5")?;
    g.add_death("P5")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.undertaker_info(Investigator))?;
    g.add_day(2)?;
    g.add_claim_action("P1", g.undertaker_info(Investigator))?;
    let r = SolverRequestBuilder::from_current_roles(&[("P5", Spy)]);
    assert!(is_valid_world_with(&g, &r)?);
    let r = SolverRequestBuilder::from_current_roles(&[("P5", Investigator)]);
    assert!(is_valid_world_with(&g, &r)?);
    let r = SolverRequestBuilder::from_current_roles_not(&[("P5", Spy), ("P5", Investigator)]);
    assert!(!is_valid_world_with(&g, &r)?);
    Ok(())
}

#[test]
fn undertaker_recluse_false_registers() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Undertaker)?;
    g.add_day(1)?;
    g.add_role_claims(&[Undertaker, Mayor, Virgin, Slayer, Recluse], "P1")?;
    g.add_nomination_vote_execution("P2", "P5")?;
    g.add_death("P5")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.undertaker_info(Imp))?;
    g.add_day(2)?;
    g.add_claim_action("P1", g.undertaker_info(Imp))?;
    let r = SolverRequestBuilder::from_current_roles(&[("P5", Recluse)]);
    assert!(is_valid_world_with(&g, &r)?);
    let r = SolverRequestBuilder::from_current_roles(&[("P5", Imp)]);
    assert!(is_valid_world_with(&g, &r)?);
    let r = SolverRequestBuilder::from_current_roles_not(&[("P5", Imp), ("P5", Recluse)]);
    assert!(!is_valid_world_with(&g, &r)?);
    Ok(())
}

#[test]
fn healthy_undertaker_sees_the_truth() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Baron)?;
    g.add_minion_info("P1", "P2", &[])?; // P1 Baron, P2 Imp.
    g.add_day(1)?;
    g.add_role_claims(
        &[Slayer, Mayor, Ravenkeeper, Virgin, Saint, Soldier, Undertaker],
        "P1",
    )?;
    g.add_nomination("P3", "P4")?;
    g.add_execution("P3")?;
    g.add_death("P3")?;
    g.add_night(2)?;
    g.add_day(2)?;
    g.add_claim_action("P7", g.undertaker_info(Ravenkeeper))?;
    let expected: &[&[(&str, Role)]] = &[
        &[
            ("P1", Baron),
            ("P2", Imp),
            ("P3", Ravenkeeper),
            ("P4", Virgin),
            ("P5", Saint),
            ("P6", Drunk),
            ("P7", Undertaker),
        ],
        &[
            ("P1", Baron),
            ("P2", Imp),
            ("P3", Ravenkeeper),
            ("P4", Virgin),
            ("P5", Saint),
            ("P6", Soldier),
            ("P7", Drunk),
        ],
    ];
    expect_worlds(&solve(&g)?, expected);
    g.add_nomination_vote_execution("P1", "P6")?;
    g.add_death("P6")?;
    g.add_night(3)?;
    g.add_day(3)?;
    g.add_claim_action("P7", g.undertaker_info(Drunk))?;
    expect_worlds(&solve(&g)?, expected);
    Ok(())
}

#[test]
fn imp_kill_of_soldier_exposes_the_poisoner() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Empath, Recluse, Monk])?;
    g.add_day(1)?;
    g.add_role_claims(
        &[Mayor, Saint, Undertaker, Ravenkeeper, Soldier, Slayer, Virgin],
        "P1",
    )?;
    // The minion is not a Baron, but all other options are in.
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P5")?)?;
    g.add_day(2)?;
    g.add_night_death("P5")?; // The kill on the Soldier worked, so P2 poisoned.
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Imp),
            ("P2", Poisoner),
            ("P3", Undertaker),
            ("P4", Ravenkeeper),
            ("P5", Soldier),
            ("P6", Slayer),
            ("P7", Virgin),
        ]],
    );
    Ok(())
}

#[test]
fn failed_imp_kill_confirms_a_sober_monk() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Empath, Recluse, FortuneTeller])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Ravenkeeper, Virgin, Saint, Soldier, Slayer, Monk], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P6")?)?;
    g.add_day(2)?;
    g.add_claim_action("P7", g.monk_action("P6")?)?;
    let r = SolverRequestBuilder::from_current_roles(&[("P7", Monk)]);
    assert_eq!(solve_with(&g, &r)?.worlds.len(), solve(&g)?.worlds.len());
    Ok(())
}

#[test]
fn successful_imp_kill_exposes_a_drunk_soldier() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Empath, Recluse, FortuneTeller])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Ravenkeeper, Virgin, Saint, Soldier, Slayer, Monk], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P5")?)?;
    g.add_day(2)?;
    g.add_night_death("P5")?;
    g.add_claim_action("P7", g.monk_action("P6")?)?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Imp),
            ("P2", Baron),
            ("P3", Virgin),
            ("P4", Saint),
            ("P5", Drunk),
            ("P6", Slayer),
            ("P7", Monk),
        ]],
    );
    Ok(())
}

#[test]
fn mayor_bounce_to_nobody_proves_soldier_and_mayor_sober() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Slayer, Recluse, FortuneTeller])?;
    g.add_day(1)?;
    g.add_role_claims(
        &[Slayer, Ravenkeeper, Virgin, Saint, Soldier, Mayor, Undertaker],
        "P1",
    )?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P6")?)?;
    g.add_day(2)?;
    // No death announced: both the Mayor and the Soldier are sober.
    expect_worlds(
        &solve(&g)?,
        &[
            &[
                ("P1", Imp),
                ("P2", Baron),
                ("P3", Virgin),
                ("P4", Saint),
                ("P5", Soldier),
                ("P6", Mayor),
                ("P7", Drunk),
            ],
            &[
                ("P1", Imp),
                ("P2", Baron),
                ("P3", Drunk),
                ("P4", Saint),
                ("P5", Soldier),
                ("P6", Mayor),
                ("P7", Undertaker),
            ],
        ],
    );
    Ok(())
}

#[test]
fn mayor_bounce_to_monk_protected_target() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 7);
    g.set_roles(&[Imp, Baron, Monk, Mayor, Saint, Recluse, Virgin])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Imp, Baron, Monk, Mayor, Saint, Recluse, Virgin])?;
    g.add_demon_info("P1", &["P2"], &[Ravenkeeper, FortuneTeller, Soldier])?;
    g.add_minion_info("P2", "P1", &[])?;
    g.add_day(1)?;
    g.add_role_claims(
        &[Ravenkeeper, Soldier, Monk, Mayor, Saint, Recluse, Virgin],
        "P1",
    )?;
    g.add_night(2)?;
    // The Monk protects P7, not the Mayor.
    g.add_role_action("P3", g.monk_action("P7")?)?;
    // The Imp tries to kill the Mayor.
    g.add_role_action("P1", g.imp_action("P4")?)?;
    g.add_day(2)?;
    g.add_claim_action("P3", g.monk_action("P7")?)?; // The kill bounced to P7.
    assert!(is_valid_world(&g)?);
    Ok(())
}

#[test]
fn mayor_bounce_to_recluse() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 5);
    g.set_roles(&[Imp, Baron, Mayor, Saint, Recluse])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Imp, Baron, Mayor, Saint, Recluse])?;
    g.add_day(1)?;
    g.add_role_claims(&[Ravenkeeper, Soldier, Mayor, Saint, Recluse], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P3")?)?; // The Imp goes for the Mayor.
    g.add_day(2)?;
    g.add_night_death("P5")?;
    assert!(is_valid_world(&g)?);
    Ok(())
}

#[test]
fn starpass_to_the_baron() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Empath, Mayor, FortuneTeller])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Ravenkeeper, Recluse, Saint, Soldier, Slayer, Virgin], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P1")?)?;
    g.add_day(2)?;
    g.add_night_death("P1")?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Imp),
            ("P2", Imp),
            ("P3", Recluse),
            ("P4", Saint),
            ("P5", Soldier),
            ("P6", Slayer),
            ("P7", Virgin),
        ]],
    );
    Ok(())
}

#[test]
fn starpass_to_a_recluse_who_comes_out() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Empath, Mayor, FortuneTeller])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Ravenkeeper, Recluse, Saint, Soldier, Slayer, Virgin], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P1")?)?;
    g.add_day(2)?;
    g.add_night_death("P1")?;
    g.add_claim_role("P3", Imp)?; // The Recluse comes out and claims good Imp.
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Imp),
            ("P2", Baron),
            ("P3", Imp),
            ("P4", Saint),
            ("P5", Soldier),
            ("P6", Slayer),
            ("P7", Virgin),
        ]],
    );
    Ok(())
}

#[test]
fn starpass_fails_when_monk_protected() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Empath, Mayor, FortuneTeller])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Ravenkeeper, Recluse, Saint, Soldier, Slayer, Monk], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P1")?)?;
    g.add_day(2)?;
    g.add_claim_action("P7", g.monk_action("P1")?)?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Imp),
            ("P2", Baron),
            ("P3", Recluse),
            ("P4", Saint),
            ("P5", Soldier),
            ("P6", Slayer),
            ("P7", Monk),
        ]],
    );
    Ok(())
}

#[test]
fn quiet_self_kill_with_monk_elsewhere_is_invalid() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Empath, Mayor, FortuneTeller])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Ravenkeeper, Recluse, Saint, Soldier, Slayer, Monk], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P1")?)?;
    g.add_day(2)?;
    g.add_claim_action("P7", g.monk_action("P2")?)?;
    assert!(!is_valid_world(&g)?);
    Ok(())
}

#[test]
fn quiet_self_kill_means_poisoned_imp() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Empath, Mayor, FortuneTeller])?;
    g.add_day(1)?;
    g.add_role_claims(
        &[Mayor, Ravenkeeper, Monk, Undertaker, Soldier, Slayer, Virgin],
        "P1",
    )?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P1")?)?;
    g.add_day(2)?;
    g.add_claim_action("P3", g.monk_action("P4")?)?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Imp),
            ("P2", Poisoner),
            ("P3", Monk),
            ("P4", Undertaker),
            ("P5", Soldier),
            ("P6", Slayer),
            ("P7", Virgin),
        ]],
    );
    Ok(())
}

#[test]
fn poisoner_catches_the_starpass() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Poisoner)?;
    g.add_role_action("P1", g.poisoner_action("P2")?)?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Ravenkeeper, Virgin, Undertaker, Soldier], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.poisoner_action("P2")?)?;
    g.add_shown_token("P1", Imp)?;
    g.add_day(2)?;
    g.add_night_death("P4")?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Imp),
            ("P2", Ravenkeeper),
            ("P3", Virgin),
            ("P4", Imp),
            ("P5", Soldier),
        ]],
    );
    Ok(())
}

#[test]
fn poisoned_imp_cannot_kill_for_the_starpass() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Poisoner)?;
    g.add_role_action("P1", g.poisoner_action("P2")?)?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Slayer, Virgin, Undertaker, Soldier], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.poisoner_action("P2")?)?;
    g.add_shown_token("P1", Imp)?;
    g.add_day(2)?;
    g.add_night_death("P2")?;
    assert!(!is_valid_world(&g)?);
    Ok(())
}

#[test]
fn baron_perspective_three_minion_starpass_chain() -> Result<()> {
    let mut g = new_game(Perspective::Player, 13);
    g.add_night(1)?;
    g.add_shown_token("P4", Baron)?;
    g.add_minion_info("P4", "P2", &["P1", "P13"])?;
    g.add_day(1)?;
    g.add_role_claims(
        &[
            Washerwoman, Chef, Librarian, Monk, Soldier, Slayer, Undertaker, Saint,
            Virgin, Ravenkeeper, Mayor, Recluse, Empath,
        ],
        "P1",
    )?;
    g.add_night(2)?;
    g.add_day(2)?;
    g.add_night_death("P2")?; // P13 caught a starpass.
    g.add_night(3)?;
    g.add_shown_token("P4", Imp)?; // We caught a starpass.
    g.add_day(3)?;
    g.add_night_death("P13")?;
    g.add_night(4)?;
    g.add_role_action("P4", g.imp_action("P4")?)?; // We starpass to P1.
    g.add_day(4)?;
    g.add_night_death("P4")?;
    g.add_claim_action("P1", g.washerwoman_info("P2", "P3", Mayor)?)?;
    g.add_claim_action("P3", g.librarian_info("P1", "P8", Saint)?)?;
    g.add_claim_action("P2", g.chef_info(0))?;
    g.add_claim_action_at("P4", g.monk_action("P5")?, Time::night(2))?;
    g.add_claim_action_at("P4", g.monk_action("P5")?, Time::night(3))?;
    g.add_claim_action_at("P4", g.monk_action("P5")?, Time::night(4))?;
    g.add_claim_action_at("P13", g.empath_info(0), Time::night(1))?;
    g.add_claim_action_at("P13", g.empath_info(0), Time::night(2))?;
    let r = SolverRequestBuilder::new().add_roles_in_play(&[ScarletWoman, Spy]).build();
    // This also verifies that P13, and not P1, must be the Scarlet Woman.
    expect_worlds(
        &solve_with(&g, &r)?,
        &[&[
            ("P1", Imp),
            ("P2", Imp),
            ("P3", Librarian),
            ("P4", Imp),
            ("P5", Soldier),
            ("P6", Slayer),
            ("P7", Undertaker),
            ("P8", Saint),
            ("P9", Virgin),
            ("P10", Ravenkeeper),
            ("P11", Mayor),
            ("P12", Recluse),
            ("P13", Imp),
        ]],
    );
    Ok(())
}

#[test]
fn ravenkeeper_spy_false_registers() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Ravenkeeper)?;
    g.add_day(1)?;
    g.add_role_claims(&[Ravenkeeper, Mayor, Virgin, Slayer, Investigator], "P1")?;
    g.add_claim_action("P5", g.investigator_info("P1", "P2", Poisoner)?)?;
    g.add_nomination("P5", "P3")?;
    g.add_execution("P5")?;
    g.add_death("P5")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.ravenkeeper_action("P5", Investigator)?)?;
    g.add_day(2)?;
    g.add_night_death("P1")?;
    g.add_claim_action("P1", g.ravenkeeper_action("P5", Investigator)?)?;
    let r = SolverRequestBuilder::from_current_roles(&[("P5", Spy)]);
    assert!(is_valid_world_with(&g, &r)?);
    let r = SolverRequestBuilder::from_current_roles(&[("P5", Investigator)]);
    assert!(is_valid_world_with(&g, &r)?);
    let r = SolverRequestBuilder::from_current_roles_not(&[("P5", Spy), ("P5", Investigator)]);
    assert!(!is_valid_world_with(&g, &r)?);
    Ok(())
}

#[test]
fn ravenkeeper_recluse_false_registers() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Ravenkeeper)?;
    g.add_day(1)?;
    g.add_role_claims(&[Ravenkeeper, Mayor, Virgin, Slayer, Recluse], "P1")?;
    g.add_nomination_vote_execution("P5", "P5")?;
    g.add_death("P5")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.ravenkeeper_action("P5", Imp)?)?;
    g.add_day(2)?;
    g.add_night_death("P1")?;
    g.add_claim_action("P1", g.ravenkeeper_action("P5", Imp)?)?;
    let r = SolverRequestBuilder::from_current_roles(&[("P5", Recluse)]);
    assert!(is_valid_world_with(&g, &r)?);
    let r = SolverRequestBuilder::from_current_roles(&[("P5", Imp)]);
    assert!(is_valid_world_with(&g, &r)?);
    let r = SolverRequestBuilder::from_current_roles_not(&[("P5", Imp), ("P5", Recluse)]);
    assert!(!is_valid_world_with(&g, &r)?);
    Ok(())
}

#[test]
fn ravenkeeper_learns_a_true_role() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 5);
    g.set_roles(&[Imp, Baron, Ravenkeeper, Recluse, Saint])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Imp, Baron, Ravenkeeper, Recluse, Saint])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Slayer, Ravenkeeper, Recluse, Saint], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P3")?)?;
    g.add_role_action("P3", g.ravenkeeper_action("P2", Baron)?)?;
    g.add_day(2)?;
    g.add_night_death("P3")?;
    g.add_claim_action("P3", g.ravenkeeper_action("P2", Baron)?)?;
    assert!(is_valid_world(&g)?);
    Ok(())
}

#[test]
fn drunk_ravenkeeper_learns_a_false_role() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 5);
    g.set_roles(&[Imp, Baron, Drunk, Slayer, Saint])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Imp, Baron, Ravenkeeper, Slayer, Saint])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Undertaker, Ravenkeeper, Slayer, Saint], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P3")?)?;
    g.add_role_action("P3", g.ravenkeeper_action("P2", Undertaker)?)?;
    g.add_day(2)?;
    g.add_night_death("P3")?;
    g.add_claim_action("P3", g.ravenkeeper_action("P2", Undertaker)?)?;
    assert!(is_valid_world(&g)?);
    Ok(())
}

#[test]
fn poisoned_ravenkeeper_learns_a_false_role() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 5);
    g.set_roles(&[Imp, Poisoner, Ravenkeeper, Slayer, Undertaker])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Imp, Poisoner, Ravenkeeper, Slayer, Undertaker])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Saint, Ravenkeeper, Slayer, Undertaker], "P1")?;
    g.add_night(2)?;
    g.add_role_action("P2", g.poisoner_action("P3")?)?;
    g.add_role_action("P1", g.imp_action("P3")?)?;
    g.add_role_action("P3", g.ravenkeeper_action("P2", Saint)?)?;
    g.add_day(2)?;
    g.add_night_death("P3")?;
    g.add_claim_action("P3", g.ravenkeeper_action("P2", Saint)?)?;
    assert!(is_valid_world(&g)?);
    Ok(())
}

#[test]
fn healthy_ravenkeeper_cannot_learn_a_false_role() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 5);
    g.set_roles(&[Imp, Poisoner, Ravenkeeper, Slayer, Undertaker])?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Imp, Poisoner, Ravenkeeper, Slayer, Undertaker])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Saint, Ravenkeeper, Slayer, Undertaker], "P1")?;
    g.add_night(2)?;
    // The Ravenkeeper is healthy and should learn POISONER.
    g.add_role_action("P2", g.poisoner_action("P4")?)?;
    g.add_role_action("P1", g.imp_action("P3")?)?;
    g.add_role_action("P3", g.ravenkeeper_action("P2", Saint)?)?;
    g.add_day(2)?;
    g.add_night_death("P3")?;
    g.add_claim_action("P3", g.ravenkeeper_action("P2", Saint)?)?;
    assert!(!is_valid_world(&g)?);
    Ok(())
}

#[test]
fn fortune_teller_learns_true_info_across_a_starpass() -> Result<()> {
    let mut g = new_game(Perspective::Storyteller, 5);
    g.set_roles(&[Imp, Baron, FortuneTeller, Recluse, Saint])?;
    g.set_red_herring("P5")?;
    g.add_night(1)?;
    g.add_all_shown_tokens(&[Imp, Baron, FortuneTeller, Recluse, Saint])?;
    g.add_role_action("P3", g.fortune_teller_action("P1", "P2", true)?)?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Slayer, FortuneTeller, Recluse, Saint], "P1")?;
    g.add_claim_action("P3", g.fortune_teller_action("P1", "P2", true)?)?;
    g.add_night(2)?;
    g.add_role_action("P1", g.imp_action("P5")?)?;
    g.add_role_action("P3", g.fortune_teller_action("P3", "P4", true)?)?;
    g.add_day(2)?;
    g.add_night_death("P5")?;
    g.add_claim_action("P3", g.fortune_teller_action("P3", "P4", true)?)?;
    g.add_night(3)?;
    g.add_role_action("P1", g.imp_action("P5")?)?;
    g.add_role_action("P3", g.fortune_teller_action("P3", "P5", true)?)?;
    g.add_day(3)?;
    g.add_claim_action("P3", g.fortune_teller_action("P3", "P5", true)?)?;
    g.add_night(4)?;
    g.add_role_action("P1", g.imp_action("P1")?)?; // Imp starpass to P2.
    g.add_shown_token("P2", Imp)?;
    g.add_role_action("P3", g.fortune_teller_action("P3", "P2", true)?)?;
    g.add_day(4)?;
    g.add_night_death("P1")?;
    g.add_claim_action("P3", g.fortune_teller_action("P3", "P2", true)?)?;
    assert!(is_valid_world(&g)?);
    Ok(())
}

#[test]
fn empath_reads_spy_and_recluse_both_ways() -> Result<()> {
    let mut g = new_game(Perspective::Player, 10);
    g.add_night(1)?;
    g.add_shown_token("P1", Empath)?;
    g.add_role_action("P1", g.empath_info(2))?; // Both Spy and Recluse read evil.
    g.add_day(1)?;
    // The Virgin (P2) is actually the Spy, the Saint (P7) the Imp, and the
    // Mayor (P8) the Baron.
    g.add_role_claims(
        &[
            Empath, Virgin, Soldier, Mayor, Slayer, Ravenkeeper, Saint, Mayor,
            Investigator, Recluse,
        ],
        "P1",
    )?;
    g.add_claim_action("P1", g.empath_info(2))?;
    g.add_claim_action("P9", g.investigator_info("P1", "P3", Poisoner)?)?;
    g.add_nomination_vote_execution("P10", "P4")?;
    g.add_death("P4")?;
    g.add_night(2)?;
    g.add_role_action("P1", g.empath_info(0))?;
    g.add_day(2)?;
    g.add_night_death("P5")?;
    g.add_claim_action("P1", g.empath_info(0))?; // Both read good now.
    g.add_nomination_vote_execution("P10", "P10")?;
    g.add_death("P10")?;
    g.add_night(3)?;
    g.add_role_action("P1", g.empath_info(1))?; // The Spy reads evil again.
    g.add_day(3)?;
    g.add_claim_action("P1", g.empath_info(1))?;
    g.add_nomination_vote_execution("P1", "P9")?;
    g.add_death("P9")?;
    g.add_night(4)?;
    g.add_role_action("P1", g.empath_info(1))?; // Spy good again, pings the Baron.
    g.add_day(4)?;
    g.add_claim_action("P1", g.empath_info(1))?;
    g.add_nomination_vote_execution("P1", "P8")?;
    g.add_death("P8")?;
    g.add_night(5)?;
    g.add_role_action("P1", g.empath_info(1))?; // Spy good, pings the Imp.
    g.add_day(5)?;
    g.add_claim_action("P1", g.empath_info(1))?;
    let roles = [
        ("P1", Empath),
        ("P2", Spy),
        ("P3", Soldier),
        ("P4", Mayor),
        ("P5", Slayer),
        ("P6", Ravenkeeper),
        ("P7", Imp),
        ("P8", Baron),
        ("P9", Drunk),
        ("P10", Recluse),
    ];
    expect_worlds(
        &solve_with(&g, &SolverRequestBuilder::from_current_roles(&roles))?,
        &[&roles],
    );
    Ok(())
}

#[test]
fn failed_slayer_shot_on_the_imp_exposes_a_drunk_slayer() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Imp)?;
    g.add_demon_info("P1", &["P2"], &[Empath, Recluse, FortuneTeller])?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Ravenkeeper, Virgin, Saint, Soldier, Slayer, Monk], "P1")?;
    g.add_role_action("P6", g.slayer_action("P1")?)?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Imp),
            ("P2", Baron),
            ("P3", Virgin),
            ("P4", Saint),
            ("P5", Soldier),
            ("P6", Drunk),
            ("P7", Monk),
        ]],
    );
    Ok(())
}

#[test]
fn imp_cannot_kill_a_healthy_soldier() -> Result<()> {
    let mut g = new_game(Perspective::Observer, 5);
    g.add_night(1)?;
    g.add_day(1)?;
    g.add_role_claims(&[Washerwoman, Recluse, Saint, Butler, Soldier], "P1")?;
    g.add_claim_action("P1", g.washerwoman_info("P4", "P5", Soldier)?)?;
    g.add_claim_action("P4", g.butler_action("P3")?)?;
    // P5 is the Soldier in all worlds.
    let r = SolverRequestBuilder::from_current_roles(&[("P5", Soldier)]);
    assert_eq!(solve_with(&g, &r)?.worlds.len(), solve(&g)?.worlds.len());
    g.add_night(2)?;
    g.add_day(2)?;
    g.add_night_death("P5")?;
    g.add_claim_action("P4", g.butler_action("P3")?)?;
    assert!(!is_valid_world(&g)?);
    Ok(())
}

#[test]
fn imp_cannot_kill_a_monk_protected_target() -> Result<()> {
    let mut g = new_game(Perspective::Observer, 5);
    g.add_night(1)?;
    g.add_day(1)?;
    g.add_role_claims(&[Washerwoman, Recluse, Saint, Butler, Monk], "P1")?;
    g.add_claim_action("P1", g.washerwoman_info("P4", "P5", Monk)?)?;
    g.add_claim_action("P4", g.butler_action("P3")?)?;
    // P5 is the Monk in all worlds.
    let r = SolverRequestBuilder::from_current_roles(&[("P5", Monk)]);
    assert_eq!(solve_with(&g, &r)?.worlds.len(), solve(&g)?.worlds.len());
    g.add_night(2)?;
    g.add_day(2)?;
    g.add_night_death("P1")?;
    g.add_claim_action("P4", g.butler_action("P3")?)?;
    g.add_claim_action("P5", g.monk_action("P1")?)?;
    assert!(!is_valid_world(&g)?);
    Ok(())
}

#[test]
fn scarlet_woman_catches_an_executed_imp() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P2", ScarletWoman)?;
    g.add_minion_info("P2", "P1", &[])?; // P2 SW, P1 Imp.
    g.add_day(1)?;
    g.add_role_claims(
        &[Soldier, Mayor, Ravenkeeper, Virgin, Undertaker, Slayer, Monk],
        "P1",
    )?;
    g.add_nomination_vote_execution("P5", "P1")?;
    g.add_death("P1")?;
    g.add_night(2)?;
    g.add_shown_token("P2", Imp)?;
    g.add_role_action("P2", g.imp_action("P5")?)?;
    g.add_day(2)?;
    g.add_night_death("P5")?;
    g.add_claim_action("P7", g.monk_action("P6")?)?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Imp),
            ("P2", Imp),
            ("P3", Ravenkeeper),
            ("P4", Virgin),
            ("P5", Undertaker),
            ("P6", Slayer),
            ("P7", Monk),
        ]],
    );
    Ok(())
}

#[test]
fn scarlet_woman_catches_a_slain_imp() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P2", ScarletWoman)?;
    g.add_minion_info("P2", "P1", &[])?; // P2 SW, P1 Imp.
    g.add_day(1)?;
    g.add_role_claims(
        &[Soldier, Mayor, Ravenkeeper, Virgin, Undertaker, Slayer, Monk],
        "P1",
    )?;
    g.add_role_action("P6", g.slayer_action("P1")?)?;
    g.add_death("P1")?;
    g.add_night(2)?;
    g.add_shown_token("P2", Imp)?;
    g.add_role_action("P2", g.imp_action("P5")?)?;
    g.add_day(2)?;
    g.add_night_death("P5")?;
    g.add_claim_action("P7", g.monk_action("P4")?)?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Imp),
            ("P2", Imp),
            ("P3", Ravenkeeper),
            ("P4", Virgin),
            ("P5", Undertaker),
            ("P6", Slayer),
            ("P7", Monk),
        ]],
    );
    Ok(())
}

#[test]
fn executing_the_imp_on_five_ends_the_game() -> Result<()> {
    let mut g = new_game(Perspective::Observer, 5);
    g.add_night(1)?;
    g.add_day(1)?;
    g.add_role_claims(&[Soldier, Mayor, Ravenkeeper, Virgin, Undertaker], "P1")?;
    g.add_nomination_vote_execution("P2", "P1")?;
    g.add_death("P1")?;
    g.add_victory(Team::Good)?;
    assert!(is_valid_world(&g)?);
    let r = SolverRequestBuilder::from_current_roles_not(&[("P1", Imp)]);
    assert!(!is_valid_world_with(&g, &r)?);
    let r = SolverRequestBuilder::new()
        .add_current_roles(&[("P1", Imp)])
        .add_roles_in_play(&[ScarletWoman])
        .build();
    // Because the Scarlet Woman would have proc-ed.
    assert!(!is_valid_world_with(&g, &r)?);
    Ok(())
}

#[test]
fn game_continuing_means_the_executee_was_not_the_imp() -> Result<()> {
    let mut g = new_game(Perspective::Observer, 5);
    g.add_night(1)?;
    g.add_day(1)?;
    g.add_night(2)?;
    g.add_day(2)?;
    g.add_role_claims(&[Soldier, Mayor, Ravenkeeper, Virgin, Undertaker], "P1")?;
    g.add_night_death("P1")?;
    g.add_nomination_vote_execution("P2", "P3")?;
    g.add_death("P3")?;
    // The game continues, so P3 could not have been the Imp.
    let r = SolverRequestBuilder::from_current_roles(&[("P3", Imp)]);
    assert!(!is_valid_world_with(&g, &r)?);
    Ok(())
}

#[test]
fn game_continuing_after_imp_execution_needs_a_scarlet_woman() -> Result<()> {
    let mut g = new_game(Perspective::Observer, 5);
    g.add_night(1)?;
    g.add_day(1)?;
    g.add_role_claims(&[Soldier, Mayor, Ravenkeeper, Virgin, Undertaker], "P1")?;
    g.add_nomination_vote_execution("P1", "P1")?;
    g.add_death("P1")?;
    // The game continues, so P1 being the Imp needs a Scarlet Woman.
    let r = SolverRequestBuilder::new().add_current_roles(&[("P1", Imp)]);
    assert!(is_valid_world_with(&g, &r.clone().build())?);
    let r = r.add_roles_not_in_play(&[ScarletWoman]).build();
    assert!(!is_valid_world_with(&g, &r)?);
    Ok(())
}

#[test]
fn executing_a_healthy_saint_ends_the_game() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Saint)?;
    g.add_day(1)?;
    g.add_role_claims(&[Saint, Mayor, Soldier, Slayer, Recluse], "P1")?;
    g.add_nomination_vote_execution("P2", "P1")?;
    g.add_death("P1")?;
    g.add_victory(Team::Evil)?;
    assert!(is_valid_world(&g)?);
    Ok(())
}

#[test]
fn surviving_a_saint_execution_requires_the_poisoner() -> Result<()> {
    let mut g = new_game(Perspective::Player, 6);
    g.add_night(1)?;
    g.add_shown_token("P1", Saint)?;
    g.add_day(1)?;
    g.add_role_claims(&[Saint, Mayor, Soldier, Slayer, Monk, Virgin], "P1")?;
    g.add_nomination_vote_execution("P2", "P1")?;
    g.add_death("P1")?;
    assert!(is_valid_world(&g)?);
    // The Poisoner must have got us.
    let r = SolverRequestBuilder::new().add_roles_not_in_play(&[Poisoner]).build();
    assert!(!is_valid_world_with(&g, &r)?);
    Ok(())
}

#[test]
fn healthy_mayor_wins_in_the_final_three() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Mayor)?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Saint, Soldier, Slayer, Recluse], "P1")?;
    g.add_nomination_vote_execution("P2", "P5")?;
    g.add_death("P5")?;
    g.add_night(2)?;
    g.add_day(2)?;
    g.add_night_death("P4")?; // Final 3.
    g.add_victory(Team::Good)?;
    assert!(is_valid_world(&g)?);
    Ok(())
}

#[test]
fn losing_in_the_final_three_means_the_mayor_was_poisoned() -> Result<()> {
    let mut g = new_game(Perspective::Player, 5);
    g.add_night(1)?;
    g.add_shown_token("P1", Mayor)?;
    g.add_day(1)?;
    g.add_role_claims(&[Mayor, Virgin, Soldier, Slayer, Ravenkeeper], "P1")?;
    g.add_nomination_vote_execution("P2", "P5")?;
    g.add_death("P5")?;
    g.add_night(2)?;
    g.add_day(2)?;
    g.add_night_death("P4")?; // Final 3.
    g.add_night(3)?;
    g.add_day(3)?;
    g.add_night_death("P2")?;
    g.add_victory(Team::Evil)?;
    assert!(is_valid_world(&g)?);
    // The Poisoner must have got us.
    let r = SolverRequestBuilder::new().add_roles_not_in_play(&[Poisoner]).build();
    assert!(!is_valid_world_with(&g, &r)?);
    Ok(())
}

#[test]
fn spy_sees_the_whole_grimoire() -> Result<()> {
    let mut g = new_game(Perspective::Player, 13);
    g.add_night(1)?;
    g.add_shown_token("P1", Spy)?;
    g.add_minion_info("P1", "P2", &["P4", "P13"])?;
    let mut spy_info = g.grimoire_from_roles(
        &[
            Spy, Imp, Drunk, Baron, Soldier, Slayer, Undertaker, Saint, Virgin,
            Ravenkeeper, Chef, Monk, ScarletWoman,
        ],
        Some(Librarian),
    );
    g.add_role_action("P1", g.spy_info(spy_info.clone()))?;
    g.add_day(1)?;
    g.add_role_claims(
        &[
            Washerwoman, Mayor, Librarian, Recluse, Soldier, Slayer, Undertaker, Saint,
            Virgin, Ravenkeeper, Chef, Monk, Empath,
        ],
        "P1",
    )?;
    g.add_claim_action("P1", g.washerwoman_info("P2", "P3", Mayor)?)?;
    g.add_claim_action("P3", g.librarian_info("P4", "P8", Saint)?)?; // Actually true.
    g.add_claim_action("P11", g.chef_info(0))?;
    g.add_claim_action("P13", g.empath_info(0))?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Spy),
            ("P2", Imp),
            ("P3", Drunk),
            ("P4", Baron),
            ("P5", Soldier),
            ("P6", Slayer),
            ("P7", Undertaker),
            ("P8", Saint),
            ("P9", Virgin),
            ("P10", Ravenkeeper),
            ("P11", Chef),
            ("P12", Monk),
            ("P13", ScarletWoman),
        ]],
    );

    g.add_nomination_vote_execution("P3", "P9")?;
    g.add_death("P9")?;
    g.add_night(2)?;
    spy_info.entries[8].shroud = true; // P9 executed.
    spy_info.entries[1].shroud = true; // P2 starpassed.
    spy_info.entries[12].role = Imp; // P13 caught the starpass.
    g.add_role_action("P1", g.spy_info(spy_info))?;
    g.add_day(2)?;
    g.add_night_death("P2")?;
    g.add_claim_action("P7", g.undertaker_info(Virgin))?;
    g.add_claim_action("P12", g.monk_action("P13")?)?;
    g.add_claim_action("P13", g.empath_info(0))?;
    expect_worlds(
        &solve(&g)?,
        &[&[
            ("P1", Spy),
            ("P2", Imp),
            ("P3", Drunk),
            ("P4", Baron),
            ("P5", Soldier),
            ("P6", Slayer),
            ("P7", Undertaker),
            ("P8", Saint),
            ("P9", Virgin),
            ("P10", Ravenkeeper),
            ("P11", Chef),
            ("P12", Monk),
            ("P13", Imp),
        ]],
    );
    Ok(())
}

#[test]
fn assumptions_never_add_worlds() -> Result<()> {
    let mut g = new_game(Perspective::Player, 7);
    g.add_night(1)?;
    g.add_shown_token("P1", Baron)?;
    g.add_minion_info("P1", "P2", &[])?;
    g.add_day(1)?;
    g.add_role_claims(
        &[Ravenkeeper, Slayer, Undertaker, Saint, Mayor, Virgin, Monk],
        "P1",
    )?;
    let unconstrained = solve(&g)?.worlds.len();
    let r = SolverRequestBuilder::new().add_roles_in_play(&[Drunk]).build();
    assert!(solve_with(&g, &r)?.worlds.len() <= unconstrained);
    let r = SolverRequestBuilder::new().add_good(&["P3"]).build();
    assert!(solve_with(&g, &r)?.worlds.len() <= unconstrained);
    Ok(())
}
