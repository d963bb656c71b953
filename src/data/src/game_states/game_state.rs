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

use std::collections::HashMap;

use color_eyre::eyre::{bail, ensure, eyre};
use utils::outcome::{Outcome, Value, OK};

use crate::core::primitives::{
    Perspective, Script, Team, NUM_MINIONS, NUM_OUTSIDERS, NUM_TOWNSFOLK,
};
use crate::core::time::Time;
use crate::events::claim::{
    Audience, AudienceRecord, Claim, ClaimDetails, ClaimDetailsRecord, ClaimRecord,
};
use crate::events::log::{
    EventRecord, GameLog, InteractionDetails, InteractionRecord, Setup,
};
use crate::events::role_action::{
    GrimoireEntry, GrimoireEntryRecord, RoleAction, RoleActionRecord, SpyGrimoire,
    SpyGrimoireRecord,
};
use crate::script::Role;

/// One nomination, with the votes cast on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nomination {
    pub time: Time,
    pub nominator: usize,
    pub nominee: usize,
    pub votes: Vec<usize>,
    /// The nomination killed the nominator: a Virgin proc.
    pub virgin_proc: bool,
}

/// What a minion learns on night 1: the demon and their fellow minions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinionInfo {
    pub player: usize,
    pub demon: usize,
    pub minions: Vec<usize>,
}

/// What the demon learns on night 1: the minions and three good-role bluffs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemonInfo {
    pub player: usize,
    pub minions: Vec<usize>,
    pub bluffs: Vec<Role>,
}

/// The typed transcript of one game up to the current time.
///
/// Events are appended through the `add_*` methods, each of which validates
/// the transcript invariants and then commits the event both to the derived
/// state and to the retained [GameLog]. A failed add leaves the state
/// unusable; callers are expected to discard it.
#[derive(Debug, Clone)]
pub struct GameState {
    log: GameLog,
    perspective: Perspective,
    script: Script,
    players: Vec<String>,
    player_index: HashMap<String, usize>,
    num_players: usize,
    num_outsiders: usize,
    num_minions: usize,
    cur_time: Option<Time>,
    /// Is the player alive at the start of day x (index x - 1).
    is_alive_day: Vec<Vec<bool>>,
    /// Is the player alive at the start of night x (index x - 1).
    is_alive_night: Vec<Vec<bool>>,
    num_alive_day: Vec<usize>,
    num_alive_night: Vec<usize>,
    nominations: Vec<Nomination>,
    /// Per player, true once a dead hand was raised.
    dead_vote_used: Vec<bool>,
    on_the_block: Option<usize>,
    declared_no_executions: bool,
    /// Per day: the execution attempt, if any.
    executions: Vec<Option<usize>>,
    /// Not the same as `executions`, because executing a dead player is valid.
    execution_deaths: Vec<Option<usize>>,
    /// Per day: the death announced at dawn, if any.
    night_deaths: Vec<Option<usize>>,
    victory: Option<Team>,
    perspective_player: Option<usize>,
    /// Per night: the token shown to the perspective player.
    perspective_player_shown_token: Vec<Option<Role>>,
    role_actions: Vec<RoleAction>,
    claims: Vec<Claim>,
    minion_info: Option<MinionInfo>,
    demon_info: Option<DemonInfo>,
    // Storyteller perspective only: ground truth per night / day.
    st_night_roles: Vec<Vec<Role>>,
    st_day_roles: Vec<Vec<Role>>,
    st_shown_tokens: Vec<Vec<Option<Role>>>,
    st_red_herring: Option<usize>,
}

impl GameState {
    pub fn new(
        perspective: Perspective,
        script: Script,
        players: &[impl AsRef<str>],
    ) -> Value<Self> {
        let num_players = players.len();
        ensure!(
            (5..=15).contains(&num_players),
            "Trouble Brewing supports 5 to 15 players, got {num_players}"
        );
        let mut names = Vec::with_capacity(num_players);
        let mut player_index = HashMap::new();
        for (i, name) in players.iter().enumerate() {
            let name = name.as_ref().to_owned();
            ensure!(!name.is_empty(), "Player name cannot be empty string");
            ensure!(
                player_index.insert(name.clone(), i).is_none(),
                "Duplicate player name: {name}"
            );
            names.push(name);
        }
        Ok(Self {
            log: GameLog {
                perspective,
                script,
                players: names.clone(),
                setup: Setup::default(),
                events: vec![],
            },
            perspective,
            script,
            players: names,
            player_index,
            num_players,
            num_outsiders: NUM_OUTSIDERS[num_players - 5],
            num_minions: NUM_MINIONS[num_players - 5],
            cur_time: None,
            is_alive_day: vec![],
            is_alive_night: vec![],
            num_alive_day: vec![],
            num_alive_night: vec![],
            nominations: vec![],
            dead_vote_used: vec![false; num_players],
            on_the_block: None,
            declared_no_executions: false,
            executions: vec![],
            execution_deaths: vec![],
            night_deaths: vec![],
            victory: None,
            perspective_player: None,
            perspective_player_shown_token: vec![],
            role_actions: vec![],
            claims: vec![],
            minion_info: None,
            demon_info: None,
            st_night_roles: vec![],
            st_day_roles: vec![],
            st_shown_tokens: vec![],
            st_red_herring: None,
        })
    }

    /// Replays a serialized transcript into a fresh state.
    pub fn from_log(log: &GameLog) -> Value<Self> {
        let mut g = Self::new(log.perspective, log.script, &log.players)?;
        if !log.setup.player_roles.is_empty() {
            let mut roles = vec![None; g.num_players];
            for (name, role) in &log.setup.player_roles {
                roles[g.player_index(name)?] = Some(*role);
            }
            let roles = roles
                .into_iter()
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| eyre!("Expected fully assigned player roles"))?;
            g.set_roles(&roles)?;
        }
        if !log.setup.red_herring.is_empty() {
            g.set_red_herring(&log.setup.red_herring)?;
        }
        for event in &log.events {
            g.add_event(event)?;
        }
        Ok(g)
    }

    pub fn to_log(&self) -> &GameLog {
        &self.log
    }

    /// Storyteller-only: the actual roles, in seating order.
    pub fn set_roles(&mut self, roles: &[Role]) -> Outcome {
        ensure!(
            self.perspective == Perspective::Storyteller,
            "Player roles assigned in non-storyteller perspective."
        );
        ensure!(
            roles.len() == self.num_players,
            "Expected fully assigned player roles in storyteller perspective"
        );
        ensure!(self.st_night_roles.is_empty(), "Player roles have already been set");
        ensure!(self.cur_time.is_none(), "Player roles must be set before night 1");
        for (i, role) in roles.iter().enumerate() {
            self.log.setup.player_roles.insert(self.players[i].clone(), *role);
        }
        self.st_night_roles.push(roles.to_vec());
        OK
    }

    /// Storyteller-only: the Fortune Teller's red herring.
    pub fn set_red_herring(&mut self, red_herring: &str) -> Outcome {
        if self.perspective != Perspective::Storyteller {
            ensure!(
                red_herring.is_empty(),
                "Red-herring info in non-storyteller perspective."
            );
        }
        ensure!(
            self.st_night_roles.len() == 1,
            "Red herring info needs to be set after roles"
        );
        let has_ft = self.st_night_roles[0].contains(&Role::FortuneTeller);
        ensure!(
            has_ft == !red_herring.is_empty(),
            "A game needs to have a red herring if and only if a Fortune Teller is in play"
        );
        self.log.setup.red_herring = red_herring.to_owned();
        self.st_red_herring = self.player_index_opt(red_herring)?;
        OK
    }

    pub fn add_event(&mut self, event: &EventRecord) -> Outcome {
        match event {
            EventRecord::Night(count) => self.add_night(*count),
            EventRecord::Day(count) => self.add_day(*count),
            EventRecord::StorytellerInteraction(interaction) => {
                self.add_storyteller_interaction(interaction)
            }
            EventRecord::Nomination { nominator, nominee } => {
                self.add_nomination(nominator, nominee)
            }
            EventRecord::Vote { votes, num_votes, on_the_block } => {
                let votes: Vec<&str> = votes.iter().map(String::as_str).collect();
                self.add_vote_full(&votes, *num_votes, on_the_block)
            }
            EventRecord::Execution(name) => self.add_execution(name),
            EventRecord::Death(name) => self.add_death(name),
            EventRecord::NightDeath(name) => self.add_night_death(name),
            EventRecord::Claim(record) => {
                let claim = self.claim_from_record(record)?;
                self.add_claim(claim)
            }
            EventRecord::Whisper { players, initiator } => {
                let players: Vec<&str> = players.iter().map(String::as_str).collect();
                self.add_whisper(&players, initiator)
            }
            EventRecord::Victory(team) => self.add_victory(*team),
        }
    }

    fn add_storyteller_interaction(&mut self, interaction: &InteractionRecord) -> Outcome {
        let player = interaction.player.clone();
        match &interaction.details {
            InteractionDetails::ShownToken(role) => self.add_shown_token(&player, *role),
            InteractionDetails::MinionInfo { demon, minions } => {
                let minions: Vec<&str> = minions.iter().map(String::as_str).collect();
                self.add_minion_info(&player, demon, &minions)
            }
            InteractionDetails::DemonInfo { minions, bluffs } => {
                let minions: Vec<&str> = minions.iter().map(String::as_str).collect();
                self.add_demon_info(&player, &minions, bluffs)
            }
            InteractionDetails::RoleAction(record) => {
                let ra = self.role_action_from_record(record)?;
                self.add_role_action(&player, ra)
            }
        }
    }

    pub fn add_night(&mut self, count: u32) -> Outcome {
        let next = self.next_time();
        ensure!(
            next == Time::night(count),
            "{} needs to be followed by {next}",
            self.time_name()
        );
        self.log.events.push(EventRecord::Night(count));
        self.cur_time = Some(next);
        let count = count as usize;
        if self.perspective == Perspective::Storyteller {
            ensure!(
                !self.st_night_roles.is_empty(),
                "Roles need to be set before night 1 in the storyteller perspective"
            );
            if self.st_night_roles.len() < count {
                let roles = self.st_day_roles.last().unwrap().clone();
                self.st_night_roles.push(roles);
            }
            let shown_tokens = if count == 1 {
                vec![None; self.num_players]
            } else {
                self.st_shown_tokens.last().unwrap().clone()
            };
            self.st_shown_tokens.push(shown_tokens);
        }
        if self.perspective == Perspective::Player {
            let token =
                if count == 1 { None } else { *self.perspective_player_shown_token.last().unwrap() };
            self.perspective_player_shown_token.push(token);
        }
        if count == 1 {
            self.is_alive_night.push(vec![true; self.num_players]);
            self.num_alive_night.push(self.num_players);
        } else if self.is_alive_night.len() < count {
            self.is_alive_night.push(self.is_alive_day.last().unwrap().clone());
            self.num_alive_night.push(*self.num_alive_day.last().unwrap());
        }
        OK
    }

    pub fn add_day(&mut self, count: u32) -> Outcome {
        let next = self.next_time();
        ensure!(
            next == Time::day(count),
            "{} needs to be followed by {next}",
            self.time_name()
        );
        self.log.events.push(EventRecord::Day(count));
        self.cur_time = Some(next);
        self.on_the_block = None;
        self.declared_no_executions = false;
        self.executions.push(None);
        self.execution_deaths.push(None);
        self.night_deaths.push(None);
        let count = count as usize;
        if self.perspective == Perspective::Storyteller && self.st_day_roles.len() < count {
            let roles = self.st_night_roles.last().unwrap().clone();
            self.st_day_roles.push(roles);
        }
        if count == 1 {
            self.is_alive_day.push(vec![true; self.num_players]);
            self.num_alive_day.push(self.num_players);
        } else {
            self.is_alive_day.push(self.is_alive_night.last().unwrap().clone());
            self.num_alive_day.push(*self.num_alive_night.last().unwrap());
        }
        OK
    }

    pub fn add_nomination(&mut self, nominator: &str, nominee: &str) -> Outcome {
        self.log.events.push(EventRecord::Nomination {
            nominator: nominator.to_owned(),
            nominee: nominee.to_owned(),
        });
        let now = self.now()?;
        ensure!(now.is_day(), "Nominations can only occur during the day.");
        let nominator_index = self.player_index(nominator)?;
        let nominee_index = self.player_index(nominee)?;
        ensure!(
            self.is_alive_index(nominator_index),
            "{nominator} is dead and cannot nominate."
        );
        for n in self.nominations.iter().rev() {
            if n.time != now {
                break;
            }
            ensure!(
                n.nominator != nominator_index,
                "{nominator} has already nominated today."
            );
            ensure!(n.nominee != nominee_index, "{nominee} has already been nominated today.");
        }
        self.nominations.push(Nomination {
            time: now,
            nominator: nominator_index,
            nominee: nominee_index,
            votes: vec![],
            virgin_proc: false,
        });
        OK
    }

    pub fn add_vote(&mut self, votes: &[&str], on_the_block: &str) -> Outcome {
        self.add_vote_full(votes, votes.len(), on_the_block)
    }

    pub fn add_vote_count(&mut self, num_votes: usize, on_the_block: &str) -> Outcome {
        self.add_vote_full(&[], num_votes, on_the_block)
    }

    pub fn add_vote_full(
        &mut self,
        votes: &[&str],
        num_votes: usize,
        on_the_block: &str,
    ) -> Outcome {
        self.log.events.push(EventRecord::Vote {
            votes: votes.iter().map(|v| (*v).to_owned()).collect(),
            num_votes,
            on_the_block: on_the_block.to_owned(),
        });
        ensure!(!self.nominations.is_empty(), "A vote must have a preceding nomination.");
        let now = self.now()?;
        let num_alive = self.num_alive();
        // Votes needed to put the nominee on the block, from the day's
        // nominations so far.
        let mut needed_votes = 0;
        for n in self.nominations.iter().rev() {
            if n.time != now {
                break;
            }
            needed_votes = needed_votes.max(n.votes.len());
        }
        let mut voters = Vec::with_capacity(votes.len());
        for name in votes {
            let i = self.player_index(name)?;
            ensure!(!self.dead_vote_used[i], "{name} has already used their dead vote");
            if !self.is_alive_index(i) {
                self.dead_vote_used[i] = true;
            }
            voters.push(i);
        }
        let cur_block = self.player_index_opt(on_the_block)?;
        let cur_votes = num_votes.max(votes.len());
        let nominee;
        {
            let nomination = self.nominations.last_mut().unwrap();
            nomination.virgin_proc = false; // Otherwise we'd have an execution.
            nomination.votes.extend(voters);
            nominee = nomination.nominee;
        }
        let nominee_name = &self.players[nominee];
        if self.on_the_block.is_none() {
            let votes_required =
                if needed_votes == 0 { (num_alive + 1) / 2 } else { needed_votes + 1 };
            if cur_votes < votes_required {
                // Vote fails, nothing changed.
                ensure!(
                    cur_block == self.on_the_block,
                    "Needed {votes_required} votes to put {nominee_name} on the block, got \
                     {cur_votes}"
                );
            } else {
                ensure!(
                    cur_block == Some(nominee),
                    "{nominee_name} expected to go on the block, got: {on_the_block}"
                );
            }
        } else if cur_votes < needed_votes {
            // Vote fails, nothing changed.
            ensure!(
                cur_block == self.on_the_block,
                "Needed {} votes to put {nominee_name} on the block, got {cur_votes}",
                needed_votes + 1
            );
        } else if cur_votes == needed_votes {
            // Tied vote, no one on the block.
            ensure!(
                cur_block.is_none(),
                "Tied vote, no one goes on the block, got: {on_the_block}"
            );
        } else {
            ensure!(
                cur_block == Some(nominee),
                "{nominee_name} expected to go on the block, got: {on_the_block}"
            );
        }
        self.on_the_block = cur_block;
        OK
    }

    /// An empty name declares that nominations are closed with no execution.
    pub fn add_execution(&mut self, name: &str) -> Outcome {
        self.log.events.push(EventRecord::Execution(name.to_owned()));
        let now = self.now()?;
        ensure!(now.is_day(), "Executions can only occur during the day.");
        ensure!(!self.declared_no_executions, "No executions was already declared.");
        let Some(executee) = self.player_index_opt(name)? else {
            self.declared_no_executions = true;
            return OK;
        };
        ensure!(
            self.executions.last().unwrap().is_none(),
            "More than one execution attempted."
        );
        ensure!(!self.nominations.is_empty(), "Execution must have a preceding nomination.");
        let nomination = self.nominations.last_mut().unwrap();
        if Some(executee) != self.on_the_block {
            ensure!(
                executee == nomination.nominator,
                "Execution needs to be either of {} (who is on the block), or of {} who is \
                 last to nominate, got {name}",
                self.on_the_block.map(|i| self.players[i].clone()).unwrap_or_else(|| "nobody".to_owned()),
                self.players[nomination.nominator]
            );
            nomination.virgin_proc = true;
        }
        *self.executions.last_mut().unwrap() = Some(executee);
        OK
    }

    /// Shorthand for adding a nomination, a successful vote and the execution
    /// in one go, for cases where the actual hands don't matter to the solve.
    pub fn add_nomination_vote_execution(&mut self, nominator: &str, executee: &str) -> Outcome {
        self.add_nomination(nominator, executee)?;
        let num_votes = self.num_alive() - self.deaths(self.now()?).len();
        self.add_vote_count(num_votes, executee)?;
        self.add_execution(executee)
    }

    pub fn add_night_death(&mut self, name: &str) -> Outcome {
        self.log.events.push(EventRecord::NightDeath(name.to_owned()));
        // Deaths are storyteller announcements, hence they only occur during
        // the day.
        let now = self.now()?;
        ensure!(now.is_day(), "Death announcements can only occur during the day.");
        let i = self.player_index(name)?;
        ensure!(self.is_alive_index(i), "What is dead may never die: {name}");
        let night_death = self.night_deaths.last_mut().unwrap();
        ensure!(night_death.is_none(), "No two night deaths in Trouble Brewing");
        *night_death = Some(i);
        self.is_alive_day.last_mut().unwrap()[i] = false;
        *self.num_alive_day.last_mut().unwrap() -= 1;
        OK
    }

    pub fn add_death(&mut self, name: &str) -> Outcome {
        self.log.events.push(EventRecord::Death(name.to_owned()));
        let now = self.now()?;
        ensure!(now.is_day(), "Death announcements can only occur during the day.");
        let i = self.player_index(name)?;
        ensure!(self.is_alive_index(i), "What is dead may never die: {name}");
        // Day deaths in Trouble Brewing are either executions or Slayer shots.
        if let Some(executee) = *self.executions.last().unwrap() {
            ensure!(
                i == executee,
                "Expected death of executee {}, got {name}.",
                self.players[executee]
            );
            *self.execution_deaths.last_mut().unwrap() = Some(executee);
        } else {
            // Must be a Slayer kill, due to order.
            let shot = self.role_actions.last_mut();
            let Some(shot) = shot.filter(|ra| ra.acting == Some(Role::Slayer)) else {
                bail!("{name}: no possible death cause");
            };
            shot.yes = true; // Killed.
            let target = shot.players[0];
            let slayer = shot.player.unwrap();
            ensure!(
                i == target,
                "Expected death of Slayer shot {}, got {name}.",
                self.players[target]
            );
            ensure!(
                self.is_alive_index(slayer),
                "Slayer {} needs to be alive to proc.",
                self.players[slayer]
            );
        }
        if self.is_alive_night.len() <= now.index() + 1 {
            self.is_alive_night.push(self.is_alive_day.last().unwrap().clone());
            self.num_alive_night.push(*self.num_alive_day.last().unwrap());
        }
        self.is_alive_night.last_mut().unwrap()[i] = false;
        *self.num_alive_night.last_mut().unwrap() -= 1;
        OK
    }

    pub fn add_victory(&mut self, victory: Team) -> Outcome {
        self.log.events.push(EventRecord::Victory(victory));
        ensure!(
            self.victory.is_none(),
            "Team {} has already won.",
            self.victory.unwrap()
        );
        ensure!(self.now()?.is_day(), "Victory can only be announced during the day.");
        self.victory = Some(victory);
        OK
    }

    pub fn add_whisper(&mut self, players: &[&str], initiator: &str) -> Outcome {
        ensure!(players.len() >= 2, "A whisper needs to have at least 2 players");
        for name in players {
            self.player_index(name)?;
        }
        self.player_index_opt(initiator)?;
        self.log.events.push(EventRecord::Whisper {
            players: players.iter().map(|p| (*p).to_owned()).collect(),
            initiator: initiator.to_owned(),
        });
        OK
    }

    // Claims.

    pub fn add_claim(&mut self, claim: Claim) -> Outcome {
        self.log.events.push(EventRecord::Claim(self.claim_to_record(&claim)));
        if !self.is_strong_claim(&claim) {
            return OK;
        }
        let now = self.now()?;
        ensure!(
            now.is_day(),
            "Claims only occur during the day, got {} claiming on {now}.",
            self.players[claim.player]
        );
        let mut c = claim;
        c.claim_time = Some(now);
        match &mut c.details {
            ClaimDetails::Role(role) => {
                if c.time.is_none() {
                    // An omitted role claim time means night 1, except for the
                    // Imp, which is the Recluse starpass claim about the last
                    // night.
                    c.time = Some(if *role == Role::Imp { now - 1 } else { Time::night(1) });
                }
                ensure!(
                    c.time.unwrap().is_night(),
                    "Role claims need to be for nights, when role tokens are shown"
                );
            }
            ClaimDetails::RoleAction(ra) => {
                let acting = ra
                    .acting
                    .ok_or_else(|| eyre!("Each role action claim needs to specify an acting role"))?;
                let day_role = acting.has_day_action();
                if c.time.is_none() {
                    c.time = Some(if acting.is_first_night_only() {
                        Time::night(1)
                    } else if day_role {
                        now
                    } else {
                        now - 1
                    });
                }
                let time = c.time.unwrap();
                ensure!(
                    time.is_day() == day_role,
                    "Role action claims for {acting} need to be by {}",
                    if day_role { "day" } else { "night" }
                );
                ra.time = c.time;
                if ra.player.is_none() {
                    ra.player = Some(c.player);
                }
                if acting == Role::Undertaker {
                    ra.players = self.undertaker_ping(time);
                }
            }
            _ => unreachable!("strong claims are role or role-action claims"),
        }
        self.claims.push(c);
        OK
    }

    /// The ping an Undertaker action or claim for `night` refers to: the
    /// previous day's execution death.
    fn undertaker_ping(&self, night: Time) -> Vec<usize> {
        if night.count < 2 {
            return vec![];
        }
        self.execution_deaths
            .get(night.index() - 1)
            .copied()
            .flatten()
            .map(|i| vec![i])
            .unwrap_or_default()
    }

    /// Strong claims are the claims used for determining all mechanically
    /// possible worlds. Other claims are recorded but do not constrain the
    /// solve.
    fn is_strong_claim(&self, c: &Claim) -> bool {
        if !c.audience.townsquare {
            return false;
        }
        match &c.details {
            ClaimDetails::Role(_) => true,
            ClaimDetails::RoleAction(ra) => ra.is_well_defined(),
            _ => false,
        }
    }

    pub fn add_claim_role(&mut self, player: &str, role: Role) -> Outcome {
        let claim = self.new_claim_role(player, role, None)?;
        self.add_claim(claim)
    }

    pub fn add_claim_role_at(&mut self, player: &str, role: Role, time: Time) -> Outcome {
        let claim = self.new_claim_role(player, role, Some(time))?;
        self.add_claim(claim)
    }

    pub fn add_claim_action(&mut self, player: &str, action: RoleAction) -> Outcome {
        let claim = self.new_claim_action(player, action, None)?;
        self.add_claim(claim)
    }

    pub fn add_claim_action_at(
        &mut self,
        player: &str,
        action: RoleAction,
        time: Time,
    ) -> Outcome {
        let claim = self.new_claim_action(player, action, Some(time))?;
        self.add_claim(claim)
    }

    fn new_claim_role(&self, player: &str, role: Role, time: Option<Time>) -> Value<Claim> {
        Ok(Claim {
            claim_time: None,
            player: self.player_index(player)?,
            audience: Audience::townsquare(),
            time,
            details: ClaimDetails::Role(role),
        })
    }

    fn new_claim_action(
        &self,
        player: &str,
        action: RoleAction,
        time: Option<Time>,
    ) -> Value<Claim> {
        Ok(Claim {
            claim_time: None,
            player: self.player_index(player)?,
            audience: Audience::townsquare(),
            time,
            details: ClaimDetails::RoleAction(action),
        })
    }

    /// A ring of night-1 role claims, one per player, starting from
    /// `starting_player` and proceeding clockwise.
    pub fn add_role_claims(
        &mut self,
        roles: &[Role],
        starting_player: &str,
    ) -> Outcome {
        let mut i = self.player_index(starting_player)?;
        for role in roles {
            let player = self.players[i].clone();
            self.add_claim_role(&player, *role)?;
            i = (i + 1) % self.num_players;
        }
        OK
    }

    // Storyteller interactions.

    pub fn add_shown_token(&mut self, player: &str, role: Role) -> Outcome {
        self.log.events.push(EventRecord::StorytellerInteraction(InteractionRecord {
            player: player.to_owned(),
            details: InteractionDetails::ShownToken(role),
        }));
        ensure!(role != Role::Drunk, "No one can be shown the DRUNK token");
        ensure!(
            self.perspective != Perspective::Observer,
            "Observer cannot be shown tokens"
        );
        let now = self.now()?;
        ensure!(now.is_night(), "Tokens are only shown at night");
        let i = self.player_index(player)?;
        let prev = match self.perspective {
            Perspective::Storyteller => Some(self.st_night_roles.last().unwrap()[i]),
            _ => *self.perspective_player_shown_token.last().unwrap(),
        };
        self.validate_role_change(i, prev, role)?;
        if self.perspective == Perspective::Storyteller {
            self.st_shown_tokens.last_mut().unwrap()[i] = Some(role);
        } else {
            ensure!(
                self.perspective_player.is_none() || self.perspective_player == Some(i),
                "Only {} can be shown a token in player perspective",
                self.perspective_player.map(|p| self.players[p].clone()).unwrap_or_default()
            );
            // Deducing the perspective player.
            self.perspective_player = Some(i);
            *self.perspective_player_shown_token.last_mut().unwrap() = Some(role);
        }
        OK
    }

    pub fn add_all_shown_tokens(&mut self, roles: &[Role]) -> Outcome {
        ensure!(
            self.perspective == Perspective::Storyteller,
            "Only the Storyteller perspective can show all tokens"
        );
        for (i, role) in roles.iter().enumerate() {
            let player = self.players[i].clone();
            self.add_shown_token(&player, *role)?;
        }
        OK
    }

    fn validate_role_change(&mut self, player: usize, prev: Option<Role>, role: Role) -> Outcome {
        let now = self.now()?;
        if now == Time::night(1) || prev.is_none() {
            return OK;
        }
        let prev = prev.unwrap();
        ensure!(
            role == Role::Imp,
            "Tokens other than Imp are only shown on night 1 in Trouble Brewing"
        );
        if role.is_demon() {
            ensure!(
                prev.is_minion() || prev == Role::Recluse,
                "Only minions or the Recluse can become the Imp"
            );
            if self.perspective == Perspective::Storyteller {
                // The Imp must either have been day killed or self-pick tonight.
                if self.demon_day_killed() {
                    ensure!(
                        prev == Role::ScarletWoman,
                        "Only the Scarlet Woman can become the Demon after a day death, got {}",
                        self.players[player]
                    );
                    self.st_night_roles.last_mut().unwrap()[player] = role;
                    return OK;
                }
                ensure!(
                    self.imp_starpassed()?,
                    "Imp needs to starpass in order for {} to become the Imp",
                    self.players[player]
                );
                ensure!(
                    self.st_day_roles.len() == now.index(),
                    "An Imp can starpass to only one player"
                );
                let mut day_roles = self.st_night_roles.last().unwrap().clone();
                day_roles[player] = role;
                self.st_day_roles.push(day_roles);
            }
            return OK;
        }
        ensure!(
            (prev == Role::Drunk && role.is_townsfolk()) || role == prev,
            "Expected {} to be shown {prev}, got {role}",
            self.players[player]
        );
        OK
    }

    /// Storyteller perspective, night time: did the demon die during the
    /// previous day?
    fn demon_day_killed(&self) -> bool {
        let now = self.now().expect("time must be set");
        self.deaths(now - 1)
            .iter()
            .any(|&i| self.st_day_roles.last().unwrap()[i].is_demon())
    }

    /// Storyteller perspective, night time: did the Imp self-pick tonight?
    fn imp_starpassed(&self) -> Value<bool> {
        let imp_pick = self
            .role_actions_of_role(Role::Imp)
            .last()
            .copied()
            .cloned()
            .ok_or_else(|| eyre!("Missing Imp action {}", self.time_name()))?;
        Ok(imp_pick.player == Some(imp_pick.players[0]))
    }

    pub fn add_minion_info(&mut self, player: &str, demon: &str, minions: &[&str]) -> Outcome {
        self.log.events.push(EventRecord::StorytellerInteraction(InteractionRecord {
            player: player.to_owned(),
            details: InteractionDetails::MinionInfo {
                demon: demon.to_owned(),
                minions: minions.iter().map(|m| (*m).to_owned()).collect(),
            },
        }));
        ensure!(self.num_players >= 7, "Minion info unavailable for < 7 players");
        ensure!(
            self.perspective != Perspective::Observer,
            "Minion info can only be shown in player or storyteller perspective"
        );
        ensure!(
            self.now()? == Time::night(1),
            "Minion info is only shown on night 1"
        );
        let i = self.player_index(player)?;
        ensure!(
            self.shown_token_of(i, Time::night(1)).is_some_and(Role::is_minion),
            "Player {player} needs to be shown a minion token in order to get minion info"
        );
        ensure!(
            minions.len() == self.num_minions - 1,
            "Expected {} fellow minions, got {}",
            self.num_minions - 1,
            minions.len()
        );
        ensure!(player != demon, "Demon needs to be different than all minions");
        let mut ms = vec![];
        for m in minions {
            ensure!(
                *m != player,
                "Minion info for {player} should contain {} other minions",
                self.num_minions - 1
            );
            ensure!(*m != demon, "Demon needs to be different than all minions");
            ms.push(self.player_index(m)?);
        }
        self.minion_info =
            Some(MinionInfo { player: i, demon: self.player_index(demon)?, minions: ms });
        OK
    }

    pub fn add_demon_info(&mut self, player: &str, minions: &[&str], bluffs: &[Role]) -> Outcome {
        self.log.events.push(EventRecord::StorytellerInteraction(InteractionRecord {
            player: player.to_owned(),
            details: InteractionDetails::DemonInfo {
                minions: minions.iter().map(|m| (*m).to_owned()).collect(),
                bluffs: bluffs.to_vec(),
            },
        }));
        ensure!(self.num_players >= 7, "Demon info unavailable for < 7 players");
        ensure!(
            self.perspective != Perspective::Observer,
            "Demon info can only be shown in player or storyteller perspective"
        );
        ensure!(self.now()? == Time::night(1), "Demon info is only shown on night 1");
        let i = self.player_index(player)?;
        ensure!(
            self.shown_token_of(i, Time::night(1)).is_some_and(Role::is_demon),
            "Player {player} needs to be shown a Demon token in order to get demon info"
        );
        ensure!(
            minions.len() == self.num_minions,
            "Demon info should have {} minions",
            self.num_minions
        );
        let mut ms = vec![];
        for m in minions {
            ensure!(*m != player, "Demon needs to be different than all minions");
            ms.push(self.player_index(m)?);
        }
        ensure!(bluffs.len() == 3, "Demon info should have 3 bluffs");
        for bluff in bluffs {
            ensure!(
                bluff.is_good(),
                "Expected demon bluffs good roles only, got {bluff}"
            );
        }
        self.demon_info = Some(DemonInfo { player: i, minions: ms, bluffs: bluffs.to_vec() });
        OK
    }

    pub fn add_role_action(&mut self, player: &str, role_action: RoleAction) -> Outcome {
        self.log.events.push(EventRecord::StorytellerInteraction(InteractionRecord {
            player: player.to_owned(),
            details: InteractionDetails::RoleAction(self.role_action_to_record(&role_action)),
        }));
        let mut ra = role_action;
        ra.player = Some(self.player_index(player)?);
        if ra.time.is_none() {
            ra.time = Some(self.now()?);
        }
        if ra.acting.is_none() {
            // Infer the acting role from the shown token.
            ra.acting = self.shown_token_of(ra.player.unwrap(), self.now()?);
            ensure!(
                ra.acting.is_some(),
                "Cannot infer role for player action {player}"
            );
        }
        if ra.acting == Some(Role::Undertaker) {
            ra.players = self.undertaker_ping(ra.time.unwrap());
        }
        self.validate_role_action(&ra)?;
        self.role_actions.push(ra);
        OK
    }

    fn validate_role_action(&self, ra: &RoleAction) -> Outcome {
        let acting = ra.acting.unwrap();
        let i = ra.player.unwrap();
        let player = &self.players[i];
        let now = self.now()?;
        let day_role = acting.has_day_action();
        ensure!(
            now.is_day() == day_role,
            "{acting} actions only occur during the {}",
            if day_role { "day" } else { "night" }
        );
        ensure!(self.is_alive_index(i), "Dead players don't get role actions");
        ensure!(
            acting.has_public_action() || self.perspective != Perspective::Observer,
            "Observer cannot see {acting} actions"
        );
        if self.perspective == Perspective::Storyteller {
            let shown = self.st_shown_tokens.last().unwrap()[i];
            ensure!(
                shown == Some(acting),
                "{player} needs to be the {acting}, got {}",
                shown.map(|r| r.to_string()).unwrap_or_default()
            );
        } else if self.perspective == Perspective::Player && !acting.has_public_action() {
            ensure!(
                Some(i) == self.perspective_player,
                "Only the {acting} or Storyteller perspective can see {acting} actions"
            );
            let token = *self.perspective_player_shown_token.last().unwrap();
            ensure!(
                token == Some(acting),
                "{player} needs to be the {acting}, got {}",
                token.map(|r| r.to_string()).unwrap_or_default()
            );
        }
        let max_chef_number = self.num_minions as i32 + 1; // Possible Recluse.
        match acting {
            Role::Washerwoman => {
                ensure!(ra.players.len() == 2, "Washerwoman should have exactly 2 pings");
                ensure!(ra.roles.len() == 1, "Washerwoman should learn 1 role");
                ensure!(ra.roles[0].is_townsfolk(), "Washerwoman learns a Townsfolk role");
            }
            Role::Librarian => {
                if ra.roles.is_empty() {
                    ensure!(
                        ra.players.is_empty(),
                        "Librarian with no outsiders learns no pings"
                    );
                } else {
                    ensure!(ra.players.len() == 2, "Librarian should have exactly 2 pings");
                    ensure!(ra.roles.len() == 1, "Librarian should learn 1 role");
                    ensure!(ra.roles[0].is_outsider(), "Librarian learns an Outsider role");
                }
            }
            Role::Investigator => {
                ensure!(ra.players.len() == 2, "Investigator should have 2 pings");
                ensure!(ra.roles.len() == 1, "Investigator should learn 1 role");
                ensure!(ra.roles[0].is_minion(), "Investigator learns a Minion role");
            }
            Role::Chef => {
                ensure!(ra.number >= 0, "Expected Chef number >=0, got {}", ra.number);
                ensure!(
                    ra.number <= max_chef_number,
                    "Expected Chef number <={max_chef_number}, got {}",
                    ra.number
                );
            }
            Role::Empath => {
                // We don't check that the number is in [0, 2], because in rare
                // cases the storyteller technically could give a higher number
                // to inform the Empath that they are drunk or poisoned.
                ensure!(ra.number >= 0, "Expected non-negative Empath info");
            }
            Role::FortuneTeller => {
                ensure!(ra.players.len() == 2, "Fortune Teller should have 2 picks");
                ensure!(
                    ra.players[0] != ra.players[1],
                    "Fortune Teller needs to pick two different players"
                );
            }
            Role::Undertaker => {
                ensure!(now.count >= 2, "Undertaker gets info starting night 2");
                ensure!(
                    self.execution_deaths.last().is_some_and(Option::is_some),
                    "Nobody was executed, no Undertaker info"
                );
                ensure!(ra.roles.len() == 1, "Undertaker should learn 1 role");
            }
            Role::Monk => {
                ensure!(ra.players.len() == 1, "Monk should have 1 pick");
                ensure!(i != ra.players[0], "Monk cannot pick themselves");
            }
            Role::Ravenkeeper => {
                ensure!(ra.players.len() == 1, "Ravenkeeper should have 1 pick");
                ensure!(ra.roles.len() == 1, "Ravenkeeper should learn 1 role");
            }
            Role::Slayer => {
                ensure!(ra.players.len() == 1, "Slayer should have 1 pick");
            }
            Role::Butler => {
                ensure!(ra.players.len() == 1, "Butler should have 1 pick");
                ensure!(i != ra.players[0], "Butler cannot pick themselves");
            }
            Role::Poisoner => {
                ensure!(ra.players.len() == 1, "Poisoner should have 1 pick");
            }
            Role::Spy => {
                let grimoire = ra
                    .grimoire
                    .as_ref()
                    .ok_or_else(|| eyre!("Spy actions carry a grimoire snapshot"))?;
                self.validate_grimoire(grimoire)?;
            }
            Role::Imp => {
                ensure!(ra.players.len() == 1, "Imp should have 1 pick");
            }
            _ => bail!("Invalid role action role: {acting}"),
        }
        OK
    }

    fn validate_grimoire(&self, grimoire: &SpyGrimoire) -> Outcome {
        let mut covered = vec![false; self.num_players];
        for entry in &grimoire.entries {
            covered[entry.player] = true;
            if self.perspective == Perspective::Storyteller {
                let shown = self.st_shown_tokens.last().unwrap()[entry.player];
                ensure!(
                    Some(entry.role) == shown,
                    "Spy info has {} shown {}, but should be shown {}",
                    self.players[entry.player],
                    entry.role,
                    shown.map(|r| r.to_string()).unwrap_or_default()
                );
            }
        }
        for (i, covered) in covered.iter().enumerate() {
            ensure!(*covered, "Missing Spy info for {}", self.players[i]);
        }
        OK
    }

    // Role action builders.

    pub fn washerwoman_info(&self, ping1: &str, ping2: &str, role: Role) -> Value<RoleAction> {
        Ok(RoleAction {
            acting: Some(Role::Washerwoman),
            players: vec![self.player_index(ping1)?, self.player_index(ping2)?],
            roles: vec![role],
            ..Default::default()
        })
    }

    pub fn librarian_info(&self, ping1: &str, ping2: &str, role: Role) -> Value<RoleAction> {
        Ok(RoleAction {
            acting: Some(Role::Librarian),
            players: vec![self.player_index(ping1)?, self.player_index(ping2)?],
            roles: vec![role],
            ..Default::default()
        })
    }

    pub fn librarian_info_no_outsiders(&self) -> RoleAction {
        RoleAction { acting: Some(Role::Librarian), ..Default::default() }
    }

    pub fn investigator_info(&self, ping1: &str, ping2: &str, role: Role) -> Value<RoleAction> {
        Ok(RoleAction {
            acting: Some(Role::Investigator),
            players: vec![self.player_index(ping1)?, self.player_index(ping2)?],
            roles: vec![role],
            ..Default::default()
        })
    }

    pub fn chef_info(&self, number: i32) -> RoleAction {
        RoleAction { acting: Some(Role::Chef), number, ..Default::default() }
    }

    pub fn empath_info(&self, number: i32) -> RoleAction {
        RoleAction { acting: Some(Role::Empath), number, ..Default::default() }
    }

    pub fn fortune_teller_action(&self, pick1: &str, pick2: &str, yes: bool) -> Value<RoleAction> {
        Ok(RoleAction {
            acting: Some(Role::FortuneTeller),
            players: vec![self.player_index(pick1)?, self.player_index(pick2)?],
            yes,
            ..Default::default()
        })
    }

    pub fn monk_action(&self, pick: &str) -> Value<RoleAction> {
        Ok(RoleAction {
            acting: Some(Role::Monk),
            players: vec![self.player_index(pick)?],
            ..Default::default()
        })
    }

    pub fn butler_action(&self, pick: &str) -> Value<RoleAction> {
        Ok(RoleAction {
            acting: Some(Role::Butler),
            players: vec![self.player_index(pick)?],
            ..Default::default()
        })
    }

    pub fn ravenkeeper_action(&self, pick: &str, role: Role) -> Value<RoleAction> {
        Ok(RoleAction {
            acting: Some(Role::Ravenkeeper),
            players: vec![self.player_index(pick)?],
            roles: vec![role],
            ..Default::default()
        })
    }

    pub fn undertaker_info(&self, role: Role) -> RoleAction {
        RoleAction { acting: Some(Role::Undertaker), roles: vec![role], ..Default::default() }
    }

    pub fn slayer_action(&self, pick: &str) -> Value<RoleAction> {
        Ok(RoleAction {
            acting: Some(Role::Slayer),
            players: vec![self.player_index(pick)?],
            ..Default::default()
        })
    }

    pub fn poisoner_action(&self, pick: &str) -> Value<RoleAction> {
        Ok(RoleAction {
            acting: Some(Role::Poisoner),
            players: vec![self.player_index(pick)?],
            ..Default::default()
        })
    }

    pub fn imp_action(&self, pick: &str) -> Value<RoleAction> {
        Ok(RoleAction {
            acting: Some(Role::Imp),
            players: vec![self.player_index(pick)?],
            ..Default::default()
        })
    }

    pub fn spy_info(&self, grimoire: SpyGrimoire) -> RoleAction {
        RoleAction { acting: Some(Role::Spy), grimoire: Some(grimoire), ..Default::default() }
    }

    /// Builds a Spy grimoire from actual roles, substituting the Drunk's
    /// shown token where applicable.
    pub fn grimoire_from_roles(&self, roles: &[Role], drunk_shown_token: Option<Role>) -> SpyGrimoire {
        let entries = roles
            .iter()
            .enumerate()
            .map(|(player, role)| GrimoireEntry {
                player,
                role: if *role == Role::Drunk {
                    drunk_shown_token.expect("a Drunk grimoire entry needs a shown token")
                } else {
                    *role
                },
                is_drunk: *role == Role::Drunk,
                shroud: false,
            })
            .collect();
        SpyGrimoire { entries }
    }

    // Record conversions.

    fn role_action_to_record(&self, ra: &RoleAction) -> RoleActionRecord {
        RoleActionRecord {
            acting: ra.acting,
            players: ra.players.iter().map(|&i| self.players[i].clone()).collect(),
            roles: ra.roles.clone(),
            number: ra.number,
            yes: ra.yes,
            grimoire: ra.grimoire.as_ref().map(|g| SpyGrimoireRecord {
                entries: g
                    .entries
                    .iter()
                    .map(|e| GrimoireEntryRecord {
                        player: self.players[e.player].clone(),
                        role: e.role,
                        is_drunk: e.is_drunk,
                        shroud: e.shroud,
                    })
                    .collect(),
            }),
        }
    }

    fn role_action_from_record(&self, record: &RoleActionRecord) -> Value<RoleAction> {
        let mut players = vec![];
        for name in &record.players {
            players.push(self.player_index(name)?);
        }
        let grimoire = match &record.grimoire {
            None => None,
            Some(g) => {
                let mut entries = vec![];
                for e in &g.entries {
                    entries.push(GrimoireEntry {
                        player: self.player_index(&e.player)?,
                        role: e.role,
                        is_drunk: e.is_drunk,
                        shroud: e.shroud,
                    });
                }
                Some(SpyGrimoire { entries })
            }
        };
        Ok(RoleAction {
            time: None,
            player: None,
            acting: record.acting,
            players,
            roles: record.roles.clone(),
            number: record.number,
            yes: record.yes,
            grimoire,
        })
    }

    fn claim_to_record(&self, claim: &Claim) -> ClaimRecord {
        let audience = if claim.audience.townsquare {
            None
        } else if claim.audience.is_empty() {
            Some(AudienceRecord { players: vec![], nobody: true })
        } else {
            Some(AudienceRecord {
                players: claim
                    .audience
                    .players
                    .iter()
                    .map(|&i| self.players[i].clone())
                    .collect(),
                nobody: false,
            })
        };
        let details = match &claim.details {
            ClaimDetails::Role(role) => ClaimDetailsRecord::Role(*role),
            ClaimDetails::SoftRole(sr) => ClaimDetailsRecord::SoftRole(sr.clone()),
            ClaimDetails::RoleAction(ra) => {
                ClaimDetailsRecord::RoleAction(self.role_action_to_record(ra))
            }
            ClaimDetails::RoleEffect(ra) => {
                ClaimDetailsRecord::RoleEffect(self.role_action_to_record(ra))
            }
            ClaimDetails::Propagation(inner) => {
                ClaimDetailsRecord::Claim(Box::new(self.claim_to_record(inner)))
            }
            ClaimDetails::Retraction(inner) => {
                ClaimDetailsRecord::Retraction(Box::new(self.claim_to_record(inner)))
            }
        };
        ClaimRecord {
            player: self.players[claim.player].clone(),
            time: claim.time,
            audience,
            details,
        }
    }

    fn claim_from_record(&self, record: &ClaimRecord) -> Value<Claim> {
        let audience = match &record.audience {
            None => Audience::townsquare(),
            Some(a) if a.nobody => Audience::nobody(),
            Some(a) => {
                let mut players = vec![];
                for name in &a.players {
                    players.push(self.player_index(name)?);
                }
                Audience { players, townsquare: false }
            }
        };
        let details = match &record.details {
            ClaimDetailsRecord::Role(role) => ClaimDetails::Role(*role),
            ClaimDetailsRecord::SoftRole(sr) => ClaimDetails::SoftRole(sr.clone()),
            ClaimDetailsRecord::RoleAction(ra) => {
                ClaimDetails::RoleAction(self.role_action_from_record(ra)?)
            }
            ClaimDetailsRecord::RoleEffect(ra) => {
                ClaimDetails::RoleEffect(self.role_action_from_record(ra)?)
            }
            ClaimDetailsRecord::Claim(inner) => {
                ClaimDetails::Propagation(Box::new(self.claim_from_record(inner)?))
            }
            ClaimDetailsRecord::Retraction(inner) => {
                ClaimDetails::Retraction(Box::new(self.claim_from_record(inner)?))
            }
        };
        Ok(Claim {
            claim_time: None,
            player: self.player_index(&record.player)?,
            audience,
            time: record.time,
            details,
        })
    }

    // State accessors.

    pub fn current_time(&self) -> Option<Time> {
        self.cur_time
    }

    /// The current time, for callers who require a started game.
    pub fn now(&self) -> Value<Time> {
        self.cur_time.ok_or_else(|| eyre!("The game has not started yet"))
    }

    fn next_time(&self) -> Time {
        match self.cur_time {
            None => Time::night(1),
            Some(t) => t + 1,
        }
    }

    fn time_name(&self) -> String {
        match self.cur_time {
            None => "start of game".to_owned(),
            Some(t) => t.to_string(),
        }
    }

    pub fn script(&self) -> Script {
        self.script
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }

    pub fn perspective_player(&self) -> Option<usize> {
        self.perspective_player
    }

    pub fn num_players(&self) -> usize {
        self.num_players
    }

    pub fn num_minions(&self) -> usize {
        self.num_minions
    }

    pub fn num_outsiders(&self) -> usize {
        self.num_outsiders
    }

    pub fn num_townsfolk(&self) -> usize {
        NUM_TOWNSFOLK[self.num_players - 5]
    }

    pub fn player_names(&self) -> &[String] {
        &self.players
    }

    pub fn player_name(&self, i: usize) -> &str {
        &self.players[i]
    }

    pub fn player_index(&self, name: &str) -> Value<usize> {
        self.player_index
            .get(name)
            .copied()
            .ok_or_else(|| eyre!("Invalid player name: {name}"))
    }

    /// An empty name maps to no player.
    pub fn player_index_opt(&self, name: &str) -> Value<Option<usize>> {
        if name.is_empty() {
            return Ok(None);
        }
        self.player_index(name).map(Some)
    }

    /// The number of players alive at the start of the given day or night.
    pub fn num_alive_at(&self, time: Time) -> usize {
        let counts =
            if time.is_day() { &self.num_alive_day } else { &self.num_alive_night };
        counts[time.index()]
    }

    pub fn num_alive(&self) -> usize {
        self.num_alive_at(self.now().expect("time must be set"))
    }

    /// Whether the player was alive at the *start* of the given day or night.
    pub fn is_alive_at(&self, i: usize, time: Time) -> bool {
        assert!(
            Some(time) <= self.cur_time,
            "is_alive_at({time}) is in the future"
        );
        let alive = if time.is_day() { &self.is_alive_day } else { &self.is_alive_night };
        alive[time.index()][i]
    }

    pub fn is_alive_index(&self, i: usize) -> bool {
        self.is_alive_at(i, self.now().expect("time must be set"))
    }

    pub fn is_alive(&self, name: &str) -> bool {
        self.is_alive_index(self.player_index(name).expect("valid player name"))
    }

    pub fn used_dead_vote(&self, name: &str) -> bool {
        self.dead_vote_used[self.player_index(name).expect("valid player name")]
    }

    pub fn on_the_block(&self) -> Option<usize> {
        self.on_the_block
    }

    pub fn on_the_block_name(&self) -> &str {
        self.on_the_block.map(|i| self.player_name(i)).unwrap_or("")
    }

    /// The day's execution attempt, for the day containing `time`.
    pub fn execution(&self, time: Time) -> Option<usize> {
        let day = if time.is_day() { time.count } else { time.count - 1 } as usize;
        if day == 0 || self.executions.len() < day {
            return None;
        }
        self.executions[day - 1]
    }

    /// The day's execution death, for the day containing `time`.
    pub fn execution_death(&self, time: Time) -> Option<usize> {
        let day = if time.is_day() { time.count } else { time.count - 1 } as usize;
        if day == 0 || self.execution_deaths.len() < day {
            return None;
        }
        self.execution_deaths[day - 1]
    }

    /// The death that occurred during the given night, if announced.
    pub(crate) fn night_death(&self, night: Time) -> Option<usize> {
        self.night_deaths.get(night.index()).copied().flatten()
    }

    pub fn nominations(&self) -> &[Nomination] {
        &self.nominations
    }

    pub fn is_game_over(&self) -> bool {
        self.victory.is_some()
    }

    pub fn winning_team(&self) -> Option<Team> {
        self.victory
    }

    pub fn minion_info(&self) -> Option<&MinionInfo> {
        self.minion_info.as_ref()
    }

    pub fn demon_info(&self) -> Option<&DemonInfo> {
        self.demon_info.as_ref()
    }

    pub fn red_herring(&self) -> Option<usize> {
        self.st_red_herring
    }

    /// The player's actual role at the given time. Storyteller perspective
    /// only; calling this from any other perspective is a programming error.
    pub fn role_at(&self, player: usize, time: Time) -> Role {
        assert!(
            self.perspective == Perspective::Storyteller,
            "Roles are only available in the Storyteller perspective"
        );
        let roles = if time.is_day() { &self.st_day_roles } else { &self.st_night_roles };
        roles[time.index()][player]
    }

    pub fn role_of(&self, player: &str) -> Role {
        let i = self.player_index(player).expect("valid player name");
        self.role_at(i, self.now().expect("time must be set"))
    }

    /// The token shown to the player on the night of (or preceding) `time`,
    /// as far as this perspective knows.
    pub fn shown_token_of(&self, player: usize, time: Time) -> Option<Role> {
        match self.perspective {
            Perspective::Observer => None,
            Perspective::Player => {
                if Some(player) == self.perspective_player {
                    self.perspective_player_shown_token.get(time.index()).copied().flatten()
                } else {
                    None
                }
            }
            Perspective::Storyteller => {
                self.st_shown_tokens.get(time.index()).and_then(|tokens| tokens[player])
            }
        }
    }

    pub(crate) fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// All role actions taken by the given player, in transcript order.
    pub fn role_actions_of(&self, player: usize) -> Vec<&RoleAction> {
        self.role_actions.iter().filter(|ra| ra.player == Some(player)).collect()
    }

    /// All role actions of the given acting role, in transcript order.
    pub fn role_actions_of_role(&self, role: Role) -> Vec<&RoleAction> {
        self.role_actions.iter().filter(|ra| ra.acting == Some(role)).collect()
    }
}
