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

mod app;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

/// Enumerates every world consistent with a recorded Trouble Brewing game.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Game log file path (JSON).
    #[arg(long)]
    pub game_log: Option<PathBuf>,

    /// Use the built-in sample game instead of reading a game log.
    #[arg(long)]
    pub sample_game: bool,

    /// Solver request file path (JSON).
    #[arg(long)]
    pub solver_parameters: Option<PathBuf>,

    /// Optional model output file.
    #[arg(long)]
    pub output_model: Option<PathBuf>,

    /// Optional model variables output file.
    #[arg(long)]
    pub output_model_vars: Option<PathBuf>,

    /// Optional solution output file (JSON).
    #[arg(long)]
    pub output_solution: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    app::run(Args::parse())
}
