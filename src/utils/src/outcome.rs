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

use color_eyre::Report;

/// Represents the result of ingesting one game event.
///
/// Transcript validation failures are fatal for the game state being built:
/// the partial state must be discarded. They are reported as [Report]s rather
/// than panics so that a caller reading a game log from disk can surface the
/// offending event. A semantic "no possible worlds" is *not* an error and
/// never travels through this type.
pub type Outcome = Result<(), Report>;

/// Equivalent alias to [Outcome] which wraps a returned value
pub type Value<T> = Result<T, Report>;

/// Event ingested successfully, the transcript can continue
pub const OK: Outcome = Ok(());
