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

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// The two halves of an in-game day. Within the same count, night comes
/// before day: the game starts with night 1, which is followed by day 1,
/// which is followed by night 2, and so on.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Night,
    Day,
}

/// In-game clock value, e.g. `night_3` or `day_1`.
///
/// Supports arithmetic in half-phase steps: `time + 1` is the next phase,
/// `time + 2` is the same phase one count later. Subtraction saturates at the
/// zero time (`day_0`), which is never a valid in-game time.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Time {
    pub phase: Phase,
    pub count: u32,
}

impl Time {
    pub fn night(count: u32) -> Self {
        Self { phase: Phase::Night, count }
    }

    pub fn day(count: u32) -> Self {
        Self { phase: Phase::Day, count }
    }

    pub fn is_day(&self) -> bool {
        self.phase == Phase::Day
    }

    pub fn is_night(&self) -> bool {
        self.phase == Phase::Night
    }

    /// Index of the count within per-phase storage vectors.
    pub fn index(&self) -> usize {
        (self.count - 1) as usize
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase {
            Phase::Night => "night",
            Phase::Day => "day",
        };
        write!(f, "{}_{}", phase, self.count)
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count.cmp(&other.count).then(self.phase.cmp(&other.phase))
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add<u32> for Time {
    type Output = Time;

    fn add(self, n: u32) -> Time {
        let mut t = self;
        t.count += n / 2;
        if n % 2 == 1 {
            if t.is_day() {
                t.count += 1;
            }
            t.phase = match t.phase {
                Phase::Night => Phase::Day,
                Phase::Day => Phase::Night,
            };
        }
        t
    }
}

impl Sub<u32> for Time {
    type Output = Time;

    fn sub(self, n: u32) -> Time {
        let mut t = self;
        t.count = t.count.saturating_sub(n / 2);
        if n % 2 == 1 {
            if t.is_night() {
                t.count = t.count.saturating_sub(1);
            }
            t.phase = match t.phase {
                Phase::Night => Phase::Day,
                Phase::Day => Phase::Night,
            };
        }
        if t.count == 0 {
            t.phase = Phase::Day;
        }
        t
    }
}

impl AddAssign<u32> for Time {
    fn add_assign(&mut self, n: u32) {
        *self = *self + n;
    }
}

impl SubAssign<u32> for Time {
    fn sub_assign(&mut self, n: u32) {
        *self = *self - n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_phase_iteration() {
        let mut times = vec![];
        let mut t = Time::night(1);
        while t < Time::day(3) {
            times.push(t.to_string());
            t += 1;
        }
        assert_eq!(times, vec!["night_1", "day_1", "night_2", "day_2", "night_3"]);
    }

    #[test]
    fn subtraction() {
        assert_eq!(Time::night(2) - 1, Time::day(1));
        assert_eq!(Time::night(2) - 2, Time::night(1));
        assert_eq!(Time::day(2) - 1, Time::night(2));
        assert_eq!(Time::day(2) - 2, Time::day(1));
    }

    #[test]
    fn same_phase_iteration() {
        let mut times = vec![];
        let mut t = Time::night(1);
        while t <= Time::night(4) {
            times.push(t.to_string());
            t += 2;
        }
        assert_eq!(times, vec!["night_1", "night_2", "night_3", "night_4"]);
    }

    #[test]
    fn ordering() {
        assert!(Time::night(1) < Time::day(1));
        assert!(Time::day(1) < Time::night(2));
        assert!(Time::night(3) > Time::day(2));
    }
}
