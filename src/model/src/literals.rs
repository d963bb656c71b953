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

/// A boolean variable of the constraint model. Two requests for the same
/// conceptual variable (by name) always return the same id.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VarId(pub(crate) u32);

impl VarId {
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A possibly negated variable. `lit.negate().negate() == lit`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Lit {
    pub(crate) var: VarId,
    pub(crate) negated: bool,
}

impl Lit {
    pub fn positive(var: VarId) -> Self {
        Self { var, negated: false }
    }

    pub fn negate(self) -> Self {
        Self { var: self.var, negated: !self.negated }
    }

    pub fn var(self) -> VarId {
        self.var
    }

    pub fn is_negated(self) -> bool {
        self.negated
    }
}

impl From<VarId> for Lit {
    fn from(var: VarId) -> Self {
        Self::positive(var)
    }
}

/// Negates every literal.
pub fn not_all(lits: &[Lit]) -> Vec<Lit> {
    lits.iter().map(|l| l.negate()).collect()
}
