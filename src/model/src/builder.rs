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

use std::collections::{HashMap, HashSet};

use crate::literals::{not_all, Lit, VarId};

/// One high-level constraint of the model, later lowered to CNF.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// A single literal holds. Used for variable fixing; not de-duplicated.
    Unit(Lit),
    And(Vec<Lit>),
    Or(Vec<Lit>),
    Equal(Lit, Lit),
    Implies(Lit, Lit),
    ImpliesAnd(Lit, Vec<Lit>),
    ImpliesOr(Lit, Vec<Lit>),
    ImpliesEq(Lit, Lit, Lit),
    ImpliesSum(Lit, Vec<Lit>, usize),
    EqualitySum(Vec<Lit>, usize),
    /// `v = Σ lits`; since `v` is boolean this also caps the sum at one.
    EquivalentSum(Lit, Vec<Lit>),
    EquivalentSumEq(Lit, Vec<Lit>, usize),
    AtMostOne(Vec<Lit>),
    /// Unsatisfiable marker with a human-readable reason.
    Contradiction(String),
}

/// A boolean-constraint builder with two caches: variables are de-duplicated
/// by name, and constraints by a normalized textual form, so that the same
/// conceptual variable or clause is only ever added once.
#[derive(Debug, Default, Clone)]
pub struct Model {
    var_names: Vec<String>,
    var_cache: HashMap<String, VarId>,
    constraints: Vec<(String, Constraint)>,
    constraint_cache: HashSet<String>,
    const_true: Option<Lit>,
    const_false: Option<Lit>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached variable for `name`, creating it if needed.
    pub fn new_var(&mut self, name: &str) -> Lit {
        if let Some(&var) = self.var_cache.get(name) {
            return Lit::positive(var);
        }
        let var = self.alloc_var(name);
        self.var_cache.insert(name.to_owned(), var);
        Lit::positive(var)
    }

    /// Looks up a variable without creating it.
    pub fn find_var(&self, name: &str) -> Option<Lit> {
        self.var_cache.get(name).map(|&v| Lit::positive(v))
    }

    pub fn true_lit(&mut self) -> Lit {
        if let Some(lit) = self.const_true {
            return lit;
        }
        let lit = Lit::positive(self.alloc_var("1"));
        self.const_true = Some(lit);
        self.push_uncached(Constraint::Unit(lit));
        lit
    }

    pub fn false_lit(&mut self) -> Lit {
        if let Some(lit) = self.const_false {
            return lit;
        }
        let lit = Lit::positive(self.alloc_var("0"));
        self.const_false = Some(lit);
        self.push_uncached(Constraint::Unit(lit.negate()));
        lit
    }

    pub fn num_vars(&self) -> usize {
        self.var_names.len()
    }

    pub fn var_name(&self, var: VarId) -> &str {
        &self.var_names[var.index()]
    }

    pub fn constraints(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.constraints.iter().map(|(name, c)| (name.as_str(), c))
    }

    /// Constrains the variable to a constant.
    pub fn fix(&mut self, lit: Lit, value: bool) {
        self.push_uncached(Constraint::Unit(if value { lit } else { lit.negate() }));
    }

    pub fn add_and(&mut self, lits: &[Lit]) {
        let name = self.joined_name("^", lits);
        self.push(name, Constraint::And(lits.to_vec()));
    }

    pub fn add_or(&mut self, lits: &[Lit]) {
        let name = self.joined_name("V", lits);
        self.push(name, Constraint::Or(lits.to_vec()));
    }

    pub fn add_equal(&mut self, a: Lit, b: Lit) {
        let (left, right) =
            if self.lit_name(a) < self.lit_name(b) { (a, b) } else { (b, a) };
        let name = format!("{} = {}", self.lit_name(left), self.lit_name(right));
        self.push(name, Constraint::Equal(left, right));
    }

    pub fn add_equal_const(&mut self, lit: Lit, value: bool) {
        let other = if value { self.true_lit() } else { self.false_lit() };
        self.add_equal(lit, other);
    }

    pub fn add_implies(&mut self, a: Lit, b: Lit) {
        let name = format!("{} -> {}", self.lit_name(a), self.lit_name(b));
        self.push(name, Constraint::Implies(a, b));
    }

    pub fn add_implies_and(&mut self, cond: Lit, lits: &[Lit]) {
        if lits.is_empty() {
            self.fix(cond, false);
            return;
        }
        let name = format!("{} -> {}", self.lit_name(cond), self.joined_name("^", lits));
        self.push(name, Constraint::ImpliesAnd(cond, lits.to_vec()));
    }

    pub fn add_implies_or(&mut self, cond: Lit, lits: &[Lit]) {
        if lits.is_empty() {
            self.fix(cond, false);
            return;
        }
        let name = format!("{} -> {}", self.lit_name(cond), self.joined_name("V", lits));
        self.push(name, Constraint::ImpliesOr(cond, lits.to_vec()));
    }

    pub fn add_implies_eq(&mut self, cond: Lit, left: Lit, right: Lit) {
        let name = format!(
            "{} -> {} = {}",
            self.lit_name(cond),
            self.lit_name(left),
            self.lit_name(right)
        );
        self.push(name, Constraint::ImpliesEq(cond, left, right));
    }

    pub fn add_implies_sum(&mut self, cond: Lit, lits: &[Lit], sum: usize) {
        let name = format!(
            "{} -> {sum} = {}",
            self.lit_name(cond),
            self.joined_name("+", lits)
        );
        self.push(name, Constraint::ImpliesSum(cond, lits.to_vec(), sum));
    }

    pub fn add_equivalent_and(&mut self, var: Lit, lits: &[Lit]) {
        self.add_implies_and(var, lits);
        self.add_implies_or(var.negate(), &not_all(lits));
    }

    pub fn add_equivalent_or(&mut self, var: Lit, lits: &[Lit]) {
        self.add_implies_or(var, lits);
        self.add_implies_and(var.negate(), &not_all(lits));
    }

    pub fn add_equivalent_sum(&mut self, var: Lit, lits: &[Lit]) {
        let name = format!("{} = {}", self.lit_name(var), self.joined_name("+", lits));
        self.push(name, Constraint::EquivalentSum(var, lits.to_vec()));
    }

    pub fn add_equivalent_sum_eq(&mut self, var: Lit, lits: &[Lit], sum: usize) {
        let sum_name = self.joined_name("+", lits);
        let name = format!("{} -> {sum} = {sum_name}", self.lit_name(var));
        let inverse = format!("{} -> {sum} != {sum_name}", self.lit_name(var.negate()));
        if self.constraint_cache.contains(&name) && self.constraint_cache.contains(&inverse) {
            return;
        }
        self.constraint_cache.insert(name.clone());
        self.constraint_cache.insert(inverse);
        self.constraints.push((name, Constraint::EquivalentSumEq(var, lits.to_vec(), sum)));
    }

    pub fn add_equality_sum(&mut self, lits: &[Lit], sum: usize) {
        let name = format!("{sum} = {}", self.joined_name("+", lits));
        self.push(name, Constraint::EqualitySum(lits.to_vec(), sum));
    }

    pub fn add_at_most_one(&mut self, lits: &[Lit]) {
        let name = format!("1 >= {}", self.joined_name("+", lits));
        self.push(name, Constraint::AtMostOne(lits.to_vec()));
    }

    pub fn add_contradiction(&mut self, reason: &str) {
        let name = format!("Contradiction: {reason}");
        self.push_uncached_named(name.clone(), Constraint::Contradiction(name));
    }

    /// Returns a variable equivalent to the conjunction of the literals.
    /// Cached: the same conjunction always maps to the same variable.
    pub fn reified_and(&mut self, lits: &[Lit], name: &str) -> Lit {
        if lits.is_empty() {
            return self.false_lit();
        }
        let key = self.joined_name("^", lits);
        if let Some(&var) = self.var_cache.get(&key) {
            return Lit::positive(var);
        }
        let var = Lit::positive(self.alloc_var(name));
        self.add_equivalent_and(var, lits);
        self.var_cache.insert(key, var.var());
        var
    }

    /// Returns a variable equivalent to the disjunction of the literals.
    pub fn reified_or(&mut self, lits: &[Lit], name: &str) -> Lit {
        if lits.is_empty() {
            return self.false_lit();
        }
        let key = self.joined_name("V", lits);
        if let Some(&var) = self.var_cache.get(&key) {
            return Lit::positive(var);
        }
        let var = Lit::positive(self.alloc_var(name));
        self.add_equivalent_or(var, lits);
        self.var_cache.insert(key, var.var());
        var
    }

    /// Returns a variable equal to the sum of the literals (which therefore
    /// may not exceed one).
    pub fn reified_sum(&mut self, lits: &[Lit], name: &str) -> Lit {
        if lits.is_empty() {
            return self.false_lit();
        }
        let key = self.joined_name("+", lits);
        if let Some(&var) = self.var_cache.get(&key) {
            return Lit::positive(var);
        }
        let var = Lit::positive(self.alloc_var(name));
        self.add_equivalent_sum(var, lits);
        self.var_cache.insert(key, var.var());
        var
    }

    /// Returns a variable equivalent to `Σ lits = sum`.
    pub fn reified_sum_eq(&mut self, lits: &[Lit], sum: usize, name: &str) -> Lit {
        if lits.is_empty() {
            return self.false_lit();
        }
        let key = format!("{sum}={}", self.joined_name("+", lits));
        if let Some(&var) = self.var_cache.get(&key) {
            return Lit::positive(var);
        }
        let var = Lit::positive(self.alloc_var(name));
        self.add_equivalent_sum_eq(var, lits, sum);
        self.var_cache.insert(key, var.var());
        var
    }

    pub(crate) fn lit_name(&self, lit: Lit) -> String {
        if lit.is_negated() {
            format!("!{}", self.var_names[lit.var().index()])
        } else {
            self.var_names[lit.var().index()].clone()
        }
    }

    /// The normalized textual form of a literal list: names sorted and
    /// joined by the operator.
    fn joined_name(&self, separator: &str, lits: &[Lit]) -> String {
        if lits.is_empty() {
            return "0".to_owned();
        }
        let mut names: Vec<String> = lits.iter().map(|&l| self.lit_name(l)).collect();
        names.sort();
        names.join(&format!(" {separator} "))
    }

    fn alloc_var(&mut self, name: &str) -> VarId {
        let var = VarId(self.var_names.len() as u32);
        self.var_names.push(name.to_owned());
        var
    }

    fn push(&mut self, name: String, constraint: Constraint) {
        if self.constraint_cache.contains(&name) {
            return;
        }
        self.constraint_cache.insert(name.clone());
        self.constraints.push((name, constraint));
    }

    fn push_uncached(&mut self, constraint: Constraint) {
        let name = match &constraint {
            Constraint::Unit(lit) => self.lit_name(*lit),
            _ => unreachable!(),
        };
        self.constraints.push((name, constraint));
    }

    fn push_uncached_named(&mut self, name: String, constraint: Constraint) {
        self.constraints.push((name, constraint));
    }
}
