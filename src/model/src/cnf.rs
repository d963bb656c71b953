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

//! Lowering of the high-level constraint set to plain CNF for the external
//! SAT engine. Cardinality constraints go through a totalizer: a balanced
//! merge tree whose output variables form a unary counter of the inputs,
//! constrained in both directions so conditional and reified sums stay exact.

use std::collections::HashMap;

use crate::builder::{Constraint, Model};
use crate::literals::Lit;

/// A CNF formula in DIMACS conventions: variables are 1-based integers, a
/// negative integer is a negated literal. Variables beyond the model's named
/// variables are lowering helpers.
#[derive(Debug, Clone, Default)]
pub struct Cnf {
    pub num_vars: usize,
    pub clauses: Vec<Vec<i32>>,
}

impl Cnf {
    fn add(&mut self, clause: Vec<i32>) {
        self.clauses.push(clause);
    }
}

fn lit_int(lit: Lit) -> i32 {
    let index = lit.var().index() as i32 + 1;
    if lit.is_negated() {
        -index
    } else {
        index
    }
}

struct Lowering {
    cnf: Cnf,
    totalizers: HashMap<Vec<i32>, Vec<i32>>,
}

impl Model {
    pub fn to_cnf(&self) -> Cnf {
        let mut lowering = Lowering {
            cnf: Cnf { num_vars: self.num_vars(), clauses: vec![] },
            totalizers: HashMap::new(),
        };
        for (_, constraint) in self.constraints() {
            lowering.lower(constraint);
        }
        lowering.cnf
    }
}

impl Lowering {
    fn fresh_var(&mut self) -> i32 {
        self.cnf.num_vars += 1;
        self.cnf.num_vars as i32
    }

    fn lower(&mut self, constraint: &Constraint) {
        match constraint {
            Constraint::Unit(lit) => self.cnf.add(vec![lit_int(*lit)]),
            Constraint::And(lits) => {
                for &lit in lits {
                    self.cnf.add(vec![lit_int(lit)]);
                }
            }
            Constraint::Or(lits) => {
                self.cnf.add(lits.iter().map(|&l| lit_int(l)).collect());
            }
            Constraint::Equal(a, b) => {
                let (a, b) = (lit_int(*a), lit_int(*b));
                self.cnf.add(vec![-a, b]);
                self.cnf.add(vec![a, -b]);
            }
            Constraint::Implies(a, b) => {
                self.cnf.add(vec![-lit_int(*a), lit_int(*b)]);
            }
            Constraint::ImpliesAnd(cond, lits) => {
                let cond = lit_int(*cond);
                for &lit in lits {
                    self.cnf.add(vec![-cond, lit_int(lit)]);
                }
            }
            Constraint::ImpliesOr(cond, lits) => {
                let mut clause = vec![-lit_int(*cond)];
                clause.extend(lits.iter().map(|&l| lit_int(l)));
                self.cnf.add(clause);
            }
            Constraint::ImpliesEq(cond, a, b) => {
                let (cond, a, b) = (lit_int(*cond), lit_int(*a), lit_int(*b));
                self.cnf.add(vec![-cond, -a, b]);
                self.cnf.add(vec![-cond, a, -b]);
            }
            Constraint::ImpliesSum(cond, lits, sum) => {
                let cond = lit_int(*cond);
                if *sum > lits.len() {
                    self.cnf.add(vec![-cond]);
                    return;
                }
                if lits.is_empty() {
                    return; // sum == 0 holds trivially.
                }
                let counter = self.totalizer(lits);
                if *sum > 0 {
                    self.cnf.add(vec![-cond, counter[sum - 1]]);
                }
                if *sum < lits.len() {
                    self.cnf.add(vec![-cond, -counter[*sum]]);
                }
            }
            Constraint::EqualitySum(lits, sum) => self.lower_equality_sum(lits, *sum),
            Constraint::EquivalentSum(var, lits) => {
                let var = lit_int(*var);
                if lits.is_empty() {
                    self.cnf.add(vec![-var]);
                    return;
                }
                self.pairwise_at_most_one(lits);
                // var <-> exactly one of the literals.
                let mut clause = vec![-var];
                clause.extend(lits.iter().map(|&l| lit_int(l)));
                self.cnf.add(clause);
                for &lit in lits {
                    self.cnf.add(vec![-lit_int(lit), var]);
                }
            }
            Constraint::EquivalentSumEq(var, lits, sum) => {
                self.lower_equivalent_sum_eq(*var, lits, *sum)
            }
            Constraint::AtMostOne(lits) => self.pairwise_at_most_one(lits),
            Constraint::Contradiction(_) => self.cnf.add(vec![]),
        }
    }

    fn lower_equality_sum(&mut self, lits: &[Lit], sum: usize) {
        if sum > lits.len() {
            self.cnf.add(vec![]);
            return;
        }
        match sum {
            0 => {
                for &lit in lits {
                    self.cnf.add(vec![-lit_int(lit)]);
                }
            }
            1 => {
                self.cnf.add(lits.iter().map(|&l| lit_int(l)).collect());
                self.pairwise_at_most_one(lits);
            }
            _ => {
                let counter = self.totalizer(lits);
                self.cnf.add(vec![counter[sum - 1]]);
                if sum < lits.len() {
                    self.cnf.add(vec![-counter[sum]]);
                }
            }
        }
    }

    fn lower_equivalent_sum_eq(&mut self, var: Lit, lits: &[Lit], sum: usize) {
        let var = lit_int(var);
        if sum > lits.len() {
            self.cnf.add(vec![-var]);
            return;
        }
        if lits.is_empty() {
            // sum == 0 always holds.
            self.cnf.add(vec![var]);
            return;
        }
        let counter = self.totalizer(lits);
        let n = lits.len();
        // var -> the count reaches sum but not sum + 1.
        if sum > 0 {
            self.cnf.add(vec![-var, counter[sum - 1]]);
        }
        if sum < n {
            self.cnf.add(vec![-var, -counter[sum]]);
        }
        // !var -> the count misses sum.
        let mut clause = vec![var];
        if sum > 0 {
            clause.push(-counter[sum - 1]);
        }
        if sum < n {
            clause.push(counter[sum]);
        }
        self.cnf.add(clause);
    }

    fn pairwise_at_most_one(&mut self, lits: &[Lit]) {
        for (i, &a) in lits.iter().enumerate() {
            for &b in &lits[i + 1..] {
                self.cnf.add(vec![-lit_int(a), -lit_int(b)]);
            }
        }
    }

    /// Unary counter over the literals: `counter[i]` is equivalent to "at
    /// least i + 1 of the literals are true". Cached per literal set.
    fn totalizer(&mut self, lits: &[Lit]) -> Vec<i32> {
        let ints: Vec<i32> = lits.iter().map(|&l| lit_int(l)).collect();
        let mut key = ints.clone();
        key.sort_unstable();
        if let Some(outputs) = self.totalizers.get(&key) {
            return outputs.clone();
        }
        let outputs = self.build_totalizer(&ints);
        self.totalizers.insert(key, outputs.clone());
        outputs
    }

    fn build_totalizer(&mut self, ints: &[i32]) -> Vec<i32> {
        if ints.len() == 1 {
            return ints.to_vec();
        }
        let (left, right) = ints.split_at(ints.len() / 2);
        let a = self.build_totalizer(left);
        let b = self.build_totalizer(right);
        let (p, q) = (a.len(), b.len());
        let outputs: Vec<i32> = (0..p + q).map(|_| self.fresh_var()).collect();
        for i in 0..=p {
            for j in 0..=q {
                // a_i & b_j -> at least i + j.
                if i + j >= 1 {
                    let mut clause = vec![];
                    if i > 0 {
                        clause.push(-a[i - 1]);
                    }
                    if j > 0 {
                        clause.push(-b[j - 1]);
                    }
                    clause.push(outputs[i + j - 1]);
                    self.cnf.add(clause);
                }
                // at least i + j + 1 -> a_{i+1} | b_{j+1}.
                if i + j < p + q {
                    let mut clause = vec![-outputs[i + j]];
                    if i < p {
                        clause.push(a[i]);
                    }
                    if j < q {
                        clause.push(b[j]);
                    }
                    self.cnf.add(clause);
                }
            }
        }
        outputs
    }
}
