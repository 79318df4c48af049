//! Online grouping of XOR variables into connected components.
//!
//! Two variables end up in the same component iff a chain of XORs, each
//! sharing a variable with the next, connects them. Components live in an
//! arena indexed by their id. Merging never reuses an id: the merged component
//! always gets a fresh one and the ids it absorbed are retired for the rest of
//! the run. Merges cost O(size of merged components), there is no path
//! compression to reason about.

use itertools::Itertools;

use crate::xor::{Var, Xor};

pub(crate) type ComponentId = usize;

pub(crate) struct Partition {
    /// Variable -> component, `None` if the variable is in no XOR seen so far
    table: Vec<Option<ComponentId>>,
    /// Component -> member variables, `None` once the component is retired
    members: Vec<Option<Vec<Var>>>,
}

impl Partition {
    pub(crate) fn new(num_vars: usize) -> Partition {
        Partition {
            table: vec![None; num_vars],
            members: vec![],
        }
    }

    /// Build the partition induced by all non-trivial `xors`
    pub(crate) fn from_xors<'a>(
        num_vars: usize,
        xors: impl IntoIterator<Item = &'a Xor>,
    ) -> Self {
        let mut partition = Partition::new(num_vars);
        for xor in xors.into_iter().filter(|xor| !xor.is_trivial()) {
            partition.add_xor(xor);
        }
        partition
    }

    pub(crate) fn component_of(&self, var: Var) -> Option<ComponentId> {
        self.table[var as usize]
    }

    /// Members of a live component, `None` for retired or unknown ids
    pub(crate) fn members(&self, id: ComponentId) -> Option<&[Var]> {
        self.members.get(id)?.as_deref()
    }

    /// Number of ids handed out so far, live or retired
    pub(crate) fn num_ids(&self) -> usize {
        self.members.len()
    }

    /// Live components in id order
    pub(crate) fn components(&self) -> impl Iterator<Item = (ComponentId, &[Var])> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(id, members)| Some((id, members.as_deref()?)))
    }

    /// True if all variables already sit in one and the same component
    fn belongs_to_one(&self, vars: &[Var]) -> bool {
        let mut found = None;
        for &var in vars {
            match (self.table[var as usize], found) {
                (None, _) => return false,
                (Some(comp), None) => found = Some(comp),
                (Some(comp), Some(prev)) if comp != prev => return false,
                _ => {}
            }
        }
        true
    }

    pub(crate) fn add_xor(&mut self, xor: &Xor) {
        if self.belongs_to_one(&xor.vars) {
            return;
        }

        let mut touched = vec![];
        let mut new_vars = vec![];
        for &var in xor.iter().unique() {
            match self.table[var as usize] {
                Some(comp) => touched.push(comp),
                None => new_vars.push(var),
            }
        }
        touched.sort_unstable();
        touched.dedup();

        if let &[into] = touched.as_slice() {
            for var in new_vars {
                self.table[var as usize] = Some(into);
                if let Some(members) = &mut self.members[into] {
                    members.push(var);
                }
            }
            return;
        }

        // Zero or several components touched: everything goes to a fresh one
        let id = self.members.len();
        let mut merged = new_vars;
        for comp in touched {
            merged.extend(self.members[comp].take().unwrap_or_default());
        }
        for &var in merged.iter() {
            self.table[var as usize] = Some(id);
        }
        self.members.push(Some(merged));
    }

    /// Human readable dump, one live component per line
    #[cfg(test)]
    pub(crate) fn summary(&self) -> String {
        self.components()
            .map(|(id, members)| {
                format!(
                    "#{id}: {}",
                    members.iter().map(|var| format!("v{var}")).join(", ")
                )
            })
            .join("\n")
    }

    /// Table and membership lists are inverses of each other
    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        let members_ok = self.components().all(|(id, members)| {
            members
                .iter()
                .all(|&var| self.table[var as usize] == Some(id))
        });
        let table_ok = self.table.iter().enumerate().all(|(var, comp)| match comp {
            None => true,
            Some(comp) => self
                .members(*comp)
                .is_some_and(|members| members.contains(&(var as Var))),
        });
        members_ok && table_ok
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use expect_test::{expect, Expect};
    use petgraph::unionfind::UnionFind;
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    impl Partition {
        fn expect(&self, expect: Expect) {
            assert!(self.is_consistent());
            expect.assert_eq(&self.summary());
        }
    }

    fn xor(vars: &[Var]) -> Xor {
        Xor::new(vars.iter().copied(), false)
    }

    #[test]
    fn test_chain_and_separate() {
        let partition =
            Partition::from_xors(6, &[xor(&[1, 2]), xor(&[2, 3]), xor(&[4, 5])]);
        partition.expect(expect![[r#"
            #0: v1, v2, v3
            #1: v4, v5"#]]);
    }

    #[test]
    fn test_merge_retires_ids() {
        let mut partition = Partition::new(8);
        partition.add_xor(&xor(&[0, 1]));
        partition.add_xor(&xor(&[2, 3]));
        partition.add_xor(&xor(&[4]));
        partition.expect(expect![[r#"
            #0: v0, v1
            #1: v2, v3
            #2: v4"#]]);

        // Touches #0 and #1 and brings in v5
        partition.add_xor(&xor(&[5, 1, 3]));
        partition.expect(expect![[r#"
            #2: v4
            #3: v5, v0, v1, v2, v3"#]]);
        assert_eq!(partition.members(0), None);
        assert_eq!(partition.members(1), None);
        assert_eq!(partition.component_of(0), Some(3));

        // Already consistent, nothing happens
        partition.add_xor(&xor(&[0, 5]));
        assert_eq!(partition.num_ids(), 4);

        // Single touched component absorbs the new variable
        partition.add_xor(&xor(&[6, 4]));
        partition.expect(expect![[r#"
            #2: v4, v6
            #3: v5, v0, v1, v2, v3"#]]);
        assert_eq!(partition.component_of(7), None);
    }

    #[test]
    fn test_trivial_xors_are_ignored() {
        let partition = Partition::from_xors(3, &[xor(&[]), xor(&[1])]);
        partition.expect(expect!["#0: v1"]);
    }

    #[test]
    fn test_same_partition_in_any_order() {
        const VARS: usize = 40;
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..20 {
            let mut xors = (0..25)
                .map(|_| {
                    let len = rng.gen_range(1..=3);
                    xor(&(0..len)
                        .map(|_| rng.gen_range(0..VARS as Var))
                        .collect::<Vec<_>>())
                })
                .collect::<Vec<_>>();

            let mut oracle = UnionFind::<usize>::new(VARS);
            for xor in xors.iter() {
                for (a, b) in xor.iter().tuple_windows() {
                    oracle.union(*a as usize, *b as usize);
                }
            }

            let in_order = Partition::from_xors(VARS, &xors);
            xors.shuffle(&mut rng);
            let shuffled = Partition::from_xors(VARS, &xors);

            for partition in [&in_order, &shuffled] {
                assert!(partition.is_consistent());
                for a in 0..VARS as Var {
                    for b in 0..VARS as Var {
                        let (Some(comp_a), Some(comp_b)) =
                            (partition.component_of(a), partition.component_of(b))
                        else {
                            continue;
                        };
                        assert_eq!(
                            comp_a == comp_b,
                            oracle.equiv(a as usize, b as usize),
                            "v{a} and v{b}"
                        );
                    }
                }
            }

            for var in 0..VARS as Var {
                let used = xors.iter().any(|xor| xor.vars.contains(&var));
                assert_eq!(in_order.component_of(var).is_some(), used);
                assert_eq!(shuffled.component_of(var).is_some(), used);
            }
        }
    }
}
