//! Declaration ordering
//!
//! The target language requires a type to be declared before any type that
//! inherits from it appears in the same file. This pass reorders a unit's
//! top-level declarations so every supertype precedes its subtypes, while
//! preserving the source order of unrelated declarations.

use std::collections::{HashMap, VecDeque};

use crate::ast::{CompilationUnit, TypeDecl};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct SortStats {
    pub moved_types: usize,
}

pub struct TypeSorter {
    pub stats: SortStats,
}

impl Default for TypeSorter {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeSorter {
    pub fn new() -> Self {
        Self { stats: SortStats::default() }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        if unit.types.len() < 2 {
            return Ok(());
        }
        let order = self.sorted_order(&unit.types)?;

        let mut slots: Vec<Option<TypeDecl>> =
            unit.types.drain(..).map(Some).collect();
        let mut sorted = Vec::with_capacity(slots.len());
        for (target, &source) in order.iter().enumerate() {
            let decl = slots
                .get_mut(source)
                .and_then(Option::take)
                .ok_or_else(|| Error::internal("type sort produced an invalid permutation"))?;
            if source != target {
                self.stats.moved_types += 1;
            }
            sorted.push(decl);
        }
        unit.types = sorted;
        Ok(())
    }

    /// Topological order over intra-unit inheritance edges, computed from the
    /// leaves inward: start with declarations nothing in the unit inherits
    /// from, emit each at the front, and release its supertypes once all of
    /// their dependents have been emitted. Emitting at the front puts
    /// supertypes first while keeping unrelated declarations in source order.
    fn sorted_order(&self, types: &[TypeDecl]) -> Result<Vec<usize>> {
        let index: HashMap<&str, usize> =
            types.iter().enumerate().map(|(i, t)| (t.name(), i)).collect();

        let supers: Vec<Vec<usize>> = types
            .iter()
            .map(|t| {
                t.super_names()
                    .iter()
                    .filter_map(|name| index.get(name).copied())
                    .collect()
            })
            .collect();
        let mut dependents = vec![0usize; types.len()];
        for links in &supers {
            for &s in links {
                dependents[s] += 1;
            }
        }

        let mut frontier: Vec<usize> =
            (0..types.len()).filter(|&i| dependents[i] == 0).collect();
        let mut ordered: VecDeque<usize> = VecDeque::with_capacity(types.len());
        while let Some(i) = frontier.pop() {
            ordered.push_front(i);
            for &s in &supers[i] {
                dependents[s] -= 1;
                if dependents[s] == 0 {
                    frontier.push(s);
                }
            }
        }
        if ordered.len() != types.len() {
            return Err(Error::internal("inheritance cycle among declarations"));
        }
        Ok(ordered.into_iter().collect())
    }
}
