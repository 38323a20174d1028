//! Pair and group aggregation.
//!
//! This module turns assignment groups into co-occurrence counts on a
//! [`Tally`], and computes summary statistics over the result.

use crate::analysis::registry::Tally;
use crate::models::{AssignmentBatch, AssignmentGroup};
use std::collections::HashMap;
use tracing::debug;

/// Count identical groups (same names, same order).
///
/// Returns distinct groups with their multiplicity, most frequent first.
/// Ties keep the order in which each group was first seen.
pub fn count_tuples(groups: &[AssignmentGroup]) -> Vec<(AssignmentGroup, u64)> {
    let mut counted: Vec<(AssignmentGroup, u64)> = Vec::new();
    let mut position: HashMap<&AssignmentGroup, usize> = HashMap::new();

    for group in groups {
        match position.get(group) {
            Some(&idx) => counted[idx].1 += 1,
            None => {
                position.insert(group, counted.len());
                counted.push((group.clone(), 1));
            }
        }
    }

    // sort_by_key is stable, so first-seen order survives within equal counts
    counted.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    counted
}

fn prepare(groups: &[AssignmentGroup], normalize: bool) -> Vec<(AssignmentGroup, u64)> {
    if normalize {
        let normalized: Vec<AssignmentGroup> =
            groups.iter().map(AssignmentGroup::normalized).collect();
        count_tuples(&normalized)
    } else {
        count_tuples(groups)
    }
}

impl Tally {
    /// Add two-person assignments to the matrix.
    pub fn aggregate_pairs(&mut self, pairs: &[AssignmentGroup], normalize: bool) {
        for (pair, value) in prepare(pairs, normalize) {
            let [left, right] = pair.names() else {
                debug!("Ignoring non-pair {} in pair input", pair);
                continue;
            };
            let left = self.ensure_present(left);
            let right = self.ensure_present(right);
            self.record(left, right, value);
        }
    }

    /// Add multi-person assignments to the matrix, one count per member pair.
    ///
    /// A group whose size equals the number of names known at that point is
    /// treated as "everyone" and contributes nothing. Because the registry grows
    /// as data is processed, whether a group is skipped depends on what was
    /// aggregated before it.
    pub fn aggregate_groups(&mut self, groups: &[AssignmentGroup], normalize: bool) {
        let counted = prepare(groups, normalize);
        debug!(
            "Group multiplicities: {:?}",
            counted
                .iter()
                .map(|(g, n)| format!("{}x{}", g, n))
                .collect::<Vec<_>>()
        );

        for (group, value) in counted {
            let members: Vec<usize> = group
                .names()
                .iter()
                .map(|name| self.ensure_present(name))
                .collect();

            if group.len() == self.len() {
                debug!("Skipping {}: spans all {} known names", group, self.len());
                continue;
            }

            for (i, &left) in members.iter().enumerate() {
                for &right in &members[i + 1..] {
                    self.record(left, right, value);
                }
            }
        }
    }
}

/// Build a tally from a batch: pairs first, then groups.
pub fn build_tally(batch: &AssignmentBatch, normalize: bool) -> Tally {
    let mut tally = Tally::new();
    tally.aggregate_pairs(&batch.pairs, normalize);
    tally.aggregate_groups(&batch.groups, normalize);
    tally
}

/// Most frequent pairings as `(left, right, count)`, highest count first.
///
/// Only the upper triangle is read, so each pairing appears once.
pub fn top_pairs(tally: &Tally, n: usize) -> Vec<(String, String, u64)> {
    let names = tally.names();
    let matrix = tally.matrix();
    let mut pairs = Vec::new();

    for i in 0..matrix.size() {
        for j in i + 1..matrix.size() {
            let count = matrix.get(i, j);
            if count > 0 {
                pairs.push((names[i].clone(), names[j].clone(), count));
            }
        }
    }

    pairs.sort_by_key(|(_, _, count)| std::cmp::Reverse(*count));
    pairs.truncate(n);
    pairs
}

/// Number of distinct partners each name was assigned with, in registry order.
pub fn collaborator_counts(tally: &Tally) -> Vec<(String, usize)> {
    let matrix = tally.matrix();
    tally
        .names()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let partners = (0..matrix.size()).filter(|&j| matrix.get(i, j) > 0).count();
            (name.clone(), partners)
        })
        .collect()
}
