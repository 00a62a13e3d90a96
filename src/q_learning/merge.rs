//! Offline union of two Q-tables.
//!
//! Agents trained separately can be combined by keeping, for every
//! (state, action) pair, the most optimistic value either table learned.

use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::q_learning::q_table::QTable;

/// What merging `b` into `a` changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// States present only in `b`
    pub new_states: usize,
    /// Actions from `b` added to states both tables know
    pub new_actions: usize,
    /// Shared pairs where `b`'s larger value replaced `a`'s
    pub conflicts_resolved: usize,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome<S> {
    pub table: QTable<S>,
    pub report: MergeReport,
}

impl<S: Eq + Hash> PartialEq for MergeOutcome<S> {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.report == other.report
    }
}

/// Merge two tables, keeping the larger value for pairs present in both.
///
/// The resulting values do not depend on argument order and
/// `merge_tables(a, a)` reproduces `a`.
pub fn merge_tables<S: Clone + Eq + Hash>(a: &QTable<S>, b: &QTable<S>) -> MergeOutcome<S> {
    let mut table = a.clone();
    let mut report = MergeReport::default();

    for (state, actions) in b.iter() {
        let known_state = a.actions(state).is_some();
        if !known_state {
            report.new_states += 1;
        }

        let merged = table.state_entry(state.clone());
        for (&action, &value) in actions {
            match merged.get_mut(&action) {
                Some(existing) => {
                    if value > *existing {
                        *existing = value;
                        report.conflicts_resolved += 1;
                    }
                }
                None => {
                    merged.insert(action, value);
                    if known_state {
                        report.new_actions += 1;
                    }
                }
            }
        }
    }

    MergeOutcome { table, report }
}
