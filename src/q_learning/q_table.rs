//! Q-table implementation for tabular learning

use std::{
    collections::{HashMap, hash_map},
    hash::Hash,
};

use serde::{Deserialize, Serialize};

/// Q-values for one state, keyed by action
pub type ActionValues = HashMap<usize, f64>;

/// Two-level Q-table mapping state -> action -> Q-value.
///
/// Entries are materialized lazily: a pair is absent until it is first read
/// through [`QTable::value_of`] or written through [`QTable::set`], and
/// absent pairs are worth 0.0. Entries are never evicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize + Eq + Hash",
    deserialize = "S: Deserialize<'de> + Eq + Hash"
))]
pub struct QTable<S> {
    values: HashMap<S, ActionValues>,
}

impl<S: Eq + Hash> PartialEq for QTable<S> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<S> Default for QTable<S> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

impl<S: Clone + Eq + Hash> QTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a Q-value, recording the pair with 0.0 if it was unseen.
    ///
    /// This read mutates the table on first access; use [`QTable::get`] for a
    /// side-effect-free lookup.
    pub fn value_of(&mut self, state: &S, action: usize) -> f64 {
        *self
            .values
            .entry(state.clone())
            .or_default()
            .entry(action)
            .or_insert(0.0)
    }

    /// Pure lookup: `None` if the pair was never touched.
    pub fn get(&self, state: &S, action: usize) -> Option<f64> {
        self.values
            .get(state)
            .and_then(|actions| actions.get(&action))
            .copied()
    }

    /// Pure lookup with the implicit 0.0 default.
    pub fn value_or_default(&self, state: &S, action: usize) -> f64 {
        self.get(state, action).unwrap_or(0.0)
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: S, action: usize, value: f64) {
        self.values.entry(state).or_default().insert(action, value);
    }

    /// Maximum Q-value among the actions recorded for exactly this state.
    ///
    /// 0.0 if the state is unseen or has no recorded actions.
    pub fn best_value(&self, state: &S) -> f64 {
        self.values
            .get(state)
            .and_then(|actions| actions.values().copied().reduce(f64::max))
            .unwrap_or(0.0)
    }

    /// Recorded actions for a state
    pub fn actions(&self, state: &S) -> Option<&ActionValues> {
        self.values.get(state)
    }

    pub fn contains(&self, state: &S, action: usize) -> bool {
        self.get(state, action).is_some()
    }

    /// Number of distinct states in the table
    pub fn state_count(&self) -> usize {
        self.values.len()
    }

    /// Number of (state, action) pairs in the table
    pub fn entry_count(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, S, ActionValues> {
        self.values.iter()
    }

    /// Iterate every (state, action, value) triple
    pub fn entries(&self) -> impl Iterator<Item = (&S, usize, f64)> {
        self.values
            .iter()
            .flat_map(|(state, actions)| actions.iter().map(move |(&a, &q)| (state, a, q)))
    }

    /// Reset all Q-values
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub(crate) fn state_entry(&mut self, state: S) -> &mut ActionValues {
        self.values.entry(state).or_default()
    }
}

impl<S: Clone + Eq + Hash> FromIterator<(S, usize, f64)> for QTable<S> {
    fn from_iter<I: IntoIterator<Item = (S, usize, f64)>>(iter: I) -> Self {
        let mut table = QTable::new();
        for (state, action, value) in iter {
            table.set(state, action, value);
        }
        table
    }
}
