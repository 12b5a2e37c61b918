use std::{
    collections::HashMap,
    hash::Hash,
    ops::{Index, IndexMut},
};

use strum::VariantArray;

use crate::env::Action;

/// A trait for state types that can be used as keys in a [`QTable`]
pub trait StateKey: Clone + Eq + Hash {}

impl<T> StateKey for T where T: Clone + Eq + Hash {}

const NUM_ACTIONS: usize = Action::VARIANTS.len();

/// The value slots recorded for a single state, one per action
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ActionValues([f32; NUM_ACTIONS]);

impl Index<Action> for ActionValues {
    type Output = f32;

    fn index(&self, action: Action) -> &Self::Output {
        &self.0[action as usize]
    }
}

impl IndexMut<Action> for ActionValues {
    fn index_mut(&mut self, action: Action) -> &mut Self::Output {
        &mut self.0[action as usize]
    }
}

/// A sparse table of estimated returns for state-action pairs
///
/// Rows are keyed by state and hold a fixed value slot per action, so a large
/// board snapshot is hashed once per lookup instead of being cloned into a
/// composite key. Unseen pairs read as exactly 0.0; a row is only
/// materialized by the first [`set`](QTable::set) that touches its state.
/// The table grows monotonically, there is no eviction, which bounds
/// scalability to games with a small reachable state space.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable<S: StateKey> {
    rows: HashMap<S, ActionValues>,
}

impl<S: StateKey> QTable<S> {
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    /// Get the stored value for a state-action pair, or 0.0 if unseen
    ///
    /// Lookups on unseen keys are defined behavior, not failures.
    pub fn get(&self, state: &S, action: Action) -> f32 {
        self.rows.get(state).map(|row| row[action]).unwrap_or(0.0)
    }

    /// Insert or overwrite the value for a state-action pair
    pub fn set(&mut self, state: &S, action: Action, value: f32) {
        match self.rows.get_mut(state) {
            Some(row) => row[action] = value,
            None => {
                let mut row = ActionValues::default();
                row[action] = value;
                self.rows.insert(state.clone(), row);
            }
        }
    }

    /// Number of states with at least one recorded value
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<S: StateKey> Default for QTable<S> {
    fn default() -> Self {
        Self::new()
    }
}
