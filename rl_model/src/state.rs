use std::fmt;

use itertools::Itertools;
use ndset::Indexable;
use ndset::NSetError;
use ndset::Shape;

/// An action, identified by its coordinate within the action table of
/// the state it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Action {
    index: Vec<usize>,
}

impl Action {
    pub fn new(index: Vec<usize>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }
}

impl Indexable for Action {
    fn extend_index(&self, index: &mut Vec<usize>) {
        index.extend_from_slice(&self.index);
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a({})", self.index.iter().join(","))
    }
}

/// A state, identified by its full coordinate in the state table, and
/// the actions available from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    index: Vec<usize>,
    actions: Vec<Action>,
}

impl State {
    pub fn new(index: Vec<usize>, actions: Vec<Action>) -> Self {
        Self { index, actions }
    }

    /// A state whose actions are every coordinate of a dense action
    /// table of shape `action_dims`. Empty `action_dims` make a terminal
    /// state.
    pub fn with_action_dims(index: Vec<usize>, action_dims: &[usize]) -> Result<Self, NSetError> {
        let actions = if action_dims.is_empty() {
            Vec::new()
        } else {
            enumerate_actions(action_dims)?
        };
        Ok(Self::new(index, actions))
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// A state without actions ends an episode.
    pub fn is_terminal(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Indexable for State {
    fn extend_index(&self, index: &mut Vec<usize>) {
        index.extend_from_slice(&self.index);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s({})", self.index.iter().join(","))
    }
}

/// Every coordinate of a dense table of shape `dims`, in row-major
/// order, as actions.
pub fn enumerate_actions(dims: &[usize]) -> Result<Vec<Action>, NSetError> {
    let shape = Shape::new(dims.to_vec())?;
    (0..shape.len())
        .map(|offset| shape.coordinates(offset).map(Action::new))
        .collect()
}
