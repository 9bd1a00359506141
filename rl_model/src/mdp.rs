use std::fmt;

use ndset::NSet;
use ndset::NSetError;
use ndset::Slot;
use rand::Rng;

use crate::config::ConfigError;
use crate::config::ModelConfig;
use crate::config::validate_gamma;
use crate::state::State;
use crate::state::enumerate_actions;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    NSet(#[from] NSetError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Maps a state's coordinate to the dimensions of its action table.
pub type ActionDimsFn = Box<dyn Fn(&[usize]) -> Vec<usize> + Send + Sync>;

/// How actions are laid out across states.
pub enum ActionLayout {
    /// Every state has a dense action table of the same dimensions.
    Uniform(Vec<usize>),
    /// Each state has its own action dimensions.
    PerState(ActionDimsFn),
}

impl fmt::Debug for ActionLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform(dims) => f.debug_tuple("Uniform").field(dims).finish(),
            Self::PerState(_) => f.debug_tuple("PerState").finish_non_exhaustive(),
        }
    }
}

/// A finite decision process: its states, their actions, and a discount
/// factor. Allocates the value and policy tables used by control
/// algorithms, each shaped after the state (and action) space.
///
/// States without actions are terminal. With per-state actions, a state
/// whose action dimensions are empty is terminal, and holds a single
/// placeholder leaf in the action-value table.
#[derive(Debug)]
pub struct Mdp {
    gamma: f64,
    default_value: f64,
    states: NSet<State>,
    state_count: usize,
    starts: Vec<Vec<usize>>,
    actions: ActionLayout,
}

impl Mdp {
    /// Dense states of shape `state_dims`, each with the same dense
    /// actions of shape `action_dims`.
    pub fn dense(gamma: f64, state_dims: &[usize], action_dims: &[usize]) -> Result<Self, ModelError> {
        validate_gamma(gamma)?;
        let actions = enumerate_actions(action_dims)?;
        let states = NSet::from_fn(state_dims, |index| {
            State::new(index.to_vec(), actions.clone())
        })?;
        tracing::debug!(
            gamma,
            states = %states.shape(),
            actions = ?action_dims,
            "created dense mdp"
        );
        Ok(Self::assemble(
            gamma,
            states,
            ActionLayout::Uniform(action_dims.to_vec()),
        ))
    }

    /// [`Mdp::dense`] with the discount factor and the default table
    /// value taken from `config`.
    pub fn from_config(
        config: &ModelConfig,
        state_dims: &[usize],
        action_dims: &[usize],
    ) -> Result<Self, ModelError> {
        config.validate()?;
        let mut mdp = Self::dense(config.gamma, state_dims, action_dims)?;
        mdp.default_value = config.default_value;
        Ok(mdp)
    }

    /// Dense states of shape `state_dims`, where the actions of the state
    /// at coordinate `s` form a dense table of shape `action_dims(s)`.
    pub fn with_action_fn<F>(gamma: f64, state_dims: &[usize], action_dims: F) -> Result<Self, ModelError>
    where
        F: Fn(&[usize]) -> Vec<usize> + Send + Sync + 'static,
    {
        validate_gamma(gamma)?;
        let states = NSet::try_new(state_dims, |index| -> Result<_, ModelError> {
            Ok(Slot::Leaf(State::with_action_dims(
                index.to_vec(),
                &action_dims(index),
            )?))
        })?;
        tracing::debug!(gamma, states = %states.shape(), "created mdp with per-state actions");
        Ok(Self::assemble(
            gamma,
            states,
            ActionLayout::PerState(Box::new(action_dims)),
        ))
    }

    /// An arbitrary, possibly ragged, table of states. Each state is
    /// re-keyed to its coordinate in `states`, and given the actions of a
    /// dense table of shape `action_dims(s)`; empty dimensions make it
    /// terminal.
    pub fn from_states<F>(gamma: f64, mut states: NSet<State>, action_dims: F) -> Result<Self, ModelError>
    where
        F: Fn(&[usize]) -> Vec<usize> + Send + Sync + 'static,
    {
        validate_gamma(gamma)?;
        let indices: Vec<Vec<usize>> = states.indices().collect();
        for (index, state) in indices.into_iter().zip(states.iter_mut()) {
            let dims = action_dims(&index);
            *state = State::with_action_dims(index, &dims)?;
        }
        tracing::debug!(
            gamma,
            states = states.leaf_count(),
            depth = states.depth(),
            "created mdp from state table"
        );
        Ok(Self::assemble(
            gamma,
            states,
            ActionLayout::PerState(Box::new(action_dims)),
        ))
    }

    fn assemble(gamma: f64, states: NSet<State>, actions: ActionLayout) -> Self {
        let state_count = states.leaf_count();
        Self {
            gamma,
            default_value: ModelConfig::default().default_value,
            states,
            state_count,
            starts: Vec::new(),
            actions,
        }
    }

    /// Restrict [`Mdp::sample_state`] to the states at `starts`. Every
    /// coordinate must address a state; an empty list samples from all
    /// states.
    pub fn with_start_states(mut self, starts: Vec<Vec<usize>>) -> Result<Self, ModelError> {
        for index in &starts {
            self.states.get(index)?;
        }
        tracing::debug!(starts = starts.len(), "set start states");
        self.starts = starts;
        Ok(self)
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// The initial value of tables made by [`Mdp::v_table_default`] and
    /// [`Mdp::q_table_default`].
    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    /// The number of states, across all levels of the state table.
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// Coordinates of the states episodes start from. Empty when every
    /// state is a possible start.
    pub fn start_states(&self) -> &[Vec<usize>] {
        &self.starts
    }

    /// The table of all states.
    pub fn states(&self) -> &NSet<State> {
        &self.states
    }

    pub fn actions(&self) -> &ActionLayout {
        &self.actions
    }

    /// The state at coordinate `index`.
    pub fn state(&self, index: &[usize]) -> Result<&State, ModelError> {
        Ok(self.states.get(index)?)
    }

    /// A state-value table `V[s]`, with every entry set to `default`.
    pub fn v_table<T: Clone>(&self, default: T) -> NSet<T> {
        let v = NSet::like_fn(&self.states, |_| default.clone());
        tracing::debug!(entries = v.leaf_count(), "allocated state-value table");
        v
    }

    /// An action-value table `Q[s, a]`, with every entry set to
    /// `default`. Entries are keyed by the concatenation of the state's
    /// and the action's coordinates, e.g. `q.get_key(&(state, action))`.
    pub fn q_table<T: Clone>(&self, default: T) -> Result<NSet<T>, ModelError> {
        let q = match &self.actions {
            ActionLayout::Uniform(action_dims) => {
                let dims: Vec<usize> = self
                    .states
                    .shape()
                    .dims()
                    .iter()
                    .chain(action_dims)
                    .copied()
                    .collect();
                NSet::filled(&dims, default)?
            }
            ActionLayout::PerState(action_dims) => NSet::try_like(&self.states, |index| {
                let dims = action_dims(index);
                if dims.is_empty() {
                    return Ok(Slot::Leaf(default.clone()));
                }
                NSet::filled(&dims, default.clone()).map(Slot::Nested)
            })?,
        };
        tracing::debug!(
            entries = q.leaf_count(),
            ragged = q.is_ragged(),
            "allocated action-value table"
        );
        Ok(q)
    }

    /// A policy table `Pi[s]`, with every state's entry (typically a
    /// distribution over its actions) set to `default`.
    pub fn pi_table<T: Clone>(&self, default: T) -> NSet<T> {
        let pi = NSet::like_fn(&self.states, |_| default.clone());
        tracing::debug!(entries = pi.leaf_count(), "allocated policy table");
        pi
    }

    /// [`Mdp::v_table`] filled with [`Mdp::default_value`].
    pub fn v_table_default(&self) -> NSet<f64> {
        self.v_table(self.default_value)
    }

    /// [`Mdp::q_table`] filled with [`Mdp::default_value`].
    pub fn q_table_default(&self) -> Result<NSet<f64>, ModelError> {
        self.q_table(self.default_value)
    }

    /// A start state drawn uniformly at random, or any state if no
    /// start states were set.
    pub fn sample_state<R: Rng>(&self, rng: &mut R) -> &State {
        if !self.starts.is_empty() {
            let index = &self.starts[rng.gen_range(0..self.starts.len())];
            return self
                .states
                .get(index)
                .expect("start states are validated against the state table");
        }
        let k = rng.gen_range(0..self.state_count);
        self.states
            .iter()
            .nth(k)
            .expect("every state table holds at least one state")
    }
}
