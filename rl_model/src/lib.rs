//! Tabular models for reinforcement learning.
//!
//! An [`Mdp`] describes a finite state space, the actions available in
//! each state, and a discount factor. It allocates the tables that
//! control algorithms read and update every step:
//!
//! - state-value tables `V[s]` ([`Mdp::v_table`]),
//! - action-value tables `Q[s, a]` ([`Mdp::q_table`]),
//! - policy tables `Pi[s]` ([`Mdp::pi_table`]).
//!
//! All tables are [`ndset::NSet`]s shaped after the state space, so a
//! [`State`] or a `(state, action)` pair is directly usable as a key:
//!
//! ```
//! use rl_model::Mdp;
//!
//! let mdp = Mdp::with_action_fn(0.9, &[4], |s| vec![s[0] + 1]).unwrap();
//! let mut q = mdp.q_table(0.0).unwrap();
//! let s = mdp.state(&[3]).unwrap();
//! q.update_key(&(s, &s.actions()[2]), |v| *v += 1.0).unwrap();
//! assert_eq!(rl_model::v_from_q(&mdp, &q).unwrap()[[3]], 1.0);
//! ```

pub mod config;
mod mdp;
mod state;
mod value;

pub use config::ConfigError;
pub use config::ModelConfig;
pub use mdp::ActionDimsFn;
pub use mdp::ActionLayout;
pub use mdp::Mdp;
pub use mdp::ModelError;
pub use state::Action;
pub use state::State;
pub use state::enumerate_actions;
pub use value::greedy_action;
pub use value::v_from_q;
