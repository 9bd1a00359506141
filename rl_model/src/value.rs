//! Tables derived from an action-value table.

use ndset::NSet;
use ndset::Slot;

use crate::mdp::Mdp;
use crate::mdp::ModelError;
use crate::state::Action;
use crate::state::State;

/// The state-value table `V[s] = max_a Q[s, a]`. Terminal states, which
/// have no actions, are valued at zero.
pub fn v_from_q(mdp: &Mdp, q: &NSet<f64>) -> Result<NSet<f64>, ModelError> {
    let v = NSet::try_like(mdp.states(), |index| -> Result<_, ModelError> {
        let state = mdp.state(index)?;
        let best = match greedy_action(q, state)? {
            Some(action) => *q.get_key(&(state, action))?,
            None => 0.0,
        };
        Ok(Slot::Leaf(best))
    })?;
    tracing::trace!(entries = v.leaf_count(), "derived state values");
    Ok(v)
}

/// The first action of `state` with the highest value in `q`, or `None`
/// if the state is terminal.
pub fn greedy_action<'a>(q: &NSet<f64>, state: &'a State) -> Result<Option<&'a Action>, ModelError> {
    let mut best: Option<(&Action, f64)> = None;
    for action in state.actions() {
        let value = *q.get_key(&(state, action))?;
        if best.map_or(true, |(_, max)| value > max) {
            best = Some((action, value));
        }
    }
    Ok(best.map(|(action, _)| action))
}
