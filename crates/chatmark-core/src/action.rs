use crate::message::Action;

/// Filters the full action catalog down to the actions that apply to this
/// message: unscoped actions apply everywhere, scoped actions only to their
/// declared id. Order-preserving and idempotent.
pub fn scoped_actions(actions: &[Action], message_id: Option<&str>) -> Vec<Action> {
    actions
        .iter()
        .filter(|action| action.in_scope(message_id))
        .cloned()
        .collect()
}
