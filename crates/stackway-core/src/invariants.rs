//! Invariant validation for the core state.
//!
//! Called after every `handle_event` / `run_actions` in debug builds.

use crate::scene::SceneGraph;
use crate::signal::{Listener, Signals};
use crate::state::State;

/// Error indicating which invariant was violated.
#[derive(Debug, thiserror::Error)]
pub enum InvariantError {
    #[error("Focused view {0} does not exist or is not mapped")]
    FocusedViewMissing(String),

    #[error("Focused unmanaged surface {0} does not exist or is not mapped")]
    FocusedUnmanagedMissing(String),

    #[error("Cycle position {0} points to a non-existent view")]
    CycleViewMissing(String),

    #[error("View {0} is on non-existent workspace {1}")]
    WorkspaceMissing(String, String),

    #[error("Stacking order does not match the view set")]
    StackMismatch,

    #[error("Scene tree of view {0} is missing")]
    TreeMissing(String),

    #[error("Scene tree of view {0} is enabled={1} but the view is shown={2}")]
    TreeVisibility(String, bool, bool),

    #[error("Listener {0:?} refers to a destroyed record")]
    DanglingListener(Listener),

    #[error("View {0} is mapped={1} but listens for commits={2}")]
    CommitSubscription(String, bool, bool),
}

/// Validate all core invariants. Returns the first violation found.
pub fn validate(
    state: &State,
    scene: &dyn SceneGraph,
    signals: &Signals,
) -> Result<(), InvariantError> {
    // 1. Focus points at live, mapped records
    if let Some(id) = state.focus.focused_view {
        if !state.views.get(&id).is_some_and(|v| v.is_mapped()) {
            return Err(InvariantError::FocusedViewMissing(id.to_string()));
        }
    }
    if let Some(id) = state.focus.focused_unmanaged {
        if !state.unmanaged.get(&id).is_some_and(|u| u.mapped) {
            return Err(InvariantError::FocusedUnmanagedMissing(id.to_string()));
        }
    }
    if let Some(id) = state.focus.cycle_view {
        if !state.views.contains_key(&id) {
            return Err(InvariantError::CycleViewMissing(id.to_string()));
        }
    }

    // 2. The stack holds every view exactly once
    if state.stack.len() != state.views.len()
        || !state.stack.iter().all(|id| state.views.contains_key(id))
    {
        return Err(InvariantError::StackMismatch);
    }

    for view in state.views.values() {
        // 3. Workspace reference is valid
        if state.workspaces.get(view.workspace).is_none() {
            return Err(InvariantError::WorkspaceMissing(
                view.id.to_string(),
                view.workspace.to_string(),
            ));
        }

        // 4. The tree lives as long as the view; enabled iff shown
        if !scene.contains(view.tree) {
            return Err(InvariantError::TreeMissing(view.id.to_string()));
        }
        let enabled = scene.is_enabled(view.tree);
        if enabled != view.is_shown() {
            return Err(InvariantError::TreeVisibility(
                view.id.to_string(),
                enabled,
                view.is_shown(),
            ));
        }

        // 5. Commits are heard exactly while mapped
        let expects_commits = view.is_mapped() && view.surface.is_some();
        if expects_commits != view.listens_for_commits() {
            return Err(InvariantError::CommitSubscription(
                view.id.to_string(),
                view.is_mapped(),
                view.listens_for_commits(),
            ));
        }
    }

    // 6. No registration outlives its record
    for listener in signals.listeners() {
        let alive = match listener {
            Listener::View(id) => state.views.contains_key(&id),
            Listener::Unmanaged(id) => state.unmanaged.contains_key(&id),
        };
        if !alive {
            return Err(InvariantError::DanglingListener(listener));
        }
    }

    Ok(())
}
