//! Core-only integration tests.
//!
//! These tests exercise stackway-core WITHOUT any backend or protocol crate.
//! Native surfaces are plain mocks; the scene is the in-memory one.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use stackway_core::action::{Action, ActionKind, ActionList};
use stackway_core::shell::SurfaceId;
use stackway_core::signal::{EventKind, EventSource, Listener};
use stackway_core::state::{Geometry, ResizeEdges};
use stackway_core::view::ToplevelHandle;
use stackway_core::{CoreAction, ShellEvent, WorkspaceId};

fn list(actions: impl IntoIterator<Item = Action>) -> ActionList {
    actions.into_iter().collect()
}

// ── Test 1: first map places, focuses and publishes ──────────────

#[test]
fn first_map_centers_focuses_and_publishes() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    let id = new_xdg(&mut core, &client);

    let view = core.view(id).unwrap();
    assert!(!view.is_mapped());
    assert!(!core.scene().is_enabled(view.tree));

    let actions = shell(&mut core, 1, ShellEvent::Map);
    assert_eq!(
        actions,
        vec![
            CoreAction::ToplevelCreated {
                handle: ToplevelHandle(1),
                view: id,
            },
            CoreAction::KeyboardFocus {
                surface: Some(SurfaceId(101)),
            },
            CoreAction::ToplevelTitle {
                handle: ToplevelHandle(1),
                title: "xdg 1".into(),
            },
            CoreAction::ToplevelAppId {
                handle: ToplevelHandle(1),
                app_id: "mock".into(),
            },
        ]
    );

    let view = core.view(id).unwrap();
    assert_eq!(view.geometry, Geometry::new(760, 390, 400, 300));
    assert_eq!(view.output, Some(1));
    assert!(view.listens_for_commits());
    assert_eq!(core.scene().position(view.tree), Some((760, 390)));
    assert!(core.scene().is_enabled(view.tree));
    assert_eq!(core.focused_view(), Some(id));
    assert!(client.borrow().activated);
    assert_valid(&core);
}

// ── Test 2: map and unmap are idempotent ─────────────────────────

#[test]
fn map_and_unmap_are_idempotent() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    let id = map_xdg(&mut core, &client);
    let geometry = core.view(id).unwrap().geometry;

    assert!(shell(&mut core, 1, ShellEvent::Map).is_empty());
    assert_eq!(core.view(id).unwrap().geometry, geometry);

    let actions = shell(&mut core, 1, ShellEvent::Unmap);
    assert_eq!(actions, vec![CoreAction::KeyboardFocus { surface: None }]);
    let view = core.view(id).unwrap();
    assert!(!view.is_mapped());
    assert!(!view.listens_for_commits());
    assert!(!core.scene().is_enabled(view.tree));

    assert!(shell(&mut core, 1, ShellEvent::Unmap).is_empty());
    assert!(!core.view(id).unwrap().is_mapped());
    assert_valid(&core);
}

// ── Test 3: split commits converge on the exact target ──────────

#[test]
fn split_commits_clear_pending_only_on_exact_target() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    let id = map_xdg(&mut core, &client);

    core.configure_view(id, Geometry::new(50, 80, 800, 600));
    assert_eq!(client.borrow().sizes_sent, vec![(800, 600)]);
    assert!(core.view(id).unwrap().pending.is_pending());

    commit(&mut core, 101, 600, 600);
    let view = core.view(id).unwrap();
    assert_eq!(view.geometry, Geometry::new(250, 80, 600, 600));
    assert!(view.pending.is_pending());
    assert_eq!(core.scene().position(view.tree), Some((250, 80)));

    commit(&mut core, 101, 800, 600);
    let view = core.view(id).unwrap();
    assert_eq!(view.geometry, Geometry::new(50, 80, 800, 600));
    assert!(!view.pending.is_pending());
    assert_eq!(core.scene().position(view.tree), Some((50, 80)));
}

#[test]
fn commits_are_ignored_while_unmapped() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    let id = map_xdg(&mut core, &client);
    shell(&mut core, 1, ShellEvent::Unmap);

    let before = core.view(id).unwrap().geometry;
    assert!(core
        .listener_for(EventSource::Surface(SurfaceId(101)), EventKind::Commit)
        .is_none());
    commit(&mut core, 101, 1000, 700);
    assert_eq!(core.view(id).unwrap().geometry, before);
}

// ── Test 4: each action re-resolves its target ──────────────────

#[test]
fn focus_then_close_acts_on_the_newly_focused_view() {
    let mut core = test_core();
    let a_client = xdg_state(1, 400, 300);
    let b_client = xdg_state(2, 400, 300);
    let a = map_xdg(&mut core, &a_client);
    let b = map_xdg(&mut core, &b_client);

    core.move_view(a, 0, 0);
    core.move_view(b, 1000, 500);
    core.focus_and_activate(a);
    core.handle_event(stackway_core::CoreEvent::PointerMotion {
        x: 1100.0,
        y: 600.0,
    });
    assert_eq!(core.focused_view(), Some(a));

    core.run_actions(
        None,
        Some(&list([ActionKind::Focus.into(), ActionKind::Close.into()])),
        ResizeEdges::empty(),
    );

    assert_eq!(b_client.borrow().close_requests, 1);
    assert_eq!(a_client.borrow().close_requests, 0);
    assert_eq!(core.focused_view(), Some(b));
}

#[test]
fn activator_overrides_focus() {
    let mut core = test_core();
    let a_client = xdg_state(1, 400, 300);
    let b_client = xdg_state(2, 400, 300);
    let a = map_xdg(&mut core, &a_client);
    map_xdg(&mut core, &b_client);

    core.run_actions(Some(a), Some(&list([ActionKind::Close.into()])), ResizeEdges::empty());
    assert_eq!(a_client.borrow().close_requests, 1);
    assert_eq!(b_client.borrow().close_requests, 0);
}

// ── Test 5: degenerate action lists ──────────────────────────────

#[test]
fn unknown_action_becomes_noop() {
    let mut core = test_core();
    let action = Action::new(Some("Frobnicate"), Some("x".into()));
    assert_eq!(action.kind, ActionKind::NoOp);

    let actions = core.run_actions(None, Some(&list([action])), ResizeEdges::empty());
    assert!(actions.is_empty());
    assert!(!core.should_exit);
}

#[test]
fn absent_list_does_nothing() {
    let mut core = test_core();
    assert!(core.run_actions(None, None, ResizeEdges::empty()).is_empty());
}

#[test]
fn move_to_edge_without_argument_keeps_geometry() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    let id = map_xdg(&mut core, &client);
    let before = core.view(id).unwrap().geometry;

    let actions = core.run_actions(
        None,
        Some(&list([ActionKind::MoveToEdge.into(), ActionKind::Exit.into()])),
        ResizeEdges::empty(),
    );

    assert_eq!(core.view(id).unwrap().geometry, before);
    // The failed step does not abort the rest of the list.
    assert_eq!(actions, vec![CoreAction::Exit]);
    assert!(core.should_exit);
}

// ── Test 6: workspaces ──────────────────────────────────────────

#[test]
fn go_to_unknown_desktop_is_a_noop() {
    let mut core = test_core();
    let actions = core.run_actions(
        None,
        Some(&list([Action::with_arg(ActionKind::GoToDesktop, "9")])),
        ResizeEdges::empty(),
    );
    assert!(actions.is_empty());
    assert_eq!(core.state.workspaces.current_id(), WorkspaceId(1));
}

#[test]
fn workspace_switch_hides_views_and_moves_focus() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    let id = map_xdg(&mut core, &client);
    let go = |name: &str| list([Action::with_arg(ActionKind::GoToDesktop, name)]);

    let actions = core.run_actions(None, Some(&go("2")), ResizeEdges::empty());
    assert_eq!(
        actions,
        vec![
            CoreAction::WorkspaceChanged {
                active: WorkspaceId(2)
            },
            CoreAction::KeyboardFocus { surface: None },
        ]
    );
    assert_eq!(core.focused_view(), None);
    assert!(!core.scene().is_visible(core.view(id).unwrap().tree));

    let actions = core.run_actions(None, Some(&go("left")), ResizeEdges::empty());
    assert_eq!(
        actions,
        vec![
            CoreAction::WorkspaceChanged {
                active: WorkspaceId(1)
            },
            CoreAction::KeyboardFocus {
                surface: Some(SurfaceId(101))
            },
        ]
    );
    assert_eq!(core.focused_view(), Some(id));
    assert!(core.scene().is_visible(core.view(id).unwrap().tree));
}

// ── Test 7: destroy leaves nothing behind ───────────────────────

#[test]
fn destroy_releases_every_listener() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    let id = map_xdg(&mut core, &client);
    let tree = core.view(id).unwrap().tree;
    assert!(core.signals().count_for(Listener::View(id)) > 0);

    shell(&mut core, 1, ShellEvent::Unmap);
    shell(&mut core, 1, ShellEvent::Destroy);

    assert!(core.view(id).is_none());
    assert!(!core.scene().contains(tree));
    assert_eq!(core.signals().count_for(Listener::View(id)), 0);
    assert!(core.signals().is_empty());

    // Late notifications reach nobody.
    assert!(shell(&mut core, 1, ShellEvent::Map).is_empty());
    assert!(commit(&mut core, 101, 10, 10).is_empty());
    assert_valid(&core);
}

#[test]
fn destroying_the_focused_view_focuses_the_next_one() {
    let mut core = test_core();
    let a_client = xdg_state(1, 400, 300);
    let b_client = xdg_state(2, 400, 300);
    let a = map_xdg(&mut core, &a_client);
    let b = map_xdg(&mut core, &b_client);
    assert_eq!(core.focused_view(), Some(b));

    let actions = shell(&mut core, 2, ShellEvent::Destroy);
    assert!(actions.contains(&CoreAction::ToplevelDestroyed {
        handle: ToplevelHandle(2)
    }));
    assert!(actions.contains(&CoreAction::KeyboardFocus {
        surface: Some(SurfaceId(101))
    }));
    assert!(core.view(b).is_none());
    assert_eq!(core.focused_view(), Some(a));
    assert_eq!(core.state.stack, vec![a]);
    assert_valid(&core);
}

// ── Test 8: invariants hold across a busy session ───────────────

#[test]
fn invariants_hold_after_operations() {
    let mut core = test_core();
    let clients: Vec<_> = (1..=3).map(|n| xdg_state(n, 300 + n as i32 * 10, 200)).collect();
    let ids: Vec<_> = clients.iter().map(|c| map_xdg(&mut core, c)).collect();
    assert_valid(&core);

    core.run_actions(
        Some(ids[0]),
        Some(&list([
            ActionKind::ToggleMaximize.into(),
            ActionKind::ToggleFullscreen.into(),
            ActionKind::Iconify.into(),
            Action::with_arg(ActionKind::SendToDesktop, "3"),
        ])),
        ResizeEdges::empty(),
    );
    assert_valid(&core);

    shell(&mut core, 2, ShellEvent::Unmap);
    shell(&mut core, 3, ShellEvent::Destroy);
    commit(&mut core, 101, 1920, 1080);
    assert_valid(&core);

    let view = core.view(ids[0]).unwrap();
    assert!(view.is_minimized());
    assert_eq!(view.workspace, WorkspaceId(3));
}
