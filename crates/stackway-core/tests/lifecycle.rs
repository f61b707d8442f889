//! Map, client requests and failure paths of the view lifecycle.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use stackway_core::config::Config;
use stackway_core::shell::{SurfaceId, X11Decorations, XdgDecorationMode};
use stackway_core::state::{Border, Geometry, GrabOperation, ResizeEdges};
use stackway_core::view::ToplevelHandle;
use stackway_core::{Core, CoreAction, CoreEvent, ShellEvent};

// ── Test 1: scene allocation failure ────────────────────────────

#[test]
fn surface_tree_failure_posts_no_memory_and_stays_unmapped() {
    let (scene, fail) = FlakyScene::new();
    let mut core = Core::with_scene(Config::default(), Box::new(scene));
    add_output(&mut core);
    let client = xdg_state(1, 400, 300);
    let id = new_xdg(&mut core, &client);

    fail.set(true);
    let actions = shell(&mut core, 1, ShellEvent::Map);
    assert_eq!(
        actions,
        vec![CoreAction::PostNoMemory {
            surface: SurfaceId(101)
        }]
    );
    let view = core.view(id).unwrap();
    assert!(!view.is_mapped());
    assert_eq!(view.surface, None);
    assert!(!view.listens_for_commits());
    assert!(!core.scene().is_enabled(view.tree));
    assert_eq!(core.focused_view(), None);
    assert_valid(&core);

    // Memory is back; the next map goes through.
    fail.set(false);
    shell(&mut core, 1, ShellEvent::Map);
    let view = core.view(id).unwrap();
    assert!(view.is_mapped());
    assert_eq!(view.surface, Some(SurfaceId(101)));
    assert_valid(&core);
}

// ── Test 2: decorations on first map ────────────────────────────

#[test]
fn server_side_decorations_are_centered_with_margin() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    client.borrow_mut().decoration = XdgDecorationMode::ServerSide;
    let id = map_xdg(&mut core, &client);

    let view = core.view(id).unwrap();
    assert!(view.ssd.enabled);
    assert_eq!(view.ssd.margin, Border::new(27, 1, 1, 1));
    // (1920 - 402) / 2 + 1, (1080 - 328) / 2 + 27
    assert_eq!(view.geometry, Geometry::new(760, 403, 400, 300));
    let decorations = view.ssd.tree.unwrap();
    assert_eq!(core.scene().parent(decorations), Some(view.tree));
    assert!(core.scene().is_enabled(decorations));
}

#[test]
fn oversized_x11_window_is_pushed_inside_the_layout() {
    let mut core = test_core();
    let client = x11_state(1, Geometry::new(0, 0, 1920, 1080));
    new_x11(&mut core, &client);
    shell(&mut core, 1, ShellEvent::Map);
    let id = view_of(&core, 1).unwrap();

    // Centered at (0, 13); the decorations and resize extents reach
    // 9 px past the left edge and 22 px past the top.
    let view = core.view(id).unwrap();
    assert_eq!(view.geometry, Geometry::new(9, 35, 1920, 1080));
    assert_eq!(
        client.borrow().configures.last(),
        Some(&Geometry::new(9, 35, 1920, 1080))
    );
    assert_eq!(core.scene().position(view.tree), Some((9, 35)));
}

#[test]
fn decorated_x11_window_is_configured_at_map() {
    let mut core = test_core();
    let client = x11_state(1, Geometry::new(100, 100, 300, 200));
    new_x11(&mut core, &client);
    shell(&mut core, 1, ShellEvent::Map);
    let id = view_of(&core, 1).unwrap();

    // Centering moves the window, then the boundary check configures it
    // in place.
    let view = core.view(id).unwrap();
    assert!(view.ssd.enabled);
    assert_eq!(client.borrow().configures, vec![view.geometry, view.geometry]);
    assert!(!view.pending.is_pending());
}

#[test]
fn remap_keeps_first_map_placement() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    let id = map_xdg(&mut core, &client);
    core.move_view(id, 10, 20);

    shell(&mut core, 1, ShellEvent::Unmap);
    shell(&mut core, 1, ShellEvent::Map);
    assert_eq!(core.view(id).unwrap().geometry, Geometry::new(10, 20, 400, 300));
}

// ── Test 3: client requests ─────────────────────────────────────

#[test]
fn fullscreen_request_before_map_is_honored() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    client.borrow_mut().fullscreen_requested = true;
    let id = map_xdg(&mut core, &client);

    let view = core.view(id).unwrap();
    assert!(view.is_fullscreen());
    assert_eq!(view.natural_geometry.map(|g| (g.width, g.height)), Some((400, 300)));
    assert!(client.borrow().fullscreen);
    assert_eq!(client.borrow().sizes_sent, vec![(1920, 1080)]);

    client.borrow_mut().size = (1920, 1080);
    commit(&mut core, 101, 1920, 1080);
    assert_eq!(core.view(id).unwrap().geometry, OUTPUT);

    shell(&mut core, 1, ShellEvent::RequestFullscreen(false));
    let view = core.view(id).unwrap();
    assert!(!view.is_fullscreen());
    assert_eq!(client.borrow().sizes_sent.last(), Some(&(400, 300)));
}

#[test]
fn configure_request_is_clamped_to_minimum_size() {
    let mut core = test_core();
    let client = x11_state(1, Geometry::new(100, 100, 300, 200));
    new_x11(&mut core, &client);
    shell(&mut core, 1, ShellEvent::Map);
    let id = view_of(&core, 1).unwrap();
    let pending = core.view(id).unwrap().pending;

    shell(
        &mut core,
        1,
        ShellEvent::RequestConfigure(Geometry::new(5, 6, 40, 500)),
    );
    assert_eq!(
        client.borrow().configures.last(),
        Some(&Geometry::new(5, 6, 100, 500))
    );
    assert_eq!(core.view(id).unwrap().pending, pending);
}

#[test]
fn xdg_configure_request_resizes_in_place() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    let id = map_xdg(&mut core, &client);
    let before = core.view(id).unwrap().geometry;
    let pending = core.view(id).unwrap().pending;

    shell(
        &mut core,
        1,
        ShellEvent::RequestConfigure(Geometry::new(0, 0, 50, 700)),
    );
    assert_eq!(client.borrow().sizes_sent.last(), Some(&(100, 700)));
    assert_eq!(core.view(id).unwrap().pending, pending);

    client.borrow_mut().size = (100, 700);
    commit(&mut core, 101, 100, 700);
    assert_eq!(
        core.view(id).unwrap().geometry,
        Geometry::new(before.x, before.y, 100, 700)
    );
    assert_valid(&core);
}

#[test]
fn move_and_resize_requests_begin_interactive_operations() {
    let mut core = test_core();
    let client = xdg_state(1, 400, 300);
    let id = new_xdg(&mut core, &client);

    // Not mapped yet: nothing to grab.
    assert!(shell(&mut core, 1, ShellEvent::RequestMove).is_empty());

    shell(&mut core, 1, ShellEvent::Map);
    assert_eq!(
        shell(&mut core, 1, ShellEvent::RequestMove),
        vec![CoreAction::BeginInteractive {
            view: id,
            mode: GrabOperation::Move,
            edges: ResizeEdges::empty(),
        }]
    );
    let edges = ResizeEdges::TOP | ResizeEdges::LEFT;
    assert_eq!(
        shell(&mut core, 1, ShellEvent::RequestResize(edges)),
        vec![CoreAction::BeginInteractive {
            view: id,
            mode: GrabOperation::Resize,
            edges,
        }]
    );
}

#[test]
fn minimize_request_hides_and_refocuses() {
    let mut core = test_core();
    let a = map_xdg(&mut core, &xdg_state(1, 400, 300));
    let b = map_xdg(&mut core, &xdg_state(2, 400, 300));

    let actions = shell(&mut core, 2, ShellEvent::RequestMinimize(true));
    assert_eq!(
        actions,
        vec![CoreAction::KeyboardFocus {
            surface: Some(SurfaceId(101))
        }]
    );
    assert!(!core.scene().is_enabled(core.view(b).unwrap().tree));
    assert_eq!(core.focused_view(), Some(a));

    shell(&mut core, 2, ShellEvent::RequestActivate);
    assert_eq!(core.focused_view(), Some(b));
    assert!(!core.view(b).unwrap().is_minimized());
    assert_eq!(core.state.stack.last(), Some(&b));
    assert_valid(&core);
}

#[test]
fn title_and_class_changes_reach_the_toplevel_handle() {
    let mut core = test_core();
    let client = x11_state(1, Geometry::new(0, 0, 300, 200));
    new_x11(&mut core, &client);
    shell(&mut core, 1, ShellEvent::Map);
    let id = view_of(&core, 1).unwrap();

    client.borrow_mut().title = Some("renamed".into());
    assert_eq!(
        shell(&mut core, 1, ShellEvent::SetTitle),
        vec![CoreAction::ToplevelTitle {
            handle: ToplevelHandle(1),
            title: "renamed".into(),
        }]
    );
    client.borrow_mut().class = Some("Other".into());
    shell(&mut core, 1, ShellEvent::SetClass);

    let view = core.view(id).unwrap();
    assert_eq!(view.title, "renamed");
    assert_eq!(view.app_id, "Other");
    assert_eq!(view.string_property("class"), "Other");
}

#[test]
fn decoration_hint_changes_toggle_server_side_decorations() {
    let mut core = test_core();
    let client = x11_state(1, Geometry::new(200, 200, 300, 200));
    new_x11(&mut core, &client);
    shell(&mut core, 1, ShellEvent::Map);
    let id = view_of(&core, 1).unwrap();
    assert!(core.view(id).unwrap().ssd.enabled);

    client.borrow_mut().decorations = X11Decorations::NoBorder;
    shell(&mut core, 1, ShellEvent::SetDecorations);
    let view = core.view(id).unwrap();
    assert!(!view.ssd.enabled);
    assert_eq!(view.margin(), Border::ZERO);
    assert!(!core.scene().is_enabled(view.ssd.tree.unwrap()));
}

// ── Test 4: compatibility surfaces retire handles on unmap ──────

#[test]
fn x11_unmap_retires_the_toplevel_handle() {
    let mut core = test_core();
    let client = x11_state(1, Geometry::new(0, 0, 300, 200));
    new_x11(&mut core, &client);
    assert_eq!(client.borrow().pings, 1);

    shell(&mut core, 1, ShellEvent::Map);
    let actions = shell(&mut core, 1, ShellEvent::Unmap);
    assert!(actions.contains(&CoreAction::ToplevelDestroyed {
        handle: ToplevelHandle(1)
    }));
    let id = view_of(&core, 1).unwrap();
    assert_eq!(core.view(id).unwrap().toplevel_handle, None);

    // A remap publishes a fresh handle; destroy has nothing left to retire.
    let actions = shell(&mut core, 1, ShellEvent::Map);
    assert!(actions.contains(&CoreAction::ToplevelCreated {
        handle: ToplevelHandle(2),
        view: id,
    }));
    shell(&mut core, 1, ShellEvent::Unmap);
    let actions = shell(&mut core, 1, ShellEvent::Destroy);
    assert!(!actions
        .iter()
        .any(|a| matches!(a, CoreAction::ToplevelDestroyed { .. })));
}

// ── Test 5: outputs ─────────────────────────────────────────────

#[test]
fn removed_output_hands_views_to_the_remaining_one() {
    let mut core = test_core();
    core.handle_event(CoreEvent::OutputAdded {
        id: 2,
        name: "HEADLESS-2".into(),
        geometry: Geometry::new(1920, 0, 1280, 1024),
        usable_area: None,
    });
    let id = map_xdg(&mut core, &xdg_state(1, 400, 300));
    core.move_view(id, 2000, 100);
    assert_eq!(core.view(id).unwrap().output, Some(2));

    core.handle_event(CoreEvent::OutputRemoved { id: 2 });
    assert_eq!(core.view(id).unwrap().output, Some(1));
}
