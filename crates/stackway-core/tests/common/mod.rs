//! Mock native surfaces and a scene that can run out of memory.
//!
//! Mocks share their state through `Rc<RefCell<..>>` so a test can flip
//! client-side properties and inspect the requests the core made after the
//! surface was handed over.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use stackway_core::config::Config;
use stackway_core::scene::{MemoryScene, NodeId, SceneGraph};
use stackway_core::shell::{
    ShellId, SurfaceId, X11Decorations, XdgDecorationMode, XdgToplevel, XwaylandSurface,
};
use stackway_core::signal::{EventKind, EventSource, Listener};
use stackway_core::state::Geometry;
use stackway_core::{Core, CoreAction, CoreEvent, ShellEvent, UnmanagedId, ViewId};

// ── XDG toplevel ─────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct XdgState {
    pub id: u64,
    pub surface: u64,
    pub size: (i32, i32),
    pub title: Option<String>,
    pub app_id: Option<String>,
    pub fullscreen_requested: bool,
    pub decoration: XdgDecorationMode,
    /// Sizes sent with `set_size`, oldest first.
    pub sizes_sent: Vec<(i32, i32)>,
    pub activated: bool,
    pub fullscreen: bool,
    pub maximized: bool,
    pub close_requests: usize,
}

#[derive(Debug)]
pub struct MockXdg(pub Rc<RefCell<XdgState>>);

impl XdgToplevel for MockXdg {
    fn id(&self) -> ShellId {
        ShellId(self.0.borrow().id)
    }

    fn surface(&self) -> SurfaceId {
        SurfaceId(self.0.borrow().surface)
    }

    fn size(&self) -> (i32, i32) {
        self.0.borrow().size
    }

    fn title(&self) -> Option<String> {
        self.0.borrow().title.clone()
    }

    fn app_id(&self) -> Option<String> {
        self.0.borrow().app_id.clone()
    }

    fn requests_fullscreen(&self) -> bool {
        self.0.borrow().fullscreen_requested
    }

    fn decoration_mode(&self) -> XdgDecorationMode {
        self.0.borrow().decoration
    }

    fn set_size(&mut self, width: i32, height: i32) {
        self.0.borrow_mut().sizes_sent.push((width, height));
    }

    fn send_close(&mut self) {
        self.0.borrow_mut().close_requests += 1;
    }

    fn set_activated(&mut self, activated: bool) {
        self.0.borrow_mut().activated = activated;
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.0.borrow_mut().fullscreen = fullscreen;
    }

    fn set_maximized(&mut self, maximized: bool) {
        self.0.borrow_mut().maximized = maximized;
    }
}

// ── XWayland surface ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct X11State {
    pub id: u64,
    pub surface: Option<u64>,
    pub geometry: Geometry,
    pub override_redirect: bool,
    pub fullscreen: bool,
    pub minimized: bool,
    pub title: Option<String>,
    pub class: Option<String>,
    pub decorations: X11Decorations,
    pub wants_focus: bool,
    pub pings: usize,
    /// Geometries sent with `configure`, oldest first.
    pub configures: Vec<Geometry>,
    pub close_requests: usize,
    pub activated: bool,
    pub restacks: usize,
    pub maximized: bool,
}

#[derive(Debug)]
pub struct MockX11(pub Rc<RefCell<X11State>>);

impl XwaylandSurface for MockX11 {
    fn id(&self) -> ShellId {
        ShellId(self.0.borrow().id)
    }

    fn surface(&self) -> Option<SurfaceId> {
        self.0.borrow().surface.map(SurfaceId)
    }

    fn geometry(&self) -> Geometry {
        self.0.borrow().geometry
    }

    fn override_redirect(&self) -> bool {
        self.0.borrow().override_redirect
    }

    fn fullscreen(&self) -> bool {
        self.0.borrow().fullscreen
    }

    fn minimized(&self) -> bool {
        self.0.borrow().minimized
    }

    fn title(&self) -> Option<String> {
        self.0.borrow().title.clone()
    }

    fn class(&self) -> Option<String> {
        self.0.borrow().class.clone()
    }

    fn decorations(&self) -> X11Decorations {
        self.0.borrow().decorations
    }

    fn wants_focus(&self) -> bool {
        self.0.borrow().wants_focus
    }

    fn ping(&mut self) {
        self.0.borrow_mut().pings += 1;
    }

    fn configure(&mut self, geometry: Geometry) {
        let mut state = self.0.borrow_mut();
        state.configures.push(geometry);
        state.geometry = geometry;
    }

    fn close(&mut self) {
        self.0.borrow_mut().close_requests += 1;
    }

    fn activate(&mut self, activated: bool) {
        self.0.borrow_mut().activated = activated;
    }

    fn set_minimized(&mut self, minimized: bool) {
        self.0.borrow_mut().minimized = minimized;
    }

    fn restack_above(&mut self) {
        self.0.borrow_mut().restacks += 1;
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.0.borrow_mut().fullscreen = fullscreen;
    }

    fn set_maximized(&mut self, maximized: bool) {
        self.0.borrow_mut().maximized = maximized;
    }
}

// ── Scene that can fail allocations ──────────────────────────────

/// `MemoryScene` whose surface trees fail while `fail` is set.
#[derive(Debug)]
pub struct FlakyScene {
    inner: MemoryScene,
    pub fail: Rc<Cell<bool>>,
}

impl FlakyScene {
    pub fn new() -> (Self, Rc<Cell<bool>>) {
        let fail = Rc::new(Cell::new(false));
        let scene = Self {
            inner: MemoryScene::new(),
            fail: Rc::clone(&fail),
        };
        (scene, fail)
    }
}

impl SceneGraph for FlakyScene {
    fn root(&self) -> NodeId {
        self.inner.root()
    }

    fn create_tree(&mut self, parent: NodeId) -> NodeId {
        self.inner.create_tree(parent)
    }

    fn create_surface_tree(&mut self, parent: NodeId, surface: SurfaceId) -> Option<NodeId> {
        if self.fail.get() {
            return None;
        }
        self.inner.create_surface_tree(parent, surface)
    }

    fn set_enabled(&mut self, node: NodeId, enabled: bool) {
        self.inner.set_enabled(node, enabled);
    }

    fn set_position(&mut self, node: NodeId, x: i32, y: i32) {
        self.inner.set_position(node, x, y);
    }

    fn reparent(&mut self, node: NodeId, parent: NodeId) {
        self.inner.reparent(node, parent);
    }

    fn raise_to_top(&mut self, node: NodeId) {
        self.inner.raise_to_top(node);
    }

    fn destroy(&mut self, node: NodeId) {
        self.inner.destroy(node);
    }

    fn contains(&self, node: NodeId) -> bool {
        self.inner.contains(node)
    }

    fn is_enabled(&self, node: NodeId) -> bool {
        self.inner.is_enabled(node)
    }

    fn position(&self, node: NodeId) -> Option<(i32, i32)> {
        self.inner.position(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.parent(node)
    }

    fn surface(&self, node: NodeId) -> Option<SurfaceId> {
        self.inner.surface(node)
    }
}

// ── Helpers ──────────────────────────────────────────────────────

pub const OUTPUT: Geometry = Geometry::new(0, 0, 1920, 1080);

pub fn add_output(core: &mut Core) {
    core.handle_event(CoreEvent::OutputAdded {
        id: 1,
        name: "HEADLESS-1".into(),
        geometry: OUTPUT,
        usable_area: None,
    });
}

/// Core with default config and one 1920x1080 output.
pub fn test_core() -> Core {
    core_with(Config::default())
}

pub fn core_with(config: Config) -> Core {
    let mut core = Core::new(config);
    add_output(&mut core);
    core
}

/// Undecorated xdg toplevel state with shell id `n` and surface `100 + n`.
pub fn xdg_state(n: u64, width: i32, height: i32) -> Rc<RefCell<XdgState>> {
    Rc::new(RefCell::new(XdgState {
        id: n,
        surface: 100 + n,
        size: (width, height),
        title: Some(format!("xdg {n}")),
        app_id: Some("mock".into()),
        decoration: XdgDecorationMode::ClientSide,
        ..XdgState::default()
    }))
}

/// Managed X11 surface state with shell id `n` and surface `100 + n`.
pub fn x11_state(n: u64, geometry: Geometry) -> Rc<RefCell<X11State>> {
    Rc::new(RefCell::new(X11State {
        id: n,
        surface: Some(100 + n),
        geometry,
        title: Some(format!("x11 {n}")),
        class: Some("XMock".into()),
        ..X11State::default()
    }))
}

pub fn shell(core: &mut Core, n: u64, event: ShellEvent) -> Vec<CoreAction> {
    core.handle_event(CoreEvent::Shell {
        id: ShellId(n),
        event,
    })
}

pub fn commit(core: &mut Core, surface: u64, width: i32, height: i32) -> Vec<CoreAction> {
    core.handle_event(CoreEvent::Commit {
        surface: SurfaceId(surface),
        width,
        height,
    })
}

pub fn new_xdg(core: &mut Core, state: &Rc<RefCell<XdgState>>) -> ViewId {
    let n = state.borrow().id;
    core.handle_event(CoreEvent::NewXdgToplevel(Box::new(MockXdg(Rc::clone(state)))));
    view_of(core, n).expect("toplevel became a view")
}

pub fn new_x11(core: &mut Core, state: &Rc<RefCell<X11State>>) -> Vec<CoreAction> {
    core.handle_event(CoreEvent::NewXwaylandSurface(Box::new(MockX11(Rc::clone(state)))))
}

/// Create and map an xdg toplevel.
pub fn map_xdg(core: &mut Core, state: &Rc<RefCell<XdgState>>) -> ViewId {
    let id = new_xdg(core, state);
    let n = state.borrow().id;
    shell(core, n, ShellEvent::Map);
    id
}

/// View listening on shell object `n`.
pub fn view_of(core: &Core, n: u64) -> Option<ViewId> {
    match core.listener_for(EventSource::Shell(ShellId(n)), EventKind::Map) {
        Some(Listener::View(id)) => Some(id),
        _ => None,
    }
}

/// Unmanaged record listening on shell object `n`.
pub fn unmanaged_of(core: &Core, n: u64) -> Option<UnmanagedId> {
    match core.listener_for(EventSource::Shell(ShellId(n)), EventKind::Map) {
        Some(Listener::Unmanaged(id)) => Some(id),
        _ => None,
    }
}

pub fn assert_valid(core: &Core) {
    if let Err(e) = core.validate_invariants() {
        panic!("invariant violated: {e}");
    }
}
