//! Stackway Core — Protocol-agnostic stacking window manager engine
//!
//! This crate contains the window-management logic (view lifecycle,
//! geometry negotiation, focus, workspaces, actions) with zero dependencies
//! on display protocols.
//!
//! Backends own the protocol objects. They hand native surface handles to
//! [`Core`] through [`CoreEvent`]s, forward every notification those
//! objects emit, and apply the returned [`CoreAction`]s.
//!
//! # Quick Start
//! ```
//! use stackway_core::{Core, CoreEvent};
//! use stackway_core::action::{Action, ActionKind, ActionList};
//! use stackway_core::config::Config;
//! use stackway_core::state::Geometry;
//!
//! let mut core = Core::new(Config::default());
//!
//! core.handle_event(CoreEvent::OutputAdded {
//!     id: 1,
//!     name: "HDMI-A-1".into(),
//!     geometry: Geometry::new(0, 0, 1920, 1080),
//!     usable_area: None,
//! });
//!
//! // A key binding fired: run its actions against the focused view
//! let mut list = ActionList::new();
//! list.push(Action::with_arg(ActionKind::GoToDesktop, "2"));
//! let actions = core.run_actions(None, Some(&list), Default::default());
//! assert_eq!(actions.len(), 1);
//! ```

pub mod action;
pub mod arrange;
pub mod config;
pub mod desktop;
pub mod dispatch;
pub mod event;
pub mod input;
pub mod invariants;
pub mod lifecycle;
pub mod menu;
pub mod reconcile;
pub mod scene;
pub mod shell;
pub mod signal;
pub mod ssd;
pub mod state;
pub mod unmanaged;
pub mod view;
pub mod workspace;

// Re-export primary API types at crate root
pub use event::{CoreAction, CoreEvent, ShellEvent};
pub use state::Geometry;
pub use unmanaged::UnmanagedId;
pub use view::ViewId;
pub use workspace::WorkspaceId;

use tracing::{debug, warn};

use config::Config;
use input::{Bindings, KeyCombo, MouseButton, MouseEvent};
use scene::{MemoryScene, SceneGraph};
use signal::{EventKind, EventSource, Listener, Signals};
use ssd::SsdPart;
use state::{Output, ResizeEdges, State};
use unmanaged::Unmanaged;
use view::View;

/// Button held since a press, for click and drag bindings.
#[derive(Debug, Clone, Copy)]
struct PointerPress {
    button: MouseButton,
    view: Option<ViewId>,
    part: SsdPart,
    dragged: bool,
}

/// The protocol-agnostic window manager engine.
///
/// Owns all WM state. Backends drive it via [`handle_event`](Core::handle_event)
/// and [`run_actions`](Core::run_actions), then apply the returned
/// [`CoreAction`]s.
pub struct Core {
    /// All window-manager state
    pub state: State,
    /// Parsed key and mouse bindings
    pub bindings: Bindings,
    scene: Box<dyn SceneGraph>,
    signals: Signals,
    press: Option<PointerPress>,
    /// Effects collected while handling the current entry point
    actions: Vec<CoreAction>,
    /// Exit requested
    pub should_exit: bool,
}

impl Core {
    /// Create a new core engine arranging an in-memory scene.
    pub fn new(config: Config) -> Self {
        Self::with_scene(config, Box::new(MemoryScene::new()))
    }

    /// Create a core engine arranging the backend's scene graph.
    pub fn with_scene(config: Config, mut scene: Box<dyn SceneGraph>) -> Self {
        let bindings = Bindings::from_config(&config);
        let state = State::new(config, scene.as_mut());

        Self {
            state,
            bindings,
            scene,
            signals: Signals::new(),
            press: None,
            actions: Vec::new(),
            should_exit: false,
        }
    }

    pub fn scene(&self) -> &dyn SceneGraph {
        self.scene.as_ref()
    }

    /// Subscription registry, for inspecting who receives what.
    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.state.views.get(&id)
    }

    pub fn unmanaged(&self, id: UnmanagedId) -> Option<&Unmanaged> {
        self.state.unmanaged.get(&id)
    }

    /// Listener registered for a shell notification, if any.
    pub fn listener_for(&self, source: EventSource, kind: EventKind) -> Option<Listener> {
        self.signals.listener(source, kind)
    }

    pub(crate) fn emit(&mut self, action: CoreAction) {
        self.actions.push(action);
    }

    fn take_actions(&mut self) -> Vec<CoreAction> {
        let actions = std::mem::take(&mut self.actions);

        #[cfg(debug_assertions)]
        if let Err(e) = self.validate_invariants() {
            warn!("Invariant violation: {}", e);
        }

        actions
    }

    /// Validate core invariants. See [`invariants`].
    pub fn validate_invariants(&self) -> Result<(), invariants::InvariantError> {
        invariants::validate(&self.state, self.scene.as_ref(), &self.signals)
    }

    // ── Event handling (backend → core) ──────────────────────────────

    /// Process a backend event. Returns actions the backend must apply.
    pub fn handle_event(&mut self, event: CoreEvent) -> Vec<CoreAction> {
        match event {
            CoreEvent::NewXwaylandSurface(surface) => self.new_xwayland_surface(surface),
            CoreEvent::NewXdgToplevel(toplevel) => self.new_xdg_toplevel(toplevel),
            CoreEvent::Shell { id, event } => {
                match self.signals.listener(EventSource::Shell(id), event.kind()) {
                    Some(Listener::View(view)) => self.on_view_event(view, event),
                    Some(Listener::Unmanaged(unmanaged)) => {
                        self.on_unmanaged_event(unmanaged, event)
                    }
                    None => debug!("{} {:?}: no listener", id, event.kind()),
                }
            }
            CoreEvent::Commit {
                surface,
                width,
                height,
            } => match self.signals.listener(EventSource::Surface(surface), EventKind::Commit) {
                Some(Listener::View(view)) => self.commit_view(view, width, height),
                Some(Listener::Unmanaged(unmanaged)) => self.commit_unmanaged(unmanaged),
                None => {}
            },
            CoreEvent::OutputAdded {
                id,
                name,
                geometry,
                usable_area,
            } => self.on_output_added(id, name, geometry, usable_area),
            CoreEvent::OutputRemoved { id } => self.on_output_removed(id),
            CoreEvent::PointerMotion { x, y } => self.on_pointer_motion(x, y),
            CoreEvent::PointerButton { button, pressed } => {
                self.on_pointer_button(button, pressed)
            }
            CoreEvent::Key { combo } => self.on_key(&combo),
        }

        self.take_actions()
    }

    /// Run the actions bound to `combo`, if any.
    pub fn handle_key(&mut self, combo: &KeyCombo) -> Vec<CoreAction> {
        self.on_key(combo);
        self.take_actions()
    }

    /// Run the mouse bindings for a button press or release at the
    /// current pointer position.
    pub fn handle_pointer_button(&mut self, button: u32, pressed: bool) -> Vec<CoreAction> {
        self.on_pointer_button(button, pressed);
        self.take_actions()
    }

    /// Execute an action list (from a binding, IPC, etc.). Returns actions.
    pub fn run_actions(
        &mut self,
        activator: Option<ViewId>,
        actions: Option<&action::ActionList>,
        resize_edges: ResizeEdges,
    ) -> Vec<CoreAction> {
        self.dispatch(activator, actions, resize_edges);
        self.take_actions()
    }

    /// Window cycling ended (modifier released): focus the selected view.
    pub fn end_cycle(&mut self) -> Vec<CoreAction> {
        if let Some(id) = self.state.focus.cycle_view.take() {
            self.focus_and_activate(id);
            self.move_to_front(id);
        }
        self.emit(CoreAction::UpdateOsd { view: None });
        self.take_actions()
    }

    /// Apply a freshly loaded configuration.
    ///
    /// Workspaces are created once at startup and survive a reload.
    pub fn reload_config(&mut self, config: Config) -> Vec<CoreAction> {
        if config.workspaces.names.len() != self.state.workspaces.len() {
            warn!("Workspace changes take effect after restart");
        }
        self.bindings = Bindings::from_config(&config);
        self.state.menus = menu::Menus::new(&config.menus);
        self.state.config = config;

        let decorated: Vec<ViewId> = self
            .state
            .views
            .values()
            .filter(|v| v.ssd.enabled)
            .map(|v| v.id)
            .collect();
        for id in decorated {
            self.refresh_decorations(id);
        }
        self.take_actions()
    }

    // ── Event handlers ───────────────────────────────────────────────

    fn on_key(&mut self, combo: &KeyCombo) {
        let Some(list) = self.bindings.key(combo).cloned() else {
            debug!("No binding for {}", combo);
            return;
        };
        self.dispatch(None, Some(&list), ResizeEdges::empty());
    }

    fn on_output_added(
        &mut self,
        id: u64,
        name: String,
        geometry: Geometry,
        usable_area: Option<Geometry>,
    ) {
        let output = Output {
            id,
            name,
            geometry,
            usable_area: usable_area.unwrap_or(geometry),
        };
        self.state.outputs.insert(id, output);
        self.rediscover_outputs(|v| v.output.is_none());
    }

    fn on_output_removed(&mut self, id: u64) {
        self.state.outputs.shift_remove(&id);
        self.rediscover_outputs(|v| v.output == Some(id));
    }

    fn rediscover_outputs(&mut self, filter: impl Fn(&View) -> bool) {
        let stale: Vec<ViewId> = self
            .state
            .views
            .values()
            .filter(|v| v.flags.contains(view::ViewFlags::BEEN_MAPPED) && filter(v))
            .map(|v| v.id)
            .collect();
        for id in stale {
            self.discover_output(id);
        }
    }

    fn on_pointer_motion(&mut self, x: f64, y: f64) {
        self.state.pointer_position = (x, y);

        let Some(press) = self.press.as_mut() else {
            return;
        };
        if press.dragged {
            return;
        }
        press.dragged = true;
        let press = *press;
        self.run_mousebinds(press.view, press.part, press.button, MouseEvent::Drag);
    }

    fn on_pointer_button(&mut self, code: u32, pressed: bool) {
        let Some(button) = MouseButton::from_code(code) else {
            debug!("Ignoring pointer button {:#x}", code);
            return;
        };
        let (view, part) = self.part_at_pointer();

        if pressed {
            self.press = Some(PointerPress {
                button,
                view,
                part,
                dragged: false,
            });
            self.run_mousebinds(view, part, button, MouseEvent::Press);
            return;
        }

        let press = self.press.take();
        self.run_mousebinds(view, part, button, MouseEvent::Release);
        if let Some(press) = press {
            if press.button == button && !press.dragged && press.view == view && press.part == part
            {
                self.run_mousebinds(view, part, button, MouseEvent::Click);
            }
        }
    }

    fn run_mousebinds(
        &mut self,
        view: Option<ViewId>,
        part: SsdPart,
        button: MouseButton,
        event: MouseEvent,
    ) {
        let lists: Vec<action::ActionList> = self
            .bindings
            .mouse(part, view.is_some(), button, event)
            .map(|b| b.actions.clone())
            .collect();
        if lists.is_empty() {
            return;
        }

        let edges = part.resize_edges().unwrap_or_else(|| {
            let (x, y) = self.state.pointer_position;
            view.and_then(|id| self.state.views.get(&id))
                .map(|v| ResizeEdges::from_point(x, y, v.geometry))
                .unwrap_or_default()
        });
        for list in &lists {
            self.dispatch(view, Some(list), edges);
        }
    }
}
