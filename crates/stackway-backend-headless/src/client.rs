//! Headless clients.
//!
//! Each client is a native handle handed to the core plus the shared state
//! behind it. The backend keeps the other half of the `Rc` so it can play
//! the client's side: acknowledge configures with commits, and go away
//! when asked to close.

use std::cell::RefCell;
use std::rc::Rc;

use stackway_core::shell::{ShellId, SurfaceId, XdgDecorationMode, XdgToplevel};
#[cfg(feature = "xwayland")]
use stackway_core::shell::{X11Decorations, XwaylandSurface};
#[cfg(feature = "xwayland")]
use stackway_core::state::Geometry;

/// Client side of an xdg toplevel.
#[derive(Debug, Default)]
pub struct ToplevelState {
    pub id: u64,
    /// Size of the latest committed window geometry.
    pub size: (i32, i32),
    pub title: Option<String>,
    pub app_id: Option<String>,
    pub fullscreen_requested: bool,
    pub server_side: bool,
    pub activated: bool,
    pub fullscreen: bool,
    pub maximized: bool,
    /// Size from a configure the client has not committed yet.
    pub pending_size: Option<(i32, i32)>,
    pub close_requested: bool,
}

#[derive(Debug)]
pub struct HeadlessToplevel(pub Rc<RefCell<ToplevelState>>);

impl XdgToplevel for HeadlessToplevel {
    fn id(&self) -> ShellId {
        ShellId(self.0.borrow().id)
    }

    fn surface(&self) -> SurfaceId {
        SurfaceId(self.0.borrow().id)
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
        if self.0.borrow().server_side {
            XdgDecorationMode::ServerSide
        } else {
            XdgDecorationMode::ClientSide
        }
    }

    fn set_size(&mut self, width: i32, height: i32) {
        self.0.borrow_mut().pending_size = Some((width, height));
    }

    fn send_close(&mut self) {
        self.0.borrow_mut().close_requested = true;
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

/// Client side of an X11 window.
#[cfg(feature = "xwayland")]
#[derive(Debug, Default)]
pub struct X11State {
    pub id: u64,
    pub geometry: Geometry,
    pub override_redirect: bool,
    pub fullscreen: bool,
    pub minimized: bool,
    pub maximized: bool,
    pub activated: bool,
    pub title: Option<String>,
    pub class: Option<String>,
    pub decorations: X11Decorations,
    pub wants_focus: bool,
    pub pings: u32,
    /// A configure arrived; the next commit carries its size.
    pub configured: bool,
    pub close_requested: bool,
}

#[cfg(feature = "xwayland")]
#[derive(Debug)]
pub struct HeadlessX11(pub Rc<RefCell<X11State>>);

#[cfg(feature = "xwayland")]
impl XwaylandSurface for HeadlessX11 {
    fn id(&self) -> ShellId {
        ShellId(self.0.borrow().id)
    }

    fn surface(&self) -> Option<SurfaceId> {
        Some(SurfaceId(self.0.borrow().id))
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
        state.geometry = geometry;
        state.configured = true;
    }

    fn close(&mut self) {
        self.0.borrow_mut().close_requested = true;
    }

    fn activate(&mut self, activated: bool) {
        self.0.borrow_mut().activated = activated;
    }

    fn set_minimized(&mut self, minimized: bool) {
        self.0.borrow_mut().minimized = minimized;
    }

    fn restack_above(&mut self) {}

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.0.borrow_mut().fullscreen = fullscreen;
    }

    fn set_maximized(&mut self, maximized: bool) {
        self.0.borrow_mut().maximized = maximized;
    }
}

/// Backend half of a client.
#[derive(Debug, Clone)]
pub enum Client {
    Toplevel(Rc<RefCell<ToplevelState>>),
    #[cfg(feature = "xwayland")]
    X11(Rc<RefCell<X11State>>),
}

impl Client {
    /// Acknowledge an outstanding configure: the size the next commit
    /// carries, if any.
    pub fn take_configure(&self) -> Option<(i32, i32)> {
        match self {
            Self::Toplevel(state) => {
                let mut state = state.borrow_mut();
                let size = state.pending_size.take()?;
                state.size = size;
                Some(size)
            }
            #[cfg(feature = "xwayland")]
            Self::X11(state) => {
                let mut state = state.borrow_mut();
                if !std::mem::take(&mut state.configured) {
                    return None;
                }
                Some((state.geometry.width, state.geometry.height))
            }
        }
    }

    /// Size of the client's current buffer.
    pub fn size(&self) -> (i32, i32) {
        match self {
            Self::Toplevel(state) => state.borrow().size,
            #[cfg(feature = "xwayland")]
            Self::X11(state) => {
                let geometry = state.borrow().geometry;
                (geometry.width, geometry.height)
            }
        }
    }

    pub fn take_close_request(&self) -> bool {
        match self {
            Self::Toplevel(state) => std::mem::take(&mut state.borrow_mut().close_requested),
            #[cfg(feature = "xwayland")]
            Self::X11(state) => std::mem::take(&mut state.borrow_mut().close_requested),
        }
    }

    pub fn set_title(&self, title: String) {
        match self {
            Self::Toplevel(state) => state.borrow_mut().title = Some(title),
            #[cfg(feature = "xwayland")]
            Self::X11(state) => state.borrow_mut().title = Some(title),
        }
    }

    /// Client-side half of a fullscreen request.
    pub fn request_fullscreen(&self, fullscreen: bool) {
        match self {
            Self::Toplevel(state) => state.borrow_mut().fullscreen_requested = fullscreen,
            #[cfg(feature = "xwayland")]
            Self::X11(state) => state.borrow_mut().fullscreen = fullscreen,
        }
    }

    /// X11 clients flag themselves; xdg clients only send the request.
    #[cfg_attr(not(feature = "xwayland"), allow(unused_variables))]
    pub fn request_minimize(&self, minimized: bool) {
        match self {
            Self::Toplevel(_) => {}
            #[cfg(feature = "xwayland")]
            Self::X11(state) => state.borrow_mut().minimized = minimized,
        }
    }

    #[cfg(feature = "xwayland")]
    pub fn set_override_redirect(&self, override_redirect: bool) {
        if let Self::X11(state) = self {
            state.borrow_mut().override_redirect = override_redirect;
        }
    }

    pub fn is_activated(&self) -> bool {
        match self {
            Self::Toplevel(state) => state.borrow().activated,
            #[cfg(feature = "xwayland")]
            Self::X11(state) => state.borrow().activated,
        }
    }
}
