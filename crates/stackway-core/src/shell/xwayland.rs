//! Compatibility (XWayland) surface variant.

use super::{ConfigureAck, MapState, ShellId, SurfaceId, ViewImpl, ViewKind};
use crate::signal::EventKind;
use crate::state::Geometry;

/// `_MOTIF_WM_HINTS` decoration request of an X11 client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum X11Decorations {
    #[default]
    All,
    NoTitle,
    NoBorder,
}

/// Native handle to an XWayland surface, implemented by the backend.
///
/// Getters report the client's latest requested state; the backend
/// updates it before emitting the matching notification.
pub trait XwaylandSurface: std::fmt::Debug {
    fn id(&self) -> ShellId;
    /// Backing `wl_surface`; only present while associated.
    fn surface(&self) -> Option<SurfaceId>;
    fn geometry(&self) -> Geometry;
    fn override_redirect(&self) -> bool;
    fn fullscreen(&self) -> bool;
    fn minimized(&self) -> bool;
    fn title(&self) -> Option<String>;
    fn class(&self) -> Option<String>;
    fn decorations(&self) -> X11Decorations;
    /// Override-redirect surface that expects keyboard input (menus with
    /// search fields, input method popups).
    fn wants_focus(&self) -> bool;

    fn ping(&mut self);
    fn configure(&mut self, geometry: Geometry);
    fn close(&mut self);
    fn activate(&mut self, activated: bool);
    fn set_minimized(&mut self, minimized: bool);
    fn restack_above(&mut self);
    fn set_fullscreen(&mut self, fullscreen: bool);
    fn set_maximized(&mut self, maximized: bool);
}

const EVENTS: &[EventKind] = &[
    EventKind::Map,
    EventKind::Unmap,
    EventKind::Destroy,
    EventKind::RequestConfigure,
    EventKind::RequestActivate,
    EventKind::RequestMinimize,
    EventKind::RequestMaximize,
    EventKind::RequestFullscreen,
    EventKind::RequestMove,
    EventKind::RequestResize,
    EventKind::SetTitle,
    EventKind::SetClass,
    EventKind::SetDecorations,
    EventKind::SetOverrideRedirect,
];

/// Managed XWayland window.
#[derive(Debug)]
pub struct XwaylandView {
    surface: Box<dyn XwaylandSurface>,
}

impl XwaylandView {
    pub fn new(surface: Box<dyn XwaylandSurface>) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &dyn XwaylandSurface {
        self.surface.as_ref()
    }
}

impl ViewImpl for XwaylandView {
    fn kind(&self) -> ViewKind {
        ViewKind::Xwayland
    }

    fn shell_id(&self) -> ShellId {
        self.surface.id()
    }

    fn events(&self) -> &'static [EventKind] {
        EVENTS
    }

    fn configure(&mut self, geometry: Geometry) -> ConfigureAck {
        self.surface.configure(geometry);
        ConfigureAck::Deferred
    }

    fn move_to(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.surface.configure(Geometry::new(x, y, width, height));
    }

    fn grant_configure(&mut self, geometry: Geometry) {
        self.surface.configure(geometry);
    }

    fn close(&mut self) {
        self.surface.close();
    }

    fn map(&mut self) -> MapState {
        let geo = self.surface.geometry();
        MapState {
            surface: self.surface.surface(),
            position: Some((geo.x, geo.y)),
            size: (geo.width, geo.height),
            fullscreen: self.surface.fullscreen(),
            decorations: self.wants_decorations(),
            boundary_check: true,
        }
    }

    fn set_activated(&mut self, activated: bool) {
        if activated && self.surface.minimized() {
            self.surface.set_minimized(false);
        }
        self.surface.activate(activated);
        if activated {
            self.surface.restack_above();
        }
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.surface.set_fullscreen(fullscreen);
    }

    fn maximize(&mut self, maximized: bool) {
        self.surface.set_maximized(maximized);
    }

    fn string_property(&self, name: &str) -> String {
        match name {
            "title" => self.surface.title(),
            // X11 has no app id; the class stands in for it.
            "class" | "app_id" => self.surface.class(),
            _ => None,
        }
        .unwrap_or_default()
    }

    fn wants_decorations(&self) -> bool {
        self.surface.decorations() == X11Decorations::All
    }

    fn retires_toplevel_on_unmap(&self) -> bool {
        // Closed transient dialogs are often unmapped and never destroyed.
        true
    }

    fn can_demote(&self) -> bool {
        true
    }

    fn into_xwayland_surface(self: Box<Self>) -> Option<Box<dyn XwaylandSurface>> {
        Some(self.surface)
    }
}
