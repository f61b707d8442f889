//! Managed-protocol (xdg-shell) surface variant.

use super::{ConfigureAck, MapState, ShellId, SurfaceId, ViewImpl, ViewKind};
use crate::signal::EventKind;
use crate::state::Geometry;

/// Decoration mode negotiated through xdg-decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XdgDecorationMode {
    ClientSide,
    #[default]
    ServerSide,
}

/// Native handle to an xdg toplevel, implemented by the backend.
pub trait XdgToplevel: std::fmt::Debug {
    fn id(&self) -> ShellId;
    fn surface(&self) -> SurfaceId;
    /// Size of the latest committed window geometry.
    fn size(&self) -> (i32, i32);
    fn title(&self) -> Option<String>;
    fn app_id(&self) -> Option<String>;
    fn requests_fullscreen(&self) -> bool;
    fn decoration_mode(&self) -> XdgDecorationMode;

    fn set_size(&mut self, width: i32, height: i32);
    fn send_close(&mut self);
    fn set_activated(&mut self, activated: bool);
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
];

/// Managed xdg-shell toplevel.
#[derive(Debug)]
pub struct XdgView {
    toplevel: Box<dyn XdgToplevel>,
}

impl XdgView {
    pub fn new(toplevel: Box<dyn XdgToplevel>) -> Self {
        Self { toplevel }
    }
}

impl ViewImpl for XdgView {
    fn kind(&self) -> ViewKind {
        ViewKind::Xdg
    }

    fn shell_id(&self) -> ShellId {
        self.toplevel.id()
    }

    fn events(&self) -> &'static [EventKind] {
        EVENTS
    }

    fn configure(&mut self, geometry: Geometry) -> ConfigureAck {
        if self.toplevel.size() == (geometry.width, geometry.height) {
            return ConfigureAck::Immediate;
        }
        self.toplevel.set_size(geometry.width, geometry.height);
        ConfigureAck::Deferred
    }

    fn move_to(&mut self, _x: i32, _y: i32, _width: i32, _height: i32) {
        // Position is compositor-side only.
    }

    fn grant_configure(&mut self, geometry: Geometry) {
        self.toplevel.set_size(geometry.width, geometry.height);
    }

    fn close(&mut self) {
        self.toplevel.send_close();
    }

    fn map(&mut self) -> MapState {
        MapState {
            surface: Some(self.toplevel.surface()),
            position: None,
            size: self.toplevel.size(),
            fullscreen: self.toplevel.requests_fullscreen(),
            decorations: self.wants_decorations(),
            boundary_check: false,
        }
    }

    fn set_activated(&mut self, activated: bool) {
        self.toplevel.set_activated(activated);
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.toplevel.set_fullscreen(fullscreen);
    }

    fn maximize(&mut self, maximized: bool) {
        self.toplevel.set_maximized(maximized);
    }

    fn string_property(&self, name: &str) -> String {
        match name {
            "title" => self.toplevel.title(),
            "app_id" | "class" => self.toplevel.app_id(),
            _ => None,
        }
        .unwrap_or_default()
    }

    fn wants_decorations(&self) -> bool {
        self.toplevel.decoration_mode() == XdgDecorationMode::ServerSide
    }
}
