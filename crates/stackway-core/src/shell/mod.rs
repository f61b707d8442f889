//! View capability table.
//!
//! [`ViewImpl`] is the fixed operation set every surface variant provides.
//! Shared window-management code only talks to clients through it; each
//! variant translates the calls into its own native protocol requests.

pub mod xdg;
pub mod xwayland;

pub use xdg::{XdgDecorationMode, XdgToplevel, XdgView};
pub use xwayland::{X11Decorations, XwaylandSurface, XwaylandView};

use crate::signal::EventKind;
use crate::state::Geometry;

/// Backend identifier of a `wl_surface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface:{}", self.0)
    }
}

/// Backend identifier of a shell object (xdg toplevel, xwayland surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShellId(pub u64);

impl std::fmt::Display for ShellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shell:{}", self.0)
    }
}

/// Surface variant behind a view. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Xdg,
    Xwayland,
}

/// Whether the client will acknowledge a configure with a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureAck {
    /// A commit carrying the new size will follow.
    Deferred,
    /// Nothing to wait for; apply the requested position right away.
    Immediate,
}

/// Client-side state reported by a variant when its surface maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapState {
    /// Surface backing the view at this map.
    pub surface: Option<SurfaceId>,
    /// Position the client asked for, if the variant positions itself.
    pub position: Option<(i32, i32)>,
    /// Size of the client's window geometry.
    pub size: (i32, i32),
    /// The client already requested fullscreen.
    pub fullscreen: bool,
    /// The client's decoration hint asks for server-side decorations.
    pub decorations: bool,
    /// Keep decorations from being placed off the top-left edge.
    pub boundary_check: bool,
}

/// Native operations of one surface variant.
pub trait ViewImpl: std::fmt::Debug {
    fn kind(&self) -> ViewKind;

    /// Shell object this view receives notifications from.
    fn shell_id(&self) -> ShellId;

    /// Notification kinds this variant emits on its shell object.
    fn events(&self) -> &'static [EventKind];

    /// Ask the client to take the given geometry.
    fn configure(&mut self, geometry: Geometry) -> ConfigureAck;

    /// Reposition without resizing.
    fn move_to(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Grant a geometry the client asked for itself. Nothing is pending
    /// afterwards; the client just gets what it requested.
    fn grant_configure(&mut self, _geometry: Geometry) {}

    fn close(&mut self);

    /// Surface is about to be shown; report the client's current wishes.
    fn map(&mut self) -> MapState;

    fn unmap(&mut self) {}

    fn set_activated(&mut self, activated: bool);
    fn set_fullscreen(&mut self, fullscreen: bool);
    fn maximize(&mut self, maximized: bool);

    /// String property by name (`title`, `class`, `app_id`); empty if unknown.
    fn string_property(&self, name: &str) -> String;

    /// Current decoration hint of the client.
    fn wants_decorations(&self) -> bool;

    /// Whether an unmap notification also ends the view's presence in
    /// the foreign-toplevel list.
    fn retires_toplevel_on_unmap(&self) -> bool {
        false
    }

    /// Whether the view can be demoted to an unmanaged surface.
    fn can_demote(&self) -> bool {
        false
    }

    /// Recover the native surface when the view is demoted to an
    /// unmanaged surface. Only compatibility surfaces can be demoted.
    fn into_xwayland_surface(self: Box<Self>) -> Option<Box<dyn XwaylandSurface>> {
        None
    }
}
