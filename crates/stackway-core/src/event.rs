//! Protocol-agnostic events and actions.
//!
//! [`CoreEvent`] represents what the backend tells core.
//! [`CoreAction`] represents what core tells the backend to do.

use crate::input::KeyCombo;
use crate::shell::{ShellId, SurfaceId, XdgToplevel, XwaylandSurface};
use crate::signal::EventKind;
use crate::state::{Geometry, GrabOperation, ResizeEdges};
use crate::view::{ToplevelHandle, ViewId};
use crate::workspace::WorkspaceId;

/// Events that a backend sends to the core engine.
#[derive(Debug)]
pub enum CoreEvent {
    /// A new XWayland surface exists. Not yet mapped.
    NewXwaylandSurface(Box<dyn XwaylandSurface>),

    /// A new xdg toplevel exists. Not yet mapped.
    NewXdgToplevel(Box<dyn XdgToplevel>),

    /// Notification emitted by a shell object.
    ///
    /// The native handle already reflects the new state (title, flags)
    /// when this is delivered.
    Shell { id: ShellId, event: ShellEvent },

    /// A surface committed a buffer with the given window geometry size.
    Commit {
        surface: SurfaceId,
        width: i32,
        height: i32,
    },

    /// A new output (monitor) was connected.
    OutputAdded {
        id: u64,
        name: String,
        geometry: Geometry,
        /// Area left after exclusive zones; the full geometry when `None`.
        usable_area: Option<Geometry>,
    },

    /// An output was disconnected.
    OutputRemoved { id: u64 },

    /// Pointer moved to absolute position.
    PointerMotion { x: f64, y: f64 },

    /// Pointer button press/release. `button` uses Linux event codes.
    PointerButton { button: u32, pressed: bool },

    /// A key combination was pressed.
    Key { combo: KeyCombo },
}

/// Notifications of a shell object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEvent {
    Map,
    Unmap,
    Destroy,
    /// The client asks for a new geometry.
    RequestConfigure(Geometry),
    RequestActivate,
    RequestMinimize(bool),
    RequestMaximize,
    RequestFullscreen(bool),
    RequestMove,
    RequestResize(ResizeEdges),
    SetTitle,
    SetClass,
    SetDecorations,
    /// The override-redirect flag flipped; read the new value natively.
    SetOverrideRedirect,
}

impl ShellEvent {
    pub const fn kind(self) -> EventKind {
        match self {
            Self::Map => EventKind::Map,
            Self::Unmap => EventKind::Unmap,
            Self::Destroy => EventKind::Destroy,
            Self::RequestConfigure(_) => EventKind::RequestConfigure,
            Self::RequestActivate => EventKind::RequestActivate,
            Self::RequestMinimize(_) => EventKind::RequestMinimize,
            Self::RequestMaximize => EventKind::RequestMaximize,
            Self::RequestFullscreen(_) => EventKind::RequestFullscreen,
            Self::RequestMove => EventKind::RequestMove,
            Self::RequestResize(_) => EventKind::RequestResize,
            Self::SetTitle => EventKind::SetTitle,
            Self::SetClass => EventKind::SetClass,
            Self::SetDecorations => EventKind::SetDecorations,
            Self::SetOverrideRedirect => EventKind::SetOverrideRedirect,
        }
    }
}

/// Actions that core returns to the backend for execution.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreAction {
    /// Give keyboard focus to a surface (or clear focus if `None`).
    KeyboardFocus { surface: Option<SurfaceId> },

    /// Start an interactive move or resize.
    BeginInteractive {
        view: ViewId,
        mode: GrabOperation,
        edges: ResizeEdges,
    },

    /// Show a menu at layout coordinates.
    OpenMenu { menu: String, x: i32, y: i32 },

    /// Window cycling moved; refresh the switcher display.
    UpdateOsd { view: Option<ViewId> },

    /// The current workspace changed.
    WorkspaceChanged { active: WorkspaceId },

    /// The backend should spawn a detached child process.
    SpawnProcess { command: String },

    /// The backend should re-read configuration and hand it back.
    ReloadConfig,

    /// The compositor should exit.
    Exit,

    /// Dump the scene graph for debugging.
    DumpScene,

    /// Tell the client owning `surface` that the compositor ran out of memory.
    PostNoMemory { surface: SurfaceId },

    /// A view became visible to foreign-toplevel consumers.
    ToplevelCreated { handle: ToplevelHandle, view: ViewId },

    ToplevelTitle {
        handle: ToplevelHandle,
        title: String,
    },

    ToplevelAppId {
        handle: ToplevelHandle,
        app_id: String,
    },

    /// The handle is gone; consumers must drop it.
    ToplevelDestroyed { handle: ToplevelHandle },
}
