//! View record.
//!
//! One [`View`] per managed client window, whatever protocol it speaks.
//! The record owns its scene subtree, its subscriptions and, through the
//! capability table, the native surface handle.

use bitflags::bitflags;

use crate::reconcile::PendingMoveResize;
use crate::scene::NodeId;
use crate::shell::{SurfaceId, ViewImpl};
use crate::signal::Subscription;
use crate::ssd::Decoration;
use crate::state::{Border, Geometry};
use crate::workspace::WorkspaceId;

/// Stable arena handle of a view. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view:{}", self.0)
    }
}

/// Foreign-toplevel handle exposing a view to panels and docks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToplevelHandle(pub u64);

bitflags! {
    /// View state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ViewFlags: u32 {
        const MAPPED        = 0b0000_0001;
        /// Set after the first map completed; first-map placement ran.
        const BEEN_MAPPED   = 0b0000_0010;
        const FULLSCREEN    = 0b0000_0100;
        const MAXIMIZED     = 0b0000_1000;
        const MINIMIZED     = 0b0001_0000;
        const ALWAYS_ON_TOP = 0b0010_0000;
        const ACTIVATED     = 0b0100_0000;
    }
}

/// A managed window.
#[derive(Debug)]
pub struct View {
    pub id: ViewId,
    /// Client area in layout coordinates, decorations excluded.
    pub geometry: Geometry,
    /// Geometry to restore when leaving maximized or fullscreen state.
    pub natural_geometry: Option<Geometry>,
    pub flags: ViewFlags,
    pub ssd: Decoration,
    /// Workspace the view is positioned in (non-owning).
    pub workspace: WorkspaceId,
    /// Output the view was assigned to on first map.
    pub output: Option<u64>,
    /// Scene subtree; lives as long as the view.
    pub tree: NodeId,
    /// Surface tree under `tree` displaying the client buffer.
    pub content: Option<NodeId>,
    /// Backing `wl_surface`, `None` until first map.
    pub surface: Option<SurfaceId>,
    pub toplevel_handle: Option<ToplevelHandle>,
    pub pending: PendingMoveResize,
    pub title: String,
    pub app_id: String,
    pub(crate) shell: Box<dyn ViewImpl>,
    pub(crate) listeners: Vec<Subscription>,
    pub(crate) commit: Option<Subscription>,
}

impl View {
    pub(crate) fn new(
        id: ViewId,
        shell: Box<dyn ViewImpl>,
        workspace: WorkspaceId,
        tree: NodeId,
    ) -> Self {
        Self {
            id,
            geometry: Geometry::default(),
            natural_geometry: None,
            flags: ViewFlags::empty(),
            ssd: Decoration::default(),
            workspace,
            output: None,
            tree,
            content: None,
            surface: None,
            toplevel_handle: None,
            pending: PendingMoveResize::default(),
            title: String::new(),
            app_id: String::new(),
            shell,
            listeners: Vec::new(),
            commit: None,
        }
    }

    pub const fn is_mapped(&self) -> bool {
        self.flags.contains(ViewFlags::MAPPED)
    }

    pub const fn is_fullscreen(&self) -> bool {
        self.flags.contains(ViewFlags::FULLSCREEN)
    }

    pub const fn is_maximized(&self) -> bool {
        self.flags.contains(ViewFlags::MAXIMIZED)
    }

    pub const fn is_minimized(&self) -> bool {
        self.flags.contains(ViewFlags::MINIMIZED)
    }

    pub const fn is_always_on_top(&self) -> bool {
        self.flags.contains(ViewFlags::ALWAYS_ON_TOP)
    }

    /// Mapped and not minimized.
    pub const fn is_shown(&self) -> bool {
        self.is_mapped() && !self.is_minimized()
    }

    /// Neither maximized nor fullscreen.
    pub const fn is_floating(&self) -> bool {
        !self.is_maximized() && !self.is_fullscreen()
    }

    /// Margin currently in effect; decorations are hidden while fullscreen.
    pub const fn margin(&self) -> Border {
        if self.ssd.enabled && !self.is_fullscreen() {
            self.ssd.margin
        } else {
            Border::ZERO
        }
    }

    /// Client area plus decoration margin.
    pub const fn outer_geometry(&self) -> Geometry {
        self.geometry.expand(self.margin())
    }

    pub fn kind(&self) -> crate::shell::ViewKind {
        self.shell.kind()
    }

    /// String property through the capability table.
    pub fn string_property(&self, name: &str) -> String {
        self.shell.string_property(name)
    }

    /// Whether the view holds a commit subscription.
    pub const fn listens_for_commits(&self) -> bool {
        self.commit.is_some()
    }

    /// Number of live shell-level subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.listeners.len() + usize::from(self.commit.is_some())
    }
}
