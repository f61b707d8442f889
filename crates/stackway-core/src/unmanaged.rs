//! Override-redirect surfaces.
//!
//! Menus, tooltips and drag icons of X11 clients position themselves and
//! are never targeted by actions. The core only places them in the
//! unmanaged layer and follows their commits.

use tracing::{debug, error, info, warn};

use crate::event::{CoreAction, ShellEvent};
use crate::scene::NodeId;
use crate::shell::{ShellId, SurfaceId, XwaylandSurface, XwaylandView};
use crate::signal::{EventKind, EventSource, Listener, Subscription};
use crate::state::Geometry;
use crate::view::ViewId;
use crate::Core;

/// Arena handle of an unmanaged surface. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnmanagedId(pub u64);

impl std::fmt::Display for UnmanagedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unmanaged:{}", self.0)
    }
}

const EVENTS: &[EventKind] = &[
    EventKind::Map,
    EventKind::Unmap,
    EventKind::Destroy,
    EventKind::RequestConfigure,
    EventKind::SetOverrideRedirect,
];

#[derive(Debug)]
pub struct Unmanaged {
    pub id: UnmanagedId,
    /// Surface tree in the unmanaged layer, present while mapped.
    pub node: Option<NodeId>,
    pub mapped: bool,
    pub(crate) surface: Box<dyn XwaylandSurface>,
    pub(crate) listeners: Vec<Subscription>,
    pub(crate) commit: Option<Subscription>,
}

impl Unmanaged {
    pub fn shell_id(&self) -> ShellId {
        self.surface.id()
    }

    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface.surface()
    }

    pub fn geometry(&self) -> Geometry {
        self.surface.geometry()
    }

    pub const fn listens_for_commits(&self) -> bool {
        self.commit.is_some()
    }
}

impl Core {
    pub(crate) fn create_unmanaged(&mut self, surface: Box<dyn XwaylandSurface>) -> UnmanagedId {
        let id = self.state.alloc_unmanaged_id();
        let shell = surface.id();
        let source = EventSource::Shell(shell);
        let listeners = EVENTS
            .iter()
            .map(|&kind| self.signals.subscribe(source, kind, Listener::Unmanaged(id)))
            .collect();

        debug!("New {} for {}", id, shell);
        self.state.unmanaged.insert(
            id,
            Unmanaged {
                id,
                node: None,
                mapped: false,
                surface,
                listeners,
                commit: None,
            },
        );
        id
    }

    pub(crate) fn map_unmanaged(&mut self, id: UnmanagedId) {
        let layer = self.state.layers.unmanaged;
        let Some(unmanaged) = self.state.unmanaged.get_mut(&id) else {
            return;
        };
        if unmanaged.mapped {
            return;
        }
        let Some(surface) = unmanaged.surface.surface() else {
            warn!("{} mapped without a surface", id);
            return;
        };

        let geometry = unmanaged.surface.geometry();
        let Some(node) = self.scene.create_surface_tree(layer, surface) else {
            error!("Failed to create surface tree for {}", id);
            self.emit(CoreAction::PostNoMemory { surface });
            return;
        };
        self.scene.set_position(node, geometry.x, geometry.y);
        unmanaged.node = Some(node);
        unmanaged.mapped = true;
        unmanaged.commit = Some(self.signals.subscribe(
            EventSource::Surface(surface),
            EventKind::Commit,
            Listener::Unmanaged(id),
        ));

        if unmanaged.surface.wants_focus() {
            self.state.focus.focused_unmanaged = Some(id);
            self.emit(CoreAction::KeyboardFocus {
                surface: Some(surface),
            });
        }
    }

    pub(crate) fn unmap_unmanaged(&mut self, id: UnmanagedId) {
        let Some(unmanaged) = self.state.unmanaged.get_mut(&id) else {
            return;
        };
        if !unmanaged.mapped {
            return;
        }
        unmanaged.mapped = false;
        unmanaged.commit = None;
        if let Some(node) = unmanaged.node.take() {
            self.scene.destroy(node);
        }

        if self.state.focus.focused_unmanaged != Some(id) {
            return;
        }
        self.state.focus.focused_unmanaged = None;
        let surface = self
            .state
            .focus
            .focused_view
            .and_then(|v| self.state.views.get(&v))
            .map(|v| v.surface);
        match surface {
            Some(surface) => self.emit(CoreAction::KeyboardFocus { surface }),
            None => self.focus_topmost_mapped_view(),
        }
    }

    fn destroy_unmanaged(&mut self, id: UnmanagedId) -> Option<Unmanaged> {
        self.unmap_unmanaged(id);
        let record = self.state.unmanaged.shift_remove(&id)?;
        debug!("Destroyed {}", id);
        Some(record)
    }

    pub(crate) fn commit_unmanaged(&mut self, id: UnmanagedId) {
        let Some(unmanaged) = self.state.unmanaged.get(&id) else {
            return;
        };
        if let Some(node) = unmanaged.node {
            let geometry = unmanaged.surface.geometry();
            self.scene.set_position(node, geometry.x, geometry.y);
        }
    }

    /// Promote a surface that dropped override-redirect to a managed view.
    pub fn promote_unmanaged(&mut self, id: UnmanagedId) -> Option<ViewId> {
        let unmanaged = self.state.unmanaged.get(&id)?;
        if unmanaged.surface.override_redirect() {
            return None;
        }
        let was_mapped = unmanaged.mapped;

        let Unmanaged {
            surface,
            listeners,
            commit,
            ..
        } = self.destroy_unmanaged(id)?;
        drop(listeners);
        drop(commit);

        let view = self.create_view(Box::new(XwaylandView::new(surface)));
        if was_mapped {
            self.map_view(view);
        }
        info!("{} is now {}", id, view);
        Some(view)
    }

    pub(crate) fn on_unmanaged_event(&mut self, id: UnmanagedId, event: ShellEvent) {
        match event {
            ShellEvent::Map => self.map_unmanaged(id),
            ShellEvent::Unmap => self.unmap_unmanaged(id),
            ShellEvent::Destroy => {
                self.destroy_unmanaged(id);
            }
            ShellEvent::RequestConfigure(geometry) => {
                let Some(unmanaged) = self.state.unmanaged.get_mut(&id) else {
                    return;
                };
                unmanaged.surface.configure(geometry);
                if let Some(node) = unmanaged.node {
                    self.scene.set_position(node, geometry.x, geometry.y);
                }
            }
            ShellEvent::SetOverrideRedirect => {
                self.promote_unmanaged(id);
            }
            other => debug!("{} ignores {:?}", id, other.kind()),
        }
    }
}
