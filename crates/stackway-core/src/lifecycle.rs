//! View lifecycle: creation, map, commit, unmap, destroy and demotion.
//!
//! Every transition is driven by a shell notification routed through the
//! subscription registry. A view only hears commits while it is mapped.

use tracing::{debug, error, info};

use crate::event::{CoreAction, ShellEvent};
use crate::shell::{ViewImpl, XdgToplevel, XdgView, XwaylandSurface, XwaylandView};
use crate::signal::{EventKind, EventSource, Listener};
use crate::ssd;
use crate::state::{Border, Geometry, GrabOperation, ResizeEdges};
use crate::unmanaged::UnmanagedId;
use crate::view::{View, ViewFlags, ViewId};
use crate::Core;

/// Smallest size granted to a client asking for its own geometry.
pub const MIN_VIEW_WIDTH: i32 = 100;
pub const MIN_VIEW_HEIGHT: i32 = 60;

impl Core {
    pub(crate) fn new_xwayland_surface(&mut self, mut surface: Box<dyn XwaylandSurface>) {
        surface.ping();
        if surface.override_redirect() {
            self.create_unmanaged(surface);
            return;
        }
        self.create_view(Box::new(XwaylandView::new(surface)));
    }

    pub(crate) fn new_xdg_toplevel(&mut self, toplevel: Box<dyn XdgToplevel>) {
        self.create_view(Box::new(XdgView::new(toplevel)));
    }

    /// Create an unmapped view on the current workspace.
    pub(crate) fn create_view(&mut self, shell: Box<dyn ViewImpl>) -> ViewId {
        let id = self.state.alloc_view_id();
        let workspace = self.state.workspaces.current();
        let (workspace, parent) = (workspace.id, workspace.tree);

        let tree = self.scene.create_tree(parent);
        self.scene.set_enabled(tree, false);

        let source = EventSource::Shell(shell.shell_id());
        let listeners = shell
            .events()
            .iter()
            .map(|&kind| self.signals.subscribe(source, kind, Listener::View(id)))
            .collect();

        let mut view = View::new(id, shell, workspace, tree);
        view.listeners = listeners;
        view.title = view.shell.string_property("title");
        view.app_id = view.shell.string_property("app_id");
        info!("New {:?} view {} on {}", view.kind(), id, workspace);

        self.state.insert_view(view);
        id
    }

    /// Show a view. Mapping an already mapped view does nothing.
    pub fn map_view(&mut self, id: ViewId) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        if view.is_mapped() {
            return;
        }
        view.flags.insert(ViewFlags::MAPPED);
        self.scene.set_enabled(view.tree, !view.is_minimized());

        let map = view.shell.map();
        if view.is_floating() {
            if let Some((x, y)) = map.position {
                view.geometry.x = x;
                view.geometry.y = y;
            }
            (view.geometry.width, view.geometry.height) = map.size;
        }

        let tree = view.tree;
        if map.surface != view.surface {
            if let Some(content) = view.content.take() {
                self.scene.destroy(content);
            }
            view.surface = None;
            if let Some(surface) = map.surface {
                let Some(content) = self.scene.create_surface_tree(tree, surface) else {
                    error!("Failed to create surface tree for {}", id);
                    view.flags.remove(ViewFlags::MAPPED);
                    self.scene.set_enabled(tree, false);
                    self.emit(CoreAction::PostNoMemory { surface });
                    return;
                };
                view.content = Some(content);
                view.surface = Some(surface);
            }
        }

        if map.fullscreen && !view.is_fullscreen() {
            self.set_fullscreen(id, true);
        }

        let first_map = self
            .state
            .views
            .get(&id)
            .is_some_and(|v| !v.flags.contains(ViewFlags::BEEN_MAPPED));
        if first_map {
            self.place_first_map(id, map.decorations);
        }

        let theme = &self.state.config.theme;
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        if map.boundary_check && view.ssd.enabled && view.is_floating() {
            let extents = ssd::max_extents(view.geometry, view.margin(), theme);
            view.geometry.x -= extents.x.min(0);
            view.geometry.y -= extents.y.min(0);
            // Configured whether or not it shifted.
            let geometry = view.geometry;
            self.configure_view(id, geometry);
        }

        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        self.scene.set_position(tree, view.geometry.x, view.geometry.y);
        if let Some(surface) = view.surface {
            view.commit = Some(self.signals.subscribe(
                EventSource::Surface(surface),
                EventKind::Commit,
                Listener::View(id),
            ));
        }

        if view.toplevel_handle.is_none() {
            let handle = self.state.alloc_toplevel_handle();
            if let Some(view) = self.state.views.get_mut(&id) {
                view.toplevel_handle = Some(handle);
            }
            self.emit(CoreAction::ToplevelCreated { handle, view: id });
        }

        info!("Mapped {}", id);
        self.focus_and_activate(id);
        self.move_to_front(id);
        self.update_title(id);
        self.update_app_id(id);
    }

    /// Decorations, placement and output assignment, run once per view.
    fn place_first_map(&mut self, id: ViewId, decorations: bool) {
        let thickness = ssd::thickness(&self.state.config.theme);
        let area = self.state.usable_area_at_pointer();
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        view.ssd.enabled = decorations;
        view.ssd.margin = if decorations { thickness } else { Border::ZERO };
        view.flags.insert(ViewFlags::BEEN_MAPPED);

        if view.is_floating() {
            view.geometry.x = area.x;
            view.geometry.y = area.y;
            self.center_view(id);
        }
        self.discover_output(id);
        // Decorations depend on the output the view landed on.
        self.refresh_decorations(id);
    }

    /// Absorb a commit of the view's surface.
    pub(crate) fn commit_view(&mut self, id: ViewId, width: i32, height: i32) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        let Some(out) = view.pending.reconcile(view.geometry, width, height) else {
            return;
        };
        view.geometry = out.geometry;
        if out.moved {
            self.scene.set_position(view.tree, out.geometry.x, out.geometry.y);
        }
        if out.converged {
            debug!("{} settled at {:?}", id, out.geometry);
        }
    }

    /// Hide a view. Unmapping an unmapped view does nothing.
    pub fn unmap_view(&mut self, id: ViewId) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        if !view.is_mapped() {
            return;
        }
        view.flags.remove(ViewFlags::MAPPED);
        view.commit = None;
        view.shell.unmap();
        self.scene.set_enabled(view.tree, false);
        info!("Unmapped {}", id);
        self.focus_topmost_mapped_view();
    }

    /// Drop the foreign-toplevel handle of `id`, if it has one.
    fn retire_toplevel(&mut self, id: ViewId) {
        let handle = self
            .state
            .views
            .get_mut(&id)
            .and_then(|v| v.toplevel_handle.take());
        if let Some(handle) = handle {
            self.emit(CoreAction::ToplevelDestroyed { handle });
        }
    }

    /// Release a view and everything it owns. Returns the dead record.
    pub(crate) fn destroy_view(&mut self, id: ViewId) -> Option<View> {
        self.retire_toplevel(id);
        let was_focused = self.state.focus.focused_view == Some(id);
        let view = self.state.remove_view(id)?;
        self.scene.destroy(view.tree);
        info!("Destroyed {}", id);
        if was_focused {
            self.focus_topmost_mapped_view();
        }
        Some(view)
    }

    /// Demote a view whose surface became override-redirect.
    ///
    /// The view is gone afterwards; the returned handle replaces it. Views
    /// that cannot be demoted are left untouched and `None` is returned.
    pub fn reclassify_view(&mut self, id: ViewId) -> Option<UnmanagedId> {
        let view = self.state.views.get(&id)?;
        if !view.shell.can_demote() {
            debug!("{} cannot become unmanaged", id);
            return None;
        }
        let was_mapped = view.is_mapped();
        if was_mapped {
            self.on_view_event(id, ShellEvent::Unmap);
        }

        let View {
            shell,
            listeners,
            commit,
            ..
        } = self.destroy_view(id)?;
        // The surface is about to be re-registered under a new listener.
        drop(listeners);
        drop(commit);

        let Some(surface) = shell.into_xwayland_surface() else {
            error!("{} cannot become unmanaged", id);
            return None;
        };
        let unmanaged = self.create_unmanaged(surface);
        if was_mapped {
            self.map_unmanaged(unmanaged);
        }
        info!("{} is now {}", id, unmanaged);
        Some(unmanaged)
    }

    fn update_title(&mut self, id: ViewId) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        view.title = view.shell.string_property("title");
        if let Some(handle) = view.toplevel_handle {
            let title = view.title.clone();
            self.emit(CoreAction::ToplevelTitle { handle, title });
        }
    }

    fn update_app_id(&mut self, id: ViewId) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        view.app_id = view.shell.string_property("app_id");
        if let Some(handle) = view.toplevel_handle {
            let app_id = view.app_id.clone();
            self.emit(CoreAction::ToplevelAppId { handle, app_id });
        }
    }

    /// Give the client the geometry it asked for, within the minimum size.
    fn grant_configure(&mut self, id: ViewId, requested: Geometry) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        let geometry = Geometry::new(
            requested.x,
            requested.y,
            requested.width.max(MIN_VIEW_WIDTH),
            requested.height.max(MIN_VIEW_HEIGHT),
        );
        view.shell.grant_configure(geometry);
    }

    pub(crate) fn begin_interactive(&mut self, id: ViewId, mode: GrabOperation, edges: ResizeEdges) {
        if !self.state.views.get(&id).is_some_and(View::is_mapped) {
            return;
        }
        self.emit(CoreAction::BeginInteractive {
            view: id,
            mode,
            edges,
        });
    }

    pub(crate) fn on_view_event(&mut self, id: ViewId, event: ShellEvent) {
        debug!("{} {:?}", id, event);
        match event {
            ShellEvent::Map => self.map_view(id),
            ShellEvent::Unmap => {
                self.unmap_view(id);
                let retires = self
                    .state
                    .views
                    .get(&id)
                    .is_some_and(|v| v.shell.retires_toplevel_on_unmap());
                if retires {
                    self.retire_toplevel(id);
                }
            }
            ShellEvent::Destroy => {
                self.destroy_view(id);
            }
            ShellEvent::SetOverrideRedirect => {
                self.reclassify_view(id);
            }
            ShellEvent::RequestConfigure(geometry) => self.grant_configure(id, geometry),
            ShellEvent::RequestActivate => {
                self.focus_and_activate(id);
                self.move_to_front(id);
            }
            ShellEvent::RequestMinimize(minimized) => self.minimize(id, minimized),
            ShellEvent::RequestMaximize => self.toggle_maximize(id),
            ShellEvent::RequestFullscreen(fullscreen) => self.set_fullscreen(id, fullscreen),
            ShellEvent::RequestMove => {
                self.begin_interactive(id, GrabOperation::Move, ResizeEdges::empty())
            }
            ShellEvent::RequestResize(edges) => {
                self.begin_interactive(id, GrabOperation::Resize, edges)
            }
            ShellEvent::SetTitle => self.update_title(id),
            ShellEvent::SetClass => self.update_app_id(id),
            ShellEvent::SetDecorations => {
                if let Some(wants) = self.state.views.get(&id).map(|v| v.shell.wants_decorations()) {
                    self.set_decorations(id, wants);
                }
            }
        }
    }
}
