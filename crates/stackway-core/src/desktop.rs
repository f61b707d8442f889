//! Focus, stacking and hit-testing.

use tracing::debug;

use crate::event::CoreAction;
use crate::ssd::{self, SsdPart};
use crate::state::Geometry;
use crate::view::{View, ViewFlags, ViewId};
use crate::workspace::WorkspaceId;
use crate::Core;

/// Direction of window cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Forward,
    Backward,
}

impl Core {
    /// View holding keyboard focus.
    pub fn focused_view(&self) -> Option<ViewId> {
        self.state.focus.focused_view
    }

    /// Shown on the current workspace, or on every workspace when kept on top.
    fn is_focusable(&self, view: &View) -> bool {
        view.is_shown()
            && (view.is_always_on_top() || view.workspace == self.state.workspaces.current_id())
    }

    /// Box that receives pointer input for `view`.
    fn hit_box(&self, view: &View) -> Geometry {
        if view.margin() == crate::state::Border::ZERO {
            view.geometry
        } else {
            ssd::max_extents(view.geometry, view.margin(), &self.state.config.theme)
        }
    }

    /// Topmost view under a layout point. Views kept on top are checked first.
    pub fn view_at(&self, x: f64, y: f64) -> Option<ViewId> {
        let (x, y) = (x.floor() as i32, y.floor() as i32);
        let candidates = || {
            self.state
                .stack
                .iter()
                .rev()
                .filter_map(|id| self.state.views.get(id))
                .filter(|v| self.is_focusable(v))
        };
        candidates()
            .filter(|v| v.is_always_on_top())
            .chain(candidates().filter(|v| !v.is_always_on_top()))
            .find(|v| self.hit_box(v).contains(x, y))
            .map(|v| v.id)
    }

    pub fn view_at_pointer(&self) -> Option<ViewId> {
        let (x, y) = self.state.pointer_position;
        self.view_at(x, y)
    }

    /// View and decoration part under the pointer.
    pub fn part_at_pointer(&self) -> (Option<ViewId>, SsdPart) {
        let Some(id) = self.view_at_pointer() else {
            return (None, SsdPart::None);
        };
        (Some(id), self.part_at(id))
    }

    /// Decoration part of `id` under the pointer.
    pub fn part_at(&self, id: ViewId) -> SsdPart {
        let Some(view) = self.state.views.get(&id) else {
            return SsdPart::None;
        };
        let (x, y) = self.state.pointer_position;
        let mut decoration = view.ssd;
        decoration.margin = view.margin();
        decoration.enabled &= !view.is_fullscreen();
        ssd::part_at(
            view.geometry,
            &decoration,
            &self.state.config.theme,
            x.floor() as i32,
            y.floor() as i32,
        )
    }

    /// Give keyboard focus to `id` and mark it activated.
    ///
    /// A minimized view is restored first.
    pub fn focus_and_activate(&mut self, id: ViewId) {
        let Some(view) = self.state.views.get(&id) else {
            return;
        };
        if !view.is_mapped() {
            return;
        }
        if view.is_minimized() {
            self.minimize(id, false);
        }

        let previous = self.state.focus.focused_view;
        if previous != Some(id) {
            if let Some(prev) = previous.and_then(|p| self.state.views.get_mut(&p)) {
                prev.shell.set_activated(false);
                prev.flags.remove(ViewFlags::ACTIVATED);
            }
        }

        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        view.shell.set_activated(true);
        view.flags.insert(ViewFlags::ACTIVATED);
        let surface = view.surface;
        self.state.focus.focused_view = Some(id);
        self.state.focus.focused_unmanaged = None;
        debug!("Focus {}", id);
        self.emit(CoreAction::KeyboardFocus { surface });
    }

    /// Raise `id` to the top of the stacking order.
    pub fn move_to_front(&mut self, id: ViewId) {
        let Some(view) = self.state.views.get(&id) else {
            return;
        };
        let tree = view.tree;
        self.state.stack.retain(|&v| v != id);
        self.state.stack.push(id);
        self.scene.raise_to_top(tree);
    }

    /// Focus the topmost focusable view, or clear focus if none is left.
    pub fn focus_topmost_mapped_view(&mut self) {
        let topmost = self
            .state
            .stack
            .iter()
            .rev()
            .filter_map(|id| self.state.views.get(id))
            .find(|v| self.is_focusable(v))
            .map(|v| v.id);

        match topmost {
            Some(id) => self.focus_and_activate(id),
            None => {
                let Some(previous) = self.state.focus.focused_view.take() else {
                    return;
                };
                if let Some(prev) = self.state.views.get_mut(&previous) {
                    prev.shell.set_activated(false);
                    prev.flags.remove(ViewFlags::ACTIVATED);
                }
                self.emit(CoreAction::KeyboardFocus { surface: None });
            }
        }
    }

    /// Next view in cycling order, topmost first, wrapping around.
    ///
    /// Starting without a current view begins at the topmost one, so a
    /// forward step selects the view just below it.
    pub fn cycle_view(&self, current: Option<ViewId>, direction: CycleDirection) -> Option<ViewId> {
        let current_ws = self.state.workspaces.current_id();
        let order: Vec<ViewId> = self
            .state
            .stack
            .iter()
            .rev()
            .filter_map(|id| self.state.views.get(id))
            .filter(|v| v.is_mapped() && (v.is_always_on_top() || v.workspace == current_ws))
            .map(|v| v.id)
            .collect();
        if order.is_empty() {
            return None;
        }

        let len = order.len();
        let index = current
            .and_then(|c| order.iter().position(|&v| v == c))
            .unwrap_or(0);
        let next = match direction {
            CycleDirection::Forward => (index + 1) % len,
            CycleDirection::Backward => (index + len - 1) % len,
        };
        Some(order[next])
    }

    /// Make `target` the current workspace.
    pub fn switch_workspace(&mut self, target: WorkspaceId) {
        if !self.state.workspaces.switch_to(target, self.scene.as_mut()) {
            return;
        }
        self.state.focus.cycle_view = None;
        self.emit(CoreAction::WorkspaceChanged { active: target });
        self.focus_topmost_mapped_view();
    }

    /// Move `id` to `target`; focus moves on if the view leaves the screen.
    pub fn send_to_workspace(&mut self, id: ViewId, target: WorkspaceId) {
        let Some(tree) = self.state.workspaces.get(target).map(|ws| ws.tree) else {
            return;
        };
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        if view.workspace == target {
            return;
        }
        view.workspace = target;
        if !view.is_always_on_top() {
            self.scene.reparent(view.tree, tree);
        }
        if self.state.focus.focused_view == Some(id)
            && target != self.state.workspaces.current_id()
        {
            self.focus_topmost_mapped_view();
        }
    }
}
