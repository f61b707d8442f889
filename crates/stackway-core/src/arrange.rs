//! View operations: moving, configuring, maximize, fullscreen, edges.
//!
//! All requests to the client go through the capability table. Geometry
//! changes that need a client answer are recorded as pending and settle in
//! [`Core::commit_view`](crate::Core).

use tracing::{debug, error, warn};

use crate::shell::ConfigureAck;
use crate::ssd;
use crate::state::{Border, Geometry};
use crate::view::{ViewFlags, ViewId};
use crate::Core;

/// Edge named by `MoveToEdge` and `SnapToEdge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    /// Whole usable area; only meaningful for snapping.
    Center,
}

impl Direction {
    pub fn parse(name: &str) -> Option<Self> {
        [
            ("left", Self::Left),
            ("right", Self::Right),
            ("up", Self::Up),
            ("down", Self::Down),
            ("center", Self::Center),
        ]
        .into_iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, d)| d)
    }
}

/// Centered position of a `width`x`height` client with `margin` inside `area`.
fn centered(area: Geometry, width: i32, height: i32, margin: Border) -> (i32, i32) {
    let outer_w = width + margin.left + margin.right;
    let outer_h = height + margin.top + margin.bottom;
    (
        area.x + (area.width - outer_w) / 2 + margin.left,
        area.y + (area.height - outer_h) / 2 + margin.top,
    )
}

impl Core {
    /// Move without resizing. Takes effect immediately.
    pub fn move_view(&mut self, id: ViewId, x: i32, y: i32) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        view.geometry.x = x;
        view.geometry.y = y;
        let Geometry { width, height, .. } = view.geometry;
        view.shell.move_to(x, y, width, height);
        self.scene.set_position(view.tree, x, y);
        self.discover_output(id);
    }

    /// Ask the client to take `geometry`.
    ///
    /// The position follows once the client commits the new size; if the
    /// size is already right it is applied at once.
    pub fn configure_view(&mut self, id: ViewId, geometry: Geometry) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        view.pending.request(view.geometry, geometry);
        if view.shell.configure(geometry) == ConfigureAck::Immediate {
            view.geometry.x = geometry.x;
            view.geometry.y = geometry.y;
            view.pending.clear();
            self.scene.set_position(view.tree, geometry.x, geometry.y);
        }
        debug!("Configure {} to {:?}", id, geometry);
    }

    /// Center the view inside the usable area of its output.
    pub fn center_view(&mut self, id: ViewId) {
        let area = self.usable_area_for(id);
        let Some(view) = self.state.views.get(&id) else {
            return;
        };
        let (x, y) = centered(area, view.geometry.width, view.geometry.height, view.margin());
        self.move_view(id, x, y);
    }

    fn usable_area_for(&self, id: ViewId) -> Geometry {
        self.state
            .view_output(id)
            .map(|o| o.usable_area)
            .unwrap_or_default()
    }

    /// Assign the output the view overlaps most.
    pub fn discover_output(&mut self, id: ViewId) {
        let Some(view) = self.state.views.get(&id) else {
            return;
        };
        let geometry = view.geometry;
        let best = self
            .state
            .outputs
            .values()
            .map(|o| (o.id, o.geometry.intersection_area(geometry)))
            .filter(|&(_, area)| area > 0)
            .max_by_key(|&(_, area)| area)
            .map(|(oid, _)| oid);
        let fallback = || {
            let (x, y) = self.state.pointer_position;
            self.state.output_at(x, y).map(|o| o.id)
        };
        let output = best.or_else(fallback);
        if let Some(view) = self.state.views.get_mut(&id) {
            view.output = output;
        }
    }

    fn maximized_box(&self, id: ViewId) -> Option<Geometry> {
        let view = self.state.views.get(&id)?;
        let margin = if view.ssd.enabled { view.ssd.margin } else { Border::ZERO };
        let area = self.state.view_output(id)?.usable_area;
        Some(area.shrink(margin))
    }

    /// Restore the size and position saved before maximize or fullscreen.
    fn apply_natural_geometry(&mut self, id: ViewId) {
        let natural = self
            .state
            .views
            .get_mut(&id)
            .and_then(|v| v.natural_geometry.take());
        if let Some(geometry) = natural {
            self.configure_view(id, geometry);
        }
    }

    pub fn set_maximized(&mut self, id: ViewId, maximize: bool) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        if view.is_fullscreen() || view.is_maximized() == maximize {
            return;
        }
        view.shell.maximize(maximize);

        if maximize {
            view.natural_geometry = Some(view.geometry);
            view.flags.insert(ViewFlags::MAXIMIZED);
            match self.maximized_box(id) {
                Some(target) => self.configure_view(id, target),
                None => warn!("No output to maximize {} on", id),
            }
        } else {
            view.flags.remove(ViewFlags::MAXIMIZED);
            self.apply_natural_geometry(id);
        }
    }

    pub fn toggle_maximize(&mut self, id: ViewId) {
        if let Some(maximized) = self.state.views.get(&id).map(|v| v.is_maximized()) {
            self.set_maximized(id, !maximized);
        }
    }

    pub fn set_fullscreen(&mut self, id: ViewId, fullscreen: bool) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        if view.is_fullscreen() == fullscreen {
            return;
        }
        view.shell.set_fullscreen(fullscreen);
        let decoration_tree = view.ssd.tree;

        if fullscreen {
            if view.is_floating() {
                view.natural_geometry = Some(view.geometry);
            }
            view.flags.insert(ViewFlags::FULLSCREEN);
            if let Some(tree) = decoration_tree {
                self.scene.set_enabled(tree, false);
            }
            match self.state.view_output(id).map(|o| o.geometry) {
                Some(target) => self.configure_view(id, target),
                None => warn!("No output to make {} fullscreen on", id),
            }
        } else {
            view.flags.remove(ViewFlags::FULLSCREEN);
            let show_decorations = view.ssd.enabled;
            let maximized = view.is_maximized();
            if let Some(tree) = decoration_tree {
                self.scene.set_enabled(tree, show_decorations);
            }
            if maximized {
                if let Some(target) = self.maximized_box(id) {
                    self.configure_view(id, target);
                }
            } else {
                self.apply_natural_geometry(id);
            }
        }
    }

    pub fn toggle_fullscreen(&mut self, id: ViewId) {
        if let Some(fullscreen) = self.state.views.get(&id).map(|v| v.is_fullscreen()) {
            self.set_fullscreen(id, !fullscreen);
        }
    }

    /// Turn server-side decorations on or off. Ignored while fullscreen.
    pub fn set_decorations(&mut self, id: ViewId, enabled: bool) {
        let Some(view) = self.state.views.get(&id) else {
            return;
        };
        if view.is_fullscreen() || view.ssd.enabled == enabled {
            return;
        }
        if let Some(view) = self.state.views.get_mut(&id) {
            view.ssd.enabled = enabled;
        }
        self.refresh_decorations(id);
    }

    pub fn toggle_decorations(&mut self, id: ViewId) {
        if let Some(enabled) = self.state.views.get(&id).map(|v| v.ssd.enabled) {
            self.set_decorations(id, !enabled);
        }
    }

    /// Recompute the margin from the theme and sync the decoration tree.
    pub(crate) fn refresh_decorations(&mut self, id: ViewId) {
        let thickness = ssd::thickness(&self.state.config.theme);
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        let enabled = view.ssd.enabled;
        view.ssd.margin = if enabled { thickness } else { Border::ZERO };
        if enabled && view.ssd.tree.is_none() && view.flags.contains(ViewFlags::BEEN_MAPPED) {
            view.ssd.tree = Some(self.scene.create_tree(view.tree));
        }
        if let Some(tree) = view.ssd.tree {
            self.scene.set_enabled(tree, enabled && !view.is_fullscreen());
        }
        if view.is_maximized() {
            if let Some(target) = self.maximized_box(id) {
                self.configure_view(id, target);
            }
        }
    }

    /// Keep the view above all others, on every workspace.
    pub fn toggle_always_on_top(&mut self, id: ViewId) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        view.flags.toggle(ViewFlags::ALWAYS_ON_TOP);
        let parent = if view.is_always_on_top() {
            Some(self.state.layers.always_on_top)
        } else {
            self.state.workspaces.get(view.workspace).map(|ws| ws.tree)
        };
        if let Some(parent) = parent {
            self.scene.reparent(view.tree, parent);
        }
    }

    /// Hide or restore a view. Hiding the focused view moves focus on.
    pub fn minimize(&mut self, id: ViewId, minimized: bool) {
        let Some(view) = self.state.views.get_mut(&id) else {
            return;
        };
        if view.is_minimized() == minimized {
            return;
        }
        view.flags.set(ViewFlags::MINIMIZED, minimized);
        self.scene.set_enabled(view.tree, view.is_shown());
        if minimized && self.state.focus.focused_view == Some(id) {
            self.focus_topmost_mapped_view();
        }
    }

    /// Move to an output edge, keeping the configured gap.
    pub fn move_to_edge(&mut self, id: ViewId, direction: &str) {
        let Some(view) = self.state.views.get(&id) else {
            return;
        };
        let Some(usable) = self.state.view_output(id).map(|o| o.usable_area) else {
            return;
        };
        let gap = self.state.config.placement.gap;
        let margin = view.margin();
        let Geometry {
            x,
            y,
            width,
            height,
        } = view.geometry;

        let (x, y) = match Direction::parse(direction) {
            Some(Direction::Left) => (usable.x + margin.left + gap, y),
            Some(Direction::Up) => (x, usable.y + margin.top + gap),
            Some(Direction::Right) => (usable.x + usable.width - width - margin.right - gap, y),
            Some(Direction::Down) => (x, usable.y + usable.height - height - margin.bottom - gap),
            Some(Direction::Center) | None => {
                error!("Invalid edge: {}", direction);
                return;
            }
        };
        self.move_view(id, x, y);
    }

    /// Box a view occupies when snapped to `direction`.
    pub fn edge_snap_box(&self, id: ViewId, direction: Direction) -> Option<Geometry> {
        let view = self.state.views.get(&id)?;
        let usable = self.state.view_output(id)?.usable_area;
        let gap = self.state.config.placement.gap;

        let x_offset = if direction == Direction::Right {
            (usable.width + gap) / 2
        } else {
            gap
        };
        let y_offset = if direction == Direction::Down {
            (usable.height + gap) / 2
        } else {
            gap
        };
        let (base_width, base_height) = match direction {
            Direction::Left | Direction::Right => {
                ((usable.width - 3 * gap) / 2, usable.height - 2 * gap)
            }
            Direction::Up | Direction::Down => {
                (usable.width - 2 * gap, (usable.height - 3 * gap) / 2)
            }
            Direction::Center => (usable.width - 2 * gap, usable.height - 2 * gap),
        };

        let margin = if view.ssd.enabled { view.ssd.margin } else { Border::ZERO };
        Some(Geometry::new(
            usable.x + x_offset + margin.left,
            usable.y + y_offset + margin.top,
            base_width - margin.left - margin.right,
            base_height - margin.top - margin.bottom,
        ))
    }

    /// Tile the view to half (or all) of the usable area.
    pub fn snap_to_edge(&mut self, id: ViewId, direction: &str) {
        let Some(direction) = Direction::parse(direction) else {
            error!("Invalid edge: {}", direction);
            return;
        };
        let Some(view) = self.state.views.get(&id) else {
            return;
        };
        if view.is_fullscreen() {
            return;
        }
        if view.is_maximized() {
            if let Some(view) = self.state.views.get_mut(&id) {
                view.shell.maximize(false);
                view.flags.remove(ViewFlags::MAXIMIZED);
            }
        } else if let Some(view) = self.state.views.get_mut(&id) {
            view.natural_geometry.get_or_insert(view.geometry);
        }
        if let Some(target) = self.edge_snap_box(id, direction) {
            self.configure_view(id, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("LEFT"), Some(Direction::Left));
        assert_eq!(Direction::parse("center"), Some(Direction::Center));
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn test_centered_with_margin() {
        let area = Geometry::new(0, 0, 1000, 800);
        let margin = Border::new(20, 0, 0, 0);
        assert_eq!(centered(area, 400, 300, margin), (300, 260));
        assert_eq!(centered(area, 400, 300, Border::ZERO), (300, 250));
    }
}
