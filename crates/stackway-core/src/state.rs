//! Core compositor state.

use indexmap::IndexMap;

use crate::config::Config;
use crate::menu::Menus;
use crate::scene::{NodeId, SceneGraph};
use crate::unmanaged::{Unmanaged, UnmanagedId};
use crate::view::{View, ViewId};
use crate::workspace::Workspaces;

/// Geometry of a rectangular region in layout coordinates.
///
/// Components are signed: client-reported positions may be negative and
/// reconciliation arithmetic subtracts sizes from positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Area shared with `other`, zero when disjoint.
    pub fn intersection_area(self, other: Self) -> i64 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right <= left || bottom <= top {
            return 0;
        }
        i64::from(right - left) * i64::from(bottom - top)
    }

    /// Grow the box outwards by `border` on each side.
    pub const fn expand(self, border: Border) -> Self {
        Self::new(
            self.x - border.left,
            self.y - border.top,
            self.width + border.left + border.right,
            self.height + border.top + border.bottom,
        )
    }

    /// Shrink the box inwards by `border` on each side.
    pub const fn shrink(self, border: Border) -> Self {
        Self::new(
            self.x + border.left,
            self.y + border.top,
            self.width - border.left - border.right,
            self.height - border.top - border.bottom,
        )
    }

    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Per-side thickness, used for decoration margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Border {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Border {
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn uniform(width: i32) -> Self {
        Self::new(width, width, width, width)
    }
}

/// Output (monitor) information.
#[derive(Debug, Clone)]
pub struct Output {
    pub id: u64,
    pub name: String,
    pub geometry: Geometry,
    /// Output area minus exclusive zones (panels, docks).
    pub usable_area: Geometry,
}

/// Interactive operation started on behalf of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabOperation {
    Move,
    Resize,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResizeEdges: u8 {
        const TOP    = 0b0001;
        const BOTTOM = 0b0010;
        const LEFT   = 0b0100;
        const RIGHT  = 0b1000;
    }
}

impl ResizeEdges {
    /// Edges nearest to a point, splitting the box into a 3x3 grid.
    ///
    /// The centre cell resolves to the bottom-right corner.
    pub fn from_point(px: f64, py: f64, geo: Geometry) -> Self {
        let x = px - f64::from(geo.x);
        let y = py - f64::from(geo.y);
        let width = f64::from(geo.width);
        let height = f64::from(geo.height);

        let mut edges = Self::empty();
        if x < width / 3.0 {
            edges |= Self::LEFT;
        } else if x > width * 2.0 / 3.0 {
            edges |= Self::RIGHT;
        }
        if y < height / 3.0 {
            edges |= Self::TOP;
        } else if y > height * 2.0 / 3.0 {
            edges |= Self::BOTTOM;
        }

        if edges.is_empty() {
            Self::BOTTOM | Self::RIGHT
        } else {
            edges
        }
    }
}

/// Scene layers that live above the workspace trees.
#[derive(Debug, Clone, Copy)]
pub struct Layers {
    pub always_on_top: NodeId,
    pub unmanaged: NodeId,
}

/// Focus tracking.
#[derive(Debug, Clone, Default)]
pub struct FocusState {
    pub focused_view: Option<ViewId>,
    /// Override-redirect surface holding keyboard focus, if any.
    pub focused_unmanaged: Option<UnmanagedId>,
    /// Current position of window cycling (`NextWindow`/`PreviousWindow`).
    pub cycle_view: Option<ViewId>,
}

/// The central compositor state.
pub struct State {
    pub config: Config,
    pub views: IndexMap<ViewId, View>,
    /// Stacking order, bottom first.
    pub stack: Vec<ViewId>,
    pub unmanaged: IndexMap<UnmanagedId, Unmanaged>,
    pub workspaces: Workspaces,
    pub outputs: IndexMap<u64, Output>,
    pub menus: Menus,
    pub layers: Layers,
    pub focus: FocusState,
    pub pointer_position: (f64, f64),
    next_view: u64,
    next_unmanaged: u64,
    next_toplevel: u64,
}

impl State {
    pub fn new(config: Config, scene: &mut dyn SceneGraph) -> Self {
        let root = scene.root();
        let workspaces = Workspaces::new(&config.workspaces.names, scene);
        let layers = Layers {
            always_on_top: scene.create_tree(root),
            unmanaged: scene.create_tree(root),
        };
        let menus = Menus::new(&config.menus);

        Self {
            config,
            views: IndexMap::new(),
            stack: Vec::new(),
            unmanaged: IndexMap::new(),
            workspaces,
            outputs: IndexMap::new(),
            menus,
            layers,
            focus: FocusState::default(),
            pointer_position: (0.0, 0.0),
            next_view: 1,
            next_unmanaged: 1,
            next_toplevel: 1,
        }
    }

    pub(crate) fn alloc_view_id(&mut self) -> ViewId {
        let id = ViewId(self.next_view);
        self.next_view += 1;
        id
    }

    pub(crate) fn alloc_unmanaged_id(&mut self) -> UnmanagedId {
        let id = UnmanagedId(self.next_unmanaged);
        self.next_unmanaged += 1;
        id
    }

    pub(crate) fn alloc_toplevel_handle(&mut self) -> crate::view::ToplevelHandle {
        let handle = crate::view::ToplevelHandle(self.next_toplevel);
        self.next_toplevel += 1;
        handle
    }

    /// Insert a view on top of the stacking order.
    pub(crate) fn insert_view(&mut self, view: View) {
        self.stack.push(view.id);
        self.views.insert(view.id, view);
    }

    /// Remove a view from the arena and every index referring to it.
    pub(crate) fn remove_view(&mut self, id: ViewId) -> Option<View> {
        let view = self.views.shift_remove(&id)?;
        self.stack.retain(|&v| v != id);
        if self.focus.focused_view == Some(id) {
            self.focus.focused_view = None;
        }
        if self.focus.cycle_view == Some(id) {
            self.focus.cycle_view = None;
        }
        self.menus.forget_view(id);
        Some(view)
    }

    /// Output under the given layout point, falling back to the first one.
    pub fn output_at(&self, x: f64, y: f64) -> Option<&Output> {
        self.outputs
            .values()
            .find(|o| o.geometry.contains(x.floor() as i32, y.floor() as i32))
            .or_else(|| self.outputs.values().next())
    }

    /// Usable area of the output under the pointer.
    ///
    /// Without any output a zero-sized box at the origin is returned so
    /// placement degrades to the layout origin.
    pub fn usable_area_at_pointer(&self) -> Geometry {
        let (x, y) = self.pointer_position;
        self.output_at(x, y)
            .map(|o| o.usable_area)
            .unwrap_or_default()
    }

    /// Output a view is assigned to, or the one under the pointer.
    pub fn view_output(&self, id: ViewId) -> Option<&Output> {
        self.views
            .get(&id)
            .and_then(|v| v.output)
            .and_then(|oid| self.outputs.get(&oid))
            .or_else(|| {
                let (x, y) = self.pointer_position;
                self.output_at(x, y)
            })
    }
}
