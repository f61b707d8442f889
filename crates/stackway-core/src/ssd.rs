//! Server-side decoration metrics and hit-testing.
//!
//! Only geometry lives here. Drawing the titlebar and borders is the
//! backend's business; it finds the decoration tree of a view in
//! [`Decoration::tree`].

use crate::config::ThemeConfig;
use crate::scene::NodeId;
use crate::state::{Border, Geometry, ResizeEdges};

/// Decoration state of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoration {
    pub enabled: bool,
    /// Space between the client area and the outer decoration edge.
    pub margin: Border,
    /// Decoration subtree, created on demand under the view tree.
    pub tree: Option<NodeId>,
}

/// Titlebar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    WindowMenu,
    Iconify,
    Maximize,
    Close,
}

/// Decoration part under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SsdPart {
    None,
    Client,
    Titlebar,
    Button(Button),
    /// Visible border; edges name the side or corner.
    Border(ResizeEdges),
    /// Invisible resize area around the border.
    Extents(ResizeEdges),
}

impl SsdPart {
    /// Titlebar proper or one of its buttons.
    pub const fn is_titlebar(self) -> bool {
        matches!(self, Self::Titlebar | Self::Button(_))
    }

    /// Edges to resize from when a grab starts on this part.
    pub fn resize_edges(self) -> Option<ResizeEdges> {
        match self {
            Self::Border(edges) | Self::Extents(edges) => Some(edges),
            _ => None,
        }
    }
}

/// Decoration thickness for the given theme.
pub const fn thickness(theme: &ThemeConfig) -> Border {
    let border = theme.border_width;
    Border::new(theme.title_height + border, border, border, border)
}

/// Outermost box of a decorated view, including the resize extents.
pub const fn max_extents(geometry: Geometry, margin: Border, theme: &ThemeConfig) -> Geometry {
    geometry
        .expand(margin)
        .expand(Border::uniform(theme.resize_extents))
}

fn edges_outside(x: i32, y: i32, inner: Geometry) -> ResizeEdges {
    let mut edges = ResizeEdges::empty();
    if x < inner.x {
        edges |= ResizeEdges::LEFT;
    } else if x >= inner.x + inner.width {
        edges |= ResizeEdges::RIGHT;
    }
    if y < inner.y {
        edges |= ResizeEdges::TOP;
    } else if y >= inner.y + inner.height {
        edges |= ResizeEdges::BOTTOM;
    }
    edges
}

/// Part of a view's decorations at layout point `(x, y)`.
pub fn part_at(
    geometry: Geometry,
    decoration: &Decoration,
    theme: &ThemeConfig,
    x: i32,
    y: i32,
) -> SsdPart {
    if geometry.contains(x, y) {
        return SsdPart::Client;
    }
    if !decoration.enabled {
        return SsdPart::None;
    }

    let outer = geometry.expand(decoration.margin);
    if outer.contains(x, y) {
        let titlebar = Geometry::new(
            geometry.x,
            geometry.y - theme.title_height,
            geometry.width,
            theme.title_height,
        );
        if decoration.margin.top > 0 && titlebar.contains(x, y) {
            let from_left = x - titlebar.x;
            let from_right = titlebar.x + titlebar.width - 1 - x;
            let button = theme.button_width;
            return if from_left < button {
                SsdPart::Button(Button::WindowMenu)
            } else if from_right < button {
                SsdPart::Button(Button::Close)
            } else if from_right < 2 * button {
                SsdPart::Button(Button::Maximize)
            } else if from_right < 3 * button {
                SsdPart::Button(Button::Iconify)
            } else {
                SsdPart::Titlebar
            };
        }
        // Titlebar rows left and right of the client belong to the side borders.
        let inner = Geometry::new(
            geometry.x,
            titlebar.y,
            geometry.width,
            geometry.height + theme.title_height,
        );
        return SsdPart::Border(edges_outside(x, y, inner));
    }

    if max_extents(geometry, decoration.margin, theme).contains(x, y) {
        return SsdPart::Extents(edges_outside(x, y, outer));
    }
    SsdPart::None
}
