//! Geometry reconciliation.
//!
//! A configure request reaches the client asynchronously; the client may
//! answer with several commits before it settles on the requested size.
//! [`PendingMoveResize`] remembers the outstanding target so every commit
//! can place the view consistently until the exact target is reached.

use crate::state::Geometry;

/// A requested geometry change not yet confirmed by a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingMoveResize {
    pub update_x: bool,
    pub update_y: bool,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Outcome of reconciling one commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub geometry: Geometry,
    /// Position changed; the scene node must follow.
    pub moved: bool,
    /// Target reached and pending flags cleared.
    pub converged: bool,
}

impl PendingMoveResize {
    /// Record a new target.
    ///
    /// Position updates are only pending for components that actually move.
    pub fn request(&mut self, current: Geometry, target: Geometry) {
        self.update_x = target.x != current.x;
        self.update_y = target.y != current.y;
        self.x = target.x;
        self.y = target.y;
        self.width = target.width;
        self.height = target.height;
    }

    pub const fn is_pending(&self) -> bool {
        self.update_x || self.update_y
    }

    pub fn clear(&mut self) {
        self.update_x = false;
        self.update_y = false;
    }

    /// Absorb a commit of size `width`x`height` against `current`.
    ///
    /// Returns `None` when nothing changed and no update is pending.
    /// Pending positions are recomputed as `pending_pos + pending_size -
    /// committed_size` so the trailing edge stays anchored while the size
    /// converges. Flags clear only once both dimensions hit the target.
    pub fn reconcile(&mut self, current: Geometry, width: i32, height: i32) -> Option<Reconciled> {
        let size_changed = current.width != width || current.height != height;
        if !size_changed && !self.is_pending() {
            return None;
        }

        let mut geometry = Geometry::new(current.x, current.y, width, height);
        let mut moved = false;
        if self.update_x {
            geometry.x = self.x + self.width - width;
            moved = true;
        }
        if self.update_y {
            geometry.y = self.y + self.height - height;
            moved = true;
        }

        let converged = width == self.width && height == self.height;
        if converged {
            self.clear();
        }

        Some(Reconciled {
            geometry,
            moved,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn pending_to(current: Geometry, target: Geometry) -> PendingMoveResize {
        let mut pending = PendingMoveResize::default();
        pending.request(current, target);
        pending
    }

    #[test]
    fn test_no_change_is_noop() {
        let mut pending = PendingMoveResize::default();
        let current = Geometry::new(10, 10, 400, 300);
        assert_eq!(pending.reconcile(current, 400, 300), None);
    }

    #[test]
    fn test_plain_resize_keeps_position() {
        let mut pending = PendingMoveResize::default();
        let current = Geometry::new(10, 20, 400, 300);
        let out = pending.reconcile(current, 500, 350).unwrap();
        assert_eq!(out.geometry, Geometry::new(10, 20, 500, 350));
        assert!(!out.moved);
    }

    #[test]
    fn test_split_commits_clear_on_exact_target() {
        // Grow from the left edge: x moves from 500 to 100.
        let current = Geometry::new(500, 100, 400, 300);
        let target = Geometry::new(100, 100, 800, 600);
        let mut pending = pending_to(current, target);
        assert!(pending.update_x);
        assert!(!pending.update_y);

        let first = pending.reconcile(current, 600, 600).unwrap();
        assert_eq!(first.geometry, Geometry::new(300, 100, 600, 600));
        assert!(first.moved);
        assert!(!first.converged);
        assert!(pending.update_x);

        let second = pending.reconcile(first.geometry, 800, 600).unwrap();
        assert_eq!(second.geometry, Geometry::new(100, 100, 800, 600));
        assert!(second.converged);
        assert!(!pending.is_pending());
    }

    #[test]
    fn test_intermediate_commit_matching_width_only() {
        let current = Geometry::new(0, 200, 400, 300);
        let target = Geometry::new(0, 0, 400, 500);
        let mut pending = pending_to(current, target);

        let out = pending.reconcile(current, 400, 400).unwrap();
        assert_eq!(out.geometry.y, 100);
        assert!(pending.update_y);
    }

    #[test]
    fn test_top_left_drag_anchors_trailing_edge() {
        // Shrink from the top-left corner; bottom-right stays at (900, 700).
        let current = Geometry::new(100, 100, 800, 600);
        let target = Geometry::new(300, 250, 600, 450);
        let mut pending = pending_to(current, target);

        let out = pending.reconcile(current, 640, 480).unwrap();
        assert_eq!(out.geometry, Geometry::new(260, 220, 640, 480));
        assert_eq!(out.geometry.x + out.geometry.width, 900);
        assert_eq!(out.geometry.y + out.geometry.height, 700);
    }

    #[test]
    fn test_pending_move_without_resize_applies_on_commit() {
        let current = Geometry::new(0, 0, 400, 300);
        let target = Geometry::new(50, 60, 400, 300);
        let mut pending = pending_to(current, target);

        let out = pending.reconcile(current, 400, 300).unwrap();
        assert_eq!(out.geometry, target);
        assert!(out.converged);
    }

    proptest! {
        #[test]
        fn prop_flags_clear_only_at_target(
            w0 in 50..2000i32, h0 in 50..2000i32,
            tw in 50..2000i32, th in 50..2000i32,
            steps in proptest::collection::vec((50..2000i32, 50..2000i32), 0..6),
        ) {
            let current = Geometry::new(1000, 1000, w0, h0);
            let target = Geometry::new(10, 20, tw, th);
            let mut pending = pending_to(current, target);
            let mut geo = current;

            for (w, h) in steps.into_iter().chain(std::iter::once((tw, th))) {
                let out = pending.reconcile(geo, w, h);
                prop_assert!(out.is_some());
                let out = out.unwrap();
                geo = out.geometry;
                prop_assert_eq!(out.converged, w == tw && h == th);
                prop_assert_eq!(geo.x, target.x + tw - w);
                prop_assert_eq!(geo.y, target.y + th - h);
                if out.converged {
                    break;
                }
                prop_assert!(pending.is_pending());
            }
            prop_assert!(!pending.is_pending());
            prop_assert_eq!(geo, target);
        }
    }
}
