//! Typed event subscriptions.
//!
//! Every protocol notification is addressed by an [`EventSource`] and an
//! [`EventKind`]. A record that wants to hear about it subscribes once per
//! kind and keeps the returned [`Subscription`]. Dropping the token
//! unsubscribes, so a destroyed record can never be reached by a later
//! notification.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::shell::{ShellId, SurfaceId};
use crate::unmanaged::UnmanagedId;
use crate::view::ViewId;

/// Kinds of notification a surface can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Map,
    Unmap,
    Destroy,
    Commit,
    RequestConfigure,
    RequestActivate,
    RequestMinimize,
    RequestMaximize,
    RequestFullscreen,
    RequestMove,
    RequestResize,
    SetTitle,
    SetClass,
    SetDecorations,
    SetOverrideRedirect,
}

/// Object a notification originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// Shell-level object (xdg toplevel, xwayland surface).
    Shell(ShellId),
    /// The `wl_surface` backing a shell object; only emits commits.
    Surface(SurfaceId),
}

/// Record a notification is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    View(ViewId),
    Unmanaged(UnmanagedId),
}

type Registry = HashMap<(EventSource, EventKind), Listener>;

/// Subscription registry shared by the core and all live tokens.
#[derive(Debug, Clone, Default)]
pub struct Signals {
    registry: Rc<RefCell<Registry>>,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `kind` notifications from `source`.
    ///
    /// A source delivers each kind to exactly one listener; a previous
    /// registration is replaced.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(
        &self,
        source: EventSource,
        kind: EventKind,
        listener: Listener,
    ) -> Subscription {
        let key = (source, kind);
        if let Some(previous) = self.registry.borrow_mut().insert(key, listener) {
            if previous != listener {
                warn!(
                    "{:?} {:?} listener replaced: {:?} -> {:?}",
                    source, kind, previous, listener
                );
            }
        }
        Subscription {
            registry: Rc::downgrade(&self.registry),
            key,
            listener,
        }
    }

    /// Listener that should receive `kind` from `source`, if any.
    pub fn listener(&self, source: EventSource, kind: EventKind) -> Option<Listener> {
        self.registry.borrow().get(&(source, kind)).copied()
    }

    /// Number of registrations held by `listener`.
    pub fn count_for(&self, listener: Listener) -> usize {
        self.registry
            .borrow()
            .values()
            .filter(|&&l| l == listener)
            .count()
    }

    /// Snapshot of every distinct listener with at least one registration.
    pub fn listeners(&self) -> Vec<Listener> {
        let mut out: Vec<Listener> = Vec::new();
        for &l in self.registry.borrow().values() {
            if !out.contains(&l) {
                out.push(l);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.borrow().is_empty()
    }
}

/// Live registration; unsubscribes on drop.
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    key: (EventSource, EventKind),
    listener: Listener,
}

impl Subscription {
    pub const fn source(&self) -> EventSource {
        self.key.0
    }

    pub const fn kind(&self) -> EventKind {
        self.key.1
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("source", &self.key.0)
            .field("kind", &self.key.1)
            .field("listener", &self.listener)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.borrow_mut();
        // Only remove our own registration; the slot may have been taken over.
        if registry.get(&self.key) == Some(&self.listener) {
            registry.remove(&self.key);
        }
    }
}
