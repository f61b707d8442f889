//! Workspace management — virtual desktops.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::scene::{NodeId, SceneGraph};

/// Unique identifier for workspaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceId(pub u32);

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ws:{}", self.0)
    }
}

/// A virtual workspace/desktop.
#[derive(Debug)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    /// Parent tree of every view positioned in this workspace.
    pub tree: NodeId,
}

/// Ordered workspace list with one current workspace.
#[derive(Debug)]
pub struct Workspaces {
    list: Vec<Workspace>,
    current: usize,
}

impl Workspaces {
    /// Create one workspace per name; the first is current.
    ///
    /// An empty name list still yields a single workspace named `1`.
    pub fn new(names: &[String], scene: &mut dyn SceneGraph) -> Self {
        let root = scene.root();
        let fallback = [String::from("1")];
        let names = if names.is_empty() {
            warn!("No workspaces configured, creating workspace 1");
            &fallback[..]
        } else {
            names
        };

        let list: Vec<Workspace> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let tree = scene.create_tree(root);
                scene.set_enabled(tree, i == 0);
                Workspace {
                    id: WorkspaceId(i as u32 + 1),
                    name: name.clone(),
                    tree,
                }
            })
            .collect();

        Self { list, current: 0 }
    }

    pub fn current(&self) -> &Workspace {
        &self.list[self.current]
    }

    pub fn current_id(&self) -> WorkspaceId {
        self.current().id
    }

    pub fn get(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.list.iter().find(|ws| ws.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workspace> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    fn index_of(&self, id: WorkspaceId) -> Option<usize> {
        self.list.iter().position(|ws| ws.id == id)
    }

    /// Resolve `name` relative to `origin`.
    ///
    /// `left` and `right` select the previous and next workspace with
    /// wrap-around; anything else matches a workspace name ignoring case.
    pub fn find(&self, origin: WorkspaceId, name: &str) -> Option<WorkspaceId> {
        let count = self.list.len();
        if name.eq_ignore_ascii_case("left") || name.eq_ignore_ascii_case("right") {
            let index = self.index_of(origin)?;
            let target = if name.eq_ignore_ascii_case("left") {
                (index + count - 1) % count
            } else {
                (index + 1) % count
            };
            return Some(self.list[target].id);
        }
        self.list
            .iter()
            .find(|ws| ws.name.eq_ignore_ascii_case(name))
            .map(|ws| ws.id)
    }

    /// Make `id` current, flipping tree visibility. Returns false if
    /// `id` is unknown or already current.
    pub(crate) fn switch_to(&mut self, id: WorkspaceId, scene: &mut dyn SceneGraph) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        if index == self.current {
            return false;
        }
        scene.set_enabled(self.list[self.current].tree, false);
        scene.set_enabled(self.list[index].tree, true);
        self.current = index;
        true
    }
}
