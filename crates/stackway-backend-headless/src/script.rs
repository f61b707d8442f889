//! Session scripts.
//!
//! A script is a JSON array of steps, each tagged with `op`:
//!
//! ```json
//! [
//!   { "op": "output", "id": 1, "x": 0, "y": 0, "width": 1920, "height": 1080 },
//!   { "op": "toplevel", "id": 1, "width": 640, "height": 480, "title": "foot" },
//!   { "op": "map", "id": 1 },
//!   { "op": "key", "combo": "W-a" }
//! ]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Connect an output.
    Output {
        id: u64,
        name: Option<String>,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    RemoveOutput {
        id: u64,
    },
    /// A new xdg toplevel.
    Toplevel {
        id: u64,
        width: i32,
        height: i32,
        title: Option<String>,
        app_id: Option<String>,
        #[serde(default)]
        server_side: bool,
        /// Fullscreen requested before the first map.
        #[serde(default)]
        fullscreen: bool,
    },
    /// A new X11 window.
    #[cfg(feature = "xwayland")]
    X11 {
        id: u64,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        title: Option<String>,
        class: Option<String>,
        #[serde(default)]
        override_redirect: bool,
        #[serde(default)]
        undecorated: bool,
        #[serde(default)]
        wants_focus: bool,
    },
    Map {
        id: u64,
    },
    Unmap {
        id: u64,
    },
    Destroy {
        id: u64,
    },
    /// Commit a buffer of the client's current size.
    Commit {
        id: u64,
    },
    Title {
        id: u64,
        title: String,
    },
    Fullscreen {
        id: u64,
        enable: bool,
    },
    Minimize {
        id: u64,
        enable: bool,
    },
    Maximize {
        id: u64,
    },
    Activate {
        id: u64,
    },
    /// The client asks for a geometry of its own.
    Configure {
        id: u64,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    #[cfg(feature = "xwayland")]
    OverrideRedirect {
        id: u64,
        enable: bool,
    },
    Pointer {
        x: f64,
        y: f64,
    },
    /// `left`, `right` or `middle`.
    Button {
        button: String,
        pressed: bool,
    },
    Key {
        combo: String,
    },
    Action {
        name: String,
        arg: Option<String>,
    },
    /// The cycling modifier was released.
    EndCycle,
}

pub fn parse(json: &str) -> serde_json::Result<Vec<Step>> {
    serde_json::from_str(json)
}

/// Read a script file.
pub fn load(path: &Path) -> Result<Vec<Step>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse script {}", path.display()))
}
