//! Configuration.
//!
//! TOML document deserialized with serde. Every section has defaults, so
//! an empty file (or no file at all) yields a usable configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::input::{Bindings, InputError};

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid binding")]
    Binding(#[from] InputError),

    #[error("at least one workspace name is required")]
    NoWorkspaces,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Menus that can be opened by `ShowMenu`
    pub menus: Vec<String>,

    /// Decoration metrics
    pub theme: ThemeConfig,

    /// Window placement
    pub placement: PlacementConfig,

    /// Workspace names
    pub workspaces: WorkspacesConfig,

    /// Key bindings
    pub keybinds: Vec<KeybindConfig>,

    /// Mouse bindings
    pub mousebinds: Vec<MousebindConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            menus: vec![
                crate::menu::ROOT_MENU.to_string(),
                crate::menu::CLIENT_MENU.to_string(),
            ],
            theme: ThemeConfig::default(),
            placement: PlacementConfig::default(),
            workspaces: WorkspacesConfig::default(),
            keybinds: default_keybinds(),
            mousebinds: default_mousebinds(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the first config file found
    /// in the standard locations. Missing files fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(Path::to_path_buf).or_else(Self::find_config_file);

        match config_path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {:?}", path);
                let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                Self::from_toml(&content).map_err(|source| ConfigError::Parse { path, source })
            }
            Some(path) => {
                warn!("Config file not found at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Find the configuration file
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            dirs::config_dir().map(|p| p.join("stackway/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/stackway/config.toml")),
            Some(PathBuf::from("/etc/stackway/config.toml")),
        ];

        candidates.into_iter().flatten().find(|p| p.exists())
    }

    /// Generate default configuration as a string
    pub fn default_config_string() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }

    /// Strict check: every binding must parse and a workspace must exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workspaces.names.is_empty() {
            return Err(ConfigError::NoWorkspaces);
        }
        Bindings::try_from_config(self)?;
        Ok(())
    }
}

/// Server-side decoration metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub title_height: i32,
    pub border_width: i32,
    pub button_width: i32,
    /// Invisible grab area around the decorations
    pub resize_extents: i32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            title_height: 26,
            border_width: 1,
            button_width: 26,
            resize_extents: 8,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Distance kept from output edges by `MoveToEdge` and `SnapToEdge`
    pub gap: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspacesConfig {
    pub names: Vec<String>,
}

impl Default for WorkspacesConfig {
    fn default() -> Self {
        Self {
            names: (1..=4).map(|n| n.to_string()).collect(),
        }
    }
}

/// One action inside a binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Action name; a missing name becomes a no-op
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
}

impl ActionConfig {
    fn new(name: &str, arg: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            arg: arg.map(str::to_string),
        }
    }
}

/// Key binding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeybindConfig {
    /// Key combination (e.g., "W-S-q")
    pub key: String,
    pub actions: Vec<ActionConfig>,
}

/// Mouse binding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MousebindConfig {
    /// Decoration part or `Client`, `Frame`, `Root`
    pub context: String,
    /// `Left`, `Middle` or `Right`
    pub button: String,
    /// `Press`, `Release`, `Click` or `Drag`
    pub event: String,
    pub actions: Vec<ActionConfig>,
}

fn keybind(key: &str, actions: Vec<ActionConfig>) -> KeybindConfig {
    KeybindConfig {
        key: key.to_string(),
        actions,
    }
}

fn mousebind(context: &str, button: &str, event: &str, actions: Vec<ActionConfig>) -> MousebindConfig {
    MousebindConfig {
        context: context.to_string(),
        button: button.to_string(),
        event: event.to_string(),
        actions,
    }
}

/// Generate default key bindings
fn default_keybinds() -> Vec<KeybindConfig> {
    let a = ActionConfig::new;
    vec![
        keybind("A-Tab", vec![a("NextWindow", None)]),
        keybind("A-S-Tab", vec![a("PreviousWindow", None)]),
        keybind("W-Return", vec![a("Execute", Some("foot"))]),
        keybind("A-F4", vec![a("Close", None)]),
        keybind("W-a", vec![a("ToggleMaximize", None)]),
        keybind("W-f", vec![a("ToggleFullscreen", None)]),
        keybind("A-Left", vec![a("MoveToEdge", Some("left"))]),
        keybind("A-Right", vec![a("MoveToEdge", Some("right"))]),
        keybind("A-Up", vec![a("MoveToEdge", Some("up"))]),
        keybind("A-Down", vec![a("MoveToEdge", Some("down"))]),
        keybind("W-Left", vec![a("SnapToEdge", Some("left"))]),
        keybind("W-Right", vec![a("SnapToEdge", Some("right"))]),
        keybind("W-Up", vec![a("SnapToEdge", Some("up"))]),
        keybind("W-Down", vec![a("SnapToEdge", Some("down"))]),
        keybind("A-space", vec![a("ShowMenu", Some(crate::menu::CLIENT_MENU))]),
        keybind("C-A-Left", vec![a("GoToDesktop", Some("left"))]),
        keybind("C-A-Right", vec![a("GoToDesktop", Some("right"))]),
        keybind("W-S-Left", vec![a("SendToDesktop", Some("left"))]),
        keybind("W-S-Right", vec![a("SendToDesktop", Some("right"))]),
    ]
}

/// Generate default mouse bindings
fn default_mousebinds() -> Vec<MousebindConfig> {
    let a = ActionConfig::new;
    let focus_raise = || vec![a("Focus", None), a("Raise", None)];
    let mut binds = vec![
        mousebind("Titlebar", "Left", "Press", focus_raise()),
        mousebind("Titlebar", "Left", "Drag", vec![a("Move", None)]),
        mousebind("Client", "Left", "Press", focus_raise()),
        mousebind("Close", "Left", "Click", vec![a("Close", None)]),
        mousebind("Iconify", "Left", "Click", vec![a("Iconify", None)]),
        mousebind("Maximize", "Left", "Click", vec![a("ToggleMaximize", None)]),
        mousebind(
            "WindowMenu",
            "Left",
            "Click",
            vec![a("ShowMenu", Some(crate::menu::CLIENT_MENU))],
        ),
        mousebind(
            "Titlebar",
            "Right",
            "Press",
            vec![a("Focus", None), a("ShowMenu", Some(crate::menu::CLIENT_MENU))],
        ),
        mousebind(
            "Root",
            "Right",
            "Press",
            vec![a("ShowMenu", Some(crate::menu::ROOT_MENU))],
        ),
    ];
    for edge in ["Top", "Bottom", "Left", "Right", "TLCorner", "TRCorner", "BLCorner", "BRCorner"] {
        binds.push(mousebind(edge, "Left", "Drag", vec![a("Resize", None)]));
    }
    binds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workspaces.names, vec!["1", "2", "3", "4"]);
        assert!(!config.keybinds.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.theme, config.theme);
        assert_eq!(parsed.keybinds.len(), config.keybinds.len());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml("[placement]\ngap = 10\n").unwrap();
        assert_eq!(config.placement.gap, 10);
        assert_eq!(config.theme, ThemeConfig::default());
    }

    #[test]
    fn test_action_without_name() {
        let config = Config::from_toml(
            r#"
            [[keybinds]]
            key = "W-x"
            actions = [{ arg = "orphan" }]
            "#,
        )
        .unwrap();
        assert_eq!(config.keybinds.len(), 1);
        assert_eq!(config.keybinds[0].actions[0].name, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[workspaces]\nnames = [\"web\", \"code\"]").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.workspaces.names, vec!["web", "code"]);
    }

    #[test]
    fn test_load_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[theme\nbroken").unwrap();
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_binding() {
        let mut config = Config::default();
        config.keybinds.push(keybind("X-q", vec![]));
        assert!(matches!(config.validate(), Err(ConfigError::Binding(_))));

        let mut config = Config::default();
        config.workspaces.names.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoWorkspaces)));
    }
}
