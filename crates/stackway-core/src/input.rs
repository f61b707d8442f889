//! Key and mouse bindings.
//!
//! Keys are written as `W-S-q`: modifier letters (`S` shift, `C` control,
//! `A` alt, `W` logo) joined to the key name with dashes.

use std::ops::ControlFlow;

use bitflags::bitflags;
use thiserror::Error;
use tracing::warn;

use crate::action::ActionList;
use crate::config::Config;
use crate::ssd::{Button, SsdPart};
use crate::state::ResizeEdges;

/// Input handling errors
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid key: {0}")]
    Key(String),
    #[error("Invalid modifier: {0}")]
    Modifier(String),
    #[error("Invalid mouse button: {0}")]
    Button(String),
    #[error("Invalid mouse context: {0}")]
    Context(String),
    #[error("Invalid mouse event: {0}")]
    Event(String),
}

bitflags! {
    /// Keyboard modifiers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const LOGO  = 0b1000;
    }
}

impl Modifiers {
    fn from_letter(letter: &str) -> Result<Self, InputError> {
        match letter {
            "S" => Ok(Self::SHIFT),
            "C" => Ok(Self::CTRL),
            "A" => Ok(Self::ALT),
            "W" => Ok(Self::LOGO),
            _ => Err(InputError::Modifier(letter.to_string())),
        }
    }
}

/// Modifiers plus a key name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    /// Key name, lowercased.
    pub key: String,
}

impl KeyCombo {
    pub fn parse(s: &str) -> Result<Self, InputError> {
        let mut parts: Vec<&str> = s.split('-').collect();
        // "A--" binds the minus key.
        if s.ends_with("--") {
            parts.truncate(parts.len().saturating_sub(2));
            parts.push("-");
        }
        let key = match parts.pop() {
            Some(k) if !k.is_empty() => k.to_lowercase(),
            _ => return Err(InputError::Key(s.to_string())),
        };

        let mut modifiers = Modifiers::empty();
        for part in parts {
            modifiers |= Modifiers::from_letter(part)?;
        }
        Ok(Self { modifiers, key })
    }
}

impl std::fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (flag, letter) in [
            (Modifiers::CTRL, "C"),
            (Modifiers::ALT, "A"),
            (Modifiers::SHIFT, "S"),
            (Modifiers::LOGO, "W"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{letter}-")?;
            }
        }
        f.write_str(&self.key)
    }
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// From a Linux input event code (`BTN_LEFT` and friends).
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0x110 => Some(Self::Left),
            0x111 => Some(Self::Right),
            0x112 => Some(Self::Middle),
            _ => None,
        }
    }

    pub const fn code(self) -> u32 {
        match self {
            Self::Left => 0x110,
            Self::Right => 0x111,
            Self::Middle => 0x112,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, InputError> {
        match name.to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "middle" => Ok(Self::Middle),
            _ => Err(InputError::Button(name.to_string())),
        }
    }
}

/// Pointer event a mouse binding reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEvent {
    Press,
    Release,
    /// Release over the same view and part as the press.
    Click,
    /// First motion while the button is held.
    Drag,
}

impl MouseEvent {
    pub fn from_name(name: &str) -> Result<Self, InputError> {
        match name.to_lowercase().as_str() {
            "press" => Ok(Self::Press),
            "release" => Ok(Self::Release),
            "click" => Ok(Self::Click),
            "drag" => Ok(Self::Drag),
            _ => Err(InputError::Event(name.to_string())),
        }
    }
}

/// Where the pointer must be for a mouse binding to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseContext {
    /// Anywhere on a view, decorations included.
    Frame,
    Client,
    /// Titlebar, buttons included.
    Titlebar,
    Button(Button),
    /// A border side or corner, visible or in the resize extents.
    Edge(ResizeEdges),
    /// Desktop background.
    Root,
}

impl MouseContext {
    pub fn from_name(name: &str) -> Result<Self, InputError> {
        let edge = |e: ResizeEdges| -> Result<Self, InputError> { Ok(Self::Edge(e)) };
        match name.to_lowercase().as_str() {
            "frame" => Ok(Self::Frame),
            "client" => Ok(Self::Client),
            "titlebar" => Ok(Self::Titlebar),
            "root" => Ok(Self::Root),
            "windowmenu" => Ok(Self::Button(Button::WindowMenu)),
            "iconify" => Ok(Self::Button(Button::Iconify)),
            "maximize" => Ok(Self::Button(Button::Maximize)),
            "close" => Ok(Self::Button(Button::Close)),
            "top" => edge(ResizeEdges::TOP),
            "bottom" => edge(ResizeEdges::BOTTOM),
            "left" => edge(ResizeEdges::LEFT),
            "right" => edge(ResizeEdges::RIGHT),
            "tlcorner" => edge(ResizeEdges::TOP | ResizeEdges::LEFT),
            "trcorner" => edge(ResizeEdges::TOP | ResizeEdges::RIGHT),
            "blcorner" => edge(ResizeEdges::BOTTOM | ResizeEdges::LEFT),
            "brcorner" => edge(ResizeEdges::BOTTOM | ResizeEdges::RIGHT),
            _ => Err(InputError::Context(name.to_string())),
        }
    }

    /// Whether the context covers `part`. `on_view` tells a view was hit.
    pub fn matches(self, part: SsdPart, on_view: bool) -> bool {
        match self {
            Self::Root => !on_view,
            Self::Frame => on_view,
            Self::Client => part == SsdPart::Client,
            Self::Titlebar => part.is_titlebar(),
            Self::Button(button) => part == SsdPart::Button(button),
            Self::Edge(edges) => part.resize_edges() == Some(edges),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Keybind {
    pub combo: KeyCombo,
    pub actions: ActionList,
}

#[derive(Debug, Clone)]
pub struct Mousebind {
    pub context: MouseContext,
    pub button: MouseButton,
    pub event: MouseEvent,
    pub actions: ActionList,
}

/// All configured bindings.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pub keybinds: Vec<Keybind>,
    pub mousebinds: Vec<Mousebind>,
}

impl Bindings {
    /// Parse every binding, skipping invalid ones with a warning.
    pub fn from_config(config: &Config) -> Self {
        let mut bindings = Self::default();
        bindings.load(config, |e| {
            warn!("Ignoring binding: {}", e);
            ControlFlow::Continue(())
        });
        bindings
    }

    /// Parse every binding, failing on the first invalid one.
    pub fn try_from_config(config: &Config) -> Result<Self, InputError> {
        let mut bindings = Self::default();
        let mut failure = None;
        bindings.load(config, |e| {
            failure = Some(e);
            ControlFlow::Break(())
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(bindings),
        }
    }

    fn load(&mut self, config: &Config, mut on_error: impl FnMut(InputError) -> ControlFlow<()>) {
        for bind in &config.keybinds {
            match KeyCombo::parse(&bind.key) {
                Ok(combo) => self.keybinds.push(Keybind {
                    combo,
                    actions: ActionList::from_config(&bind.actions),
                }),
                Err(e) => {
                    if on_error(e).is_break() {
                        return;
                    }
                }
            }
        }
        for bind in &config.mousebinds {
            let parsed = MouseContext::from_name(&bind.context).and_then(|context| {
                Ok(Mousebind {
                    context,
                    button: MouseButton::from_name(&bind.button)?,
                    event: MouseEvent::from_name(&bind.event)?,
                    actions: ActionList::from_config(&bind.actions),
                })
            });
            match parsed {
                Ok(bind) => self.mousebinds.push(bind),
                Err(e) => {
                    if on_error(e).is_break() {
                        return;
                    }
                }
            }
        }
    }

    /// Actions bound to `combo`; the last matching binding wins.
    pub fn key(&self, combo: &KeyCombo) -> Option<&ActionList> {
        self.keybinds
            .iter()
            .rev()
            .find(|b| &b.combo == combo)
            .map(|b| &b.actions)
    }

    /// Mouse bindings matching a pointer event, in configuration order.
    pub fn mouse<'a>(
        &'a self,
        part: SsdPart,
        on_view: bool,
        button: MouseButton,
        event: MouseEvent,
    ) -> impl Iterator<Item = &'a Mousebind> + 'a {
        self.mousebinds.iter().filter(move |b| {
            b.button == button && b.event == event && b.context.matches(part, on_view)
        })
    }
}
