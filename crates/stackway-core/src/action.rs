//! User-level actions.
//!
//! [`ActionKind`] and its name table come from a single macro invocation,
//! so every kind has exactly one name and no name can exist without a kind.

use tracing::error;

use crate::config::ActionConfig;

macro_rules! action_kinds {
    ($($kind:ident),+ $(,)?) => {
        /// Closed set of actions a binding can trigger.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ActionKind {
            $($kind),+
        }

        impl ActionKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [ActionKind] = &[$(ActionKind::$kind),+];

            /// Canonical name as written in configuration.
            pub const fn name(self) -> &'static str {
                match self {
                    $(ActionKind::$kind => stringify!($kind)),+
                }
            }
        }
    };
}

action_kinds! {
    NoOp,
    Close,
    Debug,
    Execute,
    Exit,
    MoveToEdge,
    SnapToEdge,
    NextWindow,
    PreviousWindow,
    Reconfigure,
    ShowMenu,
    ToggleMaximize,
    ToggleFullscreen,
    ToggleDecorations,
    ToggleAlwaysOnTop,
    Focus,
    Iconify,
    Move,
    Raise,
    Resize,
    GoToDesktop,
    SendToDesktop,
}

impl ActionKind {
    /// Look up a kind by name, ignoring case. Unknown names yield `NoOp`.
    pub fn from_name(name: &str) -> Self {
        match Self::ALL.iter().find(|k| k.name().eq_ignore_ascii_case(name)) {
            Some(&kind) => kind,
            None => {
                error!("Invalid action name: {}", name);
                Self::NoOp
            }
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of an action list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub arg: Option<String>,
}

impl Action {
    /// Build an action from its configured name. Construction never fails:
    /// a missing or unknown name produces a `NoOp`.
    pub fn new(name: Option<&str>, arg: Option<String>) -> Self {
        let kind = match name {
            Some(name) => ActionKind::from_name(name),
            None => {
                error!("Missing name for action");
                ActionKind::NoOp
            }
        };
        Self { kind, arg }
    }

    pub fn with_arg(kind: ActionKind, arg: impl Into<String>) -> Self {
        Self {
            kind,
            arg: Some(arg.into()),
        }
    }
}

impl From<ActionKind> for Action {
    fn from(kind: ActionKind) -> Self {
        Self { kind, arg: None }
    }
}

/// Ordered actions; list order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionList {
    actions: Vec<Action>,
}

impl ActionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(actions: &[ActionConfig]) -> Self {
        actions
            .iter()
            .map(|a| Action::new(a.name.as_deref(), a.arg.clone()))
            .collect()
    }

    pub fn push(&mut self, action: impl Into<Action>) {
        self.actions.push(action.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<Action> for ActionList {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ActionList {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
