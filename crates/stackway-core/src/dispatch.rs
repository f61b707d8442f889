//! Action dispatcher.
//!
//! Runs an [`ActionList`] step by step. The target view is resolved again
//! before every step, since an earlier step may have moved focus.

use tracing::{debug, error, info};

use crate::action::{Action, ActionKind, ActionList};
use crate::desktop::CycleDirection;
use crate::event::CoreAction;
use crate::menu::CLIENT_MENU;
use crate::ssd::{Button, SsdPart};
use crate::state::{GrabOperation, ResizeEdges};
use crate::view::ViewId;
use crate::Core;

impl Core {
    pub(crate) fn dispatch(
        &mut self,
        activator: Option<ViewId>,
        actions: Option<&ActionList>,
        resize_edges: ResizeEdges,
    ) {
        let Some(actions) = actions else {
            error!("empty actions");
            return;
        };

        for action in actions {
            let view = activator
                .filter(|id| self.state.views.contains_key(id))
                .or(self.state.focus.focused_view);
            debug!("Action {} on {:?}", action.kind, view);
            self.run_action(view, action, resize_edges);
        }
    }

    fn run_action(&mut self, view: Option<ViewId>, action: &Action, resize_edges: ResizeEdges) {
        let arg = action.arg.as_deref();

        match action.kind {
            ActionKind::NoOp => {
                error!("Not executing unknown action with arg {:?}", arg);
            }
            ActionKind::Close => {
                if let Some(view) = view.and_then(|id| self.state.views.get_mut(&id)) {
                    view.shell.close();
                }
            }
            ActionKind::Debug => self.dump(),
            ActionKind::Execute => {
                let Some(command) = arg else {
                    error!("Missing argument for Execute");
                    return;
                };
                self.emit(CoreAction::SpawnProcess {
                    command: expand_shell_variables(command),
                });
            }
            ActionKind::Exit => {
                self.should_exit = true;
                self.emit(CoreAction::Exit);
            }
            ActionKind::MoveToEdge | ActionKind::SnapToEdge => {
                let Some(direction) = arg else {
                    error!("Missing argument for {}", action.kind);
                    return;
                };
                let Some(view) = view else {
                    return;
                };
                if action.kind == ActionKind::MoveToEdge {
                    self.move_to_edge(view, direction);
                } else {
                    self.snap_to_edge(view, direction);
                }
            }
            ActionKind::NextWindow | ActionKind::PreviousWindow => {
                let direction = if action.kind == ActionKind::NextWindow {
                    CycleDirection::Forward
                } else {
                    CycleDirection::Backward
                };
                let next = self.cycle_view(self.state.focus.cycle_view, direction);
                self.state.focus.cycle_view = next;
                self.emit(CoreAction::UpdateOsd { view: next });
            }
            ActionKind::Reconfigure => self.emit(CoreAction::ReloadConfig),
            ActionKind::ShowMenu => {
                let Some(menu) = arg else {
                    error!("Missing argument for ShowMenu");
                    return;
                };
                self.show_menu(view, menu);
            }
            ActionKind::ToggleMaximize => {
                if let Some(view) = view {
                    self.toggle_maximize(view);
                }
            }
            ActionKind::ToggleFullscreen => {
                if let Some(view) = view {
                    self.toggle_fullscreen(view);
                }
            }
            ActionKind::ToggleDecorations => {
                if let Some(view) = view {
                    self.toggle_decorations(view);
                }
            }
            ActionKind::ToggleAlwaysOnTop => {
                if let Some(view) = view {
                    self.toggle_always_on_top(view);
                }
            }
            ActionKind::Focus => {
                if let Some(view) = self.view_at_pointer() {
                    self.focus_and_activate(view);
                }
            }
            ActionKind::Iconify => {
                if let Some(view) = view {
                    self.minimize(view, true);
                }
            }
            ActionKind::Move => {
                if let Some(view) = self.view_at_pointer() {
                    self.begin_interactive(view, GrabOperation::Move, ResizeEdges::empty());
                }
            }
            ActionKind::Raise => {
                if let Some(view) = view {
                    self.move_to_front(view);
                }
            }
            ActionKind::Resize => {
                if let Some(view) = self.view_at_pointer() {
                    self.begin_interactive(view, GrabOperation::Resize, resize_edges);
                }
            }
            ActionKind::GoToDesktop => {
                let current = self.state.workspaces.current_id();
                match arg.and_then(|name| self.state.workspaces.find(current, name)) {
                    Some(target) => self.switch_workspace(target),
                    None => debug!("No workspace {:?}", arg),
                }
            }
            ActionKind::SendToDesktop => {
                let Some(id) = view else {
                    return;
                };
                let Some(origin) = self.state.views.get(&id).map(|v| v.workspace) else {
                    return;
                };
                match arg.and_then(|name| self.state.workspaces.find(origin, name)) {
                    Some(target) => self.send_to_workspace(id, target),
                    None => debug!("No workspace {:?}", arg),
                }
            }
        }
    }

    /// Open `name` and remember which view it acts on.
    ///
    /// The window menu opens at the view's corner unless it was invoked from
    /// the titlebar itself; every other menu opens at the pointer.
    fn show_menu(&mut self, view: Option<ViewId>, name: &str) {
        if self.state.menus.get(name).is_none() {
            error!("No menu named {}", name);
            return;
        }
        let (px, py) = self.state.pointer_position;
        let pointer = (px.floor() as i32, py.floor() as i32);

        let (x, y) = if name == CLIENT_MENU {
            let Some(geometry) = view.and_then(|id| self.state.views.get(&id)).map(|v| v.geometry)
            else {
                return;
            };
            let part = view.map_or(SsdPart::None, |id| self.part_at(id));
            if part == SsdPart::Button(Button::WindowMenu) || !part.is_titlebar() {
                (geometry.x, geometry.y)
            } else {
                pointer
            }
        } else {
            pointer
        };

        if let Some(menu) = self.state.menus.get_mut(name) {
            menu.triggered_by_view = view;
        }
        self.emit(CoreAction::OpenMenu {
            menu: name.to_string(),
            x,
            y,
        });
    }

    fn dump(&mut self) {
        info!(
            "workspaces: current {} of {}",
            self.state.workspaces.current().name,
            self.state.workspaces.len()
        );
        for id in self.state.stack.iter().rev() {
            if let Some(view) = self.state.views.get(id) {
                info!(
                    "{} {:?} {:?} {:?} ws={} title={:?} app_id={:?}",
                    view.id,
                    view.kind(),
                    view.geometry,
                    view.flags,
                    view.workspace,
                    view.title,
                    view.app_id
                );
            }
        }
        for unmanaged in self.state.unmanaged.values() {
            info!(
                "{} {:?} mapped={}",
                unmanaged.id,
                unmanaged.geometry(),
                unmanaged.mapped
            );
        }
        self.emit(CoreAction::DumpScene);
    }
}

/// Expand `$VAR`, `${VAR}` and a leading `~` the way a shell would.
///
/// Unset variables expand to nothing. A `$` not followed by a name is kept.
pub fn expand_shell_variables(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    if let Some(tail) = input.strip_prefix('~') {
        if tail.is_empty() || tail.starts_with('/') {
            if let Some(home) = dirs::home_dir() {
                out.push_str(&home.to_string_lossy());
                rest = tail;
            }
        }
    }

    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let name: String = if chars.peek() == Some(&'{') {
            chars.next();
            chars.by_ref().take_while(|&c| c != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if !(c.is_ascii_alphanumeric() || c == '_') {
                    break;
                }
                name.push(c);
                chars.next();
            }
            name
        };
        if name.is_empty() {
            out.push('$');
            continue;
        }
        out.push_str(&std::env::var(&name).unwrap_or_default());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_variables() {
        std::env::set_var("STACKWAY_TEST_TERM", "foot");
        assert_eq!(expand_shell_variables("$STACKWAY_TEST_TERM -e top"), "foot -e top");
        assert_eq!(expand_shell_variables("${STACKWAY_TEST_TERM}x"), "footx");
        assert_eq!(expand_shell_variables("a $STACKWAY_TEST_UNSET b"), "a  b");
    }

    #[test]
    fn test_lone_dollar_is_kept() {
        assert_eq!(expand_shell_variables("echo $ 5"), "echo $ 5");
        assert_eq!(expand_shell_variables("cost$"), "cost$");
    }

    #[test]
    fn test_tilde_only_at_start() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(
            expand_shell_variables("~/bin/run"),
            format!("{}/bin/run", home.display())
        );
        assert_eq!(expand_shell_variables("a~b"), "a~b");
        assert_eq!(expand_shell_variables("~user"), "~user");
    }
}
