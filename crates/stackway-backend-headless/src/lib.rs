//! Stackway Headless Backend — Adapter between scripted clients and stackway-core.
//!
//! This crate:
//! - Owns the protocol-side objects: in-process clients that play the
//!   client half of each surface.
//! - Translates client notifications into `CoreEvent`s, feeds them to `Core`.
//! - Applies returned `CoreAction`s: keyboard focus, the foreign-toplevel
//!   list, spawning, reload and exit.
//!
//! Clients are cooperative. They acknowledge every configure with a commit
//! of the requested size and go away when asked to close.

pub mod client;
pub mod script;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::PathBuf;
use std::process::Command as ProcessCommand;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use stackway_core::action::{Action, ActionList};
use stackway_core::config::Config;
use stackway_core::input::{KeyCombo, MouseButton};
use stackway_core::shell::{ShellId, SurfaceId};
use stackway_core::state::{Geometry, ResizeEdges};
use stackway_core::{Core, CoreAction, CoreEvent, ShellEvent};

use client::{Client, HeadlessToplevel, ToplevelState};
pub use script::Step;

/// Client commits can trigger new configures; stop settling after this many
/// rounds.
const MAX_SETTLE_ROUNDS: usize = 16;

/// Entry of the foreign-toplevel list, as a panel would see it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToplevelEntry {
    pub handle: u64,
    pub view: u64,
    pub title: String,
    pub app_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    pub id: u64,
    pub title: String,
    pub app_id: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub workspace: String,
    pub mapped: bool,
    pub minimized: bool,
    pub maximized: bool,
    pub fullscreen: bool,
}

/// State of a session after replay, bottom of the stack first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub workspace: String,
    pub focused_surface: Option<u64>,
    pub views: Vec<ViewSummary>,
    pub toplevels: Vec<ToplevelEntry>,
}

/// The backend adapter.
///
/// Owns the clients and the core engine.
pub struct HeadlessBackend {
    /// The protocol-agnostic core.
    pub core: Core,
    /// Shell id → client.
    clients: HashMap<u64, Client>,
    /// Foreign-toplevel list keyed by handle.
    toplevels: BTreeMap<u64, ToplevelEntry>,
    focused_surface: Option<SurfaceId>,
    config_path: Option<PathBuf>,
    spawn_processes: bool,
    spawned: Vec<String>,
    running: bool,
}

impl HeadlessBackend {
    pub fn new(config: Config) -> Self {
        Self {
            core: Core::new(config),
            clients: HashMap::new(),
            toplevels: BTreeMap::new(),
            focused_surface: None,
            config_path: None,
            spawn_processes: true,
            spawned: Vec::new(),
            running: true,
        }
    }

    /// File re-read on `Reconfigure`; `None` searches the standard locations.
    #[must_use]
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Record `Execute` commands without running them.
    pub fn set_spawn_processes(&mut self, spawn: bool) {
        self.spawn_processes = spawn;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn focused_surface(&self) -> Option<SurfaceId> {
        self.focused_surface
    }

    pub fn toplevels(&self) -> impl Iterator<Item = &ToplevelEntry> {
        self.toplevels.values()
    }

    /// Commands passed to `SpawnProcess`, oldest first.
    pub fn spawned(&self) -> &[String] {
        &self.spawned
    }

    pub fn client(&self, id: u64) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// Replay `steps` until the script ends or the core asks to exit.
    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        info!("Replaying {} steps", steps.len());
        for (index, step) in steps.iter().enumerate() {
            if !self.running {
                info!("Exit requested; skipping {} steps", steps.len() - index);
                break;
            }
            self.step(step)
                .with_context(|| format!("Step {} ({:?}) failed", index + 1, step))?;
        }
        info!("Replay finished");
        Ok(())
    }

    /// Perform one step, apply what the core asked for and let clients
    /// answer outstanding configures.
    pub fn step(&mut self, step: &Step) -> Result<()> {
        let actions = match step {
            Step::Output {
                id,
                name,
                x,
                y,
                width,
                height,
            } => self.core.handle_event(CoreEvent::OutputAdded {
                id: *id,
                name: name.clone().unwrap_or_else(|| format!("HEADLESS-{id}")),
                geometry: Geometry::new(*x, *y, *width, *height),
                usable_area: None,
            }),
            Step::RemoveOutput { id } => self.core.handle_event(CoreEvent::OutputRemoved { id: *id }),
            Step::Toplevel {
                id,
                width,
                height,
                title,
                app_id,
                server_side,
                fullscreen,
            } => {
                let state = Rc::new(RefCell::new(ToplevelState {
                    id: *id,
                    size: (*width, *height),
                    title: title.clone(),
                    app_id: app_id.clone(),
                    fullscreen_requested: *fullscreen,
                    server_side: *server_side,
                    ..ToplevelState::default()
                }));
                self.add_client(*id, Client::Toplevel(Rc::clone(&state)))?;
                self.core
                    .handle_event(CoreEvent::NewXdgToplevel(Box::new(HeadlessToplevel(state))))
            }
            #[cfg(feature = "xwayland")]
            Step::X11 {
                id,
                x,
                y,
                width,
                height,
                title,
                class,
                override_redirect,
                undecorated,
                wants_focus,
            } => {
                use client::{HeadlessX11, X11State};
                use stackway_core::shell::X11Decorations;

                let state = Rc::new(RefCell::new(X11State {
                    id: *id,
                    geometry: Geometry::new(*x, *y, *width, *height),
                    override_redirect: *override_redirect,
                    title: title.clone(),
                    class: class.clone(),
                    decorations: if *undecorated {
                        X11Decorations::NoBorder
                    } else {
                        X11Decorations::All
                    },
                    wants_focus: *wants_focus,
                    ..X11State::default()
                }));
                self.add_client(*id, Client::X11(Rc::clone(&state)))?;
                self.core
                    .handle_event(CoreEvent::NewXwaylandSurface(Box::new(HeadlessX11(state))))
            }
            Step::Map { id } => self.notify(*id, ShellEvent::Map)?,
            Step::Unmap { id } => self.notify(*id, ShellEvent::Unmap)?,
            Step::Destroy { id } => {
                let actions = self.notify(*id, ShellEvent::Destroy)?;
                self.clients.remove(id);
                actions
            }
            Step::Commit { id } => {
                let (width, height) = self.client_for(*id)?.size();
                self.core.handle_event(CoreEvent::Commit {
                    surface: SurfaceId(*id),
                    width,
                    height,
                })
            }
            Step::Title { id, title } => {
                self.client_for(*id)?.set_title(title.clone());
                self.notify(*id, ShellEvent::SetTitle)?
            }
            Step::Fullscreen { id, enable } => {
                self.client_for(*id)?.request_fullscreen(*enable);
                self.notify(*id, ShellEvent::RequestFullscreen(*enable))?
            }
            Step::Minimize { id, enable } => {
                self.client_for(*id)?.request_minimize(*enable);
                self.notify(*id, ShellEvent::RequestMinimize(*enable))?
            }
            Step::Maximize { id } => self.notify(*id, ShellEvent::RequestMaximize)?,
            Step::Activate { id } => self.notify(*id, ShellEvent::RequestActivate)?,
            Step::Configure {
                id,
                x,
                y,
                width,
                height,
            } => self.notify(
                *id,
                ShellEvent::RequestConfigure(Geometry::new(*x, *y, *width, *height)),
            )?,
            #[cfg(feature = "xwayland")]
            Step::OverrideRedirect { id, enable } => {
                self.client_for(*id)?.set_override_redirect(*enable);
                self.notify(*id, ShellEvent::SetOverrideRedirect)?
            }
            Step::Pointer { x, y } => self
                .core
                .handle_event(CoreEvent::PointerMotion { x: *x, y: *y }),
            Step::Button { button, pressed } => {
                let button = MouseButton::from_name(button)?;
                self.core.handle_pointer_button(button.code(), *pressed)
            }
            Step::Key { combo } => {
                let combo = KeyCombo::parse(combo)?;
                self.core.handle_key(&combo)
            }
            Step::Action { name, arg } => {
                let list: ActionList = std::iter::once(Action::new(Some(name.as_str()), arg.clone())).collect();
                self.core.run_actions(None, Some(&list), ResizeEdges::empty())
            }
            Step::EndCycle => self.core.end_cycle(),
        };

        self.apply_actions(actions);
        self.settle_clients();
        Ok(())
    }

    fn add_client(&mut self, id: u64, client: Client) -> Result<()> {
        if self.clients.contains_key(&id) {
            bail!("Client {id} already exists");
        }
        self.clients.insert(id, client);
        Ok(())
    }

    fn client_for(&self, id: u64) -> Result<&Client> {
        self.clients
            .get(&id)
            .with_context(|| format!("No client {id}"))
    }

    fn notify(&mut self, id: u64, event: ShellEvent) -> Result<Vec<CoreAction>> {
        self.client_for(id)?;
        Ok(self.core.handle_event(CoreEvent::Shell {
            id: ShellId(id),
            event,
        }))
    }

    /// Play the client side: commit acknowledged configures and close
    /// clients that were asked to.
    fn settle_clients(&mut self) {
        for _ in 0..MAX_SETTLE_ROUNDS {
            let mut ids: Vec<u64> = self.clients.keys().copied().collect();
            ids.sort_unstable();

            let mut settled = true;
            for id in ids {
                let Some(client) = self.clients.get(&id).cloned() else {
                    continue;
                };
                if client.take_close_request() {
                    debug!("Client {} closes", id);
                    settled = false;
                    let mut actions = self.core.handle_event(CoreEvent::Shell {
                        id: ShellId(id),
                        event: ShellEvent::Unmap,
                    });
                    actions.extend(self.core.handle_event(CoreEvent::Shell {
                        id: ShellId(id),
                        event: ShellEvent::Destroy,
                    }));
                    self.clients.remove(&id);
                    self.apply_actions(actions);
                } else if let Some((width, height)) = client.take_configure() {
                    settled = false;
                    let actions = self.core.handle_event(CoreEvent::Commit {
                        surface: SurfaceId(id),
                        width,
                        height,
                    });
                    self.apply_actions(actions);
                }
            }
            if settled {
                return;
            }
        }
        warn!("Clients still busy after {} rounds", MAX_SETTLE_ROUNDS);
    }

    /// Apply a list of core actions to the client world.
    pub fn apply_actions(&mut self, actions: Vec<CoreAction>) {
        let mut queue: VecDeque<CoreAction> = actions.into();
        while let Some(action) = queue.pop_front() {
            match action {
                CoreAction::KeyboardFocus { surface } => {
                    debug!("Keyboard focus: {:?}", surface);
                    self.focused_surface = surface;
                }
                CoreAction::BeginInteractive { view, mode, edges } => {
                    debug!("Interactive {:?} of {} from {:?}", mode, view, edges);
                }
                CoreAction::OpenMenu { menu, x, y } => {
                    info!("Menu {} at {},{}", menu, x, y);
                }
                CoreAction::UpdateOsd { view } => {
                    debug!("Window switcher: {:?}", view);
                }
                CoreAction::WorkspaceChanged { active } => {
                    info!("Workspace changed: {}", active);
                }
                CoreAction::SpawnProcess { command } => {
                    info!("Spawning: {}", command);
                    if self.spawn_processes {
                        if let Err(e) = ProcessCommand::new("sh").arg("-c").arg(&command).spawn() {
                            error!("Failed to spawn '{}': {}", command, e);
                        }
                    }
                    self.spawned.push(command);
                }
                CoreAction::ReloadConfig => {
                    info!("Reloading configuration");
                    match Config::load(self.config_path.as_deref()) {
                        Ok(config) => queue.extend(self.core.reload_config(config)),
                        Err(e) => error!("Failed to reload config: {}", e),
                    }
                }
                CoreAction::Exit => {
                    info!("Exit requested by core");
                    self.running = false;
                }
                CoreAction::DumpScene => {
                    info!(
                        "{} views, {} unmanaged, {} toplevels",
                        self.core.state.views.len(),
                        self.core.state.unmanaged.len(),
                        self.toplevels.len()
                    );
                }
                CoreAction::PostNoMemory { surface } => {
                    warn!("Out of memory for {}", surface);
                }
                CoreAction::ToplevelCreated { handle, view } => {
                    self.toplevels.insert(
                        handle.0,
                        ToplevelEntry {
                            handle: handle.0,
                            view: view.0,
                            ..ToplevelEntry::default()
                        },
                    );
                }
                CoreAction::ToplevelTitle { handle, title } => {
                    if let Some(entry) = self.toplevels.get_mut(&handle.0) {
                        entry.title = title;
                    }
                }
                CoreAction::ToplevelAppId { handle, app_id } => {
                    if let Some(entry) = self.toplevels.get_mut(&handle.0) {
                        entry.app_id = app_id;
                    }
                }
                CoreAction::ToplevelDestroyed { handle } => {
                    self.toplevels.remove(&handle.0);
                }
            }
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let state = &self.core.state;
        let workspace_name = |id| {
            state
                .workspaces
                .get(id)
                .map(|ws| ws.name.clone())
                .unwrap_or_default()
        };
        let views = state
            .stack
            .iter()
            .filter_map(|id| state.views.get(id))
            .map(|v| ViewSummary {
                id: v.id.0,
                title: v.title.clone(),
                app_id: v.app_id.clone(),
                x: v.geometry.x,
                y: v.geometry.y,
                width: v.geometry.width,
                height: v.geometry.height,
                workspace: workspace_name(v.workspace),
                mapped: v.is_mapped(),
                minimized: v.is_minimized(),
                maximized: v.is_maximized(),
                fullscreen: v.is_fullscreen(),
            })
            .collect();

        SessionSummary {
            workspace: state.workspaces.current().name.clone(),
            focused_surface: self.focused_surface.map(|s| s.0),
            views,
            toplevels: self.toplevels.values().cloned().collect(),
        }
    }
}
