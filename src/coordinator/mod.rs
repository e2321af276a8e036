//! Single entry point of the switcher.
//!
//! The [`Coordinator`] owns the host, the live tree and every piece of
//! switcher state. Triggers are processed one at a time: a trigger enqueued
//! while another one runs waits in the [`TriggerQueue`] until it is done.

mod shortcuts;
mod trigger;

use egui::KeyboardShortcut;
use log::{debug, error, info};

use crate::command::{CommandHistory, TreeCommand};
use crate::config::SwitcherSettings;
use crate::engine::{DeactivateReason, Engine, EngineContext};
use crate::error::SwitchResult;
use crate::event::{EventBus, EventHandler, SwitchEvent};
use crate::host::{HostAdapter, PresetId};
use crate::item::{Binding, ItemId, ItemTree};
use crate::navigator::{Direction, Navigator};
use crate::persistence::{self, PersistenceResult, SettingsDocument};
use crate::setup::{ImportMode, SetupId, SetupStore};

pub use shortcuts::ShortcutIndex;
pub use trigger::{Trigger, TriggerQueue};

pub struct Coordinator<H: HostAdapter> {
    host: H,
    tree: ItemTree,
    engine: Engine,
    navigator: Navigator,
    setups: SetupStore,
    shortcuts: ShortcutIndex,
    settings: SwitcherSettings,
    history: CommandHistory,
    events: EventBus,
    queue: TriggerQueue,
}

impl<H: HostAdapter> Coordinator<H> {
    pub fn new(host: H, tree: ItemTree) -> Self {
        Self::with_state(host, tree, SetupStore::new(), SwitcherSettings::default())
    }

    /// Restore a coordinator from a persisted document
    pub fn from_document(host: H, document: SettingsDocument) -> Self {
        Self::with_state(host, document.tree, document.setups, document.settings)
    }

    fn with_state(host: H, tree: ItemTree, setups: SetupStore, settings: SwitcherSettings) -> Self {
        let shortcuts = ShortcutIndex::build(&tree);
        Self {
            host,
            tree,
            engine: Engine::new(),
            navigator: Navigator::new(),
            setups,
            shortcuts,
            settings,
            history: CommandHistory::new(),
            events: EventBus::new(),
            queue: TriggerQueue::new(),
        }
    }

    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn active_item(&self) -> Option<ItemId> {
        self.engine.active_item()
    }

    pub fn setups(&self) -> &SetupStore {
        &self.setups
    }

    pub fn shortcuts(&self) -> &ShortcutIndex {
        &self.shortcuts
    }

    pub fn settings(&self) -> &SwitcherSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SwitcherSettings {
        &mut self.settings
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Handle for enqueueing triggers from callbacks
    pub fn queue(&self) -> TriggerQueue {
        self.queue.clone()
    }

    /// Process a trigger, then every trigger enqueued meanwhile.
    ///
    /// Only the outcome of `trigger` itself is returned; failures of queued
    /// triggers are logged.
    pub fn trigger(&mut self, trigger: Trigger) -> SwitchResult<()> {
        let result = self.dispatch(trigger);
        while let Some(queued) = self.queue.pop() {
            if let Err(err) = self.dispatch(queued.clone()) {
                error!("queued trigger {queued:?} failed: {err}");
            }
        }
        result
    }

    fn dispatch(&mut self, trigger: Trigger) -> SwitchResult<()> {
        debug!("trigger {trigger:?}");
        match trigger {
            Trigger::Shortcut(shortcut) => match self.shortcuts.lookup(&shortcut) {
                Some(Binding::Brush(id)) => self.toggle(id),
                Some(Binding::GroupNext(group)) => self.navigate(group, Direction::Next),
                Some(Binding::GroupPrevious(group)) => self.navigate(group, Direction::Previous),
                None => {
                    debug!("shortcut {shortcut:?} is not bound");
                    Ok(())
                }
            },
            Trigger::Picker(id) => self.toggle(id),
            Trigger::Toolbar => self.toolbar(),
            Trigger::Next(group) => self.navigate(group, Direction::Next),
            Trigger::Previous(group) => self.navigate(group, Direction::Previous),
            Trigger::HostPresetChanged(preset) => {
                self.host_preset_changed(preset);
                Ok(())
            }
            Trigger::HostToolChanged { activated } => {
                let (engine, mut ctx) = self.split();
                engine.on_tool_changed(&mut ctx, activated)
            }
            Trigger::HostEraserModeChanged(eraser_active) => {
                let (engine, mut ctx) = self.split();
                engine.enforce_eraser_mode(&mut ctx, eraser_active).map(|_| ())
            }
            Trigger::Deactivate => {
                self.deactivate(DeactivateReason::ExplicitToggleOff);
                Ok(())
            }
            Trigger::Shutdown => {
                self.deactivate(DeactivateReason::PluginDisabledOrClosing);
                Ok(())
            }
        }
    }

    fn split(&mut self) -> (&mut Engine, EngineContext<'_, H>) {
        (
            &mut self.engine,
            EngineContext::new(&mut self.tree, &mut self.host, &self.events),
        )
    }

    fn deactivate(&mut self, reason: DeactivateReason) -> Option<ItemId> {
        let (engine, mut ctx) = self.split();
        engine.deactivate(&mut ctx, reason)
    }

    fn toggle(&mut self, id: ItemId) -> SwitchResult<()> {
        let (engine, mut ctx) = self.split();
        if let Some(activated) = engine.toggle(&mut ctx, id)? {
            self.record_activation(activated);
        }
        Ok(())
    }

    fn toolbar(&mut self) -> SwitchResult<()> {
        if self.engine.active().is_some() {
            self.deactivate(DeactivateReason::ExplicitToggleOff);
            return Ok(());
        }
        let Some(target) = self.settings.default_brush(&self.tree).map(|brush| brush.id) else {
            return Ok(());
        };
        let (engine, mut ctx) = self.split();
        let activated = engine.activate(&mut ctx, target)?;
        self.record_activation(activated);
        Ok(())
    }

    /// Step through a group. The resolved brush is always left active.
    fn navigate(&mut self, group: ItemId, direction: Direction) -> SwitchResult<()> {
        let (brush, index) = self.navigator.step(&mut self.tree, group, direction)?;
        self.events.emit(SwitchEvent::GroupCursorChanged {
            group,
            index: Some(index),
        });
        self.leave_groups(Some(brush));
        self.navigator.enter(group);

        if !self.engine.is_active(brush) {
            let (engine, mut ctx) = self.split();
            engine.activate(&mut ctx, brush)?;
        }
        self.record_activation(brush);
        Ok(())
    }

    fn host_preset_changed(&mut self, preset: Option<PresetId>) {
        let Some(active) = self.engine.active() else {
            return;
        };
        // queued notifications may describe the engine's own selections: trust the host's current state
        let live = self.host.active_preset();
        if preset.as_ref() == Some(&active.preset) || live.as_ref() == Some(&active.preset) {
            debug!("preset notification {preset:?} matches the active brush, ignored");
            return;
        }
        info!("host selected preset {preset:?} on its own");
        self.deactivate(DeactivateReason::HostSelectedDifferentPreset);
        self.leave_groups(None);
    }

    fn record_activation(&mut self, brush: ItemId) {
        self.settings.last_selected = Some(brush);
        self.leave_groups(Some(brush));
    }

    fn leave_groups(&mut self, activated: Option<ItemId>) {
        if let Some(group) = self.navigator.note_activation(&mut self.tree, activated) {
            self.events.emit(SwitchEvent::GroupCursorChanged { group, index: None });
        }
    }

    /// Bind `shortcut` to `binding`, or clear it with `None`.
    ///
    /// A shortcut owned by another binding is rejected and left untouched.
    pub fn bind_shortcut(&mut self, binding: Binding, shortcut: Option<KeyboardShortcut>) -> SwitchResult<()> {
        self.edit(TreeCommand::SetShortcut { binding, shortcut })
    }

    /// Apply an edit to the live tree, recording it for undo
    pub fn edit(&mut self, command: TreeCommand) -> SwitchResult<()> {
        self.shortcuts.check(&command.incoming_bindings())?;
        // surface errors before the active brush is touched
        command.clone().execute(&mut self.tree.clone())?;

        self.release_removed(&command);
        self.history.execute(command, &mut self.tree)?;
        self.after_edit();
        Ok(())
    }

    /// Undo the last edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> SwitchResult<bool> {
        if let Some(command) = self.history.peek_undo() {
            let command = command.clone();
            self.shortcuts.check(&command.incoming_bindings())?;
            self.release_removed(&command);
        }
        let undone = self.history.undo(&mut self.tree)?;
        self.after_edit();
        Ok(undone)
    }

    /// Redo the last undone edit. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> SwitchResult<bool> {
        if let Some(command) = self.history.peek_redo() {
            let command = command.clone();
            self.shortcuts.check(&command.incoming_bindings())?;
            self.release_removed(&command);
        }
        let redone = self.history.redo(&mut self.tree)?;
        self.after_edit();
        Ok(redone)
    }

    /// Deactivate the active brush when `command` removes it
    fn release_removed(&mut self, command: &TreeCommand) {
        let Some(active) = self.engine.active_item() else {
            return;
        };
        if command.removed_ids(&self.tree).contains(&active) {
            self.deactivate(DeactivateReason::ExplicitToggleOff);
        }
    }

    fn after_edit(&mut self) {
        let shortcuts = ShortcutIndex::build(&self.tree);
        if shortcuts != self.shortcuts {
            self.shortcuts = shortcuts;
            self.events.emit(SwitchEvent::ShortcutsChanged);
        }
        let (engine, mut ctx) = self.split();
        engine.heal(&mut ctx);
    }

    /// Save the live tree as a new setup
    pub fn save_setup(
        &mut self,
        name: impl Into<String>,
        icon: impl Into<String>,
        description: impl Into<String>,
    ) -> SetupId {
        let id = self.setups.save(&self.tree, name, icon, description);
        self.setups.mark_loaded(Some(id));
        id
    }

    /// Overwrite a setup with the live tree
    pub fn update_setup(&mut self, id: SetupId) -> SwitchResult<()> {
        self.setups.update(id, &self.tree)?;
        self.setups.mark_loaded(Some(id));
        Ok(())
    }

    pub fn rename_setup(&mut self, id: SetupId, name: impl Into<String>) -> SwitchResult<()> {
        self.setups.rename(id, name)
    }

    pub fn remove_setup(&mut self, id: SetupId) -> SwitchResult<()> {
        self.setups.remove(id).map(|_| ())
    }

    /// Replace the live tree with a copy of the setup's snapshot
    pub fn apply_setup(&mut self, id: SetupId) -> SwitchResult<()> {
        let snapshot = self.setups.get(id)?.tree().clone();
        self.replace_tree(snapshot, Some(id));
        info!("setup {id} applied");
        Ok(())
    }

    /// Compare the live tree with a setup and broadcast the result
    pub fn detect_drift(&self, id: SetupId) -> SwitchResult<bool> {
        let drifted = self.setups.detect_drift(id, &self.tree)?;
        self.events.emit(SwitchEvent::DriftDetected { setup: id, drifted });
        Ok(drifted)
    }

    pub fn export_setups(&self) -> SwitchResult<String> {
        self.setups.export()
    }

    pub fn import_setups(&mut self, data: &str, mode: ImportMode) -> SwitchResult<usize> {
        self.setups.import(data, mode)
    }

    pub fn serialize_tree(&self) -> PersistenceResult<String> {
        persistence::serialize_tree(&self.tree)
    }

    /// Replace the live tree with a serialized one
    pub fn load_tree(&mut self, data: &str) -> SwitchResult<()> {
        let tree = persistence::deserialize_tree(data)?;
        self.replace_tree(tree, None);
        Ok(())
    }

    /// Everything worth persisting, ready for a [`persistence::SettingsFile`]
    pub fn settings_document(&self) -> SettingsDocument {
        SettingsDocument::new(self.settings.clone(), self.tree.clone(), self.setups.clone())
    }

    fn replace_tree(&mut self, mut tree: ItemTree, setup: Option<SetupId>) {
        self.deactivate(DeactivateReason::AnotherItemActivated);
        tree.reset_cursors();
        self.tree = tree;
        self.navigator.forget();
        self.history.clear();
        self.setups.mark_loaded(setup);
        self.events.emit(SwitchEvent::TreeReplaced { setup });

        let shortcuts = ShortcutIndex::build(&self.tree);
        if shortcuts != self.shortcuts {
            self.shortcuts = shortcuts;
            self.events.emit(SwitchEvent::ShortcutsChanged);
        }
    }
}
