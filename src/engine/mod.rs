//! Activation/deactivation of brushes against the host.
//!
//! The engine owns the single activation slot. Activating a brush snapshots
//! the host properties the brush overrides, selects its preset and writes the
//! overrides; deactivating restores the snapshot, or keeps what the user
//! changed while the brush was active when the brush asks for it.

mod context;
mod snapshot;

use log::{debug, error, info, warn};

use crate::error::{SwitchError, SwitchResult};
use crate::event::SwitchEvent;
use crate::host::{HostAdapter, PresetId, PropertyValue, ToolProperty};
use crate::item::{Brush, Item, ItemId, ItemTree};

pub use context::EngineContext;
pub use snapshot::Snapshot;

/// Why the active brush is being deactivated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeactivateReason {
    ExplicitToggleOff,
    AnotherItemActivated,
    /// The user picked a preset in the host that the switcher did not select
    HostSelectedDifferentPreset,
    PluginDisabledOrClosing,
}

/// The brush currently holding the slot
#[derive(Debug, Clone)]
pub struct ActiveBrush {
    pub item: ItemId,
    pub preset: PresetId,
    /// Preset the host had selected before activation
    pub previous_preset: Option<PresetId>,
    /// Host values before activation, for the overridden properties only
    pub before: Snapshot,
    /// Values written by the activation
    pub applied: Snapshot,
}

#[derive(Debug, Default)]
pub enum Slot {
    #[default]
    Idle,
    Active(ActiveBrush),
}

#[derive(Debug, Default)]
pub struct Engine {
    slot: Slot,
    /// Opacity observed when the host left its previous paint tool
    opacity_before_tool_change: Option<f64>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    pub fn active(&self) -> Option<&ActiveBrush> {
        match &self.slot {
            Slot::Active(active) => Some(active),
            Slot::Idle => None,
        }
    }

    pub fn active_item(&self) -> Option<ItemId> {
        self.active().map(|active| active.item)
    }

    pub fn is_active(&self, id: ItemId) -> bool {
        self.active_item() == Some(id)
    }

    /// Activate a brush, or the brush a group currently points at.
    ///
    /// Any other active brush is deactivated first. Returns the activated brush.
    pub fn activate<H: HostAdapter + ?Sized>(
        &mut self,
        ctx: &mut EngineContext<'_, H>,
        id: ItemId,
    ) -> SwitchResult<ItemId> {
        let brush = resolve_brush(ctx.tree, id)?.clone();
        // resolved before anything is touched: an unknown preset leaves the slot as is
        let handle = ctx
            .host
            .resolve_preset(&brush.preset)
            .ok_or(SwitchError::ItemUnresolved(brush.id))?;

        if self.active().is_some() {
            self.deactivate(ctx, DeactivateReason::AnotherItemActivated);
        }

        let previous_preset = ctx.host.active_preset();
        let plan = brush.planned_overrides();

        let mut before = Snapshot::default();
        for (property, _) in &plan {
            let value = ctx.host.property(*property)?;
            debug!("snapshot {property}: {value:?}");
            before.push(*property, value);
        }

        if let Err(err) = ctx.host.select_preset(&handle) {
            warn!("selecting preset '{}' failed: {err}", brush.preset);
            rollback(ctx, previous_preset.as_ref(), &before);
            return Err(err.into());
        }

        let mut applied = Snapshot::default();
        for (property, value) in plan {
            if let Err(err) = ctx.host.set_property(property, &value) {
                warn!("applying {property} for brush {} failed: {err}", brush.id);
                rollback(ctx, previous_preset.as_ref(), &before);
                return Err(err.into());
            }
            debug!("applied {property}: {value:?}");
            applied.push(property, value);
        }

        info!("brush '{}' ({}) activated", brush.label(), brush.id);
        self.slot = Slot::Active(ActiveBrush {
            item: brush.id,
            preset: brush.preset,
            previous_preset,
            before,
            applied,
        });
        ctx.events.emit(SwitchEvent::ActivationChanged { item: Some(brush.id) });
        Ok(brush.id)
    }

    /// Deactivate the active brush, if any, and give the host back its state.
    ///
    /// Host failures are logged: the slot always ends `Idle`. Returns the
    /// brush that was active.
    pub fn deactivate<H: HostAdapter + ?Sized>(
        &mut self,
        ctx: &mut EngineContext<'_, H>,
        reason: DeactivateReason,
    ) -> Option<ItemId> {
        let Slot::Active(active) = std::mem::take(&mut self.slot) else {
            debug!("deactivate ({reason:?}) with an idle slot");
            return None;
        };
        self.opacity_before_tool_change = None;

        let preset_replaced = reason == DeactivateReason::HostSelectedDifferentPreset;
        let keep_modifications = match ctx.tree.brush(active.item) {
            Some(brush) => brush.keep_user_modifications,
            None => {
                error!("active brush {} is no longer in the tree, restoring without merge", active.item);
                false
            }
        };

        // values the user changed while the brush was active, now owned by the brush
        let mut kept: Vec<(ToolProperty, PropertyValue)> = Vec::new();
        if keep_modifications {
            // the user's preset replaced the brush's one: its edits are only
            // readable once the brush preset is selected again
            let user_preset = if preset_replaced
                && active.applied.properties().any(ToolProperty::is_preset_scoped)
            {
                ctx.host.active_preset().filter(|preset| *preset != active.preset)
            } else {
                None
            };
            let brush_preset_back = match &user_preset {
                Some(_) => select_preset(ctx, &active.preset),
                None => false,
            };
            let scoped_readable = !preset_replaced || user_preset.is_none() || brush_preset_back;

            for (property, applied) in active.applied.iter() {
                if !property.is_mergeable() || (property.is_preset_scoped() && !scoped_readable) {
                    continue;
                }
                let current = match ctx.host.property(property) {
                    Ok(current) => current,
                    Err(err) => {
                        warn!("cannot read {property} on deactivation: {err}");
                        continue;
                    }
                };
                if current == *applied {
                    continue;
                }
                let absorbed = ctx
                    .tree
                    .brush_mut(active.item)
                    .is_some_and(|brush| brush.absorb(property, &current));
                if absorbed {
                    debug!("keeping user {property}: {current:?}");
                    kept.push((property, current));
                }
            }

            if let Some(user_preset) = user_preset.filter(|_| brush_preset_back) {
                select_preset(ctx, &user_preset);
            }
        }

        let mut reselected = false;
        if !preset_replaced {
            if let Some(previous) = &active.previous_preset {
                reselected = select_preset(ctx, previous);
            }
        }

        for (property, value) in active.before.iter() {
            if preset_replaced && property.is_preset_scoped() {
                continue;
            }
            let value = match kept.iter().find(|(p, _)| *p == property) {
                // preset selection reset it, write the user's value back
                Some((_, user_value)) if reselected => user_value,
                Some(_) => continue,
                None => value,
            };
            if let Err(err) = ctx.host.set_property(property, value) {
                warn!("restoring {property} failed: {err}");
            }
        }

        info!("brush {} deactivated ({reason:?})", active.item);
        if !kept.is_empty() {
            ctx.events.emit(SwitchEvent::BrushModified { item: active.item });
        }
        ctx.events.emit(SwitchEvent::ActivationChanged { item: None });
        Some(active.item)
    }

    /// Deactivate `id` if it is the active brush, activate it otherwise.
    /// Returns the brush active afterwards.
    pub fn toggle<H: HostAdapter + ?Sized>(
        &mut self,
        ctx: &mut EngineContext<'_, H>,
        id: ItemId,
    ) -> SwitchResult<Option<ItemId>> {
        let target = resolve_brush(ctx.tree, id)?.id;
        if self.is_active(target) {
            self.deactivate(ctx, DeactivateReason::ExplicitToggleOff);
            Ok(None)
        } else {
            self.activate(ctx, target).map(Some)
        }
    }

    /// Force the slot back to `Idle` when the active brush left the tree.
    /// Returns true when a repair happened.
    pub fn heal<H: HostAdapter + ?Sized>(&mut self, ctx: &mut EngineContext<'_, H>) -> bool {
        match self.active_item() {
            Some(item) if !ctx.tree.contains(item) => {
                error!("slot points at deleted brush {item}, forcing idle");
                self.deactivate(ctx, DeactivateReason::PluginDisabledOrClosing);
                true
            }
            _ => false,
        }
    }

    /// The host toggled its eraser mode: put it back when the active brush
    /// ignores eraser mode. Returns true when the host was corrected.
    pub fn enforce_eraser_mode<H: HostAdapter + ?Sized>(
        &self,
        ctx: &mut EngineContext<'_, H>,
        eraser_active: bool,
    ) -> SwitchResult<bool> {
        let Some(brush) = self.active_item().and_then(|id| ctx.tree.brush(id)) else {
            return Ok(false);
        };
        if !brush.ignore_eraser_mode || eraser_active == brush.is_eraser() {
            return Ok(false);
        }
        let forced = PropertyValue::Flag(brush.is_eraser());
        ctx.host.set_property(ToolProperty::EraserModeActive, &forced)?;
        debug!("eraser mode forced back to {forced:?}");
        Ok(true)
    }

    /// The host switched paint tool. A brush ignoring tool opacity keeps the
    /// opacity it had before the switch.
    pub fn on_tool_changed<H: HostAdapter + ?Sized>(
        &mut self,
        ctx: &mut EngineContext<'_, H>,
        activated: bool,
    ) -> SwitchResult<()> {
        let Some(brush) = self.active_item().and_then(|id| ctx.tree.brush(id)) else {
            return Ok(());
        };
        if !brush.ignore_tool_opacity {
            return Ok(());
        }
        if !activated {
            self.opacity_before_tool_change = ctx.host.property(ToolProperty::Opacity)?.as_number();
        } else if let Some(opacity) = self.opacity_before_tool_change.take() {
            ctx.host
                .set_property(ToolProperty::Opacity, &PropertyValue::Number(opacity))?;
        }
        Ok(())
    }
}

/// The brush an activation of `id` targets
pub fn resolve_brush(tree: &ItemTree, id: ItemId) -> SwitchResult<&Brush> {
    match tree.find(id) {
        Some(Item::Brush(brush)) => Ok(brush),
        Some(Item::Group(group)) => group.current_brush().ok_or(SwitchError::GroupEmpty(group.id)),
        None => Err(SwitchError::ItemNotFound(id)),
    }
}

fn select_preset<H: HostAdapter + ?Sized>(ctx: &mut EngineContext<'_, H>, preset: &PresetId) -> bool {
    let Some(handle) = ctx.host.resolve_preset(preset) else {
        warn!("previous preset '{preset}' cannot be resolved anymore");
        return false;
    };
    match ctx.host.select_preset(&handle) {
        Ok(()) => true,
        Err(err) => {
            warn!("reselecting preset '{preset}' failed: {err}");
            false
        }
    }
}

/// Best-effort undo of a failed activation
fn rollback<H: HostAdapter + ?Sized>(
    ctx: &mut EngineContext<'_, H>,
    previous_preset: Option<&PresetId>,
    before: &Snapshot,
) {
    if let Some(previous) = previous_preset {
        select_preset(ctx, previous);
    }
    for (property, value) in before.iter() {
        if let Err(err) = ctx.host.set_property(property, value) {
            warn!("rollback of {property} failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventBus, EventLog};
    use crate::host::MemoryHost;
    use crate::item::Group;

    fn setup() -> (ItemTree, MemoryHost, ItemId, ItemId) {
        let first = Brush::new("Basic-5 Size").with_size(40.0);
        let second = Brush::new("Basic-5 Size").with_size(3.0);
        let (a, b) = (first.id, second.id);
        let tree = ItemTree::new(vec![first.into(), second.into()]).unwrap();
        let host = MemoryHost::new().with_preset("Basic-5 Size", 25.0, 1.0);
        (tree, host, a, b)
    }

    #[test]
    fn test_toggle_twice_restores() {
        let (mut tree, mut host, a, _) = setup();
        let events = EventBus::new();
        let mut ctx = EngineContext::new(&mut tree, &mut host, &events);
        let mut engine = Engine::new();

        assert_eq!(engine.toggle(&mut ctx, a).unwrap(), Some(a));
        assert_eq!(ctx.host.number(ToolProperty::Size), Some(40.0));
        assert_eq!(engine.toggle(&mut ctx, a).unwrap(), None);
        assert_eq!(ctx.host.number(ToolProperty::Size), Some(10.0));
        assert!(matches!(engine.slot(), Slot::Idle));
    }

    #[test]
    fn test_heal_forces_idle_when_active_brush_vanished() {
        let (mut tree, mut host, a, _) = setup();
        let events = EventBus::new();
        let log = EventLog::new();
        events.subscribe(Box::new(log.clone()));
        let mut engine = Engine::new();

        engine
            .activate(&mut EngineContext::new(&mut tree, &mut host, &events), a)
            .unwrap();
        tree.remove(a).unwrap();

        let mut ctx = EngineContext::new(&mut tree, &mut host, &events);
        assert!(engine.heal(&mut ctx));
        assert_eq!(engine.active_item(), None);
        // restore still happens, without merge
        assert_eq!(ctx.host.number(ToolProperty::Size), Some(10.0));
        assert!(!engine.heal(&mut ctx));
        assert_eq!(log.events().last(), Some(&SwitchEvent::ActivationChanged { item: None }));
    }

    #[test]
    fn test_group_resolves_to_first_brush() {
        let (mut tree, _, _, b) = setup();
        let group = Group::new("g");
        let group_id = group.id;
        tree.insert(None, 0, group.into()).unwrap();
        assert!(matches!(resolve_brush(&tree, group_id), Err(SwitchError::GroupEmpty(_))));

        tree.move_item(b, Some(group_id), 0).unwrap();
        assert_eq!(resolve_brush(&tree, group_id).unwrap().id, b);
        assert!(matches!(
            resolve_brush(&tree, ItemId::new()),
            Err(SwitchError::ItemNotFound(_))
        ));
    }
}
