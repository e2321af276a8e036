#![warn(clippy::all, rust_2018_idioms)]

pub mod command;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod event;
pub mod host;
pub mod id_generator;
pub mod item;
pub mod navigator;
pub mod persistence;
pub mod setup;

pub use command::{CommandHistory, TreeCommand};
pub use config::{SelectionMode, SwitcherSettings};
pub use coordinator::{Coordinator, ShortcutIndex, Trigger, TriggerQueue};
pub use engine::{DeactivateReason, Engine, EngineContext};
pub use error::{SwitchError, SwitchResult};
pub use event::{EventBus, EventHandler, EventLog, SwitchEvent};
pub use host::{HostAdapter, HostError, MemoryHost, PresetId, PropertyValue, ToolProperty};
pub use item::{Binding, Brush, Group, Item, ItemId, ItemTree};
pub use navigator::{Direction, Navigator};
pub use setup::{ImportMode, Setup, SetupId, SetupStore};
