use crate::event::EventBus;
use crate::host::HostAdapter;
use crate::item::ItemTree;

/// Everything an engine transition needs: the live tree, the host and the
/// event bus for broadcasting the outcome.
pub struct EngineContext<'a, H: HostAdapter + ?Sized> {
    /// The live tree; brushes may receive kept user modifications
    pub tree: &'a mut ItemTree,
    /// The host application
    pub host: &'a mut H,
    pub events: &'a EventBus,
}

impl<'a, H: HostAdapter + ?Sized> EngineContext<'a, H> {
    pub fn new(tree: &'a mut ItemTree, host: &'a mut H, events: &'a EventBus) -> Self {
        Self { tree, host, events }
    }
}
