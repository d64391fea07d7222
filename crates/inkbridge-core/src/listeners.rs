//! Listener bookkeeping for canvas events.
//!
//! Subscriptions are only possible through a [`Registrar`], and the only way
//! to obtain the matching [`Teardown`] is [`Registrar::finish`]. A teardown
//! removes exactly the listeners its registrar added, so a configuration can
//! always be undone without touching anyone else's handlers.

use crate::tools::ToolKind;

/// Canvas event channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerOut,
    DoubleClick,
    PathCreated,
    KeyDown,
}

/// Which behavior a listener triggers when its channel fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerOut,
    DoubleClick,
    PathCreated,
    DeleteKey,
    ArrowKeys,
    TextEdit,
    /// Record the canvas into history.
    Commit,
}

/// Who registered a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Tool(ToolKind),
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub id: ListenerId,
    pub channel: Channel,
    pub owner: Owner,
    pub handler: Handler,
}

/// All live listeners, in registration order.
#[derive(Debug, Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribe(&mut self, channel: Channel, owner: Owner, handler: Handler) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            channel,
            owner,
            handler,
        });
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Listeners of a channel, oldest first.
    pub fn listeners_for(&self, channel: Channel) -> Vec<Listener> {
        self.listeners
            .iter()
            .filter(|l| l.channel == channel)
            .copied()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Listener> {
        self.listeners.iter()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Number of listeners with the given owner and handler.
    pub fn count(&self, owner: Owner, handler: Handler) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.owner == owner && l.handler == handler)
            .count()
    }

    /// Number of listeners registered by an owner.
    pub fn owned_by(&self, owner: Owner) -> usize {
        self.listeners.iter().filter(|l| l.owner == owner).count()
    }
}

/// Collects the subscriptions made during one configuration.
pub struct Registrar<'a> {
    bus: &'a mut EventBus,
    owner: Owner,
    ids: Vec<ListenerId>,
}

impl<'a> Registrar<'a> {
    pub fn new(bus: &'a mut EventBus, owner: Owner) -> Self {
        Self {
            bus,
            owner,
            ids: Vec::new(),
        }
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Subscribe `handler` to `channel` on behalf of this registrar's owner.
    pub fn on(&mut self, channel: Channel, handler: Handler) -> ListenerId {
        let id = self.bus.subscribe(channel, self.owner, handler);
        self.ids.push(id);
        id
    }

    pub fn finish(self) -> Teardown {
        Teardown {
            owner: Some(self.owner),
            ids: self.ids,
        }
    }
}

/// Undo token for one configuration. Dropping it without calling
/// [`Teardown::release`] leaks the listeners.
#[must_use = "listeners stay registered until the teardown is released"]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Teardown {
    owner: Option<Owner>,
    ids: Vec<ListenerId>,
}

impl Teardown {
    pub fn owner(&self) -> Option<Owner> {
        self.owner
    }

    pub fn ids(&self) -> &[ListenerId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Remove every listener this token covers. Returns how many were removed.
    pub fn release(self, bus: &mut EventBus) -> usize {
        let mut removed = 0;
        for id in &self.ids {
            if bus.unsubscribe(*id) {
                removed += 1;
            } else {
                log::warn!("listener {id:?} of {:?} was already gone", self.owner);
            }
        }
        removed
    }
}
