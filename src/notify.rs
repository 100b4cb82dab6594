//! Synchronous notification hub for history events.

use std::{fmt, str::FromStr};

use hashbrown::HashMap;
use thiserror::Error;

use crate::{
    persist::{self, SharedSink},
    record::CalculationRecord,
};

/// Named history events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A calculation was committed.
    CalculationAdded,
    /// History was emptied.
    HistoryCleared,
    /// An undo step was applied.
    UndoPerformed,
    /// A redo step was applied.
    RedoPerformed,
}

impl EventKind {
    /// All event kinds.
    pub const ALL: [EventKind; 4] = [
        EventKind::CalculationAdded,
        EventKind::HistoryCleared,
        EventKind::UndoPerformed,
        EventKind::RedoPerformed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::CalculationAdded => "calculation_added",
            EventKind::HistoryCleared => "history_cleared",
            EventKind::UndoPerformed => "undo_performed",
            EventKind::RedoPerformed => "redo_performed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a name does not match any [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event '{0}'")]
pub struct UnknownEvent(pub String);

impl FromStr for EventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// Payload handed to listeners.
#[derive(Debug, Clone, Copy)]
pub struct Notification<'a> {
    pub kind: EventKind,
    /// The committed record, for [`EventKind::CalculationAdded`].
    pub record: Option<CalculationRecord>,
    /// History after the change.
    pub history: &'a [CalculationRecord],
}

/// Error type listeners may return.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Registered callback.
///
/// Listeners only see the notification payload, never the calculator that
/// published it, so they cannot trigger a nested mutation.
pub type Listener = Box<dyn FnMut(&Notification<'_>) -> Result<(), ListenerError> + Send>;

/// Handle returned by [`NotificationHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A listener that returned an error during [`NotificationHub::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    pub listener: ListenerId,
    pub kind: EventKind,
    pub message: String,
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} listener failed: {}", self.kind, self.message)
    }
}

#[derive(Default)]
pub struct NotificationHub {
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(EventKind, usize)> = EventKind::ALL
            .into_iter()
            .map(|k| (k, self.listener_count(k)))
            .collect();
        f.debug_struct("NotificationHub")
            .field("listeners", &counts)
            .finish()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `kind`. Listeners run in registration order.
    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&Notification<'_>) -> Result<(), ListenerError> + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Invokes every listener for `note.kind`.
    ///
    /// A failing listener is logged and reported; the rest still run.
    pub fn publish(&mut self, note: &Notification<'_>) -> Vec<ListenerFailure> {
        let mut failures = Vec::new();
        let Some(list) = self.listeners.get_mut(&note.kind) else {
            return failures;
        };

        for (id, listener) in list.iter_mut() {
            if let Err(err) = listener(note) {
                let failure = ListenerFailure {
                    listener: *id,
                    kind: note.kind,
                    message: err.to_string(),
                };
                log::warn!("{failure}");
                failures.push(failure);
            }
        }
        failures
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }
}

/// Listener that writes the notified history through `sink`.
pub fn auto_save_listener(
    sink: SharedSink,
) -> impl FnMut(&Notification<'_>) -> Result<(), ListenerError> + Send + 'static {
    move |note| {
        persist::save_shared(&sink, note.history)?;
        Ok(())
    }
}
