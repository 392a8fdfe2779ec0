use serde::{Deserialize, Serialize};

use crate::{Command, CommandMessage, DomainEvent, EventMessage};

/// What the dispatch loop does when a handler for a message fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log, then abort the whole dispatch and return the error to the caller.
    Propagate,
    /// Log, then continue with the next handler / next queued message.
    LogAndContinue,
}

/// Unit of work for the message bus: either a command or an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Command(Command),
    Event(DomainEvent),
}

impl Message {
    /// Commands fail loud, events fail quiet per handler.
    pub fn failure_policy(&self) -> FailurePolicy {
        match self {
            Message::Command(_) => FailurePolicy::Propagate,
            Message::Event(_) => FailurePolicy::LogAndContinue,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Message::Command(c) => c.command_type(),
            Message::Event(e) => e.event_type(),
        }
    }
}

impl From<Command> for Message {
    fn from(value: Command) -> Self {
        Message::Command(value)
    }
}

impl From<DomainEvent> for Message {
    fn from(value: DomainEvent) -> Self {
        Message::Event(value)
    }
}
