//! In-process message bus (commands + events).
//!
//! ## Dispatch loop
//!
//! ```text
//! handle(root)
//!   queue = [root]
//!   while let Some(msg) = queue.pop_front():
//!     Command -> its single handler, fresh unit of work
//!     Event   -> every handler for the kind, each in its own unit of work
//!     after a successful handler: drain new events, commit, push events to the back
//! ```
//!
//! The queue is FIFO, so all direct consequences of a message are handled
//! before their own consequences (breadth-first).
//!
//! ## Failure policy
//!
//! What happens when a handler (or its commit) fails is decided by
//! [`Message::failure_policy`]:
//!
//! - commands: the scope is rolled back, the error is logged and returned,
//!   and the whole dispatch stops
//! - events: the scope is rolled back, the error is logged, and dispatch
//!   continues with the next handler / message
//!
//! The bus never authorizes; that happens upstream.
//!
//! ## Registry
//!
//! Built once with [`MessageBusBuilder`] and immutable afterwards, so a
//! `MessageBus` can be shared across threads without locking.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use thiserror::Error;

use catalog_core::{DomainError, DomainResult, MessageId};
use catalog_events::{
    Command, CommandKind, CommandMessage, DomainEvent, EventKind, FailurePolicy, Message,
};

use crate::unit_of_work::{UnitOfWork, UnitOfWorkFactory};

pub type CommandHandlerFn = dyn Fn(&Command, &mut UnitOfWork) -> DomainResult<()> + Send + Sync;
pub type EventHandlerFn = dyn Fn(&DomainEvent, &mut UnitOfWork) -> DomainResult<()> + Send + Sync;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler is registered for a command (a wiring bug).
    #[error("no handler registered for message type '{0}'")]
    UnknownMessageType(&'static str),

    /// A command kind was registered twice.
    #[error("command {0:?} already has a handler")]
    DuplicateCommandHandler(CommandKind),

    /// A command handler (or its commit) failed.
    #[error(transparent)]
    Handler(#[from] DomainError),
}

struct Registered<F: ?Sized> {
    name: &'static str,
    handler: Arc<F>,
}

impl<F: ?Sized> Clone for Registered<F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Collects handler registrations, then freezes them into a [`MessageBus`].
pub struct MessageBusBuilder {
    uow: Arc<dyn UnitOfWorkFactory>,
    commands: HashMap<CommandKind, Registered<CommandHandlerFn>>,
    events: HashMap<EventKind, Vec<Registered<EventHandlerFn>>>,
}

impl MessageBusBuilder {
    pub fn new(uow: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self {
            uow,
            commands: HashMap::new(),
            events: HashMap::new(),
        }
    }

    /// Register the single handler of a command kind.
    pub fn on_command<F>(
        mut self,
        kind: CommandKind,
        name: &'static str,
        handler: F,
    ) -> Result<Self, DispatchError>
    where
        F: Fn(&Command, &mut UnitOfWork) -> DomainResult<()> + Send + Sync + 'static,
    {
        if self.commands.contains_key(&kind) {
            return Err(DispatchError::DuplicateCommandHandler(kind));
        }
        self.commands.insert(
            kind,
            Registered {
                name,
                handler: Arc::new(handler),
            },
        );
        Ok(self)
    }

    /// Append a handler for an event kind; handlers run in registration order.
    pub fn on_event<F>(mut self, kind: EventKind, name: &'static str, handler: F) -> Self
    where
        F: Fn(&DomainEvent, &mut UnitOfWork) -> DomainResult<()> + Send + Sync + 'static,
    {
        self.events.entry(kind).or_default().push(Registered {
            name,
            handler: Arc::new(handler),
        });
        self
    }

    pub fn build(self) -> MessageBus {
        MessageBus {
            uow: self.uow,
            commands: self.commands,
            events: self.events,
        }
    }
}

pub struct MessageBus {
    uow: Arc<dyn UnitOfWorkFactory>,
    commands: HashMap<CommandKind, Registered<CommandHandlerFn>>,
    events: HashMap<EventKind, Vec<Registered<EventHandlerFn>>>,
}

impl core::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageBus")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl MessageBus {
    pub fn builder(uow: Arc<dyn UnitOfWorkFactory>) -> MessageBusBuilder {
        MessageBusBuilder::new(uow)
    }

    pub fn uow_factory(&self) -> &Arc<dyn UnitOfWorkFactory> {
        &self.uow
    }

    pub fn handles_command(&self, kind: CommandKind) -> bool {
        self.commands.contains_key(&kind)
    }

    /// Names of the handlers registered for `kind`, in dispatch order.
    pub fn event_handlers(&self, kind: EventKind) -> Vec<&'static str> {
        self.events
            .get(&kind)
            .map(|handlers| handlers.iter().map(|h| h.name).collect())
            .unwrap_or_default()
    }

    /// Dispatch `message` and every event it transitively causes.
    ///
    /// Returns the first command failure; event handler failures are logged
    /// and swallowed.
    pub fn handle(&self, message: impl Into<Message>) -> Result<(), DispatchError> {
        let root = message.into();
        let dispatch_id = MessageId::new();
        let span = tracing::debug_span!("dispatch", %dispatch_id, root = root.name());
        let _entered = span.enter();

        let mut queue = VecDeque::from([root]);
        while let Some(message) = queue.pop_front() {
            tracing::debug!(message = message.name(), pending = queue.len(), "handling message");

            match &message {
                Message::Command(command) => {
                    let registered = self
                        .commands
                        .get(&command.kind())
                        .ok_or(DispatchError::UnknownMessageType(command.command_type()))?;
                    let outcome = self.run_in_scope(|uow| (registered.handler)(command, uow));
                    settle(outcome, &message, registered.name, &mut queue)?;
                }
                Message::Event(event) => {
                    for registered in self.events.get(&event.kind()).into_iter().flatten() {
                        let outcome = self.run_in_scope(|uow| (registered.handler)(event, uow));
                        settle(outcome, &message, registered.name, &mut queue)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Run one handler in a fresh scope; on success returns its new events.
    fn run_in_scope<F>(&self, handler: F) -> DomainResult<Vec<DomainEvent>>
    where
        F: FnOnce(&mut UnitOfWork) -> DomainResult<()>,
    {
        let mut uow = self.uow.begin()?;
        if let Err(err) = handler(&mut uow) {
            uow.rollback();
            return Err(err);
        }
        let events: Vec<_> = uow.collect_new_events().collect();
        uow.commit()?;
        Ok(events)
    }
}

fn settle(
    outcome: DomainResult<Vec<DomainEvent>>,
    message: &Message,
    handler: &'static str,
    queue: &mut VecDeque<Message>,
) -> Result<(), DispatchError> {
    match outcome {
        Ok(events) => {
            tracing::debug!(handler, emitted = events.len(), "handler succeeded");
            queue.extend(events.into_iter().map(Message::Event));
            Ok(())
        }
        Err(err) => match message.failure_policy() {
            FailurePolicy::Propagate => {
                tracing::error!(handler, error = %err, payload = ?message, "command handler failed");
                Err(err.into())
            }
            FailurePolicy::LogAndContinue => {
                tracing::error!(handler, error = %err, payload = ?message, "event handler failed");
                Ok(())
            }
        },
    }
}
