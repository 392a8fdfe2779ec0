//! Entity trait: identity by natural key + a queue of pending domain events.

use std::collections::VecDeque;

/// Entity marker + minimal interface.
///
/// An entity is identified by a business-unique natural key (sku, email) and
/// carries the events it raised during the current unit of work until the
/// message bus drains them.
pub trait Entity {
    /// Event type this entity can raise.
    type Event;

    /// Serialized field name of the natural key, when the entity has one.
    const NATURAL_KEY: Option<&'static str>;

    /// Returns the natural key value.
    fn natural_key(&self) -> Option<&str>;

    fn events(&self) -> &EventQueue<Self::Event>;

    fn events_mut(&mut self) -> &mut EventQueue<Self::Event>;
}

/// FIFO of events an entity raised but did not emit yet.
///
/// Draining removes events in the order they were pushed and leaves the queue
/// empty; a second drain yields nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQueue<E> {
    pending: VecDeque<E>,
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: E) {
        self.pending.push_back(event);
    }

    pub fn pop(&mut self) -> Option<E> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.pending.iter()
    }

    /// Remove every pending event, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = E> + '_ {
        self.pending.drain(..)
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
