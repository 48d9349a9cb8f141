//! Collision-free identifier source.

use std::cell::Cell;
use uuid::Uuid;

/// Produces unique string identifiers on demand.
pub trait IdGenerator {
    fn next_id(&self) -> String;
}

/// UUID v4 generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` generator.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let current = self.next.get();
        self.next.set(current + 1);
        format!("{}-{current}", self.prefix)
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for &G {
    fn next_id(&self) -> String {
        (**self).next_id()
    }
}
