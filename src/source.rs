// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The endpoint source abstraction.
//!
//! A [`Source`] produces the candidate endpoints for one reconciliation pass.
//! Resource adapters implement it directly; the wrappers in
//! [`crate::wrappers`] implement it by delegating to an inner source and
//! post-processing the result, so they compose freely:
//!
//! ```rust
//! use dnsource::endpoint::{Endpoint, RecordType};
//! use dnsource::source::{Source, StaticSource};
//! use dnsource::wrappers::DedupSource;
//!
//! # async fn example() -> Result<(), dnsource::errors::SourceError> {
//! let ep = Endpoint::new("example.com", RecordType::A, ["1.2.3.4"]).unwrap();
//! let source = DedupSource::new(StaticSource::new(vec![ep.clone(), ep]));
//!
//! assert_eq!(source.endpoints().await?.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::endpoint::Endpoint;
use crate::errors::SourceError;
use std::sync::{Arc, Mutex, PoisonError};

/// Callback invoked when the underlying resources of a source change.
pub type EventHandler = Arc<dyn Fn() + Send + Sync>;

/// Anything that can produce candidate endpoints.
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    /// Produce the endpoints for one reconciliation pass.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the underlying resources cannot be read.
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError>;

    /// Register a callback fired whenever the source's inputs change.
    ///
    /// Sources that cannot detect changes ignore the handler.
    fn add_event_handler(&self, _handler: EventHandler) {}
}

#[async_trait::async_trait]
impl<S: Source + ?Sized> Source for Box<S> {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        (**self).endpoints().await
    }

    fn add_event_handler(&self, handler: EventHandler) {
        (**self).add_event_handler(handler);
    }
}

#[async_trait::async_trait]
impl<S: Source + ?Sized> Source for Arc<S> {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        (**self).endpoints().await
    }

    fn add_event_handler(&self, handler: EventHandler) {
        (**self).add_event_handler(handler);
    }
}

/// A list of registered event handlers.
#[derive(Default)]
pub(crate) struct EventHandlers(Mutex<Vec<EventHandler>>);

impl EventHandlers {
    pub(crate) fn push(&self, handler: EventHandler) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Invoke every handler. The lock is released before handlers run.
    pub(crate) fn notify(&self) {
        let handlers: Vec<EventHandler> = self
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for handler in handlers {
            handler();
        }
    }
}

/// A source returning a fixed list of endpoints.
///
/// Used by the `render` command, where endpoints are read from a file, and by tests.
#[derive(Default)]
pub struct StaticSource {
    endpoints: Vec<Endpoint>,
    handlers: EventHandlers,
}

impl StaticSource {
    /// Create a source that always returns `endpoints`.
    #[must_use]
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints,
            handlers: EventHandlers::default(),
        }
    }

    /// Number of registered event handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Fire every registered event handler.
    pub fn notify(&self) {
        self.handlers.notify();
    }
}

#[async_trait::async_trait]
impl Source for StaticSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        Ok(self.endpoints.clone())
    }

    fn add_event_handler(&self, handler: EventHandler) {
        self.handlers.push(handler);
    }
}

/// A source that always fails. Lets tests check that wrappers propagate errors.
#[cfg(test)]
pub(crate) struct FailingSource;

#[cfg(test)]
#[async_trait::async_trait]
impl Source for FailingSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        Err(SourceError::Upstream {
            source_name: "failing".to_string(),
            reason: "boom".to_string(),
        })
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod source_tests;
