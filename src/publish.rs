//! Outbound domain event delivery.
//!
//! Delivery is best effort: a failed publish is logged by the caller and never
//! undoes the change that raised the event.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::events::DomainEvent;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("deliver event: {0}")]
    Deliver(String),
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError>;
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

#[async_trait]
impl EventSink for NullEventSink {
    async fn publish(&self, _event: &DomainEvent) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Keeps events in memory, for tests and local inspection.
#[derive(Debug, Default)]
pub struct InMemoryEventSink {
    inner: Mutex<Vec<DomainEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<DomainEvent> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        self.inner
            .lock()
            .map_err(|_| PublishError::Deliver("sink lock poisoned".into()))?
            .push(event.clone());
        Ok(())
    }
}

/// Publishes each event as JSON on its own NATS subject.
pub struct NatsEventSink {
    client: async_nats::Client,
}

impl NatsEventSink {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventSink for NatsEventSink {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(event)?;
        self.client
            .publish(event.subject(), payload.into())
            .await
            .map_err(|e| PublishError::Deliver(e.to_string()))
    }
}
