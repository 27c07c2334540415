//! In-process message bus for inter-agent traffic
//!
//! Each subscriber gets its own unbounded channel drained by a spawned
//! task, so delivery is FIFO per recipient while recipients process
//! concurrently. Every send is appended to an append-only history.

use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Routing discipline for a bus message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// One named receiver
    Direct,
    /// Every subscriber except the sender
    Broadcast,
    /// Direct message that expects a reply
    Request,
}

/// A single message on the bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusMessage {
    pub id: Uuid,
    pub sender: String,
    pub receiver: Option<String>,
    pub payload: String,
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
}

impl BusMessage {
    pub fn direct(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            receiver: Some(receiver.into()),
            payload: payload.into(),
            kind: MessageKind::Direct,
            timestamp: Utc::now(),
        }
    }

    pub fn broadcast(sender: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            receiver: None,
            payload: payload.into(),
            kind: MessageKind::Broadcast,
            timestamp: Utc::now(),
        }
    }

    pub fn request(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            receiver: Some(receiver.into()),
            payload: payload.into(),
            kind: MessageKind::Request,
            timestamp: Utc::now(),
        }
    }
}

/// Async message sink bound to a subscriber
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: BusMessage);
}

struct Subscriber {
    agent_id: String,
    tx: mpsc::UnboundedSender<BusMessage>,
}

/// Shared in-process bus
///
/// Routing and the history append happen under one lock, so history
/// order matches routing order.
pub struct MessageBus {
    subscribers: Mutex<Vec<Subscriber>>,
    history: Mutex<Vec<BusMessage>>,
    verbose: bool,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_verbose(false)
    }

    pub fn with_verbose(verbose: bool) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
            verbose,
        }
    }

    /// Register a handler for an agent id
    ///
    /// The handler runs on its own drain task: messages to one subscriber
    /// arrive in send order, and a slow handler does not block the bus.
    pub fn subscribe(&self, agent_id: impl Into<String>, handler: Arc<dyn MessageHandler>) {
        let agent_id = agent_id.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<BusMessage>();

        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                handler.handle(message).await;
            }
        });

        self.subscribers
            .lock()
            .unwrap()
            .push(Subscriber { agent_id, tx });
    }

    /// Register a raw channel for an agent id (inspection in tests)
    pub fn subscribe_channel(
        &self,
        agent_id: impl Into<String>,
    ) -> mpsc::UnboundedReceiver<BusMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(Subscriber {
            agent_id: agent_id.into(),
            tx,
        });
        rx
    }

    /// Append to history and route
    ///
    /// Direct/Request go to every subscription under the named receiver;
    /// Broadcast goes to every subscriber except the sender. A closed
    /// subscriber channel is skipped.
    pub fn send(&self, message: BusMessage) -> Result<()> {
        if self.verbose {
            eprintln!(
                "[BUS] {:?} {} -> {}: {}",
                message.kind,
                message.sender,
                message.receiver.as_deref().unwrap_or("*"),
                message.payload
            );
        }

        let subscribers = self.subscribers.lock().unwrap();
        self.history.lock().unwrap().push(message.clone());

        match message.kind {
            MessageKind::Direct | MessageKind::Request => {
                if let Some(receiver) = &message.receiver {
                    for sub in subscribers.iter().filter(|s| &s.agent_id == receiver) {
                        let _ = sub.tx.send(message.clone());
                    }
                }
            }
            MessageKind::Broadcast => {
                for sub in subscribers.iter().filter(|s| s.agent_id != message.sender) {
                    let _ = sub.tx.send(message.clone());
                }
            }
        }

        Ok(())
    }

    /// Snapshot of everything ever sent, in send order
    pub fn history(&self) -> Vec<BusMessage> {
        self.history.lock().unwrap().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
