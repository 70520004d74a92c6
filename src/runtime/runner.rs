//! The serving loop.
//!
//! Gateway events arrive over an mpsc channel. Every inbound message and every
//! presence update gets its own task, so a slow command never delays the next
//! message. On shutdown the loop stops accepting events and waits for the
//! tasks already running.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::Dispatcher;
use crate::gateway::{InboundMessage, PresenceUpdate, Responder};

/// Messages that can be sent to the runner.
#[derive(Debug, Clone)]
pub enum RunnerMessage {
    /// A chat message to route.
    Inbound(InboundMessage),
    /// A member's presence changed.
    Presence(PresenceUpdate),
    /// Stop the runner.
    Shutdown,
}

/// Drives a [`Dispatcher`] from a stream of gateway events.
pub struct BotRunner {
    dispatcher: Arc<Dispatcher>,
    responder: Arc<dyn Responder>,
}

impl BotRunner {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, responder: Arc<dyn Responder>) -> Self {
        Self {
            dispatcher,
            responder,
        }
    }

    /// Runs until a [`RunnerMessage::Shutdown`] arrives or the channel closes.
    pub async fn run(&self, mut rx: mpsc::Receiver<RunnerMessage>) {
        info!("Command router started");

        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Some(RunnerMessage::Inbound(message)) => {
                            let dispatcher = Arc::clone(&self.dispatcher);
                            let responder = Arc::clone(&self.responder);
                            tasks.spawn(async move {
                                process_message(&dispatcher, responder.as_ref(), &message).await;
                            });
                        }
                        Some(RunnerMessage::Presence(update)) => {
                            let dispatcher = Arc::clone(&self.dispatcher);
                            tasks.spawn(async move {
                                dispatcher.notify_presence(&update).await;
                            });
                        }
                        Some(RunnerMessage::Shutdown) | None => {
                            info!("Runner shutting down");
                            break;
                        }
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!("Message task failed: {}", e);
                    }
                }
            }
        }

        debug!("Waiting for {} running tasks", tasks.len());
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Message task failed: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for BotRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotRunner")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

async fn process_message(dispatcher: &Dispatcher, responder: &dyn Responder, message: &InboundMessage) {
    let outcome = match dispatcher.handle(message).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => return,
        Err(e) => {
            error!("Failed to dispatch message from {}: {}", message.author, e);
            return;
        }
    };

    let Some(text) = outcome.reply_text() else {
        return;
    };
    if let Err(e) = responder.reply(message, &text).await {
        warn!("Failed to reply to {}: {}", message.author, e);
    }
}
