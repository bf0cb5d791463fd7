//! Channel adapters and the message dispatch loop.
//!
//! Adapters turn platform traffic into [`ChannelMessage`]s on an mpsc
//! channel; the dispatcher drains it one message at a time, feeds the
//! conversation engine, and routes the replies back out. Listeners are
//! supervised: a crashed or exited listener restarts with exponential
//! backoff.

pub mod cli;
pub mod telegram;
pub mod traits;

pub use cli::CliChannel;
pub use telegram::TelegramChannel;
pub use traits::{Channel, ChannelMessage};

use crate::config::Config;
use crate::conversation::{ConvEvent, ConversationEngine};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Starts (or restarts) an attendance conversation.
pub const START_COMMAND: &str = "/attendance";
/// Cancels the conversation from any state.
pub const CANCEL_COMMAND: &str = "/cancel";

const INITIAL_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;

/// Map inbound text to a conversation event. The two commands bypass
/// normal text routing; everything else is free text for the state machine.
fn classify(text: &str) -> ConvEvent {
    match text.trim() {
        START_COMMAND => ConvEvent::Start,
        CANCEL_COMMAND => ConvEvent::Cancel,
        other => ConvEvent::Text(other.to_string()),
    }
}

fn spawn_supervised_listener(
    ch: Arc<dyn Channel>,
    tx: tokio::sync::mpsc::Sender<ChannelMessage>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut backoff = INITIAL_BACKOFF_SECS;

        loop {
            let result = ch.listen(tx.clone()).await;

            if tx.is_closed() {
                break;
            }

            match result {
                Ok(()) => {
                    tracing::warn!("Channel {} exited unexpectedly; restarting", ch.name());
                }
                Err(e) => {
                    tracing::error!("Channel {} error: {e}; restarting", ch.name());
                }
            }

            tokio::time::sleep(Duration::from_secs(backoff)).await;
            backoff = backoff.saturating_mul(2).min(MAX_BACKOFF_SECS);
        }
    })
}

/// Build the active channels from config. Telegram when configured and
/// enabled; the CLI channel otherwise, or when forced for local testing.
fn build_channels(config: &Config, force_cli: bool) -> Vec<Arc<dyn Channel>> {
    if !force_cli {
        if let Some(tg) = config.telegram.as_ref().filter(|t| t.enabled) {
            return vec![Arc::new(TelegramChannel::new(
                tg.bot_token.clone(),
                tg.allowed_users.clone(),
            ))];
        }
    }
    vec![Arc::new(CliChannel::new())]
}

/// Run the bot: listen on the configured channels and dispatch every
/// inbound message through the conversation engine.
///
/// One message is fully processed (state read, mutated, replies sent)
/// before the next is taken off the queue.
pub async fn start_channels(config: &Config, force_cli: bool) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<ChannelMessage>(64);

    let channels = build_channels(config, force_cli);
    let mut registry: HashMap<String, Arc<dyn Channel>> = HashMap::new();
    let mut listeners = Vec::new();
    for ch in &channels {
        tracing::info!("Starting channel: {}", ch.name());
        registry.insert(ch.name().to_string(), ch.clone());
        listeners.push(spawn_supervised_listener(ch.clone(), tx.clone()));
    }
    drop(tx);

    let mut engine = ConversationEngine::new(config.attendance.policy());

    let dispatch = async {
        while let Some(msg) = rx.recv().await {
            tracing::debug!(
                channel = %msg.channel,
                sender = %msg.sender,
                "inbound message"
            );

            let replies = engine.handle(&msg.sender, classify(&msg.content));

            let Some(ch) = registry.get(&msg.channel) else {
                tracing::warn!("No channel registered for '{}'", msg.channel);
                continue;
            };

            for reply in replies {
                let sent = match &reply.menu {
                    Some(options) => ch.send_menu(&reply.text, options, &msg.sender).await,
                    None => ch.send(&reply.text, &msg.sender).await,
                };
                if let Err(e) = sent {
                    tracing::error!("Failed to send reply via {}: {e}", ch.name());
                }
            }
        }
        tracing::info!("All channel listeners stopped");
    };

    tokio::select! {
        () = dispatch => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, shutting down");
        }
    }

    for task in listeners {
        task.abort();
    }

    Ok(())
}

/// Run health checks for the configured channels.
pub async fn doctor_channels(config: &Config) -> Result<()> {
    let channels = build_channels(config, false);

    for ch in channels {
        let healthy = tokio::time::timeout(Duration::from_secs(10), ch.health_check()).await;
        match healthy {
            Ok(true) => println!("  ✅ {}", ch.name()),
            Ok(false) => println!("  ❌ {} (unhealthy)", ch.name()),
            Err(_) => println!("  ❌ {} (timed out)", ch.name()),
        }
    }
    Ok(())
}
