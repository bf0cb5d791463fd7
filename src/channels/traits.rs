use async_trait::async_trait;

/// A message received from a channel.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub id: String,
    /// Opaque session identifier (chat id for Telegram).
    pub sender: String,
    pub content: String,
    pub channel: String,
    pub timestamp: u64,
}

/// Core channel trait — implement for any messaging platform
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name
    fn name(&self) -> &str;

    /// Send a plain text message through this channel
    async fn send(&self, message: &str, recipient: &str) -> anyhow::Result<()>;

    /// Send a message with a single-use suggested-replies menu.
    ///
    /// Channels without native menus fall back to listing the options
    /// inline below the message.
    async fn send_menu(
        &self,
        message: &str,
        options: &[String],
        recipient: &str,
    ) -> anyhow::Result<()> {
        let mut text = message.to_string();
        for option in options {
            text.push_str("\n  - ");
            text.push_str(option);
        }
        self.send(&text, recipient).await
    }

    /// Start listening for incoming messages (long-running)
    async fn listen(&self, tx: tokio::sync::mpsc::Sender<ChannelMessage>) -> anyhow::Result<()>;

    /// Check if channel is healthy
    async fn health_check(&self) -> bool {
        true
    }
}
