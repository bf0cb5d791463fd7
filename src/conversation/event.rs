//! Conversation events and outbound replies.

/// An inbound event for one conversation. The transport maps its start and
/// cancel commands before dispatch; everything else arrives as `Text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvEvent {
    /// Start (or restart) the conversation.
    Start,
    /// Cancel from any state.
    Cancel,
    /// Free-text message: a component label, "Done", or a percentage.
    Text(String),
}

/// An outbound reply: plain text, optionally with a single-use
/// suggested-replies menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub menu: Option<Vec<String>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: None,
        }
    }

    pub fn with_menu(text: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            text: text.into(),
            menu: Some(options),
        }
    }
}
