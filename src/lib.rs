//! Attendance Bot - conversational attendance calculator.
//!
//! A chat bot that walks a user through entering attendance percentages
//! for coursework components and reports a weighted (or simple) average
//! with a pass/fail verdict.
//!
//! ## Architecture
//!
//! ```text
//! User IM → Channel adapter → dispatcher → ConversationEngine
//!                                               │
//! User ←──── send / send_menu ←──── replies ←───┘
//! ```
//!
//! The conversation is a small finite state machine (`conversation`), the
//! math is a pure aggregation function (`attendance`), and the transport
//! is whatever implements `channels::Channel`.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod attendance;
pub mod channels;
pub mod config;
pub mod conversation;
pub mod logging;

// Re-export commonly used types
pub use attendance::{aggregate, AggregateError, Component, Report, WeightPolicy};
pub use channels::{Channel, ChannelMessage, CliChannel, TelegramChannel};
pub use config::Config;
pub use conversation::{
    AttendancePolicy, ConvEvent, ConvState, ConversationEngine, Reply, Session, SessionStore,
};
pub use logging::init_logging;
