//! Pure state transition function.
//!
//! Every transition is a value: given the current session and one event,
//! `transition` returns the next state, the replies to emit, and the entry
//! mutations to apply. No I/O happens here, which keeps the whole state
//! machine unit-testable without a transport.

use super::event::{ConvEvent, Reply};
use super::session::Session;
use super::state::ConvState;
use crate::attendance::{self, Component, WeightPolicy};

/// The terminator label shown alongside the components. Not a component.
pub const DONE_LABEL: &str = "Done";

const PROMPT_SELECT: &str =
    "Select a component to enter attendance (or type 'Done' when finished):";
const PROMPT_SELECT_AGAIN: &str =
    "Select another component to update attendance (or type 'Done' to finish):";
const PROMPT_AFTER_REPORT: &str = "You can check attendance again by selecting a component:";
const MSG_INVALID_COMPONENT: &str = "Invalid component. Please select from the list.";
const MSG_INVALID_NUMBER: &str = "Invalid input! Enter a number (e.g., 75).";
const MSG_CANCELLED: &str = "Attendance calculation canceled.";

/// Aggregation settings for a deployment. Fixed at startup, never
/// user-adjustable at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendancePolicy {
    pub weights: WeightPolicy,
    pub pass_threshold: f64,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            weights: WeightPolicy::default_weighted(),
            pass_threshold: attendance::DEFAULT_PASS_THRESHOLD,
        }
    }
}

/// Mutation of the session's entry map, applied by the engine after a
/// transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    ClearEntries,
    RecordEntry { component: Component, value: f64 },
}

/// Result of a state transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub replies: Vec<Reply>,
    pub effects: Vec<SessionEffect>,
}

impl TransitionResult {
    fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            replies: vec![],
            effects: vec![],
        }
    }

    fn with_reply(mut self, reply: Reply) -> Self {
        self.replies.push(reply);
        self
    }

    fn with_effect(mut self, effect: SessionEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Menu options: every component plus the "Done" terminator.
pub fn menu_options() -> Vec<String> {
    Component::ALL
        .iter()
        .map(|c| c.as_str().to_string())
        .chain(std::iter::once(DONE_LABEL.to_string()))
        .collect()
}

/// Dispatch one event against the current session state.
pub fn transition(
    session: &Session,
    event: ConvEvent,
    policy: &AttendancePolicy,
) -> TransitionResult {
    match (session.state, event) {
        // Cancel wins from any state. Terminal; the engine discards the session.
        (_, ConvEvent::Cancel) => TransitionResult::new(ConvState::Ended)
            .with_reply(Reply::text(MSG_CANCELLED)),

        // Start (or restart) always resets the entry map.
        (_, ConvEvent::Start) => TransitionResult::new(ConvState::SelectingComponent)
            .with_effect(SessionEffect::ClearEntries)
            .with_reply(Reply::with_menu(PROMPT_SELECT, menu_options())),

        (ConvState::SelectingComponent, ConvEvent::Text(text)) => {
            let text = text.trim();
            if text == DONE_LABEL {
                return finish(session, policy);
            }
            match Component::parse(text) {
                Some(component) => {
                    TransitionResult::new(ConvState::EnteringPercentage { pending: component })
                        .with_reply(Reply::text(format!(
                            "Enter attendance percentage for {component} (e.g., 75)"
                        )))
                }
                None => TransitionResult::new(ConvState::SelectingComponent)
                    .with_reply(Reply::text(MSG_INVALID_COMPONENT))
                    .with_reply(Reply::with_menu(PROMPT_SELECT, menu_options())),
            }
        }

        (ConvState::EnteringPercentage { pending }, ConvEvent::Text(text)) => {
            match parse_percentage(&text) {
                Some(value) => TransitionResult::new(ConvState::SelectingComponent)
                    .with_effect(SessionEffect::RecordEntry {
                        component: pending,
                        value,
                    })
                    .with_reply(Reply::with_menu(PROMPT_SELECT_AGAIN, menu_options())),
                // Re-prompt in place; the pending component is retained.
                None => TransitionResult::new(ConvState::EnteringPercentage { pending })
                    .with_reply(Reply::text(MSG_INVALID_NUMBER)),
            }
        }

        // Text outside a started conversation is not attendance input.
        (ConvState::Idle | ConvState::Ended, ConvEvent::Text(_)) => {
            TransitionResult::new(session.state)
        }
    }
}

/// "Done": aggregate and report, then reset for immediate reuse. Empty or
/// zero-weight data falls back to selection with the error message.
fn finish(session: &Session, policy: &AttendancePolicy) -> TransitionResult {
    match attendance::aggregate(&session.entries, &policy.weights) {
        Ok(report) => TransitionResult::new(ConvState::SelectingComponent)
            .with_effect(SessionEffect::ClearEntries)
            .with_reply(Reply::text(report.render(policy.pass_threshold)))
            .with_reply(Reply::with_menu(PROMPT_AFTER_REPORT, menu_options())),
        Err(err) => TransitionResult::new(ConvState::SelectingComponent)
            .with_reply(Reply::text(err.to_string()))
            .with_reply(Reply::with_menu(PROMPT_SELECT, menu_options())),
    }
}

/// Percentages must parse as finite reals. NaN and infinities are rejected
/// so the entry map only ever holds finite numbers.
fn parse_percentage(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
