//! The conversation controller.
//!
//! A small finite state machine per session: select a component, enter a
//! percentage, repeat, then "Done" aggregates and reports. The transition
//! function is pure (`transition.rs`); this module owns the session store
//! and applies the resulting effects.

pub mod event;
pub mod session;
pub mod state;
pub mod transition;

pub use event::{ConvEvent, Reply};
pub use session::{Session, SessionStore};
pub use state::ConvState;
pub use transition::{AttendancePolicy, SessionEffect, TransitionResult, DONE_LABEL};

use transition::transition;

/// Drives every conversation: looks up the session, runs the transition,
/// applies entry effects, and hands the replies back to the transport.
#[derive(Debug, Default)]
pub struct ConversationEngine {
    store: SessionStore,
    policy: AttendancePolicy,
}

impl ConversationEngine {
    pub fn new(policy: AttendancePolicy) -> Self {
        Self {
            store: SessionStore::new(),
            policy,
        }
    }

    /// Process one inbound event for `session_id` and return the replies to
    /// send. Each call fully processes its event before returning, so
    /// messages for one session are never interleaved.
    pub fn handle(&mut self, session_id: &str, event: ConvEvent) -> Vec<Reply> {
        let session = match event {
            // Start creates the session if needed.
            ConvEvent::Start => self.store.get_or_create(session_id),
            ConvEvent::Cancel | ConvEvent::Text(_) => match self.store.get_mut(session_id) {
                Some(session) => session,
                None => {
                    tracing::debug!(session_id, "message for unknown session ignored");
                    return vec![];
                }
            },
        };

        let result = transition(session, event, &self.policy);

        for effect in &result.effects {
            match effect {
                SessionEffect::ClearEntries => session.entries.clear(),
                SessionEffect::RecordEntry { component, value } => {
                    session.entries.insert(*component, *value);
                }
            }
        }
        session.state = result.new_state;

        tracing::debug!(
            session_id,
            state = ?result.new_state,
            replies = result.replies.len(),
            "conversation transition"
        );

        if result.new_state.is_terminal() {
            self.store.destroy(session_id);
        }

        result.replies
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ConversationEngine {
        ConversationEngine::new(AttendancePolicy::default())
    }

    #[test]
    fn start_creates_session_and_emits_menu() {
        let mut engine = engine();
        let replies = engine.handle("chat", ConvEvent::Start);

        assert_eq!(engine.session_count(), 1);
        assert!(replies[0].menu.is_some());
    }

    #[test]
    fn full_flow_to_report() {
        let mut engine = engine();
        engine.handle("chat", ConvEvent::Start);
        engine.handle("chat", ConvEvent::Text("Lecture".into()));
        engine.handle("chat", ConvEvent::Text("90".into()));
        engine.handle("chat", ConvEvent::Text("Practical".into()));
        engine.handle("chat", ConvEvent::Text("70".into()));

        let replies = engine.handle("chat", ConvEvent::Text("Done".into()));
        assert!(replies[0].text.contains("83.33%"));

        // Session was reset for immediate reuse: a new component selection
        // works without another start command.
        let replies = engine.handle("chat", ConvEvent::Text("Tutorial".into()));
        assert!(replies[0].text.contains("Tutorial"));
    }

    #[test]
    fn restart_is_idempotent() {
        let mut engine = engine();
        engine.handle("chat", ConvEvent::Start);
        engine.handle("chat", ConvEvent::Text("Lecture".into()));
        engine.handle("chat", ConvEvent::Text("55".into()));

        // Second start wipes the recorded entry.
        engine.handle("chat", ConvEvent::Start);
        let replies = engine.handle("chat", ConvEvent::Text("Done".into()));

        assert!(replies[0].text.contains("No attendance data"));
        assert_eq!(engine.session_count(), 1);
    }

    #[test]
    fn cancel_discards_session_and_mutes_followups() {
        let mut engine = engine();
        engine.handle("chat", ConvEvent::Start);
        let replies = engine.handle("chat", ConvEvent::Cancel);

        assert!(replies[0].text.contains("canceled"));
        assert_eq!(engine.session_count(), 0);

        // Attendance input after cancel is not processed.
        assert!(engine.handle("chat", ConvEvent::Text("Lecture".into())).is_empty());
        assert!(engine.handle("chat", ConvEvent::Text("90".into())).is_empty());
    }

    #[test]
    fn cancel_without_session_is_ignored() {
        let mut engine = engine();
        assert!(engine.handle("chat", ConvEvent::Cancel).is_empty());
        assert_eq!(engine.session_count(), 0);
    }

    #[test]
    fn invalid_number_preserves_recorded_entries() {
        let mut engine = engine();
        engine.handle("chat", ConvEvent::Start);
        engine.handle("chat", ConvEvent::Text("Lecture".into()));
        engine.handle("chat", ConvEvent::Text("80".into()));
        engine.handle("chat", ConvEvent::Text("Tutorial".into()));

        // Bad input re-prompts; the Lecture entry must survive.
        let replies = engine.handle("chat", ConvEvent::Text("ninety".into()));
        assert!(replies[0].text.contains("Invalid input"));

        engine.handle("chat", ConvEvent::Text("90".into()));
        let replies = engine.handle("chat", ConvEvent::Text("Done".into()));
        assert!(replies[0].text.contains("Lecture: 80.00%"));
        assert!(replies[0].text.contains("Tutorial: 90.00%"));
    }

    #[test]
    fn sessions_do_not_leak_across_ids() {
        let mut engine = engine();
        engine.handle("alice", ConvEvent::Start);
        engine.handle("alice", ConvEvent::Text("Lecture".into()));
        engine.handle("alice", ConvEvent::Text("100".into()));

        engine.handle("bob", ConvEvent::Start);
        let replies = engine.handle("bob", ConvEvent::Text("Done".into()));

        assert!(replies[0].text.contains("No attendance data"));
    }

    #[test]
    fn equal_weight_policy_reaches_pass_verdict() {
        let mut engine = ConversationEngine::new(AttendancePolicy {
            weights: crate::attendance::WeightPolicy::Equal,
            pass_threshold: crate::attendance::DEFAULT_PASS_THRESHOLD,
        });
        engine.handle("chat", ConvEvent::Start);
        engine.handle("chat", ConvEvent::Text("Lecture".into()));
        engine.handle("chat", ConvEvent::Text("80".into()));
        engine.handle("chat", ConvEvent::Text("Tutorial".into()));
        engine.handle("chat", ConvEvent::Text("90".into()));

        let replies = engine.handle("chat", ConvEvent::Text("Done".into()));
        assert!(replies[0].text.contains("85.00%"));
        assert!(replies[0].text.contains("above 85%"));
    }
}
