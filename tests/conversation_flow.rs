//! Integration tests for the attendance conversation.
//!
//! Drives the conversation engine end to end, the way the dispatcher does,
//! and checks the emitted replies.

use attendance_bot::attendance::DEFAULT_PASS_THRESHOLD;
use attendance_bot::conversation::{AttendancePolicy, ConvEvent, ConversationEngine, Reply};
use attendance_bot::WeightPolicy;

fn engine() -> ConversationEngine {
    ConversationEngine::new(AttendancePolicy::default())
}

fn equal_weight_engine() -> ConversationEngine {
    ConversationEngine::new(AttendancePolicy {
        weights: WeightPolicy::Equal,
        pass_threshold: DEFAULT_PASS_THRESHOLD,
    })
}

fn text(t: &str) -> ConvEvent {
    ConvEvent::Text(t.to_string())
}

/// Enter one component/percentage pair through the two-step dialogue.
fn enter(engine: &mut ConversationEngine, session: &str, component: &str, percentage: &str) {
    let replies = engine.handle(session, text(component));
    assert!(
        replies[0].text.contains(component),
        "expected percentage prompt for {component}, got: {}",
        replies[0].text
    );
    engine.handle(session, text(percentage));
}

fn report_of(replies: &[Reply]) -> &str {
    &replies[0].text
}

// ─────────────────────────────────────────────────────────────────────────────
// Full Conversations
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn weighted_conversation_produces_fail_verdict() {
    let mut engine = engine();
    engine.handle("chat", ConvEvent::Start);

    enter(&mut engine, "chat", "Lecture", "90");
    enter(&mut engine, "chat", "Practical", "70");

    let replies = engine.handle("chat", text("Done"));
    let report = report_of(&replies);

    // 90 * 1.0 + 70 * 0.5 = 125 over weight sum 1.5
    assert!(report.contains("Lecture: 90.00%"));
    assert!(report.contains("Practical: 70.00%"));
    assert!(report.contains("83.33%"));
    assert!(report.contains("Below 85%"));

    // A fresh menu follows the report.
    assert!(replies[1].menu.is_some());
}

#[test]
fn equal_weight_conversation_produces_pass_verdict() {
    let mut engine = equal_weight_engine();
    engine.handle("chat", ConvEvent::Start);

    enter(&mut engine, "chat", "Lecture", "80");
    enter(&mut engine, "chat", "Tutorial", "90");

    let replies = engine.handle("chat", text("Done"));
    let report = report_of(&replies);

    assert!(report.contains("85.00%"));
    assert!(report.contains("above 85%"));
}

#[test]
fn reentering_a_component_overwrites_the_previous_value() {
    let mut engine = equal_weight_engine();
    engine.handle("chat", ConvEvent::Start);

    enter(&mut engine, "chat", "Lecture", "40");
    enter(&mut engine, "chat", "Lecture", "90");

    let replies = engine.handle("chat", text("Done"));
    let report = report_of(&replies);

    assert!(report.contains("Lecture: 90.00%"));
    assert!(report.contains("Final Attendance: 90.00%"));
}

#[test]
fn session_is_reusable_after_a_report_without_restart() {
    let mut engine = engine();
    engine.handle("chat", ConvEvent::Start);
    enter(&mut engine, "chat", "Lecture", "90");
    engine.handle("chat", text("Done"));

    // Straight into a new round: the report reset the entries.
    enter(&mut engine, "chat", "Tutorial", "50");
    let replies = engine.handle("chat", text("Done"));
    let report = report_of(&replies);

    assert!(report.contains("Tutorial: 50.00%"));
    assert!(!report.contains("Lecture"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Error Recovery
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn done_before_any_entry_reports_no_data() {
    let mut engine = engine();
    engine.handle("chat", ConvEvent::Start);

    let replies = engine.handle("chat", text("Done"));

    assert!(report_of(&replies).contains("No attendance data"));
    // Conversation continues: selection still works.
    let replies = engine.handle("chat", text("Skilling"));
    assert!(replies[0].text.contains("Skilling"));
}

#[test]
fn invalid_component_then_valid_component_recovers() {
    let mut engine = engine();
    engine.handle("chat", ConvEvent::Start);

    let replies = engine.handle("chat", text("Gym"));
    assert!(replies[0].text.contains("Invalid component"));
    assert!(replies[1].menu.is_some());

    enter(&mut engine, "chat", "Lecture", "100");
    let replies = engine.handle("chat", text("Done"));
    assert!(report_of(&replies).contains("100.00%"));
}

#[test]
fn invalid_number_keeps_prior_entries_and_pending_component() {
    let mut engine = equal_weight_engine();
    engine.handle("chat", ConvEvent::Start);
    enter(&mut engine, "chat", "Lecture", "80");

    engine.handle("chat", text("Tutorial"));
    let replies = engine.handle("chat", text("abc"));
    assert!(replies[0].text.contains("Invalid input"));

    // The retry still targets Tutorial; nothing was lost.
    engine.handle("chat", text("90"));
    let replies = engine.handle("chat", text("Done"));
    let report = report_of(&replies);
    assert!(report.contains("Lecture: 80.00%"));
    assert!(report.contains("Tutorial: 90.00%"));
    assert!(report.contains("85.00%"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn double_start_never_leaks_prior_entries() {
    let mut engine = engine();
    engine.handle("chat", ConvEvent::Start);
    enter(&mut engine, "chat", "Lecture", "99");

    engine.handle("chat", ConvEvent::Start);
    engine.handle("chat", ConvEvent::Start);

    let replies = engine.handle("chat", text("Done"));
    assert!(report_of(&replies).contains("No attendance data"));
}

#[test]
fn cancel_mid_entry_discards_everything() {
    let mut engine = engine();
    engine.handle("chat", ConvEvent::Start);
    engine.handle("chat", text("Lecture"));

    let replies = engine.handle("chat", ConvEvent::Cancel);
    assert!(replies[0].text.contains("canceled"));
    assert_eq!(engine.session_count(), 0);

    // Percentage for the cancelled conversation goes nowhere.
    assert!(engine.handle("chat", text("75")).is_empty());

    // But a new start works from scratch.
    let replies = engine.handle("chat", ConvEvent::Start);
    assert!(replies[0].menu.is_some());
}

#[test]
fn two_users_run_independent_conversations() {
    let mut engine = equal_weight_engine();
    engine.handle("alice", ConvEvent::Start);
    engine.handle("bob", ConvEvent::Start);

    enter(&mut engine, "alice", "Lecture", "100");
    enter(&mut engine, "bob", "Lecture", "10");

    let alice = engine.handle("alice", text("Done"));
    let bob = engine.handle("bob", text("Done"));

    assert!(report_of(&alice).contains("100.00%"));
    assert!(report_of(&bob).contains("10.00%"));
}
