// tests/engine_scenarios.rs
//
// End-to-end decision scenarios against the public engine API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ethfee_monitor::cross::{detect_cross, CrossEvent, Direction, ThresholdSet};
use ethfee_monitor::engine::{AlertDecisionEngine, DecisionConfig, DecisionKind};
use ethfee_monitor::notify::AlertKind;
use ethfee_monitor::sample::FeeSample;
use ethfee_monitor::state::EngineState;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn sample(base_fee: f64, at: DateTime<Utc>) -> FeeSample {
    FeeSample {
        base_fee,
        safe_fee: base_fee,
        propose_fee: base_fee,
        fast_fee: base_fee * 1.1,
        block: "22000000".into(),
        observed_at: at,
    }
}

fn thresholds() -> ThresholdSet {
    ThresholdSet::new(vec![12.0, 20.0, 35.0]).unwrap()
}

fn engine_with(last_fee: f64, notified_ago_secs: i64) -> AlertDecisionEngine {
    let mut state = EngineState::default();
    state.alert.last_fee = Some(last_fee);
    state.alert.last_notification_at = Some(t0() - Duration::seconds(notified_ago_secs));
    AlertDecisionEngine::new(thresholds(), DecisionConfig::default(), state)
}

#[test]
fn first_ever_sample_is_no_action_and_seeds_fee() {
    let mut e = AlertDecisionEngine::new(thresholds(), DecisionConfig::default(), EngineState::default());
    let d = e.process(&sample(20.0, t0()), Some(2500.0)).unwrap();
    assert_eq!(d.kind(), DecisionKind::NoAction);
    assert_eq!(e.state().alert.last_fee, Some(20.0));
    assert!(e.state().events.is_empty());
}

#[test]
fn drop_through_twenty_alerts_outside_debounce() {
    let mut e = engine_with(20.0, 60);
    let d = e.process(&sample(19.0, t0()), None).unwrap();
    assert_eq!(d.kind(), DecisionKind::CrossAlert);
    match d.payload().map(|p| p.kind) {
        Some(AlertKind::Cross { event, delta }) => {
            assert_eq!(event, CrossEvent { threshold: 20.0, direction: Direction::Below });
            assert_eq!(delta, -1.0);
        }
        other => panic!("expected cross payload, got {other:?}"),
    }
    assert_eq!(e.state().events.len(), 1);
    assert_eq!(e.state().events.recent(1)[0].logged_at, t0());
    assert_eq!(e.state().alert.last_notification_at, Some(t0()));
}

#[test]
fn drop_through_twenty_inside_debounce_is_suppressed() {
    let mut e = engine_with(20.0, 10);
    let before = e.state().alert.last_notification_at;
    let d = e.process(&sample(19.0, t0()), None).unwrap();
    assert_eq!(d.kind(), DecisionKind::NoAction);
    assert!(e.state().events.is_empty());
    assert_eq!(e.state().alert.last_notification_at, before);
}

#[test]
fn silence_without_crossing_yields_heartbeat() {
    let mut e = engine_with(15.0, 43_200 + 1);
    let d = e.process(&sample(15.1, t0()), None).unwrap();
    assert_eq!(d.kind(), DecisionKind::Heartbeat);
    assert!(d.payload().unwrap().is_heartbeat());
    assert!(e.state().events.is_empty());
    assert_eq!(e.state().alert.last_notification_at, Some(t0()));
}

#[test]
fn crossing_wins_over_heartbeat_when_both_apply() {
    let mut e = engine_with(19.0, 50_000);
    let d = e.process(&sample(21.0, t0()), None).unwrap();
    assert_eq!(d.kind(), DecisionKind::CrossAlert);
    assert_eq!(e.state().events.len(), 1);
}

#[test]
fn suppressed_small_cross_falls_back_to_heartbeat_after_silence() {
    // 0.2 Gwei move is below min delta, but 12h have passed
    let mut e = engine_with(20.1, 43_200);
    let d = e.process(&sample(19.9, t0()), None).unwrap();
    assert_eq!(d.kind(), DecisionKind::Heartbeat);
    assert!(e.state().events.is_empty());
}

#[test]
fn sequence_debounces_then_allows() {
    let mut e = engine_with(10.0, 3600);
    // up through 12 → alert
    let d1 = e.process(&sample(13.0, t0()), None).unwrap();
    assert_eq!(d1.kind(), DecisionKind::CrossAlert);
    // back down 30 s later → debounced
    let d2 = e.process(&sample(11.0, t0() + Duration::seconds(30)), None).unwrap();
    assert_eq!(d2.kind(), DecisionKind::NoAction);
    // up again 90 s after the alert → allowed
    let d3 = e.process(&sample(12.5, t0() + Duration::seconds(90)), None).unwrap();
    assert_eq!(d3.kind(), DecisionKind::CrossAlert);
    let logged: Vec<(f64, Direction)> = e
        .state()
        .events
        .recent(10)
        .iter()
        .map(|x| (x.threshold, x.direction))
        .collect();
    assert_eq!(logged, vec![(12.0, Direction::Above), (12.0, Direction::Above)]);
    assert_eq!(e.state().revision, 3);
}

#[test]
fn nearest_threshold_is_reported_for_multi_level_moves() {
    let t = ThresholdSet::default();
    let up = detect_cross(1.5, 40.0, &t).unwrap();
    assert_eq!((up.threshold, up.direction), (2.0, Direction::Above));
    let down = detect_cross(150.0, 4.0, &t).unwrap();
    assert_eq!((down.threshold, down.direction), (100.0, Direction::Below));
}
