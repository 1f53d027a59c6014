//! Integration tests for settings and playback state persistence.

use std::collections::BTreeMap;
use std::path::Path;

use bite::config::BiteConfig;
use bite::playback::{ReadinessCheck, Script};
use bite::runner::PlaybackSettings;
use bite::settings::{DisplayTab, PlaybackTab, SettingsPage, SettingsStore, SettingsTab};
use bite::state::{PlaybackState, PlaybackStatus, StopRequest};
use bite::BiteError;
use tempfile::TempDir;

fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn tabs_round_trip_through_store() {
    let temp = TempDir::new().unwrap();

    let mut playback = SettingsTab::by_name("playback").unwrap();
    playback
        .set_properties(props(&[(PlaybackTab::MAX_ATTEMPTS, "8")]))
        .unwrap();
    playback
        .add_properties(props(&[(PlaybackTab::READY_FILE, "tmp/ready")]))
        .unwrap();

    let mut store = SettingsStore::default();
    playback.save_setting(&mut store);
    store.save_to(temp.path()).unwrap();

    let loaded = SettingsStore::load_from(temp.path()).unwrap();
    let tab = SettingsTab::for_key(PlaybackTab::MAX_ATTEMPTS)
        .unwrap()
        .loaded(&loaded)
        .unwrap();

    assert_eq!(tab.properties(), playback.properties());
}

#[test]
fn tabs_only_accept_their_own_keys() {
    let mut display = SettingsTab::by_name("display").unwrap();
    let err = display
        .add_properties(props(&[(PlaybackTab::MAX_ATTEMPTS, "3")]))
        .unwrap_err();

    assert!(matches!(err, BiteError::UnknownSetting { .. }));
    assert!(display
        .add_properties(props(&[(DisplayTab::OUTPUT, "quiet")]))
        .is_ok());
}

#[test]
fn stored_settings_override_config() {
    let config: BiteConfig = serde_yaml::from_str(
        "playback:\n  poll_interval_ms: 500\n  max_attempts: 4\n  capture_output: false\n",
    )
    .unwrap();

    let mut store = SettingsStore::default();
    store.set(PlaybackTab::POLL_INTERVAL_MS, "50");

    let settings = PlaybackSettings::resolve(&config, &store).unwrap();

    assert_eq!(settings.policy.interval.as_millis(), 50);
    assert_eq!(settings.policy.max_attempts, 4);
    assert!(!settings.capture_output);
    assert_eq!(settings.ready, ReadinessCheck::Always);
}

#[test]
fn playback_state_resumes_only_same_script() {
    let temp = TempDir::new().unwrap();
    let script = Script::from_source(Path::new("flow.bite"), "a\nb\nc".to_string()).unwrap();
    let edited = Script::from_source(Path::new("flow.bite"), "a\nB\nc".to_string()).unwrap();

    let mut state = PlaybackState::start(&script, 0);
    state.record_progress(2);
    state.finish(PlaybackStatus::Failed, Some("boom".to_string()));
    state.save_to(temp.path()).unwrap();

    let loaded = PlaybackState::load_from(temp.path()).unwrap().unwrap();
    assert_eq!(loaded.resume_index(script.fingerprint()), Some(2));
    assert_eq!(loaded.resume_index(edited.fingerprint()), None);
}

#[test]
fn stop_request_is_consumed_once() {
    let temp = TempDir::new().unwrap();
    let stop = StopRequest::in_dir(temp.path());

    assert!(!stop.take());
    stop.request().unwrap();
    assert!(stop.is_pending());
    assert!(stop.take());
    assert!(!stop.is_pending());
}
