//! Applied-state change detection across the config boundary.

use ccd_common::{AppliedStateCache, ControllerConfig};

#[test]
fn fingerprint_cache_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("controller.toml");

    let config = ControllerConfig::default();
    std::fs::write(&config_path, config.to_toml().unwrap()).unwrap();
    let fingerprint = config.fingerprint().unwrap();

    let cache = AppliedStateCache::for_config(&config_path);
    assert!(!cache.matches(fingerprint), "nothing applied yet");

    cache.store(fingerprint).unwrap();
    assert!(cache.matches(fingerprint));

    // A fresh handle to the same sidecar file sees the same state.
    let reloaded = AppliedStateCache::for_config(&config_path);
    assert_eq!(reloaded.load(), Some(fingerprint));
}

#[test]
fn edited_config_no_longer_matches_the_applied_state() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("controller.toml");

    let config = ControllerConfig::default();
    std::fs::write(&config_path, config.to_toml().unwrap()).unwrap();

    let cache = AppliedStateCache::for_config(&config_path);
    cache.store(config.fingerprint().unwrap()).unwrap();

    // Operator edits the integration time on disk.
    let mut edited = config.clone();
    edited.timing.integral_time = 42.0;
    std::fs::write(&config_path, edited.to_toml().unwrap()).unwrap();

    let reparsed = ControllerConfig::from_file(&config_path).unwrap();
    assert!(!cache.matches(reparsed.fingerprint().unwrap()));
}
