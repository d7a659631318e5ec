//! Integration test: axes discovery over the synthetic archive.

use gribjump_client::{ClientConfig, ConfigError, GribJump, GribJumpError};
use gribjump_core::RequestKey;
use gribjump_test_utils::fixtures::synthetic_engine;

fn partial() -> RequestKey {
    RequestKey::builder()
        .select("class", "od")
        .select("expver", "0001")
        .select("stream", "oper")
        .select("date", "20230508")
        .select("time", "1200")
        .build()
}

#[test]
fn key_count_grows_with_level() {
    let client = GribJump::new(synthetic_engine(5));
    for (level, expected) in [(1, 6), (2, 8), (3, 11)] {
        let axes = client.axes(&partial(), Some(level), None).unwrap();
        assert_eq!(axes.level(), level);
        assert_eq!(axes.len(), expected, "level {level}");
    }
}

#[test]
fn default_level_is_finest() {
    let client = GribJump::new(synthetic_engine(5));
    let axes = client.axes(&partial(), None, None).unwrap();
    assert_eq!(axes.level(), 3);
    let steps: Vec<&str> = axes.get("step").unwrap().iter().map(String::as_str).collect();
    assert_eq!(steps, vec!["0", "1", "2", "3", "4"]);
    let params: Vec<&String> = axes.get("param").unwrap().iter().collect();
    assert_eq!(params, vec!["151130"]);
    assert!(axes.contains("levelist"));
}

#[test]
fn configured_default_level_applies() {
    let config = ClientConfig {
        default_axes_level: 1,
        ..Default::default()
    };
    let client = GribJump::with_config(synthetic_engine(1), config).unwrap();
    let axes = client.axes(&partial(), None, None).unwrap();
    assert_eq!(axes.keys().collect::<Vec<_>>(), vec![
        "class", "date", "domain", "expver", "stream", "time"
    ]);
}

#[test]
fn narrowing_the_key_narrows_values() {
    let client = GribJump::new(synthetic_engine(5));
    let key = RequestKey::builder()
        .select("class", "od")
        .select_many("step", ["1", "3"])
        .build();
    let axes = client.axes(&key, Some(3), None).unwrap();
    let steps: Vec<&str> = axes.get("step").unwrap().iter().map(String::as_str).collect();
    assert_eq!(steps, vec!["1", "3"]);
}

#[test]
fn unreachable_key_reports_empty_axes() {
    let client = GribJump::new(synthetic_engine(2));
    let key = RequestKey::builder().select("class", "rd").build();
    let axes = client.axes(&key, Some(2), None).unwrap();
    assert_eq!(axes.len(), 8);
    assert!(axes.iter().all(|(_, values)| values.is_empty()));
}

#[test]
fn level_outside_range_is_rejected_locally() {
    let engine = synthetic_engine(1);
    let client = GribJump::new(engine.clone());
    assert!(matches!(
        client.axes(&partial(), Some(0), None),
        Err(GribJumpError::Config(ConfigError::AxesLevelOutOfRange { level: 0 }))
    ));
    assert_eq!(engine.counts().axes_calls(), 0);
}
