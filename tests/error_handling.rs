use std::sync::Arc;

use devfp::{
    compare, generate_with, Collector, Comparator, ConfigLoadError, DevfpConfig, FieldWeights,
    FixedSignal, MatchConfig, MatchError, MatchMode, Probed, SignalSet,
};
use serde_json::json;

#[test]
fn config_errors_are_typed() {
    assert!(matches!(
        DevfpConfig::from_yaml("version: \"9\"\n"),
        Err(ConfigLoadError::UnsupportedVersion(_))
    ));
    assert!(matches!(
        DevfpConfig::from_yaml("version: [unclosed\n"),
        Err(ConfigLoadError::YamlParse(_))
    ));
    assert!(matches!(
        DevfpConfig::from_yaml("version: \"1\"\nsignals:\n  salt_key: \"\"\n"),
        Err(ConfigLoadError::Validation(_))
    ));
}

#[test]
fn zero_weight_comparator_is_rejected() {
    let weights = FieldWeights {
        audio_hash: 0,
        drm_hash: 0,
        canvas_hash: 0,
        user_agent: 0,
        screen_res: 0,
        device_memory: 0,
        hardware_concurrency: 0,
        timezone: 0,
        language: 0,
        primary_language: 0,
    };
    let err = Comparator::new(MatchConfig { weights }).unwrap_err();
    assert!(matches!(err, MatchError::InvalidConfig(_)));
}

#[test]
fn invalid_component_shapes_score_zero() {
    let report = Comparator::default().explain(
        json!({"components": "not-an-object"}),
        json!({"components": "not-an-object"}),
    );
    assert_eq!(report.mode, MatchMode::Invalid);
    assert_eq!(report.score, 0.0);
}

#[test]
fn hostile_text_never_panics() {
    let inputs = [
        "",
        "   ",
        "{",
        "[",
        "}{",
        "null",
        "{\"components\": {\"audioHash\": [1, {\"x\": null}]}}",
        "[[[[[[[[[[]]]]]]]]]]",
        "\u{0}\u{1}\u{2}",
        "{\"idOnly\": 5}",
    ];
    for left in inputs {
        for right in inputs {
            let score = compare(left, right);
            assert!((0.0..=1.0).contains(&score));
        }
    }
}

#[tokio::test]
async fn failing_probes_degrade_instead_of_failing() {
    let collector = Collector::new(SignalSet {
        audio: Arc::new(FixedSignal::unavailable("audio")),
        drm: Arc::new(FixedSignal::unsupported("drm")),
        canvas: Arc::new(FixedSignal::unavailable("canvas")),
        storage_salt: Arc::new(FixedSignal::unavailable("storage_salt")),
        private_mode: Arc::new(FixedSignal::unavailable("private_mode")),
        device_info: Arc::new(FixedSignal::unavailable("device_info")),
        locale_info: Arc::new(FixedSignal::unsupported("locale_info")),
    });

    let fp = generate_with(&collector).await;
    let c = &fp.components;
    assert_eq!(c.audio_hash, Probed::Unavailable);
    assert_eq!(c.drm_hash, Probed::Unsupported);
    assert_eq!(c.storage_salt, Probed::Unavailable);
    assert!(c.private_flag);
    assert_eq!(c.device_info.user_agent, Probed::Unavailable);
    assert_eq!(c.locale_info.timezone, Probed::Unavailable);
    assert!(c.locale_info.languages.is_empty());
    assert!(!fp.identifier.is_empty());

    let value = c.to_value();
    for key in devfp::ComponentRecord::KEYS {
        assert!(value.get(key).is_some(), "missing key {key}");
    }
}
