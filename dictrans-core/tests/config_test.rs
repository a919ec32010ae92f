use dictrans_core::config::*;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = DictTransConfig::from_toml("").unwrap();

    // Structural cache defaults
    assert_eq!(config.structural_cache.max_size, 1_000);
    assert_eq!(config.structural_cache.expire_after_access_secs, 3_600);
    assert_eq!(config.structural_cache.failed_build_retry_secs, 60);

    // Reflective cache defaults
    assert_eq!(config.reflection_cache.max_size, 500);
    assert_eq!(config.reflection_cache.expire_after_access_secs, 1_800);

    // Processing defaults
    assert_eq!(config.processing.max_depth, 10);
    assert_eq!(config.processing.max_collection_size, 1_000);
    assert_eq!(config.processing.default_delimiter, ",");
    assert_eq!(config.processing.timeout_ms, 30_000);
    assert!(config.processing.enable_circuit_breaker);
    assert_eq!(config.processing.circuit_breaker.failure_threshold, 5);
    assert_eq!(config.processing.circuit_breaker.success_threshold, 3);
    assert_eq!(config.processing.circuit_breaker.open_timeout_ms, 120_000);
    assert_eq!(config.processing.circuit_breaker.sliding_window_size, 20);
    assert_eq!(config.processing.circuit_breaker.minimum_throughput, 10);

    // Monitoring defaults
    assert!(config.monitoring.enabled);
    assert_eq!(config.monitoring.interval_ms, 60_000);
    assert_eq!(config.monitoring.history_size, 100);
    assert_eq!(config.monitoring.medium_threshold, 0.70);
    assert_eq!(config.monitoring.high_threshold, 0.85);
    assert_eq!(config.monitoring.critical_threshold, 0.95);
    assert_eq!(config.monitoring.shutdown_timeout_ms, 5_000);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[structural_cache]
max_size = 42

[monitoring]
interval_ms = 250
"#;
    let config = DictTransConfig::from_toml(toml).unwrap();
    assert_eq!(config.structural_cache.max_size, 42);
    // Non-overridden fields keep defaults
    assert_eq!(config.structural_cache.expire_after_access_secs, 3_600);
    assert_eq!(config.monitoring.interval_ms, 250);
    assert_eq!(config.monitoring.history_size, 100);
}

#[test]
fn circuit_breaker_section_nests_under_processing() {
    let toml = r#"
[processing]
timeout_ms = 0
enable_circuit_breaker = false

[processing.circuit_breaker]
failure_threshold = 3
"#;
    let config = DictTransConfig::from_toml(toml).unwrap();
    assert_eq!(config.processing.timeout_ms, 0);
    assert!(!config.processing.enable_circuit_breaker);
    assert_eq!(config.processing.circuit_breaker.failure_threshold, 3);
    assert_eq!(config.processing.circuit_breaker.sliding_window_size, 20);
}

#[test]
fn validated_keeps_failure_threshold_within_the_window() {
    let mut config = DictTransConfig::default();
    config.processing.circuit_breaker.sliding_window_size = 0;
    config.processing.circuit_breaker.failure_threshold = 50;
    config.processing.circuit_breaker.success_threshold = 0;

    let config = config.validated();
    let breaker = &config.processing.circuit_breaker;
    assert_eq!(breaker.sliding_window_size, 20);
    assert_eq!(breaker.failure_threshold, 5);
    assert_eq!(breaker.success_threshold, 3);
}

#[test]
fn malformed_toml_is_a_config_error() {
    let err = DictTransConfig::from_toml("[processing\nmax_depth = ").unwrap_err();
    assert!(matches!(err, dictrans_core::DictTransError::ConfigError(_)));
}

#[test]
fn config_serde_roundtrip() {
    let config = DictTransConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    let roundtripped = DictTransConfig::from_toml(&toml_str).unwrap();
    assert_eq!(
        roundtripped.reflection_cache.max_size,
        config.reflection_cache.max_size
    );
    assert_eq!(
        roundtripped.processing.default_delimiter,
        config.processing.default_delimiter
    );
}

#[test]
fn validated_replaces_invalid_values() {
    let toml = r#"
[structural_cache]
max_size = 0

[processing]
max_depth = 0
default_delimiter = ""

[monitoring]
interval_ms = 0
medium_threshold = 0.9
high_threshold = 0.8
critical_threshold = 1.5
high_eviction_ratio = 2.0
"#;
    let config = DictTransConfig::from_toml(toml).unwrap().validated();
    assert_eq!(config.structural_cache.max_size, defaults::DEFAULT_STRUCTURAL_CACHE_MAX_SIZE);
    assert_eq!(config.processing.max_depth, defaults::DEFAULT_MAX_DEPTH);
    assert_eq!(config.processing.default_delimiter, ",");
    assert_eq!(config.monitoring.interval_ms, defaults::DEFAULT_MONITORING_INTERVAL_MS);
    assert_eq!(config.monitoring.medium_threshold, 0.70);
    assert_eq!(config.monitoring.high_threshold, 0.85);
    assert_eq!(config.monitoring.critical_threshold, 0.95);
    assert_eq!(config.monitoring.high_eviction_ratio, 0.50);
}

#[test]
fn validated_keeps_valid_values() {
    let toml = r#"
[monitoring]
medium_threshold = 0.5
high_threshold = 0.6
critical_threshold = 0.7
"#;
    let config = DictTransConfig::from_toml(toml).unwrap().validated();
    assert_eq!(config.monitoring.medium_threshold, 0.5);
    assert_eq!(config.monitoring.high_threshold, 0.6);
    assert_eq!(config.monitoring.critical_threshold, 0.7);
}
