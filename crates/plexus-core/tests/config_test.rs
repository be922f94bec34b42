use plexus_core::config::PlexusConfig;

#[test]
fn default_config_is_valid() {
    let config = PlexusConfig::default();
    assert!(config.validate().is_ok());
}

#[test]
fn partial_toml_overrides_only_named_fields() {
    let toml = r#"
        [retrieval]
        hop_limit = 5

        [decay]
        decay_rate = 0.99
    "#;
    let config = PlexusConfig::from_toml(toml).unwrap();
    assert_eq!(config.retrieval.hop_limit, 5);
    assert!((config.decay.decay_rate - 0.99).abs() < 1e-12);
    // Unnamed fields keep their defaults.
    assert_eq!(config.retrieval.strategy_timeout_ms, 2_000);
    assert!((config.learning.learning_rate - 0.05).abs() < 1e-12);
}

#[test]
fn rejects_out_of_range_neutral_score() {
    let toml = r#"
        [retrieval]
        unlinked_graph_score = 1.5
    "#;
    assert!(PlexusConfig::from_toml(toml).is_err());
}

#[test]
fn rejects_authority_shares_not_summing_to_one() {
    let toml = r#"
        [authority]
        baseline_share = 0.5
        track_record_share = 0.5
        recent_share = 0.5
    "#;
    assert!(PlexusConfig::from_toml(toml).is_err());
}

#[test]
fn rejects_decay_rate_of_one() {
    let toml = r#"
        [decay]
        decay_rate = 1.0
    "#;
    // decay_rate = 1.0 would never converge to the prior.
    assert!(PlexusConfig::from_toml(toml).is_err());
}
