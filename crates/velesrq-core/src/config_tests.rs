//! Tests for layered encoder configuration.

use super::{EncoderConfig, DEFAULT_SEED};
use crate::error::Error;
use figment::Jail;
use std::path::Path;

#[test]
fn test_default_config() {
    let config = EncoderConfig::default();
    assert_eq!(config.dimension, 0);
    assert_eq!(config.seed, DEFAULT_SEED);
    assert!(!config.skip_rotation);
}

#[test]
fn test_validate_rejects_zero_dimension() {
    let err = EncoderConfig::default().validate().unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_validate_rejects_huge_dimension() {
    let config = EncoderConfig {
        dimension: usize::MAX,
        ..EncoderConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_load_without_sources_uses_defaults() {
    Jail::expect_with(|_jail| {
        let config = EncoderConfig::load(None).map_err(|e| e.to_string())?;
        assert_eq!(config, EncoderConfig::default());
        Ok(())
    });
}

#[test]
fn test_load_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "rq.toml",
            r"
                dimension = 128
                seed = 7
                skip_rotation = true
            ",
        )?;

        let config = EncoderConfig::load(Some(Path::new("rq.toml"))).map_err(|e| e.to_string())?;
        assert_eq!(config.dimension, 128);
        assert_eq!(config.seed, 7);
        assert!(config.skip_rotation);
        Ok(())
    });
}

#[test]
fn test_partial_toml_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("rq.toml", "dimension = 96")?;

        let config = EncoderConfig::load(Some(Path::new("rq.toml"))).map_err(|e| e.to_string())?;
        assert_eq!(config.dimension, 96);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert!(!config.skip_rotation);
        Ok(())
    });
}

#[test]
fn test_env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("rq.toml", "dimension = 128\nseed = 7")?;
        jail.set_env("VELESRQ_SEED", "1234");
        jail.set_env("VELESRQ_SKIP_ROTATION", "true");

        let config = EncoderConfig::load(Some(Path::new("rq.toml"))).map_err(|e| e.to_string())?;
        assert_eq!(config.dimension, 128);
        assert_eq!(config.seed, 1234);
        assert!(config.skip_rotation);
        Ok(())
    });
}

#[test]
fn test_missing_file_is_an_error() {
    Jail::expect_with(|_jail| {
        let err = EncoderConfig::load(Some(Path::new("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
        Ok(())
    });
}

#[test]
fn test_wrong_type_is_config_error() {
    Jail::expect_with(|jail| {
        jail.create_file("rq.toml", "dimension = \"wide\"")?;

        let err = EncoderConfig::load(Some(Path::new("rq.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        Ok(())
    });
}
