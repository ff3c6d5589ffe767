//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use sage_config::SageConfig;

#[test]
fn loads_backend_and_retry_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[backend]
base_url = "https://papers.example.org"
timeout_secs = 30

[retry]
max_retries = 5
base_delay_ms = 500
"#,
        )?;

        let config: SageConfig = Figment::from(Serialized::defaults(SageConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.backend.base_url, "https://papers.example.org");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay_ms, 500);
        // Untouched fields keep their defaults.
        assert_eq!(config.retry.max_jitter_ms, 1000);
        assert_eq!(config.throttle.min_spacing_ms, 1000);
        Ok(())
    });
}

#[test]
fn project_config_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_dir(".sage")?;
        jail.create_file(
            ".sage/config.toml",
            r#"
[throttle]
batch_size = 5
batch_pause_ms = 100

[autosave]
enabled = false
"#,
        )?;

        let config = SageConfig::load().expect("config loads");
        assert_eq!(config.throttle.batch_size, 5);
        assert_eq!(config.throttle.batch_pause_ms, 100);
        assert!(!config.autosave.enabled);
        Ok(())
    });
}

#[test]
fn env_beats_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[backend]
base_url = "http://from-toml:8000"
"#,
        )?;
        jail.set_env("SAGE_BACKEND__BASE_URL", "http://from-env:9000");

        let config: SageConfig = Figment::from(Serialized::defaults(SageConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("SAGE_").split("__"))
            .extract()?;

        assert_eq!(config.backend.base_url, "http://from-env:9000");
        Ok(())
    });
}
