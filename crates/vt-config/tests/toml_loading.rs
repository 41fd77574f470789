//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed file and env var manipulation.

use chrono::NaiveDate;
use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use vt_config::ValtrackConfig;

#[test]
fn loads_catalog_names_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[catalog]
origin_field = "Field"
status_pending = "Pending"
status_not_ok = "Rejected"
"#,
        )?;

        let config: ValtrackConfig = Figment::from(Serialized::defaults(ValtrackConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.catalog.origin_field, "Field");
        assert_eq!(config.catalog.status_pending, "Pending");
        assert_eq!(config.catalog.status_not_ok, "Rejected");
        // untouched names keep their defaults
        assert_eq!(config.catalog.origin_warranty, "Garantía");
        assert_eq!(config.catalog.status_ok, "OK");
        Ok(())
    });
}

#[test]
fn loads_workflow_section_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[workflow]
lock_inserts = false
processing_date = "2024-03-01"

[database]
path = "./data/vt.db"
"#,
        )?;

        let config: ValtrackConfig = Figment::from(Serialized::defaults(ValtrackConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!(!config.workflow.lock_inserts);
        assert_eq!(
            config.workflow.processing_date,
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(config.database.path, "./data/vt.db");
        Ok(())
    });
}

#[test]
fn project_config_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".valtrack")?;
        jail.create_file(
            ".valtrack/config.toml",
            r#"
[general]
default_limit = 5
default_actor = "sup-7"
"#,
        )?;

        let config = ValtrackConfig::load().expect("config loads");
        assert_eq!(config.general.default_limit, 5);
        assert_eq!(config.general.default_actor.as_deref(), Some("sup-7"));
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[catalog]
status_ok = "Aprobado"
"#,
        )?;
        jail.set_env("VALTRACK_CATALOG__STATUS_OK", "Conforme");

        let config: ValtrackConfig = Figment::from(Serialized::defaults(ValtrackConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("VALTRACK_").split("__"))
            .extract()?;

        assert_eq!(config.catalog.status_ok, "Conforme");
        Ok(())
    });
}

#[test]
fn invalid_date_fails_extraction() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[workflow]
processing_date = "yesterday"
"#,
        )?;

        let result: Result<ValtrackConfig, _> =
            Figment::from(Serialized::defaults(ValtrackConfig::default()))
                .merge(Toml::file("config.toml"))
                .extract();
        assert!(result.is_err());
        Ok(())
    });
}
