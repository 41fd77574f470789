use vt_config::{ENV_PREFIX, ValtrackConfig};

const SECTIONS: [&str; 4] = ["DATABASE", "CATALOG", "WORKFLOW", "GENERAL"];

/// Emit warnings for env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &ValtrackConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &ValtrackConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
    let mut warnings = Vec::new();

    for section in SECTIONS {
        let single = format!("{ENV_PREFIX}{section}_");
        let nested = format!("{ENV_PREFIX}{section}__");
        if let Some(key) = env_keys
            .iter()
            .find(|key| key.starts_with(&single) && !key.starts_with(&nested))
        {
            let field = &key[single.len()..];
            warnings.push(format!(
                "{key} is ignored. Use double underscores (example: {nested}{field})."
            ));
        }
    }

    if config.database.is_in_memory() {
        warnings.push(
            "database.path is ':memory:'; nothing recorded by this command will persist."
                .to_string(),
        );
    }

    warnings
}

#[cfg(test)]
mod tests {
    use vt_config::ValtrackConfig;

    use super::collect_unconfigured_warnings;

    fn env(keys: &[&str]) -> Vec<(String, String)> {
        keys.iter()
            .map(|key| ((*key).to_string(), String::from("x")))
            .collect()
    }

    #[test]
    fn warns_for_single_underscore_section_keys() {
        let warnings = collect_unconfigured_warnings(
            &ValtrackConfig::default(),
            env(&["VALTRACK_DATABASE_PATH", "VALTRACK_GENERAL__DEFAULT_LIMIT"]),
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("VALTRACK_DATABASE__PATH"));
    }

    #[test]
    fn no_warnings_for_nested_keys_or_unrelated_vars() {
        let warnings = collect_unconfigured_warnings(
            &ValtrackConfig::default(),
            env(&["VALTRACK_WORKFLOW__LOCK_INSERTS", "VALTRACK_LOG", "PATH"]),
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn warns_when_database_is_in_memory() {
        let mut config = ValtrackConfig::default();
        config.database.path = String::from(":memory:");
        let warnings = collect_unconfigured_warnings(&config, env(&[]));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(":memory:"));
    }
}
