use anyhow::Context;
use vt_config::ValtrackConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, merge config sources and apply the command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<ValtrackConfig> {
    load_local_dotenv()?;

    let mut config = ValtrackConfig::load().context("failed to load valtrack configuration")?;
    apply_overrides(&mut config, flags);
    config.validate()?;
    Ok(config)
}

/// `--db` and `--today` win over every config source.
fn apply_overrides(config: &mut ValtrackConfig, flags: &GlobalFlags) {
    if let Some(path) = &flags.db {
        config.database.path.clone_from(path);
    }
    if let Some(today) = flags.today {
        config.workflow.processing_date = Some(today);
    }
}

fn load_local_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use vt_config::ValtrackConfig;

    use super::apply_overrides;
    use crate::cli::{GlobalFlags, OutputFormat};

    fn flags(db: Option<&str>, today: Option<NaiveDate>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: false,
            verbose: false,
            actor: None,
            db: db.map(String::from),
            today,
        }
    }

    #[test]
    fn flags_override_database_and_processing_date() {
        let mut config = ValtrackConfig::default();
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
        apply_overrides(&mut config, &flags(Some("/tmp/vt.db"), Some(today)));

        assert_eq!(config.database.path, "/tmp/vt.db");
        assert_eq!(config.workflow.processing_date, Some(today));
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let mut config = ValtrackConfig::default();
        let before = config.database.path.clone();
        apply_overrides(&mut config, &flags(None, None));

        assert_eq!(config.database.path, before);
        assert_eq!(config.workflow.processing_date, None);
    }
}
