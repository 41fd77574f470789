use anyhow::Context;
use vt_config::ValtrackConfig;
use vt_db::service::WorkflowService;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: WorkflowService,
    pub config: ValtrackConfig,
    /// Audit actor: `--actor`, else `general.default_actor`.
    pub actor: Option<String>,
}

impl AppContext {
    /// Open the configured database and resolve the catalog.
    pub async fn init(config: ValtrackConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let service = WorkflowService::open(&config)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?;

        for (kind, name) in service.catalog().unresolved() {
            tracing::warn!(
                kind = kind.as_str(),
                %name,
                "catalog label not found; operations that need it will be rejected"
            );
        }

        let actor = resolve_actor(flags.actor.as_deref(), &config);
        Ok(Self {
            service,
            config,
            actor,
        })
    }

    #[must_use]
    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.config.general.default_limit
    }
}

fn resolve_actor(flag: Option<&str>, config: &ValtrackConfig) -> Option<String> {
    flag.filter(|actor| !actor.trim().is_empty())
        .map(String::from)
        .or_else(|| config.general.default_actor.clone())
}

#[cfg(test)]
mod tests {
    use vt_config::ValtrackConfig;

    use super::resolve_actor;

    #[test]
    fn flag_wins_over_configured_actor() {
        let mut config = ValtrackConfig::default();
        config.general.default_actor = Some(String::from("desk"));

        assert_eq!(
            resolve_actor(Some("sup-1"), &config).as_deref(),
            Some("sup-1")
        );
        assert_eq!(resolve_actor(None, &config).as_deref(), Some("desk"));
        assert_eq!(resolve_actor(Some("  "), &config).as_deref(), Some("desk"));
    }

    #[test]
    fn no_actor_when_nothing_configured() {
        assert_eq!(resolve_actor(None, &ValtrackConfig::default()), None);
    }
}
