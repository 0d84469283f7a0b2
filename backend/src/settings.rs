//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `BRAIN_*` environment variables, configuration files and
//! command-line flags, in OrthoConfig's usual precedence.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::Claims;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_SYSTEM_PARTY_ID: &str = "root";

/// Settings for the `brain` binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BRAIN")]
pub struct BrainSettings {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum pooled connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Idle connections kept open.
    #[ortho_config(default = 2)]
    pub pool_min_idle: u32,
    /// Seconds to wait for a pooled connection.
    #[ortho_config(default = 30)]
    pub connection_timeout_secs: u64,
    /// Apply pending migrations before serving; on unless set to `false`.
    pub run_migrations: Option<bool>,
    /// Id of the system party whose claims see every tenant.
    pub system_party_id: Option<String>,
}

impl BrainSettings {
    /// Configured system party id, falling back to `root`.
    pub fn system_party_id(&self) -> &str {
        self.system_party_id
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PARTY_ID)
    }

    /// Whether pending migrations run at startup.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Root claims used for cross-tenant uniqueness checks.
    pub fn system_claims(&self) -> Claims {
        Claims::system(self.system_party_id())
    }

    /// Pool configuration derived from these settings.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.database_url.as_str())
            .with_max_size(self.pool_max_size)
            .with_min_idle(Some(self.pool_min_idle))
            .with_connection_timeout(Duration::from_secs(self.connection_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use crate::domain::PartyType;

    fn load_from_empty_args() -> BrainSettings {
        BrainSettings::load_from_iter([OsString::from("brain")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            (
                "BRAIN_DATABASE_URL",
                Some("postgres://localhost/brain".to_owned()),
            ),
            ("BRAIN_POOL_MAX_SIZE", None::<String>),
            ("BRAIN_POOL_MIN_IDLE", None::<String>),
            ("BRAIN_CONNECTION_TIMEOUT_SECS", None::<String>),
            ("BRAIN_RUN_MIGRATIONS", None::<String>),
            ("BRAIN_SYSTEM_PARTY_ID", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url, "postgres://localhost/brain");
        assert_eq!(settings.pool_config(), PoolConfig::new("postgres://localhost/brain"));
        assert!(settings.run_migrations());
        assert_eq!(settings.system_party_id(), DEFAULT_SYSTEM_PARTY_ID);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("BRAIN_DATABASE_URL", Some("postgres://db/fleet".to_owned())),
            ("BRAIN_POOL_MAX_SIZE", Some("25".to_owned())),
            ("BRAIN_POOL_MIN_IDLE", Some("0".to_owned())),
            ("BRAIN_CONNECTION_TIMEOUT_SECS", Some("5".to_owned())),
            ("BRAIN_RUN_MIGRATIONS", Some("false".to_owned())),
            ("BRAIN_SYSTEM_PARTY_ID", Some("operator".to_owned())),
        ]);

        let settings = load_from_empty_args();
        let pool = settings.pool_config();
        assert_eq!(pool.max_size(), 25);
        assert_eq!(pool.min_idle(), Some(0));
        assert_eq!(pool.connection_timeout(), Duration::from_secs(5));
        assert!(!settings.run_migrations());

        let claims = settings.system_claims();
        assert_eq!(claims.party_type(), PartyType::System);
        assert_eq!(claims.party_id(), "operator");
    }
}
