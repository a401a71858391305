//! Service wiring: record store, login accounts and session tokens.

use std::sync::Arc;

use anyhow::Context as _;
use chrono::Duration;

use tours_auth::{Hs256SessionTokens, hash_password};
use tours_infra::{
    Account, AccountStore, InMemoryAccountStore, InMemoryRecordStore, PostgresAccountStore,
    PostgresRecordStore, RecordStore, Settings,
};

/// Shared handles every handler works with.
pub struct AppServices {
    pub records: Arc<dyn RecordStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub sessions: Hs256SessionTokens,
}

impl AppServices {
    pub fn new(
        records: Arc<dyn RecordStore>,
        accounts: Arc<dyn AccountStore>,
        sessions: Hs256SessionTokens,
    ) -> Self {
        Self {
            records,
            accounts,
            sessions,
        }
    }

    /// In-memory stores; used by tests and by runs without `DATABASE_URL`.
    pub fn in_memory(session_secret: &str, session_ttl: Duration) -> Self {
        Self::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryAccountStore::new()),
            Hs256SessionTokens::new(session_secret.as_bytes(), session_ttl),
        )
    }

    /// Pick the backend from settings and seed the bootstrap account.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let ttl = Duration::minutes(settings.session_ttl_minutes);

        let services = match &settings.database_url {
            Some(url) => {
                let records = PostgresRecordStore::connect(url)
                    .await
                    .context("failed to connect to postgres")?;
                let accounts = PostgresAccountStore::new(records.pool().clone());
                tracing::info!("using postgres record store");
                Self::new(
                    Arc::new(records),
                    Arc::new(accounts),
                    Hs256SessionTokens::new(settings.session_secret.as_bytes(), ttl),
                )
            }
            None => {
                tracing::info!("DATABASE_URL not set; using in-memory record store");
                Self::in_memory(&settings.session_secret, ttl)
            }
        };

        services
            .seed_account(&settings.admin_username, &settings.admin_password)
            .await?;
        Ok(services)
    }

    /// Create (or reset the password of) a login account.
    pub async fn seed_account(&self, username: &str, password: &str) -> anyhow::Result<Account> {
        let hash = hash_password(password).context("failed to hash bootstrap password")?;
        let account = self
            .accounts
            .upsert(username, &hash)
            .await
            .context("failed to store bootstrap account")?;
        tracing::info!(username = %account.username, "bootstrap account ready");
        Ok(account)
    }
}
