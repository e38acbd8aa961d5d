use crate::error::EngineError;
use crate::notice::Notice;
use configuration::{ConfigStore, StoreError, ZoneConfig};

/// The config to apply after talking to the store, plus the notice to show
/// when the store could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub config: ZoneConfig,
    pub notice: Option<Notice>,
}

impl SyncOutcome {
    fn clean(config: ZoneConfig) -> Self {
        Self { config, notice: None }
    }

    fn fallback(config: ZoneConfig, notice: Notice) -> Self {
        tracing::warn!(%notice, "Falling back to the last valid config.");
        Self { config, notice: Some(notice) }
    }
}

/// Reads the persisted thresholds and merges them into `current`.
///
/// Never fails: an unreachable store, malformed data or stored values that do
/// not validate all leave `current` in force. An empty store is not a problem
/// and raises no notice.
pub async fn fetch_config(store: &dyn ConfigStore, current: &ZoneConfig) -> SyncOutcome {
    match store.load().await {
        Ok(stored) => match current.with_persisted(stored).validate() {
            Ok(config) => {
                tracing::info!(
                    green_upper = stored.green_upper,
                    amber_width = stored.amber_width,
                    "Loaded persisted thresholds."
                );
                SyncOutcome::clean(config)
            }
            Err(e) => SyncOutcome::fallback(*current, Notice::StoredConfigRejected { reason: e.to_string() }),
        },
        Err(StoreError::Empty) => {
            tracing::debug!("No persisted thresholds yet; using the current config.");
            SyncOutcome::clean(*current)
        }
        Err(e) => SyncOutcome::fallback(*current, Notice::StoreUnavailable { reason: e.to_string() }),
    }
}

/// Persists the relative-error thresholds of `candidate`.
///
/// The candidate is validated first and nothing is written if it fails. On a
/// successful write the echoed values are used; if the store fails the
/// candidate still applies for this session, with a notice.
pub async fn persist_config(
    store: &dyn ConfigStore,
    candidate: &ZoneConfig,
) -> Result<SyncOutcome, EngineError> {
    let candidate = candidate.validate()?;
    let outcome = match store.save(candidate.persisted()).await {
        Ok(echoed) => match candidate.with_persisted(echoed).validate() {
            Ok(config) => SyncOutcome::clean(config),
            Err(e) => SyncOutcome::fallback(candidate, Notice::StoredConfigRejected { reason: e.to_string() }),
        },
        Err(e) => SyncOutcome::fallback(candidate, Notice::StoreUnavailable { reason: e.to_string() }),
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::{FileConfigStore, MemoryConfigStore, PersistedThresholds};

    #[tokio::test]
    async fn fetch_merges_stored_thresholds() {
        let store = MemoryConfigStore::with_values(PersistedThresholds { green_upper: 25.0, amber_width: 5.0 });
        let current = ZoneConfig { std_green_upper: 1.5, ..ZoneConfig::default() };

        let outcome = fetch_config(&store, &current).await;
        assert!(outcome.notice.is_none());
        assert_eq!(outcome.config.green_upper_base, 25.0);
        assert_eq!(outcome.config.amber_width, 5.0);
        assert_eq!(outcome.config.std_green_upper, 1.5);
    }

    #[tokio::test]
    async fn empty_store_keeps_current_quietly() {
        let store = MemoryConfigStore::new();
        let outcome = fetch_config(&store, &ZoneConfig::default()).await;
        assert_eq!(outcome, SyncOutcome::clean(ZoneConfig::default()));
    }

    #[tokio::test]
    async fn unreachable_store_falls_back_with_notice() {
        let store = MemoryConfigStore::with_values(PersistedThresholds { green_upper: 25.0, amber_width: 5.0 });
        store.set_failing(true);

        let outcome = fetch_config(&store, &ZoneConfig::default()).await;
        assert_eq!(outcome.config, ZoneConfig::default());
        assert!(matches!(outcome.notice, Some(Notice::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn out_of_range_stored_values_are_rejected() {
        let store = MemoryConfigStore::with_values(PersistedThresholds { green_upper: 250.0, amber_width: 5.0 });
        let outcome = fetch_config(&store, &ZoneConfig::default()).await;
        assert_eq!(outcome.config, ZoneConfig::default());
        assert!(matches!(outcome.notice, Some(Notice::StoredConfigRejected { .. })));
    }

    #[tokio::test]
    async fn persist_writes_and_echoes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("thresholds.json"));
        let candidate = ZoneConfig { green_upper_base: 15.0, amber_width: 20.0, ..ZoneConfig::default() };

        let outcome = persist_config(&store, &candidate).await.unwrap();
        assert_eq!(outcome, SyncOutcome::clean(candidate));

        let reloaded = fetch_config(&store, &ZoneConfig::default()).await;
        assert_eq!(reloaded.config.green_upper_base, 15.0);
        assert_eq!(reloaded.config.amber_width, 20.0);
    }

    #[tokio::test]
    async fn persist_rejects_invalid_candidates_before_writing() {
        let store = MemoryConfigStore::new();
        let bad = ZoneConfig { amber_width: -1.0, ..ZoneConfig::default() };

        assert!(matches!(persist_config(&store, &bad).await, Err(EngineError::InvalidConfig(_))));
        assert!(matches!(store.load().await, Err(StoreError::Empty)));
    }

    #[tokio::test]
    async fn failed_save_still_applies_for_the_session() {
        let store = MemoryConfigStore::new();
        store.set_failing(true);
        let candidate = ZoneConfig { green_upper_base: 30.0, ..ZoneConfig::default() };

        let outcome = persist_config(&store, &candidate).await.unwrap();
        assert_eq!(outcome.config, candidate);
        assert!(matches!(outcome.notice, Some(Notice::StoreUnavailable { .. })));
    }
}
