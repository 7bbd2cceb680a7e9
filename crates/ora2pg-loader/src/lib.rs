//! Streams table data from Oracle into already-created PostgreSQL tables,
//! bounded parallel across tables.
//!
//! The Name Mapper is shared read-only: by the time any worker starts,
//! the Planner has already fully populated it, so every
//! `NameMapper::get_always_quoted` lookup here agrees with the identifiers
//! the Planner wrote into DDL.

mod csv_encode;
mod oracle_bridge;
mod quarantine;
mod worker;

pub use worker::LoadError;

use ora2pg_namemap::NameMapper;
use ora2pg_types::TableSpec;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct OracleEndpoint {
    pub user: String,
    pub password: String,
    pub dsn: String,
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Maximum number of tables transferring concurrently. `<= 1` runs
    /// sequentially on the calling context.
    pub copy_parallelism: usize,
    pub copy_batch_rows: usize,
    pub arraysize: u32,
    pub out_dir: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            copy_parallelism: 4,
            copy_batch_rows: 50_000,
            arraysize: 1_000,
            out_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone)]
pub struct TableStats {
    pub status: LoadStatus,
    pub rows: u64,
    pub failed_batches: u64,
    pub error: Option<String>,
}

/// Migrates every `TableSpec`'s rows, running up to `config.copy_parallelism`
/// tables at once. One table erroring never stops the others.
#[tracing::instrument(skip(specs, oracle, pg_pool, nm, config))]
pub async fn load_all(
    specs: Vec<TableSpec>,
    oracle: OracleEndpoint,
    pg_pool: sqlx::PgPool,
    nm: Arc<NameMapper>,
    config: LoaderConfig,
) -> BTreeMap<String, TableStats> {
    if config.copy_parallelism <= 1 || specs.len() <= 1 {
        let mut results = BTreeMap::new();
        for spec in specs {
            let name = spec.name.clone();
            let stats = worker::run_table(oracle.clone(), spec, pg_pool.clone(), nm.clone(), config.clone()).await;
            results.insert(name, stats);
        }
        return results;
    }

    let semaphore = Arc::new(tokio::sync::Semaphore::new(config.copy_parallelism));
    let mut handles = Vec::with_capacity(specs.len());

    for spec in specs {
        let permit = semaphore.clone().acquire_owned().await.expect("semaphore is never closed");
        let oracle = oracle.clone();
        let pg_pool = pg_pool.clone();
        let nm = nm.clone();
        let config = config.clone();
        let name = spec.name.clone();

        handles.push(tokio::spawn(async move {
            let stats = worker::run_table(oracle, spec, pg_pool, nm, config).await;
            drop(permit);
            (name, stats)
        }));
    }

    let mut results = BTreeMap::new();
    for handle in handles {
        match handle.await {
            Ok((name, stats)) => {
                results.insert(name, stats);
            }
            Err(err) => {
                tracing::error!(%err, "table load task panicked");
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.copy_parallelism, 4);
        assert_eq!(config.copy_batch_rows, 50_000);
    }

    /// `load_all`'s own fan-out needs real Oracle and PostgreSQL endpoints,
    /// so this exercises the same acquire/spawn/drop shape in isolation to
    /// confirm the bound actually holds and one failing task never blocks
    /// or cancels the rest.
    #[tokio::test]
    async fn bounded_fanout_never_exceeds_parallelism_and_survives_one_failure() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let parallelism = 4;
        let task_count = 10;
        let semaphore = Arc::new(tokio::sync::Semaphore::new(parallelism));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..task_count {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                drop(permit);
                if i == 3 {
                    Err::<(), &'static str>("simulated table error")
                } else {
                    Ok(())
                }
            }));
        }

        let mut errors = 0;
        for handle in handles {
            if handle.await.unwrap().is_err() {
                errors += 1;
            }
        }

        assert!(peak.load(Ordering::SeqCst) <= parallelism);
        assert_eq!(errors, 1);
    }

    #[test]
    fn table_stats_error_carries_message() {
        let stats = TableStats {
            status: LoadStatus::Error,
            rows: 0,
            failed_batches: 0,
            error: Some("connect: timeout".to_string()),
        };
        assert_eq!(stats.status, LoadStatus::Error);
        assert!(stats.error.unwrap().contains("timeout"));
    }
}
