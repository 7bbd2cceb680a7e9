//! The per-table load protocol: one source cursor, one target connection,
//! sequential batches between them. Blocking Oracle calls run on a
//! dedicated blocking thread and stream batches to the async task driving
//! the Postgres COPY sink over a bounded channel -- the same offload shape
//! `ora2pg-introspect` uses for its own Oracle calls, just pipelined
//! instead of request/response.

use crate::csv_encode::{encode_row, writer_builder};
use crate::oracle_bridge::{coerce_row, row_to_values};
use crate::quarantine::{quarantine_path, write_quarantine};
use crate::{LoadStatus, LoaderConfig, OracleEndpoint, TableStats};
use ora2pg_namemap::NameMapper;
use ora2pg_types::{TableSpec, Value};
use std::sync::Arc;

type Batch = Vec<Vec<Value>>;

/// Table-level failures: connection drops, cursor failures, or a broken
/// COPY sink. Recorded on `TableStats.error` and never propagated past
/// `run_table`.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to connect to Oracle: {0}")]
    OracleConnect(#[source] oracle::Error),
    #[error("failed to open source cursor: {0}")]
    OracleSelect(#[source] oracle::Error),
    #[error("failed to decode a source row: {0}")]
    RowDecode(#[source] oracle::Error),
    #[error("source cursor failed: {0}")]
    Cursor(#[source] oracle::Error),
    #[error("failed to acquire a target connection: {0}")]
    TargetConnect(#[source] sqlx::Error),
    #[error("failed to open the COPY sink: {0}")]
    CopyOpen(#[source] sqlx::Error),
    #[error("failed to finish the COPY sink: {0}")]
    CopyFinish(#[source] sqlx::Error),
}

fn source_select(spec: &TableSpec) -> String {
    let cols = spec
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c.to_ascii_uppercase()))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!(
        "SELECT {cols} FROM \"{}\".\"{}\"",
        spec.owner.to_ascii_uppercase(),
        spec.name.to_ascii_uppercase()
    );
    if let Some(pred) = &spec.where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(pred);
    }
    sql
}

/// Runs the Oracle side on a blocking thread: opens its own connection
/// (workers never share a connection), sets `arraysize`, and pushes
/// fixed-arity row batches onto `tx` until the
/// cursor is exhausted or a connection/cursor error occurs.
fn fetch_oracle_rows(
    oracle: OracleEndpoint,
    spec: TableSpec,
    batch_rows: usize,
    arraysize: u32,
    tx: tokio::sync::mpsc::Sender<Result<Batch, LoadError>>,
) {
    let conn = match oracle::Connection::connect(&oracle.user, &oracle.password, &oracle.dsn) {
        Ok(c) => c,
        Err(err) => {
            let _ = tx.blocking_send(Err(LoadError::OracleConnect(err)));
            return;
        }
    };

    let sql = source_select(&spec);
    let statement = conn
        .statement(&sql)
        .fetch_array_size(arraysize)
        .build()
        .and_then(|mut stmt| {
            let rs = stmt.query(&[])?;
            Ok((stmt, rs))
        });
    let (_stmt, mut result_set) = match statement {
        Ok(pair) => pair,
        Err(err) => {
            let _ = tx.blocking_send(Err(LoadError::OracleSelect(err)));
            return;
        }
    };

    let width = spec.columns.len();
    let mut batch: Batch = Vec::with_capacity(batch_rows);
    loop {
        match result_set.next() {
            Some(Ok(row)) => {
                let values = match row_to_values(&row) {
                    Ok(v) => v,
                    Err(err) => {
                        let _ = tx.blocking_send(Err(LoadError::RowDecode(err)));
                        return;
                    }
                };
                batch.push(coerce_row(values, width));
                if batch.len() >= batch_rows {
                    if tx.blocking_send(Ok(std::mem::take(&mut batch))).is_err() {
                        return;
                    }
                }
            }
            Some(Err(err)) => {
                let _ = tx.blocking_send(Err(LoadError::Cursor(err)));
                return;
            }
            None => break,
        }
    }
    if !batch.is_empty() {
        let _ = tx.blocking_send(Ok(batch));
    }
}

/// Drives the Postgres side: opens one connection, defers constraints,
/// opens the COPY sink, and consumes batches off `rx` until the producer
/// finishes or reports a fatal error.
async fn copy_into_postgres(
    pg_pool: &sqlx::PgPool,
    spec: &TableSpec,
    nm: &Arc<NameMapper>,
    out_dir: &std::path::Path,
    mut rx: tokio::sync::mpsc::Receiver<Result<Batch, LoadError>>,
) -> Result<TableStats, LoadError> {
    let mut conn = pg_pool.acquire().await.map_err(LoadError::TargetConnect)?;

    if let Err(err) = sqlx::query("SET CONSTRAINTS ALL DEFERRED").execute(&mut *conn).await {
        tracing::warn!(table = %spec.name, %err, "SET CONSTRAINTS ALL DEFERRED failed, continuing");
    }

    let copy_sql = copy_statement(spec, nm);
    let mut sink = conn.copy_in_raw(&copy_sql).await.map_err(LoadError::CopyOpen)?;

    let mut rows: u64 = 0;
    let mut failed_batches: u64 = 0;

    while let Some(received) = rx.recv().await {
        let batch = match received {
            Ok(batch) => batch,
            Err(err) => return Err(err),
        };
        let batch_len = batch.len();

        let encoded = encode_batch(&batch);
        match encoded {
            Ok(payload) => match sink.send(payload).await {
                Ok(()) => rows += batch_len as u64,
                Err(err) => {
                    failed_batches += 1;
                    tracing::warn!(table = %spec.name, %err, batch_len, "copy write failed, quarantining batch");
                    quarantine_batch(&batch, &spec.name, &err.to_string(), out_dir).await;
                }
            },
            Err(err) => {
                failed_batches += 1;
                tracing::warn!(table = %spec.name, %err, batch_len, "csv encode failed, quarantining batch");
                quarantine_batch(&batch, &spec.name, &err, out_dir).await;
            }
        }
    }

    sink.finish().await.map_err(LoadError::CopyFinish)?;

    Ok(TableStats {
        status: LoadStatus::Ok,
        rows,
        failed_batches,
        error: None,
    })
}

fn encode_batch(batch: &Batch) -> Result<Vec<u8>, String> {
    let mut writer = writer_builder().from_writer(Vec::new());
    for row in batch {
        encode_row(&mut writer, row).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())?;
    writer.into_inner().map_err(|e| e.to_string())
}

async fn quarantine_batch(batch: &Batch, table_name: &str, error_repr: &str, out_dir: &std::path::Path) {
    let payload = match encode_batch(batch) {
        Ok(bytes) => bytes,
        Err(_) => return,
    };
    let path = quarantine_path(out_dir, table_name, error_repr, batch.len());
    write_quarantine(&path, &payload).await;
}

fn copy_statement(spec: &TableSpec, nm: &NameMapper) -> String {
    let schema = nm
        .get_always_quoted(&spec.target_schema)
        .unwrap_or_else(|| format!("\"{}\"", spec.target_schema));
    let table = spec.target_table_override.clone().unwrap_or_else(|| spec.name.clone());
    let table = nm.get_always_quoted(&table).unwrap_or_else(|| format!("\"{table}\""));

    let cols = spec
        .target_columns_override
        .clone()
        .unwrap_or_else(|| spec.columns.clone());
    let cols = cols
        .iter()
        .map(|c| nm.get_always_quoted(c).unwrap_or_else(|| format!("\"{c}\"")))
        .collect::<Vec<_>>()
        .join(", ");

    format!("COPY {schema}.{table} ({cols}) FROM STDIN WITH (FORMAT csv, DELIMITER ',', QUOTE '\"', NULL '\\N')")
}

/// Runs one table end to end and never propagates an error past this
/// boundary -- every failure becomes a `TableStats { status: Error, .. }`.
pub async fn run_table(
    oracle: OracleEndpoint,
    spec: TableSpec,
    pg_pool: sqlx::PgPool,
    nm: Arc<NameMapper>,
    config: LoaderConfig,
) -> TableStats {
    let (tx, rx) = tokio::sync::mpsc::channel(2);
    let batch_rows = config.copy_batch_rows;
    let arraysize = config.arraysize;
    let spec_for_fetch = spec.clone();

    let fetch_handle =
        tokio::task::spawn_blocking(move || fetch_oracle_rows(oracle, spec_for_fetch, batch_rows, arraysize, tx));

    match copy_into_postgres(&pg_pool, &spec, &nm, &config.out_dir, rx).await {
        Ok(stats) => {
            if let Err(err) = fetch_handle.await {
                tracing::warn!(table = %spec.name, %err, "source fetch task panicked");
            }
            stats
        }
        Err(err) => {
            tracing::warn!(table = %spec.name, %err, "table load failed");
            TableStats {
                status: LoadStatus::Error,
                rows: 0,
                failed_batches: 0,
                error: Some(err.to_string()),
            }
        }
    }
}
