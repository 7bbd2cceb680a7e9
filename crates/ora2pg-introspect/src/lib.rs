//! Runs the fixed set of Oracle catalog queries and reshapes the flat rows
//! they return into the normalized entity set defined by `ora2pg-types`.
//!
//! An `Introspector` owns its connection exclusively and never mutates
//! ambient session state implicitly -- `set_current_schema` is an explicit,
//! best-effort call a caller opts into.

mod filter;
mod queries;

pub use filter::TableFilter;

use ora2pg_types::{Catalog, CharUsed, Column, DeleteRule, ForeignKey, Index, PrimaryKey, Sequence, TableRef};

#[derive(Debug, thiserror::Error)]
pub enum IntrospectError {
    #[error("failed to connect to Oracle: {0}")]
    Connect(#[source] oracle::Error),

    #[error("catalog query {query} failed: {source}")]
    Query {
        query: &'static str,
        #[source]
        source: oracle::Error,
    },

    #[error("introspection task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A live connection to the source database, scoped to one introspection
/// run.
pub struct Introspector {
    conn: oracle::Connection,
}

impl Introspector {
    /// Opens a connection and pre-tunes its statement cache, matching
    /// `oracle_introspect.py::connect_oracle`'s `stmtcachesize = 50`.
    pub fn connect(user: &str, password: &str, dsn: &str) -> Result<Self, IntrospectError> {
        let conn = oracle::Connection::connect(user, password, dsn).map_err(IntrospectError::Connect)?;
        conn.set_stmt_cache_size(50).map_err(IntrospectError::Connect)?;
        Ok(Introspector { conn })
    }

    /// Best-effort: sets the session's current schema so unqualified
    /// catalog references resolve against `owner`. Failure is logged and
    /// otherwise ignored -- introspection itself always qualifies by
    /// owner explicitly and does not depend on this succeeding.
    pub fn set_current_schema(&self, owner: &str) {
        let sql = format!("ALTER SESSION SET CURRENT_SCHEMA = {owner}");
        if let Err(err) = self.conn.execute(&sql, &[]) {
            tracing::warn!(owner, %err, "failed to set current schema, continuing with qualified names");
        }
    }

    /// Runs every catalog query for `owner` and reshapes the results into
    /// a `Catalog`. Any individual query failure aborts introspection: no
    /// partial catalog is ever returned.
    #[tracing::instrument(skip(self, filter))]
    pub fn introspect(&self, owner: &str, filter: &TableFilter) -> Result<Catalog, IntrospectError> {
        let owner = owner.to_ascii_uppercase();

        let all_tables = queries::fetch_tables(&self.conn, &owner)?;
        let tables: Vec<TableRef> = all_tables
            .into_iter()
            .filter(|name| filter.allows(name))
            .map(|name| TableRef::new(owner.clone(), name))
            .collect();
        tracing::info!(count = tables.len(), "tables discovered");

        let raw_columns = queries::fetch_columns(&self.conn, &owner)?;
        let columns = raw_columns
            .into_iter()
            .map(|c| Column {
                table: TableRef::new(owner.clone(), c.table_name),
                name: c.column_name,
                type_name: c.data_type,
                precision: c.data_precision,
                scale: c.data_scale,
                nullable: c.nullable == "Y",
                default_expr: c.data_default.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
                column_id: c.column_id,
                raw_data_length: c.data_length,
                char_used: match c.char_used.as_deref() {
                    Some("B") => Some(CharUsed::Byte),
                    Some("C") => Some(CharUsed::Char),
                    _ => None,
                },
            })
            .collect();
        tracing::info!(count = columns.len(), "columns fetched");

        let raw_constraints = queries::fetch_constraints(&self.conn, &owner)?;
        let raw_cons_columns = queries::fetch_cons_columns(&self.conn, &owner)?;

        let primary_keys = build_primary_keys(&owner, &raw_constraints, &raw_cons_columns);
        tracing::info!(count = primary_keys.len(), "primary keys reshaped");

        let foreign_keys = build_foreign_keys(&owner, &raw_constraints, &raw_cons_columns);
        tracing::info!(count = foreign_keys.len(), "foreign keys reshaped");

        let raw_indexes = queries::fetch_indexes(&self.conn, &owner)?;
        let raw_ind_columns = queries::fetch_ind_columns(&self.conn, &owner)?;
        let indexes = build_indexes(&owner, &raw_indexes, &raw_ind_columns);
        tracing::info!(count = indexes.len(), "indexes reshaped");

        let raw_sequences = queries::fetch_sequences(&self.conn, &owner)?;
        let sequences = raw_sequences
            .into_iter()
            .map(|s| Sequence {
                name: s.sequence_name,
                increment: s.increment_by,
                min: s.min_value,
                max: s.max_value,
                cache: s.cache_size,
                cycle: s.cycle_flag == "Y",
                last_value: s.last_number,
                order_flag: s.order_flag == "Y",
            })
            .collect();
        tracing::info!(count = raw_sequences_len(&sequences), "sequences fetched");

        Ok(Catalog {
            tables,
            columns,
            primary_keys,
            foreign_keys,
            indexes,
            sequences,
        })
    }
}

fn raw_sequences_len(s: &[Sequence]) -> usize {
    s.len()
}

fn build_primary_keys(
    owner: &str,
    constraints: &[queries::ConstraintRow],
    cons_columns: &[queries::ConsColumnRow],
) -> Vec<PrimaryKey> {
    constraints
        .iter()
        .filter(|c| c.constraint_type == "P")
        .map(|c| {
            let mut cols: Vec<&queries::ConsColumnRow> = cons_columns
                .iter()
                .filter(|cc| cc.constraint_name == c.constraint_name)
                .collect();
            cols.sort_by_key(|cc| cc.position);
            PrimaryKey {
                table: TableRef::new(owner.to_string(), c.table_name.clone()),
                constraint_name: c.constraint_name.clone(),
                columns: cols.into_iter().map(|cc| cc.column_name.clone()).collect(),
            }
        })
        .filter(|pk: &PrimaryKey| !pk.columns.is_empty())
        .collect()
}

fn build_foreign_keys(
    owner: &str,
    constraints: &[queries::ConstraintRow],
    cons_columns: &[queries::ConsColumnRow],
) -> Vec<ForeignKey> {
    constraints
        .iter()
        .filter(|c| c.constraint_type == "R")
        .filter_map(|c| {
            let r_constraint_name = c.r_constraint_name.as_ref()?;
            let r_table_name = c.r_table_name.as_ref()?;

            let mut local: Vec<&queries::ConsColumnRow> = cons_columns
                .iter()
                .filter(|cc| cc.constraint_name == c.constraint_name)
                .collect();
            local.sort_by_key(|cc| cc.position);

            let mut referenced: Vec<&queries::ConsColumnRow> = cons_columns
                .iter()
                .filter(|cc| &cc.constraint_name == r_constraint_name)
                .collect();
            referenced.sort_by_key(|cc| cc.position);

            if local.is_empty() || local.len() != referenced.len() {
                tracing::warn!(
                    constraint = %c.constraint_name,
                    local = local.len(),
                    referenced = referenced.len(),
                    "skipping foreign key with mismatched column arity"
                );
                return None;
            }

            Some(ForeignKey {
                constraint_name: c.constraint_name.clone(),
                table: TableRef::new(owner.to_string(), c.table_name.clone()),
                columns: local.iter().map(|cc| cc.column_name.clone()).collect(),
                ref_table: TableRef::new(owner.to_string(), r_table_name.clone()),
                ref_columns: referenced.iter().map(|cc| cc.column_name.clone()).collect(),
                delete_rule: DeleteRule::parse(c.delete_rule.as_deref().unwrap_or("NO ACTION")),
            })
        })
        .collect()
}

fn build_indexes(
    owner: &str,
    indexes: &[queries::IndexRow],
    ind_columns: &[queries::IndColumnRow],
) -> Vec<Index> {
    indexes
        .iter()
        .map(|ix| {
            let mut cols: Vec<&queries::IndColumnRow> = ind_columns
                .iter()
                .filter(|c| c.index_name == ix.index_name && c.table_name == ix.table_name)
                .collect();
            cols.sort_by_key(|c| c.column_position);
            Index {
                name: ix.index_name.clone(),
                table: TableRef::new(owner.to_string(), ix.table_name.clone()),
                columns: cols.into_iter().map(|c| c.column_name.clone()).collect(),
                unique: ix.uniqueness == "UNIQUE",
            }
        })
        .filter(|ix| !ix.columns.is_empty())
        .collect()
}

/// Runs introspection on a blocking thread, since the Oracle driver is
/// synchronous. Mirrors the sync-into-async bridge used elsewhere in this
/// codebase for FFI-backed connectors: offload the blocking call so it
/// never starves the async runtime.
pub async fn introspect_async(
    introspector: Introspector,
    owner: String,
    filter: TableFilter,
) -> Result<(Introspector, Catalog), IntrospectError> {
    tokio::task::spawn_blocking(move || {
        let catalog = introspector.introspect(&owner, &filter)?;
        Ok((introspector, catalog))
    })
    .await?
}
