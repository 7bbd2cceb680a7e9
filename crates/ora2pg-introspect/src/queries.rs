//! The fixed set of catalog queries, parameterized by owner. Each function
//! maps directly to one of Oracle's data-dictionary views:
//! `all_tables`, `all_tab_columns`, `all_constraints`, `all_cons_columns`,
//! `all_indexes`, `all_ind_columns`, `all_sequences`.

use crate::IntrospectError;
use oracle::Connection;

fn run_query_err(name: &'static str, err: oracle::Error) -> IntrospectError {
    IntrospectError::Query { query: name, source: err }
}

pub fn fetch_tables(conn: &Connection, owner: &str) -> Result<Vec<String>, IntrospectError> {
    let sql = "SELECT table_name \
               FROM all_tables \
               WHERE owner = :owner \
               ORDER BY table_name";
    conn.query_as::<String>(sql, &[&owner])
        .map_err(|e| run_query_err("all_tables", e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| run_query_err("all_tables", e))
}

pub struct ColumnRow {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub data_length: Option<i64>,
    pub char_used: Option<String>,
    pub data_precision: Option<i64>,
    pub data_scale: Option<i64>,
    pub nullable: String,
    pub data_default: Option<String>,
    pub column_id: i64,
}

pub fn fetch_columns(conn: &Connection, owner: &str) -> Result<Vec<ColumnRow>, IntrospectError> {
    let sql = "SELECT table_name, column_name, data_type, data_length, char_used, \
                      data_precision, data_scale, nullable, data_default, column_id \
               FROM all_tab_columns \
               WHERE owner = :owner \
               ORDER BY table_name, column_id";
    type Row = (
        String,
        String,
        String,
        Option<i64>,
        Option<String>,
        Option<i64>,
        Option<i64>,
        String,
        Option<String>,
        i64,
    );
    conn.query_as::<Row>(sql, &[&owner])
        .map_err(|e| run_query_err("all_tab_columns", e))?
        .map(|row| {
            row.map(
                |(table_name, column_name, data_type, data_length, char_used, data_precision, data_scale, nullable, data_default, column_id)| ColumnRow {
                    table_name,
                    column_name,
                    data_type,
                    data_length,
                    char_used,
                    data_precision,
                    data_scale,
                    nullable,
                    data_default,
                    column_id,
                },
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| run_query_err("all_tab_columns", e))
}

pub struct ConstraintRow {
    pub constraint_name: String,
    pub constraint_type: String,
    pub table_name: String,
    pub r_constraint_name: Option<String>,
    pub r_table_name: Option<String>,
    pub delete_rule: Option<String>,
}

/// Fetches both PK (`P`) and FK (`R`) constraints in one pass, joined back
/// to the referenced table name via `r_owner`/`r_constraint_name` so
/// `build_foreign_keys` can resolve the referenced table without a second
/// round trip per constraint.
pub fn fetch_constraints(conn: &Connection, owner: &str) -> Result<Vec<ConstraintRow>, IntrospectError> {
    let sql = "SELECT c.constraint_name, c.constraint_type, c.table_name, \
                      c.r_constraint_name, r.table_name AS r_table_name, c.delete_rule \
               FROM all_constraints c \
               LEFT JOIN all_constraints r \
                      ON r.owner = c.r_owner AND r.constraint_name = c.r_constraint_name \
               WHERE c.owner = :owner AND c.constraint_type IN ('P', 'R')";
    type Row = (String, String, String, Option<String>, Option<String>, Option<String>);
    conn.query_as::<Row>(sql, &[&owner])
        .map_err(|e| run_query_err("all_constraints", e))?
        .map(|row| {
            row.map(
                |(constraint_name, constraint_type, table_name, r_constraint_name, r_table_name, delete_rule)| ConstraintRow {
                    constraint_name,
                    constraint_type,
                    table_name,
                    r_constraint_name,
                    r_table_name,
                    delete_rule,
                },
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| run_query_err("all_constraints", e))
}

pub struct ConsColumnRow {
    pub constraint_name: String,
    pub column_name: String,
    pub position: i64,
}

pub fn fetch_cons_columns(conn: &Connection, owner: &str) -> Result<Vec<ConsColumnRow>, IntrospectError> {
    let sql = "SELECT constraint_name, column_name, position \
               FROM all_cons_columns \
               WHERE owner = :owner \
               ORDER BY constraint_name, position";
    type Row = (String, String, i64);
    conn.query_as::<Row>(sql, &[&owner])
        .map_err(|e| run_query_err("all_cons_columns", e))?
        .map(|row| row.map(|(constraint_name, column_name, position)| ConsColumnRow { constraint_name, column_name, position }))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| run_query_err("all_cons_columns", e))
}

pub struct IndexRow {
    pub index_name: String,
    pub table_name: String,
    pub uniqueness: String,
}

pub fn fetch_indexes(conn: &Connection, owner: &str) -> Result<Vec<IndexRow>, IntrospectError> {
    let sql = "SELECT index_name, table_name, uniqueness \
               FROM all_indexes \
               WHERE owner = :owner \
               ORDER BY index_name";
    type Row = (String, String, String);
    conn.query_as::<Row>(sql, &[&owner])
        .map_err(|e| run_query_err("all_indexes", e))?
        .map(|row| row.map(|(index_name, table_name, uniqueness)| IndexRow { index_name, table_name, uniqueness }))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| run_query_err("all_indexes", e))
}

pub struct IndColumnRow {
    pub index_name: String,
    pub table_name: String,
    pub column_name: String,
    pub column_position: i64,
}

pub fn fetch_ind_columns(conn: &Connection, owner: &str) -> Result<Vec<IndColumnRow>, IntrospectError> {
    let sql = "SELECT index_name, table_name, column_name, column_position \
               FROM all_ind_columns \
               WHERE index_owner = :owner \
               ORDER BY index_name, column_position";
    type Row = (String, String, String, i64);
    conn.query_as::<Row>(sql, &[&owner])
        .map_err(|e| run_query_err("all_ind_columns", e))?
        .map(|row| row.map(|(index_name, table_name, column_name, column_position)| IndColumnRow { index_name, table_name, column_name, column_position }))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| run_query_err("all_ind_columns", e))
}

pub struct SequenceRow {
    pub sequence_name: String,
    pub increment_by: i64,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub cache_size: Option<i64>,
    pub cycle_flag: String,
    pub order_flag: String,
    pub last_number: Option<String>,
}

/// `min_value`/`max_value`/`last_number` are cast with `TO_CHAR` because
/// Oracle's NUMBER can hold values that overflow a 64-bit integer; the
/// Planner is the one that decides whether a value fits the target range.
pub fn fetch_sequences(conn: &Connection, owner: &str) -> Result<Vec<SequenceRow>, IntrospectError> {
    let sql = "SELECT sequence_name, increment_by, TO_CHAR(min_value), TO_CHAR(max_value), \
                      cache_size, cycle_flag, order_flag, TO_CHAR(last_number) \
               FROM all_sequences \
               WHERE sequence_owner = :owner \
               ORDER BY sequence_name";
    type Row = (
        String,
        i64,
        Option<String>,
        Option<String>,
        Option<i64>,
        String,
        String,
        Option<String>,
    );
    conn.query_as::<Row>(sql, &[&owner])
        .map_err(|e| run_query_err("all_sequences", e))?
        .map(|row| {
            row.map(
                |(sequence_name, increment_by, min_value, max_value, cache_size, cycle_flag, order_flag, last_number)| SequenceRow {
                    sequence_name,
                    increment_by,
                    min_value,
                    max_value,
                    cache_size,
                    cycle_flag,
                    order_flag,
                    last_number,
                },
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| run_query_err("all_sequences", e))
}
