//! Consumes a `Catalog` plus a shared `NameMapper` and produces a single,
//! deterministic, dependency-ordered sequence of target DDL statements.
//!
//! Table creation never attempts to topologically order around foreign-key
//! cycles: every table is created first, and foreign keys are added
//! afterward as `DEFERRABLE` constraints.

mod sequences;
mod types;

use ora2pg_namemap::NameMapper;
use ora2pg_types::{Catalog, Column, ForeignKey, Index, PrimaryKey, Sequence, TableRef};
use types::column_def;

/// One DDL statement in the plan, already terminated with `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
}

/// The full ordered plan. Each statement is already `;`-terminated;
/// `to_sql_text` joins them with newlines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub statements: Vec<Statement>,
}

impl Plan {
    pub fn to_sql_text(&self) -> String {
        self.statements
            .iter()
            .map(|s| s.sql.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub target_schema: String,
    /// Whether emitted foreign keys get `DEFERRABLE INITIALLY DEFERRED`.
    /// Defaults to `true`.
    pub fks_deferrable: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            target_schema: "public".to_string(),
            fks_deferrable: true,
        }
    }
}

pub struct Planner;

impl Planner {
    /// Produces the ordered plan: sequences, then tables (with inline
    /// primary keys), then foreign keys, then indexes. Within each phase,
    /// statements appear in the order the Introspector presented the
    /// entities -- so two runs over the same source state produce
    /// byte-identical plans.
    pub fn plan(catalog: &Catalog, nm: &mut NameMapper, config: &PlannerConfig) -> Plan {
        let mut statements = Vec::new();

        for seq in &catalog.sequences {
            statements.push(Statement {
                sql: sequences::emit_sequence(seq, &config.target_schema, nm),
            });
        }

        for table in &catalog.tables {
            statements.push(Statement {
                sql: emit_create_table(table, catalog, &config.target_schema, nm),
            });
        }

        for fk in &catalog.foreign_keys {
            statements.push(Statement {
                sql: emit_foreign_key(fk, &config.target_schema, nm, config.fks_deferrable),
            });
        }

        for ix in &catalog.indexes {
            statements.push(Statement {
                sql: emit_index(ix, &config.target_schema, nm),
            });
        }

        Plan { statements }
    }
}

fn qualified_table(table: &TableRef, schema: &str, nm: &mut NameMapper) -> String {
    format!("{}.{}", nm.map_always_quoted(schema), nm.map_always_quoted(&table.name))
}

fn find_primary_key<'a>(table: &TableRef, catalog: &'a Catalog) -> Option<&'a PrimaryKey> {
    catalog.primary_keys.iter().find(|pk| pk.table == *table)
}

fn emit_create_table(table: &TableRef, catalog: &Catalog, schema: &str, nm: &mut NameMapper) -> String {
    let columns: Vec<&Column> = catalog.columns.iter().filter(|c| c.table == *table).collect();

    let mut lines: Vec<String> = columns.iter().map(|c| column_def(c, nm)).collect();

    if let Some(pk) = find_primary_key(table, catalog) {
        let cols = pk
            .columns
            .iter()
            .map(|c| nm.map_always_quoted(c))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("PRIMARY KEY ({cols})"));
    }

    let tbl = qualified_table(table, schema, nm);
    let body = lines.join(",\n  ");
    format!("CREATE TABLE IF NOT EXISTS {tbl} (\n  {body}\n);")
}

fn emit_foreign_key(fk: &ForeignKey, schema: &str, nm: &mut NameMapper, deferrable: bool) -> String {
    let tbl = qualified_table(&fk.table, schema, nm);
    let rtbl = qualified_table(&fk.ref_table, schema, nm);
    let cname = nm.map_always_quoted(&fk.constraint_name);
    let cols = fk.columns.iter().map(|c| nm.map_always_quoted(c)).collect::<Vec<_>>().join(", ");
    let rcols = fk.ref_columns.iter().map(|c| nm.map_always_quoted(c)).collect::<Vec<_>>().join(", ");

    let mut suffix = String::new();
    if let Some(rule) = fk.delete_rule.as_sql() {
        suffix.push_str(&format!(" ON DELETE {rule}"));
    }
    if deferrable {
        suffix.push_str(" DEFERRABLE INITIALLY DEFERRED");
    }

    format!("ALTER TABLE {tbl} ADD CONSTRAINT {cname} FOREIGN KEY ({cols}) REFERENCES {rtbl} ({rcols}){suffix};")
}

fn emit_index(ix: &Index, schema: &str, nm: &mut NameMapper) -> String {
    let ixname = nm.map_always_quoted(&ix.name);
    let tbl = qualified_table(&ix.table, schema, nm);
    let cols = ix.columns.iter().map(|c| nm.map_always_quoted(c)).collect::<Vec<_>>().join(", ");
    let uniq = if ix.unique { "UNIQUE " } else { "" };
    format!("CREATE {uniq}INDEX IF NOT EXISTS {ixname} ON {tbl} ({cols});")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ora2pg_types::DeleteRule;

    fn table(name: &str) -> TableRef {
        TableRef::new("HR", name)
    }

    fn column(table_name: &str, name: &str, type_name: &str, nullable: bool) -> Column {
        Column {
            table: table(table_name),
            name: name.to_string(),
            type_name: type_name.to_string(),
            precision: None,
            scale: None,
            nullable,
            default_expr: None,
            column_id: 1,
            raw_data_length: None,
            char_used: None,
        }
    }

    #[test]
    fn s4_foreign_key_with_deferrable() {
        let mut nm = NameMapper::new();
        let fk = ForeignKey {
            constraint_name: "FK_CUST".to_string(),
            table: table("ORDERS"),
            columns: vec!["CUST_ID".to_string()],
            ref_table: TableRef::new("HR", "CUSTOMERS"),
            ref_columns: vec!["ID".to_string()],
            delete_rule: DeleteRule::Cascade,
        };
        let sql = emit_foreign_key(&fk, "public", &mut nm, true);
        assert_eq!(
            sql,
            "ALTER TABLE \"public\".\"orders\" ADD CONSTRAINT fk_cust FOREIGN KEY (\"cust_id\") REFERENCES \"public\".\"customers\" (\"id\") ON DELETE CASCADE DEFERRABLE INITIALLY DEFERRED;"
        );
    }

    #[test]
    fn phase_order_is_sequences_then_tables_then_fks_then_indexes() {
        let catalog = Catalog {
            tables: vec![table("ORDERS")],
            columns: vec![column("ORDERS", "ID", "NUMBER", false)],
            primary_keys: vec![],
            foreign_keys: vec![ForeignKey {
                constraint_name: "FK1".to_string(),
                table: table("ORDERS"),
                columns: vec!["ID".to_string()],
                ref_table: table("ORDERS"),
                ref_columns: vec!["ID".to_string()],
                delete_rule: DeleteRule::NoAction,
            }],
            indexes: vec![Index {
                name: "IX1".to_string(),
                table: table("ORDERS"),
                columns: vec!["ID".to_string()],
                unique: false,
            }],
            sequences: vec![Sequence {
                name: "SEQ1".to_string(),
                increment: 1,
                min: None,
                max: None,
                cache: None,
                cycle: false,
                last_value: None,
                order_flag: false,
            }],
        };
        let mut nm = NameMapper::new();
        let plan = Planner::plan(&catalog, &mut nm, &PlannerConfig::default());
        let kinds: Vec<&str> = plan
            .statements
            .iter()
            .map(|s| {
                if s.sql.starts_with("CREATE SEQUENCE") {
                    "seq"
                } else if s.sql.starts_with("CREATE TABLE") {
                    "table"
                } else if s.sql.starts_with("ALTER TABLE") {
                    "fk"
                } else {
                    "index"
                }
            })
            .collect();
        assert_eq!(kinds, vec!["seq", "table", "fk", "index"]);
    }

    #[test]
    fn plan_is_deterministic_across_runs() {
        let catalog = Catalog {
            tables: vec![table("A"), table("B")],
            columns: vec![column("A", "X", "NUMBER", true), column("B", "Y", "VARCHAR2", true)],
            primary_keys: vec![],
            foreign_keys: vec![],
            indexes: vec![],
            sequences: vec![],
        };
        let mut nm1 = NameMapper::new();
        let plan1 = Planner::plan(&catalog, &mut nm1, &PlannerConfig::default());
        let mut nm2 = NameMapper::new();
        let plan2 = Planner::plan(&catalog, &mut nm2, &PlannerConfig::default());
        assert_eq!(plan1.to_sql_text(), plan2.to_sql_text());
    }

    #[test]
    fn inline_primary_key_is_emitted() {
        let catalog = Catalog {
            tables: vec![table("EMP")],
            columns: vec![column("EMP", "ID", "NUMBER", false)],
            primary_keys: vec![PrimaryKey {
                table: table("EMP"),
                constraint_name: "PK_EMP".to_string(),
                columns: vec!["ID".to_string()],
            }],
            foreign_keys: vec![],
            indexes: vec![],
            sequences: vec![],
        };
        let mut nm = NameMapper::new();
        let plan = Planner::plan(&catalog, &mut nm, &PlannerConfig::default());
        assert!(plan.statements[0].sql.contains("PRIMARY KEY (\"id\")"));
    }
}
