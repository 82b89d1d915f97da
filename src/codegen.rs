use crate::arch::{ColumnMeta, TableArch};
use crate::engine::{Engine, Ignore};
use crate::error::{assure_model, Result};
use tracing::trace;

fn assure_columns(arch: &TableArch, columns: &[&ColumnMeta], what: &str) -> Result<()> {
    assure_model(!columns.is_empty(), || {
        format!("No columns to render {} for table {}", what, arch.sql_name())
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Renders a compiled column as the builder-chain expression that recreates it
pub struct ColumnMetaMaker;

impl ColumnMetaMaker {
    pub fn make_column_meta(column: &ColumnMeta) -> String {
        let mut code = format!(
            "ColumnMeta::of(OwnColumn::{}, JdbcType::{})",
            column.name(),
            column.jdbc_type()
        );
        if column.primary_key().is_set() {
            code.push_str(&format!(".with_primary_key(ConstraintStatus::{})", column.primary_key()));
        }
        if column.unique().is_set() {
            code.push_str(&format!(".with_unique(ConstraintStatus::{})", column.unique()));
        }
        if column.is_nullable() {
            code.push_str(".with_nullable(true)");
        }
        if let Some(default) = column.default_value() {
            code.push_str(&format!(".with_default({:?})", default));
        }
        code
    }

    /// One line per column, in declaration order
    pub fn make_all(arch: &TableArch) -> Result<Vec<String>> {
        let columns = arch.columns();
        assure_columns(arch, &columns, "column metas")?;
        Ok(columns.into_iter().map(Self::make_column_meta).collect())
    }
}

/// `INSERT [IGNORE | OR IGNORE] INTO t (..)\nVALUES (..)\n`
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertMaker {
    ignore: Ignore,
}

impl InsertMaker {
    pub fn new(ignore: Ignore) -> Self {
        Self { ignore }
    }

    /// Uses the conflict keyword of the engine's dialect
    pub fn for_engine(engine: Engine) -> Result<Self> {
        Ok(Self::new(engine.dialect()?.ignore()))
    }

    pub fn make_all(&self, arch: &TableArch) -> Result<String> {
        self.make(arch, &arch.columns())
    }

    pub fn make(&self, arch: &TableArch, columns: &[&ColumnMeta]) -> Result<String> {
        assure_columns(arch, columns, "INSERT")?;
        let names = columns.iter().map(|column| column.name()).collect::<Vec<_>>();
        let query = format!(
            "{} INTO {} ({})\nVALUES ({})\n",
            self.ignore.keyword(),
            arch.sql_name(),
            names.join(", "),
            placeholders(columns.len())
        );
        trace!(table = arch.sql_name(), %query, "Rendered insert");
        Ok(query)
    }
}

/// `UPDATE t\nSET a=?, b=?\n`
pub struct UpdateMaker;

impl UpdateMaker {
    pub fn make(arch: &TableArch, columns: &[&ColumnMeta]) -> Result<String> {
        assure_columns(arch, columns, "UPDATE")?;
        let assignments = columns
            .iter()
            .map(|column| format!("{}=?", column.name()))
            .collect::<Vec<_>>();
        let query = format!("UPDATE {}\nSET {}\n", arch.sql_name(), assignments.join(", "));
        trace!(table = arch.sql_name(), %query, "Rendered update");
        Ok(query)
    }
}

/// Primary key lookup clause
pub struct WhereMaker;

impl WhereMaker {
    pub fn make_for_primary_columns(arch: &TableArch) -> Result<String> {
        let columns = arch.primary_key_columns();
        assure_model(!columns.is_empty(), || {
            format!("Table {} has no primary key", arch.sql_name())
        })?;
        Ok(Self::make_for_columns(arch, &columns))
    }

    /// `WHERE t.a=? AND t.b=?`
    pub fn make_for_columns(arch: &TableArch, columns: &[&ColumnMeta]) -> String {
        let conditions = columns
            .iter()
            .map(|column| format!("{}.{}=?", arch.sql_name(), column.name()))
            .collect::<Vec<_>>();
        format!("WHERE {}", conditions.join(" AND "))
    }
}
