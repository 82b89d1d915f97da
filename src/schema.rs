use crate::arch::{ColumnMeta, TableArch};
use crate::config::ArchConfig;
use crate::engine::{Dialect, Engine};
use crate::error::{assure_model, Result};
use crate::model::JdbcType;
use tracing::debug;

/// DDL generator for compiled schemas
#[derive(Debug, Clone, Copy)]
pub struct SqlSchemaMaker {
    dialect: &'static Dialect,
    if_not_exists: bool,
    enforce_foreign_keys: bool,
}

impl SqlSchemaMaker {
    pub fn new(engine: Engine) -> Result<Self> {
        Ok(Self {
            dialect: engine.dialect()?,
            if_not_exists: true,
            enforce_foreign_keys: true,
        })
    }

    pub fn from_config(config: &ArchConfig) -> Result<Self> {
        Ok(Self::new(config.engine)?
            .if_not_exists(config.if_not_exists)
            .enforce_foreign_keys(config.enforce_foreign_keys))
    }

    pub fn if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = if_not_exists;
        self
    }

    /// When off, foreign reference columns are plain columns with no constraint
    pub fn enforce_foreign_keys(mut self, enforce: bool) -> Self {
        self.enforce_foreign_keys = enforce;
        self
    }

    pub fn engine(&self) -> Engine {
        self.dialect.engine()
    }

    /// `CREATE TABLE` statement: one line per column, then table-level
    /// composite keys and foreign keys
    pub fn make_create_table_query(&self, arch: &TableArch) -> Result<String> {
        let columns = arch.columns();
        assure_model(!columns.is_empty(), || {
            format!("No columns to create table {}", arch.sql_name())
        })?;

        let mut lines: Vec<String> = columns.iter().map(|column| self.column_definition(column)).collect();

        let primary_keys = arch.primary_key_columns();
        if primary_keys.len() > 1 {
            lines.push(format!("PRIMARY KEY ({})", join_names(&primary_keys)));
        }

        for field in arch.fields().iter().filter(|field| field.is_unique() && field.is_multi_column()) {
            let unique: Vec<&ColumnMeta> = field.columns().iter().collect();
            lines.push(format!("UNIQUE ({})", join_names(&unique)));
        }

        if self.enforce_foreign_keys {
            for column in &columns {
                if let Some(foreign) = column.foreign() {
                    lines.push(format!(
                        "FOREIGN KEY ({}) REFERENCES {}({})",
                        column.name(),
                        foreign.table,
                        foreign.column
                    ));
                }
            }
        }

        let if_not_exists = if self.if_not_exists { "IF NOT EXISTS " } else { "" };
        let query = format!(
            "CREATE TABLE {}{} (\n    {}\n)\n",
            if_not_exists,
            arch.sql_name(),
            lines.join(",\n    ")
        );
        debug!(engine = %self.engine(), table = arch.sql_name(), "Rendered create table");
        Ok(query)
    }

    pub fn make_drop_table_query(arch: &TableArch) -> String {
        format!("DROP TABLE IF EXISTS {}", arch.sql_name())
    }

    /// Create statements for several tables, in the given order
    pub fn make_ddl(&self, archs: &[TableArch]) -> Result<String> {
        let queries = archs
            .iter()
            .map(|arch| self.make_create_table_query(arch))
            .collect::<Result<Vec<_>>>()?;
        Ok(queries.join("\n"))
    }

    fn column_definition(&self, column: &ColumnMeta) -> String {
        let auto_increment = self.auto_increment(column);
        let mut parts = vec![format!(
            "{} {}",
            column.name(),
            self.dialect.type_name(column.jdbc_type(), column.is_key())
        )];

        if !column.is_nullable() {
            parts.push("NOT NULL".to_string());
        }
        if column.primary_key().is_single() {
            parts.push("PRIMARY KEY".to_string());
        }
        if let Some(keyword) = auto_increment {
            parts.push(keyword.to_string());
        }
        if column.unique().is_single() && (self.dialect.unique_blob() || column.jdbc_type() != JdbcType::Bytes) {
            parts.push("UNIQUE".to_string());
        }
        if let Some(default) = column.default_value() {
            if auto_increment.is_none() {
                parts.push(format!("DEFAULT ({})", default));
            }
        }
        parts.join(" ")
    }

    /// Only a single integral primary key is generated by the database
    fn auto_increment(&self, column: &ColumnMeta) -> Option<&'static str> {
        if column.primary_key().is_single() && column.jdbc_type().is_integral() {
            self.dialect.auto_increment()
        } else {
            None
        }
    }
}

fn join_names(columns: &[&ColumnMeta]) -> String {
    columns.iter().map(|column| column.name()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ArchFactory;
    use crate::model::{EntityDesc, FieldDesc, FieldKind, ModelCatalog};

    fn catalog() -> ModelCatalog {
        ModelCatalog::new()
            .with(
                EntityDesc::new("User")
                    .field(FieldDesc::new("userId", FieldKind::primitive(JdbcType::Int)))
                    .field(FieldDesc::new("createdAt", FieldKind::boxed(JdbcType::Timestamp)))
                    .field(FieldDesc::new("accessLevel", FieldKind::enumeration("AccessLevel"))),
            )
            .unwrap()
            .with(
                EntityDesc::new("BlobKv")
                    .field(FieldDesc::new("id", FieldKind::boxed(JdbcType::Bytes)))
                    .field(FieldDesc::new("value", FieldKind::boxed(JdbcType::Bytes)).nullable()),
            )
            .unwrap()
            .with(
                EntityDesc::new("Session")
                    .field(FieldDesc::new("sessionId", FieldKind::primitive(JdbcType::Long)))
                    .field(FieldDesc::new("user", FieldKind::foreign("User")))
                    .field(FieldDesc::new("userAgent", FieldKind::boxed(JdbcType::String)))
                    .field(FieldDesc::new("ipAddress", FieldKind::boxed(JdbcType::String)).nullable()),
            )
            .unwrap()
    }

    fn create(engine: Engine, model: &str) -> String {
        let catalog = catalog();
        let config = ArchConfig::default();
        let arch = ArchFactory::new(&catalog, &config).build_table_arch(model).unwrap();
        SqlSchemaMaker::new(engine).unwrap().make_create_table_query(&arch).unwrap()
    }

    #[test]
    fn test_create_table_user() {
        assert_eq!(
            create(Engine::SQLite, "User"),
            "CREATE TABLE IF NOT EXISTS user (\n    \
             user_id INTEGER NOT NULL PRIMARY KEY,\n    \
             created_at INTEGER NOT NULL,\n    \
             access_level INTEGER NOT NULL\n\
             )\n"
        );
        assert_eq!(
            create(Engine::H2, "User"),
            "CREATE TABLE IF NOT EXISTS user (\n    \
             user_id INTEGER NOT NULL PRIMARY KEY AUTO_INCREMENT,\n    \
             created_at TIMESTAMP NOT NULL,\n    \
             access_level INTEGER NOT NULL\n\
             )\n"
        );
        assert_eq!(
            create(Engine::MySQL, "User"),
            "CREATE TABLE IF NOT EXISTS user (\n    \
             user_id INTEGER NOT NULL PRIMARY KEY AUTO_INCREMENT,\n    \
             created_at TIMESTAMP(3) NOT NULL,\n    \
             access_level INTEGER NOT NULL\n\
             )\n"
        );
    }

    #[test]
    fn test_create_table_blob_kv() {
        let expected_sqlite = "CREATE TABLE IF NOT EXISTS blob_kv (\n    \
                               id VARCHAR NOT NULL PRIMARY KEY,\n    \
                               value BLOB\n\
                               )\n";
        assert_eq!(create(Engine::SQLite, "BlobKv"), expected_sqlite);
        assert_eq!(create(Engine::H2, "BlobKv"), expected_sqlite);
        assert!(create(Engine::MySQL, "BlobKv").contains("id VARBINARY(255) NOT NULL PRIMARY KEY,"));
    }

    #[test]
    fn test_create_table_foreign_key() {
        assert_eq!(
            create(Engine::MySQL, "Session"),
            "CREATE TABLE IF NOT EXISTS session (\n    \
             session_id BIGINT NOT NULL PRIMARY KEY AUTO_INCREMENT,\n    \
             user_id INTEGER NOT NULL,\n    \
             user_agent VARCHAR(4096) NOT NULL,\n    \
             ip_address VARCHAR(4096),\n    \
             FOREIGN KEY (user_id) REFERENCES user(user_id)\n\
             )\n"
        );
    }

    #[test]
    fn test_foreign_keys_not_enforced() {
        let catalog = catalog();
        let config = ArchConfig {
            enforce_foreign_keys: false,
            ..ArchConfig::for_engine(Engine::MySQL)
        };
        let arch = ArchFactory::new(&catalog, &config).build_table_arch("Session").unwrap();
        let query = SqlSchemaMaker::from_config(&config).unwrap().make_create_table_query(&arch).unwrap();

        assert!(!query.contains("FOREIGN KEY"));
        assert!(query.contains("    user_id INTEGER NOT NULL,\n"));
        assert!(query.ends_with("    ip_address VARCHAR(4096)\n)\n"));
    }

    #[test]
    fn test_composite_constraints_and_defaults() {
        let catalog = ModelCatalog::new()
            .with(
                EntityDesc::new("Tile")
                    .field(FieldDesc::new("pos", FieldKind::Point).primary_key())
                    .field(FieldDesc::new("anchor", FieldKind::Point).unique())
                    .field(FieldDesc::new("layer", FieldKind::primitive(JdbcType::Int)).default_value("0"))
                    .field(FieldDesc::new("data", FieldKind::boxed(JdbcType::Bytes)).unique()),
            )
            .unwrap();
        let config = ArchConfig::default();
        let arch = ArchFactory::new(&catalog, &config).build_table_arch("Tile").unwrap();

        let h2 = SqlSchemaMaker::new(Engine::H2).unwrap().if_not_exists(false);
        assert_eq!(
            h2.make_create_table_query(&arch).unwrap(),
            "CREATE TABLE tile (\n    \
             pos_x INTEGER NOT NULL,\n    \
             pos_y INTEGER NOT NULL,\n    \
             anchor_x INTEGER NOT NULL,\n    \
             anchor_y INTEGER NOT NULL,\n    \
             layer INTEGER NOT NULL DEFAULT (0),\n    \
             data BLOB NOT NULL,\n    \
             PRIMARY KEY (pos_x, pos_y),\n    \
             UNIQUE (anchor_x, anchor_y)\n\
             )\n"
        );

        let sqlite = SqlSchemaMaker::new(Engine::SQLite).unwrap();
        assert!(sqlite.make_create_table_query(&arch).unwrap().contains("data BLOB NOT NULL UNIQUE,"));
    }

    #[test]
    fn test_default_skipped_for_auto_increment() {
        let catalog = ModelCatalog::new()
            .with(
                EntityDesc::new("Counter")
                    .field(FieldDesc::new("id", FieldKind::primitive(JdbcType::Long)).default_value("1")),
            )
            .unwrap();
        let config = ArchConfig::default();
        let arch = ArchFactory::new(&catalog, &config).build_table_arch("Counter").unwrap();

        let mysql = SqlSchemaMaker::new(Engine::MySQL).unwrap().make_create_table_query(&arch).unwrap();
        assert!(mysql.contains("id BIGINT NOT NULL PRIMARY KEY AUTO_INCREMENT\n"));
        let sqlite = SqlSchemaMaker::new(Engine::SQLite).unwrap().make_create_table_query(&arch).unwrap();
        assert!(sqlite.contains("id INTEGER NOT NULL PRIMARY KEY DEFAULT (1)\n"));
    }

    #[test]
    fn test_postgres_and_unsupported() {
        let pg = create(Engine::PostgreSQL, "User");
        assert!(pg.contains("user_id INTEGER NOT NULL PRIMARY KEY GENERATED BY DEFAULT AS IDENTITY,"));
        assert!(pg.contains("created_at TIMESTAMP NOT NULL,"));
        assert!(SqlSchemaMaker::new(Engine::Derby).is_err());
    }

    #[test]
    fn test_drop_and_ddl() {
        let catalog = catalog();
        let config = ArchConfig::for_engine(Engine::SQLite);
        let archs = ArchFactory::new(&catalog, &config).build_all().unwrap();
        assert_eq!(SqlSchemaMaker::make_drop_table_query(&archs[0]), "DROP TABLE IF EXISTS user");

        let ddl = SqlSchemaMaker::from_config(&config).unwrap().make_ddl(&archs).unwrap();
        assert_eq!(ddl.matches("CREATE TABLE IF NOT EXISTS").count(), 3);
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS user ("));
    }
}
