use crate::error::{ArchError, Result};
use crate::model::JdbcType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SQL engines a schema can be rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engine {
    SQLite,
    MySQL,
    MariaDB,
    H2,
    PostgreSQL,
    Oracle,
    MsSqlServer,
    Derby,
    HyperSQL,
    Unknown,
}

impl Engine {
    pub const ALL: [Engine; 10] = [
        Engine::SQLite,
        Engine::MySQL,
        Engine::MariaDB,
        Engine::H2,
        Engine::PostgreSQL,
        Engine::Oracle,
        Engine::MsSqlServer,
        Engine::Derby,
        Engine::HyperSQL,
        Engine::Unknown,
    ];

    /// Lowercase tag, as used in JDBC-style URLs
    pub fn tag(self) -> &'static str {
        match self {
            Engine::SQLite => "sqlite",
            Engine::MySQL => "mysql",
            Engine::MariaDB => "mariadb",
            Engine::H2 => "h2",
            Engine::PostgreSQL => "postgresql",
            Engine::Oracle => "oracle",
            Engine::MsSqlServer => "sqlserver",
            Engine::Derby => "derby",
            Engine::HyperSQL => "hsqldb",
            Engine::Unknown => "unknown",
        }
    }

    /// Detects the engine from a `jdbc:<engine>:...` URL (or a bare `<engine>:...` one).
    /// Unrecognized URLs map to [`Engine::Unknown`].
    pub fn from_jdbc_url(url: &str) -> Engine {
        let url = url.trim();
        let rest = url.strip_prefix("jdbc:").unwrap_or(url);
        let tag = rest.split(':').next().unwrap_or_default();
        tag.parse().unwrap_or(Engine::Unknown)
    }

    /// Whether pagination is written `LIMIT ? OFFSET ?` rather than `FETCH NEXT ? ROWS ONLY`
    pub fn supports_limit(self) -> bool {
        !matches!(self, Engine::Oracle | Engine::MsSqlServer | Engine::Derby)
    }

    pub fn dialect(self) -> Result<&'static Dialect> {
        match self {
            Engine::SQLite => Ok(&SQLITE),
            Engine::MySQL => Ok(&MYSQL),
            Engine::MariaDB => Ok(&MARIADB),
            Engine::H2 => Ok(&H2),
            Engine::PostgreSQL => Ok(&POSTGRESQL),
            other => Err(ArchError::UnsupportedEngine(other.to_string())),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Engine::SQLite => "SQLite",
            Engine::MySQL => "MySQL",
            Engine::MariaDB => "MariaDB",
            Engine::H2 => "H2",
            Engine::PostgreSQL => "PostgreSQL",
            Engine::Oracle => "Oracle",
            Engine::MsSqlServer => "MsSqlServer",
            Engine::Derby => "Derby",
            Engine::HyperSQL => "HyperSQL",
            Engine::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Engine {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Engine::ALL
            .into_iter()
            .find(|engine| engine.tag() == lower || engine.to_string().to_ascii_lowercase() == lower)
            .or(match lower.as_str() {
                "postgres" => Some(Engine::PostgreSQL),
                "mssql" => Some(Engine::MsSqlServer),
                "hsql" => Some(Engine::HyperSQL),
                _ => None,
            })
            .ok_or_else(|| ArchError::UnsupportedEngine(s.to_string()))
    }
}

/// Conflict-handling keyword on INSERT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ignore {
    #[default]
    Default,
    Ignore,
    OrIgnore,
}

impl Ignore {
    pub fn keyword(self) -> &'static str {
        match self {
            Ignore::Default => "INSERT",
            Ignore::Ignore => "INSERT IGNORE",
            Ignore::OrIgnore => "INSERT OR IGNORE",
        }
    }
}

/// How a dialect spells column types and constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeTable {
    Sqlite,
    MySql,
    Standard,
    Postgres,
}

/// Per-engine syntax variants consulted by the generators
#[derive(Debug, PartialEq, Eq)]
pub struct Dialect {
    engine: Engine,
    ignore: Ignore,
    types: TypeTable,
    auto_increment: Option<&'static str>,
    unique_blob: bool,
}

static SQLITE: Dialect = Dialect {
    engine: Engine::SQLite,
    ignore: Ignore::OrIgnore,
    types: TypeTable::Sqlite,
    auto_increment: None,
    unique_blob: true,
};

static MYSQL: Dialect = Dialect {
    engine: Engine::MySQL,
    ignore: Ignore::Ignore,
    types: TypeTable::MySql,
    auto_increment: Some("AUTO_INCREMENT"),
    unique_blob: true,
};

static MARIADB: Dialect = Dialect {
    engine: Engine::MariaDB,
    ignore: Ignore::Ignore,
    types: TypeTable::MySql,
    auto_increment: Some("AUTO_INCREMENT"),
    unique_blob: true,
};

static H2: Dialect = Dialect {
    engine: Engine::H2,
    ignore: Ignore::Default,
    types: TypeTable::Standard,
    auto_increment: Some("AUTO_INCREMENT"),
    unique_blob: false,
};

static POSTGRESQL: Dialect = Dialect {
    engine: Engine::PostgreSQL,
    ignore: Ignore::Default,
    types: TypeTable::Postgres,
    auto_increment: Some("GENERATED BY DEFAULT AS IDENTITY"),
    unique_blob: true,
};

impl Dialect {
    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn ignore(&self) -> Ignore {
        self.ignore
    }

    pub fn auto_increment(&self) -> Option<&'static str> {
        self.auto_increment
    }

    pub fn unique_blob(&self) -> bool {
        self.unique_blob
    }

    /// Query listing the columns of `table`
    pub fn column_introspection_query(&self, table: &str) -> String {
        match self.engine {
            Engine::SQLite => format!("PRAGMA table_info({})", table),
            Engine::PostgreSQL => format!(
                "SELECT column_name, data_type, is_nullable, column_default\n\
                 FROM information_schema.columns\n\
                 WHERE table_name = '{}'\n\
                 ORDER BY ordinal_position",
                table.replace('\'', "''")
            ),
            _ => format!("SHOW COLUMNS FROM {}", table),
        }
    }

    /// Column type name. Keys (primary or foreign) get index-friendly types
    /// where the plain type can't be indexed.
    pub fn type_name(&self, jdbc_type: JdbcType, is_key: bool) -> &'static str {
        match self.types {
            TypeTable::Sqlite => match jdbc_type {
                JdbcType::Float | JdbcType::Double => "REAL",
                JdbcType::String => "VARCHAR",
                JdbcType::Bytes if is_key => "VARCHAR",
                JdbcType::Bytes => "BLOB",
                _ => "INTEGER",
            },
            TypeTable::MySql => match jdbc_type {
                JdbcType::String if is_key => "VARCHAR(255)",
                JdbcType::String => "VARCHAR(4096)",
                JdbcType::Bytes if is_key => "VARBINARY(255)",
                JdbcType::Timestamp => "TIMESTAMP(3)",
                other => standard_type_name(other, is_key),
            },
            TypeTable::Standard => standard_type_name(jdbc_type, is_key),
            TypeTable::Postgres => match jdbc_type {
                JdbcType::Boolean => "BOOLEAN",
                JdbcType::Byte | JdbcType::Short => "SMALLINT",
                JdbcType::Int => "INTEGER",
                JdbcType::Long => "BIGINT",
                JdbcType::Float => "REAL",
                JdbcType::Double => "DOUBLE PRECISION",
                JdbcType::String => "TEXT",
                JdbcType::Bytes => "BYTEA",
                JdbcType::Date => "DATE",
                JdbcType::Time => "TIME",
                JdbcType::Timestamp => "TIMESTAMP",
            },
        }
    }
}

fn standard_type_name(jdbc_type: JdbcType, is_key: bool) -> &'static str {
    match jdbc_type {
        JdbcType::Boolean => "BOOLEAN",
        JdbcType::Byte => "TINYINT",
        JdbcType::Short => "SMALLINT",
        JdbcType::Int => "INTEGER",
        JdbcType::Long => "BIGINT",
        JdbcType::Float => "REAL",
        JdbcType::Double => "DOUBLE",
        JdbcType::String => "VARCHAR",
        JdbcType::Bytes if is_key => "VARCHAR",
        JdbcType::Bytes => "BLOB",
        JdbcType::Time => "TIME",
        JdbcType::Date => "DATE",
        JdbcType::Timestamp => "TIMESTAMP",
    }
}
