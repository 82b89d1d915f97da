//! sql-arch - Typed SQL expressions and schema compilation
//!
//! sql-arch turns nested entity descriptions into flat column schemas and renders
//! the SQL that goes with them: DDL, INSERT/UPDATE templates, primary key lookups
//! and typed SELECT queries with ordered bind arguments.
//!
//! # Architecture
//!
//! - **Model → Schema**: [`ArchFactory`] flattens a [`ModelCatalog`] into [`TableArch`]es
//!   (nested models, points, mapped types and foreign keys become prefixed columns)
//! - **Schema → SQL**: [`SqlSchemaMaker`], [`InsertMaker`], [`UpdateMaker`] and [`WhereMaker`]
//!   render statements for a [`TableArch`]
//! - **Typed Expressions**: [`Term`], [`Func`] and the `filter` combinators are
//!   type-checked when built, so an invalid query never reaches the database
//! - **Dialects**: [`Engine`] selects type names, conflict keywords and pagination syntax
//!
//! # Example
//!
//! ```rust
//! use sql_arch::prelude::*;
//!
//! fn main() -> sql_arch::Result<()> {
//!     let catalog = ModelCatalog::new().with(
//!         EntityDesc::new("User")
//!             .field(FieldDesc::new("userId", FieldKind::primitive(JdbcType::Int)))
//!             .field(FieldDesc::new("name", FieldKind::boxed(JdbcType::String))),
//!     )?;
//!     let config = ArchConfig::for_engine(Engine::SQLite);
//!     let arch = ArchFactory::new(&catalog, &config).build_table_arch("User")?;
//!
//!     let ddl = SqlSchemaMaker::from_config(&config)?.make_create_table_query(&arch)?;
//!     assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS user ("));
//!
//!     let insert = InsertMaker::for_engine(config.engine)?.make_all(&arch)?;
//!     assert_eq!(insert, "INSERT OR IGNORE INTO user (user_id, name)\nVALUES (?, ?)\n");
//!
//!     let name = Column::new("name", TermType::String);
//!     let query = SelectWhere::from(&arch)
//!         .select([name.clone()])
//!         .where_clause(Where::of(like(name, var("B%")?)?)?)
//!         .limit(10)
//!         .build()?;
//!     assert_eq!(query.repr(), "SELECT name\nFROM user\nWHERE name LIKE ?\nLIMIT ?");
//!     assert_eq!(query.args().len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! # Philosophy
//!
//! sql-arch generates SQL text, it does not execute it:
//!
//! - No connection handling, the caller binds `args` with its own driver
//! - Schema is derived from models, never introspected back into them
//! - Every `?` in a rendered statement has exactly one matching arg, in order

pub mod arch;
pub mod builder;
pub mod codegen;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod factory;
pub mod filter;
pub mod func;
pub mod model;
pub mod naming;
pub mod schema;
pub mod term;

pub use arch::{ColumnMeta, ConstraintStatus, ForeignRef, PojoArch, TableArch, TableField};
pub use builder::{
    JoinOn, JoinType, Pagination, SelectGroupBy, SelectJoin, SelectQuery, SelectWhere, TableName,
};
pub use codegen::{ColumnMetaMaker, InsertMaker, UpdateMaker, WhereMaker};
pub use config::ArchConfig;
pub use defaults::{Defaults, EMPTY_COLUMN_DEFAULTS};
pub use engine::{Dialect, Engine, Ignore};
pub use error::{ArchError, Result};
pub use factory::ArchFactory;
pub use filter::{
    CompareType, Comparison, Having, LogicalOp, OrderBy, OrderTerm, SortDirection, Where,
};
pub use func::{Func, FuncExpr};
pub use model::{EntityDesc, FieldDesc, FieldKind, JdbcType, ModelCatalog};
pub use schema::SqlSchemaMaker;
pub use term::{Args, Column, Literal, Term, TermType, Variable};

/// Prelude for common imports
pub mod prelude {
    pub use crate::arch::{ColumnMeta, TableArch};
    pub use crate::builder::{
        JoinOn, JoinType, Pagination, SelectGroupBy, SelectJoin, SelectQuery, SelectWhere,
    };
    pub use crate::codegen::{InsertMaker, UpdateMaker, WhereMaker};
    pub use crate::config::ArchConfig;
    pub use crate::engine::Engine;
    pub use crate::error::{ArchError, Result};
    pub use crate::factory::ArchFactory;
    pub use crate::filter::{
        and, between, is_not_null, is_null, like, not, or, CompareType, Having, OrderBy, OrderTerm,
        SortDirection, Where,
    };
    pub use crate::func::Func;
    pub use crate::model::{EntityDesc, FieldDesc, FieldKind, JdbcType, ModelCatalog};
    pub use crate::schema::SqlSchemaMaker;
    pub use crate::term::{literal, null, num, star, var, var_of, Column, Term, TermType};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _config = ArchConfig::default();
        let _jdbc = JdbcType::String;
        let _cmp = CompareType::Eq;
        let _op = LogicalOp::And;
        assert!(EMPTY_COLUMN_DEFAULTS.at(0).is_none());
    }
}
