use serde_json::json;
use sql_arch::prelude::*;
use sql_arch::{ColumnMetaMaker, Defaults, EMPTY_COLUMN_DEFAULTS};

const CATALOG: &str = r#"{
    "models": [
        {
            "name": "User",
            "fields": [
                {"name": "userId", "kind": "primitive", "jdbc_type": "Int"},
                {"name": "name", "kind": "boxed", "jdbc_type": "String", "attrs": {"unique": true}},
                {"name": "createdAt", "kind": "boxed", "jdbc_type": "Timestamp"}
            ]
        },
        {
            "name": "Session",
            "fields": [
                {"name": "sessionId", "kind": "primitive", "jdbc_type": "Long"},
                {"name": "user", "kind": "foreign", "model": "User"},
                {"name": "userAgent", "kind": "boxed", "jdbc_type": "String"},
                {"name": "ipAddress", "kind": "optional", "of": {"kind": "boxed", "jdbc_type": "String"}}
            ]
        }
    ]
}"#;

fn user_name_arch() -> TableArch {
    let catalog = ModelCatalog::new()
        .with(
            EntityDesc::new("User")
                .field(FieldDesc::new("userId", FieldKind::primitive(JdbcType::Int)).primary_key())
                .field(FieldDesc::new("name", FieldKind::boxed(JdbcType::String))),
        )
        .unwrap();
    let config = ArchConfig::default();
    ArchFactory::new(&catalog, &config).build_table_arch("User").unwrap()
}

#[test]
fn test_count_and_sum_functions() {
    let int = Column::new("i", TermType::Number);
    let count = Func::Count.apply([int]).unwrap();
    assert_eq!(count.repr(), "count(i)");
    assert_eq!(count.term_type(), TermType::Number);

    let string = Column::new("s", TermType::String);
    assert!(Func::Sum.apply([string]).unwrap_err().is_query_error());
}

#[test]
fn test_insert_and_primary_key_lookup() {
    let arch = user_name_arch();
    assert_eq!(
        InsertMaker::default().make_all(&arch).unwrap(),
        "INSERT INTO user (user_id, name)\nVALUES (?, ?)\n"
    );
    assert_eq!(WhereMaker::make_for_primary_columns(&arch).unwrap(), "WHERE user.user_id=?");
}

#[test]
fn test_update_non_primary_columns() {
    let arch = user_name_arch();
    let columns = arch.columns_where(|field| !field.is_primary_key());
    assert_eq!(UpdateMaker::make(&arch, &columns).unwrap(), "UPDATE user\nSET name=?\n");
}

#[test]
fn test_nested_structure_flattening() {
    let catalog = ModelCatalog::new()
        .with(
            EntityDesc::new("Foo")
                .field(FieldDesc::new("x", FieldKind::primitive(JdbcType::Int)))
                .field(FieldDesc::new("y", FieldKind::primitive(JdbcType::Long))),
        )
        .unwrap()
        .with(
            EntityDesc::new("Holder")
                .field(FieldDesc::new("z", FieldKind::primitive(JdbcType::Boolean)))
                .field(FieldDesc::new("foo", FieldKind::nested("Foo"))),
        )
        .unwrap();
    let config = ArchConfig::default();
    let pojo = ArchFactory::new(&catalog, &config).build_pojo_arch("Holder").unwrap();

    let columns: Vec<(&str, TermType)> = pojo
        .columns()
        .iter()
        .map(|column| (column.name(), column.term_type()))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("z", TermType::Bool),
            ("foo_x", TermType::Number),
            ("foo_y", TermType::Number),
        ]
    );
}

#[test]
fn test_defaults_multi_columns() {
    let defaults = Defaults::of_multi_columns(2, [Some(""), Some("")]).unwrap();
    assert_eq!(defaults, Defaults::new(vec![Some(String::new()), Some(String::new())]));
    assert!(Defaults::of_multi_columns(2, [Some("")]).unwrap_err().is_model_error());

    let none = Defaults::of_one_column(Vec::<Option<String>>::new()).unwrap();
    assert!(none.ptr_eq(&EMPTY_COLUMN_DEFAULTS));
}

#[test]
fn test_json_catalog_to_ddl() {
    let catalog = ModelCatalog::from_json(CATALOG).unwrap();
    let config = ArchConfig::from_json(r#"{"engine": "MySQL"}"#).unwrap();
    let archs = ArchFactory::new(&catalog, &config).build_all().unwrap();
    assert_eq!(archs.len(), 2);

    let ddl = SqlSchemaMaker::from_config(&config).unwrap().make_ddl(&archs).unwrap();
    assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS user (\n"));
    assert!(ddl.contains("    user_id INTEGER NOT NULL PRIMARY KEY AUTO_INCREMENT,\n"));
    assert!(ddl.contains("    name VARCHAR(4096) NOT NULL UNIQUE,\n"));
    assert!(ddl.contains("    created_at TIMESTAMP(3) NOT NULL\n"));
    assert!(ddl.contains("CREATE TABLE IF NOT EXISTS session (\n"));
    assert!(ddl.contains("    user_id INTEGER NOT NULL,\n"));
    assert!(ddl.contains("    ip_address VARCHAR(4096),\n"));
    assert!(ddl.contains("    FOREIGN KEY (user_id) REFERENCES user(user_id)\n"));

    let insert = InsertMaker::for_engine(config.engine).unwrap();
    let session = &archs[1];
    assert_eq!(
        insert.make(session, &session.non_primary_key_columns()).unwrap(),
        "INSERT IGNORE INTO session (user_id, user_agent, ip_address)\nVALUES (?, ?, ?)\n"
    );
}

#[test]
fn test_column_metas_for_catalog() {
    let catalog = ModelCatalog::from_json(CATALOG).unwrap();
    let config = ArchConfig::default();
    let session = ArchFactory::new(&catalog, &config).build_table_arch("Session").unwrap();

    let lines = ColumnMetaMaker::make_all(&session).unwrap();
    assert_eq!(
        lines,
        vec![
            "ColumnMeta::of(OwnColumn::session_id, JdbcType::Long).with_primary_key(ConstraintStatus::SingleColumn)",
            "ColumnMeta::of(OwnColumn::user_id, JdbcType::Int)",
            "ColumnMeta::of(OwnColumn::user_agent, JdbcType::String)",
            "ColumnMeta::of(OwnColumn::ip_address, JdbcType::String).with_nullable(true)",
        ]
    );
}

#[test]
fn test_select_over_compiled_schema() -> sql_arch::Result<()> {
    let catalog = ModelCatalog::from_json(CATALOG)?;
    let config = ArchConfig::for_engine(Engine::MySQL);
    let session = ArchFactory::new(&catalog, &config).build_table_arch("Session")?;

    let user_id = session.column("user_id").map(ColumnMeta::to_column).ok_or_else(|| {
        ArchError::InvalidModel("missing user_id".to_string())
    })?;
    let user_agent = session.column("user_agent").map(ColumnMeta::to_column).ok_or_else(|| {
        ArchError::InvalidModel("missing user_agent".to_string())
    })?;

    let query = SelectWhere::from(&session)
        .select([user_agent.clone()])
        .where_clause(Where::of(CompareType::Eq.compare(user_id.clone(), var(7)?)?)?)
        .order_by(OrderBy::of([user_agent])?)
        .paginate(Pagination::of_offset(10, 20), config.engine)
        .build()?;
    assert_eq!(
        query.repr(),
        "SELECT user_agent\nFROM session\nWHERE user_id = ?\nORDER BY user_agent ASC\nLIMIT ?\nOFFSET ?"
    );
    assert_eq!(query.args().clone().into_vec(), vec![json!(7), json!(10), json!(20)]);

    let grouped = SelectGroupBy::from(&session)
        .group_by([user_id])
        .aggregate(Func::Count.apply([star()])?)?
        .build()?;
    assert_eq!(grouped.repr(), "SELECT user_id, count(*)\nFROM session\nGROUP BY user_id");
    assert!(grouped.args().is_empty());
    Ok(())
}

#[test]
fn test_invalid_catalogs_are_model_errors() {
    let cyclic = r#"{"models": [
        {"name": "Node", "fields": [{"name": "next", "kind": "nested", "model": "Node"}]}
    ]}"#;
    let catalog = ModelCatalog::from_json(cyclic).unwrap();
    let config = ArchConfig::default();
    assert!(ArchFactory::new(&catalog, &config).build_all().unwrap_err().is_model_error());

    let duplicate = r#"{"models": [{"name": "A", "fields": []}, {"name": "A", "fields": []}]}"#;
    assert!(ModelCatalog::from_json(duplicate).is_err());
}

#[test]
fn test_join_along_foreign_reference() -> sql_arch::Result<()> {
    let catalog = ModelCatalog::from_json(CATALOG)?;
    let config = ArchConfig::for_engine(Engine::MySQL);
    let factory = ArchFactory::new(&catalog, &config);
    let session = factory.build_table_arch("Session")?;
    let user = factory.build_table_arch("User")?;

    let reference = session
        .column("user_id")
        .ok_or_else(|| ArchError::InvalidModel("missing user_id".to_string()))?;
    let foreign = reference
        .foreign()
        .ok_or_else(|| ArchError::InvalidModel("user_id is not a foreign key".to_string()))?;
    let target = user
        .column(&foreign.column)
        .ok_or_else(|| ArchError::InvalidModel("missing referenced column".to_string()))?;

    let name = Column::new("name", TermType::String).full(user.sql_name());
    let query = SelectJoin::from(&session)
        .select([Column::new("user_agent", TermType::String).full(session.sql_name()), name.clone()])
        .inner_join_on(
            reference.to_column().full(session.sql_name()),
            target.to_column().full(&foreign.table),
        )
        .where_clause(Where::of(like(name, var("A%")?)?)?)
        .limit(5)
        .build()?;
    assert_eq!(
        query.repr(),
        "SELECT session.user_agent, user.name\nFROM session\n\
         INNER JOIN user ON session.user_id = user.user_id\nWHERE user.name LIKE ?\nLIMIT ?"
    );
    assert_eq!(query.args().clone().into_vec(), vec![json!("A%"), json!(5)]);
    Ok(())
}
