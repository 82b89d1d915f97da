use sql_arch::prelude::*;

const CATALOG: &str = r#"{
    "models": [
        {
            "name": "Player",
            "fields": [
                {"name": "playerId", "kind": "primitive", "jdbc_type": "Long"},
                {"name": "name", "kind": "boxed", "jdbc_type": "String", "attrs": {"unique": true}},
                {"name": "email", "kind": "optional", "of": {"kind": "boxed", "jdbc_type": "String"}},
                {"name": "score", "kind": "primitive", "jdbc_type": "Int", "attrs": {"defaults": ["0"]}}
            ]
        },
        {
            "name": "Inventory",
            "fields": [
                {"name": "inventoryId", "kind": "primitive", "jdbc_type": "Long"},
                {"name": "owner", "kind": "foreign", "model": "Player"},
                {"name": "itemName", "kind": "boxed", "jdbc_type": "String"},
                {"name": "slot", "kind": "point"},
                {"name": "quantity", "kind": "primitive", "jdbc_type": "Int"}
            ]
        }
    ]
}"#;

/// Prints the DDL of a catalog for a few engines.
///
/// Usage: `cargo run --example show_ddl [catalog.json]`
fn main() -> sql_arch::Result<()> {
    let catalog = match std::env::args().nth(1) {
        Some(path) => ModelCatalog::from_file(path)?,
        None => ModelCatalog::from_json(CATALOG)?,
    };

    for engine in [Engine::SQLite, Engine::MySQL, Engine::PostgreSQL] {
        let config = ArchConfig::for_engine(engine);
        let archs = ArchFactory::new(&catalog, &config).build_all()?;
        let ddl = SqlSchemaMaker::from_config(&config)?.make_ddl(&archs)?;

        println!("-- {}", engine);
        println!("{}", ddl);
        for arch in archs.iter().rev() {
            println!("{};", SqlSchemaMaker::make_drop_table_query(arch));
        }
        println!();
    }
    Ok(())
}
