#![cfg(feature = "sqlite")]

use sql_bridge::prelude::*;
use tempfile::tempdir;

// Same routine for any engine; `$1` is translated for engines that want `?`.
fn insert_and_count(db: &mut dyn Database) -> Result<usize, SqlBridgeError> {
    db.exec_with(
        "CREATE TABLE IF NOT EXISTS items (id INTEGER, name TEXT)",
        Validation::Skip,
    )?;
    db.exec_params("INSERT INTO items (id, name) VALUES ($1, 'x')", &args![10])?;
    Ok(db.query("SELECT id FROM items")?.into_rows().len())
}

#[test]
fn test04_any_database_dispatches_to_sqlite() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("any.db");
    let options = ConnectOptions::from(SqliteOptions::new(path.to_string_lossy()));
    assert_eq!(options.database_type(), DatabaseType::Sqlite);

    let mut db = AnyDatabase::connect(options);
    assert!(db.good());
    assert_eq!(db.database_type(), DatabaseType::Sqlite);
    assert_eq!(db.database_type().to_string(), "sqlite");

    assert_eq!(insert_and_count(&mut db)?, 1);
    assert_eq!(insert_and_count(&mut db)?, 2);

    db.close();
    assert!(!db.is_open());
    Ok(())
}

#[test]
fn test04_wrapping_an_open_adapter() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let sqlite = SqliteDatabase::with_path(dir.path().join("wrapped.db").to_string_lossy());
    let mut db = AnyDatabase::from(sqlite);
    let rows = db.query("SELECT 'a' AS letter")?.into_rows();
    assert_eq!(rows[0].get("letter"), Some("a"));
    Ok(())
}
