#![cfg(feature = "sqlite")]

mod common;

use common::unique_db_path;
use serde_json::json;
use sql_bridge::prelude::*;

#[test]
fn test02_insert_then_read_back() -> Result<(), Box<dyn std::error::Error>> {
    let path = unique_db_path("scenario");
    let mut db = SqliteDatabase::with_path(&path);
    assert!(db.good());
    assert!(db.is_open());
    assert_eq!(db.name(), path);
    assert_eq!(db.state(), ConnectionState::Open);

    assert!(db.exec("CREATE TABLE t (id INTEGER, v TEXT)")?.succeeded());
    let outcome = db.exec_params("INSERT INTO t VALUES (?, ?)", &args![1, "hello"])?;
    assert_eq!(outcome, ExecOutcome::Done { rows_affected: 1 });

    let rows = db.query("SELECT * FROM t")?.into_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(serde_json::to_value(&rows[0])?, json!({"id": "1", "v": "hello"}));
    assert_eq!(db.get_last_insertion(), 1);
    Ok(())
}

#[test]
fn test02_empty_tracks_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let path = unique_db_path("empty");
    let mut db = SqliteDatabase::with_path(&path);
    assert!(db.empty());

    db.exec("CREATE TABLE t (id INTEGER)")?;
    assert!(!db.empty());

    db.close();
    // file-level check, still answers after close
    assert!(!db.empty());
    Ok(())
}

#[test]
fn test02_typed_arguments_come_back_as_text() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = SqliteDatabase::with_path(unique_db_path("typed"));
    db.exec("CREATE TABLE m (a INTEGER, b INTEGER, c REAL, d TEXT)")?;
    db.exec_params(
        "INSERT INTO m VALUES ($1, $2, $3, $4)",
        &args![-7, 5_000_000_000_i64, 1.5_f64, "héllo ✓"],
    )?;
    db.exec("INSERT INTO m VALUES (NULL, NULL, 2.0, NULL)")?;

    let rows = db.query("SELECT a, b, c, d FROM m ORDER BY c")?.into_rows();
    let first: Vec<_> = rows[0].iter().map(|(_, v)| v).collect();
    assert_eq!(first, ["-7", "5000000000", "1.5", "héllo ✓"]);
    let second: Vec<_> = rows[1].iter().map(|(_, v)| v).collect();
    assert_eq!(second, ["", "", "2.0", ""]);
    Ok(())
}

#[test]
fn test02_dollar_markers_bind_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = SqliteDatabase::with_path(unique_db_path("markers"));
    db.exec("CREATE TABLE t (id INTEGER, v TEXT)")?;
    db.exec_params("INSERT INTO t VALUES (?1, ?2)", &args![1, "one"])?;
    db.exec_params("INSERT INTO t VALUES ($1, $2)", &args![2, "two"])?;

    let outcome = db.query_params("SELECT v FROM t WHERE id = $1", &args![2])?;
    let rows = outcome.rows().ok_or("expected rows")?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("v"), Some("two"));
    Ok(())
}

#[test]
fn test02_close_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = SqliteDatabase::with_path(unique_db_path("close"));
    db.exec("CREATE TABLE t (id INTEGER)")?;

    db.close();
    db.close();
    assert!(!db.good());
    assert_eq!(db.state(), ConnectionState::Closed);
    assert_eq!(db.exec("INSERT INTO t VALUES (1)")?, ExecOutcome::NotReady);
    assert_eq!(db.query("SELECT * FROM t")?, QueryOutcome::NotReady);
    assert_eq!(db.get_last_insertion(), -1);
    assert!(!db.validate("SELECT 1"));
    Ok(())
}

#[test]
fn test02_reopen_after_close_is_ignored() {
    let path = unique_db_path("reopen");
    let mut db = SqliteDatabase::with_path(&path);
    db.close();
    db.open(&SqliteOptions::new(&path));
    assert!(!db.good());
}

#[test]
fn test02_duplicate_columns_keep_every_value() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = SqliteDatabase::with_path(unique_db_path("dupes"));
    let rows = db.query("SELECT 1 AS a, 2 AS a")?.into_rows();
    assert_eq!(rows[0].len(), 2);
    assert_eq!(rows[0].get_by_index(0), Some("1"));
    assert_eq!(rows[0].get("a"), Some("2"));
    Ok(())
}

#[test]
fn test02_builder_opens_read_only() -> Result<(), Box<dyn std::error::Error>> {
    let path = unique_db_path("ro");
    let mut writer = SqliteDatabase::with_path(&path);
    writer.exec("CREATE TABLE t (id INTEGER)")?;
    writer.close();

    let mut reader = SqliteOptionsBuilder::new(&path).read_only(true).build();
    assert!(reader.good());
    assert!(reader.query("SELECT * FROM t")?.rows().is_some());
    assert!(!reader.exec("INSERT INTO t VALUES (1)")?.succeeded());
    Ok(())
}
