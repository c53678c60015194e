#![allow(dead_code)]

use std::path::Path;

use decant::catalog::DIRECTORY_MIMETYPE;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

pub const DIRECTORY_MIME_ID: i64 = 1;
pub const FILE_MIME_ID: i64 = 2;

/// Create a catalog with the schema the migration consumes and the two
/// mimetype rows every fixture needs.
pub async fn create_catalog(path: &Path) -> SqlitePool {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(opts)
        .await
        .expect("open catalog");

    for stmt in [
        "CREATE TABLE storages (numeric_id INTEGER PRIMARY KEY AUTOINCREMENT, id TEXT NOT NULL)",
        "CREATE TABLE mimetypes (id INTEGER PRIMARY KEY, mimetype TEXT NOT NULL)",
        "CREATE TABLE filecache (fileid INTEGER PRIMARY KEY, storage INTEGER NOT NULL, \
         path TEXT NOT NULL, mimetype INTEGER NOT NULL, storage_mtime INTEGER NOT NULL)",
    ] {
        sqlx::query(stmt).execute(&pool).await.expect("schema");
    }
    for (id, mimetype) in [(DIRECTORY_MIME_ID, DIRECTORY_MIMETYPE), (FILE_MIME_ID, "image/jpeg")] {
        sqlx::query("INSERT INTO mimetypes (id, mimetype) VALUES (?1, ?2)")
            .bind(id)
            .bind(mimetype)
            .execute(&pool)
            .await
            .expect("mimetype row");
    }
    pool
}

pub async fn seed_storage(pool: &SqlitePool, id: &str) -> i64 {
    sqlx::query("INSERT INTO storages (id) VALUES (?1)")
        .bind(id)
        .execute(pool)
        .await
        .expect("seed storage")
        .last_insert_rowid()
}

pub async fn seed_directory(pool: &SqlitePool, storage: i64, fileid: i64, path: &str, mtime: i64) {
    seed_row(pool, storage, fileid, path, DIRECTORY_MIME_ID, mtime).await;
}

pub async fn seed_file(pool: &SqlitePool, storage: i64, fileid: i64, path: &str, mtime: i64) {
    seed_row(pool, storage, fileid, path, FILE_MIME_ID, mtime).await;
}

async fn seed_row(
    pool: &SqlitePool,
    storage: i64,
    fileid: i64,
    path: &str,
    mimetype: i64,
    mtime: i64,
) {
    sqlx::query(
        "INSERT INTO filecache (fileid, storage, path, mimetype, storage_mtime) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(fileid)
    .bind(storage)
    .bind(path)
    .bind(mimetype)
    .bind(mtime)
    .execute(pool)
    .await
    .expect("seed filecache row");
}

/// Drop an object into a directory-backed bucket under its URN key.
pub fn seed_object(bucket: &Path, object_id: i64, bytes: &[u8]) {
    std::fs::write(bucket.join(format!("urn:oid:{object_id}")), bytes).expect("seed object");
}

pub fn mtime_of(path: &Path) -> i64 {
    let metadata = std::fs::metadata(path).expect("metadata");
    filetime::FileTime::from_last_modification_time(&metadata).unix_seconds()
}

/// Current storage ids, ordered, for asserting cutover rewrites.
pub async fn storage_ids(pool: &SqlitePool) -> Vec<String> {
    sqlx::query("SELECT id FROM storages ORDER BY id")
        .fetch_all(pool)
        .await
        .expect("list storages")
        .into_iter()
        .map(|row| row.get::<String, _>("id"))
        .collect()
}
