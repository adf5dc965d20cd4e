//! Test-only reader for package archives

use super::note::FIELD_SEPARATOR;
use super::package::{COLLECTION_ENTRY, MEDIA_ENTRY};
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, Row, SqliteConnection};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// A note row read back from a package
#[derive(Debug)]
pub(crate) struct NoteRow {
    pub guid: String,
    pub mid: i64,
    pub fields: Vec<String>,
}

/// Everything the tests inspect in a written package
#[derive(Debug)]
pub(crate) struct PackageContents {
    pub entries: Vec<String>,
    pub media: HashMap<String, String>,
    pub media_bytes: HashMap<String, Vec<u8>>,
    pub schema_version: i64,
    pub notes: Vec<NoteRow>,
    pub card_decks: Vec<i64>,
    pub deck_names: Vec<String>,
    pub model_names: Vec<String>,
}

/// Open an `.apkg` file and read back its media map and collection rows.
pub(crate) async fn read_package(path: &Path) -> PackageContents {
    let bytes = std::fs::read(path).unwrap();
    read_package_bytes(&bytes).await
}

/// Same as [`read_package`] for an archive already in memory.
pub(crate) async fn read_package_bytes(bytes: &[u8]) -> PackageContents {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    let entries: Vec<String> = archive.file_names().map(str::to_string).collect();

    let mut media_json = String::new();
    archive
        .by_name(MEDIA_ENTRY)
        .unwrap()
        .read_to_string(&mut media_json)
        .unwrap();
    let media: HashMap<String, String> = serde_json::from_str(&media_json).unwrap();

    let mut media_bytes = HashMap::new();
    for index in media.keys() {
        let mut data = Vec::new();
        archive.by_name(index).unwrap().read_to_end(&mut data).unwrap();
        media_bytes.insert(index.clone(), data);
    }

    let mut collection = Vec::new();
    archive
        .by_name(COLLECTION_ENTRY)
        .unwrap()
        .read_to_end(&mut collection)
        .unwrap();
    let db_file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(db_file.path(), &collection).unwrap();

    let options = SqliteConnectOptions::new()
        .filename(db_file.path())
        .read_only(true);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();

    let col = sqlx::query("SELECT ver, models, decks FROM col")
        .fetch_one(&mut conn)
        .await
        .unwrap();
    let schema_version: i64 = col.get("ver");
    let models: Value = serde_json::from_str(col.get::<&str, _>("models")).unwrap();
    let decks: Value = serde_json::from_str(col.get::<&str, _>("decks")).unwrap();

    let names = |value: &Value| -> Vec<String> {
        value
            .as_object()
            .unwrap()
            .values()
            .map(|v| v["name"].as_str().unwrap().to_string())
            .collect()
    };
    let model_names = names(&models);
    let deck_names = names(&decks);

    let notes = sqlx::query("SELECT guid, mid, flds FROM notes ORDER BY id")
        .fetch_all(&mut conn)
        .await
        .unwrap()
        .into_iter()
        .map(|row| NoteRow {
            guid: row.get("guid"),
            mid: row.get("mid"),
            fields: row
                .get::<String, _>("flds")
                .split(FIELD_SEPARATOR)
                .map(str::to_string)
                .collect(),
        })
        .collect();

    let card_decks = sqlx::query("SELECT did FROM cards ORDER BY id")
        .fetch_all(&mut conn)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.get::<i64, _>("did"))
        .collect();

    conn.close().await.unwrap();

    PackageContents {
        entries,
        media,
        media_bytes,
        schema_version,
        notes,
        card_decks,
        deck_names,
        model_names,
    }
}
