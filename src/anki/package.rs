//! Package writer: collection database plus media, zipped into one `.apkg`

use super::deck::{DEFAULT_DECK_ID, Deck, deck_json};
use super::model::Model;
use super::schema::{self, CREATE_STATEMENTS, SCHEMA_VERSION};
use crate::error::{PackageError, Result};
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{Connection, SqliteConnection};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::CompressionMethod;
use zip::write::FileOptions;

/// Archive entry holding the SQLite collection
pub const COLLECTION_ENTRY: &str = "collection.anki2";

/// Archive entry mapping numbered media entries to file names
pub const MEDIA_ENTRY: &str = "media";

/// MIME type of a deck package
pub const APKG_MIME_TYPE: &str = "application/vnd.anki.apkg";

/// A deck, its note type and the media its notes reference
pub struct Package<'a> {
    deck: &'a Deck,
    model: &'a Model,
    media: &'a [PathBuf],
}

impl<'a> Package<'a> {
    /// Bundle a deck with its note type and media files
    pub fn new(deck: &'a Deck, model: &'a Model, media: &'a [PathBuf]) -> Self {
        Self { deck, model, media }
    }

    /// Write the package archive to `output`.
    ///
    /// The collection database is staged next to `output` and removed
    /// afterwards. Media entries are numbered in the order of `media`.
    pub async fn write_to_file(&self, output: &Path) -> Result<()> {
        let staging_dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let collection = tempfile::Builder::new()
            .prefix("collection")
            .suffix(".anki2")
            .tempfile_in(staging_dir)?;

        self.write_collection(collection.path()).await?;

        let output_path = output.to_path_buf();
        let collection_path = collection.path().to_path_buf();
        let media = self.media.to_vec();

        // Zip writing is synchronous file I/O
        tokio::task::spawn_blocking(move || write_archive(&output_path, &collection_path, &media))
            .await
            .map_err(|e| PackageError::WriterTask(e.to_string()))??;

        debug!(
            deck = %self.deck.name,
            notes = self.deck.notes().len(),
            media = self.media.len(),
            path = ?output,
            "package written"
        );
        Ok(())
    }

    async fn write_collection(&self, path: &Path) -> Result<()> {
        for note in self.deck.notes() {
            if note.fields().len() != self.model.fields.len() {
                return Err(PackageError::FieldCount {
                    guid: note.guid().to_string(),
                    expected: self.model.fields.len(),
                    actual: note.fields().len(),
                }
                .into());
            }
        }

        // Rollback journal keeps the database in a single file
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);
        let mut conn = SqliteConnection::connect_with(&options).await?;

        for statement in CREATE_STATEMENTS {
            sqlx::query(statement).execute(&mut conn).await?;
        }

        let now = Utc::now();
        let secs = now.timestamp();
        let millis = now.timestamp_millis();

        let mut models = Map::new();
        models.insert(
            self.model.id.to_string(),
            self.model.to_json(self.deck.id, secs),
        );

        let mut decks = Map::new();
        decks.insert(
            DEFAULT_DECK_ID.to_string(),
            deck_json(DEFAULT_DECK_ID, "Default", secs),
        );
        decks.insert(self.deck.id.to_string(), self.deck.to_json(secs));

        let mut tx = conn.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO col (id, crt, mod, scm, ver, dty, usn, ls, conf, models, decks, dconf, tags)
            VALUES (1, ?, ?, ?, ?, 0, 0, 0, ?, ?, ?, ?, '{}')
            "#,
        )
        .bind(secs)
        .bind(millis)
        .bind(millis)
        .bind(SCHEMA_VERSION)
        .bind(schema::collection_conf(self.deck.id, self.model.id).to_string())
        .bind(Value::Object(models).to_string())
        .bind(Value::Object(decks).to_string())
        .bind(schema::deck_options().to_string())
        .execute(&mut *tx)
        .await?;

        let mut card_id = millis;
        for (position, note) in self.deck.notes().iter().enumerate() {
            let note_id = millis + position as i64;

            sqlx::query(
                r#"
                INSERT INTO notes (id, guid, mid, mod, usn, tags, flds, sfld, csum, flags, data)
                VALUES (?, ?, ?, ?, -1, '', ?, ?, ?, 0, '')
                "#,
            )
            .bind(note_id)
            .bind(note.guid())
            .bind(self.model.id)
            .bind(secs)
            .bind(note.joined_fields())
            .bind(note.sort_field())
            .bind(note.checksum())
            .execute(&mut *tx)
            .await?;

            for ord in self.model.card_ordinals(note.fields()) {
                sqlx::query(
                    r#"
                    INSERT INTO cards (id, nid, did, ord, mod, usn, type, queue, due,
                                       ivl, factor, reps, lapses, left, odue, odid, flags, data)
                    VALUES (?, ?, ?, ?, ?, -1, 0, 0, ?, 0, 0, 0, 0, 0, 0, 0, 0, '')
                    "#,
                )
                .bind(card_id)
                .bind(note_id)
                .bind(self.deck.id)
                .bind(ord as i64)
                .bind(secs)
                .bind(position as i64)
                .execute(&mut *tx)
                .await?;
                card_id += 1;
            }
        }

        tx.commit().await?;
        conn.close().await?;
        Ok(())
    }
}

fn write_archive(output: &Path, collection: &Path, media: &[PathBuf]) -> Result<()> {
    let file = File::create(output)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(COLLECTION_ENTRY, options)?;
    std::io::copy(&mut File::open(collection)?, &mut zip)?;

    let mut media_map = Map::new();
    for (index, path) in media.iter().enumerate() {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PackageError::MediaName(path.clone()))?;
        media_map.insert(index.to_string(), Value::String(name.to_string()));

        zip.start_file(index.to_string(), options)?;
        std::io::copy(&mut File::open(path)?, &mut zip)?;
    }

    zip.start_file(MEDIA_ENTRY, options)?;
    zip.write_all(Value::Object(media_map).to_string().as_bytes())?;
    zip.finish()?;
    Ok(())
}
