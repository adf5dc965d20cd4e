//! Deck authoring: note types, notes, decks and `.apkg` packages
//!
//! A package is a zip archive holding a SQLite collection
//! (`collection.anki2`, schema version 11), a `media` JSON map, and one
//! numbered entry per media file.
//!
//! ## Submodules
//!
//! - [`model`] — note type: fields, card templates, stylesheet
//! - [`note`] — notes, stable guids, field checksums
//! - [`deck`] — decks and deck ids
//! - [`schema`] — collection tables and default settings
//! - [`package`] — archive writer

pub mod deck;
pub mod model;
pub mod note;
pub mod package;
pub mod schema;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use deck::{Deck, random_deck_id};
pub use model::{Model, Template};
pub use note::{Note, derive_note_id, sound_tag};
pub use package::{APKG_MIME_TYPE, Package};
