//! Decks: named, ordered collections of notes

use super::note::Note;
use rand::Rng;
use serde_json::{Value, json};
use std::ops::Range;

/// Range deck ids are drawn from
pub const DECK_ID_RANGE: Range<i64> = (1 << 30)..(1 << 31);

/// Id of the built-in "Default" deck present in every collection
pub const DEFAULT_DECK_ID: i64 = 1;

/// Draw a fresh deck id.
///
/// Unseeded: two builds of the same request get different deck ids.
pub fn random_deck_id() -> i64 {
    rand::thread_rng().gen_range(DECK_ID_RANGE)
}

/// A deck under construction
#[derive(Clone, Debug)]
pub struct Deck {
    /// Deck id
    pub id: i64,
    /// Deck name shown in the review software
    pub name: String,
    notes: Vec<Note>,
}

impl Deck {
    /// Create an empty deck
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            notes: Vec::new(),
        }
    }

    /// Append a note
    pub fn add_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Notes in insertion order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Whether no note has been added
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Entry for the `decks` column of the collection row
    pub fn to_json(&self, modified: i64) -> Value {
        deck_json(self.id, &self.name, modified)
    }
}

pub(crate) fn deck_json(id: i64, name: &str, modified: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "desc": "",
        "mod": modified,
        "usn": -1,
        "collapsed": false,
        "conf": 1,
        "dyn": 0,
        "extendNew": 0,
        "extendRev": 50,
        "lrnToday": [0, 0],
        "newToday": [0, 0],
        "revToday": [0, 0],
        "timeToday": [0, 0],
    })
}
