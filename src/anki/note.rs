//! Notes, stable note ids and field checksums

use regex::Regex;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

/// Alphabet of Anki's base91 guid encoding
const BASE91_TABLE: &[u8; 91] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!#$%&()*+,-./:;<=>?@[]^_`{|}~";

/// Separator between field values in the `flds` column
pub const FIELD_SEPARATOR: char = '\x1f';

/// One flashcard's field values plus its stable identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    guid: String,
    fields: Vec<String>,
}

impl Note {
    /// Create a note with an explicit guid
    pub fn new(guid: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            guid: guid.into(),
            fields,
        }
    }

    /// Globally unique id used by review software to reconcile re-imports
    pub fn guid(&self) -> &str {
        &self.guid
    }

    /// Field values in model order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Value of the sort field (the first field)
    pub fn sort_field(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }

    /// Fields joined for the `flds` column
    pub fn joined_fields(&self) -> String {
        self.fields.join(&FIELD_SEPARATOR.to_string())
    }

    /// Checksum of the sort field for the `csum` column
    pub fn checksum(&self) -> i64 {
        field_checksum(self.sort_field())
    }
}

/// Derive a stable note id from the two sentence fields.
///
/// The id depends only on the text: the same pair always yields the same id,
/// whatever its position in the request or whether audio was attached.
pub fn derive_note_id(target: &str, origin: &str) -> String {
    guid_for(&[target, origin])
}

/// Anki-compatible guid for an ordered list of values.
///
/// SHA-256 of the values joined with `__`, first eight bytes read big-endian,
/// rendered in base91.
pub fn guid_for(values: &[&str]) -> String {
    let digest = Sha256::digest(values.join("__").as_bytes());

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let mut n = u64::from_be_bytes(head);

    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE91_TABLE[(n % 91) as usize] as char);
        n /= 91;
    }

    digits.iter().rev().collect()
}

/// First 32 bits of the SHA-1 of the field with HTML removed
pub fn field_checksum(field: &str) -> i64 {
    let digest = Sha1::digest(strip_html(field).as_bytes());
    i64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

#[allow(clippy::expect_used)]
fn literal_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("literal pattern compiles")
}

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| literal_regex(r"(?s)<!--.*?-->"));
static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| literal_regex(r"(?is)<(style|script).*?>.*?</(style|script)>"));
static IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| literal_regex(r#"(?i)<img[^>]+src=["']?([^"'>]+)["']?[^>]*>"#));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| literal_regex(r"(?s)<.*?>"));

/// Remove markup from a field, keeping image file names.
pub fn strip_html(field: &str) -> String {
    let text = IMG_RE.replace_all(field, " $1 ");
    let text = COMMENT_RE.replace_all(&text, "");
    let text = BLOCK_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "");

    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Media tag referencing a packaged audio file
pub fn sound_tag(filename: &str) -> String {
    format!("[sound:{}]", filename)
}
