//! Request-scoped storage for fetched audio

use crate::error::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name used when a URL has no usable final path segment
const FALLBACK_NAME: &str = "audio";

/// Derive a local file name from an audio URL.
///
/// Uses the final non-empty path segment, percent-decoded. Characters that
/// cannot appear in a file name or inside a sound tag are replaced with `_`.
///
/// # Examples
///
/// ```
/// use ai4anki::media::filename_from_url;
///
/// assert_eq!(filename_from_url("https://example.com/audio/hola.mp3"), "hola.mp3");
/// assert_eq!(filename_from_url("https://example.com/a/buenos%20d%C3%ADas.mp3"), "buenos días.mp3");
/// assert_eq!(filename_from_url("https://example.com/"), "audio");
/// ```
pub fn filename_from_url(url: &str) -> String {
    let segment = url::Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .map(str::to_string)
    });

    let Some(segment) = segment else {
        return FALLBACK_NAME.to_string();
    };

    let decoded = urlencoding::decode(&segment)
        .map(|d| d.into_owned())
        .unwrap_or(segment);

    let sanitized: String = decoded
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            // `]` would end a `[sound:...]` tag early
            '[' | ']' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Directory of audio files fetched for one request
///
/// Names are unique within the store: a repeated name gets a ` (n)` suffix
/// before its extension, so a later download never overwrites an earlier one.
#[derive(Debug)]
pub struct MediaStore {
    dir: PathBuf,
    files: Vec<PathBuf>,
    used_names: HashSet<String>,
}

impl MediaStore {
    /// Create the store, creating `dir` if needed
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            files: Vec::new(),
            used_names: HashSet::new(),
        })
    }

    /// Stored files, in the order they were saved
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Save audio fetched from `url` and return the file name it was stored under
    pub async fn save(&mut self, url: &str, bytes: &[u8]) -> Result<String> {
        let name = self.claim_name(filename_from_url(url));
        let path = self.dir.join(&name);

        tokio::fs::write(&path, bytes).await?;
        debug!(url, file = %name, bytes = bytes.len(), "stored audio");

        self.files.push(path);
        Ok(name)
    }

    fn claim_name(&mut self, name: String) -> String {
        if self.used_names.insert(name.clone()) {
            return name;
        }

        let path = Path::new(&name);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(FALLBACK_NAME)
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string);

        let mut counter = 1;
        loop {
            let candidate = match &extension {
                Some(ext) => format!("{} ({}).{}", stem, counter, ext),
                None => format!("{} ({})", stem, counter),
            };
            if self.used_names.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}
