//! Deck assembly pipeline: sentences in, package file out

use crate::anki::{Deck, Model, Note, Package, derive_note_id, random_deck_id, sound_tag};
use crate::config::DeckConfig;
use crate::error::{Result, ValidationError};
use crate::media::{MediaFetcher, MediaStore};
use crate::types::DeckRequest;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{error, info, warn};

/// File name of the package inside the request directory
const PACKAGE_FILE_NAME: &str = "deck.apkg";

/// Subdirectory holding fetched audio
const MEDIA_DIR_NAME: &str = "media";

/// A written package and the request directory that holds it
///
/// Dropping this removes the directory, the package and all fetched media.
#[derive(Debug)]
pub struct BuiltDeck {
    /// Deck name, also the download name without extension
    pub deck_name: String,
    /// Number of notes in the deck
    pub note_count: usize,
    /// Number of media files packaged
    pub media_count: usize,
    package_path: PathBuf,
    workspace: TempDir,
}

impl BuiltDeck {
    /// Path of the `.apkg` file
    pub fn package_path(&self) -> &Path {
        &self.package_path
    }

    /// File name offered to the client, e.g. `AI4ANKI-es.apkg`
    pub fn download_name(&self) -> String {
        format!("{}.apkg", self.deck_name)
    }

    /// Split into the package path and the directory guard that keeps it alive
    pub fn into_parts(self) -> (PathBuf, TempDir) {
        (self.package_path, self.workspace)
    }
}

/// Builds one deck package per request
pub struct DeckBuilder<'a> {
    config: &'a DeckConfig,
    fetcher: &'a dyn MediaFetcher,
}

impl<'a> DeckBuilder<'a> {
    /// Create a builder using `fetcher` for audio downloads
    pub fn new(config: &'a DeckConfig, fetcher: &'a dyn MediaFetcher) -> Self {
        Self { config, fetcher }
    }

    /// Assemble and package the deck for a validated request.
    ///
    /// Sentences missing a language field are skipped. Audio failures keep
    /// the note but leave its Sound field empty. Fails with
    /// [`ValidationError::NoValidSentences`] when no note was added.
    pub async fn build(&self, request: &DeckRequest) -> Result<BuiltDeck> {
        let deck_name = self.config.deck_name(&request.target_language);
        let model = Model::sentence_card(self.config.model_id, self.config.model_name.as_str());
        let mut deck = Deck::new(random_deck_id(), deck_name.as_str());

        let workspace = tempfile::Builder::new().prefix("ai4anki-").tempdir()?;
        let mut media = MediaStore::create(workspace.path().join(MEDIA_DIR_NAME)).await?;

        for (index, sentence) in request.sentences.iter().enumerate() {
            let number = index + 1;

            let Some((target, origin)) = sentence.pair() else {
                warn!(sentence = number, "skipping sentence due to missing fields");
                continue;
            };

            let sound = match sentence.audio_url.as_deref() {
                Some(url) => self.fetch_audio(number, url, &mut media).await?,
                None => None,
            };
            let has_audio = sound.is_some();

            deck.add_note(Note::new(
                derive_note_id(target, origin),
                vec![
                    target.to_string(),
                    origin.to_string(),
                    sound.map(|name| sound_tag(&name)).unwrap_or_default(),
                ],
            ));

            if has_audio {
                info!(sentence = number, "added note with audio");
            } else {
                info!(sentence = number, "added note without audio");
            }
        }

        if deck.is_empty() {
            error!(deck = %deck_name, "no valid sentences to add to the deck");
            return Err(ValidationError::NoValidSentences.into());
        }

        let package_path = workspace.path().join(PACKAGE_FILE_NAME);
        Package::new(&deck, &model, media.files())
            .write_to_file(&package_path)
            .await?;

        info!(
            deck = %deck_name,
            notes = deck.notes().len(),
            media = media.files().len(),
            "deck created"
        );

        Ok(BuiltDeck {
            deck_name,
            note_count: deck.notes().len(),
            media_count: media.files().len(),
            package_path,
            workspace,
        })
    }

    /// Fetch and store one audio file; `None` when the fetch failed.
    async fn fetch_audio(
        &self,
        number: usize,
        url: &str,
        media: &mut MediaStore,
    ) -> Result<Option<String>> {
        match self.fetcher.fetch(url).await {
            Ok(bytes) => Ok(Some(media.save(url, &bytes).await?)),
            Err(e) => {
                error!(sentence = number, error = %e, "error fetching audio, adding note without it");
                Ok(None)
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::anki::test_helpers::read_package;
    use crate::error::{Error, MediaError};
    use crate::types::SentenceInput;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bytes per URL and records every call
    #[derive(Default)]
    struct StubFetcher {
        bodies: HashMap<String, Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn with(mut self, url: &str, body: &[u8]) -> Self {
            self.bodies.insert(url.to_string(), body.to_vec());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MediaFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, MediaError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| MediaError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn sentence(target: Option<&str>, origin: Option<&str>, audio: Option<&str>) -> SentenceInput {
        SentenceInput {
            target_language: target.map(str::to_string),
            origin_language: origin.map(str::to_string),
            audio_url: audio.map(str::to_string),
        }
    }

    fn request(sentences: Vec<SentenceInput>) -> DeckRequest {
        DeckRequest {
            target_language: "es".to_string(),
            origin_language: "en".to_string(),
            sentences,
        }
    }

    #[tokio::test]
    async fn builds_deck_with_audio() {
        let config = DeckConfig::default();
        let fetcher = StubFetcher::default().with("https://example.com/hola.mp3", b"hola audio");

        let built = DeckBuilder::new(&config, &fetcher)
            .build(&request(vec![sentence(
                Some("Hola"),
                Some("Hello"),
                Some("https://example.com/hola.mp3"),
            )]))
            .await
            .unwrap();

        assert_eq!(built.deck_name, "AI4ANKI-es");
        assert_eq!(built.download_name(), "AI4ANKI-es.apkg");
        assert_eq!(built.note_count, 1);
        assert_eq!(built.media_count, 1);

        let contents = read_package(built.package_path()).await;
        assert_eq!(contents.notes.len(), 1);
        assert_eq!(contents.notes[0].fields, vec!["Hola", "Hello", "[sound:hola.mp3]"]);
        assert_eq!(contents.media["0"], "hola.mp3");
        assert_eq!(contents.media_bytes["0"], b"hola audio".to_vec());
    }

    #[tokio::test]
    async fn failed_audio_keeps_note_without_sound() {
        let config = DeckConfig::default();
        let fetcher = StubFetcher::default();

        let built = DeckBuilder::new(&config, &fetcher)
            .build(&request(vec![sentence(
                Some("Hola"),
                Some("Hello"),
                Some("https://unreachable.example/hola.mp3"),
            )]))
            .await
            .unwrap();

        assert_eq!(built.note_count, 1);
        assert_eq!(built.media_count, 0);

        let contents = read_package(built.package_path()).await;
        assert_eq!(contents.notes[0].fields, vec!["Hola", "Hello", ""]);
        assert!(contents.media.is_empty());
        assert_eq!(fetcher.calls(), vec!["https://unreachable.example/hola.mp3"]);
    }

    #[tokio::test]
    async fn incomplete_sentences_are_skipped() {
        let config = DeckConfig::default();
        let fetcher = StubFetcher::default();

        let built = DeckBuilder::new(&config, &fetcher)
            .build(&request(vec![
                sentence(Some("Hola"), None, Some("https://example.com/skipped.mp3")),
                sentence(None, Some("Goodbye"), None),
                sentence(Some("Gracias"), Some("Thanks"), None),
            ]))
            .await
            .unwrap();

        assert_eq!(built.note_count, 1);
        let contents = read_package(built.package_path()).await;
        assert_eq!(contents.notes[0].fields[0], "Gracias");
        assert!(fetcher.calls().is_empty(), "skipped sentences must not fetch audio");
    }

    #[tokio::test]
    async fn zero_valid_sentences_is_a_validation_error() {
        let config = DeckConfig::default();
        let fetcher = StubFetcher::default();

        let err = DeckBuilder::new(&config, &fetcher)
            .build(&request(vec![sentence(Some("Hola"), None, None)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Validation(ValidationError::NoValidSentences)
        ));
    }

    #[tokio::test]
    async fn identical_text_yields_identical_guid() {
        let config = DeckConfig::default();
        let fetcher = StubFetcher::default().with("https://example.com/hola.mp3", b"a");

        let built = DeckBuilder::new(&config, &fetcher)
            .build(&request(vec![
                sentence(Some("Adiós"), Some("Bye"), None),
                sentence(Some("Hola"), Some("Hello"), Some("https://example.com/hola.mp3")),
                sentence(Some("Hola"), Some("Hello"), None),
            ]))
            .await
            .unwrap();

        let contents = read_package(built.package_path()).await;
        assert_eq!(contents.notes.len(), 3);
        assert_eq!(contents.notes[1].guid, contents.notes[2].guid);
        assert_eq!(contents.notes[1].guid, derive_note_id("Hola", "Hello"));
        assert_ne!(contents.notes[0].guid, contents.notes[1].guid);
    }

    #[tokio::test]
    async fn repeated_audio_names_do_not_overwrite() {
        let config = DeckConfig::default();
        let fetcher = StubFetcher::default()
            .with("https://a.example/word.mp3", b"first")
            .with("https://b.example/word.mp3", b"second");

        let built = DeckBuilder::new(&config, &fetcher)
            .build(&request(vec![
                sentence(Some("Uno"), Some("One"), Some("https://a.example/word.mp3")),
                sentence(Some("Dos"), Some("Two"), Some("https://b.example/word.mp3")),
            ]))
            .await
            .unwrap();

        let contents = read_package(built.package_path()).await;
        assert_eq!(contents.notes[0].fields[2], "[sound:word.mp3]");
        assert_eq!(contents.notes[1].fields[2], "[sound:word (1).mp3]");
        assert_eq!(contents.media["0"], "word.mp3");
        assert_eq!(contents.media["1"], "word (1).mp3");
        assert_eq!(contents.media_bytes["1"], b"second".to_vec());
    }

    #[tokio::test]
    async fn sound_tag_names_the_packaged_file() {
        let config = DeckConfig::default();
        let url = "https://example.com/clips/hola%5D1.mp3";
        let fetcher = StubFetcher::default().with(url, b"bracketed");

        let built = DeckBuilder::new(&config, &fetcher)
            .build(&request(vec![sentence(Some("Hola"), Some("Hello"), Some(url))]))
            .await
            .unwrap();

        let contents = read_package(built.package_path()).await;
        let field = &contents.notes[0].fields[2];
        let referenced = field
            .strip_prefix("[sound:")
            .and_then(|rest| rest.split(']').next())
            .unwrap();

        assert_eq!(field, "[sound:hola_1.mp3]");
        assert_eq!(referenced, contents.media["0"]);
        assert_eq!(contents.media_bytes["0"], b"bracketed".to_vec());
    }

    #[tokio::test]
    async fn dropping_built_deck_removes_request_directory() {
        let config = DeckConfig::default();
        let fetcher = StubFetcher::default().with("https://example.com/hola.mp3", b"x");

        let built = DeckBuilder::new(&config, &fetcher)
            .build(&request(vec![sentence(
                Some("Hola"),
                Some("Hello"),
                Some("https://example.com/hola.mp3"),
            )]))
            .await
            .unwrap();

        let dir = built.package_path().parent().unwrap().to_path_buf();
        assert!(dir.join(MEDIA_DIR_NAME).join("hola.mp3").exists());

        drop(built);
        assert!(!dir.exists());
    }
}
