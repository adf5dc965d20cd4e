//! Deck handlers: build a package from sentences and stream it back.

use crate::anki::APKG_MIME_TYPE;
use crate::api::AppState;
use crate::builder::{BuiltDeck, DeckBuilder};
use crate::error::{Error, Result};
use crate::types::DeckRequest;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{StatusCode, header},
    response::Response,
};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tempfile::TempDir;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// POST /create-deck - Build an Anki package from sentence pairs
#[utoipa::path(
    post,
    path = "/create-deck",
    tag = "decks",
    request_body(
        content = crate::types::DeckRequest,
        description = "Deck languages and sentence pairs",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Anki package", content_type = "application/vnd.anki.apkg", body = Vec<u8>),
        (status = 400, description = "Invalid payload or no valid sentences", body = crate::error::ApiError),
        (status = 500, description = "Unexpected failure while building the package", body = crate::error::ApiError)
    )
)]
pub async fn create_deck(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let request = DeckRequest::from_slice(&body)?;

    tracing::info!(
        target_language = %request.target_language,
        origin_language = %request.origin_language,
        sentences = request.sentences.len(),
        "creating deck"
    );

    let built = DeckBuilder::new(&state.config.deck, state.fetcher.as_ref())
        .build(&request)
        .await?;

    package_response(built).await
}

/// Stream the package file, keeping its request directory alive until the
/// body is dropped.
async fn package_response(built: BuiltDeck) -> Result<Response> {
    let disposition = content_disposition(&built.download_name());
    let (package_path, workspace) = built.into_parts();

    let file = File::open(&package_path).await?;
    let length = file.metadata().await?.len();

    let body = Body::from_stream(ScopedBody {
        inner: ReaderStream::new(file),
        _workspace: workspace,
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, APKG_MIME_TYPE)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, length)
        .body(body)
        .map_err(|e| Error::Other(format!("failed to build response: {}", e)))
}

/// `attachment` disposition for `filename`.
///
/// The quoted `filename` is an ASCII-only fallback; non-ASCII names are also
/// sent percent-encoded in `filename*`.
pub(crate) fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_ascii_control()) {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(filename)
        )
    }
}

/// File stream that owns the request directory
///
/// The directory is deleted when the stream is dropped: after the last
/// chunk is sent or when the client goes away.
struct ScopedBody {
    inner: ReaderStream<File>,
    _workspace: TempDir,
}

impl Stream for ScopedBody {
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
