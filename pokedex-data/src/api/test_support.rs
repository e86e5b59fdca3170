//! Shared fixtures for API resolver tests.

use std::collections::HashMap;
use std::io;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::TransportError;
use super::source::PokeApiSource;
use super::types::{BaseUrl, GenerationDetail, GenerationIndex, PokemonDetail, SpeciesDetail};

/// Stub [`PokeApiSource`] backed by canned JSON payloads keyed by URL.
///
/// URLs without a registered payload answer with an HTTP 404, which lets
/// tests exercise per-item failure isolation without a network.
#[derive(Debug, Clone)]
pub struct StubSource {
    base_url: BaseUrl,
    responses: HashMap<String, serde_json::Value>,
}

impl StubSource {
    /// Construct an empty stub rooted at `https://example.org`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: BaseUrl::from("https://example.org"),
            responses: HashMap::new(),
        }
    }

    /// Register a canned payload for `url`.
    #[must_use]
    pub fn with_response(mut self, url: impl Into<String>, body: serde_json::Value) -> Self {
        self.responses.insert(url.into(), body);
        self
    }

    /// URL the stub serves the generation index from.
    #[must_use]
    pub fn index_url(&self) -> String {
        format!("{}/generation", self.base_url.as_ref())
    }

    fn payload<T: DeserializeOwned>(&self, url: &str) -> Result<T, TransportError> {
        let value = self
            .responses
            .get(url)
            .ok_or_else(|| TransportError::Http {
                url: url.to_owned(),
                status: 404,
                message: "no stubbed response".to_owned(),
            })?;
        serde_json::from_value(value.clone()).map_err(|err| TransportError::Network {
            url: url.to_owned(),
            source: io::Error::new(io::ErrorKind::InvalidData, err),
        })
    }
}

#[async_trait(?Send)]
impl PokeApiSource for StubSource {
    fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn generation_index(&self) -> Result<GenerationIndex, TransportError> {
        self.payload(&self.index_url())
    }

    async fn generation(&self, url: &str) -> Result<GenerationDetail, TransportError> {
        self.payload(url)
    }

    async fn species(&self, url: &str) -> Result<SpeciesDetail, TransportError> {
        self.payload(url)
    }

    async fn pokemon(&self, url: &str) -> Result<PokemonDetail, TransportError> {
        self.payload(url)
    }
}

/// Drive an async test body on a current-thread runtime.
pub fn block_on_for_tests<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build test runtime")
        .block_on(future)
}
