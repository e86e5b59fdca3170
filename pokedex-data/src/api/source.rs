use std::io;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::types::{BaseUrl, GenerationDetail, GenerationIndex, PokemonDetail, SpeciesDetail};
use super::TransportError;

pub const DEFAULT_USER_AGENT: &str = "pokedex-engine/0.1";
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
const GENERATION_INDEX_PATH: &str = "/generation";

/// Read-only access to the PokeAPI endpoints the resolver needs.
///
/// Implementations must keep fetches independent: a failure for one URL must
/// not affect sibling calls issued concurrently.
#[async_trait(?Send)]
pub trait PokeApiSource {
    /// Base URL of the API endpoint.
    fn base_url(&self) -> &BaseUrl;
    /// Fetch the top-level generation listing.
    async fn generation_index(&self) -> Result<GenerationIndex, TransportError>;
    /// Fetch the detail payload for one generation.
    async fn generation(&self, url: &str) -> Result<GenerationDetail, TransportError>;
    /// Fetch the detail payload for one species.
    async fn species(&self, url: &str) -> Result<SpeciesDetail, TransportError>;
    /// Fetch the detail payload for one creature.
    async fn pokemon(&self, url: &str) -> Result<PokemonDetail, TransportError>;
}

/// HTTP implementation of [`PokeApiSource`].
#[derive(Debug)]
pub struct HttpPokeApiSource {
    client: Client,
    base_url: BaseUrl,
    user_agent: String,
}

impl HttpPokeApiSource {
    /// Construct an HTTP-backed source.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("client builder only fails with invalid configuration");
        Self {
            client,
            base_url: sanitise_base_url(base_url),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Override the default user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn generation_index_url(&self) -> String {
        format!("{}{}", self.base_url.as_ref(), GENERATION_INDEX_PATH)
    }

    async fn call<T: DeserializeOwned>(&self, url: &str) -> Result<T, TransportError> {
        self.client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, url))?
            .json::<T>()
            .await
            .map_err(|err| convert_reqwest_error(err, url))
    }
}

#[async_trait(?Send)]
impl PokeApiSource for HttpPokeApiSource {
    fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn generation_index(&self) -> Result<GenerationIndex, TransportError> {
        let url = self.generation_index_url();
        self.call(&url).await
    }

    async fn generation(&self, url: &str) -> Result<GenerationDetail, TransportError> {
        self.call(url).await
    }

    async fn species(&self, url: &str) -> Result<SpeciesDetail, TransportError> {
        self.call(url).await
    }

    async fn pokemon(&self, url: &str) -> Result<PokemonDetail, TransportError> {
        self.call(url).await
    }
}

/// Trim trailing slashes and fall back to the public PokeAPI endpoint.
fn sanitise_base_url(url: impl Into<String>) -> BaseUrl {
    let raw = url.into();
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        BaseUrl::from(DEFAULT_BASE_URL)
    } else {
        BaseUrl::new(trimmed.to_owned())
    }
}

fn convert_reqwest_error(error: reqwest::Error, url: &str) -> TransportError {
    if let Some(status) = error.status() {
        return TransportError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else if error.is_decode() {
        io::ErrorKind::InvalidData
    } else {
        io::ErrorKind::Other
    };
    TransportError::Network {
        url: url.to_owned(),
        source: io::Error::new(kind, error),
    }
}
