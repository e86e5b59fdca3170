//! PokeAPI client and the generation-to-creature resolution pipeline.
#![forbid(unsafe_code)]

mod error;
mod resolver;
mod source;
mod types;

#[cfg(any(test, doc))]
mod test_support;
#[cfg(any(test, doc))]
pub use test_support::{StubSource, block_on_for_tests};

pub use error::TransportError;
pub use resolver::resolve_pokemon;
pub use source::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpPokeApiSource, PokeApiSource};
pub use types::{
    BaseUrl, GenerationDetail, GenerationIndex, NamedResource, PokemonDetail, SpeciesDetail,
    StatSlot, TypeSlot, Variety,
};

#[cfg(test)]
mod tests;
