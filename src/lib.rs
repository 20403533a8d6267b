//! Decode beer recipe documents into [`BeerRecipe`] records.
//!
//! A format implements [`BeerRecipeDecoder::decode`] for raw bytes and gets
//! the text adapters for free. The [`fetch`] functions combine any decoder
//! with any [`Transport`] to decode documents straight from a URL, either
//! asynchronously or from a blocking caller.
//!
//! ```no_run
//! use beer_recipe_io::{decode_url_blocking, resolve_location, BeerXmlDecoder, HttpTransport};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new(None)?;
//! let url = resolve_location("https://example.com/recipes.xml")?;
//! for recipe in decode_url_blocking(&BeerXmlDecoder, &transport, &url)? {
//!     println!("{}", recipe.summary());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod fetch;
pub mod formats;
pub mod model;
pub mod transport;

pub use config::{load_config, DecoderConfig, HttpConfig};
pub use decoder::BeerRecipeDecoder;
pub use error::{DecodeError, DecodeErrorKind, DecodeOutcome, FormatError, TransportError};
pub use fetch::{decode_url, decode_url_blocking, decode_url_until};
pub use formats::{AutoDecoder, BeerJsonDecoder, BeerXmlDecoder, Format};
pub use model::{BeerRecipe, Fermentable, Hop, MashStep, Misc, Style, Yeast};
pub use transport::{resolve_location, spawn_request, HttpTransport, Transport, Url};

use log::warn;

fn config_or_default() -> DecoderConfig {
    load_config().unwrap_or_else(|e| {
        warn!("Ignoring invalid configuration: {}", e);
        DecoderConfig::default()
    })
}

/// Fetch and decode the document at `location` (URL or file path) using the
/// configured format and HTTP settings.
pub async fn fetch_recipes(location: &str) -> DecodeOutcome {
    let config = config_or_default();
    let url = resolve_location(location)?;
    let transport = HttpTransport::from_config(&config.http)?;

    decode_url(&config.format.decoder(), &transport, &url).await
}

/// Blocking counterpart of [`fetch_recipes`].
pub fn fetch_recipes_blocking(location: &str) -> DecodeOutcome {
    let config = config_or_default();
    let url = resolve_location(location)?;
    let transport = HttpTransport::from_config(&config.http)?;

    decode_url_blocking(&config.format.decoder(), &transport, &url)
}
