use log::debug;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::decoder::BeerRecipeDecoder;
use crate::error::{DecodeOutcome, FormatError};

mod beerjson;
mod beerxml;

pub use beerjson::BeerJsonDecoder;
pub use beerxml::BeerXmlDecoder;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Supported recipe document formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Detect the format from the document itself
    #[default]
    Auto,
    BeerXml,
    BeerJson,
}

impl Format {
    /// A decoder for this format
    pub fn decoder(self) -> Box<dyn BeerRecipeDecoder + Send + Sync> {
        match self {
            Format::Auto => Box::new(AutoDecoder),
            Format::BeerXml => Box::new(BeerXmlDecoder),
            Format::BeerJson => Box::new(BeerJsonDecoder),
        }
    }

    /// Guess the format from the first significant byte of a document.
    ///
    /// Returns `None` for blank documents.
    pub fn sniff(data: &[u8]) -> Option<Result<Format, FormatError>> {
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        let first = data.iter().find(|b| !b.is_ascii_whitespace())?;
        Some(match *first {
            b'<' => Ok(Format::BeerXml),
            b'{' | b'[' => Ok(Format::BeerJson),
            _ => Err(FormatError::UnknownFormat),
        })
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Format::Auto),
            "beerxml" | "xml" => Ok(Format::BeerXml),
            "beerjson" | "json" => Ok(Format::BeerJson),
            other => Err(format!(
                "unknown format '{}', expected auto, beerxml or beerjson",
                other
            )),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Auto => write!(f, "auto"),
            Format::BeerXml => write!(f, "beerxml"),
            Format::BeerJson => write!(f, "beerjson"),
        }
    }
}

/// Picks BeerXML or BeerJSON per document.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecoder;

impl BeerRecipeDecoder for AutoDecoder {
    fn decode(&self, data: &[u8]) -> DecodeOutcome {
        match Format::sniff(data) {
            None => Ok(Vec::new()),
            Some(Ok(Format::BeerJson)) => {
                debug!("Detected BeerJSON document");
                BeerJsonDecoder.decode(data)
            }
            Some(Ok(_)) => {
                debug!("Detected BeerXML document");
                BeerXmlDecoder.decode(data)
            }
            Some(Err(e)) => Err(e.into()),
        }
    }
}
