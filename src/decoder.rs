use std::sync::Arc;

use crate::error::{DecodeError, DecodeOutcome};

/// A format-specific recipe parser.
///
/// `decode` is the only method an implementation has to provide. The text
/// adapters are built on it, and the fetch paths in [`crate::fetch`] accept
/// any implementer together with a [`Transport`](crate::transport::Transport).
pub trait BeerRecipeDecoder {
    /// Parse one complete document into its recipes, in document order.
    fn decode(&self, data: &[u8]) -> DecodeOutcome;

    /// Parse a document held as text. The text is handed over as its UTF-8 bytes.
    fn decode_str(&self, text: &str) -> DecodeOutcome {
        self.decode(text.as_bytes())
    }

    /// Parse a document held as UTF-16 code units.
    ///
    /// Unpaired surrogates have no UTF-8 form and fail with
    /// [`DecodeError::Encoding`] before the parser is invoked.
    fn decode_utf16(&self, units: &[u16]) -> DecodeOutcome {
        let text = String::from_utf16(units).map_err(DecodeError::Encoding)?;
        self.decode_str(&text)
    }
}

impl<D> BeerRecipeDecoder for &D
where
    D: BeerRecipeDecoder + ?Sized,
{
    fn decode(&self, data: &[u8]) -> DecodeOutcome {
        (**self).decode(data)
    }
}

impl<D> BeerRecipeDecoder for Box<D>
where
    D: BeerRecipeDecoder + ?Sized,
{
    fn decode(&self, data: &[u8]) -> DecodeOutcome {
        (**self).decode(data)
    }
}

impl<D> BeerRecipeDecoder for Arc<D>
where
    D: BeerRecipeDecoder + ?Sized,
{
    fn decode(&self, data: &[u8]) -> DecodeOutcome {
        (**self).decode(data)
    }
}
