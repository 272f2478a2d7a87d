//! Opaque cursor tokens.
//!
//! A cursor wraps the ordering key of the last item on a page. Tokens are the
//! key serialised as JSON and encoded with unpadded URL-safe base64, so they
//! can be placed in query strings without further escaping.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors raised while encoding or decoding cursor tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The cursor key could not be serialised.
    #[error("failed to encode cursor: {message}")]
    Encode {
        /// Serialiser failure description.
        message: String,
    },
    /// The token is not valid URL-safe base64.
    #[error("cursor is not valid base64: {message}")]
    InvalidEncoding {
        /// Decoder failure description.
        message: String,
    },
    /// The decoded token does not describe a valid key.
    #[error("cursor payload is invalid: {message}")]
    InvalidPayload {
        /// Deserialiser failure description.
        message: String,
    },
}

/// Position marker naming the key of the last item returned to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap an ordering key.
    #[must_use]
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the ordering key.
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Consume the cursor and return the ordering key.
    #[must_use]
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Encode the cursor as an opaque token.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Encode`] when the key cannot be serialised.
    pub fn encode(&self) -> Result<String, CursorError> {
        let bytes = serde_json::to_vec(&self.key).map_err(|err| CursorError::Encode {
            message: err.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Decode a token previously produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::InvalidEncoding`] for malformed base64 and
    /// [`CursorError::InvalidPayload`] when the bytes do not decode to `K`.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes =
            URL_SAFE_NO_PAD
                .decode(token.trim())
                .map_err(|err| CursorError::InvalidEncoding {
                    message: err.to_string(),
                })?;
        let key = serde_json::from_slice(&bytes).map_err(|err| CursorError::InvalidPayload {
            message: err.to_string(),
        })?;
        Ok(Self { key })
    }
}
