//! URL-safe base64 for token segments.
//!
//! Encoding uses the `-`/`_` alphabet without padding. Decoding accepts
//! segments with or without trailing `=` so tokens minted by older producers
//! that kept padding still decode.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::DecodeError;

const SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes raw bytes (or UTF-8 text) as an unpadded base64url segment.
#[must_use]
pub fn encode(data: impl AsRef<[u8]>) -> String {
    SEGMENT.encode(data)
}

/// Decodes a base64url segment into bytes.
///
/// # Errors
///
/// Returns [`DecodeError::Base64`] for characters outside the URL-safe
/// alphabet or an impossible segment length.
pub fn decode_bytes(segment: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(SEGMENT.decode(segment)?)
}

/// Decodes a base64url segment into UTF-8 text.
///
/// # Errors
///
/// Returns [`DecodeError`] if the segment is not base64url or the decoded
/// bytes are not UTF-8.
pub fn decode(segment: &str) -> Result<String, DecodeError> {
    Ok(String::from_utf8(decode_bytes(segment)?)?)
}
