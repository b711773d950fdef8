//! Base64 chunk codec for managed-field raw masks
//!
//! The transport model stores a managed-fields mask as a list of base64
//! chunks. Decoding concatenates every chunk into one buffer; encoding always
//! produces a single chunk.

use crate::error::{ConvertError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Decode and concatenate base64 chunks
pub fn decode_chunks(field: &str, chunks: &[String]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for chunk in chunks {
        let bytes = STANDARD
            .decode(chunk.as_bytes())
            .map_err(|source| ConvertError::Base64 {
                field: field.to_string(),
                source,
            })?;
        out.extend_from_slice(&bytes);
    }
    Ok(out)
}

/// Encode bytes as a single-chunk list
pub fn encode_chunks(bytes: &[u8]) -> Vec<String> {
    vec![STANDARD.encode(bytes)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_concatenates_chunks() {
        let chunks = vec![STANDARD.encode(b"{\"f:spec\""), STANDARD.encode(b":{}}")];
        let bytes = decode_chunks("fieldsV1", &chunks).unwrap();
        assert_eq!(bytes, b"{\"f:spec\":{}}");
    }

    #[test]
    fn test_encode_emits_one_chunk() {
        let chunks = encode_chunks(b"{\"f:spec\":{}}");
        assert_eq!(chunks.len(), 1);
        assert_eq!(decode_chunks("fieldsV1", &chunks).unwrap(), b"{\"f:spec\":{}}");
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let err = decode_chunks("fieldsV1", &["not base64!".to_string()]).unwrap_err();
        assert!(matches!(err, ConvertError::Base64 { .. }));
    }
}
