//! Rendered-plot payloads

use crate::error::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use quotebot_utils::attachment_id;
use serde::{Deserialize, Serialize};

/// A rendered chart ready for delivery: a generated filename plus the
/// base64-encoded PNG bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotsResponse {
    pub filename: String,
    pub image64: String,
}

impl PlotsResponse {
    /// Wrap already-encoded PNG data under a fresh random filename
    pub fn from_base64(image64: String) -> Result<Self> {
        let mut filename = attachment_id();
        filename.truncate(10);
        filename.push_str(".png");
        Ok(Self { filename, image64 })
    }

    /// Encode raw PNG bytes
    pub fn from_png(bytes: &[u8]) -> Result<Self> {
        Self::from_base64(BASE64.encode(bytes))
    }

    /// Decode the payload back to PNG bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(BASE64.decode(self.image64.as_bytes())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_shape() {
        let response = PlotsResponse::from_png(b"not-a-real-png").expect("encode");
        assert!(response.filename.ends_with(".png"));
        assert_eq!(response.filename.len(), 14);
    }

    #[test]
    fn test_roundtrip() {
        let bytes = b"\x89PNG\r\n\x1a\n fake".to_vec();
        let response = PlotsResponse::from_png(&bytes).expect("encode");
        assert_eq!(response.decode().expect("decode"), bytes);
    }
}
