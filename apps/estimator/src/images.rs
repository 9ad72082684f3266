//! Inline image encoding for multimodal requests.

use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Every image is sent tagged as JPEG, whatever its actual format.
pub const IMAGE_MEDIA_TYPE: &str = "image/jpeg";

/// Encodes raw image bytes as a `data:` URL suitable for an `input_image` part.
pub fn encode_image(bytes: &[u8]) -> String {
    format!("data:{IMAGE_MEDIA_TYPE};base64,{}", STANDARD.encode(bytes))
}

pub fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read image '{}'", path.display()))
}

/// Decodes an image supplied over HTTP: either bare base64 or a `data:<mime>;base64,` URL.
pub fn decode_base64_image(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let text = text.trim();
    let payload = match text.strip_prefix("data:") {
        Some(rest) => rest.split_once(";base64,").map(|(_, p)| p).unwrap_or(rest),
        None => text,
    };
    STANDARD.decode(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_image_uses_jpeg_data_url() {
        assert_eq!(encode_image(b"abc"), "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn test_encode_empty_image() {
        assert_eq!(encode_image(&[]), "data:image/jpeg;base64,");
    }

    #[test]
    fn test_decode_bare_base64() {
        assert_eq!(decode_base64_image("YWJj").unwrap(), b"abc");
    }

    #[test]
    fn test_decode_data_url() {
        assert_eq!(
            decode_base64_image("data:image/png;base64,YWJj").unwrap(),
            b"abc"
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_base64_image("not base64!").is_err());
    }

    #[test]
    fn test_read_image_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_image(&dir.path().join("hedge.jpg")).unwrap_err();
        assert!(err.to_string().contains("hedge.jpg"));
    }
}
