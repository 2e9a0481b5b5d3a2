//! Image ingestion: uploaded bytes become base64 data URLs for the model.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// An uploaded image, encoded and ready to attach to a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub file_name: String,
    /// Normalized MIME type (`jpg` maps to `image/jpeg`).
    pub mime_type: String,
    /// `data:image/<ext>;base64,<payload>` — the URL keeps the raw file
    /// extension; only `mime_type` is normalized.
    pub data_url: String,
}

/// Encode one upload. The extension is the final `.`-separated segment of the
/// filename, lowercased.
pub fn encode_upload(file_name: &str, data: &[u8]) -> EncodedImage {
    let extension = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let mime_type = if extension == "jpg" {
        "image/jpeg".to_string()
    } else {
        format!("image/{}", extension)
    };

    let encoded = STANDARD.encode(data);
    let data_url = format!("data:image/{};base64,{}", extension, encoded);

    EncodedImage {
        file_name: file_name.to_string(),
        mime_type,
        data_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpg_normalizes_mime_but_keeps_raw_extension_in_url() {
        let image = encode_upload("photo.jpg", b"abc");
        assert_eq!(image.mime_type, "image/jpeg");
        assert!(image.data_url.starts_with("data:image/jpg;base64,"));
    }

    #[test]
    fn png_passes_extension_through() {
        let image = encode_upload("screen.png", b"abc");
        assert_eq!(image.mime_type, "image/png");
        assert!(image.data_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn extension_is_lowercased() {
        let image = encode_upload("SCREEN.PNG", b"abc");
        assert_eq!(image.mime_type, "image/png");
        assert!(image.data_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn payload_is_standard_base64() {
        let image = encode_upload("a.png", b"hello");
        assert!(image.data_url.ends_with("aGVsbG8="));
    }

    #[test]
    fn last_dot_segment_wins() {
        let image = encode_upload("shot.final.jpeg", b"abc");
        assert_eq!(image.mime_type, "image/jpeg");
        assert!(image.data_url.starts_with("data:image/jpeg;base64,"));
    }
}
