use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// An image captured offline and carried inside the queued payload as a
/// self-contained base64 data URL, decoded back to bytes at sync time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    mime: String,
    bytes: Vec<u8>,
}

impl EncodedImage {
    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn parse(data_url: &str) -> Result<Self, String> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| "Encoded image must be a data URL".to_string())?;
        let (mime, encoded) = rest
            .split_once(";base64,")
            .ok_or_else(|| "Encoded image must be base64-encoded".to_string())?;
        if mime.is_empty() {
            return Err("Encoded image is missing a media type".to_string());
        }
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| format!("Invalid base64 image payload: {e}"))?;
        Ok(Self {
            mime: mime.to_string(),
            bytes,
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File extension for the uploaded object name.
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "bin",
        }
    }
}
