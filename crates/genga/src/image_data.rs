//! Encoded image handling
//!
//! Reference frames and generated frames travel as `data:<mime>;base64,<payload>` URLs.
//! The service layer needs the MIME type and the raw base64 payload separately.
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// MIME type assumed when a data URL header does not name one
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageDataError {
    #[error("image data is empty")]
    Empty,
    #[error("not a data URL: missing ',' separator")]
    MissingPayload,
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
    #[error("failed to read image file: {0}")]
    Io(String),
}

/// Image split into MIME type and base64 payload, the shape every backend consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 payload (standard alphabet, padded)
    pub data: String,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encode raw bytes
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(bytes),
        )
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decode the payload into raw bytes
    pub fn decode(&self) -> Result<Vec<u8>, ImageDataError> {
        base64::engine::general_purpose::STANDARD
            .decode(self.data.trim())
            .map_err(|e| ImageDataError::InvalidBase64(e.to_string()))
    }
}

/// Split a data URL into MIME type and payload.
///
/// The MIME type is whatever sits between the first `:` and the following `;` of the
/// header. A header without one (`data:;base64`, `data:image/png`, a bare prefix) falls
/// back to [`DEFAULT_MIME_TYPE`]. The payload is everything after the first `,`.
pub fn parse_data_url(url: &str) -> Result<InlineImage, ImageDataError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ImageDataError::Empty);
    }

    let (header, payload) = url.split_once(',').ok_or(ImageDataError::MissingPayload)?;

    let mime_type = header
        .split_once(':')
        .and_then(|(_, rest)| rest.split_once(';'))
        .map(|(mime, _)| mime.trim())
        .filter(|mime| !mime.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE);

    Ok(InlineImage::new(mime_type, payload))
}

/// A displayable encoded image (data URL)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Accept a data URL after checking that it splits into header and payload
    pub fn parse(url: impl Into<String>) -> Result<Self, ImageDataError> {
        let url = url.into();
        parse_data_url(&url)?;
        Ok(Self(url.trim().to_string()))
    }

    pub fn from_inline(image: &InlineImage) -> Self {
        Self(image.to_data_url())
    }

    /// Read an image file, sniffing its MIME type from the content
    pub fn from_file(path: &Path) -> Result<Self, ImageDataError> {
        let bytes = std::fs::read(path).map_err(|e| ImageDataError::Io(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ImageDataError::Empty);
        }

        let mime_type = image::guess_format(&bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or(DEFAULT_MIME_TYPE);

        Ok(Self::from_inline(&InlineImage::from_bytes(mime_type, &bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn inline(&self) -> InlineImage {
        // Construction guarantees the separator; the fallback only guards direct deserialization.
        parse_data_url(&self.0).unwrap_or_else(|_| InlineImage::new(DEFAULT_MIME_TYPE, ""))
    }

    pub fn mime_type(&self) -> String {
        self.inline().mime_type
    }

    /// Conventional file extension for the image's MIME type
    pub fn extension(&self) -> &'static str {
        image::ImageFormat::from_mime_type(self.mime_type())
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("img")
    }
}

impl std::fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_png_data_url() {
        let image = parse_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "iVBORw0KGgo=");
    }

    #[test]
    fn test_parse_falls_back_to_jpeg() {
        let image = parse_data_url("data:;base64,AAAA").unwrap();
        assert_eq!(image.mime_type, DEFAULT_MIME_TYPE);

        let image = parse_data_url("data:image/png,AAAA").unwrap();
        assert_eq!(image.mime_type, DEFAULT_MIME_TYPE);

        let image = parse_data_url("garbage,AAAA").unwrap();
        assert_eq!(image.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(image.data, "AAAA");
    }

    #[test]
    fn test_parse_rejects_missing_payload() {
        assert_eq!(
            parse_data_url("data:image/png;base64"),
            Err(ImageDataError::MissingPayload)
        );
        assert_eq!(parse_data_url("   "), Err(ImageDataError::Empty));
    }

    #[test]
    fn test_inline_bytes_decode() {
        let image = InlineImage::from_bytes("image/webp", b"frame");
        assert_eq!(image.to_data_url(), "data:image/webp;base64,ZnJhbWU=");
        assert_eq!(image.decode().unwrap(), b"frame");
    }

    #[test]
    fn test_encoded_image_extension() {
        let png = EncodedImage::parse("data:image/png;base64,AAAA").unwrap();
        assert_eq!(png.extension(), "png");

        let jpeg = EncodedImage::parse("data:image/jpeg;base64,AAAA").unwrap();
        assert_eq!(jpeg.extension(), "jpg");
    }

    #[test]
    fn test_from_file_sniffs_png() {
        let img = image::DynamicImage::new_rgb8(4, 4);
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let path = std::env::temp_dir().join("genga_sniff_test.bin");
        std::fs::write(&path, &bytes).unwrap();

        let encoded = EncodedImage::from_file(&path).unwrap();
        assert!(encoded.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(encoded.inline().decode().unwrap(), bytes);

        let _ = std::fs::remove_file(&path);
    }
}
