// src/infrastructure/media.rs
use anyhow::{Context, Result};
use base64::Engine;
use std::path::Path;

/// MIME type guessed from a file extension.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// Turns an image argument into an inline source: `data:` URLs pass through,
/// anything else is read as a file and encoded.
pub fn image_source(arg: &str) -> Result<String> {
    let arg = arg.trim();
    if arg.is_empty() || arg.starts_with("data:") {
        return Ok(arg.to_string());
    }
    let path = Path::new(arg);
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(encode_data_url(mime_for(path), &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_png_file_when_encoding_then_returns_data_url() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dot.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let src = image_source(path.to_str().unwrap()).unwrap();

        assert_eq!(src, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn given_data_url_when_resolving_then_passes_through() {
        let src = image_source("data:image/gif;base64,R0lG").unwrap();

        assert_eq!(src, "data:image/gif;base64,R0lG");
    }

    #[test]
    fn given_missing_file_when_resolving_then_returns_error() {
        assert!(image_source("/definitely/not/here.png").is_err());
    }
}
