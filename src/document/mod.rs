pub mod docx;
pub mod entities;
pub mod html;
pub mod image;
pub mod model;
pub mod render;

use std::path::Path;
use anyhow::Result;

/// Converts a Word document on disk to an HTML fragment.
pub fn process_document(path: &Path) -> Result<String> {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("docx") => docx::extract(path),
        _ => anyhow::bail!("Only .docx files can be converted: {}", path.display()),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Cursor;

    use base64::{engine::general_purpose, Engine as _};
    use image::{DynamicImage, ImageFormat, RgbImage};

    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    pub fn png_data_url(width: u32, height: u32) -> String {
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(png_bytes(width, height))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_other_formats() {
        let err = process_document(Path::new("notes.pdf")).unwrap_err();
        assert!(err.to_string().contains("notes.pdf"));
    }
}
