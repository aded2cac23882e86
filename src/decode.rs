use std::path::Path;

use anyhow::Context as _;

use crate::{
    buffer::PixelBuffer,
    error::{TexweaveError, TexweaveResult},
};

/// Decode encoded image bytes into an RGBA8 [`PixelBuffer`].
pub fn decode_image(bytes: &[u8]) -> TexweaveResult<PixelBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer::from_rgba8(width, height, rgba.into_raw())
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> TexweaveResult<PixelBuffer> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let buffer = decode_image(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        width = buffer.width(),
        height = buffer.height(),
        "decoded image"
    );
    Ok(buffer)
}

/// Write a composited buffer out as a PNG.
pub fn write_png(path: &Path, buffer: &PixelBuffer) -> TexweaveResult<()> {
    let img = image::RgbaImage::from_raw(
        buffer.width(),
        buffer.height(),
        buffer.as_bytes().to_vec(),
    )
    .ok_or_else(|| {
        TexweaveError::invalid_parameter("pixel buffer length does not match its dimensions")
    })?;
    img.save(path)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decode_yields_matching_dimensions_and_pixels() {
        let buf = decode_image(&png_bytes(3, 2, [7, 8, 9, 255])).unwrap();
        assert_eq!((buf.width(), buf.height()), (3, 2));
        assert_eq!(buf.rgba_at(5).unwrap(), [7, 8, 9, 255]);
    }

    #[test]
    fn decode_rejects_garbage_bytes() {
        assert!(decode_image(b"not an image").is_err());
    }

    #[test]
    fn png_roundtrip_through_disk() {
        let dir = std::path::PathBuf::from("target").join("decode_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.png");

        let original = PixelBuffer::filled(4, 4, [1, 2, 3, 255]);
        write_png(&path, &original).unwrap();
        let reloaded = load_image(&path).unwrap();
        assert_eq!(original, reloaded);
    }
}
