use crate::error::{TexweaveError, TexweaveResult};

/// Working resolution used when no explicit size is configured (square).
pub const DEFAULT_TEXTURE_SIZE: u32 = 2048;

/// Fixed-size RGBA8 image, row-major, tightly packed.
///
/// Invariant: `pixels.len() == width * height * 4`. Pixel index `i` maps to
/// bytes `4i..4i+4`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zeroed (transparent black) buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize) * 4;
        Self {
            width,
            height,
            pixels: vec![0; len],
        }
    }

    /// Wrap decoded RGBA8 bytes, enforcing the length invariant.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> TexweaveResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(TexweaveError::invalid_parameter(format!(
                "rgba8 buffer for {width}x{height} must be {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Buffer filled with one constant pixel.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut buf = Self::new(width, height);
        for px in buf.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        buf
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels (`width * height`).
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> TexweaveResult<[u8; 4]> {
        let i = self.offset_of(x, y)?;
        Ok([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> TexweaveResult<()> {
        let i = self.offset_of(x, y)?;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
        Ok(())
    }

    /// Read the quadruple at a linear pixel index.
    ///
    /// Failing here is how mismatched input dimensions surface: there is no
    /// pre-flight dimension check, the first index past the smaller buffer's
    /// extent errors out.
    pub fn rgba_at(&self, pixel_index: usize) -> TexweaveResult<[u8; 4]> {
        if pixel_index >= self.pixel_count() {
            return Err(TexweaveError::out_of_bounds(format!(
                "pixel index {pixel_index} exceeds {}x{} buffer",
                self.width, self.height
            )));
        }
        let i = pixel_index * 4;
        Ok([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Write the quadruple at a linear pixel index.
    pub fn put_rgba_at(&mut self, pixel_index: usize, rgba: [u8; 4]) -> TexweaveResult<()> {
        if pixel_index >= self.pixel_count() {
            return Err(TexweaveError::out_of_bounds(format!(
                "pixel index {pixel_index} exceeds {}x{} buffer",
                self.width, self.height
            )));
        }
        let i = pixel_index * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
        Ok(())
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    fn offset_of(&self, x: u32, y: u32) -> TexweaveResult<usize> {
        if x >= self.width || y >= self.height {
            return Err(TexweaveError::out_of_bounds(format!(
                "({x}, {y}) outside {}x{} buffer",
                self.width, self.height
            )));
        }
        Ok(((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }
}
