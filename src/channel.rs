use crate::{buffer::PixelBuffer, error::TexweaveResult};

/// Which of a map's channels feeds a blend stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Channel {
    R,
    G,
    B,
    #[serde(rename = "RGB")]
    Rgb,
    None,
}

impl Channel {
    /// Byte offset within an RGBA quadruple for scalar selectors.
    pub fn offset(self) -> Option<usize> {
        match self {
            Channel::R => Some(0),
            Channel::G => Some(1),
            Channel::B => Some(2),
            Channel::Rgb | Channel::None => None,
        }
    }
}

/// What a channel selector yields at one pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChannelSample {
    Scalar(f32),
    Triplet([f32; 3]),
    /// The `None` selector: contributes nothing.
    Absent,
}

impl ChannelSample {
    pub fn as_scalar(self) -> Option<f32> {
        match self {
            ChannelSample::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_triplet(self) -> Option<[f32; 3]> {
        match self {
            ChannelSample::Triplet(t) => Some(t),
            _ => None,
        }
    }
}

/// Sample `channel` of `buffer` at a linear pixel index.
///
/// Pure read; values come back as f32 in [0, 255]. Fails `OutOfBounds` when
/// the index runs past the buffer's extent.
pub fn extract(
    buffer: &PixelBuffer,
    pixel_index: usize,
    channel: Channel,
) -> TexweaveResult<ChannelSample> {
    // `None` never touches the buffer, so it cannot fail bounds checks.
    if channel == Channel::None {
        return Ok(ChannelSample::Absent);
    }
    let [r, g, b, _a] = buffer.rgba_at(pixel_index)?;
    Ok(match channel {
        Channel::R => ChannelSample::Scalar(f32::from(r)),
        Channel::G => ChannelSample::Scalar(f32::from(g)),
        Channel::B => ChannelSample::Scalar(f32::from(b)),
        // `None` returned above; only `Rgb` reaches here.
        _ => ChannelSample::Triplet([f32::from(r), f32::from(g), f32::from(b)]),
    })
}
