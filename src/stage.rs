use crate::{
    buffer::PixelBuffer,
    channel::{Channel, ChannelSample, extract},
    error::{TexweaveError, TexweaveResult},
};

/// Floating-point RGBA threaded between stages.
///
/// Intermediate values may leave [0, 255] (emission overshoot, extrapolated
/// interpolation going negative); quantization back to u8 happens once, after
/// the last stage.
pub type RgbaF32 = [f32; 4];

/// Default light direction for the normal stage: straight out of the surface.
pub const DEFAULT_LIGHT: [f32; 3] = [0.0, 0.0, 1.0];

/// Upper scale bound for the interpolative stages (normal, occlusion).
pub const INTERP_SCALE_MAX: f32 = 4.0;

/// Upper scale bound for the additive emission stage.
pub const EMISSION_SCALE_MAX: f32 = 2.0;

/// Tangent-space normal map plus its lighting parameters.
#[derive(Clone, Debug)]
pub struct NormalMap {
    pub buffer: PixelBuffer,
    pub scale: f32,
    pub light: [f32; 3],
}

/// Scalar occlusion map; `channel` picks which of R/G/B holds the scalar.
#[derive(Clone, Debug)]
pub struct OcclusionMap {
    pub buffer: PixelBuffer,
    pub scale: f32,
    pub channel: Channel,
}

/// Emissive color map, blended additively.
#[derive(Clone, Debug)]
pub struct EmissionMap {
    pub buffer: PixelBuffer,
    pub scale: f32,
}

/// One per-pixel transform in the compositing chain.
///
/// Built once per composite call from the optional map inputs; an absent
/// role becomes `Identity`. `apply` is pure: same index and pixel in, same
/// pixel out, no I/O and no mutation.
#[derive(Clone, Debug)]
pub enum BlendStage<'a> {
    Identity,
    Normal {
        map: &'a PixelBuffer,
        scale: f32,
        light: [f32; 3],
    },
    Occlusion {
        map: &'a PixelBuffer,
        scale: f32,
        channel: Channel,
    },
    Emission {
        map: &'a PixelBuffer,
        scale: f32,
    },
}

impl<'a> BlendStage<'a> {
    /// Build the normal-lighting stage, or `Identity` when the input is absent.
    pub fn normal(input: Option<&'a NormalMap>) -> TexweaveResult<Self> {
        let Some(input) = input else {
            return Ok(Self::Identity);
        };
        check_scale("normal", input.scale, INTERP_SCALE_MAX)?;
        if input.light.iter().any(|v| !v.is_finite()) {
            return Err(TexweaveError::invalid_parameter(
                "normal light vector components must be finite",
            ));
        }
        Ok(Self::Normal {
            map: &input.buffer,
            scale: input.scale,
            light: input.light,
        })
    }

    /// Build the occlusion stage.
    ///
    /// A `None` channel selector means the role is switched off entirely and
    /// yields `Identity` (not a zero-occlusion stage); `RGB` is rejected
    /// because occlusion is a scalar.
    pub fn occlusion(input: Option<&'a OcclusionMap>) -> TexweaveResult<Self> {
        let Some(input) = input else {
            return Ok(Self::Identity);
        };
        if input.channel == Channel::None {
            return Ok(Self::Identity);
        }
        if input.channel.offset().is_none() {
            return Err(TexweaveError::invalid_parameter(
                "occlusion channel selector must be one of R, G, B",
            ));
        }
        check_scale("occlusion", input.scale, INTERP_SCALE_MAX)?;
        Ok(Self::Occlusion {
            map: &input.buffer,
            scale: input.scale,
            channel: input.channel,
        })
    }

    /// Build the additive emission stage, or `Identity` when absent.
    pub fn emission(input: Option<&'a EmissionMap>) -> TexweaveResult<Self> {
        let Some(input) = input else {
            return Ok(Self::Identity);
        };
        check_scale("emission", input.scale, EMISSION_SCALE_MAX)?;
        Ok(Self::Emission {
            map: &input.buffer,
            scale: input.scale,
        })
    }

    /// Transform one pixel. Alpha passes through every variant unchanged.
    pub fn apply(&self, pixel_index: usize, rgba: RgbaF32) -> TexweaveResult<RgbaF32> {
        match self {
            Self::Identity => Ok(rgba),

            Self::Normal { map, scale, light } => {
                let ChannelSample::Triplet([nx, ny, nz]) =
                    extract(map, pixel_index, Channel::Rgb)?
                else {
                    return Err(TexweaveError::invalid_parameter(
                        "RGB selector must yield a triplet",
                    ));
                };
                // Raw 0-255 channel values feed the dot product; there is no
                // remap to a [-1,1] unit vector.
                let dot = nx * light[0] + ny * light[1] + nz * light[2];
                let brightness = (dot / 255.0).clamp(0.0, 1.0);
                let [r, g, b, a] = rgba;
                Ok([
                    blend_toward(r, r * brightness, *scale),
                    blend_toward(g, g * brightness, *scale),
                    blend_toward(b, b * brightness, *scale),
                    a,
                ])
            }

            Self::Occlusion {
                map,
                scale,
                channel,
            } => {
                let v = extract(map, pixel_index, *channel)?
                    .as_scalar()
                    .ok_or_else(|| {
                        TexweaveError::invalid_parameter(
                            "occlusion selector must yield a scalar",
                        )
                    })?;
                let factor = v / 255.0;
                let [r, g, b, a] = rgba;
                Ok([
                    blend_toward(r, r * factor, *scale),
                    blend_toward(g, g * factor, *scale),
                    blend_toward(b, b * factor, *scale),
                    a,
                ])
            }

            Self::Emission { map, scale } => {
                let ChannelSample::Triplet([er, eg, eb]) =
                    extract(map, pixel_index, Channel::Rgb)?
                else {
                    return Err(TexweaveError::invalid_parameter(
                        "RGB selector must yield a triplet",
                    ));
                };
                let [r, g, b, a] = rgba;
                Ok([
                    r + er * scale,
                    g + eg * scale,
                    b + eb * scale,
                    a,
                ])
            }
        }
    }
}

fn blend_toward(channel: f32, target: f32, scale: f32) -> f32 {
    channel + (target - channel) * scale
}

fn check_scale(stage: &str, scale: f32, max: f32) -> TexweaveResult<()> {
    if !scale.is_finite() || scale < 0.0 || scale > max {
        return Err(TexweaveError::invalid_parameter(format!(
            "{stage} scale must lie in [0, {max}], got {scale}"
        )));
    }
    Ok(())
}
