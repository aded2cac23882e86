use rayon::prelude::*;

use crate::{
    buffer::PixelBuffer,
    error::{TexweaveError, TexweaveResult},
    stage::{BlendStage, EmissionMap, NormalMap, OcclusionMap, RgbaF32},
};

/// The optional map inputs for one composite call.
///
/// An absent role contributes nothing. An absent base means the blend chain
/// runs over a zeroed canvas of the working size.
#[derive(Clone, Debug, Default)]
pub struct MapSet {
    pub base: Option<PixelBuffer>,
    pub normal: Option<NormalMap>,
    pub occlusion: Option<OcclusionMap>,
    pub emission: Option<EmissionMap>,
}

/// Runs the per-pixel blend chain over a fixed working size.
///
/// The pass is synchronous and pure: stages are built once up front, every
/// pixel of the base image is threaded through Normal, then Occlusion, then
/// Emission (the order is load-bearing: occlusion multiplies post-shading
/// values and emission adds unclamped), and each channel is rounded and
/// clamped to [0, 255] exactly once at the end. Any `OutOfBounds` from a
/// mismatched input aborts the whole call; no partial buffer is published.
#[derive(Clone, Copy, Debug)]
pub struct Compositor {
    width: u32,
    height: u32,
    parallel: bool,
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> TexweaveResult<Self> {
        if width == 0 || height == 0 {
            return Err(TexweaveError::invalid_parameter(
                "compositor dimensions must be non-zero",
            ));
        }
        Ok(Self {
            width,
            height,
            parallel: false,
        })
    }

    /// Opt in to a rayon-parallel pixel loop. Output is byte-identical to the
    /// serial path; pixels have no cross-pixel dependencies.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Composite one set of maps into a fresh output buffer.
    #[tracing::instrument(skip(self, maps), fields(width = self.width, height = self.height))]
    pub fn composite(&self, maps: &MapSet) -> TexweaveResult<PixelBuffer> {
        let blank;
        let base = match &maps.base {
            Some(buffer) => buffer,
            None => {
                blank = PixelBuffer::new(self.width, self.height);
                &blank
            }
        };

        // Stage construction happens exactly once, before the loop; parameter
        // validation fails here rather than mid-pass.
        let stages = [
            BlendStage::normal(maps.normal.as_ref())?,
            BlendStage::occlusion(maps.occlusion.as_ref())?,
            BlendStage::emission(maps.emission.as_ref())?,
        ];

        let mut out = PixelBuffer::new(self.width, self.height);

        if self.parallel {
            out.bytes_mut()
                .par_chunks_exact_mut(4)
                .enumerate()
                .try_for_each(|(i, px)| {
                    px.copy_from_slice(&composite_pixel(i, base, &stages)?);
                    Ok::<(), TexweaveError>(())
                })?;
        } else {
            for i in 0..out.pixel_count() {
                let px = composite_pixel(i, base, &stages)?;
                out.put_rgba_at(i, px)?;
            }
        }

        tracing::debug!(pixels = out.pixel_count(), "composite pass finished");
        Ok(out)
    }
}

fn composite_pixel(
    pixel_index: usize,
    base: &PixelBuffer,
    stages: &[BlendStage<'_>; 3],
) -> TexweaveResult<[u8; 4]> {
    let [r, g, b, a] = base.rgba_at(pixel_index)?;
    let mut rgba: RgbaF32 = [f32::from(r), f32::from(g), f32::from(b), f32::from(a)];
    for stage in stages {
        rgba = stage.apply(pixel_index, rgba)?;
    }
    Ok(rgba.map(quantize))
}

/// Round-then-clamp a float channel back to u8. Applied once per pixel, after
/// the last stage.
fn quantize(v: f32) -> u8 {
    (v.round() as i32).clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::stage::DEFAULT_LIGHT;

    #[test]
    fn quantize_rounds_then_clamps() {
        assert_eq!(quantize(-0.4), 0);
        assert_eq!(quantize(-120.0), 0);
        assert_eq!(quantize(0.5), 1);
        assert_eq!(quantize(254.4), 254);
        assert_eq!(quantize(254.6), 255);
        assert_eq!(quantize(900.0), 255);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(Compositor::new(0, 4).is_err());
        assert!(Compositor::new(4, 0).is_err());
    }

    #[test]
    fn absent_base_iterates_a_zeroed_canvas() {
        let comp = Compositor::new(2, 2).unwrap();
        let emission = EmissionMap {
            buffer: PixelBuffer::filled(2, 2, [10, 20, 30, 255]),
            scale: 1.0,
        };
        let out = comp
            .composite(&MapSet {
                emission: Some(emission),
                ..MapSet::default()
            })
            .unwrap();
        assert_eq!(out.rgba_at(3).unwrap(), [10, 20, 30, 0]);
    }

    #[test]
    fn undersized_input_aborts_without_partial_output() {
        let comp = Compositor::new(2, 2).unwrap();
        let maps = MapSet {
            base: Some(PixelBuffer::filled(1, 1, [50, 50, 50, 255])),
            ..MapSet::default()
        };
        let err = comp.composite(&maps).unwrap_err();
        assert!(matches!(err, TexweaveError::OutOfBounds(_)));
    }

    #[test]
    fn parallel_path_matches_serial_path() {
        let mut base = PixelBuffer::new(4, 4);
        let mut normal = PixelBuffer::new(4, 4);
        let mut occlusion = PixelBuffer::new(4, 4);
        let mut emission = PixelBuffer::new(4, 4);
        for y in 0..4u32 {
            for x in 0..4u32 {
                let s = (y * 4 + x) as u8;
                base.set(x, y, [s.wrapping_mul(17), 200 - s, s, 255]).unwrap();
                normal.set(x, y, [128, s.wrapping_mul(31), 255 - s, 255]).unwrap();
                occlusion.set(x, y, [s.wrapping_mul(13), 0, 0, 255]).unwrap();
                emission.set(x, y, [s, s, s, 255]).unwrap();
            }
        }
        let maps = MapSet {
            base: Some(base),
            normal: Some(NormalMap {
                buffer: normal,
                scale: 1.5,
                light: [0.2, -0.3, 1.0],
            }),
            occlusion: Some(OcclusionMap {
                buffer: occlusion,
                scale: 0.8,
                channel: Channel::R,
            }),
            emission: Some(EmissionMap {
                buffer: emission,
                scale: 2.0,
            }),
        };

        let serial = Compositor::new(4, 4).unwrap().composite(&maps).unwrap();
        let parallel = Compositor::new(4, 4)
            .unwrap()
            .parallel(true)
            .composite(&maps)
            .unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn deferred_clamp_lets_emission_recover_negative_intermediates() {
        // Normal stage extrapolates to -100; emission adds 150. Clamping
        // between stages would give 150 instead of 50.
        let comp = Compositor::new(1, 1).unwrap();
        let maps = MapSet {
            base: Some(PixelBuffer::filled(1, 1, [100, 100, 100, 255])),
            normal: Some(NormalMap {
                buffer: PixelBuffer::filled(1, 1, [0, 0, 0, 255]),
                scale: 2.0,
                light: DEFAULT_LIGHT,
            }),
            emission: Some(EmissionMap {
                buffer: PixelBuffer::filled(1, 1, [150, 150, 150, 255]),
                scale: 1.0,
            }),
            ..MapSet::default()
        };
        let out = comp.composite(&maps).unwrap();
        assert_eq!(out.rgba_at(0).unwrap(), [50, 50, 50, 255]);
    }
}
