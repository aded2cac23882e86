//! Texweave composites the texture maps of a 3D asset — base color, tangent-space
//! normal, scalar occlusion and emissive color — into one RGBA8 image.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: decode each assigned map into a [`PixelBuffer`] (the
//!    [`Recipe`] JSON model and [`decode_image`] cover the file-backed case;
//!    embedders may hand over buffers directly).
//! 2. **Build**: construct one [`BlendStage`] per role, once per call; an
//!    unassigned role becomes the identity stage.
//! 3. **Composite**: [`Compositor::composite`] threads every pixel through
//!    Normal → Occlusion → Emission in that fixed order, with float math
//!    between stages and one round-then-clamp quantization at the end.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure core**: the compositing pass does no IO, keeps no state and
//!   publishes no partial output; decoding is front-loaded.
//! - **All-or-nothing**: a mismatched input surfaces as `OutOfBounds` at the
//!   first bad index and aborts the whole call.
#![forbid(unsafe_code)]

mod buffer;
mod channel;
mod compositor;
mod decode;
mod error;
mod model;
mod stage;

pub use buffer::{DEFAULT_TEXTURE_SIZE, PixelBuffer};
pub use channel::{Channel, ChannelSample, extract};
pub use compositor::{Compositor, MapSet};
pub use decode::{decode_image, load_image, write_png};
pub use error::{TexweaveError, TexweaveResult};
pub use model::{EmissionRecipe, NormalRecipe, OcclusionRecipe, Recipe};
pub use stage::{
    BlendStage, DEFAULT_LIGHT, EMISSION_SCALE_MAX, EmissionMap, INTERP_SCALE_MAX, NormalMap,
    OcclusionMap, RgbaF32,
};
