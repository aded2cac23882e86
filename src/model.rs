use std::path::{Path, PathBuf};

use crate::{
    buffer::DEFAULT_TEXTURE_SIZE,
    channel::Channel,
    compositor::MapSet,
    decode::load_image,
    error::{TexweaveError, TexweaveResult},
    stage::{DEFAULT_LIGHT, EmissionMap, NormalMap, OcclusionMap},
};

/// Declarative description of one composite job: which file fills each map
/// role and with what parameters. Serialized as JSON; relative paths resolve
/// against the recipe file's directory.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Recipe {
    /// Working canvas size (square). Inputs are expected to match.
    #[serde(default = "default_texture_size")]
    pub texture_size: u32,
    #[serde(default)]
    pub color: Option<PathBuf>,
    #[serde(default)]
    pub normal: Option<NormalRecipe>,
    #[serde(default)]
    pub occlusion: Option<OcclusionRecipe>,
    #[serde(default)]
    pub emission: Option<EmissionRecipe>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct NormalRecipe {
    pub path: PathBuf,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_light")]
    pub light: [f32; 3],
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct OcclusionRecipe {
    pub path: PathBuf,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_occlusion_channel")]
    pub channel: Channel,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EmissionRecipe {
    pub path: PathBuf,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_texture_size() -> u32 {
    DEFAULT_TEXTURE_SIZE
}

fn default_scale() -> f32 {
    1.0
}

fn default_light() -> [f32; 3] {
    DEFAULT_LIGHT
}

fn default_occlusion_channel() -> Channel {
    Channel::R
}

impl Recipe {
    /// Load and decode every referenced file into a ready [`MapSet`].
    ///
    /// This is the ingestion step in front of the compositing core; the pass
    /// itself never touches the filesystem.
    #[tracing::instrument(skip(self, root))]
    pub fn resolve(&self, root: &Path) -> TexweaveResult<MapSet> {
        let load = |rel: &Path| load_image(&root.join(rel));

        let base = self.color.as_deref().map(&load).transpose()?;
        let normal = self
            .normal
            .as_ref()
            .map(|n| {
                Ok::<_, TexweaveError>(NormalMap {
                    buffer: load(&n.path)?,
                    scale: n.scale,
                    light: n.light,
                })
            })
            .transpose()?;
        let occlusion = self
            .occlusion
            .as_ref()
            .map(|o| {
                Ok::<_, TexweaveError>(OcclusionMap {
                    buffer: load(&o.path)?,
                    scale: o.scale,
                    channel: o.channel,
                })
            })
            .transpose()?;
        let emission = self
            .emission
            .as_ref()
            .map(|e| {
                Ok::<_, TexweaveError>(EmissionMap {
                    buffer: load(&e.path)?,
                    scale: e.scale,
                })
            })
            .transpose()?;

        tracing::debug!(
            base = base.is_some(),
            normal = normal.is_some(),
            occlusion = occlusion.is_some(),
            emission = emission.is_some(),
            "resolved recipe"
        );

        Ok(MapSet {
            base,
            normal,
            occlusion,
            emission,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_recipe_fills_defaults() {
        let recipe: Recipe = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(recipe.texture_size, DEFAULT_TEXTURE_SIZE);
        assert!(recipe.color.is_none());
        assert!(recipe.normal.is_none());
    }

    #[test]
    fn role_defaults_match_the_ui_defaults() {
        let recipe: Recipe = serde_json::from_str(
            r#"{
                "texture_size": 8,
                "normal": { "path": "n.png" },
                "occlusion": { "path": "o.png" },
                "emission": { "path": "e.png", "scale": 0.5 }
            }"#,
        )
        .unwrap();

        let normal = recipe.normal.unwrap();
        assert_eq!(normal.scale, 1.0);
        assert_eq!(normal.light, DEFAULT_LIGHT);

        let occlusion = recipe.occlusion.unwrap();
        assert_eq!(occlusion.scale, 1.0);
        assert_eq!(occlusion.channel, Channel::R);

        assert_eq!(recipe.emission.unwrap().scale, 0.5);
    }

    #[test]
    fn occlusion_channel_parses_ui_labels() {
        let recipe: Recipe =
            serde_json::from_str(r#"{ "occlusion": { "path": "o.png", "channel": "B" } }"#)
                .unwrap();
        assert_eq!(recipe.occlusion.unwrap().channel, Channel::B);
    }

    #[test]
    fn resolve_with_no_roles_is_an_empty_map_set() {
        let recipe: Recipe = serde_json::from_str(r#"{ "texture_size": 4 }"#).unwrap();
        let maps = recipe.resolve(Path::new(".")).unwrap();
        assert!(maps.base.is_none());
        assert!(maps.normal.is_none());
        assert!(maps.occlusion.is_none());
        assert!(maps.emission.is_none());
    }
}
