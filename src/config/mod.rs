use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::animation::{presets, Animation, Catalog, CurveOptions, EasingCurve, Motion};
use crate::stage::Stage;

/// Ways a single preset entry can be unusable
///
/// A bad entry is skipped with a warning; it never takes the rest of
/// the catalog down with it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown easing curve '{0}'")]
    UnknownCurve(String),

    #[error("unknown effect '{0}' (expected 'slide' or 'shrink-slide')")]
    UnknownEffect(String),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub stage: StageConfig,

    #[serde(default, rename = "preset")]
    pub presets: Vec<PresetConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct StageConfig {
    #[serde(default = "default_screen_width")]
    pub screen_width: f32,

    #[serde(default = "default_view_width")]
    pub view_width: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PresetConfig {
    pub tag: String,

    /// What the animation does: "slide" or "shrink-slide"
    #[serde(default = "default_effect")]
    pub effect: String,

    /// Duration in seconds
    #[serde(default = "default_duration")]
    pub duration: f32,

    /// Delay in seconds before the slide starts
    #[serde(default)]
    pub delay: f32,

    /// Easing curve display name; absent leaves the option set empty
    /// so the platform default applies
    #[serde(default)]
    pub curve: Option<String>,

    /// Present makes the preset a spring
    pub spring: Option<SpringParams>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct SpringParams {
    #[serde(default = "default_spring_damping")]
    pub damping: f32,

    #[serde(default = "default_spring_velocity")]
    pub initial_velocity: f32,
}

impl Config {
    pub async fn load(path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(path);
        info!("📄 Reading presets from: {}", expanded_path);

        let content = fs::read_to_string(expanded_path.as_ref())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read preset file '{}': {}", expanded_path, e))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| anyhow::anyhow!("Failed to parse presets: {}", e))?;

        debug!("📋 Preset file loaded: {} presets", config.presets.len());
        Ok(config)
    }

    pub fn stage(&self) -> Stage {
        Stage::new(self.stage.screen_width, self.stage.view_width)
    }

    /// Build the catalog, skipping unusable entries with a warning
    pub fn build_catalog(&self) -> Catalog {
        let mut catalog = Catalog::default();
        for preset in &self.presets {
            match preset.build() {
                Ok(animation) => catalog.push(animation),
                Err(e) => warn!("⚠️  Skipping preset '{}': {}", preset.tag, e),
            }
        }
        catalog
    }
}

impl PresetConfig {
    fn build(&self) -> Result<Animation, ConfigError> {
        let options = match &self.curve {
            Some(name) => EasingCurve::from_name(name)
                .ok_or_else(|| ConfigError::UnknownCurve(name.clone()))?
                .options(),
            None => CurveOptions::empty(),
        };

        let mut animation = match self.effect.as_str() {
            "slide" => Animation::new(
                self.tag.as_str(),
                self.duration,
                options,
                presets::slide_to_center,
            ),
            "shrink-slide" => Animation::new(
                self.tag.as_str(),
                self.duration,
                options,
                presets::restore_and_slide,
            )
            .with_prepare(presets::shrink_and_tip),
            other => return Err(ConfigError::UnknownEffect(other.to_string())),
        }
        .with_delay(self.delay);

        if let Some(spring) = self.spring {
            animation.motion = Motion::Spring {
                damping: spring.damping,
                initial_velocity: spring.initial_velocity,
            };
        }

        Ok(animation)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stage: StageConfig::default(),
            presets: Vec::new(),
        }
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            screen_width: default_screen_width(),
            view_width: default_view_width(),
        }
    }
}

/// Where presets live when --config is not given
pub fn default_config_path() -> String {
    dirs::config_dir()
        .map(|dir| {
            dir.join("motionlab")
                .join("presets.toml")
                .to_string_lossy()
                .into_owned()
        })
        .unwrap_or_else(|| "~/.config/motionlab/presets.toml".to_string())
}

// Default values for configuration
fn default_screen_width() -> f32 {
    presets::DEMO_SCREEN_WIDTH
}
fn default_view_width() -> f32 {
    presets::DEMO_VIEW_WIDTH
}
fn default_effect() -> String {
    "slide".to_string()
}
fn default_duration() -> f32 {
    1.0
}
fn default_spring_damping() -> f32 {
    0.6
}
fn default_spring_velocity() -> f32 {
    0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_preset_file() {
        let config: Config = toml::from_str(
            r#"
            [stage]
            screen_width = 1920.0
            view_width = 240.0

            [[preset]]
            tag = "First"
            effect = "slide"
            duration = 1.0

            [[preset]]
            tag = "Spring1"
            curve = "ease-in-out"
            [preset.spring]
            damping = 0.6
            initial_velocity = 0.7
            "#,
        )
        .unwrap();

        assert_eq!(config.stage.screen_width, 1920.0);
        assert_eq!(config.presets.len(), 2);

        let catalog = config.build_catalog();
        assert_eq!(catalog.tags(), vec!["First", "Spring1"]);
        assert_eq!(
            catalog.get(1).unwrap().motion,
            Motion::Spring {
                damping: 0.6,
                initial_velocity: 0.7
            }
        );
        assert_eq!(
            catalog.get(1).unwrap().options,
            CurveOptions::EASE_IN_OUT
        );
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: Config = toml::from_str(
            r#"
            [[preset]]
            tag = "Quick"
            "#,
        )
        .unwrap();

        assert_eq!(config.stage.screen_width, presets::DEMO_SCREEN_WIDTH);
        let preset = &config.presets[0];
        assert_eq!(preset.effect, "slide");
        assert_eq!(preset.duration, 1.0);
        assert_eq!(preset.delay, 0.0);
        assert_eq!(preset.curve, None);

        let catalog = config.build_catalog();
        assert_eq!(catalog.get(0).unwrap().options, CurveOptions::empty());
        assert_eq!(catalog.get(0).unwrap().motion, Motion::Tween);
    }

    #[test]
    fn test_empty_file_gives_empty_catalog() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.build_catalog().is_empty());
    }

    #[test]
    fn test_unknown_effect_skipped() {
        let config: Config = toml::from_str(
            r#"
            [[preset]]
            tag = "Broken"
            effect = "teleport"

            [[preset]]
            tag = "Fine"
            "#,
        )
        .unwrap();

        let catalog = config.build_catalog();
        assert_eq!(catalog.tags(), vec!["Fine"]);
    }

    #[test]
    fn test_unknown_curve_skipped() {
        let config: Config = toml::from_str(
            r#"
            [[preset]]
            tag = "Bouncy"
            curve = "ease-out-bounce"
            "#,
        )
        .unwrap();

        assert!(config.build_catalog().is_empty());
    }

    #[test]
    fn test_spring_table_defaults() {
        let config: Config = toml::from_str(
            r#"
            [[preset]]
            tag = "Springy"
            [preset.spring]
            "#,
        )
        .unwrap();

        let catalog = config.build_catalog();
        assert_eq!(
            catalog.get(0).unwrap().motion,
            Motion::Spring {
                damping: 0.6,
                initial_velocity: 0.7
            }
        );
    }

    #[test]
    fn test_shrink_slide_effect_has_preparation() {
        let config: Config = toml::from_str(
            r#"
            [[preset]]
            tag = "Second"
            effect = "shrink-slide"
            "#,
        )
        .unwrap();

        let catalog = config.build_catalog();
        assert!(catalog.get(0).unwrap().has_preparation());
    }

    #[test]
    fn test_error_messages_name_the_culprit() {
        let err = ConfigError::UnknownEffect("teleport".to_string());
        assert!(err.to_string().contains("teleport"));
        let err = ConfigError::UnknownCurve("wobble".to_string());
        assert!(err.to_string().contains("wobble"));
    }
}
