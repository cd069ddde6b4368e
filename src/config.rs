use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub explore: ExploreConfig,
    pub metrics: NodeMetrics,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config JSON in {}", path.display()))?;
        Ok(config)
    }
}

/// Force model parameters. Lengths are in view points, times in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Rest length shared by every edge between an endpoint and its label anchor.
    pub rest_length: f32,
    /// Stiffness of the direct source to destination spring relative to the
    /// anchor springs.
    pub cohesion_ratio: f32,
    pub spring_stiffness: f32,
    pub spring_damping: f32,
    pub repulsion: f32,
    pub softening: f32,
    pub collision_strength: f32,
    /// Velocity retained per 1/60 s.
    pub velocity_damping: f32,
    /// Fraction of the normal velocity kept when bouncing off the boundary.
    pub boundary_elasticity: f32,
    pub max_force: f32,
    pub max_speed: f32,
    pub node_mass: f32,
    pub anchor_mass: f32,
    pub center_pull: f32,
    pub jitter: [f32; 2],
    pub tick_rate: f32,
    pub substeps: u32,
    pub max_catch_up_ticks: u32,
    /// Top, right, bottom, left.
    pub safe_area: [f32; 4],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rest_length: 128.0,
            cohesion_ratio: 0.35,
            spring_stiffness: 12.0,
            spring_damping: 2.0,
            repulsion: 1_500_000.0,
            softening: 620.0,
            collision_strength: 30.0,
            velocity_damping: 0.94,
            boundary_elasticity: 0.5,
            max_force: 4_000.0,
            max_speed: 600.0,
            node_mass: 1.0,
            anchor_mass: 0.5,
            center_pull: 0.05,
            jitter: [250.0, 50.0],
            tick_rate: 5.0,
            substeps: 6,
            max_catch_up_ticks: 3,
            safe_area: [0.0; 4],
        }
    }
}

impl LayoutConfig {
    pub fn tick_interval(&self) -> f32 {
        1.0 / self.tick_rate.clamp(0.5, 120.0)
    }
}

/// Sample sizes requested from the data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExploreConfig {
    pub initial_limit: usize,
    pub expand_limit: usize,
    pub member_limit: usize,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            initial_limit: 20,
            expand_limit: 5,
            member_limit: 3,
        }
    }
}

/// Label box geometry used for collision and hit testing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetrics {
    pub char_width: f32,
    pub height: f32,
    pub padding: f32,
    pub max_width: f32,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            char_width: 11.0,
            height: 40.0,
            padding: 16.0,
            max_width: 272.0,
        }
    }
}

impl NodeMetrics {
    pub fn half_size(&self, label: &str) -> Vec2 {
        let text_width = label.chars().count() as f32 * self.char_width;
        let width = (text_width + self.padding * 2.0).clamp(self.height, self.max_width);
        vec2(width, self.height) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{ "layout": {{ "tick_rate": 10.0 }}, "explore": {{ "member_limit": 7 }} }}"#
        )
        .expect("write config");

        let config = Config::load(file.path()).expect("config loads");
        assert_eq!(config.layout.tick_rate, 10.0);
        assert_eq!(config.layout.rest_length, 128.0);
        assert_eq!(config.explore.member_limit, 7);
        assert_eq!(config.explore.initial_limit, 20);
        assert_eq!(config.metrics, NodeMetrics::default());
    }

    #[test]
    fn invalid_config_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write config");

        let error = Config::load(file.path()).expect_err("config is rejected");
        assert!(format!("{error:#}").contains("invalid config JSON"));
    }

    #[test]
    fn label_boxes_are_clamped() {
        let metrics = NodeMetrics::default();
        assert_eq!(metrics.half_size("").x, metrics.height * 0.5);
        assert_eq!(metrics.half_size(&"x".repeat(500)).x, metrics.max_width * 0.5);
        assert_eq!(metrics.half_size("abc").y, metrics.height * 0.5);
    }

    #[test]
    fn tick_interval_follows_rate() {
        let config = LayoutConfig::default();
        assert!((config.tick_interval() - 0.2).abs() < 1e-6);
    }
}
