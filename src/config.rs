use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::events::NodeKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("`{field}` must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("`{field}` must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("ring for `{category}` has an invalid band [{inner}, {outer}]")]
    InvalidRing {
        category: String,
        inner: f32,
        outer: f32,
    },
    #[error("ring `{category}` is listed more than once")]
    DuplicateRing { category: String },
    #[error("rings `{first}` and `{second}` overlap")]
    OverlappingRings { first: String, second: String },
}

/// An explicit radius band for one category.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RingSpec {
    pub category: String,
    pub inner: f32,
    pub outer: f32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// When empty, every category gets a `ring_width` band in first-appearance order.
    pub rings: Vec<RingSpec>,
    pub center_radius: f32,
    pub ring_width: f32,
    pub placement: PlacementConfig,
    pub relaxation: RelaxationConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rings: Vec::new(),
            center_radius: 0.0,
            ring_width: 200.0,
            placement: PlacementConfig::default(),
            relaxation: RelaxationConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Keeps resting radii away from the ring boundaries.
    pub margin: f32,
    /// Distance of `major` nodes from the outer ring edge.
    pub major_inset: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            margin: 20.0,
            major_inset: 25.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AngularAnchor {
    #[default]
    SectorMidpoint,
    RestingAngle,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct CollisionRadii {
    pub circle: f32,
    pub major: f32,
    pub timeline_trigger: f32,
    pub category_summary: f32,
}

impl CollisionRadii {
    pub fn for_kind(&self, kind: NodeKind) -> f32 {
        match kind {
            NodeKind::Circle => self.circle,
            NodeKind::Major => self.major,
            NodeKind::TimelineTrigger => self.timeline_trigger,
            NodeKind::CategorySummary => self.category_summary,
        }
    }
}

impl Default for CollisionRadii {
    fn default() -> Self {
        Self {
            circle: 12.0,
            major: 28.0,
            timeline_trigger: 16.0,
            category_summary: 20.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct RelaxationConfig {
    pub radial_strength: f32,
    pub angular_strength: f32,
    pub angular_anchor: AngularAnchor,
    /// Negative values repel.
    pub repulsion_strength: f32,
    pub collision_strength: f32,
    pub collision_radius: CollisionRadii,
    pub link_attraction: bool,
    pub link_strength: f32,
    pub link_rest_length: f32,
    pub velocity_decay: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub release_energy: f32,
    pub max_speed: f32,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            radial_strength: 0.3,
            angular_strength: 0.1,
            angular_anchor: AngularAnchor::SectorMidpoint,
            repulsion_strength: -30.0,
            collision_strength: 0.7,
            collision_radius: CollisionRadii::default(),
            link_attraction: true,
            link_strength: 0.05,
            link_rest_length: 90.0,
            velocity_decay: 0.4,
            alpha_decay: 0.0228,
            alpha_min: 0.001,
            release_energy: 0.1,
            max_speed: 40.0,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("center_radius", self.center_radius)?;
        positive("ring_width", self.ring_width)?;
        if self.center_radius < 0.0 {
            return Err(ConfigError::Negative {
                field: "center_radius",
                value: self.center_radius,
            });
        }

        let mut bands = Vec::with_capacity(self.rings.len());
        for ring in &self.rings {
            let valid = ring.inner.is_finite()
                && ring.outer.is_finite()
                && ring.inner >= 0.0
                && ring.inner < ring.outer;
            if !valid {
                return Err(ConfigError::InvalidRing {
                    category: ring.category.clone(),
                    inner: ring.inner,
                    outer: ring.outer,
                });
            }
            if bands.iter().any(|other: &&RingSpec| other.category == ring.category) {
                return Err(ConfigError::DuplicateRing {
                    category: ring.category.clone(),
                });
            }
            bands.push(ring);
        }

        bands.sort_by(|a, b| a.inner.total_cmp(&b.inner));
        for pair in bands.windows(2) {
            if let [lower, upper] = pair
                && upper.inner < lower.outer
            {
                return Err(ConfigError::OverlappingRings {
                    first: lower.category.clone(),
                    second: upper.category.clone(),
                });
            }
        }

        let placement = &self.placement;
        finite("placement.margin", placement.margin)?;
        finite("placement.major_inset", placement.major_inset)?;
        if placement.margin < 0.0 {
            return Err(ConfigError::Negative {
                field: "placement.margin",
                value: placement.margin,
            });
        }

        let relaxation = &self.relaxation;
        for (field, value) in [
            ("relaxation.radial_strength", relaxation.radial_strength),
            ("relaxation.angular_strength", relaxation.angular_strength),
            ("relaxation.repulsion_strength", relaxation.repulsion_strength),
            ("relaxation.collision_strength", relaxation.collision_strength),
            ("relaxation.link_strength", relaxation.link_strength),
            ("relaxation.link_rest_length", relaxation.link_rest_length),
            ("relaxation.release_energy", relaxation.release_energy),
        ] {
            finite(field, value)?;
        }
        if relaxation.release_energy < 0.0 {
            return Err(ConfigError::Negative {
                field: "relaxation.release_energy",
                value: relaxation.release_energy,
            });
        }
        for (field, value) in [
            ("relaxation.collision_radius.circle", relaxation.collision_radius.circle),
            ("relaxation.collision_radius.major", relaxation.collision_radius.major),
            (
                "relaxation.collision_radius.timeline_trigger",
                relaxation.collision_radius.timeline_trigger,
            ),
            (
                "relaxation.collision_radius.category_summary",
                relaxation.collision_radius.category_summary,
            ),
            ("relaxation.velocity_decay", relaxation.velocity_decay),
            ("relaxation.alpha_decay", relaxation.alpha_decay),
            ("relaxation.alpha_min", relaxation.alpha_min),
            ("relaxation.max_speed", relaxation.max_speed),
        ] {
            positive(field, value)?;
        }

        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

pub fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout config {}", path.display()))?;
    let config: LayoutConfig = serde_json::from_str(&raw)
        .with_context(|| format!("invalid layout config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("rejected layout config {}", path.display()))?;
    Ok(config)
}
