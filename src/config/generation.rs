use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters used to procedurally generate a map.
/// Stored with the world for reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default)]
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub water_ratio: f32,
    pub vegetation_ratio: f32,
    #[serde(default = "default_building_count")]
    pub building_count: u32,
    /// Chance per walkable tile of holding a loose item.
    #[serde(default = "default_item_density")]
    pub item_density: f32,
    #[serde(default = "default_monster_count")]
    pub monster_count: u32,
    #[serde(default = "default_npc_count")]
    pub npc_count: u32,
    /// Fires lit at generation time.
    #[serde(default = "default_ignition_points")]
    pub ignition_points: u32,
    /// Scales how many vents, webs and puddles are scattered.
    #[serde(default = "default_hazard_density")]
    pub hazard_density: f32,
}

fn default_building_count() -> u32 {
    4
}

fn default_item_density() -> f32 {
    0.05
}

fn default_monster_count() -> u32 {
    6
}

fn default_npc_count() -> u32 {
    2
}

fn default_ignition_points() -> u32 {
    2
}

fn default_hazard_density() -> f32 {
    0.2
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            seed: 0,
            width: 64,
            height: 48,
            water_ratio: 0.1,
            vegetation_ratio: 0.4,
            building_count: default_building_count(),
            item_density: default_item_density(),
            monster_count: default_monster_count(),
            npc_count: default_npc_count(),
            ignition_points: default_ignition_points(),
            hazard_density: default_hazard_density(),
        }
    }
}

impl GenerationParams {
    /// Load generation parameters from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        let params: Self =
            toml::from_str(&content).map_err(|e| format!("Invalid TOML in {}: {}", path.display(), e))?;
        params.validate()?;
        Ok(params)
    }

    /// Validate parameter ranges. Reports every problem at once.
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if !(8..=512).contains(&self.width) {
            errors.push(format!("width must be 8-512, got {}. Example: width = 64", self.width));
        }
        if !(8..=512).contains(&self.height) {
            errors.push(format!("height must be 8-512, got {}. Example: height = 48", self.height));
        }
        for (key, value) in [
            ("water_ratio", self.water_ratio),
            ("vegetation_ratio", self.vegetation_ratio),
            ("item_density", self.item_density),
            ("hazard_density", self.hazard_density),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!("{} must be 0.0-1.0, got {}. Example: {} = 0.2", key, value, key));
            }
        }
        if self.building_count > 64 {
            errors.push(format!(
                "building_count must be <= 64, got {}. Example: building_count = 4",
                self.building_count
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}
