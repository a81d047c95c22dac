//! Configuration System
//!
//! Loads scenario parameters from tuning.toml and validates them eagerly,
//! before any entity is spawned. The compiled-in defaults reproduce the
//! campus-protest scenario the model was calibrated on.

use bevy_ecs::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::components::agent::Category;
use crate::components::grid::Region;

/// Default scenario file path.
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub grid: GridConfig,
    pub population: PopulationConfig,
    pub movement: MovementConfig,
    pub unrest: UnrestConfig,
    pub legitimacy: LegitimacyConfig,
    pub schedule: ScheduleConfig,
    pub reporting: ReportingConfig,
    pub desires: DesireConfig,
    pub layout: LayoutConfig,
}

/// Arena dimensions.
#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    pub toroidal: bool,
}

/// Population counts and citizen-kind mix.
#[derive(Debug, Clone, Deserialize)]
pub struct PopulationConfig {
    pub citizens: usize,
    pub media: usize,
    pub hardcore_density: f32,
    pub hanger_on_density: f32,
    pub observer_density: f32,
}

/// Movement and perception parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct MovementConfig {
    pub vision_radius: i32,
    /// Probability of overriding the rational move with a random one.
    pub move_fallibility: f32,
    /// Largest allowed desire-weight magnitude.
    pub desire_bound: f32,
}

/// Grievance/risk parameters for the citizen state machine.
#[derive(Debug, Clone, Deserialize)]
pub struct UnrestConfig {
    /// Calibrated so a 2:1 enforcer-to-protester ratio reads as roughly a
    /// 0.9 perceived arrest chance.
    pub arrest_constant: f32,
    /// Activation threshold for the grievance-vs-risk comparison.
    pub threshold: f32,
    /// Fight length before an arrest completes.
    pub arrest_delay: i32,
    /// Base jail term in ticks; multiplied by prior arrests.
    pub jail_time_base: u32,
}

/// Sensitivity of citizen legitimacy to day-over-day trends.
#[derive(Debug, Clone, Deserialize)]
pub struct LegitimacyConfig {
    pub jailed_sensitivity: f32,
    pub pictures_sensitivity: f32,
    pub enforcers_sensitivity: f32,
}

/// Run length.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    pub ticks_per_day: u64,
    pub max_days: u64,
}

/// Thresholds for the quiet-streak counters, as fractions of the citizen
/// population.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    pub protest_fraction: f32,
    pub conflict_fraction: f32,
}

/// Default desire vectors per agent kind, in slot order
/// [violent, active, quiet, enforcer, media, flag, obstacle].
#[derive(Debug, Clone, Deserialize)]
pub struct DesireConfig {
    pub hardcore: [f32; Category::COUNT],
    pub hanger_on: [f32; Category::COUNT],
    pub observer: [f32; Category::COUNT],
    pub enforcer: [f32; Category::COUNT],
    pub media: [f32; Category::COUNT],
}

/// Placement areas for objects and agents.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Where citizens and media spawn, and where released citizens return.
    pub agent_region: Region,
    pub obstacle_regions: Vec<Region>,
    pub flag_regions: Vec<Region>,
    /// One enforcer per cell of these regions.
    pub enforcer_regions: Vec<Region>,
    /// Whether enforcers hold their cordon positions permanently.
    pub enforcers_frozen: bool,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default path, or use defaults if the
    /// file is missing.
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_TUNING_PATH).unwrap_or_else(|e| {
            eprintln!("Warning: Could not load {}: {}. Using defaults.", DEFAULT_TUNING_PATH, e);
            Self::default()
        })
    }

    /// Check every construction-time invariant. Called by [`Config::load`];
    /// callers building a `Config` in code run it themselves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let densities = self.population.hardcore_density
            + self.population.hanger_on_density
            + self.population.observer_density;
        if (densities - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Densities(densities));
        }

        if self.movement.vision_radius < 1 {
            return Err(ConfigError::VisionRadius(self.movement.vision_radius));
        }
        if !(0.0..=1.0).contains(&self.movement.move_fallibility) {
            return Err(ConfigError::Fallibility(self.movement.move_fallibility));
        }

        for (kind, weights) in [
            ("hardcore", &self.desires.hardcore),
            ("hanger_on", &self.desires.hanger_on),
            ("observer", &self.desires.observer),
            ("enforcer", &self.desires.enforcer),
            ("media", &self.desires.media),
        ] {
            for &value in weights.iter() {
                if value.abs() > self.movement.desire_bound {
                    return Err(ConfigError::DesireBound {
                        kind: kind.to_string(),
                        value,
                        bound: self.movement.desire_bound,
                    });
                }
            }
        }

        let mut regions: Vec<Region> = vec![self.layout.agent_region];
        regions.extend(&self.layout.obstacle_regions);
        regions.extend(&self.layout.flag_regions);
        regions.extend(&self.layout.enforcer_regions);
        for region in regions {
            let corners_ok = region.x0 >= 0
                && region.y0 >= 0
                && region.x1 < self.grid.width
                && region.y1 < self.grid.height
                && region.x0 <= region.x1
                && region.y0 <= region.y1;
            if !corners_ok {
                return Err(ConfigError::RegionOutOfBounds {
                    region,
                    width: self.grid.width,
                    height: self.grid.height,
                });
            }
        }

        let objects: usize = self
            .layout
            .obstacle_regions
            .iter()
            .chain(&self.layout.flag_regions)
            .map(Region::cell_count)
            .sum();
        let population =
            self.population.citizens + self.population.media + self.enforcer_count() + objects;
        let capacity = (self.grid.width as usize) * (self.grid.height as usize);
        if population > capacity {
            return Err(ConfigError::Overcrowded {
                population,
                capacity,
            });
        }

        // Citizens and media all spawn inside the agent region.
        let scattered = self.population.citizens + self.population.media;
        let region_capacity = self.layout.agent_region.cell_count();
        if scattered > region_capacity {
            return Err(ConfigError::Overcrowded {
                population: scattered,
                capacity: region_capacity,
            });
        }

        Ok(())
    }

    /// One enforcer is deployed per cell of the enforcer regions.
    pub fn enforcer_count(&self) -> usize {
        self.layout.enforcer_regions.iter().map(Region::cell_count).sum()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig {
                width: 120,
                height: 50,
                toroidal: true,
            },
            population: PopulationConfig {
                citizens: 400,
                media: 5,
                hardcore_density: 0.1,
                hanger_on_density: 0.5,
                observer_density: 0.4,
            },
            movement: MovementConfig {
                vision_radius: 2,
                move_fallibility: 0.1,
                desire_bound: 5.0,
            },
            unrest: UnrestConfig {
                arrest_constant: 1.15,
                threshold: 0.1,
                arrest_delay: 5,
                jail_time_base: 10,
            },
            legitimacy: LegitimacyConfig {
                jailed_sensitivity: 3.0,
                pictures_sensitivity: 2.0,
                enforcers_sensitivity: 1.0,
            },
            schedule: ScheduleConfig {
                ticks_per_day: 24,
                max_days: 10,
            },
            reporting: ReportingConfig {
                protest_fraction: 0.05,
                conflict_fraction: 0.02,
            },
            desires: DesireConfig {
                hardcore: [5.0, 2.0, 0.0, 4.0, 3.0, 5.0, -1.0],
                hanger_on: [1.0, 1.0, 0.0, 1.0, 3.0, 1.0, -1.0],
                observer: [-1.0, -1.0, 0.0, -1.0, 3.0, 0.0, -1.0],
                enforcer: [2.0, 1.0, 0.0, 5.0, 0.0, 5.0, 0.0],
                media: [3.0, 1.0, -1.0, 3.0, 2.0, 2.0, -1.0],
            },
            layout: LayoutConfig {
                agent_region: Region::new(20, 100, 9, 40),
                obstacle_regions: vec![Region::new(25, 50, 0, 8), Region::new(70, 95, 0, 8)],
                flag_regions: vec![Region::new(51, 69, 0, 8)],
                enforcer_regions: vec![Region::new(55, 65, 9, 13), Region::new(57, 63, 14, 15)],
                enforcers_frozen: false,
            },
        }
    }
}

/// Fatal configuration errors, detected before any simulation step runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("citizen kind densities must sum to 1 (got {0})")]
    Densities(f32),
    #[error("vision radius must be at least 1 (got {0})")]
    VisionRadius(i32),
    #[error("move fallibility must lie in [0, 1] (got {0})")]
    Fallibility(f32),
    #[error("{kind} desire weight {value} exceeds the configured bound {bound}")]
    DesireBound { kind: String, value: f32, bound: f32 },
    #[error("region {region:?} falls outside the {width}x{height} grid")]
    RegionOutOfBounds {
        region: Region,
        width: i32,
        height: i32,
    },
    #[error("population of {population} exceeds grid capacity {capacity}")]
    Overcrowded { population: usize, capacity: usize },
}

/// Resource: the scenario parameters the tick systems read every step,
/// distilled from [`Config`] at construction.
#[derive(Resource, Debug, Clone)]
pub struct SimParams {
    pub vision_radius: i32,
    pub move_fallibility: f32,
    pub arrest_constant: f32,
    pub arrest_delay: i32,
    pub jail_time_base: u32,
    pub ticks_per_day: u64,
    pub jailed_sensitivity: f32,
    pub pictures_sensitivity: f32,
    pub enforcers_sensitivity: f32,
    pub protest_fraction: f32,
    pub conflict_fraction: f32,
    pub agent_region: Region,
    /// The model-wide hardcore vector, substituted wholesale when milder
    /// kinds escalate to violence.
    pub hardcore_desires: [f32; Category::COUNT],
}

impl SimParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            vision_radius: config.movement.vision_radius,
            move_fallibility: config.movement.move_fallibility,
            arrest_constant: config.unrest.arrest_constant,
            arrest_delay: config.unrest.arrest_delay,
            jail_time_base: config.unrest.jail_time_base,
            ticks_per_day: config.schedule.ticks_per_day,
            jailed_sensitivity: config.legitimacy.jailed_sensitivity,
            pictures_sensitivity: config.legitimacy.pictures_sensitivity,
            enforcers_sensitivity: config.legitimacy.enforcers_sensitivity,
            protest_fraction: config.reporting.protest_fraction,
            conflict_fraction: config.reporting.conflict_fraction,
            agent_region: config.layout.agent_region,
            hardcore_desires: config.desires.hardcore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.population.citizens, 400);
        assert_eq!(config.enforcer_count(), 69);
    }

    #[test]
    fn test_densities_must_sum_to_one() {
        let mut config = Config::default();
        config.population.observer_density = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Densities(_))
        ));
    }

    #[test]
    fn test_desire_bound_is_enforced() {
        let mut config = Config::default();
        config.desires.hardcore[0] = 6.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DesireBound { .. })
        ));
    }

    #[test]
    fn test_population_must_fit_grid() {
        let mut config = Config::default();
        config.population.citizens = 10_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Overcrowded { .. })
        ));
    }

    #[test]
    fn test_regions_must_fit_grid() {
        let mut config = Config::default();
        config.layout.flag_regions.push(Region::new(0, 200, 0, 5));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RegionOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_load_config_file() {
        // This test requires the tuning.toml file to exist
        if Path::new(DEFAULT_TUNING_PATH).exists() {
            let config = Config::load(DEFAULT_TUNING_PATH).unwrap();
            assert!(config.schedule.max_days > 0);
        }
    }
}
