//! Conversion settings loaded from defaults, an optional JSON file and
//! environment overrides.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use litho_imaging::contrast::{DEFAULT_CLIP_LIMIT, DEFAULT_TILE_SIZE};
use litho_imaging::{FilterSettings, PreprocessProfile};
use litho_mesh::{Interpolation, Shape, ThicknessRange};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ConvertError;

pub const ENV_MIN_THICKNESS: &str = "LITHO_MIN_THICKNESS";
pub const ENV_MAX_THICKNESS: &str = "LITHO_MAX_THICKNESS";
pub const ENV_GAMMA: &str = "LITHO_GAMMA";
pub const ENV_PROFILE: &str = "LITHO_PROFILE";
pub const ENV_SHAPE: &str = "LITHO_SHAPE";
pub const ENV_INTERPOLATION: &str = "LITHO_INTERPOLATION";

/// Settings for one conversion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LithoConfig {
    pub min_thickness_mm: f64,
    pub max_thickness_mm: f64,
    /// Thickness-curve gamma.
    pub gamma: f64,
    /// Gamma of the profile's gamma step; follows `gamma` when unset.
    pub preprocess_gamma: Option<f64>,
    pub preprocess_profile: PreprocessProfile,
    /// Local contrast histogram clip limit, in pixel counts per bin.
    pub clip_limit: f64,
    /// Local contrast tile edge length in pixels.
    pub tile_size: u32,
    pub interpolation: Interpolation,
    pub shape: Shape,
}

impl Default for LithoConfig {
    fn default() -> Self {
        Self {
            min_thickness_mm: 0.8,
            max_thickness_mm: 3.0,
            gamma: 1.2,
            preprocess_gamma: None,
            preprocess_profile: PreprocessProfile::default(),
            clip_limit: DEFAULT_CLIP_LIMIT,
            tile_size: DEFAULT_TILE_SIZE,
            interpolation: Interpolation::default(),
            shape: Shape::default(),
        }
    }
}

impl LithoConfig {
    /// Defaults or `path`, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let mut config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, anyhow::Error> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply `LITHO_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Unparsable values are logged
    /// and skipped.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_MIN_THICKNESS) {
            override_parsed(ENV_MIN_THICKNESS, &v, &mut self.min_thickness_mm);
        }
        if let Some(v) = get(ENV_MAX_THICKNESS) {
            override_parsed(ENV_MAX_THICKNESS, &v, &mut self.max_thickness_mm);
        }
        if let Some(v) = get(ENV_GAMMA) {
            override_parsed(ENV_GAMMA, &v, &mut self.gamma);
        }
        if let Some(v) = get(ENV_PROFILE) {
            override_parsed(ENV_PROFILE, &v, &mut self.preprocess_profile);
        }
        if let Some(v) = get(ENV_INTERPOLATION) {
            match v.trim().to_ascii_lowercase().as_str() {
                "bicubic" => self.interpolation = Interpolation::Bicubic,
                "bilinear" => self.interpolation = Interpolation::Bilinear,
                other => warn!(key = ENV_INTERPOLATION, value = other, "Ignoring override"),
            }
        }
        if let Some(v) = get(ENV_SHAPE) {
            match v.parse::<Shape>() {
                // Same topology keeps the configured dimensions
                Ok(shape) if shape.kind() == self.shape.kind() => {}
                Ok(shape) => self.shape = shape,
                Err(e) => warn!(key = ENV_SHAPE, error = %e, "Ignoring override"),
            }
        }
    }

    /// Check thickness range, gammas, local contrast parameters and geometry.
    pub fn validate(&self) -> Result<(), ConvertError> {
        self.thickness_range()?;
        if let Some(g) = self
            .preprocess_gamma
            .filter(|g| !(g.is_finite() && *g > 0.0))
        {
            return Err(ConvertError::InvalidRange(format!(
                "preprocess gamma must be positive, got {g}"
            )));
        }
        if self.clip_limit.is_nan() || self.clip_limit <= 0.0 {
            return Err(ConvertError::InvalidRange(format!(
                "clip limit must be positive, got {}",
                self.clip_limit
            )));
        }
        if self.tile_size == 0 {
            return Err(ConvertError::InvalidRange(
                "tile size must be at least 1".into(),
            ));
        }
        self.shape.validate()?;
        Ok(())
    }

    pub fn thickness_range(&self) -> Result<ThicknessRange, ConvertError> {
        Ok(ThicknessRange::new(
            self.min_thickness_mm,
            self.max_thickness_mm,
            self.gamma,
        )?)
    }

    /// Filter parameters for the preprocessing profile.
    pub fn filter_settings(&self) -> FilterSettings {
        FilterSettings::new()
            .with_gamma(self.preprocess_gamma.unwrap_or(self.gamma))
            .with_local_contrast(self.clip_limit, self.tile_size)
    }
}

fn override_parsed<T>(key: &str, value: &str, target: &mut T)
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match value.trim().parse::<T>() {
        Ok(parsed) => {
            debug!(key, ?parsed, "Applied override");
            *target = parsed;
        }
        Err(e) => warn!(key, value, error = %e, "Ignoring override"),
    }
}

/// Load .env from `.env` or `../.env`, whichever exists first.
///
/// Meant to run before logging is set up; the loaded path is returned so the
/// caller can log it once a subscriber exists.
pub fn load_dotenv() -> Option<PathBuf> {
    load_dotenv_from(&[Path::new(".env"), Path::new("../.env")])
}

/// Load the first candidate .env file that exists. Variables already set in
/// the environment win over the file.
pub fn load_dotenv_from(candidates: &[&Path]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|path| dotenvy::from_filename(path).is_ok())
        .map(|path| path.to_path_buf())
}
