//! Named preprocessing profiles.
//!
//! A profile is a fixed, ordered list of filter steps. Steps run strictly in
//! order and each consumes the complete output of the previous one.

use std::fmt;
use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ImagingError, Result, contrast, denoise, gamma, sharpen};

/// One stage of a preprocessing profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStep {
    Denoise,
    LocalContrast,
    Sharpen,
    GammaCorrect,
}

const NONE_STEPS: &[FilterStep] = &[];
const BASIC_STEPS: &[FilterStep] = &[FilterStep::Denoise, FilterStep::Sharpen];
const PORTRAIT_STEPS: &[FilterStep] = &[
    FilterStep::Denoise,
    FilterStep::LocalContrast,
    FilterStep::Sharpen,
    FilterStep::GammaCorrect,
];
const TECHNICAL_STEPS: &[FilterStep] = &[
    FilterStep::Denoise,
    FilterStep::Sharpen,
    FilterStep::GammaCorrect,
];

/// Preprocessing profile selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessProfile {
    /// Raw image, no filtering.
    None,
    /// Denoise + sharpen.
    Basic,
    /// Denoise, local contrast, sharpen, gamma.
    #[default]
    Portrait,
    /// Denoise, sharpen, gamma; suited to line art.
    Technical,
}

impl PreprocessProfile {
    pub const ALL: [PreprocessProfile; 4] = [
        PreprocessProfile::None,
        PreprocessProfile::Basic,
        PreprocessProfile::Portrait,
        PreprocessProfile::Technical,
    ];

    /// Filter steps of this profile, in execution order.
    pub fn steps(self) -> &'static [FilterStep] {
        match self {
            PreprocessProfile::None => NONE_STEPS,
            PreprocessProfile::Basic => BASIC_STEPS,
            PreprocessProfile::Portrait => PORTRAIT_STEPS,
            PreprocessProfile::Technical => TECHNICAL_STEPS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PreprocessProfile::None => "none",
            PreprocessProfile::Basic => "basic",
            PreprocessProfile::Portrait => "portrait",
            PreprocessProfile::Technical => "technical",
        }
    }
}

impl fmt::Display for PreprocessProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PreprocessProfile {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ImagingError::UnknownProfile(s.to_string()))
    }
}

/// Parameters used by the individual filter steps.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    pub median_kernel: u32,
    pub clip_limit: f64,
    pub tile_size: u32,
    pub sharpen_amount: f64,
    pub sharpen_radius: f64,
    pub gamma: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            median_kernel: denoise::DEFAULT_KERNEL_SIZE,
            clip_limit: contrast::DEFAULT_CLIP_LIMIT,
            tile_size: contrast::DEFAULT_TILE_SIZE,
            sharpen_amount: sharpen::DEFAULT_AMOUNT,
            sharpen_radius: sharpen::DEFAULT_RADIUS,
            gamma: 1.0,
        }
    }
}

impl FilterSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the gamma used by the gamma step.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Builder: set the local contrast clip limit and tile size.
    pub fn with_local_contrast(mut self, clip_limit: f64, tile_size: u32) -> Self {
        self.clip_limit = clip_limit;
        self.tile_size = tile_size;
        self
    }
}

/// Run a single filter step.
pub fn apply_step(img: &RgbaImage, step: FilterStep, settings: &FilterSettings) -> Result<RgbaImage> {
    match step {
        FilterStep::Denoise => denoise::median_filter(img, settings.median_kernel),
        FilterStep::LocalContrast => {
            contrast::equalize_local(img, settings.clip_limit, settings.tile_size)
        }
        FilterStep::Sharpen => {
            sharpen::unsharp_mask(img, settings.sharpen_amount, settings.sharpen_radius)
        }
        FilterStep::GammaCorrect => gamma::gamma_correct(img, settings.gamma),
    }
}

/// Run every step of `profile` in order.
///
/// The `none` profile returns a copy of the input.
pub fn preprocess(
    img: &RgbaImage,
    profile: PreprocessProfile,
    settings: &FilterSettings,
) -> Result<RgbaImage> {
    debug!(profile = profile.name(), steps = ?profile.steps(), "Running preprocess profile");

    let mut current = img.clone();
    for &step in profile.steps() {
        current = apply_step(&current, step, settings)?;
    }
    Ok(current)
}
