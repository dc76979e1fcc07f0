//! Configuration for implore-volume
//!
//! Defaults for new representations and for histogram computation.

use implore_formats::{DataFormatId, Size3};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, VolumeResult};
use crate::factory::create_volume;
use crate::meta::{InterpolationType, SwizzleMask, VolumeMetadata, Wrapping3D};
use crate::representation::VolumeRepresentation;

/// Dimensions of a representation created without explicit size
pub const DEFAULT_DIMENSIONS: Size3 = Size3::splat(128);

/// Histogram bin count used when none is given
pub const DEFAULT_HISTOGRAM_BINS: usize = 2048;

/// Volume configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeConfig {
    /// Defaults for new representations
    pub representation: RepresentationConfig,
    /// Histogram computation settings
    pub histogram: HistogramConfig,
}

/// Representation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentationConfig {
    pub dimensions: Size3,
    pub format: DataFormatId,
    /// Channel remapping; chosen from the format's channel count when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swizzle_mask: Option<SwizzleMask>,
    pub interpolation: InterpolationType,
    pub wrapping: Wrapping3D,
}

impl Default for RepresentationConfig {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            format: DataFormatId::UInt8,
            swizzle_mask: None,
            interpolation: InterpolationType::Linear,
            wrapping: Wrapping3D::clamp_all(),
        }
    }
}

impl RepresentationConfig {
    pub fn metadata(&self) -> VolumeMetadata {
        let swizzle_mask = self.swizzle_mask.unwrap_or_else(|| {
            SwizzleMask::default_for(self.format.format().map_or(4, |f| f.components))
        });
        VolumeMetadata::new(swizzle_mask, self.interpolation, self.wrapping)
    }
}

/// Histogram settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramConfig {
    /// Number of bins per channel
    pub bins: usize,
    /// Voxel stride along each axis
    pub sample_rate: Size3,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: DEFAULT_HISTOGRAM_BINS,
            sample_rate: Size3::splat(1),
        }
    }
}

impl VolumeConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.representation.format == DataFormatId::NotSpecialized {
            return Err(ConfigError::UnsupportedFormat(
                "representation format must be specialized".to_string(),
            ));
        }

        if self.representation.dimensions.product() == 0 {
            return Err(ConfigError::OutOfRange(format!(
                "dimensions must be non-zero, got {}",
                self.representation.dimensions
            )));
        }

        if self.histogram.bins == 0 {
            return Err(ConfigError::OutOfRange(
                "histogram bins must be positive".to_string(),
            ));
        }

        if self.histogram.sample_rate.product() == 0 {
            return Err(ConfigError::OutOfRange(
                "histogram sample rate must be at least 1 on every axis".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate, then create a zero-filled representation from the defaults
    pub fn create_volume(&self) -> VolumeResult<Box<dyn VolumeRepresentation>> {
        self.validate()?;
        let rep = &self.representation;
        create_volume(rep.dimensions, rep.format, None, rep.metadata())
    }
}
