// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::{Error, Result};
use crate::image::DEFAULT_ROW_ALIGNMENT;
use crate::transform::Transform;

/// Tunable parameters of the frame processor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    /// Canny hysteresis thresholds (low, high) for edge detection.
    pub edge_thresholds: (f32, f32),
    /// Canny hysteresis thresholds (low, high) for the RGBA edge overlay.
    pub overlay_thresholds: (f32, f32),
    /// Row alignment in bytes of buffers allocated by the registry.
    pub row_alignment: usize,
    /// JPEG quality (1-100) for snapshots.
    pub jpeg_quality: i32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            edge_thresholds: (100.0, 200.0),
            overlay_thresholds: (50.0, 150.0),
            row_alignment: DEFAULT_ROW_ALIGNMENT,
            jpeg_quality: 90,
        }
    }
}

fn check_thresholds(name: &str, (low, high): (f32, f32)) -> Result<()> {
    if !(low.is_finite() && high.is_finite()) || low < 0.0 || low > high {
        return Err(Error::InvalidConfig(format!(
            "{name} thresholds must satisfy 0 <= low <= high, got {low}/{high}"
        )));
    }
    Ok(())
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<()> {
        check_thresholds("edge", self.edge_thresholds)?;
        check_thresholds("overlay", self.overlay_thresholds)?;
        if self.row_alignment == 0 || !self.row_alignment.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "row alignment must be a power of two, got {}",
                self.row_alignment
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::InvalidConfig(format!(
                "jpeg quality must be within 1-100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    pub fn edge_detect(&self) -> Transform {
        let (low, high) = self.edge_thresholds;
        Transform::EdgeDetect { low, high }
    }

    pub fn edge_overlay(&self) -> Transform {
        let (low, high) = self.overlay_thresholds;
        Transform::EdgeOverlay { low, high }
    }
}
