// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Fixed image transforms.
//!
//! The pixel work is delegated to the `image` and `imageproc` crates. Each
//! transform computes into scratch storage and writes back into the buffer
//! only once the library call has succeeded, so a failed transform leaves
//! the buffer as it was.

use crate::config::ProcessorConfig;
use crate::error::{Error, Result};
use crate::image::{Image, GREY, RGBA};
use crate::safety::contain;
use ::image::{GrayImage, RgbaImage};
use tracing::trace;

/// A transform applied in place to an image buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Canny edge map. Accepts RGBA or GREY input, leaves a GREY buffer.
    EdgeDetect { low: f32, high: f32 },
    /// Luminance. RGBA input becomes GREY; GREY input is left untouched.
    Grayscale,
    /// Canny edge map written back as opaque RGBA. Requires RGBA input.
    EdgeOverlay { low: f32, high: f32 },
}

impl Transform {
    /// Maps the integer kind used across the JNI boundary.
    ///
    /// `0` edge detection, `1` grayscale, `2` edge overlay.
    pub fn from_kind(kind: i32, config: &ProcessorConfig) -> Result<Self> {
        match kind {
            0 => Ok(config.edge_detect()),
            1 => Ok(Transform::Grayscale),
            2 => Ok(config.edge_overlay()),
            _ => Err(Error::InvalidConfig(format!("unknown transform kind {kind}"))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transform::EdgeDetect { .. } => "edge-detect",
            Transform::Grayscale => "grayscale",
            Transform::EdgeOverlay { .. } => "edge-overlay",
        }
    }

    pub fn apply(&self, img: &mut Image) -> Result<()> {
        trace!("{} on {}", self.name(), img);
        match *self {
            Transform::EdgeDetect { low, high } => {
                let gray = luma(img)?;
                let edges = canny(&gray, low, high)?;
                write_grey(img, &edges)
            }
            Transform::Grayscale => {
                if img.format() == GREY {
                    return Ok(());
                }
                let gray = luma(img)?;
                write_grey(img, &gray)
            }
            Transform::EdgeOverlay { low, high } => {
                if img.format() != RGBA {
                    return Err(Error::UnsupportedFormat {
                        found: img.format(),
                        expected: "RGBA",
                    });
                }
                let gray = luma(img)?;
                let edges = canny(&gray, low, high)?;
                write_rgba(img, &edges);
                Ok(())
            }
        }
    }
}

fn luma(img: &Image) -> Result<GrayImage> {
    let (w, h) = (img.width(), img.height());
    match img.format() {
        GREY => GrayImage::from_raw(w, h, img.to_packed())
            .ok_or_else(|| Error::ExternalLibrary("grey buffer size mismatch".into())),
        RGBA => {
            let rgba = RgbaImage::from_raw(w, h, img.to_packed())
                .ok_or_else(|| Error::ExternalLibrary("rgba buffer size mismatch".into()))?;
            contain("grayscale", || Ok(::image::imageops::grayscale(&rgba)))
        }
        found => Err(Error::UnsupportedFormat {
            found,
            expected: "RGBA or GREY",
        }),
    }
}

fn canny(gray: &GrayImage, low: f32, high: f32) -> Result<GrayImage> {
    contain("canny", || Ok(imageproc::edges::canny(gray, low, high)))
}

fn write_grey(img: &mut Image, src: &GrayImage) -> Result<()> {
    img.reshape(src.width(), src.height(), GREY)?;
    let w = src.width() as usize;
    for (row, line) in img.rows_mut().zip(src.as_raw().chunks_exact(w)) {
        row.copy_from_slice(line);
    }
    Ok(())
}

fn write_rgba(img: &mut Image, src: &GrayImage) {
    let w = src.width() as usize;
    for (row, line) in img.rows_mut().zip(src.as_raw().chunks_exact(w)) {
        for (px, &g) in row.chunks_exact_mut(4).zip(line) {
            px.copy_from_slice(&[g, g, g, 255]);
        }
    }
}
