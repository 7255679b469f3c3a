// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::image::FourCC;
use thiserror::Error;

/// Errors reported by the frame processor.
///
/// None of these are fatal to the process: the caller decides whether to
/// drop the frame or stop the pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Width or height was zero or negative.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    /// A plane or buffer could not be reached: null address, region too
    /// short for its declared layout, or a stale handle.
    #[error("buffer access error: {0}")]
    BufferAccess(String),

    /// The buffer's channel layout is not one the operation accepts.
    #[error("unsupported format {found}, expected {expected}")]
    UnsupportedFormat {
        found: FourCC,
        expected: &'static str,
    },

    /// Pixel or row stride inconsistent with the plane's dimensions.
    #[error("invalid {plane} plane layout: {reason}")]
    InvalidStride { plane: &'static str, reason: String },

    /// The vision or graphics library failed or panicked.
    #[error("external library error: {0}")]
    ExternalLibrary(String),

    #[error("invalid texture id {0}")]
    InvalidTexture(i32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
