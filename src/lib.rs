// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # RTEDV Frame Processor
//!
//! Native side of the real-time edge detection viewer. Camera frames arrive
//! from the Android application as planar YUV 4:2:0, are converted into
//! recycled RGBA buffers, run through a fixed transform, and are uploaded
//! into a GL texture for display.
//!
//! ## Features
//!
//! - **Buffer Registry**: Buffers are owned by a [`registry::BufferRegistry`]
//!   and referred to by opaque handles, so stale handles are rejected
//!   instead of dereferenced.
//! - **Stride-Aware Conversion**: Planar and semi-planar YUV with arbitrary
//!   pixel and row strides is converted without ever reading padding.
//! - **Transforms**: Canny edge detection and grayscale via the `image` and
//!   `imageproc` crates.
//! - **Texture Upload**: OpenGL ES 2.0 upload of RGBA and luminance buffers.
//! - **Throughput Counters**: Frame count and processing time shared between
//!   the capture and UI threads.
//!
//! ## Example
//!
//! ```
//! use rtedv_processor::{
//!     planar::{Plane, PlanarFrame},
//!     registry::BufferRegistry,
//!     transform::Transform,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (y, uv) = (vec![255u8; 64 * 48], vec![128u8; 32 * 24]);
//! let frame = PlanarFrame::new(
//!     64,
//!     48,
//!     Plane::new(&y, 1, 64),
//!     Plane::new(&uv, 1, 32),
//!     Plane::new(&uv, 1, 32),
//! )?;
//!
//! let registry = BufferRegistry::new();
//! let handle = registry.convert_frame(None, &frame)?;
//! registry.apply(handle, &Transform::Grayscale)?;
//! assert_eq!(registry.dimensions(handle)?, (64, 48));
//! registry.release(handle)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Safety
//!
//! `unsafe` is confined to the JNI bridge (direct `ByteBuffer` access) and
//! the GLES bindings. Every JNI entry point contains panics and reports
//! failures as Java exceptions.

pub mod bridge;
pub mod config;
pub mod error;
pub mod image;
pub mod planar;
pub mod registry;
pub mod safety;
pub mod stats;
pub mod texture;
pub mod transform;

pub use error::{Error, Result};
