// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Planar YUV 4:2:0 to packed RGBA conversion.
//!
//! Camera frames arrive as three planes, each with its own pixel stride and
//! row stride. Fully planar I420 has a pixel stride of 1 on every plane;
//! semi-planar NV12/NV21 is expressed as two chroma views into the same
//! interleaved memory with a pixel stride of 2.

use crate::error::{Error, Result};
use crate::image::{Image, RGBA};

/// A borrowed plane of 8-bit samples.
///
/// Sample (`col`, `row`) lives at `row * row_stride + col * pixel_stride`.
/// The slice only needs to reach the last sample: camera stacks commonly
/// omit the padding after the final row.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    data: &'a [u8],
    pixel_stride: usize,
    row_stride: usize,
}

impl<'a> Plane<'a> {
    pub fn new(data: &'a [u8], pixel_stride: usize, row_stride: usize) -> Self {
        Self {
            data,
            pixel_stride,
            row_stride,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Bytes spanned by `cols` samples of one row.
    fn row_span(&self, cols: usize) -> Option<usize> {
        (cols - 1).checked_mul(self.pixel_stride)?.checked_add(1)
    }

    /// Bytes needed to address `cols` x `rows` samples with this layout.
    fn required_len(&self, cols: usize, rows: usize) -> Option<usize> {
        (rows - 1)
            .checked_mul(self.row_stride)?
            .checked_add(self.row_span(cols)?)
    }

    fn check(&self, name: &'static str, cols: usize, rows: usize) -> Result<()> {
        if self.pixel_stride == 0 {
            return Err(Error::InvalidStride {
                plane: name,
                reason: "pixel stride is zero".into(),
            });
        }
        let overflow = || {
            Error::BufferAccess(format!(
                "{name} plane layout for {cols}x{rows} samples exceeds the address space"
            ))
        };
        // A row stride shorter than the span of one row would make rows
        // overlap; reject it rather than read neighbouring rows.
        let span = self.row_span(cols).ok_or_else(overflow)?;
        if rows > 1 && self.row_stride < span {
            return Err(Error::InvalidStride {
                plane: name,
                reason: format!("row stride {} shorter than row span {}", self.row_stride, span),
            });
        }
        let need = self.required_len(cols, rows).ok_or_else(overflow)?;
        if self.data.len() < need {
            return Err(Error::BufferAccess(format!(
                "{} plane holds {} bytes, {}x{} samples need {}",
                name,
                self.data.len(),
                cols,
                rows,
                need
            )));
        }
        Ok(())
    }

    #[inline]
    fn sample(&self, col: usize, row: usize) -> u8 {
        self.data[row * self.row_stride + col * self.pixel_stride]
    }
}

/// A validated planar 4:2:0 frame.
///
/// Construction checks every plane against the frame geometry, so
/// conversion never indexes out of bounds.
#[derive(Debug, Clone, Copy)]
pub struct PlanarFrame<'a> {
    width: u32,
    height: u32,
    y: Plane<'a>,
    u: Plane<'a>,
    v: Plane<'a>,
}

impl<'a> PlanarFrame<'a> {
    /// Validates the planes against a `width` x `height` frame.
    ///
    /// Chroma planes cover `ceil(width / 2)` x `ceil(height / 2)` samples.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] if either dimension is not positive
    /// - [`Error::InvalidStride`] if a stride cannot describe the plane
    /// - [`Error::BufferAccess`] if a plane is too short for its layout
    pub fn new(width: i32, height: i32, y: Plane<'a>, u: Plane<'a>, v: Plane<'a>) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidDimensions {
                width: width.into(),
                height: height.into(),
            });
        }
        let (w, h) = (width as usize, height as usize);
        let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
        y.check("Y", w, h)?;
        u.check("U", cw, ch)?;
        v.check("V", cw, ch)?;
        Ok(Self {
            width: width as u32,
            height: height as u32,
            y,
            u,
            v,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn y(&self) -> &Plane<'a> {
        &self.y
    }

    pub fn u(&self) -> &Plane<'a> {
        &self.u
    }

    pub fn v(&self) -> &Plane<'a> {
        &self.v
    }
}

/// Converts one full-range BT.601 (JFIF) sample triple to RGBA.
///
/// Coefficients are 10-bit fixed point:
/// R = Y + 1.402 (V - 128), G = Y - 0.344 (U - 128) - 0.714 (V - 128),
/// B = Y + 1.772 (U - 128). Alpha is always 255.
#[inline]
pub fn yuv_to_rgba(y: u8, u: u8, v: u8) -> [u8; 4] {
    let y = i32::from(y);
    let u = i32::from(u) - 128;
    let v = i32::from(v) - 128;
    let r = y + ((1436 * v) >> 10);
    let g = y - ((352 * u + 731 * v) >> 10);
    let b = y + ((1815 * u) >> 10);
    [
        r.clamp(0, 255) as u8,
        g.clamp(0, 255) as u8,
        b.clamp(0, 255) as u8,
        255,
    ]
}

/// Converts `frame` into `dst`, which must be an RGBA image of the same
/// dimensions.
///
/// Chroma is upsampled by integer division of the output coordinate; no
/// interpolation. Only the pixel bytes of each destination row are
/// written, never its padding.
pub fn convert_planar_to_packed(frame: &PlanarFrame, dst: &mut Image) -> Result<()> {
    if dst.format() != RGBA {
        return Err(Error::UnsupportedFormat {
            found: dst.format(),
            expected: "RGBA",
        });
    }
    if dst.width() != frame.width || dst.height() != frame.height {
        return Err(Error::InvalidDimensions {
            width: dst.width().into(),
            height: dst.height().into(),
        });
    }

    for (row, out) in dst.rows_mut().enumerate() {
        let crow = row / 2;
        for (col, px) in out.chunks_exact_mut(4).enumerate() {
            let ccol = col / 2;
            px.copy_from_slice(&yuv_to_rgba(
                frame.y.sample(col, row),
                frame.u.sample(ccol, crow),
                frame.v.sample(ccol, crow),
            ));
        }
    }
    Ok(())
}
