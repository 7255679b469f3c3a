// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::{Error, Result};
use core::fmt;
use tracing::debug;
use turbojpeg::OwnedBuf;

/// Four character code identifying a pixel layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// RGBA 32-bit pixel format (8 bits per channel, with alpha)
pub const RGBA: FourCC = FourCC(*b"RGBA");

/// 8-bit single channel luminance
pub const GREY: FourCC = FourCC(*b"GREY");

/// Row alignment used when none is requested.
pub const DEFAULT_ROW_ALIGNMENT: usize = 16;

/// Bytes per pixel for the packed formats an [`Image`] can hold.
pub fn bytes_per_pixel(format: FourCC) -> Result<usize> {
    match format {
        RGBA => Ok(4),
        GREY => Ok(1),
        found => Err(Error::UnsupportedFormat {
            found,
            expected: "RGBA or GREY",
        }),
    }
}

/// Row stride and total storage size for the given geometry, or
/// `InvalidDimensions` when either does not fit in `usize`.
fn layout(format: FourCC, width: u32, height: u32, alignment: usize) -> Result<(usize, usize)> {
    let bpp = bytes_per_pixel(format)?;
    (width as usize)
        .checked_mul(bpp)
        .and_then(|row| row.checked_next_multiple_of(alignment))
        .and_then(|stride| Some((stride, stride.checked_mul(height as usize)?)))
        .ok_or(Error::InvalidDimensions {
            width: width.into(),
            height: height.into(),
        })
}

fn alloc_error(len: usize, err: std::collections::TryReserveError) -> Error {
    Error::BufferAccess(format!("cannot allocate {len} bytes: {err}"))
}

/// Packed image buffer with padded rows.
///
/// Each row occupies `stride()` bytes of which the first
/// `width() * channels()` hold pixels; the remainder is padding that no
/// operation in this crate reads or writes. The buffer owns its storage and
/// frees it on drop.
///
/// # Example
///
/// ```
/// use rtedv_processor::image::{Image, RGBA};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = Image::new(1918, 1080, RGBA)?;
/// assert_eq!(img.width(), 1918);
/// assert_eq!(img.height(), 1080);
/// assert_eq!(img.stride(), 7680);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Image {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
    format: FourCC,
    alignment: usize,
}

impl Image {
    /// Allocates a zeroed image with rows aligned to
    /// [`DEFAULT_ROW_ALIGNMENT`] bytes.
    pub fn new(width: u32, height: u32, format: FourCC) -> Result<Self> {
        Self::with_alignment(width, height, format, DEFAULT_ROW_ALIGNMENT)
    }

    /// Allocates a zeroed image whose row stride is a multiple of
    /// `alignment` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `width` or `height` is zero
    /// - `format` is neither [`RGBA`] nor [`GREY`]
    /// - `alignment` is zero
    /// - the buffer size overflows `usize` or cannot be allocated
    pub fn with_alignment(
        width: u32,
        height: u32,
        format: FourCC,
        alignment: usize,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions {
                width: width.into(),
                height: height.into(),
            });
        }
        if alignment == 0 {
            return Err(Error::InvalidConfig("row alignment must be non-zero".into()));
        }
        let (stride, len) = layout(format, width, height, alignment)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| alloc_error(len, e))?;
        data.resize(len, 0);
        debug!("image alloc {}x{} {} stride {}", width, height, format, stride);
        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
            alignment,
        })
    }

    /// Changes the image's geometry in place.
    ///
    /// Returns `false` without touching the storage when the image already
    /// has the requested width, height and format. Otherwise the backing
    /// storage is reallocated, its contents are zeroed, and `true` is
    /// returned. The `Image` value itself is never replaced. If the new
    /// storage cannot be allocated the image is left as it was.
    pub fn reshape(&mut self, width: u32, height: u32, format: FourCC) -> Result<bool> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions {
                width: width.into(),
                height: height.into(),
            });
        }
        if self.width == width && self.height == height && self.format == format {
            return Ok(false);
        }
        let (stride, len) = layout(format, width, height, self.alignment)?;
        if len > self.data.capacity() {
            self.data
                .try_reserve_exact(len - self.data.len())
                .map_err(|e| alloc_error(len, e))?;
        }
        debug!(
            "image reshape {}x{} {} -> {}x{} {}",
            self.width, self.height, self.format, width, height, format
        );
        self.data.clear();
        self.data.resize(len, 0);
        self.width = width;
        self.height = height;
        self.stride = stride;
        self.format = format;
        Ok(true)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> FourCC {
        self.format
    }

    /// Bytes from the start of one row to the start of the next.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn channels(&self) -> usize {
        // Only formats accepted by `bytes_per_pixel` are ever stored.
        match self.format {
            GREY => 1,
            _ => 4,
        }
    }

    /// Bytes of pixel data in one row, excluding padding.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.channels()
    }

    /// Total size of the backing storage including row padding.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn row_alignment(&self) -> usize {
        self.alignment
    }

    /// Address of the backing storage; stable until the next reallocating
    /// [`reshape`](Self::reshape).
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pixel bytes of row `y`, without padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.row_bytes()]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let len = self.row_bytes();
        &mut self.data[start..start + len]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let len = self.row_bytes();
        self.data.chunks_exact(self.stride).map(move |r| &r[..len])
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let len = self.row_bytes();
        self.data
            .chunks_exact_mut(self.stride)
            .map(move |r| &mut r[..len])
    }

    /// Channel values of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels();
        let start = x as usize * c;
        &self.row(y)[start..start + c]
    }

    /// Copies the pixels into a tightly packed vector (stride equal to row
    /// bytes).
    pub fn to_packed(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.row_bytes() * self.height as usize);
        for row in self.rows() {
            out.extend_from_slice(row);
        }
        out
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{} {} stride:{}",
            self.width, self.height, self.format, self.stride
        )
    }
}

/// Encodes an image to JPEG using turbojpeg.
///
/// RGBA images are compressed with 4:2:0 subsampling, GREY images as
/// single-component JPEG. The row stride is passed through as the pitch so
/// padding never reaches the encoder.
///
/// # Example
///
/// ```no_run
/// use rtedv_processor::image::{encode_jpeg, Image, RGBA};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = Image::new(640, 480, RGBA)?;
/// let jpeg = encode_jpeg(&img, 90)?;
/// println!("Compressed to {} bytes", jpeg.len());
/// # Ok(())
/// # }
/// ```
pub fn encode_jpeg(img: &Image, quality: i32) -> Result<OwnedBuf> {
    let (format, subsamp) = match img.format() {
        RGBA => (turbojpeg::PixelFormat::RGBA, turbojpeg::Subsamp::Sub2x2),
        GREY => (turbojpeg::PixelFormat::GRAY, turbojpeg::Subsamp::Gray),
        found => {
            return Err(Error::UnsupportedFormat {
                found,
                expected: "RGBA or GREY",
            })
        }
    };
    let src = turbojpeg::Image {
        width: img.width() as usize,
        height: img.height() as usize,
        format,
        pixels: img.as_slice(),
        pitch: img.stride(),
    };
    turbojpeg::compress(src, quality, subsamp).map_err(|e| Error::ExternalLibrary(e.to_string()))
}
