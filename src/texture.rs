// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Upload of image buffers into GL textures.

use crate::error::{Error, Result};
use crate::image::{Image, GREY, RGBA};
use gles_sys::{
    Gles, GLenum, GLint, GL_CLAMP_TO_EDGE, GL_LINEAR, GL_LUMINANCE, GL_NO_ERROR, GL_RGBA,
    GL_TEXTURE_2D, GL_TEXTURE_MAG_FILTER, GL_TEXTURE_MIN_FILTER, GL_TEXTURE_WRAP_S,
    GL_TEXTURE_WRAP_T, GL_UNPACK_ALIGNMENT, GL_UNSIGNED_BYTE,
};
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Destination for processed frames.
pub trait TextureSink {
    /// Replaces the contents of texture `texture_id` with `image`.
    fn upload(&self, texture_id: i32, image: &Image) -> Result<()>;
}

/// How rows are handed to `glTexImage2D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackPlan {
    /// The stride matches `GL_UNPACK_ALIGNMENT` = `alignment`; upload the
    /// buffer as is.
    Direct { alignment: GLint },
    /// The stride cannot be expressed in GLES 2.0; copy rows into a tightly
    /// packed staging buffer first.
    Staged,
}

/// Picks the largest unpack alignment that reproduces the image's stride.
///
/// GLES 2.0 has no `GL_UNPACK_ROW_LENGTH`, so only padding up to 8 bytes
/// can be described to the driver.
pub fn unpack_plan(image: &Image) -> UnpackPlan {
    let row = image.row_bytes();
    for alignment in [8usize, 4, 2, 1] {
        if image.stride() == row.div_ceil(alignment) * alignment {
            return UnpackPlan::Direct {
                alignment: alignment as GLint,
            };
        }
    }
    UnpackPlan::Staged
}

/// GL pixel format for the image's channel layout.
pub fn gl_format(image: &Image) -> Result<GLenum> {
    match image.format() {
        RGBA => Ok(GL_RGBA),
        GREY => Ok(GL_LUMINANCE),
        found => Err(Error::UnsupportedFormat {
            found,
            expected: "RGBA or GREY",
        }),
    }
}

/// [`TextureSink`] backed by the system OpenGL ES 2.0 library.
///
/// Uploads must happen on the thread that owns the current EGL context.
pub struct GlesTextureUploader {
    gl: Gles,
    staging: Mutex<Vec<u8>>,
}

impl GlesTextureUploader {
    /// Loads [`gles_sys::DEFAULT_LIBRARY`].
    pub fn load() -> Result<Self> {
        Self::load_from(gles_sys::DEFAULT_LIBRARY)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let gl = unsafe { Gles::new(path) }
            .map_err(|e| Error::ExternalLibrary(format!("{path}: {e}")))?;
        debug!("loaded {}", path);
        Ok(Self {
            gl,
            staging: Mutex::new(Vec::new()),
        })
    }
}

impl TextureSink for GlesTextureUploader {
    fn upload(&self, texture_id: i32, image: &Image) -> Result<()> {
        if texture_id <= 0 {
            return Err(Error::InvalidTexture(texture_id));
        }
        let format = gl_format(image)?;
        let plan = unpack_plan(image);
        trace!("upload {} to texture {} via {:?}", image, texture_id, plan);

        let mut staging = self.staging.lock();
        let (pixels, alignment) = match plan {
            UnpackPlan::Direct { alignment } => (image.as_slice(), alignment),
            UnpackPlan::Staged => {
                staging.clear();
                for row in image.rows() {
                    staging.extend_from_slice(row);
                }
                (staging.as_slice(), 1)
            }
        };

        let err = unsafe {
            self.gl.bind_texture(GL_TEXTURE_2D, texture_id as u32);
            self.gl.pixel_storei(GL_UNPACK_ALIGNMENT, alignment);
            self.gl.tex_image_2d(
                GL_TEXTURE_2D,
                0,
                format as GLint,
                image.width() as i32,
                image.height() as i32,
                0,
                format,
                GL_UNSIGNED_BYTE,
                pixels.as_ptr().cast(),
            );
            self.gl
                .tex_parameteri(GL_TEXTURE_2D, GL_TEXTURE_MIN_FILTER, GL_LINEAR);
            self.gl
                .tex_parameteri(GL_TEXTURE_2D, GL_TEXTURE_MAG_FILTER, GL_LINEAR);
            self.gl
                .tex_parameteri(GL_TEXTURE_2D, GL_TEXTURE_WRAP_S, GL_CLAMP_TO_EDGE);
            self.gl
                .tex_parameteri(GL_TEXTURE_2D, GL_TEXTURE_WRAP_T, GL_CLAMP_TO_EDGE);
            self.gl.pixel_storei(GL_UNPACK_ALIGNMENT, 4);
            self.gl.bind_texture(GL_TEXTURE_2D, 0);
            self.gl.get_error()
        };
        if err != GL_NO_ERROR {
            return Err(Error::ExternalLibrary(format!(
                "glTexImage2D failed with 0x{err:04x}"
            )));
        }
        Ok(())
    }
}
