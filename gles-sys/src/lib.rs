// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Low-level bindings for the subset of OpenGL ES 2.0 used to upload pixel
//! buffers into 2D textures.
//!
//! The library is opened at runtime with `libloading` so the crate links on
//! hosts without a GLES driver. Every entry point requires an EGL context to
//! be current on the calling thread.

#![allow(non_camel_case_types, clippy::missing_safety_doc)]

use libc::{c_int, c_uint, c_void};
use libloading::Library;
use std::ffi::OsStr;

pub type GLenum = c_uint;
pub type GLint = c_int;
pub type GLuint = c_uint;
pub type GLsizei = c_int;

pub const GL_NO_ERROR: GLenum = 0;
pub const GL_TEXTURE_2D: GLenum = 0x0DE1;
pub const GL_UNSIGNED_BYTE: GLenum = 0x1401;
pub const GL_LUMINANCE: GLenum = 0x1909;
pub const GL_RGBA: GLenum = 0x1908;
pub const GL_UNPACK_ALIGNMENT: GLenum = 0x0CF5;
pub const GL_TEXTURE_MAG_FILTER: GLenum = 0x2800;
pub const GL_TEXTURE_MIN_FILTER: GLenum = 0x2801;
pub const GL_TEXTURE_WRAP_S: GLenum = 0x2802;
pub const GL_TEXTURE_WRAP_T: GLenum = 0x2803;
pub const GL_LINEAR: GLint = 0x2601;
pub const GL_CLAMP_TO_EDGE: GLint = 0x812F;

/// Default soname of the system GLES 2.0 library on Android and Linux.
pub const DEFAULT_LIBRARY: &str = "libGLESv2.so";

type PfnBindTexture = unsafe extern "C" fn(target: GLenum, texture: GLuint);
type PfnTexImage2D = unsafe extern "C" fn(
    target: GLenum,
    level: GLint,
    internal_format: GLint,
    width: GLsizei,
    height: GLsizei,
    border: GLint,
    format: GLenum,
    kind: GLenum,
    pixels: *const c_void,
);
type PfnTexParameteri = unsafe extern "C" fn(target: GLenum, pname: GLenum, param: GLint);
type PfnPixelStorei = unsafe extern "C" fn(pname: GLenum, param: GLint);
type PfnGetError = unsafe extern "C" fn() -> GLenum;

/// Function table resolved from a loaded GLES library.
///
/// The resolved pointers stay valid for as long as the `Gles` value holds
/// the library open.
pub struct Gles {
    _lib: Library,
    bind_texture: PfnBindTexture,
    tex_image_2d: PfnTexImage2D,
    tex_parameteri: PfnTexParameteri,
    pixel_storei: PfnPixelStorei,
    get_error: PfnGetError,
}

impl Gles {
    /// Opens the GLES library at `path` and resolves the texture entry points.
    ///
    /// # Safety
    ///
    /// Loading a shared library runs its initialisers. The caller must make
    /// sure `path` names a genuine GLES 2.0 implementation.
    pub unsafe fn new<P: AsRef<OsStr>>(path: P) -> Result<Self, libloading::Error> {
        let lib = Library::new(path)?;
        let bind_texture = *lib.get::<PfnBindTexture>(b"glBindTexture\0")?;
        let tex_image_2d = *lib.get::<PfnTexImage2D>(b"glTexImage2D\0")?;
        let tex_parameteri = *lib.get::<PfnTexParameteri>(b"glTexParameteri\0")?;
        let pixel_storei = *lib.get::<PfnPixelStorei>(b"glPixelStorei\0")?;
        let get_error = *lib.get::<PfnGetError>(b"glGetError\0")?;
        Ok(Self {
            _lib: lib,
            bind_texture,
            tex_image_2d,
            tex_parameteri,
            pixel_storei,
            get_error,
        })
    }

    pub unsafe fn bind_texture(&self, target: GLenum, texture: GLuint) {
        (self.bind_texture)(target, texture)
    }

    /// # Safety
    ///
    /// `pixels` must point to at least `height` rows laid out according to
    /// the current `GL_UNPACK_ALIGNMENT`, each holding `width` pixels of
    /// `format`.
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn tex_image_2d(
        &self,
        target: GLenum,
        level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
        format: GLenum,
        kind: GLenum,
        pixels: *const c_void,
    ) {
        (self.tex_image_2d)(
            target,
            level,
            internal_format,
            width,
            height,
            border,
            format,
            kind,
            pixels,
        )
    }

    pub unsafe fn tex_parameteri(&self, target: GLenum, pname: GLenum, param: GLint) {
        (self.tex_parameteri)(target, pname, param)
    }

    pub unsafe fn pixel_storei(&self, pname: GLenum, param: GLint) {
        (self.pixel_storei)(pname, param)
    }

    pub unsafe fn get_error(&self) -> GLenum {
        (self.get_error)()
    }
}
