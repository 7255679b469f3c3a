// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! JNI entry points for `com.flamapp.jni.NativeProcessor`.
//!
//! Buffers are referred to by registry handles passed as `jlong`, with `0`
//! meaning "no buffer yet". Failures raise a Java exception and the entry
//! point returns the handle it was given, so the caller keeps ownership of
//! an existing buffer. Panics never cross into the JVM.

use crate::config::ProcessorConfig;
use crate::error::{Error, Result};
use crate::planar::{Plane, PlanarFrame};
use crate::registry::{BufferHandle, BufferRegistry};
use crate::safety::contain;
use crate::stats;
use crate::texture::{GlesTextureUploader, TextureSink};
use crate::transform::Transform;
use jni::objects::{JByteBuffer, JObject};
use jni::sys::{jfloat, jint, jlong, jstring, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};
use parking_lot::RwLock;
use std::{ffi::c_void, sync::LazyLock};
use tracing::{error, info};

struct Bridge {
    registry: BufferRegistry,
    config: RwLock<ProcessorConfig>,
}

static BRIDGE: LazyLock<Bridge> = LazyLock::new(|| {
    let config = ProcessorConfig::default();
    Bridge {
        registry: BufferRegistry::with_alignment(config.row_alignment),
        config: RwLock::new(config),
    }
});

static UPLOADER: LazyLock<Result<GlesTextureUploader, String>> =
    LazyLock::new(|| GlesTextureUploader::load().map_err(|e| e.to_string()));

#[cfg(target_os = "android")]
fn init_logging() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(tracing::log::LevelFilter::Debug)
            .with_tag("rtedv"),
    );
}

#[cfg(not(target_os = "android"))]
fn init_logging() {}

#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: JavaVM, _reserved: *mut c_void) -> jint {
    init_logging();
    info!("rtedv processor {} loaded", env!("CARGO_PKG_VERSION"));
    JNI_VERSION_1_6
}

fn exception_class(err: &Error) -> &'static str {
    match err {
        Error::InvalidDimensions { .. }
        | Error::InvalidStride { .. }
        | Error::InvalidTexture(_)
        | Error::InvalidConfig(_) => "java/lang/IllegalArgumentException",
        Error::BufferAccess(_) => "java/lang/IllegalStateException",
        Error::UnsupportedFormat { .. } => "java/lang/UnsupportedOperationException",
        Error::ExternalLibrary(_) => "java/lang/RuntimeException",
    }
}

fn throw(env: &mut JNIEnv, what: &str, err: &Error) {
    error!("{what}: {err}");
    if env.exception_check().unwrap_or(false) {
        return;
    }
    if let Err(e) = env.throw_new(exception_class(err), err.to_string()) {
        error!("{what}: failed to raise exception: {e}");
    }
}

/// Runs `f` with panics contained. On failure yields `fallback` together
/// with the error to raise.
fn settle<T>(what: &str, fallback: T, f: impl FnOnce() -> Result<T>) -> (T, Option<Error>) {
    match contain(what, f) {
        Ok(v) => (v, None),
        Err(e) => (fallback, Some(e)),
    }
}

/// Runs an entry point body, raising a Java exception and returning
/// `fallback` on error or panic.
fn run<'local, T>(
    env: &mut JNIEnv<'local>,
    what: &str,
    fallback: T,
    f: impl FnOnce(&mut JNIEnv<'local>) -> Result<T>,
) -> T {
    let (value, err) = settle(what, fallback, || f(env));
    if let Some(e) = err {
        throw(env, what, &e);
    }
    value
}

fn required(raw: jlong) -> Result<BufferHandle> {
    BufferHandle::from_raw(raw).ok_or_else(|| Error::BufferAccess("null buffer handle".into()))
}

fn direct_plane<'a>(
    env: &JNIEnv,
    buf: &'a JByteBuffer,
    name: &'static str,
    pixel_stride: jint,
    row_stride: jint,
) -> Result<Plane<'a>> {
    if buf.is_null() {
        return Err(Error::BufferAccess(format!("{name} plane buffer is null")));
    }
    if pixel_stride <= 0 || row_stride <= 0 {
        return Err(Error::InvalidStride {
            plane: name,
            reason: format!("strides must be positive, got {pixel_stride}/{row_stride}"),
        });
    }
    let addr = env
        .get_direct_buffer_address(buf)
        .map_err(|e| Error::BufferAccess(format!("{name} plane is not a direct buffer: {e}")))?;
    let len = env
        .get_direct_buffer_capacity(buf)
        .map_err(|e| Error::BufferAccess(format!("{name} plane capacity: {e}")))?;
    if addr.is_null() {
        return Err(Error::BufferAccess(format!("{name} plane address is null")));
    }
    // SAFETY: the JVM keeps a direct buffer's memory alive while a
    // reference to it is held, and the local reference outlives `'a`.
    let data = unsafe { std::slice::from_raw_parts(addr as *const u8, len) };
    Ok(Plane::new(data, pixel_stride as usize, row_stride as usize))
}

#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_yuv420ToMat<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    width: jint,
    height: jint,
    y_buffer: JByteBuffer<'local>,
    u_buffer: JByteBuffer<'local>,
    v_buffer: JByteBuffer<'local>,
    y_pixel_stride: jint,
    u_pixel_stride: jint,
    v_pixel_stride: jint,
    y_row_stride: jint,
    u_row_stride: jint,
    v_row_stride: jint,
    mat_addr: jlong,
) -> jlong {
    run(&mut env, "yuv420ToMat", mat_addr, |env| {
        let y = direct_plane(env, &y_buffer, "Y", y_pixel_stride, y_row_stride)?;
        let u = direct_plane(env, &u_buffer, "U", u_pixel_stride, u_row_stride)?;
        let v = direct_plane(env, &v_buffer, "V", v_pixel_stride, v_row_stride)?;
        let frame = PlanarFrame::new(width, height, y, u, v)?;
        let handle = BRIDGE
            .registry
            .convert_frame(BufferHandle::from_raw(mat_addr), &frame)?;
        Ok(handle.as_raw())
    })
}

fn transform_frame(env: &mut JNIEnv, what: &str, mat_addr: jlong, transform: Transform) -> jlong {
    run(env, what, mat_addr, |_| {
        let handle = required(mat_addr)?;
        let elapsed = BRIDGE.registry.apply(handle, &transform)?;
        stats::global().record(elapsed);
        Ok(mat_addr)
    })
}

/// Canny edge detection in place.
#[no_mangle]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_processFrame<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    mat_addr: jlong,
) -> jlong {
    let transform = BRIDGE.config.read().edge_detect();
    transform_frame(&mut env, "processFrame", mat_addr, transform)
}

#[no_mangle]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_applyGrayscale<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    mat_addr: jlong,
) -> jlong {
    transform_frame(&mut env, "applyGrayscale", mat_addr, Transform::Grayscale)
}

#[no_mangle]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_applyTransform<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    mat_addr: jlong,
    kind: jint,
) -> jlong {
    let transform = match Transform::from_kind(kind, &BRIDGE.config.read()) {
        Ok(t) => t,
        Err(e) => {
            throw(&mut env, "applyTransform", &e);
            return mat_addr;
        }
    };
    transform_frame(&mut env, "applyTransform", mat_addr, transform)
}

#[no_mangle]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_updateGLTexture<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    mat_addr: jlong,
    texture_id: jint,
) {
    run(&mut env, "updateGLTexture", (), |_| {
        let handle = required(mat_addr)?;
        let uploader = UPLOADER
            .as_ref()
            .map_err(|e| Error::ExternalLibrary(e.clone()))?;
        BRIDGE
            .registry
            .with_image(handle, |img| uploader.upload(texture_id, img))?
    })
}

#[no_mangle]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_releaseMat<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    mat_addr: jlong,
) {
    run(&mut env, "releaseMat", (), |_| {
        BRIDGE.registry.release(required(mat_addr)?)
    })
}

#[no_mangle]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_setEdgeThresholds<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    low: jfloat,
    high: jfloat,
) {
    run(&mut env, "setEdgeThresholds", (), |_| {
        let mut config = BRIDGE.config.read().clone();
        config.edge_thresholds = (low, high);
        config.validate()?;
        *BRIDGE.config.write() = config;
        Ok(())
    })
}

#[no_mangle]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_getFrameCount<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jlong {
    stats::global().query().0 as jlong
}

/// Cumulative processing time in microseconds.
#[no_mangle]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_getTotalProcessingTime<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jlong {
    stats::global().query().1.as_micros() as jlong
}

#[no_mangle]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_resetStats<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    stats::global().reset();
}

fn new_string(env: &mut JNIEnv, what: &str, s: String) -> jstring {
    match env.new_string(s) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            error!("{what}: {e}");
            std::ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_getStatsJson<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jstring {
    let json = stats::global().snapshot().to_json().to_string();
    new_string(&mut env, "getStatsJson", json)
}

#[no_mangle]
pub extern "system" fn Java_com_flamapp_jni_NativeProcessor_getProcessorInfo<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jstring {
    let info = format!(
        "rtedv processor v{}, {} live buffer(s)",
        env!("CARGO_PKG_VERSION"),
        BRIDGE.registry.len()
    );
    new_string(&mut env, "getProcessorInfo", info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GREY;

    #[test]
    fn exception_classes() {
        let cases = [
            (
                Error::InvalidDimensions {
                    width: 0,
                    height: 1,
                },
                "java/lang/IllegalArgumentException",
            ),
            (
                Error::InvalidStride {
                    plane: "Y",
                    reason: "short".into(),
                },
                "java/lang/IllegalArgumentException",
            ),
            (Error::InvalidTexture(0), "java/lang/IllegalArgumentException"),
            (
                Error::InvalidConfig("bad".into()),
                "java/lang/IllegalArgumentException",
            ),
            (
                Error::BufferAccess("stale".into()),
                "java/lang/IllegalStateException",
            ),
            (
                Error::UnsupportedFormat {
                    found: GREY,
                    expected: "RGBA",
                },
                "java/lang/UnsupportedOperationException",
            ),
            (
                Error::ExternalLibrary("canny".into()),
                "java/lang/RuntimeException",
            ),
        ];
        for (err, class) in cases {
            assert_eq!(exception_class(&err), class, "{err}");
        }
    }

    #[test]
    fn failure_returns_incoming_handle() {
        let (handle, err) = settle("transform", 42i64, || {
            Err(Error::BufferAccess("unknown buffer handle #42".into()))
        });
        assert_eq!(handle, 42);
        assert!(matches!(err, Some(Error::BufferAccess(_))));

        let (handle, err) = settle("transform", 42i64, || -> Result<i64> { panic!("boom") });
        assert_eq!(handle, 42);
        assert!(matches!(err, Some(Error::ExternalLibrary(ref m)) if m.contains("boom")));

        let (handle, err) = settle("convert", 0i64, || Ok(7));
        assert_eq!(handle, 7);
        assert!(err.is_none());
    }

    #[test]
    fn required_rejects_null_handle() {
        assert!(matches!(required(0), Err(Error::BufferAccess(_))));
        assert_eq!(required(9).map(BufferHandle::as_raw).ok(), Some(9));
    }
}
