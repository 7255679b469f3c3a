// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use rtedv_processor::{
    image::{GREY, RGBA},
    planar::{Plane, PlanarFrame},
    registry::{BufferHandle, BufferRegistry},
    transform::Transform,
    Error,
};
use std::{error::Error as StdError, sync::Arc, thread};

#[test]
fn test_acquire() -> Result<(), Box<dyn StdError>> {
    let registry = BufferRegistry::new();
    assert!(registry.is_empty());

    let handle = registry.acquire_or_resize(None, 640, 480)?;
    assert_eq!(registry.dimensions(handle)?, (640, 480));
    assert!(registry.contains(handle));
    assert_eq!(registry.len(), 1);
    registry.with_image(handle, |img| {
        assert_eq!(img.format(), RGBA);
        assert_eq!(img.stride() % 16, 0);
    })?;

    let other = registry.acquire_or_resize(None, 640, 480)?;
    assert_ne!(handle, other);
    assert_eq!(registry.len(), 2);
    Ok(())
}

#[test]
fn test_invalid_dimensions() -> Result<(), Box<dyn StdError>> {
    let registry = BufferRegistry::new();
    for (w, h) in [(0, 480), (640, 0), (-1, 480), (640, -480)] {
        assert!(matches!(
            registry.acquire_or_resize(None, w, h),
            Err(Error::InvalidDimensions { .. })
        ));
    }
    assert!(registry.is_empty());

    // A failed resize leaves the existing buffer alone.
    let handle = registry.acquire_or_resize(None, 32, 32)?;
    assert!(registry.acquire_or_resize(Some(handle), 0, 32).is_err());
    assert_eq!(registry.dimensions(handle)?, (32, 32));
    Ok(())
}

#[test]
fn test_oversized_dimensions() -> Result<(), Box<dyn StdError>> {
    let registry = BufferRegistry::new();
    assert!(registry.acquire_or_resize(None, i32::MAX, i32::MAX).is_err());
    assert!(registry.is_empty());

    // A resize that cannot be satisfied keeps the buffer and its contents.
    let handle = registry.acquire_or_resize(None, 64, 64)?;
    registry.with_image_mut(handle, |img| img.row_mut(3)[5] = 77)?;
    assert!(registry
        .acquire_or_resize(Some(handle), i32::MAX, i32::MAX)
        .is_err());
    assert_eq!(registry.dimensions(handle)?, (64, 64));
    registry.with_image(handle, |img| assert_eq!(img.row(3)[5], 77))?;
    assert_eq!(registry.len(), 1);
    Ok(())
}

#[test]
fn test_idempotent() -> Result<(), Box<dyn StdError>> {
    let registry = BufferRegistry::new();
    let handle = registry.acquire_or_resize(None, 320, 240)?;
    let ptr = registry.with_image_mut(handle, |img| {
        img.row_mut(10)[0] = 42;
        img.as_ptr()
    })?;

    let again = registry.acquire_or_resize(Some(handle), 320, 240)?;
    assert_eq!(again, handle);
    registry.with_image(handle, |img| {
        assert_eq!(img.as_ptr(), ptr);
        assert_eq!(img.row(10)[0], 42);
    })?;
    Ok(())
}

#[test]
fn test_resize() -> Result<(), Box<dyn StdError>> {
    let registry = BufferRegistry::with_alignment(64);
    let handle = registry.acquire_or_resize(None, 320, 240)?;
    let resized = registry.acquire_or_resize(Some(handle), 1280, 720)?;
    assert_eq!(resized, handle);
    assert_eq!(registry.dimensions(handle)?, (1280, 720));
    assert_eq!(registry.len(), 1);

    // A transform may leave a single-channel buffer; acquiring restores RGBA.
    registry.with_image_mut(handle, |img| img.reshape(1280, 720, GREY))??;
    registry.acquire_or_resize(Some(handle), 1280, 720)?;
    registry.with_image(handle, |img| {
        assert_eq!(img.format(), RGBA);
        assert_eq!(img.row_alignment(), 64);
    })?;
    Ok(())
}

#[test]
fn test_stale_handle() -> Result<(), Box<dyn StdError>> {
    let registry = BufferRegistry::new();
    let handle = registry.acquire_or_resize(None, 16, 16)?;
    registry.release(handle)?;
    assert!(!registry.contains(handle));

    assert!(matches!(
        registry.acquire_or_resize(Some(handle), 16, 16),
        Err(Error::BufferAccess(_))
    ));
    assert!(matches!(
        registry.apply(handle, &Transform::Grayscale),
        Err(Error::BufferAccess(_))
    ));
    assert!(matches!(registry.release(handle), Err(Error::BufferAccess(_))));

    // Handles are never reissued.
    let next = registry.acquire_or_resize(None, 16, 16)?;
    assert_ne!(next, handle);

    let forged = BufferHandle::from_raw(0xDEAD).ok_or("zero handle")?;
    assert!(registry.dimensions(forged).is_err());
    Ok(())
}

#[test]
fn test_raw_handles() {
    assert!(BufferHandle::from_raw(0).is_none());
    let handle = BufferHandle::from_raw(7).map(BufferHandle::as_raw);
    assert_eq!(handle, Some(7));
    assert_eq!(format!("{}", BufferHandle::from_raw(3).unwrap()), "#3");
}

#[test]
fn test_convert_and_apply() -> Result<(), Box<dyn StdError>> {
    let (y, uv) = (vec![200u8; 64 * 48], vec![128u8; 32 * 24]);
    let frame = PlanarFrame::new(
        64,
        48,
        Plane::new(&y, 1, 64),
        Plane::new(&uv, 1, 32),
        Plane::new(&uv, 1, 32),
    )?;

    let registry = BufferRegistry::new();
    let handle = registry.convert_frame(None, &frame)?;
    registry.with_image(handle, |img| assert_eq!(img.pixel(10, 10), &[200, 200, 200, 255]))?;

    registry.apply(handle, &Transform::Grayscale)?;
    registry.with_image(handle, |img| {
        assert_eq!(img.format(), GREY);
        assert_eq!(img.pixel(10, 10), &[200]);
    })?;

    // The next conversion reuses the handle and restores RGBA.
    let again = registry.convert_frame(Some(handle), &frame)?;
    assert_eq!(again, handle);
    registry.with_image(handle, |img| assert_eq!(img.format(), RGBA))?;
    Ok(())
}

#[test]
fn test_concurrent_handles() -> Result<(), Box<dyn StdError>> {
    let registry = Arc::new(BufferRegistry::new());
    let workers: Vec<_> = (0..4)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || -> rtedv_processor::Result<BufferHandle> {
                let mut handle = None;
                for n in 1..=20 {
                    handle = Some(registry.acquire_or_resize(handle, 8 * n, 4 * (i + 1))?);
                }
                handle.ok_or_else(|| Error::BufferAccess("no handle".into()))
            })
        })
        .collect();

    let mut handles = Vec::new();
    for w in workers {
        handles.push(w.join().map_err(|_| "worker panicked")??);
    }
    handles.sort_by_key(|h| h.as_raw());
    handles.dedup();
    assert_eq!(handles.len(), 4);
    assert_eq!(registry.len(), 4);
    Ok(())
}
