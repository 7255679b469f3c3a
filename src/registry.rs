// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Handle registry for recycled frame buffers.
//!
//! Callers on the managed side hold a 64-bit handle per pipeline and pass
//! it back on every call. The registry maps handles to owned [`Image`]
//! buffers, so a stale or forged handle is rejected instead of being
//! dereferenced. Handle ids are never reused by a registry.
//!
//! Each buffer sits behind its own lock. Callers are still expected to keep
//! at most one conversion or transform in flight per handle; the lock only
//! makes violating that contract safe, not meaningful.

use crate::error::{Error, Result};
use crate::image::{Image, DEFAULT_ROW_ALIGNMENT, RGBA};
use crate::planar::{convert_planar_to_packed, PlanarFrame};
use crate::transform::Transform;
use core::fmt;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    num::NonZeroU64,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tracing::{debug, warn};

/// Opaque identifier of a buffer owned by a [`BufferRegistry`].
///
/// Crosses the JNI boundary as a `jlong`; `0` means "no buffer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(NonZeroU64);

impl BufferHandle {
    /// Interprets a raw boundary value. Returns `None` for `0`.
    pub fn from_raw(raw: i64) -> Option<Self> {
        NonZeroU64::new(raw as u64).map(Self)
    }

    pub fn as_raw(self) -> i64 {
        self.0.get() as i64
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Slot {
    image: Image,
    /// Set when a conversion starts, consumed by the next transform.
    frame_start: Option<Instant>,
}

/// Owner of every buffer handed out across the boundary.
///
/// Dropping the registry frees all buffers it still holds.
pub struct BufferRegistry {
    slots: Mutex<HashMap<BufferHandle, Arc<Mutex<Slot>>>>,
    next: AtomicU64,
    row_alignment: usize,
}

impl Default for BufferRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn positive_dims(width: i32, height: i32) -> Result<(u32, u32)> {
    if width <= 0 || height <= 0 {
        return Err(Error::InvalidDimensions {
            width: width.into(),
            height: height.into(),
        });
    }
    Ok((width as u32, height as u32))
}

impl BufferRegistry {
    pub fn new() -> Self {
        Self::with_alignment(DEFAULT_ROW_ALIGNMENT)
    }

    /// Creates a registry whose buffers pad rows to `row_alignment` bytes.
    pub fn with_alignment(row_alignment: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            next: AtomicU64::new(1),
            row_alignment,
        }
    }

    fn slot(&self, handle: BufferHandle) -> Result<Arc<Mutex<Slot>>> {
        match self.slots.lock().get(&handle) {
            Some(slot) => Ok(slot.clone()),
            None => {
                warn!("rejected unknown buffer handle {}", handle);
                Err(Error::BufferAccess(format!("unknown buffer handle {handle}")))
            }
        }
    }

    /// Returns a handle to an RGBA buffer of exactly `width` x `height`.
    ///
    /// Without a handle a new buffer is allocated. With a handle the
    /// existing buffer is reshaped in place when its size or layout
    /// differs, and left untouched otherwise; the handle stays the same.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] if either dimension is not positive;
    ///   nothing is allocated
    /// - [`Error::BufferAccess`] if `handle` is not owned by this registry
    pub fn acquire_or_resize(
        &self,
        handle: Option<BufferHandle>,
        width: i32,
        height: i32,
    ) -> Result<BufferHandle> {
        let (w, h) = positive_dims(width, height)?;
        match handle {
            Some(handle) => {
                let slot = self.slot(handle)?;
                if slot.lock().image.reshape(w, h, RGBA)? {
                    debug!("buffer {} resized to {}x{}", handle, w, h);
                }
                Ok(handle)
            }
            None => {
                let image = Image::with_alignment(w, h, RGBA, self.row_alignment)?;
                let handle = BufferHandle(
                    NonZeroU64::new(self.next.fetch_add(1, Ordering::Relaxed))
                        .ok_or_else(|| Error::BufferAccess("handle space exhausted".into()))?,
                );
                self.slots.lock().insert(
                    handle,
                    Arc::new(Mutex::new(Slot {
                        image,
                        frame_start: None,
                    })),
                );
                debug!("buffer {} allocated {}x{}", handle, w, h);
                Ok(handle)
            }
        }
    }

    /// Converts `frame` into the buffer behind `handle`, acquiring or
    /// resizing it first, and returns the handle that now holds the frame.
    ///
    /// The frame's planes are validated when the [`PlanarFrame`] is built,
    /// so a bad frame is rejected before any buffer is touched.
    pub fn convert_frame(
        &self,
        handle: Option<BufferHandle>,
        frame: &PlanarFrame,
    ) -> Result<BufferHandle> {
        let start = Instant::now();
        let handle = self.acquire_or_resize(handle, frame.width() as i32, frame.height() as i32)?;
        let slot = self.slot(handle)?;
        let mut slot = slot.lock();
        convert_planar_to_packed(frame, &mut slot.image)?;
        slot.frame_start = Some(start);
        Ok(handle)
    }

    /// Applies `transform` to the buffer behind `handle`.
    ///
    /// Returns the frame's processing time: from the start of the
    /// conversion that filled the buffer to the end of this transform, or
    /// the transform alone when no conversion preceded it.
    pub fn apply(&self, handle: BufferHandle, transform: &Transform) -> Result<Duration> {
        let slot = self.slot(handle)?;
        let mut slot = slot.lock();
        let start = slot.frame_start.take().unwrap_or_else(Instant::now);
        transform.apply(&mut slot.image)?;
        Ok(start.elapsed())
    }

    /// Runs `f` with shared access to the buffer behind `handle`.
    pub fn with_image<R>(&self, handle: BufferHandle, f: impl FnOnce(&Image) -> R) -> Result<R> {
        let slot = self.slot(handle)?;
        let slot = slot.lock();
        Ok(f(&slot.image))
    }

    pub fn with_image_mut<R>(
        &self,
        handle: BufferHandle,
        f: impl FnOnce(&mut Image) -> R,
    ) -> Result<R> {
        let slot = self.slot(handle)?;
        let mut slot = slot.lock();
        Ok(f(&mut slot.image))
    }

    pub fn dimensions(&self, handle: BufferHandle) -> Result<(u32, u32)> {
        self.with_image(handle, |img| (img.width(), img.height()))
    }

    /// Frees the buffer behind `handle`. The handle is dead afterwards.
    pub fn release(&self, handle: BufferHandle) -> Result<()> {
        match self.slots.lock().remove(&handle) {
            Some(_) => {
                debug!("buffer {} released", handle);
                Ok(())
            }
            None => {
                warn!("release of unknown buffer handle {}", handle);
                Err(Error::BufferAccess(format!("unknown buffer handle {handle}")))
            }
        }
    }

    pub fn contains(&self, handle: BufferHandle) -> bool {
        self.slots.lock().contains_key(&handle)
    }

    /// Number of live buffers.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
