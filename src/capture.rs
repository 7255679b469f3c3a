// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::args::{Args, ChromaLayout};
use rtedv_processor::planar::{Plane, PlanarFrame};
use std::{
    error::Error,
    fs::File,
    io::{self, BufReader, Read},
};
use tracing::debug;

enum Chroma {
    Planar { u: Vec<u8>, v: Vec<u8> },
    Interleaved { uv: Vec<u8>, v_first: bool },
}

/// An owned YUV 4:2:0 frame in the layout a camera would deliver it.
pub struct CapturedFrame {
    pub index: u64,
    width: i32,
    height: i32,
    y: Vec<u8>,
    y_row_stride: usize,
    chroma: Chroma,
    chroma_row_stride: usize,
}

impl CapturedFrame {
    /// Repacks tightly packed I420 data into `layout`, padding every row
    /// with `padding` bytes.
    pub fn from_i420(
        index: u64,
        width: i32,
        height: i32,
        i420: &[u8],
        layout: ChromaLayout,
        padding: usize,
    ) -> Self {
        let (w, h) = (width as usize, height as usize);
        let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
        let (src_y, src_c) = i420.split_at(w * h);
        let (src_u, src_v) = src_c.split_at(cw * ch);

        let y_row_stride = w + padding;
        let mut y = vec![0xA5; y_row_stride * h];
        for (dst, src) in y.chunks_exact_mut(y_row_stride).zip(src_y.chunks_exact(w)) {
            dst[..w].copy_from_slice(src);
        }

        let (chroma, chroma_row_stride) = match layout {
            ChromaLayout::I420 => {
                let stride = cw + padding;
                let mut u = vec![0xA5; stride * ch];
                let mut v = vec![0xA5; stride * ch];
                for row in 0..ch {
                    let src = row * cw..(row + 1) * cw;
                    u[row * stride..row * stride + cw].copy_from_slice(&src_u[src.clone()]);
                    v[row * stride..row * stride + cw].copy_from_slice(&src_v[src]);
                }
                (Chroma::Planar { u, v }, stride)
            }
            ChromaLayout::Nv12 | ChromaLayout::Nv21 => {
                let v_first = layout == ChromaLayout::Nv21;
                let stride = cw * 2 + padding;
                let mut uv = vec![0xA5; stride * ch];
                for row in 0..ch {
                    for col in 0..cw {
                        let (u, v) = (src_u[row * cw + col], src_v[row * cw + col]);
                        let at = row * stride + col * 2;
                        let (first, second) = if v_first { (v, u) } else { (u, v) };
                        uv[at] = first;
                        uv[at + 1] = second;
                    }
                }
                (Chroma::Interleaved { uv, v_first }, stride)
            }
        };

        Self {
            index,
            width,
            height,
            y,
            y_row_stride,
            chroma,
            chroma_row_stride,
        }
    }

    /// Borrows the frame as the three plane views the processor expects.
    pub fn planar(&self) -> rtedv_processor::Result<PlanarFrame<'_>> {
        let y = Plane::new(&self.y, 1, self.y_row_stride);
        let stride = self.chroma_row_stride;
        let (u, v) = match &self.chroma {
            Chroma::Planar { u, v } => (Plane::new(u, 1, stride), Plane::new(v, 1, stride)),
            Chroma::Interleaved { uv, v_first } => {
                let first = Plane::new(uv, 2, stride);
                let second = Plane::new(&uv[1..], 2, stride);
                if *v_first {
                    (second, first)
                } else {
                    (first, second)
                }
            }
        };
        PlanarFrame::new(self.width, self.height, y, u, v)
    }
}

/// Synthetic test pattern: a diagonal luma gradient with a bright square
/// sweeping across it and slowly rotating chroma.
pub fn synthetic_i420(width: i32, height: i32, index: u64) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
    let mut data = vec![0u8; w * h + 2 * cw * ch];
    let t = index as usize;

    let side = (w.min(h) / 4).max(1);
    let sx = (t * 8) % w.max(1);
    let sy = (h - side) / 2;
    let (luma, chroma) = data.split_at_mut(w * h);
    for (row, line) in luma.chunks_exact_mut(w).enumerate() {
        for (col, px) in line.iter_mut().enumerate() {
            let inside = col >= sx && col < sx + side && row >= sy && row < sy + side;
            *px = if inside {
                235
            } else {
                ((col + row) * 160 / (w + h)) as u8 + 16
            };
        }
    }
    let (u, v) = chroma.split_at_mut(cw * ch);
    u.fill(128u8.wrapping_add((t % 64) as u8));
    v.fill(128u8.wrapping_sub((t % 64) as u8));
    data
}

/// Produces captured frames from a raw I420 file or the synthetic pattern.
pub struct Source {
    width: i32,
    height: i32,
    layout: ChromaLayout,
    padding: usize,
    limit: u64,
    index: u64,
    file: Option<BufReader<File>>,
}

impl Source {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error>> {
        let (width, height) = (args.frame_size[0], args.frame_size[1]);
        if width <= 0 || height <= 0 {
            return Err(format!("invalid frame size {width}x{height}").into());
        }
        let file = match &args.input {
            Some(path) => {
                debug!("replaying {}", path.display());
                Some(BufReader::new(File::open(path)?))
            }
            None => None,
        };
        Ok(Self {
            width,
            height,
            layout: args.chroma,
            padding: args.row_padding,
            limit: args.frames,
            index: 0,
            file,
        })
    }

    fn frame_len(&self) -> usize {
        let (w, h) = (self.width as usize, self.height as usize);
        w * h + 2 * w.div_ceil(2) * h.div_ceil(2)
    }

    /// Returns the next frame, or `None` once the frame limit or the end of
    /// the input file is reached.
    pub fn next_frame(&mut self) -> Result<Option<CapturedFrame>, Box<dyn Error>> {
        if self.index >= self.limit {
            return Ok(None);
        }
        let frame_len = self.frame_len();
        let i420 = match self.file.as_mut() {
            Some(file) => {
                let mut buf = vec![0u8; frame_len];
                match file.read_exact(&mut buf) {
                    Ok(()) => buf,
                    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
                    Err(e) => return Err(e.into()),
                }
            }
            None => synthetic_i420(self.width, self.height, self.index),
        };
        let frame = CapturedFrame::from_i420(
            self.index,
            self.width,
            self.height,
            &i420,
            self.layout,
            self.padding,
        );
        self.index += 1;
        Ok(Some(frame))
    }
}
