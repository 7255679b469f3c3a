// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use rtedv_processor::{config::ProcessorConfig, transform::Transform};
use std::path::PathBuf;

/// Memory layout of the chroma planes handed to the processor.
///
/// Mirrors what Android camera stacks deliver through `ImageProxy` planes.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum ChromaLayout {
    /// Separate U and V planes, pixel stride 1
    I420,
    /// Interleaved UV, pixel stride 2
    Nv12,
    /// Interleaved VU, pixel stride 2 (most Android cameras)
    Nv21,
}

/// Transform applied to every frame.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum TransformKind {
    /// Canny edge map (single channel)
    EdgeDetect,
    /// Luminance (single channel)
    Grayscale,
    /// Canny edge map kept as RGBA
    EdgeOverlay,
}

impl TransformKind {
    pub fn resolve(self, config: &ProcessorConfig) -> Transform {
        match self {
            TransformKind::EdgeDetect => config.edge_detect(),
            TransformKind::Grayscale => Transform::Grayscale,
            TransformKind::EdgeOverlay => config.edge_overlay(),
        }
    }
}

/// Command-line arguments for the RTEDV replay tool.
///
/// Runs the native processing pipeline on the host: a capture thread feeds
/// synthetic or recorded YUV frames to a processing thread while the main
/// thread reports throughput, as the Android UI thread would.
///
/// # Example
///
/// ```bash
/// # Synthetic 720p NV21 frames with padded rows, save the last frame
/// rtedv-replay --chroma nv21 --row-padding 64 --snapshot edges.jpg
///
/// # Replay a raw I420 recording
/// export INPUT=capture.yuv
/// rtedv-replay --frame-size "1920 1080" --fps 0
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Raw I420 input file (synthetic frames when omitted)
    #[arg(short, long, env = "INPUT")]
    pub input: Option<PathBuf>,

    /// Frame resolution in pixels (width height)
    #[arg(
        long,
        env = "FRAME_SIZE",
        default_value = "1280 720",
        value_delimiter = ' ',
        num_args = 2
    )]
    pub frame_size: Vec<i32>,

    /// Number of frames to capture
    #[arg(short = 'n', long, env = "FRAMES", default_value = "300")]
    pub frames: u64,

    /// Capture rate limit in frames per second (0 for unthrottled)
    #[arg(long, env = "FPS", default_value = "30")]
    pub fps: u32,

    /// Chroma plane layout delivered to the processor
    #[arg(long, env = "CHROMA", default_value = "nv21", value_enum)]
    pub chroma: ChromaLayout,

    /// Extra bytes appended to every source plane row
    #[arg(long, env = "ROW_PADDING", default_value = "0")]
    pub row_padding: usize,

    /// Transform applied to each frame
    #[arg(short, long, env = "TRANSFORM", default_value = "edge-detect", value_enum)]
    pub transform: TransformKind,

    /// Canny thresholds for edge detection (low high)
    #[arg(
        long,
        env = "EDGE_THRESHOLDS",
        default_value = "100 200",
        value_delimiter = ' ',
        num_args = 2
    )]
    pub edge_thresholds: Vec<f32>,

    /// Canny thresholds for the edge overlay (low high)
    #[arg(
        long,
        env = "OVERLAY_THRESHOLDS",
        default_value = "50 150",
        value_delimiter = ' ',
        num_args = 2
    )]
    pub overlay_thresholds: Vec<f32>,

    /// Row alignment in bytes of processed buffers
    #[arg(long, env = "ROW_ALIGNMENT", default_value = "16")]
    pub row_alignment: usize,

    /// Interval between throughput reports in milliseconds
    #[arg(long, env = "STATS_INTERVAL", default_value = "1000")]
    pub stats_interval: u64,

    /// Write the last processed frame to this JPEG file
    #[arg(long, env = "SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// JPEG quality for the snapshot
    #[arg(long, env = "JPEG_QUALITY", default_value = "90")]
    pub jpeg_quality: i32,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Also log to the systemd journal
    #[arg(long, env = "JOURNALD")]
    pub journald: bool,

    /// Enable Tracy profiler for performance analysis
    #[arg(long, env = "TRACY")]
    pub tracy: bool,
}

impl From<&Args> for ProcessorConfig {
    fn from(args: &Args) -> Self {
        Self {
            edge_thresholds: (args.edge_thresholds[0], args.edge_thresholds[1]),
            overlay_thresholds: (args.overlay_thresholds[0], args.overlay_thresholds[1]),
            row_alignment: args.row_alignment,
            jpeg_quality: args.jpeg_quality,
        }
    }
}
