// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use args::Args;
use capture::{CapturedFrame, Source};
use clap::Parser;
use rtedv_processor::{
    config::ProcessorConfig,
    image::encode_jpeg,
    registry::{BufferHandle, BufferRegistry},
    stats::ThroughputCounters,
    transform::Transform,
};
use std::{
    error::Error,
    fs,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, error, info, info_span, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, Layer as _};

mod args;
mod capture;

type BoxError = Box<dyn Error + Send + Sync>;

fn init_tracing(args: &Args) -> Result<(), Box<dyn Error>> {
    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(level);

    let journald = if args.journald {
        match tracing_journald::layer() {
            Ok(layer) => Some(layer.with_filter(level)),
            Err(e) => {
                eprintln!("journald unavailable: {e}");
                None
            }
        }
    } else {
        None
    };

    let tracy = if args.tracy {
        tracy_client::Client::start();
        Some(tracing_tracy::TracyLayer::default())
    } else {
        None
    };

    let subscriber = tracing_subscriber::registry()
        .with(stderr)
        .with(journald)
        .with(tracy);
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(&args)?;

    let config = ProcessorConfig::from(&args);
    config.validate()?;
    let transform = args.transform.resolve(&config);
    info!(
        "replaying {} frames at {}x{} ({:?}), transform {}",
        args.frames,
        args.frame_size[0],
        args.frame_size[1],
        args.chroma,
        transform.name()
    );

    let registry = Arc::new(BufferRegistry::with_alignment(config.row_alignment));
    let counters = Arc::new(ThroughputCounters::new());
    let dropped = Arc::new(AtomicU64::new(0));

    // Single slot holding the newest frame; capture never waits on processing.
    let (tx, rx) = kanal::bounded::<CapturedFrame>(1);
    let stale = rx.clone();

    let mut source = Source::new(&args)?;
    let fps = args.fps;
    let capture_dropped = dropped.clone();
    let capture = thread::Builder::new()
        .name("capture".to_string())
        .spawn(move || -> Result<(), BoxError> {
            let period = (fps > 0).then(|| Duration::from_secs(1) / fps);
            let mut next = Instant::now();
            while let Some(frame) = source.next_frame().map_err(|e| e.to_string())? {
                let mut pending = Some(frame);
                while !tx.try_send_option(&mut pending)? {
                    if let Some(old) = stale.try_recv()? {
                        capture_dropped.fetch_add(1, Ordering::Relaxed);
                        debug!("frame {} dropped, processor busy", old.index);
                    }
                }
                if let Some(period) = period {
                    next += period;
                    if let Some(wait) = next.checked_duration_since(Instant::now()) {
                        thread::sleep(wait);
                    }
                }
            }
            Ok(())
        })?;

    let proc_registry = registry.clone();
    let proc_counters = counters.clone();
    let processor = thread::Builder::new()
        .name("processor".to_string())
        .spawn(move || process(rx, &proc_registry, &proc_counters, transform))?;

    let interval = Duration::from_millis(args.stats_interval.max(1));
    let mut last_report = Instant::now();
    while !processor.is_finished() {
        thread::sleep(Duration::from_millis(10).min(interval));
        if last_report.elapsed() >= interval {
            println!("{}", counters.snapshot().to_json());
            last_report = Instant::now();
        }
    }

    if let Err(e) = capture.join().map_err(|_| "capture thread panicked")? {
        error!("capture failed: {e}");
    }
    let last = processor
        .join()
        .map_err(|_| "processor thread panicked")?
        .map_err(|e| e.to_string())?;

    println!("{}", counters.snapshot().to_json());
    let dropped = dropped.load(Ordering::Relaxed);
    if dropped > 0 {
        warn!("{} frames dropped while the processor was busy", dropped);
    }

    if let Some(handle) = last {
        if let Some(path) = &args.snapshot {
            let jpeg = registry.with_image(handle, |img| encode_jpeg(img, config.jpeg_quality))??;
            fs::write(path, &jpeg[..])?;
            info!("wrote {} ({} bytes)", path.display(), jpeg.len());
        }
        registry.release(handle)?;
    }

    Ok(())
}

/// Processing loop: converts each frame into one recycled buffer and
/// applies the transform, returning the buffer that holds the last frame.
fn process(
    rx: kanal::Receiver<CapturedFrame>,
    registry: &BufferRegistry,
    counters: &ThroughputCounters,
    transform: Transform,
) -> Result<Option<BufferHandle>, BoxError> {
    let mut handle = None;
    while let Ok(frame) = rx.recv() {
        let _span = info_span!("frame", index = frame.index).entered();
        let planar = match frame.planar() {
            Ok(planar) => planar,
            Err(e) => {
                warn!("frame {} rejected: {e}", frame.index);
                continue;
            }
        };
        let current = registry.convert_frame(handle, &planar)?;
        handle = Some(current);
        let elapsed = registry.apply(current, &transform)?;
        counters.record(elapsed);
        debug!("frame {} processed in {:?}", frame.index, elapsed);

        if let Some(client) = tracy_client::Client::running() {
            client.frame_mark();
        }
    }
    Ok(handle)
}
