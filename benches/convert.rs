// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use criterion::{criterion_group, criterion_main, Criterion};
use rtedv_processor::{
    config::ProcessorConfig,
    image::{self, Image},
    planar::{convert_planar_to_packed, Plane, PlanarFrame},
    transform::Transform,
};

const DIMS: [(usize, usize); 4] = [(320, 240), (640, 480), (1280, 720), (1920, 1080)];

pub fn benchmark_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    for (w, h) in DIMS {
        let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
        let y: Vec<u8> = (0..w * h).map(|i| (i % 251) as u8).collect();
        let u = vec![100u8; cw * ch];
        let v = vec![160u8; cw * ch];
        let vu: Vec<u8> = (0..cw * ch * 2)
            .map(|i| if i % 2 == 0 { 160 } else { 100 })
            .collect();
        let mut dst = Image::new(w as u32, h as u32, image::RGBA).unwrap();

        let i420 = PlanarFrame::new(
            w as i32,
            h as i32,
            Plane::new(&y, 1, w),
            Plane::new(&u, 1, cw),
            Plane::new(&v, 1, cw),
        )
        .unwrap();
        group.bench_function(format!("i420/{}x{}", w, h), |b| {
            b.iter(|| convert_planar_to_packed(&i420, &mut dst).unwrap())
        });

        let nv21 = PlanarFrame::new(
            w as i32,
            h as i32,
            Plane::new(&y, 1, w),
            Plane::new(&vu[1..], 2, cw * 2),
            Plane::new(&vu, 2, cw * 2),
        )
        .unwrap();
        group.bench_function(format!("nv21/{}x{}", w, h), |b| {
            b.iter(|| convert_planar_to_packed(&nv21, &mut dst).unwrap())
        });
    }
    group.finish();
}

pub fn benchmark_transform(c: &mut Criterion) {
    let config = ProcessorConfig::default();
    let transforms = [
        config.edge_detect(),
        Transform::Grayscale,
        config.edge_overlay(),
    ];
    for transform in transforms {
        let mut group = c.benchmark_group(format!("transform/{}", transform.name()));
        group.sample_size(20);
        for (w, h) in DIMS {
            let mut src = Image::new(w as u32, h as u32, image::RGBA).unwrap();
            for (y, row) in src.rows_mut().enumerate() {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let v = if (x / 32 + y / 32) % 2 == 0 { 230 } else { 20 };
                    px.copy_from_slice(&[v, v, v, 255]);
                }
            }
            let pristine = src.to_packed();
            group.bench_function(format!("{}x{}", w, h), |b| {
                b.iter(|| {
                    src.reshape(w as u32, h as u32, image::RGBA).unwrap();
                    for (row, line) in src.rows_mut().zip(pristine.chunks_exact(w * 4)) {
                        row.copy_from_slice(line);
                    }
                    transform.apply(&mut src).unwrap()
                })
            });
        }
        group.finish();
    }
}

criterion_group!(benches, benchmark_convert, benchmark_transform);
criterion_main!(benches);
