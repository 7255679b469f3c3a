// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use criterion::{criterion_group, criterion_main, Criterion};
use rtedv_processor::image::{self, encode_jpeg, Image};

pub fn benchmark_encode(c: &mut Criterion) {
    for fmt in [image::RGBA, image::GREY] {
        let mut group = c.benchmark_group(format!("jpeg/{}", fmt));
        for dim in [(320, 240), (640, 480), (1280, 720), (1920, 1080)].iter() {
            let mut img = Image::new(dim.0, dim.1, fmt).unwrap();
            for (y, row) in img.rows_mut().enumerate() {
                for (x, b) in row.iter_mut().enumerate() {
                    *b = ((x ^ y) & 0xFF) as u8;
                }
            }
            group.bench_with_input(format!("{}x{}", dim.0, dim.1), &img, |b, img| {
                b.iter(|| encode_jpeg(img, 90).unwrap())
            });
        }
        group.finish();
    }
}

criterion_group!(benches, benchmark_encode);
criterion_main!(benches);
