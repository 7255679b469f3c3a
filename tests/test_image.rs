// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use rtedv_processor::{
    image,
    image::{bytes_per_pixel, encode_jpeg, FourCC, Image},
    Error,
};
use std::{error::Error as StdError, time::Instant};

#[test]
fn test_formats() -> Result<(), Box<dyn StdError>> {
    let img = Image::new(1920, 1080, image::RGBA)?;
    println!("{}", img);
    assert_eq!(img.size(), 8294400);
    assert_eq!(img.channels(), 4);

    let img = Image::new(1920, 1080, image::GREY)?;
    println!("{}", img);
    assert_eq!(img.size(), 2073600);
    assert_eq!(img.channels(), 1);

    assert_eq!(bytes_per_pixel(image::RGBA)?, 4);
    assert_eq!(bytes_per_pixel(image::GREY)?, 1);
    assert!(matches!(
        Image::new(64, 64, FourCC(*b"NV12")),
        Err(Error::UnsupportedFormat { .. })
    ));

    Ok(())
}

#[test]
fn test_stride_padding() -> Result<(), Box<dyn StdError>> {
    let img = Image::new(1918, 1080, image::RGBA)?;
    assert_eq!(img.row_bytes(), 7672);
    assert_eq!(img.stride(), 7680);
    assert_eq!(img.size(), 7680 * 1080);

    let img = Image::with_alignment(33, 2, image::GREY, 64)?;
    assert_eq!(img.stride(), 64);
    assert_eq!(img.row(1).len(), 33);
    assert_eq!(img.rows().count(), 2);

    let img = Image::with_alignment(33, 2, image::GREY, 1)?;
    assert_eq!(img.stride(), 33);

    Ok(())
}

#[test]
fn test_invalid() -> Result<(), Box<dyn StdError>> {
    assert!(matches!(
        Image::new(0, 10, image::RGBA),
        Err(Error::InvalidDimensions { .. })
    ));
    assert!(matches!(
        Image::new(10, 0, image::RGBA),
        Err(Error::InvalidDimensions { .. })
    ));
    assert!(matches!(
        Image::with_alignment(10, 10, image::RGBA, 0),
        Err(Error::InvalidConfig(_))
    ));
    Ok(())
}

#[test]
fn test_oversized() -> Result<(), Box<dyn StdError>> {
    assert!(Image::new(u32::MAX, u32::MAX, image::RGBA).is_err());
    assert!(Image::new(i32::MAX as u32, i32::MAX as u32, image::GREY).is_err());

    let mut img = Image::new(16, 16, image::GREY)?;
    assert!(img.reshape(u32::MAX, u32::MAX, image::RGBA).is_err());
    assert_eq!((img.width(), img.height()), (16, 16));
    assert_eq!(img.format(), image::GREY);
    assert_eq!(img.size(), 16 * 16);
    Ok(())
}

#[test]
fn test_reshape() -> Result<(), Box<dyn StdError>> {
    let mut img = Image::new(640, 480, image::RGBA)?;
    img.row_mut(0)[0] = 7;
    let ptr = img.as_ptr();

    // Same geometry keeps storage and contents.
    assert!(!img.reshape(640, 480, image::RGBA)?);
    assert_eq!(img.as_ptr(), ptr);
    assert_eq!(img.row(0)[0], 7);

    assert!(img.reshape(320, 240, image::GREY)?);
    assert_eq!((img.width(), img.height()), (320, 240));
    assert_eq!(img.format(), image::GREY);
    assert_eq!(img.stride(), 320);
    assert_eq!(img.row(0)[0], 0);

    assert!(img.reshape(0, 240, image::GREY).is_err());
    assert_eq!(img.width(), 320);

    Ok(())
}

#[test]
fn test_rows_skip_padding() -> Result<(), Box<dyn StdError>> {
    let mut img = Image::with_alignment(3, 3, image::RGBA, 16)?;
    for row in img.rows_mut() {
        row.fill(0xFF);
    }
    let data = img.as_slice();
    for y in 0..3 {
        assert!(data[y * 16..y * 16 + 12].iter().all(|&b| b == 0xFF));
        assert!(data[y * 16 + 12..(y + 1) * 16].iter().all(|&b| b == 0));
    }
    assert_eq!(img.pixel(2, 2), &[0xFF; 4]);
    assert_eq!(img.to_packed().len(), 3 * 3 * 4);
    Ok(())
}

#[test]
fn test_jpeg() -> Result<(), Box<dyn StdError>> {
    let mut img = Image::new(1918, 1080, image::RGBA)?;
    for (y, row) in img.rows_mut().enumerate() {
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            px.copy_from_slice(&[(x % 256) as u8, (y % 256) as u8, 128, 255]);
        }
    }

    let now = Instant::now();
    let jpeg = encode_jpeg(&img, 90)?;
    println!("rgba jpeg {} bytes in {:?}", jpeg.len(), now.elapsed());
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    img.reshape(641, 480, image::GREY)?;
    let jpeg = encode_jpeg(&img, 75)?;
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    Ok(())
}
