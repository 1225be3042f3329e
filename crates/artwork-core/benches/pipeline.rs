//! Benchmarks for derivative generation.
//!
//! Run with: cargo bench -p artwork-core

use artwork_core::config::LimitsConfig;
use artwork_core::pipeline::{
    scale_dimensions, DecoderRegistry, DecoderSelector, JpegWriter, Scaler, SourceKind,
};
use artwork_core::BoundBox;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// A US Letter page rendered at 72 DPI.
fn page_bitmap() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(612, 792, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn benchmark_scale_dimensions(c: &mut Criterion) {
    c.bench_function("scale_dimensions", |b| {
        b.iter(|| scale_dimensions(black_box((2000, 1500)), black_box(BoundBox::SMALL)))
    });
}

fn benchmark_scale(c: &mut Criterion) {
    let img = page_bitmap();
    let scaler = Scaler::new();

    c.bench_function("scale_lanczos3_small", |b| {
        b.iter(|| scaler.scale(black_box(&img), BoundBox::SMALL))
    });
    c.bench_function("scale_lanczos3_thumbnail", |b| {
        b.iter(|| scaler.scale(black_box(&img), BoundBox::THUMBNAIL))
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let small = Scaler::new().scale(&page_bitmap(), BoundBox::SMALL);
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("bench-small.jpg");
    let writer = JpegWriter::default();

    c.bench_function("jpeg_write_small", |b| {
        b.iter(|| writer.write(black_box(&small), &dest).unwrap())
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.png");
    page_bitmap()
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();

    let selector = DecoderSelector::new(DecoderRegistry::standard(None), LimitsConfig::default());
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("decode_png_page", |b| {
        b.iter(|| {
            let _ = rt.block_on(selector.decode(black_box(&path), SourceKind::Raster));
        })
    });
}

criterion_group!(
    benches,
    benchmark_scale_dimensions,
    benchmark_scale,
    benchmark_encode,
    benchmark_decode,
);
criterion_main!(benches);
