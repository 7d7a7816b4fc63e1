// ABOUTME: Benchmark for frame extraction on small and medium synthetic GIFs
// ABOUTME: Covers full decode, compositing plus PNG re-encoding, and contact sheets

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gifpeek_decode::{DecodeLimits, SheetOptions, contact_sheet, decode};
use std::borrow::Cow;
use std::hint::black_box;

const PALETTE: [u8; 6] = [0, 0, 0, 255, 255, 255];

fn make_gif(width: u16, height: u16, frames: usize) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut buffer, width, height, &PALETTE).unwrap();
        for i in 0..frames {
            let mut indices = vec![0u8; width as usize * height as usize];
            let x = i % width as usize;
            let y = i % height as usize;
            indices[y * width as usize + x] = 1;
            let frame = gif::Frame {
                width,
                height,
                delay: 4 + i as u16,
                buffer: Cow::Owned(indices),
                ..gif::Frame::default()
            };
            encoder.write_frame(&frame).unwrap();
        }
    }
    buffer
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let limits = DecodeLimits::default();

    for (label, width, height, frames) in [("small", 2, 2, 2), ("medium", 80, 60, 8), ("large", 320, 240, 24)] {
        let data = make_gif(width, height, frames);
        group.bench_with_input(BenchmarkId::new("gif", label), &data, |b, data| {
            b.iter(|| decode(black_box(data), &limits).unwrap())
        });
    }

    group.finish();
}

fn benchmark_contact_sheet(c: &mut Criterion) {
    let set = decode(&make_gif(80, 60, 8), &DecodeLimits::default()).unwrap();
    let options = SheetOptions::builder().count(8).build();

    c.bench_function("contact_sheet_8", |b| {
        b.iter(|| contact_sheet(black_box(&set), &options).unwrap())
    });
}

criterion_group!(benches, benchmark_decode, benchmark_contact_sheet);
criterion_main!(benches);
