//! Analyzer Performance Benchmarks
//!
//! Live ticks must complete well under one 60 Hz video frame; these measure
//! one full prepare pass per analyzer at typical settings.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sc_core::{AnalysisConfig, DetailLevel};
use sc_dsp::fixed::OfflineFixedAnalyzer;
use sc_dsp::logfreq::{LogFreqAnalyzer, LogVariant};
use sc_dsp::multiband::{default_band_plan, MultiBandAnalyzer};

const SAMPLE_RATE: f64 = 48000.0;

fn generate_test_audio(samples: usize) -> Vec<f64> {
    (0..samples)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE;
            (2.0 * std::f64::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_fixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fixed FFT");
    let input = generate_test_audio(131072);

    for &size in &[2048usize, 4096, 8192, 16384] {
        group.bench_with_input(BenchmarkId::new("prepare", size), &size, |b, &size| {
            let mut analyzer = OfflineFixedAnalyzer::new(size);
            b.iter(|| analyzer.prepare(black_box(&input), SAMPLE_RATE, 65536));
        });
    }
    group.finish();
}

fn bench_multiband(c: &mut Criterion) {
    let input = generate_test_audio(131072);
    c.bench_function("multiband prepare", |b| {
        let mut analyzer = MultiBandAnalyzer::new(&default_band_plan());
        b.iter(|| analyzer.prepare(black_box(&input), SAMPLE_RATE, 65536));
    });
}

fn bench_logfreq(c: &mut Criterion) {
    let mut group = c.benchmark_group("Log-frequency");
    let input = generate_test_audio(131072);
    let range = AnalysisConfig {
        f_min: 20.0,
        f_max: 8000.0,
        ..Default::default()
    }
    .resolve(SAMPLE_RATE);

    for detail in [DetailLevel::Low, DetailLevel::Medium, DetailLevel::High] {
        for variant in [LogVariant::Cqt, LogVariant::Wavelet] {
            group.bench_with_input(
                BenchmarkId::new(format!("{variant:?}"), format!("{detail:?}")),
                &detail,
                |b, &detail| {
                    let mut analyzer = LogFreqAnalyzer::new(variant);
                    b.iter(|| {
                        analyzer.prepare(black_box(&input), SAMPLE_RATE, 65536, &range, detail)
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_fixed, bench_multiband, bench_logfreq);
criterion_main!(benches);
