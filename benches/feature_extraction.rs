use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use meetscribe::audio::wav::pcm_to_f32;
use meetscribe::diarization::{FeatureConfig, GaussianMixture, extract_features};
use std::f32::consts::PI;

/// Synthetic multi-tone signal standing in for recorded speech.
fn synth_audio(seconds: f64) -> Vec<f32> {
    let rate = meetscribe::defaults::SAMPLE_RATE;
    let n = (seconds * rate as f64) as usize;
    let pcm: Vec<i16> = (0..n)
        .map(|i| {
            let t = i as f32 / rate as f32;
            let v = (2.0 * PI * 220.0 * t).sin() * 0.4 + (2.0 * PI * 1760.0 * t).sin() * 0.2;
            (v * i16::MAX as f32 * 0.5) as i16
        })
        .collect();
    pcm_to_f32(&pcm)
}

fn bench_feature_extraction(c: &mut Criterion) {
    let config = FeatureConfig::default();
    let mut group = c.benchmark_group("extract_features");

    for seconds in [10u64, 60, 300] {
        let audio = synth_audio(seconds as f64);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{seconds}s")),
            &audio,
            |b, audio| b.iter(|| extract_features(black_box(audio), &config)),
        );
    }
    group.finish();
}

fn bench_clustering(c: &mut Criterion) {
    let config = FeatureConfig::default();
    let audio = synth_audio(120.0);
    let features = extract_features(&audio, &config);

    c.bench_function("gmm_fit_predict_120s_k2", |b| {
        b.iter(|| {
            GaussianMixture::new(2)
                .fit_predict(black_box(&features))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_feature_extraction, bench_clustering);
criterion_main!(benches);
