use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, Criterion, SamplingMode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use divbwt::DivSufSort;

const SAMPLE_SIZE: usize = 10;
const WARM_UP_TIME: Duration = Duration::from_secs(5);
const MEASURE_TIME: Duration = Duration::from_secs(10);

fn random_text(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0xD1B7);
    (0..len).map(|_| rng.gen()).collect()
}

fn english_like_text(len: usize) -> Vec<u8> {
    // Skewed small alphabet with word-ish structure, closer to natural
    // language than uniform bytes.
    let mut rng = StdRng::seed_from_u64(0x7E87);
    let letters = b"etaoinshrdlu ";
    (0..len).map(|_| letters[rng.gen_range(0..letters.len())]).collect()
}

fn repetitive_text(len: usize) -> Vec<u8> {
    b"abcabd".iter().copied().cycle().take(len).collect()
}

fn criterion_suffix_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("suffix_array");
    configure(&mut group);

    for (label, text) in corpora() {
        let mut engine = DivSufSort::new();
        let mut sa = vec![0i32; text.len()];
        group.bench_function(format!("divbwt/{label}/n={}", text.len()), |b| {
            b.iter(|| engine.compute_suffix_array(&text, &mut sa).unwrap());
        });
    }
}

fn criterion_bwt(c: &mut Criterion) {
    let mut group = c.benchmark_group("bwt");
    configure(&mut group);

    for (label, text) in corpora() {
        let mut engine = DivSufSort::new();
        let mut sa = vec![0i32; text.len()];
        group.bench_function(format!("divbwt/{label}/n={}", text.len()), |b| {
            b.iter(|| engine.compute_bwt(&text, &mut sa).unwrap());
        });
    }
}

fn corpora() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("random", random_text(1 << 20)),
        ("english", english_like_text(1 << 20)),
        ("repetitive", repetitive_text(1 << 20)),
    ]
}

fn configure(group: &mut BenchmarkGroup<WallTime>) {
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP_TIME);
    group.measurement_time(MEASURE_TIME);
    group.sampling_mode(SamplingMode::Flat);
}

criterion_group!(benches, criterion_suffix_array, criterion_bwt);
criterion_main!(benches);
