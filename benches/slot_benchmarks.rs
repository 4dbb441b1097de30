use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, distr::Uniform};
use timing_bloom::{SlotEncoding, SlotStore, Slots, TickWindow};

const ENCODINGS: [SlotEncoding; 2] = [SlotEncoding::Byte, SlotEncoding::Nibble];

// Helper function to generate random indices within the slot range
fn generate_random_indices(count: usize, num_slots: usize) -> Vec<usize> {
    let mut rng = rand::rng();
    let range = Uniform::new(0, num_slots).unwrap();
    (0..count).map(|_| rng.sample(range)).collect()
}

// Store with roughly half the slots written at random ticks
fn populated_store(encoding: SlotEncoding, num_slots: usize) -> Slots {
    let mut rng = rand::rng();
    let mut slots = Slots::new(encoding, num_slots).unwrap();
    for index in generate_random_indices(num_slots / 2, num_slots) {
        let tick = rng.random_range(1..=encoding.max_tick());
        slots.add([index], tick).unwrap();
    }
    slots
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("slots_add");

    for encoding in ENCODINGS {
        for &num_indexes in &[7, 1000] {
            group.bench_with_input(
                BenchmarkId::new(format!("{encoding:?}"), num_indexes),
                &num_indexes,
                |b, &count| {
                    let mut slots = Slots::new(encoding, 1_000_000).unwrap();
                    let indexes = generate_random_indices(count, 1_000_000);
                    b.iter(|| slots.add(indexes.iter().copied(), 5).unwrap());
                },
            );
        }
    }

    group.finish();
}

fn bench_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("slots_contains");

    for encoding in ENCODINGS {
        let mut slots = Slots::new(encoding, 1_000_000).unwrap();
        let indexes = generate_random_indices(7, 1_000_000);
        slots.add(indexes.iter().copied(), 5).unwrap();
        let window = TickWindow::new(2, 9);

        group.bench_function(format!("{encoding:?}"), |b| {
            b.iter(|| slots.contains(indexes.iter().copied(), window).unwrap())
        });
    }

    group.finish();
}

fn bench_decay(c: &mut Criterion) {
    let mut group = c.benchmark_group("slots_decay");
    group.sample_size(20);

    for encoding in ENCODINGS {
        for &num_slots in &[100_000, 10_000_000] {
            group.bench_with_input(
                BenchmarkId::new(format!("{encoding:?}"), num_slots),
                &num_slots,
                |b, &n| {
                    b.iter_batched(
                        || populated_store(encoding, n),
                        |mut slots| slots.decay(TickWindow::new(12, 4)).unwrap(),
                        criterion::BatchSize::LargeInput,
                    )
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_add, bench_contains, bench_decay);
criterion_main!(benches);
