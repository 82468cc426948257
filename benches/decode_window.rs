//! Criterion benchmarks for the per-iteration decode path.
//!
//! A monitor iteration decodes one full capture window (100 000 samples by
//! default) before it can poll again, so decode time eats directly into the
//! sampling budget.
//!
//! Run with: cargo bench --bench decode_window

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use segtemp::capture::synth::WaveformBuilder;
use segtemp::decode::{find_sync, DigitTable, FrameDecoder};
use segtemp::monitor::process_window;
use segtemp::stability::StabilityFilter;

const WINDOW: usize = 100_000;
const GAP: usize = 1000;

/// Full decode of a default-sized window at several frame positions.
///
/// The later the frame sits in the window, the longer the sync scan runs.
fn decode_full_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_window");
    group.throughput(Throughput::Elements(WINDOW as u64));

    let decoder = FrameDecoder::new(GAP, DigitTable::default());

    for (name, lead) in [("frame_at_start", 0), ("frame_at_middle", WINDOW / 2)] {
        let window = WaveformBuilder::new(8)
            .bits([true, false, true])
            .idle(lead.max(GAP))
            .display(245)
            .unwrap()
            .pad_to(WINDOW)
            .build();

        group.bench_with_input(BenchmarkId::new("decode", name), &window, |b, w| {
            b.iter(|| decoder.decode(black_box(w)));
        });
    }

    group.finish();
}

/// Worst case: a window with no idle gap is scanned end to end.
fn sync_scan_without_gap(c: &mut Criterion) {
    let window = WaveformBuilder::new(1)
        .bits(std::iter::repeat(true).take(WINDOW / 2))
        .build();

    c.bench_function("find_sync_no_gap", |b| {
        b.iter(|| find_sync(black_box(&window), GAP));
    });
}

/// Decode plus debounce, as done once per monitor iteration.
fn process_window_steady_state(c: &mut Criterion) {
    let decoder = FrameDecoder::new(GAP, DigitTable::default());
    let window = WaveformBuilder::new(8)
        .frame(245, GAP)
        .unwrap()
        .pad_to(WINDOW)
        .build();
    let mut filter = StabilityFilter::new(10);

    c.bench_function("process_window", |b| {
        b.iter(|| process_window(black_box(&window), &decoder, &mut filter));
    });
}

criterion_group!(
    benches,
    decode_full_window,
    sync_scan_without_gap,
    process_window_steady_state
);
criterion_main!(benches);
