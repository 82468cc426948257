//! End-to-end decoding: raw line levels in, persisted reading out.

use segtemp::capture::synth::WaveformBuilder;
use segtemp::capture::CaptureWindow;
use segtemp::config::{MonitorConfig, SamplerBackend};
use segtemp::decode::{DigitTable, FrameDecoder, FrameRejection};
use segtemp::hardware::{open_sampler, LinePins, ReplaySampler, SimulatedDisplay};
use segtemp::monitor::{IterationOutcome, Monitor};
use segtemp::storage::{read_current, FileSink, MemorySink};
use std::fs;

const GAP: usize = 100;

/// Segment bits (a..g) for digits 2, 4 and 5
const TWO: [u8; 7] = [1, 1, 0, 1, 1, 0, 1];
const FOUR: [u8; 7] = [0, 1, 1, 0, 0, 1, 1];
const FIVE: [u8; 7] = [1, 0, 1, 1, 0, 1, 1];

/// Hand-built window: idle, one clock pulse per bit, idle.
fn hand_built_window(idle: usize, bits: &[u8]) -> CaptureWindow {
    let mut clock = vec![false; idle];
    let mut data = vec![false; idle];
    for &bit in bits {
        let bit = bit == 1;
        clock.extend([true, false]);
        data.extend([bit, bit]);
    }
    clock.extend(vec![false; idle]);
    data.extend(vec![false; idle]);
    CaptureWindow::from_levels(&clock, &data)
}

fn test_config(dir: &std::path::Path) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.application.summary_interval = 0;
    config.sampler.sample_count = 1000;
    config.decoder.gap_threshold = GAP;
    config.storage.current_path = dir.join("current_temperature.txt");
    config.storage.log_path = dir.join("temperature_log.txt");
    config
}

#[test]
fn test_frame_spelling_245_decodes() {
    let bits: Vec<u8> = TWO.iter().chain(&FOUR).chain(&FIVE).copied().collect();
    let window = hand_built_window(GAP, &bits);

    let decoder = FrameDecoder::new(GAP, DigitTable::default());
    assert_eq!(decoder.decode(&window), Ok(245));
}

#[test]
fn test_twenty_bits_is_short_frame() {
    let bits: Vec<u8> = TWO.iter().chain(&FOUR).chain(&FIVE[..6]).copied().collect();
    let window = hand_built_window(GAP, &bits);

    let decoder = FrameDecoder::new(GAP, DigitTable::default());
    assert_eq!(
        decoder.decode(&window),
        Err(FrameRejection::ShortFrame { bits: 20 })
    );
}

#[test]
fn test_simulated_display_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let display = SimulatedDisplay::new(245, LinePins::new(2, 3), GAP).unwrap();
    let mut monitor = Monitor::new(&config, display, FileSink::from_config(&config.storage));

    let stats = monitor.run(Some(12)).unwrap().clone();

    assert_eq!(stats.commits, 1);
    assert_eq!(stats.rejections(), 0);
    assert_eq!(read_current(&config.storage.current_path).unwrap(), 245);
    assert_eq!(
        fs::read_to_string(&config.storage.log_path).unwrap(),
        "245\n"
    );
}

#[test]
fn test_commit_happens_on_threshold_iteration() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let display = SimulatedDisplay::new(104, LinePins::new(2, 3), GAP).unwrap();
    let mut monitor = Monitor::new(&config, display, MemorySink::default());

    for n in 1..10 {
        assert_eq!(
            monitor.run_iteration().unwrap(),
            IterationOutcome::Accumulating {
                candidate: 104,
                count: n
            }
        );
    }
    assert_eq!(monitor.run_iteration().unwrap(), IterationOutcome::Committed(104));
    assert_eq!(monitor.run_iteration().unwrap(), IterationOutcome::Holding(104));
    assert_eq!(monitor.sink().values, vec![104]);
}

#[test]
fn test_blank_display_is_never_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.stability.threshold = 1;
    let display = SimulatedDisplay::new(0, LinePins::new(2, 3), GAP).unwrap();
    let mut monitor = Monitor::new(&config, display, MemorySink::default());

    let stats = monitor.run(Some(5)).unwrap().clone();
    assert_eq!(stats.blanks, 5);
    assert_eq!(stats.commits, 0);
    assert!(monitor.sink().values.is_empty());
}

#[test]
fn test_recorded_capture_replays_through_monitor() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.stability.threshold = 2;

    let recording = WaveformBuilder::new(3).frame(987, GAP).unwrap().build();
    let capture_path = dir.path().join("display.cap");
    recording.save(&capture_path).unwrap();

    config.sampler.backend = SamplerBackend::Replay;
    config.sampler.replay_path = Some(capture_path.clone());
    config.sampler.sample_count = recording.len();
    config.validate().unwrap();

    let sampler = open_sampler(&config).unwrap();
    let mut monitor = Monitor::new(&config, sampler, MemorySink::default());
    monitor.run(Some(3)).unwrap();
    assert_eq!(monitor.sink().values, vec![987]);

    // The same file decodes offline
    let loaded = CaptureWindow::load(&capture_path).unwrap();
    assert_eq!(loaded, recording);
    assert_eq!(FrameDecoder::from_config(&config.decoder).decode(&loaded), Ok(987));
}

#[test]
fn test_recording_from_simulated_sampler() {
    let pins = LinePins::new(5, 6);
    let mut display = SimulatedDisplay::new(321, pins, GAP).unwrap();
    let window = CaptureWindow::capture(&mut display, pins, 2000).unwrap();
    assert_eq!(window.len(), 2000);

    let mut replay = ReplaySampler::new(window.clone(), pins);
    let again = CaptureWindow::capture(&mut replay, pins, 2000).unwrap();
    assert_eq!(again, window);

    let decoder = FrameDecoder::new(GAP, DigitTable::default());
    assert_eq!(decoder.decode(&window), Ok(321));
}
