use castape_core::{PulseEncoder, SampleFormat};
use hound::{WavSpec, WavWriter};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_castape(args: &[&str]) -> (Output, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_castape"))
        .args(args)
        .output()
        .expect("Failed to execute castape");

    let text = String::from_utf8_lossy(&output.stderr).to_string()
        + &String::from_utf8_lossy(&output.stdout);
    (output, text)
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_high_speed_modulate_then_demodulate() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("program.cas");
    let audio = dir.path().join("program.wav");
    let decoded = dir.path().join("decoded.cas");
    let data: Vec<u8> = (0..=255).rev().collect();
    fs::write(&input, &data).unwrap();

    let (result, text) = run_castape(&["modulate", path_str(&input), path_str(&audio)]);
    assert!(result.status.success(), "modulate failed: {}", text);
    assert!(text.contains("Encoded"), "unexpected output: {}", text);

    let reader = hound::WavReader::open(&audio).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.bits_per_sample, 8);

    let (result, text) = run_castape(&[
        "demodulate",
        path_str(&audio),
        path_str(&decoded),
        "--high-speed",
    ]);
    assert!(result.status.success(), "demodulate failed: {}", text);
    assert_eq!(fs::read(&decoded).unwrap(), data);
}

#[test]
fn test_low_speed_roundtrip_with_default_paths() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tape.bin");
    let data = b"\x7f\x7f\xa5LOW SPEED".to_vec();
    fs::write(&input, &data).unwrap();

    let (result, text) = run_castape(&["modulate", path_str(&input), "--low-speed"]);
    assert!(result.status.success(), "modulate failed: {}", text);

    let audio = dir.path().join("tape.wav");
    assert!(audio.exists(), "default WAV path was not used");

    let (result, text) = run_castape(&["demodulate", path_str(&audio), "-v"]);
    assert!(result.status.success(), "demodulate failed: {}", text);
    assert!(text.contains("Sync pulse found"), "unexpected output: {}", text);

    let decoded = dir.path().join("tape.cas");
    assert_eq!(fs::read(&decoded).unwrap(), data);
}

#[test]
fn test_silent_recording_writes_empty_image() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("silence.wav");
    let output = dir.path().join("silence.cas");

    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 8,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&audio, spec).unwrap();
    for _ in 0..44100 {
        writer.write_sample(0i8).unwrap();
    }
    writer.finalize().unwrap();

    let (result, text) = run_castape(&["demodulate", path_str(&audio), path_str(&output)]);
    assert!(result.status.success(), "demodulate should not fail: {}", text);
    assert!(text.contains("No sync pulse found"), "unexpected output: {}", text);
    assert_eq!(fs::read(&output).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_demodulate_16bit_stereo_recording() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("stereo.wav");
    let output = dir.path().join("stereo.cas");
    let data = vec![0xA5, 0x3C, 0x00, 0xFF];

    let format = SampleFormat::new(16, 48000);
    let samples = PulseEncoder::with_format(format).encode(&data);
    let spec = WavSpec {
        channels: 2,
        sample_rate: 48000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&audio, spec).unwrap();
    for sample in samples {
        writer.write_sample(sample as i16).unwrap();
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    let (result, text) = run_castape(&["demodulate", path_str(&audio), path_str(&output)]);
    assert!(result.status.success(), "demodulate failed: {}", text);
    assert_eq!(fs::read(&output).unwrap(), data);
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.wav");

    let (result, _) = run_castape(&["demodulate", path_str(&missing)]);
    assert!(!result.status.success());
}
