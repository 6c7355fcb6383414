//! Shared signal helpers for the integration tests.

#![allow(dead_code)]

pub const SAMPLE_RATE: f32 = 48000.0;

/// Sine tone at `freq` Hz, `amp` peak, `len` samples.
pub fn sine(freq: f32, amp: f32, len: usize, sample_rate: f32) -> Vec<f32> {
    (0..len)
        .map(|n| amp * (2.0 * std::f32::consts::PI * freq * n as f32 / sample_rate).sin())
        .collect()
}

pub fn rms(samples: &[f32]) -> f32 {
    let sum: f64 = samples.iter().map(|&x| x as f64 * x as f64).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Peak amplitude of a settled sine, estimated from its RMS.
pub fn amplitude(samples: &[f32]) -> f32 {
    rms(samples) * std::f32::consts::SQRT_2
}

pub fn assert_all_finite(samples: &[f32], what: &str) {
    for (n, &x) in samples.iter().enumerate() {
        assert!(x.is_finite(), "{what}: sample {n} is {x}");
    }
}

/// Rough frequency estimate from zero crossings, Hz.
pub fn zero_crossing_freq(samples: &[f32], sample_rate: f32) -> f32 {
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    crossings as f32 * sample_rate / (2.0 * samples.len() as f32)
}
