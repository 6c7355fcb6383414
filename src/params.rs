use num_derive::FromPrimitive;
use num_traits::clamp;
use std::f64::consts::PI;
use strum::EnumString;

/// Lowest accepted cutoff, Hz.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest accepted cutoff as a fraction of the sample rate. Ten percent of
/// safety margin below Nyquist.
pub const MAX_CUTOFF_RATIO: f32 = 0.45;

/// Response modes of the ZDF core.
///
/// All three are taps on the same four-stage pipeline; switching modes does
/// not disturb the stages.
#[derive(PartialEq, Eq, Copy, Clone, Debug, FromPrimitive, EnumString)]
pub enum ZdfMode {
    /// 24 dB/octave low-pass: the fourth stage output.
    #[strum(serialize = "LP24")]
    Lp24 = 0,
    /// 12 dB/octave band-pass: third stage minus fourth.
    #[strum(serialize = "BP12")]
    Bp12 = 1,
    /// 24 dB/octave high-pass: input minus the low-pass output.
    #[strum(serialize = "HP24")]
    Hp24 = 2,
}

/// Response modes of the nonlinear core.
///
/// Each is a fixed linear combination of intermediate values from the two
/// per-sample passes and the previous sample.
#[derive(PartialEq, Eq, Copy, Clone, Debug, FromPrimitive, EnumString)]
pub enum LadderMode {
    #[strum(serialize = "LP24")]
    Lp24 = 0,
    #[strum(serialize = "HP24")]
    Hp24 = 1,
    #[strum(serialize = "BP24")]
    Bp24 = 2,
    #[strum(serialize = "LP18")]
    Lp18 = 3,
    #[strum(serialize = "BP18")]
    Bp18 = 4,
    #[strum(serialize = "HP6")]
    Hp6 = 5,
}

impl std::fmt::Display for ZdfMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::fmt::Display for LadderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub fn clamp_cutoff(hz: f32, sample_rate: f32) -> f32 {
    clamp(hz, MIN_CUTOFF_HZ, sample_rate * MAX_CUTOFF_RATIO)
}

pub fn clamp_unit(x: f32) -> f32 {
    clamp(x, 0.0, 1.0)
}

/// Bilinear pre-warp coefficient G = tan(pi * fc / fs).
///
/// With G in place of the naive w*T/2 the digital one-pole lands exactly on
/// the analog -3 dB point at fc, independent of sample rate.
pub fn warp_coefficient(cutoff_hz: f32, sample_rate: f32) -> f32 {
    (PI * cutoff_hz as f64 / sample_rate as f64).tan() as f32
}

/// Feedback gain for the ZDF loop. The factor of four makes up for the
/// 24 dB cumulative attenuation of the stage cascade, so unity loop gain
/// (self-oscillation) sits at resonance = 1.
pub fn feedback_gain(resonance: f32) -> f32 {
    clamp_unit(resonance) * 4.0
}

// Cutoff-control mapping of the nonlinear core. The control travels in
// pitch units (12 per octave, 69 = A440) and is squeezed onto [0, 0.99]
// with the scale/offset the original patch used for its 0..127 range.
pub(crate) const PITCH_SCALE: f32 = 0.90193;
pub(crate) const PITCH_OFFSET: f32 = 7.29;
pub(crate) const PITCH_NORM: f32 = 127.0;

pub fn pitch_of_hz(hz: f32) -> f32 {
    69.0 + 12.0 * (hz / 440.0).log2()
}

/// Sample-rate terms of the nonlinear core's frequency map, recomputed on
/// every sample-rate change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FrequencyMap {
    /// sqrt(clamp(12.5/fs, 1e-4, 1)); the normalized frequency floor.
    pub scale: f32,
    /// -ln(scale); expands the [0,1) control onto the log-frequency span.
    pub warp: f32,
}

impl FrequencyMap {
    pub fn new(sample_rate: f32) -> Self {
        let scale = clamp(12.5 / sample_rate as f64, 1e-4, 1.0).sqrt();
        FrequencyMap {
            scale: scale as f32,
            warp: -(scale.ln()) as f32,
        }
    }

    /// Map a cutoff in Hz onto the clamped control value.
    pub fn control(self, cutoff_hz: f32, sample_rate: f32) -> f32 {
        let hz = clamp_cutoff(cutoff_hz, sample_rate);
        let ctl = (pitch_of_hz(hz) * PITCH_SCALE + PITCH_OFFSET) / PITCH_NORM;
        clamp(ctl, 0.0, 0.99)
    }
}
