//! Virtual-analog emulation of the four-pole resonant transistor ladder,
//! the tone-shaping stage of a subtractive synthesizer voice.
//!
//! Two filter cores share one control surface ([`Ladder`]):
//!
//! - [`ZdfLadder`] — zero-delay-feedback topology built from trapezoidal
//!   integrators. The implicit per-sample solve removes the unit delay of a
//!   naive recursive ladder, so the cutoff is sample-accurate and the loop
//!   is stable up to the self-oscillation boundary. Three response modes.
//! - [`HuovilainenLadder`] — richer nonlinear model running two explicit
//!   passes per sample to approximate the circular feedback dependency,
//!   with thermal-noise injection, frequency-dependent resonance
//!   compensation and per-stage saturation. Six response modes.
//!
//! Both cores are generic over [`Sample`], the arithmetic substrate:
//! `f32`/`f64` scalars, [`Lanes`] for N filter channels in lock-step, and
//! [`Q16`] fixed point. The backends run the same recursion and agree
//! within their representable precision.
//!
//! Everything upstream of the filter — envelopes, portamento, key
//! tracking, resonance ramps — is expected to hand in plain per-sample
//! values; nothing here allocates, blocks or fails on the audio thread.
//!
//! ```
//! use valadder::{Ladder, ZdfLadder, ZdfMode};
//!
//! let mut filter = ZdfLadder::<f32>::new(48000.0);
//! filter.set_cutoff(800.0);
//! filter.set_resonance(0.7);
//! filter.set_mode(ZdfMode::Lp24);
//! let out = filter.process(0.25);
//! assert!(out.is_finite());
//! ```

mod filter;
mod fixed;
mod huovilainen;
mod lanes;
mod noise;
mod numeric;
mod params;
mod zdf;

pub use filter::Ladder;
pub use fixed::Q16;
pub use huovilainen::HuovilainenLadder;
pub use lanes::{Lanes, Lanes4, Lanes8};
pub use noise::Noise;
pub use numeric::{Sample, DENORMAL_EPS_F32, DENORMAL_EPS_F64};
pub use params::{
    clamp_cutoff, feedback_gain, pitch_of_hz, warp_coefficient, LadderMode, ZdfMode,
    MAX_CUTOFF_RATIO, MIN_CUTOFF_HZ,
};
pub use zdf::ZdfLadder;
