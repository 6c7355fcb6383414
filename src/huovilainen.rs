use crate::filter::Ladder;
use crate::numeric::Sample;
use crate::params::{self, FrequencyMap, LadderMode};
use log::debug;
use num::FromPrimitive;

// Nonlinear ladder after Huovilainen's improved Moog model, as it appears
// in the widely circulated gen~ moogladder patch.
//
// The feedback term depends on the current sample's own output, which the
// model resolves with two explicit passes instead of an implicit solve:
// pass one runs the ladder from the previous sample's history to get a
// provisional output, pass two re-derives the feedback from the current
// (noise-injected) input and that provisional output, and the corrected
// pass-two values are what gets stored. The approximation is deliberate;
// it is what gives the model its character.

/// Thermal noise injection gain. Johnson noise scale: far below audibility,
/// enough to keep the recursion off exact zero.
const THERMAL: f32 = 1e-11;

/// Per-stage pole mixing coefficient of the original patch.
const STAGE_MIX: f32 = 0.3;

/// Nonlinear dual-pass ladder with six response modes.
///
/// Unlike [`ZdfLadder`](crate::ZdfLadder), this core follows its
/// dataflow-patch origin and takes per-sample control signals:
/// [`process`](HuovilainenLadder::process) wants the audio sample, a
/// resonance modulation, a cutoff envelope in pitch units, and a thermal
/// noise sample (see [`Noise`](crate::Noise)).
pub struct HuovilainenLadder<S: Sample> {
    sample_rate: f32,
    freq_map: FrequencyMap,
    cutoff_hz: S,
    cutoff_ctl: S,
    resonance: S,
    drive: f32,
    mode: i32,
    input_bias: i32,

    // Ladder memory: four stage registers, four output-mix taps, the
    // saturator's one-sample memory and the previous input.
    stage: [S; 4],
    fb_prev: S,
    lp24_prev: S,
    out_prev: S,
    pass1_prev: S,
    sat: S,
    prev_in: S,
}

impl<S: Sample> HuovilainenLadder<S> {
    pub fn new(sample_rate: f32) -> Self {
        debug!("huovilainen ladder: sr={} lanes={}", sample_rate, S::LANES);
        let mut filter = HuovilainenLadder {
            sample_rate,
            freq_map: FrequencyMap::new(sample_rate),
            cutoff_hz: S::zero(),
            cutoff_ctl: S::zero(),
            resonance: S::zero(),
            drive: 0.0,
            mode: LadderMode::Lp24 as i32,
            input_bias: 1,
            stage: [S::zero(); 4],
            fb_prev: S::zero(),
            lp24_prev: S::zero(),
            out_prev: S::zero(),
            pass1_prev: S::zero(),
            sat: S::zero(),
            prev_in: S::zero(),
        };
        filter.set_cutoff(1000.0);
        filter.set_resonance(0.5);
        filter
    }

    /// Per-lane cutoff in Hz. Slices shorter than the lane count leave the
    /// remaining lanes at the last given value.
    pub fn set_cutoff_lanes(&mut self, hz: &[f32]) {
        let sr = self.sample_rate;
        self.cutoff_hz = S::from_fn(|i| params::clamp_cutoff(hz[i.min(hz.len() - 1)], sr));
        self.update_cutoff_control();
    }

    /// Per-lane resonance in [0, 1].
    pub fn set_resonance_lanes(&mut self, resonance: &[f32]) {
        self.resonance = S::from_fn(|i| {
            params::clamp_unit(resonance[i.min(resonance.len() - 1)])
        });
    }

    pub fn set_mode(&mut self, mode: LadderMode) {
        self.mode = mode as i32;
    }

    /// Raw stored mode index; may be outside the known set, in which case
    /// output selection falls back to [`LadderMode::Lp24`].
    pub fn mode_index(&self) -> i32 {
        self.mode
    }

    /// See [`ZdfLadder::set_input_bias`](crate::ZdfLadder::set_input_bias).
    pub fn set_input_bias(&mut self, steps: i32) {
        self.input_bias = steps;
    }

    fn update_cutoff_control(&mut self) {
        let map = self.freq_map;
        let hz = self.cutoff_hz;
        let sr = self.sample_rate;
        self.cutoff_ctl = S::from_fn(|i| map.control(hz.lane(i), sr));
    }

    /// Advance one sample.
    ///
    /// `resonance_mod` is the external resonance ramp's per-sample value in
    /// [0, 1]; the effective resonance moves a quarter of the way from the
    /// stored base toward `1.05 * resonance_mod`, so a sustained 1.0 pushes
    /// the loop slightly past unity into self-oscillation. `envelope_mod`
    /// shifts the cutoff control in pitch units (12 per octave), matching
    /// the semitone calibration of external filter envelopes. `noise` is
    /// white noise in [-1, 1], injected at the thermal level.
    pub fn process(&mut self, audio: S, resonance_mod: S, envelope_mod: S, noise: S) -> S {
        let one = S::splat(1.0);

        let x = (audio * S::splat(1.0 + self.drive) + S::splat(THERMAL) * noise)
            .bias(self.input_bias);

        let rc = self.resonance
            + ((resonance_mod.max(1e-5) * S::splat(1.05) - self.resonance) * S::splat(0.25))
                .clamp(-1.0, 1.0);

        // Cutoff control to normalized frequency: cubic approximation of
        // exp(w/32), raised to the 32nd power by repeated squaring.
        let ctl = (self.cutoff_ctl
            + envelope_mod * S::splat(params::PITCH_SCALE / params::PITCH_NORM))
        .clamp(0.0, 0.99);
        let w = ctl * S::splat(self.freq_map.warp);
        let p = S::splat(0.99999636)
            + S::splat(0.031261316) * w
            + S::splat(0.00048274797) * w * w
            + S::splat(5.949053e-6) * w * w * w;
        let p2 = p * p;
        let p4 = p2 * p2;
        let p8 = p4 * p4;
        let p16 = p8 * p8;
        let fc = p16 * p16 * S::splat(self.freq_map.scale);

        // Frequency-dependent pole mix and resonance compensation, so the
        // perceived resonance holds up across the cutoff range.
        let fc2 = fc * fc;
        let t = fc2 * (one - rc);
        let q = fc2 + t * t;
        let g = (S::splat(1.25) + (S::splat(-0.74375) + S::splat(0.3) * q) * q) * q;
        let k = rc
            * (S::splat(1.4)
                + (S::splat(0.108) + (S::splat(-0.164) + S::splat(-0.069) * g) * g) * g);
        let in_gain = S::splat(0.18) + S::splat(0.25) * k * k;
        let h = one - g;

        let mix = S::splat(STAGE_MIX);

        // Pass one: previous-sample history stands in for the current
        // feedback. The saturator is a quadratic soft knee with one-sample
        // memory; stage three gets the cubic clip instead for a different
        // harmonic footprint.
        let fb1 = self.prev_in * in_gain - k * self.fb_prev;
        let sat1 = (S::splat(0.062) * fb1 * fb1 + S::splat(0.993) * self.sat).clamp(-1.0, 1.0);
        let fb1s = fb1 * (one - sat1 + S::splat(0.5) * sat1 * sat1);

        let a1 = fb1s * g + h * self.stage[0];
        let a1o = a1 + self.stage[0] * mix;
        let a2 = a1o * g + h * self.stage[1];
        let a2o = a2 + self.stage[1] * mix;
        let c1 = a2o.clamp(-1.0, 1.0);
        let a3 = (c1 * (one - S::splat(0.3333333) * c1 * c1)) * g + h * self.stage[2];
        let a3o = a3 + self.stage[2] * mix;
        let a4 = a3o * g + h * self.stage[3];
        let a4o = a4 + self.stage[3] * mix;

        // Pass two: corrected feedback from the noisy current input and the
        // provisional output.
        let fb2 = x * in_gain - k * a4o;
        let sat2 = (S::splat(0.062) * fb2 * fb2 + S::splat(0.993) * sat1).clamp(-1.0, 1.0);
        let fb2s = fb2 * (one - sat2 + S::splat(0.5) * sat2 * sat2);

        let b1 = fb2s * g + h * a1;
        let b1o = b1 + a1 * mix;
        let b2 = b1o * g + h * a2;
        let b2o = b2 + a2 * mix;
        let c2 = b2o.clamp(-1.0, 1.0);
        let b3 = (c2 * (one - S::splat(0.3333333) * c2 * c2)) * g + h * a3;
        let b3o = b3 + a3 * mix;
        let b4 = b3o * g + h * a4;
        let b4o = b4 + a4 * mix;

        // Response mixes over intermediates of both passes plus the
        // previous sample's taps.
        let lp24 = S::splat(0.19) * (b4o + self.pass1_prev)
            + S::splat(0.57) * (a4o + self.out_prev)
            - S::splat(0.52) * self.lp24_prev;
        let hp24 = fb1s - S::splat(4.0) * (b1o + b3o) + S::splat(6.0) * b2o + lp24;
        let bp24 = S::splat(4.0) * (b2o + lp24) - S::splat(8.0) * b3o;
        let lp18 = b2o;
        let bp18 = fb1s - S::splat(2.0) * b1o + b2o;
        let hp6 = S::splat(2.0) * (b1o - b2o);

        // Family contract: unknown indices fall back to the default
        // low-pass response here, at selection time.
        let output = match LadderMode::from_i32(self.mode).unwrap_or(LadderMode::Lp24) {
            LadderMode::Lp24 => lp24,
            LadderMode::Hp24 => hp24,
            LadderMode::Bp24 => bp24,
            LadderMode::Lp18 => lp18,
            LadderMode::Bp18 => bp18,
            LadderMode::Hp6 => hp6,
        };

        self.prev_in = x.flush_denormal();
        self.sat = sat2.flush_denormal();
        self.stage = [
            b1.flush_denormal(),
            b2.flush_denormal(),
            b3.flush_denormal(),
            b4.flush_denormal(),
        ];
        self.fb_prev = b4o.flush_denormal();
        self.out_prev = b4o.flush_denormal();
        self.pass1_prev = a4o.flush_denormal();
        self.lp24_prev = lp24.flush_denormal();

        output
    }
}

impl<S: Sample> Ladder for HuovilainenLadder<S> {
    fn set_cutoff(&mut self, hz: f32) {
        self.cutoff_hz = S::splat(params::clamp_cutoff(hz, self.sample_rate));
        self.update_cutoff_control();
    }

    fn set_resonance(&mut self, resonance: f32) {
        self.resonance = S::splat(params::clamp_unit(resonance));
    }

    /// Drive pushes the input harder into the saturating feedback path.
    fn set_drive(&mut self, drive: f32) {
        self.drive = params::clamp_unit(drive);
    }

    fn set_mode_index(&mut self, mode: i32) {
        // Stored as-is; resolution happens at output selection.
        self.mode = mode;
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.freq_map = FrequencyMap::new(sample_rate);
        let hz = self.cutoff_hz;
        self.cutoff_hz = S::from_fn(|i| params::clamp_cutoff(hz.lane(i), sample_rate));
        self.update_cutoff_control();
    }

    fn reset(&mut self) {
        self.stage = [S::zero(); 4];
        self.fb_prev = S::zero();
        self.lp24_prev = S::zero();
        self.out_prev = S::zero();
        self.pass1_prev = S::zero();
        self.sat = S::zero();
        self.prev_in = S::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(f: &mut HuovilainenLadder<f32>, samples: usize) -> f32 {
        let mut out = 0.0;
        for n in 0..samples {
            let x = (n as f32 * 0.41).sin() * 0.5;
            out = f.process(x, 0.3, 0.0, 0.0);
        }
        out
    }

    #[test]
    fn unknown_mode_tracks_default_lowpass() {
        let mut lp = HuovilainenLadder::<f32>::new(44100.0);
        let mut bad = HuovilainenLadder::<f32>::new(44100.0);
        lp.set_mode(LadderMode::Lp24);
        bad.set_mode_index(99);
        assert_eq!(bad.mode_index(), 99);
        for n in 0..256 {
            let x = (n as f32 * 0.13).sin() * 0.25;
            assert_eq!(
                lp.process(x, 0.5, 0.0, 0.0),
                bad.process(x, 0.5, 0.0, 0.0)
            );
        }
    }

    #[test]
    fn reset_restores_deterministic_output() {
        let mut f = HuovilainenLadder::<f32>::new(44100.0);
        f.set_input_bias(0);
        let first = f.process(0.25, 0.5, 0.0, 0.0);
        run(&mut f, 2000);
        f.reset();
        assert_eq!(f.process(0.25, 0.5, 0.0, 0.0), first);
    }

    #[test]
    fn state_settles_on_silence() {
        let mut f = HuovilainenLadder::<f32>::new(44100.0);
        f.set_input_bias(0);
        run(&mut f, 4000);
        let mut out = 1.0;
        for _ in 0..200_000 {
            out = f.process(0.0, 0.0, 0.0, 0.0);
        }
        // No resonance, no input: the recursion must have decayed to a
        // flushed-to-zero or at least inaudible state, never NaN.
        assert!(out.is_finite());
        assert!(out.abs() < 1e-6);
    }

    #[test]
    fn drive_changes_the_output() {
        let mut clean = HuovilainenLadder::<f32>::new(44100.0);
        let mut driven = HuovilainenLadder::<f32>::new(44100.0);
        driven.set_drive(1.0);
        let mut differ = false;
        for n in 0..512 {
            let x = (n as f32 * 0.29).sin() * 0.8;
            let a = clean.process(x, 0.6, 0.0, 0.0);
            let b = driven.process(x, 0.6, 0.0, 0.0);
            if (a - b).abs() > 1e-6 {
                differ = true;
            }
        }
        assert!(differ);
    }
}
