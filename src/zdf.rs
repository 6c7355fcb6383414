use crate::filter::Ladder;
use crate::numeric::Sample;
use crate::params::{self, ZdfMode};
use log::debug;
use num::FromPrimitive;

// Zero-delay-feedback ladder after Zavalishin's TPT structure
// ("The Art of VA Filter Design").
//
// Each stage is a trapezoidal integrator:
//   v = (u - z) / (1 + G)
//   y = v + z
//   z' = y + v
// Solving the stage implicitly removes the unit delay a direct-form
// recursive ladder would put in the feedback path, so the cutoff lands
// where the warp math says it does and the loop stays stable all the way
// up to unity feedback.

/// Four-pole resonant ladder filter, generic over the arithmetic backend.
///
/// Parameters are set out-of-band; [`process`](ZdfLadder::process) takes
/// one input sample (per lane) and returns one output sample. With a
/// [`Lanes`](crate::Lanes) backend all lanes advance in lock-step and may
/// carry independent cutoff/resonance; the mode is shared.
pub struct ZdfLadder<S: Sample> {
    sample_rate: f32,
    cutoff: S,
    resonance: S,
    drive: f32,
    mode: ZdfMode,
    input_bias: i32,

    // Derived eagerly by the setters, never lazily.
    g: S,
    inv_1g: S,
    feedback_gain: S,

    stage: [S; 4],
    z: [S; 4],
}

impl<S: Sample> ZdfLadder<S> {
    pub fn new(sample_rate: f32) -> Self {
        debug!("zdf ladder: sr={} lanes={}", sample_rate, S::LANES);
        let mut filter = ZdfLadder {
            sample_rate,
            cutoff: S::zero(),
            resonance: S::zero(),
            drive: 1.0,
            mode: ZdfMode::Lp24,
            input_bias: 1,
            g: S::zero(),
            inv_1g: S::zero(),
            feedback_gain: S::zero(),
            stage: [S::zero(); 4],
            z: [S::zero(); 4],
        };
        filter.set_cutoff(1000.0);
        filter.set_resonance(0.5);
        filter
    }

    /// Per-lane cutoff in Hz. Slices shorter than the lane count leave the
    /// remaining lanes at the last given value.
    pub fn set_cutoff_lanes(&mut self, hz: &[f32]) {
        let sr = self.sample_rate;
        self.cutoff = S::from_fn(|i| {
            params::clamp_cutoff(hz[i.min(hz.len() - 1)], sr)
        });
        self.update_warp();
    }

    /// Per-lane resonance in [0, 1].
    pub fn set_resonance_lanes(&mut self, resonance: &[f32]) {
        self.resonance = S::from_fn(|i| {
            params::clamp_unit(resonance[i.min(resonance.len() - 1)])
        });
        self.update_feedback();
    }

    pub fn set_mode(&mut self, mode: ZdfMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> ZdfMode {
        self.mode
    }

    /// Quantization steps added to every input sample by integer backends;
    /// keeps the recursion from parking at exact zero during silence.
    /// Float backends ignore it. Set to 0 to disable the offset entirely.
    pub fn set_input_bias(&mut self, steps: i32) {
        self.input_bias = steps;
    }

    /// Derived warp coefficient for lane `i` (exposed for verification).
    pub fn warp(&self, i: usize) -> f32 {
        self.g.lane(i)
    }

    fn update_warp(&mut self) {
        let cutoff = self.cutoff;
        let sr = self.sample_rate;
        self.g = S::from_fn(|i| params::warp_coefficient(cutoff.lane(i), sr));
        self.inv_1g = (S::splat(1.0) + self.g).recip();
    }

    fn update_feedback(&mut self) {
        let resonance = self.resonance;
        self.feedback_gain = S::from_fn(|i| params::feedback_gain(resonance.lane(i)));
    }

    /// Advance one sample.
    pub fn process(&mut self, input: S) -> S {
        let input = input.bias(self.input_bias);

        // Feedback tap from the last stage, soft-saturated when driven.
        let mut fb = self.stage[3];
        if self.drive > 0.001 {
            fb = (fb * S::splat(self.drive)).saturate();
        }

        let mut u = input - self.feedback_gain * fb;
        for i in 0..4 {
            let v = (u - self.z[i]) * self.inv_1g;
            self.stage[i] = v + self.z[i];
            self.z[i] = (self.stage[i] + v).flush_denormal();
            u = self.stage[i];
        }

        match self.mode {
            ZdfMode::Lp24 => self.stage[3],
            ZdfMode::Bp12 => self.stage[2] - self.stage[3],
            ZdfMode::Hp24 => input - self.stage[3],
        }
    }
}

impl<S: Sample> Ladder for ZdfLadder<S> {
    fn set_cutoff(&mut self, hz: f32) {
        self.cutoff = S::splat(params::clamp_cutoff(hz, self.sample_rate));
        self.update_warp();
    }

    fn set_resonance(&mut self, resonance: f32) {
        self.resonance = S::splat(params::clamp_unit(resonance));
        self.update_feedback();
    }

    fn set_drive(&mut self, drive: f32) {
        self.drive = params::clamp_unit(drive);
    }

    fn set_mode_index(&mut self, mode: i32) {
        // Family contract: unknown indices are ignored and the previous
        // mode keeps playing.
        if let Some(mode) = ZdfMode::from_i32(mode) {
            self.mode = mode;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        let cutoff = self.cutoff;
        self.cutoff = S::from_fn(|i| params::clamp_cutoff(cutoff.lane(i), sample_rate));
        self.update_warp();
    }

    fn reset(&mut self) {
        self.stage = [S::zero(); 4];
        self.z = [S::zero(); 4];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_clamp_is_idempotent() {
        let mut a = ZdfLadder::<f32>::new(48000.0);
        let mut b = ZdfLadder::<f32>::new(48000.0);
        a.set_cutoff(3000.0);
        b.set_cutoff(3000.0);
        b.set_cutoff(3000.0);
        assert_eq!(a.warp(0), b.warp(0));

        a.set_cutoff(-100.0);
        b.set_cutoff(20.0);
        assert_eq!(a.warp(0), b.warp(0));

        a.set_cutoff(48000.0);
        b.set_cutoff(48000.0 * 0.45);
        assert_eq!(a.warp(0), b.warp(0));
    }

    #[test]
    fn invalid_mode_index_keeps_previous_mode() {
        let mut f = ZdfLadder::<f32>::new(48000.0);
        f.set_mode(ZdfMode::Bp12);
        f.set_mode_index(7);
        assert_eq!(f.mode(), ZdfMode::Bp12);
        f.set_mode_index(-1);
        assert_eq!(f.mode(), ZdfMode::Bp12);
        f.set_mode_index(2);
        assert_eq!(f.mode(), ZdfMode::Hp24);
    }

    #[test]
    fn reset_restores_deterministic_output() {
        let mut f = ZdfLadder::<f32>::new(48000.0);
        f.set_resonance(0.8);
        let first = f.process(0.5);
        for n in 0..1000 {
            f.process((n as f32 * 0.37).sin());
        }
        f.reset();
        assert_eq!(f.process(0.5), first);
    }

    #[test]
    fn sample_rate_change_reclamps_cutoff() {
        let mut f = ZdfLadder::<f32>::new(96000.0);
        f.set_cutoff(40000.0); // accepted: 0.45 * 96k = 43.2k
        f.set_sample_rate(48000.0);
        // Now the cap is 21.6k; the warp must match a fresh filter at it.
        let mut reference = ZdfLadder::<f32>::new(48000.0);
        reference.set_cutoff(48000.0 * 0.45);
        assert!((f.warp(0) - reference.warp(0)).abs() < 1e-6);
    }

    #[test]
    fn per_lane_parameters_diverge_lanes() {
        use crate::lanes::Lanes4;
        let mut f = ZdfLadder::<Lanes4>::new(48000.0);
        f.set_cutoff_lanes(&[200.0, 1000.0, 5000.0, 15000.0]);
        f.set_resonance_lanes(&[0.0, 0.0, 0.0, 0.0]);
        f.set_drive(0.0);
        let mut out = Lanes4::zero();
        for _ in 0..64 {
            out = f.process(Lanes4::splat(1.0));
        }
        // Same step input: the wide-open lane has settled much further than
        // the 200 Hz lane by 64 samples.
        assert!(out.0[3] > out.0[0]);
        for lane in out.0 {
            assert!(lane.is_finite() && lane > 0.0 && lane <= 1.01);
        }
    }
}
