/// Control surface shared by the ladder filter cores.
///
/// Setters clamp out-of-range values to their documented bounds and derive
/// internal coefficients immediately; none of them allocate, block or fail.
/// The per-sample entry points stay on the concrete types because the two
/// families take different per-sample inputs (the ZDF core is driven purely
/// out-of-band, the nonlinear core takes per-sample control signals).
pub trait Ladder {
    /// Cutoff in Hz, clamped to [20, 0.45 * sample_rate].
    fn set_cutoff(&mut self, hz: f32);

    /// Resonance in [0, 1]. 1.0 is the self-oscillation boundary.
    fn set_resonance(&mut self, resonance: f32);

    /// Feedback drive in [0, 1].
    fn set_drive(&mut self, drive: f32);

    /// Select a response mode by raw index. Out-of-range indices degrade
    /// per the family contract: the ZDF core keeps its previous mode, the
    /// nonlinear core falls back to its default response at output
    /// selection.
    fn set_mode_index(&mut self, mode: i32);

    /// Change the sample rate and re-derive every rate-dependent
    /// coefficient. State is kept; call [`reset`](Ladder::reset) as well
    /// when switching material.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Zero all internal state.
    fn reset(&mut self);
}
