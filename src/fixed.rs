use crate::numeric::Sample;
use std::ops::{Add, Mul, Sub};

/// Q16.16 fixed-point sample: 16 integer bits, 16 fractional bits in an
/// `i32`.
///
/// Every multiply widens through `i64` and renormalizes with a 16-bit right
/// shift, saturating on the way back down. There are no denormals to flush;
/// the analogous hazard — a decaying recursion parking at exact zero — is
/// covered by [`Sample::bias`], which nudges the input by whole quantization
/// steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Q16(pub i32);

impl Q16 {
    pub const FRAC_BITS: u32 = 16;
    pub const ONE: Q16 = Q16(1 << Self::FRAC_BITS);
    /// Smallest representable increment, ~1.5e-5.
    pub const STEP: f32 = 1.0 / (1 << Self::FRAC_BITS) as f32;

    pub fn from_f32(x: f32) -> Self {
        let raw = (x * 65536.0).round();
        Q16(num_traits::clamp(raw, i32::MIN as f32, i32::MAX as f32) as i32)
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 * Self::STEP
    }

    #[inline]
    fn mul_q16(a: i32, b: i32) -> i32 {
        let wide = (a as i64 * b as i64) >> Self::FRAC_BITS;
        num_traits::clamp(wide, i32::MIN as i64, i32::MAX as i64) as i32
    }
}

impl Add for Q16 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Q16(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Q16 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Q16(self.0.saturating_sub(rhs.0))
    }
}

impl Mul for Q16 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Q16(Self::mul_q16(self.0, rhs.0))
    }
}

impl Sample for Q16 {
    const LANES: usize = 1;

    fn zero() -> Self {
        Q16(0)
    }

    fn splat(x: f32) -> Self {
        Q16::from_f32(x)
    }

    fn from_fn(mut f: impl FnMut(usize) -> f32) -> Self {
        Q16::from_f32(f(0))
    }

    fn lane(self, _i: usize) -> f32 {
        self.to_f32()
    }

    fn recip(self) -> Self {
        if self.0 == 0 {
            return Q16(i32::MAX);
        }
        let wide = (1i64 << (2 * Self::FRAC_BITS)) / self.0 as i64;
        Q16(num_traits::clamp(wide, i32::MIN as i64, i32::MAX as i64) as i32)
    }

    fn saturate(self) -> Self {
        // Odd quadratic stand-in for tanh: y = x - x|x|/4 on [-2, 2],
        // pinned to +/-1 outside. Unit slope at the origin, y(1) = 0.75
        // against tanh(1) = 0.76.
        let x = num_traits::clamp(self.0, -2 * Q16::ONE.0, 2 * Q16::ONE.0);
        let curve = ((x as i64 * x.unsigned_abs() as i64) >> (Self::FRAC_BITS + 2)) as i32;
        Q16(x - curve)
    }

    fn clamp(self, lo: f32, hi: f32) -> Self {
        Q16(num_traits::clamp(
            self.0,
            Q16::from_f32(lo).0,
            Q16::from_f32(hi).0,
        ))
    }

    fn max(self, floor: f32) -> Self {
        Q16(self.0.max(Q16::from_f32(floor).0))
    }

    fn flush_denormal(self) -> Self {
        self
    }

    fn bias(self, steps: i32) -> Self {
        Q16(self.0.saturating_add(steps))
    }
}
