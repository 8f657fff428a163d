//! Width-agnostic numbers held by tree primitives.
use core::fmt;

/// A number held by a [`Primitive`](crate::Primitive).
///
/// The tree never commits to a bit width: integers are kept as `u64` when
/// non-negative and as `i64` when negative, everything else as `f64`.
/// The adapter that decodes a number decides on the final width.
///
/// Constructors keep the representation canonical, so a non-negative integer
/// is always a `PosInt`. Equality compares the [canonical](Number::canonical)
/// forms, so `NegInt(0) == PosInt(0)`, while an integer never equals a float.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Non-negative integer
    PosInt(u64),
    /// Negative integer, always below zero
    NegInt(i64),
    /// Floating-point number
    Float(f64),
}

impl Number {
    /// `true` for `PosInt` and `NegInt`
    #[inline]
    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// `true` for `Float`
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Return the number as `i64` if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::PosInt(n) => i64::try_from(n).ok(),
            Number::NegInt(n) => Some(n),
            Number::Float(_) => None,
        }
    }

    /// Return the number as `u64` if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Number::PosInt(n) => Some(n),
            _ => None,
        }
    }

    /// Return the number as `f64`, possibly losing precision.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::PosInt(n) => n as f64,
            Number::NegInt(n) => n as f64,
            Number::Float(f) => f,
        }
    }

    /// Move non-negative values built directly as `NegInt` to `PosInt`.
    #[inline]
    pub fn canonical(self) -> Number {
        match self {
            Number::NegInt(n) if n >= 0 => Number::PosInt(n as u64),
            number => number,
        }
    }

    /// Convert to the requested numeric width, truncating or wrapping the way `as` does.
    #[inline]
    pub fn cast<N: NumberCast>(self) -> N {
        N::from_number(self)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.canonical(), other.canonical()) {
            (Number::PosInt(a), Number::PosInt(b)) => a == b,
            (Number::NegInt(a), Number::NegInt(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::PosInt(n) => fmt::Display::fmt(n, f),
            Number::NegInt(n) => fmt::Display::fmt(n, f),
            Number::Float(n) => fmt::Display::fmt(n, f),
        }
    }
}

/// Conversion between native numeric types and [`Number`].
///
/// `from_number` is a narrowing/widening conversion with `as` semantics:
/// decoding `300` into a `u8` yields `44`, decoding `2.9` into an `i32` yields `2`.
///
/// `f32` values are widened through their shortest decimal form, so `0.1f32`
/// becomes the `f64` closest to `0.1` rather than `0.10000000149011612`.
pub trait NumberCast: Copy + 'static {
    fn into_number(self) -> Number;
    fn from_number(number: Number) -> Self;
}

macro_rules! impl_number_cast_signed {
    ($($ty:ty),*) => {$(
        impl NumberCast for $ty {
            #[inline]
            fn into_number(self) -> Number {
                if self < 0 {
                    Number::NegInt(self as i64)
                }
                else {
                    Number::PosInt(self as u64)
                }
            }
            #[inline]
            fn from_number(number: Number) -> Self {
                match number {
                    Number::PosInt(n) => n as $ty,
                    Number::NegInt(n) => n as $ty,
                    Number::Float(f) => f as $ty,
                }
            }
        }

        impl From<$ty> for Number {
            #[inline]
            fn from(v: $ty) -> Self {
                v.into_number()
            }
        }
    )*};
}

macro_rules! impl_number_cast_unsigned {
    ($($ty:ty),*) => {$(
        impl NumberCast for $ty {
            #[inline]
            fn into_number(self) -> Number {
                Number::PosInt(self as u64)
            }
            #[inline]
            fn from_number(number: Number) -> Self {
                match number {
                    Number::PosInt(n) => n as $ty,
                    Number::NegInt(n) => n as $ty,
                    Number::Float(f) => f as $ty,
                }
            }
        }

        impl From<$ty> for Number {
            #[inline]
            fn from(v: $ty) -> Self {
                v.into_number()
            }
        }
    )*};
}

macro_rules! impl_number_cast_float {
    ($($ty:ty => $widen:path),*) => {$(
        impl NumberCast for $ty {
            #[inline]
            fn into_number(self) -> Number {
                Number::Float($widen(self))
            }
            #[inline]
            fn from_number(number: Number) -> Self {
                match number {
                    Number::PosInt(n) => n as $ty,
                    Number::NegInt(n) => n as $ty,
                    Number::Float(f) => f as $ty,
                }
            }
        }

        impl From<$ty> for Number {
            #[inline]
            fn from(v: $ty) -> Self {
                v.into_number()
            }
        }
    )*};
}

fn widen_f32(v: f32) -> f64 {
    if !v.is_finite() {
        return v as f64
    }
    let mut buffer = ryu_js::Buffer::new();
    buffer.format_finite(v).parse().unwrap_or(v as f64)
}

#[inline]
fn widen_f64(v: f64) -> f64 {
    v
}

impl_number_cast_signed!(i8, i16, i32, i64, isize);
impl_number_cast_unsigned!(u8, u16, u32, u64, usize);
impl_number_cast_float!(f32 => widen_f32, f64 => widen_f64);
