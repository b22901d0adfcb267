use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A payment value in indivisible base units.
///
/// Amounts are plain unsigned integers; the registry performs no currency
/// conversion. Addition through the `Add`/`Sum` impls panics on overflow in
/// debug builds like any integer arithmetic; settlement paths use the
/// checked helpers instead.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw value in base units.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// The raw value in base units.
    pub const fn get(self) -> u128 {
        self.0
    }

    /// `true` if this amount is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Saturating addition.
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Checked multiplication by a unit count (e.g. a day count).
    pub fn checked_mul_units(self, units: u64) -> Option<Self> {
        self.0.checked_mul(units as u128).map(Self)
    }

    /// Split this amount by a basis-point rate.
    ///
    /// The royalty share is `floor(amount * rate / 10_000)`; the remainder
    /// is everything else. The two shares always sum back to the original
    /// amount exactly.
    pub fn split_bps(self, rate: BasisPoints) -> RoyaltySplit {
        let scale = BasisPoints::SCALE as u128;
        let rate = rate.get() as u128;
        // floor(a * rate / scale) without widening past u128:
        // a = q*scale + r, so the floor decomposes into q*rate + r*rate/scale.
        let (q, r) = (self.0 / scale, self.0 % scale);
        let royalty = q * rate + r * rate / scale;
        RoyaltySplit {
            royalty: Self(royalty),
            remainder: Self(self.0 - royalty),
        }
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two shares of a royalty settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoyaltySplit {
    /// The royalty recipient's share.
    pub royalty: Amount,
    /// The seller's share.
    pub remainder: Amount,
}

/// A royalty rate in basis points (1/100 of a percent).
///
/// `10_000` basis points is 100%. Construction rejects anything above the
/// scale, so a stored rate can always be applied without re-validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasisPoints(u16);

impl BasisPoints {
    /// The full scale: 10_000 bps == 100%.
    pub const SCALE: u16 = 10_000;

    /// Zero rate.
    pub const ZERO: Self = Self(0);

    /// Validate and wrap a raw basis-point value.
    pub fn new(value: u16) -> Result<Self, TypeError> {
        if value > Self::SCALE {
            return Err(TypeError::RateOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// The raw basis-point value.
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}
