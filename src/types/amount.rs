//! Fixed-point currency amounts with eight fractional digits.

use crowdfund_derive::Error;
use std::fmt;
use std::str::FromStr;

/// Number of fractional decimal digits carried by an amount.
pub const DECIMALS: u32 = 8;
/// Smallest units per whole unit (10^8).
pub const UNIT: i64 = 100_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("unexpected character '{ch}' in amount")]
    InvalidCharacter { ch: char },
    #[error("more than 8 fractional digits")]
    TooPrecise,
    #[error("amount does not fit in 64 bits")]
    Overflow,
}

/// An amount in smallest units (10^-8 of a whole unit).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub i64);

impl Amount {
    pub const fn from_units(units: i64) -> Amount {
        Amount(units)
    }

    pub const fn units(self) -> i64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses decimal text such as `10.4`, `-0.5` or `1000000`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::Empty);
        }
        if let Some(ch) = whole.chars().chain(frac.chars()).find(|c| !c.is_ascii_digit()) {
            return Err(AmountError::InvalidCharacter { ch });
        }

        let frac = frac.trim_end_matches('0');
        if frac.len() > DECIMALS as usize {
            return Err(AmountError::TooPrecise);
        }

        let mut units: i64 = 0;
        for digit in whole.bytes().chain(frac.bytes()) {
            units = units
                .checked_mul(10)
                .and_then(|u| u.checked_add(i64::from(digit - b'0')))
                .ok_or(AmountError::Overflow)?;
        }
        let scale = 10i64.pow(DECIMALS - frac.len() as u32);
        let units = units.checked_mul(scale).ok_or(AmountError::Overflow)?;

        Ok(Amount(if negative { -units } else { units }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let unit = UNIT as u64;
        write!(f, "{sign}{}.{:08}", abs / unit, abs % unit)
    }
}
