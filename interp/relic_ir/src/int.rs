//! Arbitrary-precision signed integers with a machine-word fast path.
//!
//! `Integer` keeps values in an `i64` whenever they fit and promotes to a
//! heap-allocated `BigInt` only on overflow. Results are normalized back to
//! the small representation whenever they fit, so two mathematically equal
//! values always share one representation. Every operation dispatches a
//! same-representation fast path first; mixed operands promote only for the
//! duration of that operation.

use num_bigint::BigInt;
use num_traits::{Pow, Signed, ToPrimitive, Zero};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Arbitrary-precision signed integer, dual representation.
///
/// Invariant: `Big` never holds a value that fits in `i64`; constructors and
/// every arithmetic result enforce this, which keeps equality, ordering, and
/// hashing representation-independent.
#[derive(Clone)]
pub enum Integer {
    Small(i64),
    Big(Box<BigInt>),
}

impl Integer {
    pub const ZERO: Integer = Integer::Small(0);
    pub const ONE: Integer = Integer::Small(1);

    /// Create from a `BigInt`, normalizing to `Small` when it fits.
    pub fn from_big(value: BigInt) -> Self {
        match value.to_i64() {
            Some(n) => Integer::Small(n),
            None => Integer::Big(Box::new(value)),
        }
    }

    /// View as a `BigInt`, borrowing when already big.
    fn to_bigint(&self) -> Cow<'_, BigInt> {
        match self {
            Integer::Small(n) => Cow::Owned(BigInt::from(*n)),
            Integer::Big(b) => Cow::Borrowed(b),
        }
    }

    /// The value as `i64`, if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Integer::Small(n) => Some(*n),
            // Normalization invariant: Big never fits i64.
            Integer::Big(_) => None,
        }
    }

    /// The value as `u32`, if non-negative and small enough.
    pub fn to_u32(&self) -> Option<u32> {
        match self {
            Integer::Small(n) => u32::try_from(*n).ok(),
            Integer::Big(_) => None,
        }
    }

    /// The value as `usize`, if non-negative and small enough.
    pub fn to_usize(&self) -> Option<usize> {
        match self {
            Integer::Small(n) => usize::try_from(*n).ok(),
            Integer::Big(_) => None,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        match self {
            Integer::Small(n) => *n == 0,
            Integer::Big(b) => b.is_zero(),
        }
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        match self {
            Integer::Small(n) => *n < 0,
            Integer::Big(b) => b.is_negative(),
        }
    }

    /// Same-representation fast path plus `BigInt` fallback.
    ///
    /// `small_op` returns `None` on i64 overflow, falling through to the
    /// big path; the result is re-normalized either way.
    fn binary(
        &self,
        rhs: &Integer,
        small_op: impl Fn(i64, i64) -> Option<i64>,
        big_op: impl Fn(&BigInt, &BigInt) -> BigInt,
    ) -> Integer {
        if let (Integer::Small(a), Integer::Small(b)) = (self, rhs) {
            if let Some(r) = small_op(*a, *b) {
                return Integer::Small(r);
            }
        }
        Integer::from_big(big_op(&self.to_bigint(), &rhs.to_bigint()))
    }

    pub fn add(&self, rhs: &Integer) -> Integer {
        self.binary(rhs, i64::checked_add, |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Integer) -> Integer {
        self.binary(rhs, i64::checked_sub, |a, b| a - b)
    }

    pub fn mul(&self, rhs: &Integer) -> Integer {
        self.binary(rhs, i64::checked_mul, |a, b| a * b)
    }

    /// Truncating division. `None` on division by zero.
    pub fn div(&self, rhs: &Integer) -> Option<Integer> {
        if rhs.is_zero() {
            return None;
        }
        Some(self.binary(rhs, i64::checked_div, |a, b| a / b))
    }

    /// Truncating remainder. `None` on division by zero.
    pub fn rem(&self, rhs: &Integer) -> Option<Integer> {
        if rhs.is_zero() {
            return None;
        }
        Some(self.binary(rhs, i64::checked_rem, |a, b| a % b))
    }

    pub fn neg(&self) -> Integer {
        match self {
            Integer::Small(n) => match n.checked_neg() {
                Some(r) => Integer::Small(r),
                None => Integer::from_big(-BigInt::from(*n)),
            },
            Integer::Big(b) => Integer::from_big(-(**b).clone()),
        }
    }

    /// Left shift. `None` on a negative or oversized shift amount.
    pub fn shl(&self, amount: &Integer) -> Option<Integer> {
        let sh = amount.to_u32()?;
        if let Integer::Small(n) = self {
            if sh < 63 {
                if let Some(r) = n.checked_mul(1i64 << sh) {
                    return Some(Integer::Small(r));
                }
            }
        }
        Some(Integer::from_big(&*self.to_bigint() << sh as usize))
    }

    /// Arithmetic right shift (rounds toward negative infinity).
    /// `None` on a negative or oversized shift amount.
    pub fn shr(&self, amount: &Integer) -> Option<Integer> {
        let sh = amount.to_u32()?;
        match self {
            Integer::Small(n) => {
                let clamped = sh.min(63);
                Some(Integer::Small(n >> clamped))
            }
            Integer::Big(b) => Some(Integer::from_big(&**b >> sh as usize)),
        }
    }

    /// Bitwise AND (two's complement semantics for negatives).
    pub fn bitand(&self, rhs: &Integer) -> Integer {
        self.binary(rhs, |a, b| Some(a & b), |a, b| a & b)
    }

    /// Bitwise OR (two's complement semantics for negatives).
    pub fn bitor(&self, rhs: &Integer) -> Integer {
        self.binary(rhs, |a, b| Some(a | b), |a, b| a | b)
    }

    /// Bitwise XOR (two's complement semantics for negatives).
    pub fn bitxor(&self, rhs: &Integer) -> Integer {
        self.binary(rhs, |a, b| Some(a ^ b), |a, b| a ^ b)
    }

    /// Bitwise NOT: `-(n + 1)`.
    pub fn bitnot(&self) -> Integer {
        match self {
            Integer::Small(n) => Integer::Small(!n),
            Integer::Big(b) => Integer::from_big(!&**b),
        }
    }

    /// Exponentiation. `None` on a negative or oversized exponent.
    pub fn pow(&self, exponent: &Integer) -> Option<Integer> {
        let e = exponent.to_u32()?;
        if let Integer::Small(n) = self {
            if let Some(r) = n.checked_pow(e) {
                return Some(Integer::Small(r));
            }
        }
        Some(Integer::from_big(Pow::pow(&*self.to_bigint(), e)))
    }

    /// Three-way comparison underlying value ordering.
    pub fn cmp(&self, rhs: &Integer) -> Ordering {
        match (self, rhs) {
            (Integer::Small(a), Integer::Small(b)) => a.cmp(b),
            (Integer::Big(a), Integer::Big(b)) => a.as_ref().cmp(b),
            // Mixed: promote the small side for this comparison only.
            _ => self.to_bigint().as_ref().cmp(rhs.to_bigint().as_ref()),
        }
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer::Small(value)
    }
}

impl From<BigInt> for Integer {
    fn from(value: BigInt) -> Self {
        Integer::from_big(value)
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Integer {}

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Integer {
    fn cmp(&self, other: &Self) -> Ordering {
        Integer::cmp(self, other)
    }
}

impl Hash for Integer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Integer::Small(n) => n.hash(state),
            Integer::Big(b) => match b.to_i64() {
                // An unnormalized Big must hash like its Small twin.
                Some(n) => n.hash(state),
                None => b.hash(state),
            },
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integer::Small(n) => write!(f, "{n}"),
            Integer::Big(b) => write!(f, "{b}"),
        }
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integer::Small(n) => write!(f, "Small({n})"),
            Integer::Big(b) => write!(f, "Big({b})"),
        }
    }
}
