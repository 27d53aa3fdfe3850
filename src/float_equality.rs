//! ULP-tolerant comparison of floating point values.

const POSITIVE_ZERO_BITS: i64 = 0;
// bit pattern of -0.0, ie only the sign bit set
const NEGATIVE_ZERO_BITS: i64 = i64::MIN;

/// Returns `true` if `x` and `y` are at most `max_ulps` representable `f64` steps apart.
///
/// With `max_ulps = 1`, a value equals itself and its direct neighbours, but not the neighbours
/// of its neighbours. Values of opposite sign are compared by how far each lies from its own
/// zero (`+0.0` and `-0.0`), so the comparison is symmetric across the sign boundary. `NaN` is
/// never equal to anything.
///
/// ```
/// use track_geodesy::float_equality::equal;
///
/// let x = 1.0_f64;
/// let next = f64::from_bits(x.to_bits() + 1);
/// assert!(equal(x, next, 1));
/// assert!(!equal(x, f64::from_bits(next.to_bits() + 1), 1));
/// ```
#[must_use]
pub fn equal(x: f64, y: f64, max_ulps: u32) -> bool {
    if x.is_nan() || y.is_nan() {
        return false;
    }

    let ulps = i64::from(max_ulps);
    let (mut a, mut b) = (x.to_bits() as i64, y.to_bits() as i64);
    if a < b {
        std::mem::swap(&mut a, &mut b);
    }

    if (a ^ b) < 0 {
        // opposite signs: `a` is the positive one.
        // raw bit subtraction is meaningless across the sign boundary.
        let diff_positive = a - POSITIVE_ZERO_BITS;
        let diff_negative = b.wrapping_sub(NEGATIVE_ZERO_BITS);
        diff_positive <= ulps && diff_negative <= ulps - diff_positive
    } else {
        a - b <= ulps
    }
}
