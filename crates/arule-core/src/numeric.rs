use crate::{CoreError, CoreResult};

/// Floating point type used for every engine parameter and output channel.
pub type Real = f64;

/// Absolute/relative tolerance pair for comparing engine values.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Upper-bound check for the integer window sizes the engine accepts.
pub fn ensure_at_most(v: u32, max: u32, what: &'static str) -> CoreResult<u32> {
    if v <= max {
        Ok(v)
    } else {
        Err(CoreError::OutOfRange {
            what,
            value: u64::from(v),
            max: u64::from(max),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_at_most_reports_limit() {
        assert_eq!(ensure_at_most(25, 25, "FDCPTS").unwrap(), 25);
        let err = ensure_at_most(26, 25, "FDCPTS").unwrap_err();
        assert!(format!("{err}").contains("max 25"));
    }

    proptest::proptest! {
        #[test]
        fn ensure_at_most_accepts_exactly_the_window(v in 0u32..64, max in 0u32..32) {
            proptest::prop_assert_eq!(ensure_at_most(v, max, "FDPTS").is_ok(), v <= max);
        }

        #[test]
        fn nearly_equal_is_symmetric(a in -1.0e6f64..1.0e6, b in -1.0e6f64..1.0e6) {
            let tol = Tolerances::default();
            proptest::prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }
    }
}
