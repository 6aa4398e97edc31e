//! Ridders' extrapolated numerical derivative.
//!
//! A sequence of central differences with shrinking step sizes is combined
//! into a triangular Richardson tableau. Higher columns cancel successive
//! error terms, and the estimate with the smallest observed error is returned.

/// Step-size reduction factor between successive columns.
const CON: f64 = 1.4;
/// Give up once the error grows by this factor over the best seen.
const SAFE: f64 = 2.0;
/// Maximum tableau size.
const NTAB: usize = 10;
/// Starting error estimate.
const BIG: f64 = 1.0e30;

/// A derivative estimate together with its estimated absolute error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivativeEstimate {
    /// The derivative value
    pub value: f64,
    /// Estimated absolute error of `value`
    pub error: f64,
}

/// Derivative of `f` at `x` using Ridders' method with initial step `h`.
///
/// `h` need not be small; a step comparable to the scale over which `f`
/// changes appreciably works best. A non-positive `h` yields a NaN estimate.
pub fn derivative<F>(f: F, x: f64, h: f64) -> DerivativeEstimate
where
    F: Fn(f64) -> f64,
{
    if h.is_nan() || h <= 0.0 {
        return DerivativeEstimate {
            value: f64::NAN,
            error: f64::INFINITY,
        };
    }

    let mut a = [[0.0_f64; NTAB]; NTAB];
    let mut hh = h;
    a[0][0] = (f(x + hh) - f(x - hh)) / (2.0 * hh);

    let mut best = DerivativeEstimate {
        value: a[0][0],
        error: BIG,
    };

    for i in 1..NTAB {
        hh /= CON;
        a[0][i] = (f(x + hh) - f(x - hh)) / (2.0 * hh);

        let mut fac = CON * CON;
        for j in 1..=i {
            a[j][i] = (a[j - 1][i] * fac - a[j - 1][i - 1]) / (fac - 1.0);
            fac *= CON * CON;

            let errt = (a[j][i] - a[j - 1][i])
                .abs()
                .max((a[j][i] - a[j - 1][i - 1]).abs());
            if errt <= best.error {
                best = DerivativeEstimate {
                    value: a[j][i],
                    error: errt,
                };
            }
        }

        // higher order is making things worse
        if (a[i][i] - a[i - 1][i - 1]).abs() >= SAFE * best.error {
            break;
        }
    }

    best
}
