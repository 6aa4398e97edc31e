//! Downhill bracketing of a 1-D minimum.
//!
//! Starting from two abscissae, the search steps downhill with golden-ratio
//! magnification, using parabolic extrapolation through the last three points
//! whenever it promises a larger useful step.

/// Default magnification ratio between successive intervals.
const GOLD: f64 = 1.618034;
/// Maximum magnification allowed for a parabolic-fit step.
const GLIMIT: f64 = 100.0;
/// Floor preventing division by zero in the parabolic step.
const TINY: f64 = 1.0e-20;
/// Safety cap on downhill expansions for functions without a minimum.
const MAX_EXPANSIONS: usize = 500;

/// Three abscissae bracketing a minimum, with their function values.
///
/// `b` lies between `a` and `c` (in either order) and `fb <= fa`, `fb <= fc`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// First outer point
    pub a: f64,
    /// Inner point
    pub b: f64,
    /// Second outer point
    pub c: f64,
    /// f(a)
    pub fa: f64,
    /// f(b)
    pub fb: f64,
    /// f(c)
    pub fc: f64,
}

/// Bracket a minimum of `f`, starting from the points `a` and `b`.
///
/// The search never fails: for a function that keeps decreasing it stops
/// after a fixed number of expansions and returns the last triple.
pub fn bracket<F>(f: F, a: f64, b: f64) -> Bracket
where
    F: Fn(f64) -> f64,
{
    let (mut ax, mut bx) = (a, b);
    let mut fa = f(ax);
    let mut fb = f(bx);

    // go downhill from a to b
    if fb > fa {
        std::mem::swap(&mut ax, &mut bx);
        std::mem::swap(&mut fa, &mut fb);
    }

    let mut cx = bx + GOLD * (bx - ax);
    let mut fc = f(cx);
    let mut expansions = 0;

    while fb > fc {
        expansions += 1;
        if expansions > MAX_EXPANSIONS {
            log::warn!(
                "bracket: no minimum found after {} expansions (c = {:e})",
                MAX_EXPANSIONS,
                cx
            );
            break;
        }

        let r = (bx - ax) * (fb - fc);
        let q = (bx - cx) * (fb - fa);
        let sign = if q - r >= 0.0 { 1.0 } else { -1.0 };
        let mut u = bx - ((bx - cx) * q - (bx - ax) * r) / (2.0 * sign * (q - r).abs().max(TINY));
        let ulim = bx + GLIMIT * (cx - bx);
        let mut fu;

        if (bx - u) * (u - cx) > 0.0 {
            // parabolic u lies between b and c
            fu = f(u);
            if fu < fc {
                return Bracket {
                    a: bx,
                    b: u,
                    c: cx,
                    fa: fb,
                    fb: fu,
                    fc,
                };
            } else if fu > fb {
                return Bracket {
                    a: ax,
                    b: bx,
                    c: u,
                    fa,
                    fb,
                    fc: fu,
                };
            }
            u = cx + GOLD * (cx - bx);
            fu = f(u);
        } else if (cx - u) * (u - ulim) > 0.0 {
            // parabolic u lies between c and its allowed limit
            fu = f(u);
            if fu < fc {
                bx = cx;
                cx = u;
                u = cx + GOLD * (cx - bx);
                fb = fc;
                fc = fu;
                fu = f(u);
            }
        } else if (u - ulim) * (ulim - cx) >= 0.0 {
            u = ulim;
            fu = f(u);
        } else {
            u = cx + GOLD * (cx - bx);
            fu = f(u);
        }

        log::trace!("bracket: a = {:e}, b = {:e}, c = {:e}, u = {:e}", ax, bx, cx, u);

        ax = bx;
        bx = cx;
        cx = u;
        fa = fb;
        fb = fc;
        fc = fu;
    }

    Bracket {
        a: ax,
        b: bx,
        c: cx,
        fa,
        fb,
        fc,
    }
}
