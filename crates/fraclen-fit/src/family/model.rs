//! Concrete [`LengthDistribution`] implementations.
//!
//! Families available in `statrs` are wrapped in [`Shifted`], which adds the
//! location parameter. Logistic, generalized gamma, Burr XII and power-law
//! are evaluated from their closed forms.

use std::{f64::consts::PI, fmt};

use statrs::{
    distribution::{Continuous, ContinuousCDF, Gamma},
    function::gamma::ln_gamma,
    statistics::Distribution as Moments,
};

use super::{BoxedLengthDistribution, LengthDistribution};

const NEWTON_STEPS: usize = 20;

/// Refines an approximate quantile `x` of `p` with Newton steps on the CDF.
///
/// Stops early when a step leaves the support (zero density).
fn polish_quantile(p: f64, mut x: f64, cdf: impl Fn(f64) -> f64, pdf: impl Fn(f64) -> f64) -> f64 {
    if !(p > 0.0 && p < 1.0) || !x.is_finite() {
        return x;
    }
    for _ in 0..NEWTON_STEPS {
        let density = pdf(x);
        if !(density > 0.0 && density.is_finite()) {
            break;
        }
        let next = x - (cdf(x) - p) / density;
        if !(next.is_finite() && pdf(next) > 0.0) {
            break;
        }
        let step = (next - x).abs();
        x = next;
        if step <= 1e-14 * x.abs().max(1.0) {
            break;
        }
    }
    x
}

/// A `statrs` distribution translated by `loc`.
#[derive(Debug, Clone)]
pub struct Shifted<D> {
    inner: D,
    loc: f64,
}

impl<D> Shifted<D> {
    #[must_use]
    pub fn new(inner: D, loc: f64) -> Self {
        Self { inner, loc }
    }
}

impl<D> LengthDistribution for Shifted<D>
where
    D: Continuous<f64, f64>
        + ContinuousCDF<f64, f64>
        + Moments<f64>
        + Clone
        + fmt::Debug
        + Send
        + Sync
        + 'static,
{
    fn clone_boxed(&self) -> BoxedLengthDistribution {
        Box::new(self.clone())
    }

    fn ln_pdf(&self, x: f64) -> f64 {
        self.inner.ln_pdf(x - self.loc)
    }

    fn pdf(&self, x: f64) -> f64 {
        self.inner.pdf(x - self.loc)
    }

    fn cdf(&self, x: f64) -> f64 {
        self.inner.cdf(x - self.loc)
    }

    fn sf(&self, x: f64) -> f64 {
        self.inner.sf(x - self.loc)
    }

    fn quantile(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        let x = polish_quantile(
            p,
            self.inner.inverse_cdf(p),
            |x| self.inner.cdf(x),
            |x| self.inner.pdf(x),
        );
        x + self.loc
    }

    fn mean(&self) -> Option<f64> {
        self.inner.mean().map(|m| m + self.loc)
    }

    fn variance(&self) -> Option<f64> {
        self.inner.variance()
    }
}

/// Logistic distribution with location `loc` and scale `scale`.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    pub loc: f64,
    pub scale: f64,
}

impl LengthDistribution for LogisticModel {
    fn clone_boxed(&self) -> BoxedLengthDistribution {
        Box::new(self.clone())
    }

    fn ln_pdf(&self, x: f64) -> f64 {
        let z = ((x - self.loc) / self.scale).abs();
        -z - 2.0 * (-z).exp().ln_1p() - self.scale.ln()
    }

    fn cdf(&self, x: f64) -> f64 {
        let z = (x - self.loc) / self.scale;
        1.0 / (1.0 + (-z).exp())
    }

    fn sf(&self, x: f64) -> f64 {
        let z = (x - self.loc) / self.scale;
        1.0 / (1.0 + z.exp())
    }

    fn ln_sf(&self, x: f64) -> f64 {
        // -ln(1 + e^z), split to stay finite for large |z|
        let z = (x - self.loc) / self.scale;
        -(z.max(0.0) + (-z.abs()).exp().ln_1p())
    }

    fn quantile(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        self.loc + self.scale * (p / (1.0 - p)).ln()
    }

    fn mean(&self) -> Option<f64> {
        Some(self.loc)
    }

    fn variance(&self) -> Option<f64> {
        Some(self.scale * self.scale * PI * PI / 3.0)
    }
}

/// Stacy's generalized gamma distribution.
///
/// `F(x) = P(a, ((x - loc) / scale)^c)` with `P` the regularized lower
/// incomplete gamma function. Only `c > 0` is supported.
#[derive(Debug, Clone)]
pub struct GeneralizedGammaModel {
    a: f64,
    c: f64,
    loc: f64,
    scale: f64,
    // standard gamma(a) used for the incomplete gamma function and its inverse
    base: Gamma,
}

impl GeneralizedGammaModel {
    /// Returns `None` if `a`, `c` or `scale` is not strictly positive.
    #[must_use]
    pub fn new(a: f64, c: f64, loc: f64, scale: f64) -> Option<Self> {
        if !(c > 0.0 && scale > 0.0) {
            return None;
        }
        let base = Gamma::new(a, 1.0).ok()?;
        Some(Self {
            a,
            c,
            loc,
            scale,
            base,
        })
    }

    fn standardize(&self, x: f64) -> f64 {
        (x - self.loc) / self.scale
    }

    fn raw_moment(&self, k: f64) -> f64 {
        (ln_gamma(self.a + k / self.c) - ln_gamma(self.a)).exp() * self.scale.powf(k)
    }
}

impl LengthDistribution for GeneralizedGammaModel {
    fn clone_boxed(&self) -> BoxedLengthDistribution {
        Box::new(self.clone())
    }

    fn ln_pdf(&self, x: f64) -> f64 {
        let y = self.standardize(x);
        if y <= 0.0 {
            return f64::NEG_INFINITY;
        }
        self.c.ln() + (self.c * self.a - 1.0) * y.ln() - y.powf(self.c) - ln_gamma(self.a)
            - self.scale.ln()
    }

    fn cdf(&self, x: f64) -> f64 {
        let y = self.standardize(x);
        if y <= 0.0 {
            0.0
        } else {
            self.base.cdf(y.powf(self.c))
        }
    }

    fn sf(&self, x: f64) -> f64 {
        let y = self.standardize(x);
        if y <= 0.0 {
            1.0
        } else {
            self.base.sf(y.powf(self.c))
        }
    }

    fn quantile(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        let t = polish_quantile(
            p,
            self.base.inverse_cdf(p),
            |t| self.base.cdf(t),
            |t| self.base.pdf(t),
        );
        self.loc + self.scale * t.powf(1.0 / self.c)
    }

    fn mean(&self) -> Option<f64> {
        Some(self.loc + self.raw_moment(1.0))
    }

    fn variance(&self) -> Option<f64> {
        let m1 = self.raw_moment(1.0);
        Some(self.raw_moment(2.0) - m1 * m1)
    }
}

/// Burr type XII distribution: `F(x) = 1 - (1 + y^c)^-d` with
/// `y = (x - loc) / scale`.
#[derive(Debug, Clone)]
pub struct Burr12Model {
    pub c: f64,
    pub d: f64,
    pub loc: f64,
    pub scale: f64,
}

impl Burr12Model {
    fn standardize(&self, x: f64) -> f64 {
        (x - self.loc) / self.scale
    }

    /// `E[Y^k]` for the standardized variable, if it exists (`c * d > k`).
    fn standard_moment(&self, k: f64) -> Option<f64> {
        (self.c * self.d > k).then(|| {
            let (p, q) = (self.d - k / self.c, 1.0 + k / self.c);
            self.d * (ln_gamma(p) + ln_gamma(q) - ln_gamma(p + q)).exp()
        })
    }
}

impl LengthDistribution for Burr12Model {
    fn clone_boxed(&self) -> BoxedLengthDistribution {
        Box::new(self.clone())
    }

    fn ln_pdf(&self, x: f64) -> f64 {
        let y = self.standardize(x);
        if y <= 0.0 {
            return f64::NEG_INFINITY;
        }
        (self.c * self.d).ln() + (self.c - 1.0) * y.ln()
            - (self.d + 1.0) * y.powf(self.c).ln_1p()
            - self.scale.ln()
    }

    fn cdf(&self, x: f64) -> f64 {
        1.0 - self.sf(x)
    }

    fn sf(&self, x: f64) -> f64 {
        self.ln_sf(x).exp()
    }

    fn ln_sf(&self, x: f64) -> f64 {
        let y = self.standardize(x);
        if y <= 0.0 {
            0.0
        } else {
            -self.d * y.powf(self.c).ln_1p()
        }
    }

    fn quantile(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        let y = (-(-p).ln_1p() / self.d).exp_m1().powf(1.0 / self.c);
        self.loc + self.scale * y
    }

    fn mean(&self) -> Option<f64> {
        self.standard_moment(1.0)
            .map(|m| self.loc + self.scale * m)
    }

    fn variance(&self) -> Option<f64> {
        let m1 = self.standard_moment(1.0)?;
        let m2 = self.standard_moment(2.0)?;
        Some(self.scale * self.scale * (m2 - m1 * m1))
    }
}

/// Power-function distribution on `[loc, loc + scale]`: `F(x) = y^a`.
#[derive(Debug, Clone)]
pub struct PowerLawModel {
    pub a: f64,
    pub loc: f64,
    pub scale: f64,
}

impl PowerLawModel {
    fn standardize(&self, x: f64) -> f64 {
        (x - self.loc) / self.scale
    }
}

impl LengthDistribution for PowerLawModel {
    fn clone_boxed(&self) -> BoxedLengthDistribution {
        Box::new(self.clone())
    }

    fn ln_pdf(&self, x: f64) -> f64 {
        let y = self.standardize(x);
        if y <= 0.0 || y > 1.0 {
            return f64::NEG_INFINITY;
        }
        self.a.ln() + (self.a - 1.0) * y.ln() - self.scale.ln()
    }

    fn cdf(&self, x: f64) -> f64 {
        let y = self.standardize(x);
        if y <= 0.0 {
            0.0
        } else if y >= 1.0 {
            1.0
        } else {
            y.powf(self.a)
        }
    }

    fn ln_sf(&self, x: f64) -> f64 {
        let y = self.standardize(x);
        if y <= 0.0 {
            0.0
        } else if y >= 1.0 {
            f64::NEG_INFINITY
        } else {
            // ln(1 - y^a)
            (-(self.a * y.ln()).exp_m1()).ln()
        }
    }

    fn quantile(&self, p: f64) -> f64 {
        self.loc + self.scale * p.clamp(0.0, 1.0).powf(1.0 / self.a)
    }

    fn mean(&self) -> Option<f64> {
        Some(self.loc + self.scale * self.a / (self.a + 1.0))
    }

    fn variance(&self) -> Option<f64> {
        let a = self.a;
        Some(self.scale * self.scale * a / ((a + 2.0) * (a + 1.0) * (a + 1.0)))
    }
}
