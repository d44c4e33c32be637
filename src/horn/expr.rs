use std::fmt;
use std::sync::Arc;

/// A callable of the azimuth `p` (radians).
pub type AzimuthFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A horn parameter that is either a constant or a function of azimuth.
///
/// Every azimuth-dependent scalar in the parameter record is read through
/// [`ParamValue::eval`]; nothing else inspects which variant it holds.
#[derive(Clone)]
pub enum ParamValue {
    Constant(f64),
    Expression(AzimuthFn),
}

impl ParamValue {
    #[must_use]
    pub const fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    #[must_use]
    pub fn expression(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Expression(Arc::new(f))
    }

    /// Value at azimuth `p`.
    #[inline]
    #[must_use]
    pub fn eval(&self, p: f64) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Expression(f) => f(p),
        }
    }

    /// Value at azimuth `p`, converted from degrees to radians.
    #[inline]
    #[must_use]
    pub fn eval_radians(&self, p: f64) -> f64 {
        self.eval(p).to_radians()
    }

    #[must_use]
    pub const fn as_constant(&self) -> Option<f64> {
        match self {
            Self::Constant(value) => Some(*value),
            Self::Expression(_) => None,
        }
    }

    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }
}

impl Default for ParamValue {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Expression(_) => f.write_str("Expression(<fn>)"),
        }
    }
}
