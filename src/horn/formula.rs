//! Formula text → azimuth callable.
//!
//! This is the seam to the expression evaluator: parameter records arriving
//! from a UI or a JSON file may carry formulas in the azimuth variable `p`
//! (radians), e.g. `"45 + 10*cos(2*p)"`. They are parsed once here and handed
//! to the mesh engine as [`ParamValue::Expression`] callables; the engine
//! itself never sees text.

use std::fmt;
use std::sync::Arc;

use meval::{Context, ContextProvider, Expr};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use super::expr::ParamValue;

/// Name of the azimuth variable inside formulas.
pub const AZIMUTH_VARIABLE: &str = "p";

#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    #[error("formula could not be parsed: {0}")]
    Parse(String),
    #[error("formula could not be evaluated: {0}")]
    Evaluate(String),
}

struct AzimuthContext {
    p: f64,
}

impl ContextProvider for AzimuthContext {
    fn get_var(&self, name: &str) -> Option<f64> {
        (name == AZIMUTH_VARIABLE).then_some(self.p)
    }
}

thread_local! {
    static FORMULA_CONTEXT: Context<'static> = build_context();
}

fn build_context() -> Context<'static> {
    let mut context = Context::new();
    context.func("deg", f64::to_degrees);
    context.func("rad", f64::to_radians);
    context.func("sign", f64::signum);
    context.func2("mod", |a, b| if b == 0.0 { f64::NAN } else { a.rem_euclid(b) });
    context.func3("clamp", |x, lo, hi| x.max(lo).min(hi));
    context.func3("lerp", |a, b, t| a + (b - a) * t);
    context
}

fn eval_at(expr: &Expr, p: f64) -> Result<f64, FormulaError> {
    FORMULA_CONTEXT.with(|context| {
        expr.eval_with_context((AzimuthContext { p }, context))
            .map_err(|error| FormulaError::Evaluate(error.to_string()))
    })
}

impl ParamValue {
    /// Parses `source` into a parameter value.
    ///
    /// Plain numbers become constants. Anything else is parsed as a formula
    /// in `p` and probed once at `p = 0` so unknown variables or functions
    /// fail here rather than inside a build. Evaluation failures at other
    /// azimuths yield NaN, which parameter validation reports.
    pub fn from_formula(source: &str) -> Result<Self, FormulaError> {
        let trimmed = source.trim();
        if let Ok(value) = trimmed.parse::<f64>() {
            return Ok(Self::Constant(value));
        }

        let expr: Expr = trimmed
            .parse()
            .map_err(|error: meval::Error| FormulaError::Parse(error.to_string()))?;
        eval_at(&expr, 0.0)?;

        let expr = Arc::new(expr);
        Ok(Self::expression(move |p| eval_at(&expr, p).unwrap_or(f64::NAN)))
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamValueVisitor;

        impl Visitor<'_> for ParamValueVisitor {
            type Value = ParamValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or a formula in `p`")
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<ParamValue, E> {
                Ok(ParamValue::Constant(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<ParamValue, E> {
                Ok(ParamValue::Constant(value as f64))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<ParamValue, E> {
                Ok(ParamValue::Constant(value as f64))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<ParamValue, E> {
                ParamValue::from_formula(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ParamValueVisitor)
    }
}
