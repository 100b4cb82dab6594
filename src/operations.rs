//! Operation registry: pure arithmetic plus precondition checks.

use crate::{error::CalcError, types::Operation};

/// Operands after arity and finiteness checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operands {
    /// First operand.
    pub a: f64,
    /// Second operand, absent for unary use.
    pub b: Option<f64>,
}

/// Checks operand count against the operation's arity and rejects NaN or infinity.
pub fn validate_operands(op: Operation, operands: &[f64]) -> Result<Operands, CalcError> {
    let arity = op.arity();
    if !arity.accepts(operands.len()) {
        return Err(CalcError::validation(format!(
            "{op} takes {}, got {}",
            arity.describe(),
            operands.len()
        )));
    }
    if let Some(bad) = operands.iter().find(|v| !v.is_finite()) {
        return Err(CalcError::validation(format!("operand {bad} is not a finite number")));
    }
    Ok(Operands {
        a: operands[0],
        b: operands.get(1).copied(),
    })
}

/// Computes the raw (unrounded) result of `op`.
pub fn apply(op: Operation, operands: Operands) -> Result<f64, CalcError> {
    let Operands { a, b } = operands;
    let rhs = || {
        b.ok_or_else(|| CalcError::validation(format!("{op} needs a second operand")))
    };

    let raw = match op {
        Operation::Add => a + rhs()?,
        Operation::Subtract => a - rhs()?,
        Operation::Multiply => a * rhs()?,
        Operation::Divide => {
            let b = rhs()?;
            if b == 0.0 {
                return Err(CalcError::domain("cannot divide by zero"));
            }
            a / b
        }
        Operation::Power => a.powf(rhs()?),
        Operation::Root => root(a, b.unwrap_or(2.0))?,
        Operation::Modulus => modulus(a, rhs()?)?,
        Operation::Negate => -a,
        Operation::Abs => a.abs(),
    };

    if !raw.is_finite() {
        return Err(CalcError::domain(format!("{op} result is not a finite number")));
    }
    Ok(raw)
}

/// Validates, computes and rounds in one step.
pub fn evaluate(
    op: Operation,
    operands: &[f64],
    decimal_places: u32,
) -> Result<(Operands, f64), CalcError> {
    let checked = validate_operands(op, operands)?;
    let raw = apply(op, checked)?;
    Ok((checked, round_to(raw, decimal_places)))
}

/// Rounds half away from zero to `places` decimal digits.
///
/// Integral values and values too large to scale are returned unchanged.
/// Negative zero is normalised to zero.
pub fn round_to(value: f64, places: u32) -> f64 {
    if value.fract() == 0.0 {
        return value + 0.0;
    }
    let factor = 10f64.powi(i32::try_from(places).unwrap_or(i32::MAX));
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    // -0.0 + 0.0 == +0.0
    rounded + 0.0
}

fn root(a: f64, degree: f64) -> Result<f64, CalcError> {
    if degree == 0.0 {
        return Err(CalcError::domain("cannot take the 0th root"));
    }
    if a < 0.0 {
        let odd_integer = degree.fract() == 0.0 && degree % 2.0 != 0.0;
        if !odd_integer {
            return Err(CalcError::domain(format!(
                "cannot take root of degree {degree} of negative number {a}"
            )));
        }
        return Ok(-(-a).powf(1.0 / degree));
    }
    if degree == 2.0 {
        return Ok(a.sqrt());
    }
    Ok(a.powf(1.0 / degree))
}

/// Remainder with the sign of the divisor; integral operands only.
fn modulus(a: f64, b: f64) -> Result<f64, CalcError> {
    if b == 0.0 {
        return Err(CalcError::domain("cannot perform modulus by zero"));
    }
    if a.fract() != 0.0 || b.fract() != 0.0 {
        return Err(CalcError::domain(format!(
            "modulus requires integral operands, got {a} and {b}"
        )));
    }
    let mut r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r += b;
    }
    Ok(r)
}
