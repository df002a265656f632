use std::fmt;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};

use crate::lang::ast::Constant;
use crate::lang::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integers are exact and unbounded
    Integer(BigInt),
    Float(f64),
}

/// A value as it appears in the output of a `print` statement
#[derive(Debug, Clone, PartialEq)]
pub enum Printed {
    Int(BigInt),
    Float(f64),
}

/// Shortest round-trip digits, switching to exponent form below 1e-4 and from 1e16 up
///
/// The exponent always carries a sign and at least two digits, eg. `1e-07`, `1.5e+16`.
fn format_float(x: f64) -> String {
    let sci = format!("{:e}", x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return x.to_string(),
    };

    if (-4..16).contains(&exp) {
        x.to_string()
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    }
}

impl fmt::Display for Printed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Printed::Int(i) => write!(f, "{}", i),
            Printed::Float(x) => write!(f, "{}", format_float(*x)),
        }
    }
}

fn arith_err(message: &str) -> Error {
    Error::Arithmetic {
        message: message.to_string(),
    }
}

fn finite(x: f64, op: &str) -> Result<Value, Error> {
    if x.is_nan() {
        return Err(arith_err(&format!("{} has no real result", op)));
    }
    if x.is_infinite() {
        return Err(arith_err(&format!("{} result out of range", op)));
    }

    Ok(Value::Float(x))
}

/// Integers beyond f64 range saturate to infinity, which `finite` then rejects
fn int_to_float(i: &BigInt) -> f64 {
    match i.to_f64() {
        Some(x) => x,
        None if i.is_negative() => f64::NEG_INFINITY,
        None => f64::INFINITY,
    }
}

impl From<&Constant> for Value {
    fn from(c: &Constant) -> Self {
        match c {
            Constant::Integer(i) => Value::Integer(i.clone()),
            Constant::Float(x) => Value::Float(*x),
        }
    }
}

impl Value {
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Integer(i) => int_to_float(i),
            Value::Float(x) => *x,
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Value::Integer(i) => i.is_zero(),
            Value::Float(x) => *x == 0.0,
        }
    }

    fn is_negative(&self) -> bool {
        match self {
            Value::Integer(i) => i.is_negative(),
            Value::Float(x) => *x < 0.0,
        }
    }

    pub fn add(&self, rhs: &Value) -> Result<Value, Error> {
        match (self, rhs) {
            (Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l + r)),
            _ => finite(self.as_float() + rhs.as_float(), "addition"),
        }
    }

    pub fn sub(&self, rhs: &Value) -> Result<Value, Error> {
        match (self, rhs) {
            (Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l - r)),
            _ => finite(self.as_float() - rhs.as_float(), "subtraction"),
        }
    }

    pub fn mul(&self, rhs: &Value) -> Result<Value, Error> {
        match (self, rhs) {
            (Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l * r)),
            _ => finite(self.as_float() * rhs.as_float(), "multiplication"),
        }
    }

    /// True division: the result is always a float, even for evenly dividing integers
    pub fn div(&self, rhs: &Value) -> Result<Value, Error> {
        if rhs.is_zero() {
            return Err(arith_err("division by zero"));
        }

        // Exact quotients of huge integers stay representable even when the operands are not
        if let (Value::Integer(l), Value::Integer(r)) = (self, rhs) {
            if (l % r).is_zero() {
                return finite(int_to_float(&(l / r)), "division");
            }
        }

        finite(self.as_float() / rhs.as_float(), "division")
    }

    pub fn pow(&self, rhs: &Value) -> Result<Value, Error> {
        if self.is_zero() && rhs.is_negative() {
            return Err(arith_err("zero raised to a negative power"));
        }

        if let (Value::Integer(base), Value::Integer(exp)) = (self, rhs) {
            if let Some(exp) = exp.to_u32() {
                return Ok(Value::Integer(base.pow(exp)));
            }
        }

        finite(self.as_float().powf(rhs.as_float()), "exponentiation")
    }

    /// Integral values print as integers, whatever arithmetic produced them
    pub fn to_printed(&self) -> Printed {
        match self {
            Value::Integer(i) => Printed::Int(i.clone()),
            Value::Float(x) if x.fract() == 0.0 => match BigInt::from_f64(*x) {
                Some(i) => Printed::Int(i),
                None => Printed::Float(*x),
            },
            Value::Float(x) => Printed::Float(*x),
        }
    }
}

#[cfg(test)]
fn big(digits: &str) -> BigInt {
    digits.parse().expect("bad test integer")
}

#[test]
fn test_arithmetic() {
    let i = |n: i64| Value::Integer(BigInt::from(n));
    let f = Value::Float;
    let data = vec![
        (i(2).add(&i(3)), i(5)),
        (i(2).sub(&i(3)), i(-1)),
        (i(2).mul(&i(3)), i(6)),
        (i(5).div(&i(2)), f(2.5)),
        (i(4).div(&i(2)), f(2.0)),
        (i(2).pow(&i(10)), i(1024)),
        (i(2).pow(&i(-1)), f(0.5)),
        (f(2.5).pow(&i(4)), f(39.0625)),
        (f(1.5).add(&i(1)), f(2.5)),
        (i(16).pow(&f(0.5)), f(4.0)),
    ];

    for (got, expected) in data {
        assert_eq!(got, Ok(expected));
    }
}

#[test]
fn test_integers_are_exact() {
    let three = Value::Integer(BigInt::from(3));
    assert_eq!(
        three.pow(&Value::Integer(BigInt::from(100))),
        Ok(Value::Integer(big(
            "515377520732011331036461129765621272702107522001"
        )))
    );

    let max = Value::Integer(BigInt::from(i128::MAX));
    assert_eq!(
        max.add(&Value::Integer(BigInt::from(1))),
        Ok(Value::Integer(big("170141183460469231731687303715884105728")))
    );

    let ten = Value::Integer(BigInt::from(10));
    let lhs = ten.pow(&Value::Integer(BigInt::from(300))).expect("pow failed");
    let rhs = ten.pow(&Value::Integer(BigInt::from(10))).expect("pow failed");
    let mut expected = String::from("1");
    expected.push_str(&"0".repeat(310));
    assert_eq!(lhs.mul(&rhs), Ok(Value::Integer(big(&expected))));

    // Quotient fits a float even though the dividend does not
    let huge = Value::Integer(big(&expected));
    assert_eq!(huge.div(&lhs), Ok(Value::Float(1e10)));
}

#[test]
fn test_arithmetic_errors() {
    let i = |n: i64| Value::Integer(BigInt::from(n));
    let data = vec![
        i(1).div(&i(0)),
        Value::Float(1.5).div(&Value::Float(0.0)),
        i(0).pow(&i(-1)),
        i(-8).pow(&Value::Float(0.5)),
        Value::Float(10.5).pow(&i(1000)),
        i(10).pow(&i(400)).and_then(|v| v.add(&Value::Float(0.5))),
    ];

    for res in data {
        match res {
            Err(Error::Arithmetic { .. }) => (),
            other => panic!("expected arithmetic error, got {:?}", other),
        }
    }
}

#[test]
fn test_to_printed() {
    let data = vec![
        (Value::Integer(BigInt::from(21)), Printed::Int(BigInt::from(21))),
        (Value::Float(2.0), Printed::Int(BigInt::from(2))),
        (Value::Float(-0.0), Printed::Int(BigInt::from(0))),
        (Value::Float(2.5), Printed::Float(2.5)),
        (Value::Float(1e20), Printed::Int(big("100000000000000000000"))),
    ];

    for (value, expected) in data {
        assert_eq!(value.to_printed(), expected);
    }

    // Any integral float collapses, however large
    match Value::Float(1e300).to_printed() {
        Printed::Int(i) => assert_eq!(i.to_string().len(), 301),
        other => panic!("expected integer, got {:?}", other),
    }
}

#[test]
fn test_display() {
    let data = vec![
        (Printed::Int(BigInt::from(-5)), "-5"),
        (Printed::Float(2.5), "2.5"),
        (Printed::Float(39.0625), "39.0625"),
        (Printed::Float(0.0001), "0.0001"),
        (Printed::Float(0.00012345), "0.00012345"),
        (Printed::Float(1e-7), "1e-07"),
        (Printed::Float(-1.5e-7), "-1.5e-07"),
        (Printed::Float(1.25e-100), "1.25e-100"),
        (Printed::Float(0.1 * 3.0), "0.30000000000000004"),
    ];

    for (printed, expected) in data {
        assert_eq!(printed.to_string(), expected);
    }
}
