//! Scalar types.

use std::fmt;

/// Precision of a decimal type with no upper bound.
pub const UNBOUNDED_PRECISION: u32 = u32::MAX;

/// A numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    /// Any number.
    Any,
    /// A decimal with a fixed scale. Scale 0 is an integer; a negative scale
    /// rounds to a power of ten.
    Decimal { precision: u32, scale: i32 },
}

impl NumericType {
    /// The integer type: unbounded precision, scale 0.
    pub fn integer() -> Self {
        NumericType::Decimal {
            precision: UNBOUNDED_PRECISION,
            scale: 0,
        }
    }

    pub fn decimal(precision: u32, scale: i32) -> Self {
        NumericType::Decimal { precision, scale }
    }

    /// Check if values of this type are always whole numbers.
    pub fn is_integer(&self) -> bool {
        matches!(self, NumericType::Decimal { scale: 0, .. })
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericType::Any => write!(f, "NUMERIC"),
            NumericType::Decimal {
                precision: UNBOUNDED_PRECISION,
                scale: 0,
            } => write!(f, "INTEGER"),
            NumericType::Decimal {
                precision: UNBOUNDED_PRECISION,
                scale,
            } => write!(f, "DECIMAL(*, {})", scale),
            NumericType::Decimal { precision, scale } => {
                write!(f, "DECIMAL({}, {})", precision, scale)
            }
        }
    }
}

/// A scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Any scalar value. Also the value type of members and tuples.
    Any,
    Numeric(NumericType),
    String,
    Boolean,
    DateTime,
    /// The type of the null literal.
    Null,
}

impl ScalarType {
    /// Most specific common supertype of two scalar types.
    ///
    /// Null yields to the other type; two different numeric types widen to
    /// plain numeric; any other difference widens to plain scalar.
    pub fn common(&self, other: &ScalarType) -> ScalarType {
        match (self, other) {
            (a, b) if a == b => *a,
            (ScalarType::Null, t) | (t, ScalarType::Null) => *t,
            (ScalarType::Numeric(_), ScalarType::Numeric(_)) => {
                ScalarType::Numeric(NumericType::Any)
            }
            _ => ScalarType::Any,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarType::Numeric(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, ScalarType::Numeric(n) if n.is_integer())
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Any => write!(f, "SCALAR"),
            ScalarType::Numeric(n) => write!(f, "{}", n),
            ScalarType::String => write!(f, "STRING"),
            ScalarType::Boolean => write!(f, "BOOLEAN"),
            ScalarType::DateTime => write!(f, "DATETIME"),
            ScalarType::Null => write!(f, "NULL"),
        }
    }
}
