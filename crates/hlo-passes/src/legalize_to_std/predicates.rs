//! `comparison_direction` values and their `std` predicate equivalents.

use std::fmt;

use tensor_ir::dialect::standard::{CmpFPredicate, CmpIPredicate};

/// Direction of an `xla_hlo.compare`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonDirection {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonDirection {
    pub const ALL: [ComparisonDirection; 6] = [
        ComparisonDirection::Eq,
        ComparisonDirection::Ne,
        ComparisonDirection::Lt,
        ComparisonDirection::Le,
        ComparisonDirection::Gt,
        ComparisonDirection::Ge,
    ];

    /// Parse the attribute spelling (`"EQ"`, `"NE"`, ...). Case-sensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EQ" => Some(ComparisonDirection::Eq),
            "NE" => Some(ComparisonDirection::Ne),
            "LT" => Some(ComparisonDirection::Lt),
            "LE" => Some(ComparisonDirection::Le),
            "GT" => Some(ComparisonDirection::Gt),
            "GE" => Some(ComparisonDirection::Ge),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonDirection::Eq => "EQ",
            ComparisonDirection::Ne => "NE",
            ComparisonDirection::Lt => "LT",
            ComparisonDirection::Le => "LE",
            ComparisonDirection::Gt => "GT",
            ComparisonDirection::Ge => "GE",
        }
    }

    /// Signed integer predicate for this direction.
    pub fn int_predicate(self) -> CmpIPredicate {
        match self {
            ComparisonDirection::Eq => CmpIPredicate::Eq,
            ComparisonDirection::Ne => CmpIPredicate::Ne,
            ComparisonDirection::Lt => CmpIPredicate::Slt,
            ComparisonDirection::Le => CmpIPredicate::Sle,
            ComparisonDirection::Gt => CmpIPredicate::Sgt,
            ComparisonDirection::Ge => CmpIPredicate::Sge,
        }
    }

    /// Float predicate for this direction. `NE` is unordered so that
    /// `x != NaN` holds; the others are ordered.
    pub fn float_predicate(self) -> CmpFPredicate {
        match self {
            ComparisonDirection::Eq => CmpFPredicate::Oeq,
            ComparisonDirection::Ne => CmpFPredicate::Une,
            ComparisonDirection::Lt => CmpFPredicate::Olt,
            ComparisonDirection::Le => CmpFPredicate::Ole,
            ComparisonDirection::Gt => CmpFPredicate::Ogt,
            ComparisonDirection::Ge => CmpFPredicate::Oge,
        }
    }
}

impl fmt::Display for ComparisonDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer predicate for a raw direction symbol, or `None` if unsupported.
pub fn int_predicate(direction: &str) -> Option<CmpIPredicate> {
    ComparisonDirection::parse(direction).map(ComparisonDirection::int_predicate)
}

/// Float predicate for a raw direction symbol, or `None` if unsupported.
pub fn float_predicate(direction: &str) -> Option<CmpFPredicate> {
    ComparisonDirection::parse(direction).map(ComparisonDirection::float_predicate)
}
