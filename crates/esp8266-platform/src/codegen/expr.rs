//! C++ expressions for generated code.

use std::fmt;

use serde::{Serialize, Serializer};

/// A C++ expression emitted into generated source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Emitted verbatim.
    Raw(String),
    /// A string literal.
    Str(String),
    Int(i64),
    Bool(bool),
    /// `callee(args...)`.
    Call {
        callee: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn raw(s: impl Into<String>) -> Self {
        Expression::Raw(s.into())
    }

    pub fn str(s: impl Into<String>) -> Self {
        Expression::Str(s.into())
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Call {
            callee: callee.into(),
            args,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Raw(raw) => f.write_str(raw),
            Expression::Str(s) => write_cpp_string(f, s),
            Expression::Int(i) => write!(f, "{i}"),
            Expression::Bool(b) => write!(f, "{b}"),
            Expression::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn write_cpp_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c.is_ascii_control() => write!(f, "\\{:03o}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}
