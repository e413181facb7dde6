//! Framework versions and package version constraints.
//!
//! Wraps the `semver` crate. Framework releases are plain
//! `major.minor.patch` triples, so pre-release and build-metadata suffixes
//! are rejected at parse time.

use crate::error::{ParseError, Result};

/// A parsed framework version.
pub type Version = semver::Version;

/// Parse a version string like "2.7.4".
pub fn parse_version(s: &str) -> Result<Version> {
    let invalid = |reason: String| ParseError::Version {
        input: s.to_string(),
        reason,
    };
    let version = Version::parse(s).map_err(|e| invalid(e.to_string()))?;
    if !version.pre.is_empty() || !version.build.is_empty() {
        return Err(invalid("expected a plain major.minor.patch version".into()));
    }
    Ok(version)
}

/// Render the C preprocessor `VERSION_CODE(...)` expression for a version.
pub fn version_code(version: &Version) -> String {
    format!(
        "VERSION_CODE({}, {}, {})",
        version.major, version.minor, version.patch
    )
}

/// Operator prefix of a package version constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// `^`: compatible release.
    Caret,
    /// `~`: approximately equivalent.
    Tilde,
    /// `>=`
    GreaterEq,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `<`
    Less,
    /// `!=`
    NotEq,
}

impl ConstraintOp {
    // Longer prefixes before their single-character counterparts.
    const PREFIXES: [(&'static str, ConstraintOp); 7] = [
        ("^", ConstraintOp::Caret),
        ("~", ConstraintOp::Tilde),
        (">=", ConstraintOp::GreaterEq),
        (">", ConstraintOp::Greater),
        ("<=", ConstraintOp::LessEq),
        ("<", ConstraintOp::Less),
        ("!=", ConstraintOp::NotEq),
    ];

    /// The textual prefix of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintOp::Caret => "^",
            ConstraintOp::Tilde => "~",
            ConstraintOp::GreaterEq => ">=",
            ConstraintOp::Greater => ">",
            ConstraintOp::LessEq => "<=",
            ConstraintOp::Less => "<",
            ConstraintOp::NotEq => "!=",
        }
    }
}

/// One item of a comma-separated package version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    /// Operator, or `None` for an exact pin.
    pub op: Option<ConstraintOp>,
    /// The version operand.
    pub version: Version,
}

/// Parse a package version constraint such as `"^3.2.0"` or `">=1.0.0,<2.0.0"`.
///
/// Items are split on `,` and taken literally: whitespace around an item or
/// its operator makes the whole value invalid.
pub fn parse_constraint(s: &str) -> Result<Vec<VersionConstraint>> {
    s.split(',')
        .map(|item| {
            let (op, operand) = ConstraintOp::PREFIXES
                .iter()
                .find_map(|(prefix, op)| item.strip_prefix(prefix).map(|rest| (Some(*op), rest)))
                .unwrap_or((None, item));
            let version = parse_version(operand).map_err(|_| ParseError::Version {
                input: s.to_string(),
                reason: format!("constraint item '{item}' does not name a full version"),
            })?;
            Ok(VersionConstraint { op, version })
        })
        .collect()
}
