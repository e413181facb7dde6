//! Non-fatal build diagnostics.
//!
//! Warnings never abort a build. Each one is logged when it is raised and
//! kept in a [`Warnings`] collector so callers can report or inspect them.

use std::fmt;

use serde::Serialize;

use crate::version::Version;

/// A non-fatal diagnostic raised while validating or emitting a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    /// The resolved framework version is not the recommended one.
    NonRecommendedVersion {
        framework: String,
        version: Version,
        recommended: Version,
    },
    /// A platform version is not a valid package version constraint and is
    /// passed through unchanged.
    UnknownPlatformVersion { value: String },
    /// A local SDK component source was declared; it produces no directive.
    LocalComponentUnsupported { name: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NonRecommendedVersion {
                framework,
                version,
                recommended,
            } => write!(
                f,
                "The selected {framework} framework version {version} is not the recommended one \
                 ({recommended}). If there are connectivity or build issues please remove the \
                 manual version."
            ),
            Warning::UnknownPlatformVersion { value } => {
                write!(f, "Unknown platform version: {value}")
            }
            Warning::LocalComponentUnsupported { name } => write!(
                f,
                "Local components are not implemented yet; component '{name}' is skipped."
            ),
        }
    }
}

/// Ordered collection of warnings raised during one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a warning and keep it.
    pub fn push(&mut self, warning: Warning) {
        match &warning {
            Warning::UnknownPlatformVersion { .. } => tracing::error!("{warning}"),
            _ => tracing::warn!("{warning}"),
        }
        self.items.push(warning);
    }

    /// Append already-logged warnings from another collector.
    pub fn extend(&mut self, other: Warnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
