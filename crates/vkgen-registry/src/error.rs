//! Error taxonomy for registry processing.
//!
//! Every failure is fatal for the run that raises it: the registry is a
//! curated artifact, so a violated assumption means either the registry
//! changed shape or a new case needs handling. There is no partial output.

use std::fmt;
use thiserror::Error;

/// Registry section an error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Registry,
    Tags,
    Types,
    Enums,
    Commands,
    Extensions,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Registry => "registry",
            Section::Tags => "tags",
            Section::Types => "types",
            Section::Enums => "enums",
            Section::Commands => "commands",
            Section::Extensions => "extensions",
        };
        f.write_str(name)
    }
}

/// An entity the resolver could not place, with the names still missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuckEntity {
    pub name: String,
    pub missing: Vec<String>,
}

impl fmt::Display for StuckEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (waiting on {})", self.name, self.missing.join(", "))
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("malformed registry [{section}] {entity}: {reason}")]
    MalformedRegistry {
        section: Section,
        entity: String,
        reason: String,
    },

    #[error("unresolvable dependencies among {} entities: {}", .stuck.len(), render_stuck(.stuck))]
    UnresolvableDependency { stuck: Vec<StuckEntity> },

    #[error("ambiguous signature for command `{command}`: {reason}")]
    AmbiguousSignature { command: String, reason: String },

    #[error("registry is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

impl RegistryError {
    pub(crate) fn malformed(
        section: Section,
        entity: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RegistryError::MalformedRegistry {
            section,
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn ambiguous(command: impl Into<String>, reason: impl Into<String>) -> Self {
        RegistryError::AmbiguousSignature {
            command: command.into(),
            reason: reason.into(),
        }
    }
}

/// Diagnostics list at most this many stuck entities inline.
const STUCK_DISPLAY_LIMIT: usize = 8;

fn render_stuck(stuck: &[StuckEntity]) -> String {
    let mut parts: Vec<String> = stuck
        .iter()
        .take(STUCK_DISPLAY_LIMIT)
        .map(ToString::to_string)
        .collect();
    if stuck.len() > STUCK_DISPLAY_LIMIT {
        parts.push(format!("… and {} more", stuck.len() - STUCK_DISPLAY_LIMIT));
    }
    parts.join("; ")
}

/// Failures of the identifier transforms in [`crate::ident`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentError {
    #[error("`{value}` does not contain the mandatory suffix `{suffix}`")]
    MalformedIdentifier { value: String, suffix: String },

    #[error("`{0}` must start with an uppercase letter or digit")]
    NotScreamingSnake(String),

    #[error("extension name `{0}` needs at least two `_`-delimited segments")]
    MalformedExtensionName(String),
}

pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
