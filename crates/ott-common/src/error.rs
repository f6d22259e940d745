//! Error types for the OTT taxonomy workspace

use thiserror::Error;

/// Result type alias for OTT taxonomy operations
pub type Result<T> = std::result::Result<T, OttError>;

/// Main error type for OTT taxonomy operations
///
/// Lookup failures carry both the rejected value and the full list of valid
/// alternatives so callers can report or correct them.
#[derive(Error, Debug)]
pub enum OttError {
    #[error("Version {version} not found in available versions: {available:?}")]
    VersionNotFound {
        version: String,
        available: Vec<String>,
    },

    #[error("Entry {entry} not found in available entries: {available:?}")]
    UnavailableEntry {
        entry: String,
        available: Vec<String>,
    },

    #[error("No taxonomy loaded: build the dataset with the load path before requesting a graph")]
    NoTaxonomyLoaded,

    #[error("Taxon {0} is not a node of the taxonomy graph")]
    TaxonNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OttError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Valid alternatives attached to a lookup failure, if any
    pub fn alternatives(&self) -> Option<&[String]> {
        match self {
            Self::VersionNotFound { available, .. } | Self::UnavailableEntry { available, .. } => {
                Some(available)
            },
            _ => None,
        }
    }

    /// Whether the error is a missing-file I/O error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_not_found_message_lists_alternatives() {
        let err = OttError::VersionNotFound {
            version: "ott9.9".to_string(),
            available: vec!["ott3.6".to_string(), "ott3.7".to_string()],
        };

        let msg = err.to_string();
        assert!(msg.contains("ott9.9"));
        assert!(msg.contains("ott3.6"));
        assert_eq!(err.alternatives().map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_is_not_found() {
        let err: OttError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.is_not_found());
        assert!(!OttError::NoTaxonomyLoaded.is_not_found());
        assert!(OttError::NoTaxonomyLoaded.alternatives().is_none());
    }
}
