//! Error types for the gearfit_core library.
//!
//! Missing or malformed equipment data is not an error: the resolver and the
//! matcher absorb it. These variants cover the file, config and flow surfaces.

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Profile or catalog JSON that could not be written or read
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV catalog error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog file whose extension is neither `.json` nor `.csv`
    #[error("Unsupported catalog format {0:?}, expected a .json or .csv file")]
    UnsupportedCatalog(PathBuf),

    /// Question flow misuse (answering a finished flow, too many selections)
    #[error("Questionnaire error: {0}")]
    Questionnaire(String),

    /// Profile location unusable for saving
    #[error("Profile error: {0}")]
    Profile(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_surface() {
        let err = Error::UnsupportedCatalog(PathBuf::from("exercises.xml"));
        assert!(err.to_string().contains("exercises.xml"));

        let err = Error::Questionnaire("training_location accepts a single option".into());
        assert_eq!(
            err.to_string(),
            "Questionnaire error: training_location accepts a single option"
        );
    }
}
