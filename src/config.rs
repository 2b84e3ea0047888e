//! Explicit configuration of a session
use std::path::{Path, PathBuf};

/// Default name of the input dataset
pub const DEFAULT_DATASET_NAME: &str = "session_data";
/// Default name of the define through which the model finds the input data
pub const DEFAULT_INCLUDE_DEFINE: &str = "gdxincname";

/// Where the model lives, where it runs, and how the input data is passed to it.
///
/// ```
/// use gams_session::config::SessionConfig;
///
/// let config = SessionConfig::new("models/transport.gms")
///     .with_define("scenario", "base")
///     .with_option("optcr", "0");
/// assert_eq!(config.dataset_name(), "session_data");
/// assert_eq!(config.include_define(), "gdxincname");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    model_file: PathBuf,
    working_directory: Option<PathBuf>,
    dataset_name: String,
    include_define: String,
    defines: Vec<(String, String)>,
    options: Vec<(String, String)>,
}

impl SessionConfig {
    /// Configuration for the given model file, with default settings
    pub fn new(model_file: impl Into<PathBuf>) -> SessionConfig {
        SessionConfig {
            model_file: model_file.into(),
            working_directory: None,
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
            include_define: DEFAULT_INCLUDE_DEFINE.to_string(),
            defines: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Run in `dir` instead of the model file's directory
    pub fn with_working_directory(&self, dir: impl Into<PathBuf>) -> SessionConfig {
        SessionConfig {
            working_directory: Some(dir.into()),
            ..self.clone()
        }
    }

    /// Name the input dataset. This is also the base name of the data file.
    pub fn with_dataset_name(&self, name: impl Into<String>) -> SessionConfig {
        SessionConfig {
            dataset_name: name.into(),
            ..self.clone()
        }
    }

    /// Pass the data file to the model under another define than `gdxincname`
    pub fn with_include_define(&self, name: impl Into<String>) -> SessionConfig {
        SessionConfig {
            include_define: name.into(),
            ..self.clone()
        }
    }

    /// Add a `--name=value` define to the model run
    pub fn with_define(&self, name: impl Into<String>, value: impl Into<String>) -> SessionConfig {
        let mut config = self.clone();
        config.defines.push((name.into(), value.into()));
        config
    }

    /// Add a `name=value` GAMS command line parameter to the model run
    pub fn with_option(&self, name: impl Into<String>, value: impl Into<String>) -> SessionConfig {
        let mut config = self.clone();
        config.options.push((name.into(), value.into()));
        config
    }

    /// The model file, as given
    pub fn model_file(&self) -> &Path {
        &self.model_file
    }

    /// The working directory override, if any
    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    /// Name of the input dataset
    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    /// Name of the define carrying the input data location
    pub fn include_define(&self) -> &str {
        &self.include_define
    }

    /// Extra defines, in insertion order
    pub fn defines(&self) -> &[(String, String)] {
        &self.defines
    }

    /// Extra command line parameters, in insertion order
    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }
}
