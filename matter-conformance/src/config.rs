use std::fs;
use std::path::{Path, PathBuf};

use matter_pics_parser::{parse_pics, NamedArg, PicsParseError, PicsSet, TestParameters};
use miette::Diagnostic;
use thiserror::Error;
use tracing::info;

/// Everything a test run is configured with, resolved before the first test
/// starts and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatterTestConfig {
    pub global_test_params: TestParameters,
    pub pics: PicsSet,
    pub tests: Vec<String>,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot read PICS file {}", .path.display())]
    #[diagnostic(code(config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pics(#[from] PicsParseError),
}

impl MatterTestConfig {
    pub fn new(args: impl IntoIterator<Item = NamedArg>, pics: PicsSet, tests: Vec<String>) -> Self {
        Self {
            global_test_params: args.into_iter().collect(),
            pics,
            tests,
        }
    }
}

pub fn load_pics(path: &Path) -> Result<PicsSet, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let pics = parse_pics(&path.display().to_string(), &content)?;
    info!(path = %path.display(), count = pics.len(), "loaded PICS");
    Ok(pics)
}
