//! Search configuration
//!
//! Defaults are suitable for searching a folder of HMRC checkouts with the
//! standard `rg`, `xargs` and `git` binaries on `PATH`. Each can be overridden
//! from the environment.

use std::env;
use std::path::PathBuf;

use crate::error::{FinderError, FinderResult};

/// Default web host prefix used to build links to usage examples
pub const DEFAULT_WEB_BASE_URL: &str = "https://github.com/hmrc";

/// Configuration shared by every search in one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderConfig {
    /// Folder whose immediate sub folders are repository checkouts
    pub search_path: PathBuf,
    /// Prefix for `github_url`, the repository name is appended to it
    pub web_base_url: String,
    /// ripgrep executable, must be built with PCRE2 support
    pub ripgrep_program: String,
    /// xargs executable, must understand `-0` and `--no-run-if-empty`
    pub xargs_program: String,
    /// git executable
    pub git_program: String,
}

impl FinderConfig {
    /// Create a configuration with default programs for the given search path
    pub fn new(search_path: impl Into<PathBuf>) -> Self {
        Self {
            search_path: search_path.into(),
            web_base_url: DEFAULT_WEB_BASE_URL.to_string(),
            ripgrep_program: "rg".to_string(),
            xargs_program: "xargs".to_string(),
            git_program: "git".to_string(),
        }
    }

    /// Apply `FIND_USAGES_*` environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("FIND_USAGES_WEB_BASE_URL") {
            self.web_base_url = url;
        }
        if let Ok(program) = env::var("FIND_USAGES_RG") {
            self.ripgrep_program = program;
        }
        if let Ok(program) = env::var("FIND_USAGES_XARGS") {
            self.xargs_program = program;
        }
        if let Ok(program) = env::var("FIND_USAGES_GIT") {
            self.git_program = program;
        }
        self
    }

    /// Set the web host prefix
    pub fn with_web_base_url(mut self, url: impl Into<String>) -> Self {
        self.web_base_url = url.into();
        self
    }

    /// Check the configuration before any search starts
    pub fn validate(&self) -> FinderResult<()> {
        if !self.search_path.is_dir() {
            return Err(FinderError::invalid_input(format!(
                "Search path must be a folder with git repositories checked out as immediate sub folders: {}",
                self.search_path.display()
            )));
        }

        if self.web_base_url.trim().is_empty() {
            return Err(FinderError::invalid_input("Web base url must not be empty"));
        }

        Ok(())
    }

    /// Web prefix without any trailing slash
    pub fn web_base_url(&self) -> &str {
        self.web_base_url.trim_end_matches('/')
    }
}
