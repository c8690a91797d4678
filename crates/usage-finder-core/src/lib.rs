//! Usage Finder Core Library
//!
//! Discovers usages of design system components across a folder of
//! independently checked out repositories written in Twirl and Nunjucks.
//!
//! Detection is pattern based, not a parse of the templates, so it is
//! best-effort: some usages are missed and some matches are not usages.
//!
//! ```no_run
//! use futures::StreamExt;
//! use usage_finder_core::{FinderConfig, UsageFinder};
//!
//! # async fn run() -> usage_finder_core::FinderResult<()> {
//! let config = FinderConfig::new("/path/to/repos");
//! config.validate()?;
//!
//! let finder = UsageFinder::new(&config);
//! let mut usages = finder.find_all_usages(&["govukButton".to_string()])?;
//! while let Some(usage) = usages.next().await {
//!     println!("{}", usage?.usage_example.github_url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod finder;
pub mod lifecycle;
pub mod merge;
pub mod metadata;
pub mod render;
pub mod search;
pub mod strategy;
pub mod types;
pub mod usage;

// Re-export commonly used types
pub use config::FinderConfig;
pub use error::{FinderError, FinderResult};
pub use finder::{UsageFinder, validate_component_name};
pub use lifecycle::{ProcessRegistry, global_registry, terminate_on_error};
pub use merge::{BoxedStream, UsageStream, merge};
pub use metadata::{GitCli, RepoMetadataCache, VersionControl};
pub use strategy::{SearchPlan, Strategy};
pub use types::{Library, RawMatch, TemplateLanguage};
pub use usage::{UsageExample, UsageRecord};
