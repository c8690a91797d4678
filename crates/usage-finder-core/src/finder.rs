//! Finding every usage of a set of components
//!
//! Each (component, strategy) pair becomes one search stream. Streams are
//! merged per component and then across components, and the result is
//! wrapped so that any failure tears down all running searches.

use std::sync::Arc;

use futures::TryStreamExt;
use tracing::{debug, info};

use crate::config::FinderConfig;
use crate::error::{FinderError, FinderResult};
use crate::lifecycle::{ProcessRegistry, global_registry, terminate_on_error};
use crate::merge::{UsageStream, merge};
use crate::metadata::{GitCli, RepoMetadataCache, VersionControl};
use crate::search::Searcher;
use crate::strategy::Strategy;
use crate::usage::UsageEnricher;

/// Entry point of the search engine
#[derive(Debug, Clone)]
pub struct UsageFinder {
    searcher: Searcher,
    enricher: Arc<UsageEnricher>,
    registry: Arc<ProcessRegistry>,
}

impl UsageFinder {
    /// Create a finder using git for metadata and the process-wide registry
    pub fn new(config: &FinderConfig) -> Self {
        let git = Arc::new(GitCli::new(&config.git_program));
        Self::with_parts(config, global_registry(), git)
    }

    /// Create a finder with an explicit registry and metadata source
    pub fn with_parts(
        config: &FinderConfig,
        registry: Arc<ProcessRegistry>,
        vcs: Arc<dyn VersionControl>,
    ) -> Self {
        let metadata = Arc::new(RepoMetadataCache::new(vcs));

        Self {
            searcher: Searcher::new(config, Arc::clone(&registry)),
            enricher: Arc::new(UsageEnricher::new(config, metadata)),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<ProcessRegistry> {
        &self.registry
    }

    /// Every usage of every component, in no particular order.
    ///
    /// Fails up front on an empty list or an unusable component name.
    pub fn find_all_usages(&self, components: &[String]) -> FinderResult<UsageStream> {
        if components.is_empty() {
            return Err(FinderError::invalid_input(
                "Component list empty, need the name of at least one component",
            ));
        }
        for component in components {
            validate_component_name(component)?;
        }

        info!("Searching for usages of {} components", components.len());

        let searches = components
            .iter()
            .map(|component| self.component_usages(component));

        Ok(terminate_on_error(merge(searches), Arc::clone(&self.registry)))
    }

    /// Every usage of one component, in no particular order
    pub fn find_usages(&self, component: &str) -> FinderResult<UsageStream> {
        validate_component_name(component)?;
        Ok(terminate_on_error(
            self.component_usages(component),
            Arc::clone(&self.registry),
        ))
    }

    /// Usages of one component found by one strategy.
    ///
    /// Not guarded: a failure is returned without terminating other searches.
    pub fn find_usages_via(&self, strategy: Strategy, component: &str) -> UsageStream {
        debug!("Searching for {} via {}", component, strategy);

        let enricher = Arc::clone(&self.enricher);
        let component = component.to_string();
        let matches = self.searcher.search(&strategy.search_plan(&component));

        Box::pin(matches.and_then(move |raw| {
            let enricher = Arc::clone(&enricher);
            let component = component.clone();
            async move { enricher.enrich(raw, &component, strategy.labels()).await }
        }))
    }

    fn component_usages(&self, component: &str) -> UsageStream {
        merge(
            Strategy::ALL
                .iter()
                .map(|strategy| self.find_usages_via(*strategy, component)),
        )
    }
}

/// Component names are spliced into search expressions, so only identifiers
/// are accepted
pub fn validate_component_name(name: &str) -> FinderResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(FinderError::invalid_input(format!(
            "Component name must be an identifier, got `{}`",
            name
        )))
    }
}
