//! External search invocation and two-phase alias resolution
//!
//! All searches shell out to ripgrep with PCRE2 enabled. Single-phase
//! searches stream matches straight from the process. Two-phase searches
//! first collect a complete set of files (grouped by alias, or lacking a
//! local rebinding) and then search only those files.

pub mod alias;
pub mod command;
pub mod process;
pub mod ripgrep;

pub use alias::{AliasGroup, group_by_alias};
pub use command::SearchCommand;
pub use process::run_lines;
pub use ripgrep::{Ripgrep, parse_match, parse_submatches};

use std::path::PathBuf;
use std::sync::Arc;

use futures::{TryStreamExt, future, stream};
use tracing::debug;

use crate::config::FinderConfig;
use crate::lifecycle::ProcessRegistry;
use crate::merge::BoxedStream;
use crate::strategy::{SearchPlan, patterns};
use crate::types::{RawMatch, TemplateLanguage};

/// Runs search plans against one search folder
#[derive(Debug, Clone)]
pub struct Searcher {
    ripgrep: Ripgrep,
    working_dir: PathBuf,
    registry: Arc<ProcessRegistry>,
}

impl Searcher {
    pub fn new(config: &FinderConfig, registry: Arc<ProcessRegistry>) -> Self {
        Self {
            ripgrep: Ripgrep::from_config(config),
            working_dir: config.search_path.clone(),
            registry,
        }
    }

    /// Execute a compiled search plan
    pub fn search(&self, plan: &SearchPlan) -> BoxedStream<RawMatch> {
        match plan {
            SearchPlan::Tree { pattern, language } => self.search_tree(pattern, *language),
            SearchPlan::AliasThenUsage { alias_pattern } => self.search_aliases(alias_pattern),
            SearchPlan::UnboundThenCall {
                rebinding_patterns,
                call_pattern,
            } => self.search_unbound(rebinding_patterns, call_pattern),
        }
    }

    /// Single-phase search of every template of one language
    pub fn search_tree(&self, pattern: &str, language: TemplateLanguage) -> BoxedStream<RawMatch> {
        self.matches(self.ripgrep.search_tree(pattern, language))
    }

    /// Single-phase search restricted to `files`
    pub fn search_files(&self, pattern: &str, files: Vec<String>) -> BoxedStream<RawMatch> {
        self.matches(self.ripgrep.search_files(pattern, files))
    }

    /// First phase: every alias captured by `alias_pattern` in Twirl
    /// templates, with the files it was captured in
    pub fn resolve_aliases(&self, alias_pattern: &str) -> BoxedStream<AliasGroup> {
        // one declaration can bind several aliases, keep every capture
        let first_phase =
            self.every_match(self.ripgrep.search_tree(alias_pattern, TemplateLanguage::Twirl));

        Box::pin(
            stream::once(first_phase.try_collect::<Vec<_>>())
                .map_ok(|matches| {
                    let groups = group_by_alias(matches);
                    debug!("Resolved {} aliases", groups.len());
                    stream::iter(groups.into_iter().map(Ok))
                })
                .try_flatten(),
        )
    }

    fn search_aliases(&self, alias_pattern: &str) -> BoxedStream<RawMatch> {
        let searcher = self.clone();

        Box::pin(
            self.resolve_aliases(alias_pattern)
                .map_ok(move |group| {
                    searcher.search_files(&patterns::usage_not_instantiation(&group.alias), group.files)
                })
                .try_flatten(),
        )
    }

    fn search_unbound(&self, rebinding_patterns: &[String], call_pattern: &str) -> BoxedStream<RawMatch> {
        let unbound_files = run_lines(
            self.ripgrep
                .files_without_match(rebinding_patterns, TemplateLanguage::Twirl),
            self.working_dir.clone(),
            Arc::clone(&self.registry),
        );
        let searcher = self.clone();
        let call_pattern = call_pattern.to_string();

        Box::pin(
            stream::once(unbound_files.try_collect::<Vec<_>>())
                .map_ok(move |files| {
                    debug!("{} templates without a local rebinding", files.len());
                    searcher.search_files(&call_pattern, files)
                })
                .try_flatten()
                // inline instantiations are found by the other strategies
                .try_filter(|raw| future::ready(!raw.text.starts_with("new"))),
        )
    }

    fn matches(&self, command: SearchCommand) -> BoxedStream<RawMatch> {
        Box::pin(
            run_lines(command, self.working_dir.clone(), Arc::clone(&self.registry))
                .try_filter_map(|line| future::ready(parse_match(&line))),
        )
    }

    fn every_match(&self, command: SearchCommand) -> BoxedStream<RawMatch> {
        Box::pin(
            run_lines(command, self.working_dir.clone(), Arc::clone(&self.registry))
                .and_then(|line| future::ready(parse_submatches(&line)))
                .map_ok(|matches| stream::iter(matches.into_iter().map(Ok)))
                .try_flatten(),
        )
    }
}
