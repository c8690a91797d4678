//! Turning raw matches into usage records

use std::path::PathBuf;
use std::sync::Arc;

use super::{UsageExample, UsageRecord, newline_count};
use crate::config::FinderConfig;
use crate::error::{FinderError, FinderResult};
use crate::metadata::RepoMetadataCache;
use crate::strategy::{WITH_FORM_FIELD_FRAGMENT, WITH_FORM_FIELD_LABEL};
use crate::types::{Library, RawMatch, TemplateLanguage};

/// Parses and enriches raw matches found below one search folder
#[derive(Debug)]
pub struct UsageEnricher {
    search_path: PathBuf,
    web_base_url: String,
    metadata: Arc<RepoMetadataCache>,
}

impl UsageEnricher {
    pub fn new(config: &FinderConfig, metadata: Arc<RepoMetadataCache>) -> Self {
        Self {
            search_path: config.search_path.clone(),
            web_base_url: config.web_base_url().to_string(),
            metadata,
        }
    }

    /// Build the usage record for one match of `component`.
    ///
    /// `labels` are the originating strategy's labels; a content-derived
    /// label is appended when the code uses `.withFormField`.
    pub async fn enrich(
        &self,
        raw: RawMatch,
        component: &str,
        labels: &[&str],
    ) -> FinderResult<UsageRecord> {
        let (repo, path) = split_repo_path(&raw.path)?;
        let repo_path = self.search_path.join(&repo);

        let commit = self.metadata.latest_commit(&repo_path).await?;
        let repo_last_updated = self.metadata.last_updated(&repo_path).await?;

        let template_language = TemplateLanguage::from_path(&path);
        let library = Library::identify(template_language, component)?;

        let code = raw.text;
        let line_start = raw.line_number;
        let line_stop = line_start + newline_count(&code) as u64;

        let mut labels: Vec<String> = labels.iter().map(|label| label.to_string()).collect();
        if code.contains(WITH_FORM_FIELD_FRAGMENT) {
            labels.push(WITH_FORM_FIELD_LABEL.to_string());
        }

        let github_url = format!(
            "{}/{}/blob/{}/{}#L{}-L{}",
            self.web_base_url, repo, commit, path, line_start, line_stop
        );

        Ok(UsageRecord {
            repo,
            component: component.to_string(),
            library,
            labels,
            template_language,
            line_count: 1 + newline_count(&code),
            parenthesis_count: code.matches('(').count(),
            length: code.chars().count(),
            repo_last_updated,
            usage_example: UsageExample {
                github_url,
                line_number: line_start,
                code: code.clone(),
                path: path.clone(),
            },
            code,
            path,
        })
    }
}

/// Split a search-relative path such as `./repo/app/views/x.scala.html`
/// into the repository name and the path within it
pub fn split_repo_path(path: &str) -> FinderResult<(String, String)> {
    let relative = path.trim_start_matches("./");

    match relative.split_once('/') {
        Some((repo, rest)) if !repo.is_empty() && repo != ".." && !rest.is_empty() => {
            Ok((repo.to_string(), rest.to_string()))
        }
        _ => Err(FinderError::malformed(format!(
            "expected <repository>/<path>, got `{}`",
            path
        ))),
    }
}
