//! Shared value types

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FinderError, FinderResult};

/// Template language a usage was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateLanguage {
    /// Play framework Twirl templates (`.scala.html`)
    Twirl,
    /// Nunjucks templates (`.njk`)
    Nunjucks,
}

impl TemplateLanguage {
    /// Identify the language from a file path, anything not `.njk` is Twirl
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("njk") => Self::Nunjucks,
            _ => Self::Twirl,
        }
    }

    /// Glob restricting a tree search to this language's templates
    pub fn glob(&self) -> &'static str {
        match self {
            Self::Twirl => "**/*.scala.html",
            Self::Nunjucks => "**/*.njk",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twirl => "twirl",
            Self::Nunjucks => "nunjucks",
        }
    }
}

impl fmt::Display for TemplateLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component library a usage is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Library {
    AlphagovFrontend,
    HmrcFrontend,
    PlayFrontendGovuk,
    PlayFrontendHmrc,
}

impl Library {
    /// Identify the library from the template language and the component's
    /// first letter.
    ///
    /// This is a naming convention, not a real dependency lookup. A pair
    /// outside the table means the component list and the table disagree.
    pub fn identify(language: TemplateLanguage, component: &str) -> FinderResult<Self> {
        let first = component.chars().next().map(|c| c.to_ascii_lowercase());

        let library = match (language, first) {
            (TemplateLanguage::Nunjucks, Some('g' | 'f')) => Self::AlphagovFrontend,
            (TemplateLanguage::Nunjucks, Some('h' | 't')) => Self::HmrcFrontend,
            (TemplateLanguage::Twirl, Some('g')) => Self::PlayFrontendGovuk,
            (TemplateLanguage::Twirl, Some('h' | 't' | 'f')) => Self::PlayFrontendHmrc,
            _ => {
                return Err(FinderError::UnknownLibrary {
                    language: language.to_string(),
                    component: component.to_string(),
                });
            }
        };

        Ok(library)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlphagovFrontend => "alphagov-frontend",
            Self::HmrcFrontend => "hmrc-frontend",
            Self::PlayFrontendGovuk => "play-frontend-govuk",
            Self::PlayFrontendHmrc => "play-frontend-hmrc",
        }
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unparsed match reported by a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// Path relative to the search folder, first segment is the repository
    pub path: String,
    /// 1-based line the match starts on
    pub line_number: u64,
    /// Matched text, may span several lines
    pub text: String,
}
