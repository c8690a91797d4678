//! Usage detection strategies
//!
//! Each strategy is one syntactic way a component can be used. A strategy
//! compiles a component name into a [`SearchPlan`] and contributes a fixed
//! set of labels to every usage it finds.

pub mod patterns;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::TemplateLanguage;

/// Label added to any usage whose code contains [`WITH_FORM_FIELD_FRAGMENT`]
pub const WITH_FORM_FIELD_LABEL: &str = "using-with-form-field-inline";

/// Legacy API call fragment detected in matched code
pub const WITH_FORM_FIELD_FRAGMENT: &str = ".withFormField";

/// One usage style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Injected into a template's constructor and used via its alias
    DependencyInjection,
    /// `new X()(params)`
    InlineImmediateUse,
    /// `helper(new X(), ...)`
    InlineAsArgument,
    /// `@x = @{ new X() }` followed by `@x(params)`
    InlineAssignedToVariable,
    /// Bare call of the global helper object
    DeprecatedStaticHelper,
    /// Call from a Nunjucks template
    TemplatingReference,
}

/// How a strategy searches for one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPlan {
    /// Search every template of one language and report matches directly
    Tree {
        pattern: String,
        language: TemplateLanguage,
    },
    /// Capture aliases across Twirl templates, then search only the files
    /// each alias was found in for calls of that alias
    AliasThenUsage { alias_pattern: String },
    /// Find Twirl templates with no local rebinding of the component, then
    /// search them for calls of the global helper that are not `new` instantiations
    UnboundThenCall {
        rebinding_patterns: Vec<String>,
        call_pattern: String,
    },
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::DependencyInjection,
        Strategy::InlineImmediateUse,
        Strategy::InlineAsArgument,
        Strategy::InlineAssignedToVariable,
        Strategy::DeprecatedStaticHelper,
        Strategy::TemplatingReference,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::DependencyInjection => "dependency-injection",
            Self::InlineImmediateUse => "inline-immediate-use",
            Self::InlineAsArgument => "inline-as-argument",
            Self::InlineAssignedToVariable => "inline-assigned-to-variable",
            Self::DeprecatedStaticHelper => "deprecated-static-helper",
            Self::TemplatingReference => "templating-reference",
        }
    }

    /// Labels contributed to every usage this strategy produces
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::DependencyInjection => &["via-dependency-injection"],
            Self::InlineImmediateUse => &["via-inline-instantiation", "used-immediately"],
            Self::InlineAsArgument => &["via-inline-instantiation", "used-as-argument"],
            Self::InlineAssignedToVariable => &["via-inline-instantiation", "used-as-variable"],
            Self::DeprecatedStaticHelper => &["via-deprecated-static-helper"],
            Self::TemplatingReference => &[],
        }
    }

    /// Compile the search for one component. Never executes anything.
    pub fn search_plan(&self, component: &str) -> SearchPlan {
        match self {
            Self::DependencyInjection => SearchPlan::AliasThenUsage {
                alias_pattern: patterns::injection(component),
            },
            Self::InlineImmediateUse => SearchPlan::Tree {
                pattern: patterns::instantiation_used_immediately(component),
                language: TemplateLanguage::Twirl,
            },
            Self::InlineAsArgument => SearchPlan::Tree {
                pattern: patterns::instantiation_used_as_argument(component),
                language: TemplateLanguage::Twirl,
            },
            Self::InlineAssignedToVariable => SearchPlan::AliasThenUsage {
                alias_pattern: patterns::instantiation_assigned(component),
            },
            Self::DeprecatedStaticHelper => SearchPlan::UnboundThenCall {
                rebinding_patterns: patterns::local_rebinding(component).to_vec(),
                call_pattern: patterns::static_helper_call(component),
            },
            Self::TemplatingReference => SearchPlan::Tree {
                pattern: patterns::templating_call(component),
                language: TemplateLanguage::Nunjucks,
            },
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_serialized_form() {
        for strategy in Strategy::ALL {
            let json = serde_json::to_string(&strategy).unwrap();
            assert_eq!(json, format!("\"{}\"", strategy.name()));
        }
    }

    #[test]
    fn test_inline_strategies_share_instantiation_label() {
        for strategy in [
            Strategy::InlineImmediateUse,
            Strategy::InlineAsArgument,
            Strategy::InlineAssignedToVariable,
        ] {
            assert_eq!(strategy.labels()[0], "via-inline-instantiation");
            assert_eq!(strategy.labels().len(), 2);
        }
        assert!(Strategy::TemplatingReference.labels().is_empty());
    }

    #[test]
    fn test_two_phase_strategies() {
        assert!(matches!(
            Strategy::DependencyInjection.search_plan("govukButton"),
            SearchPlan::AliasThenUsage { .. }
        ));
        assert!(matches!(
            Strategy::InlineAssignedToVariable.search_plan("govukButton"),
            SearchPlan::AliasThenUsage { .. }
        ));
        match Strategy::DeprecatedStaticHelper.search_plan("govukButton") {
            SearchPlan::UnboundThenCall {
                rebinding_patterns,
                call_pattern,
            } => {
                assert_eq!(rebinding_patterns.len(), 2);
                assert!(call_pattern.contains("govukButton"));
            }
            other => panic!("unexpected plan: {:?}", other),
        }
    }

    #[test]
    fn test_tree_strategies_target_one_language() {
        match Strategy::TemplatingReference.search_plan("govukButton") {
            SearchPlan::Tree { language, .. } => assert_eq!(language, TemplateLanguage::Nunjucks),
            other => panic!("unexpected plan: {:?}", other),
        }
        match Strategy::InlineAsArgument.search_plan("govukButton") {
            SearchPlan::Tree { language, .. } => assert_eq!(language, TemplateLanguage::Twirl),
            other => panic!("unexpected plan: {:?}", other),
        }
    }
}
