//! PCRE2 expressions for each usage style
//!
//! These are consumed by `rg --pcre2 --multiline`. Parameter lists are
//! matched with a recursive group that tolerates nested parentheses but does
//! not truly balance them, so both missed usages and false positives are
//! possible.

/// Optional qualifier before a component name, e.g. `uk.gov.hmrc.govukfrontend.views.html.components.`
pub const OPTIONAL_PACKAGE: &str =
    r"(?:[\w\.]*(?:govuk|hmrc)frontend[\w\.]*|components.|helpers.)?";

/// A parenthesised parameter list.
///
/// `group` is the number of the capture group this expression is placed in,
/// which the expression recurses into for nested parentheses.
pub fn any_params(group: usize) -> String {
    format!(r"\((?:[^)(]*(?{group})?)*+\)")
}

/// Component name accepting either case for its first letter
pub fn class_name(component: &str) -> String {
    let mut chars = component.chars();
    match chars.next() {
        Some(first) => format!(
            "[{}{}]{}",
            first.to_lowercase(),
            first.to_uppercase(),
            chars.as_str()
        ),
        None => String::new(),
    }
}

/// Captures the alias a component is injected as, e.g. `button` in `button: GovukButton,`
pub fn injection(component: &str) -> String {
    format!(
        r"\w+(?=\s*:\s*{OPTIONAL_PACKAGE}{}[,\s\)])",
        class_name(component)
    )
}

/// `new GovukButton()(Button(...))`
pub fn instantiation_used_immediately(component: &str) -> String {
    format!(
        r"new\s*{OPTIONAL_PACKAGE}{}({})({})",
        class_name(component),
        any_params(1),
        any_params(2)
    )
}

/// `someHelper(new GovukButton(), ...)`
pub fn instantiation_used_as_argument(component: &str) -> String {
    format!(
        r"(?<=[^@][\({{,])\s*new\s*{OPTIONAL_PACKAGE}{}({})(?=[^\(])",
        class_name(component),
        any_params(1)
    )
}

/// Captures the variable in `@button = @{ new GovukButton() }`
pub fn instantiation_assigned(component: &str) -> String {
    format!(
        r"(?<=@)\w+(?=\s+=\s+@{{\s*new\s+{OPTIONAL_PACKAGE}{}({})[^/(])",
        class_name(component),
        any_params(1)
    )
}

/// A call of `name` that is not itself an instantiation
pub fn usage_not_instantiation(name: &str) -> String {
    format!(r"(?<!\w)(?<!new )(?<!new  ){name}({})", any_params(1))
}

/// Lines that rebind the component name locally, inline or by injection.
///
/// Files matching neither can only be reaching the component through the
/// deprecated global helper.
pub fn local_rebinding(component: &str) -> [String; 2] {
    [format!(r"{component}\s+="), format!(r"{component} *:")]
}

/// A call of the global helper; may also match `new X(...)`, which callers discard
pub fn static_helper_call(component: &str) -> String {
    format!(r"(new)? *{OPTIONAL_PACKAGE}{component}({})", any_params(2))
}

/// `govukButton({ ... })` in a Nunjucks template
pub fn templating_call(component: &str) -> String {
    format!(r"{component}({})", any_params(1))
}
