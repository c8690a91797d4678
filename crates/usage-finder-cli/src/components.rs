//! Loading the list of components to search for

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Every GOV.UK and HMRC frontend component known at build time
pub const DEFAULT_COMPONENTS: &str = include_str!("../resources/components.txt");

/// One component per line, surrounding whitespace and blank lines ignored
pub fn parse_component_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn load_component_list(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read component list {}", path.display()))?;
    Ok(parse_component_list(&text))
}

/// A single named component wins over a list file, which wins over the
/// bundled default list
pub fn resolve_components(component: Option<&str>, list: Option<&Path>) -> Result<Vec<String>> {
    let components = match (component, list) {
        (Some(component), _) => parse_component_list(component),
        (None, Some(path)) => load_component_list(path)?,
        (None, None) => parse_component_list(DEFAULT_COMPONENTS),
    };

    if components.is_empty() {
        bail!("Component list empty, need the name of at least one component");
    }
    Ok(components)
}
