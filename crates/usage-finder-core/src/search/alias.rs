//! Grouping of first-phase matches by captured alias

use std::collections::{BTreeMap, BTreeSet};

use crate::types::RawMatch;

/// A locally bound alias and the files it is bound in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasGroup {
    pub alias: String,
    /// Sorted and deduplicated
    pub files: Vec<String>,
}

/// Group matches whose text is a captured alias. Groups come out sorted by
/// alias.
pub fn group_by_alias(matches: impl IntoIterator<Item = RawMatch>) -> Vec<AliasGroup> {
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for raw in matches {
        groups.entry(raw.text).or_default().insert(raw.path);
    }

    groups
        .into_iter()
        .map(|(alias, files)| AliasGroup {
            alias,
            files: files.into_iter().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(path: &str, alias: &str) -> RawMatch {
        RawMatch {
            path: path.to_string(),
            line_number: 1,
            text: alias.to_string(),
        }
    }

    #[test]
    fn test_group_by_alias() {
        let groups = group_by_alias(vec![
            raw("./b/views/Two.scala.html", "button"),
            raw("./a/views/One.scala.html", "button"),
            raw("./a/views/One.scala.html", "govukButton"),
            raw("./a/views/One.scala.html", "button"),
        ]);

        assert_eq!(
            groups,
            vec![
                AliasGroup {
                    alias: "button".to_string(),
                    files: vec![
                        "./a/views/One.scala.html".to_string(),
                        "./b/views/Two.scala.html".to_string(),
                    ],
                },
                AliasGroup {
                    alias: "govukButton".to_string(),
                    files: vec!["./a/views/One.scala.html".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_no_matches_no_groups() {
        assert!(group_by_alias(Vec::new()).is_empty());
    }
}
