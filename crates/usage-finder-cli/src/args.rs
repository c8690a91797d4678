//! CLI argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

/// Default table written to by `--output-sqlite`
pub const DEFAULT_SQLITE_TABLE: &str = "usages";

#[derive(Parser, Debug)]
#[command(name = "find-usages")]
#[command(
    about = "Search a folder full of repositories for usages of components in twirl and nunjucks templates and output as newline delimited json"
)]
#[command(version)]
pub struct Cli {
    /// Folder with repositories to search for usages within, checked out as immediate sub folders
    pub search_path: PathBuf,

    /// Limit search to usages of a single component, for example: govukButton
    #[arg(long, value_name = "NAME")]
    pub component: Option<String>,

    /// Newline delimited file with names of components to search for instead of the default list
    #[arg(long, value_name = "FILE", conflicts_with = "component")]
    pub components: Option<PathBuf>,

    /// Write output to this file rather than stdout
    #[arg(long, value_name = "FILE", conflicts_with = "output_sqlite")]
    pub output_file: Option<PathBuf>,

    /// Write output to a sqlite database rather than to stdout, created if it does not yet exist
    #[arg(long, value_name = "FILE")]
    pub output_sqlite: Option<PathBuf>,

    /// Table to insert usages into within the output database
    #[arg(long, value_name = "TABLE", default_value = DEFAULT_SQLITE_TABLE)]
    pub output_sqlite_table: String,

    /// Web host prefix used to build links to usages
    #[arg(long, value_name = "URL")]
    pub web_base_url: Option<String>,

    /// Enable verbose logging on stderr
    #[arg(long, short)]
    pub verbose: bool,
}

/// Where usages are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
    Sqlite { database: PathBuf, table: String },
}

impl Cli {
    pub fn output_target(&self) -> OutputTarget {
        if let Some(path) = &self.output_file {
            OutputTarget::File(path.clone())
        } else if let Some(database) = &self.output_sqlite {
            OutputTarget::Sqlite {
                database: database.clone(),
                table: self.output_sqlite_table.clone(),
            }
        } else {
            OutputTarget::Stdout
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["find-usages", "/repos"]).unwrap();
        assert_eq!(cli.search_path, PathBuf::from("/repos"));
        assert_eq!(cli.component, None);
        assert_eq!(cli.components, None);
        assert_eq!(cli.output_sqlite_table, "usages");
        assert!(!cli.verbose);
        assert_eq!(cli.output_target(), OutputTarget::Stdout);
    }

    #[test]
    fn test_sqlite_target() {
        let cli = Cli::try_parse_from([
            "find-usages",
            "/repos",
            "--component",
            "govukButton",
            "--output-sqlite",
            "usages.db",
            "--output-sqlite-table",
            "buttons",
        ])
        .unwrap();

        assert_eq!(cli.component.as_deref(), Some("govukButton"));
        assert_eq!(
            cli.output_target(),
            OutputTarget::Sqlite {
                database: PathBuf::from("usages.db"),
                table: "buttons".to_string(),
            }
        );
    }

    #[test]
    fn test_file_target() {
        let cli =
            Cli::try_parse_from(["find-usages", "/repos", "--output-file", "out.jsonl", "-v"]).unwrap();
        assert_eq!(cli.output_target(), OutputTarget::File(PathBuf::from("out.jsonl")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_conflicting_arguments_are_rejected() {
        assert!(Cli::try_parse_from([
            "find-usages",
            "/repos",
            "--output-file",
            "a",
            "--output-sqlite",
            "b"
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "find-usages",
            "/repos",
            "--component",
            "govukButton",
            "--components",
            "list.txt"
        ])
        .is_err());
    }

    #[test]
    fn test_search_path_is_required() {
        assert!(Cli::try_parse_from(["find-usages"]).is_err());
    }
}
