//! ripgrep invocations and decoding of its JSON output

use serde::Deserialize;

use super::command::SearchCommand;
use crate::config::FinderConfig;
use crate::error::{FinderError, FinderResult};
use crate::types::{RawMatch, TemplateLanguage};
use crate::usage::newline_count;

/// Parameters shared by every ripgrep invocation
pub const COMMON_PARAMS: [&str; 4] = [
    "--no-pcre2-unicode",
    "--pcre2",
    "--multiline",
    "--only-matching",
];

/// ripgrep exits 1 when nothing matched
const RIPGREP_EXIT_CODES: [i32; 2] = [0, 1];

/// Shell used to run each xargs batch of ripgrep
const SHELL: &str = "sh";

/// Runs ripgrep as `$0` with the batch as arguments. "No match" becomes
/// success and any ripgrep error becomes 255, which makes xargs stop and
/// exit 124, so xargs only succeeds when every batch did.
const BATCH_SCRIPT: &str = r#""$0" "$@"; status=$?; [ "$status" -le 1 ] || exit 255"#;

/// Builds ripgrep command lines
#[derive(Debug, Clone)]
pub struct Ripgrep {
    program: String,
    xargs_program: String,
}

impl Ripgrep {
    pub fn new(program: impl Into<String>, xargs_program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            xargs_program: xargs_program.into(),
        }
    }

    pub fn from_config(config: &FinderConfig) -> Self {
        Self::new(&config.ripgrep_program, &config.xargs_program)
    }

    /// Search every template of `language` below the working directory
    pub fn search_tree(&self, pattern: &str, language: TemplateLanguage) -> SearchCommand {
        SearchCommand::new(&self.program)
            .args(COMMON_PARAMS)
            .args(["--json", "--regexp", pattern, "--glob", language.glob(), "."])
            .accept_exit_codes(&RIPGREP_EXIT_CODES)
    }

    /// List templates of `language` where none of `patterns` match
    pub fn files_without_match(&self, patterns: &[String], language: TemplateLanguage) -> SearchCommand {
        let mut command = SearchCommand::new(&self.program)
            .args(COMMON_PARAMS)
            .arg("--files-without-match");
        for pattern in patterns {
            command = command.args(["--regexp", pattern.as_str()]);
        }
        command
            .args(["--glob", language.glob(), "."])
            .accept_exit_codes(&RIPGREP_EXIT_CODES)
    }

    /// Search only `files`, which are fed to ripgrep through xargs
    pub fn search_files(&self, pattern: &str, files: Vec<String>) -> SearchCommand {
        SearchCommand::new(&self.xargs_program)
            .args(["-0", "--no-run-if-empty", SHELL, "-c", BATCH_SCRIPT])
            .arg(self.program.as_str())
            .args(COMMON_PARAMS)
            .args(["--json", "--regexp", pattern])
            .with_input_files(files)
    }
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MatchData {
    path: Data,
    lines: Option<Data>,
    line_number: Option<u64>,
    submatches: Vec<Submatch>,
}

#[derive(Debug, Deserialize)]
struct Submatch {
    #[serde(rename = "match")]
    matched: Data,
    /// Byte offset into `lines`
    #[serde(default)]
    start: usize,
}

/// ripgrep reports non UTF-8 content as base64 `bytes` instead of `text`
#[derive(Debug, Deserialize)]
struct Data {
    text: Option<String>,
}

/// Decode one line of `rg --json` output. Only `match` messages produce a
/// [`RawMatch`], every other message type is skipped. When a line holds
/// several matches only the first is kept.
pub fn parse_match(line: &str) -> FinderResult<Option<RawMatch>> {
    let Some(data) = decode(line)? else {
        return Ok(None);
    };
    let (path, line_number) = location(&data, line)?;

    let text = data
        .submatches
        .into_iter()
        .next()
        .and_then(|submatch| submatch.matched.text)
        .ok_or_else(|| FinderError::unparseable(format!("no UTF-8 submatch: {}", line)))?;

    Ok(Some(RawMatch {
        path,
        line_number,
        text,
    }))
}

/// Decode one line of `rg --json` output into one [`RawMatch`] per match.
///
/// ripgrep reports every match found in the same lines as one message, so
/// this is what a search capturing several names per line needs.
pub fn parse_submatches(line: &str) -> FinderResult<Vec<RawMatch>> {
    let Some(data) = decode(line)? else {
        return Ok(Vec::new());
    };
    let (path, line_number) = location(&data, line)?;
    let lines = data.lines.and_then(|lines| lines.text);

    data.submatches
        .into_iter()
        .map(|submatch| {
            let text = submatch
                .matched
                .text
                .ok_or_else(|| FinderError::unparseable(format!("no UTF-8 submatch: {}", line)))?;
            let preceding = match (&lines, submatch.start) {
                (_, 0) => "",
                (Some(lines), start) => lines.get(..start).ok_or_else(|| {
                    FinderError::unparseable(format!("submatch outside its lines: {}", line))
                })?,
                (None, _) => {
                    return Err(FinderError::unparseable(format!(
                        "lines are not UTF-8: {}",
                        line
                    )));
                }
            };

            Ok(RawMatch {
                path: path.clone(),
                line_number: line_number + newline_count(preceding) as u64,
                text,
            })
        })
        .collect()
}

fn decode(line: &str) -> FinderResult<Option<MatchData>> {
    let message: Message = serde_json::from_str(line)
        .map_err(|e| FinderError::unparseable(format!("{}: {}", e, line)))?;

    if message.kind != "match" {
        return Ok(None);
    }

    serde_json::from_value(message.data)
        .map(Some)
        .map_err(|e| FinderError::unparseable(format!("{}: {}", e, line)))
}

fn location(data: &MatchData, line: &str) -> FinderResult<(String, u64)> {
    let path = data
        .path
        .text
        .clone()
        .ok_or_else(|| FinderError::unparseable(format!("path is not UTF-8: {}", line)))?;
    let line_number = data
        .line_number
        .ok_or_else(|| FinderError::unparseable(format!("no line number: {}", line)))?;
    Ok((path, line_number))
}
