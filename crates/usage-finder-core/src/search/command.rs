//! Description of one external search invocation

use std::process::ExitStatus;

/// An external program to run, without any shell in between
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCommand {
    program: String,
    args: Vec<String>,
    accepted_exit_codes: Vec<i32>,
    input_files: Option<Vec<String>>,
}

impl SearchCommand {
    /// Create a command that only accepts exit code 0
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            accepted_exit_codes: vec![0],
            input_files: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Exit codes that count as success, e.g. ripgrep's 1 for "no match"
    pub fn accept_exit_codes(mut self, codes: &[i32]) -> Self {
        self.accepted_exit_codes = codes.to_vec();
        self
    }

    /// Files written NUL-separated to the process's standard input
    pub fn with_input_files(mut self, files: Vec<String>) -> Self {
        self.input_files = Some(files);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn input_files(&self) -> Option<&[String]> {
        self.input_files.as_deref()
    }

    /// Whether the process ended in a way that counts as success
    pub fn accepts(&self, status: &ExitStatus) -> bool {
        status
            .code()
            .is_some_and(|code| self.accepted_exit_codes.contains(&code))
    }

    /// Shell-like rendering for logs and error messages
    pub fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.is_empty() || part.contains(|c: char| c.is_whitespace() || c == '\'') {
                    format!("'{}'", part.replace('\'', r"'\''"))
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let command = SearchCommand::new("rg")
            .args(["--json", "--regexp"])
            .arg("foo")
            .accept_exit_codes(&[0, 1])
            .with_input_files(vec!["./repo/a.scala.html".to_string()]);

        assert_eq!(command.program(), "rg");
        assert_eq!(command.get_args(), ["--json", "--regexp", "foo"]);
        assert_eq!(command.input_files().unwrap().len(), 1);
    }

    #[test]
    fn test_describe_quotes_awkward_arguments() {
        let command = SearchCommand::new("rg").args(["--regexp", "a b", "it's", ""]);
        assert_eq!(command.describe(), r"rg --regexp 'a b' 'it'\''s' ''");
    }

    #[cfg(unix)]
    #[test]
    fn test_accepts() {
        use std::os::unix::process::ExitStatusExt;

        let command = SearchCommand::new("rg").accept_exit_codes(&[0, 1]);
        assert!(command.accepts(&ExitStatus::from_raw(0)));
        assert!(command.accepts(&ExitStatus::from_raw(1 << 8)));
        assert!(!command.accepts(&ExitStatus::from_raw(2 << 8)));
        // killed by SIGTERM, no exit code
        assert!(!command.accepts(&ExitStatus::from_raw(15)));
    }
}
