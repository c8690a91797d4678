//! Running a search command as a lazily read line stream

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use futures::{TryStreamExt, stream};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::debug;

use super::command::SearchCommand;
use crate::error::{FinderError, FinderResult};
use crate::lifecycle::{ProcessRegistry, TrackedProcess};
use crate::merge::BoxedStream;

/// Run `command` in `working_dir` and stream its standard output line by line.
///
/// The process is spawned on first poll. Reaching the end of output waits for
/// the process and turns an unaccepted exit status into an error.
pub fn run_lines(
    command: SearchCommand,
    working_dir: PathBuf,
    registry: Arc<ProcessRegistry>,
) -> BoxedStream<String> {
    Box::pin(
        stream::once(async move { RunningSearch::spawn(command, &working_dir, &registry) })
            .map_ok(RunningSearch::into_lines)
            .try_flatten(),
    )
}

// fields drop in order, so the group is signalled while the child is still unreaped
struct RunningSearch {
    tracked: TrackedProcess,
    command: SearchCommand,
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    writer: Option<JoinHandle<std::io::Result<()>>>,
}

impl RunningSearch {
    fn spawn(
        command: SearchCommand,
        working_dir: &Path,
        registry: &Arc<ProcessRegistry>,
    ) -> FinderResult<Self> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.get_args())
            .current_dir(working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .stdin(if command.input_files().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd
            .spawn()
            .map_err(|e| FinderError::spawn(command.program(), e))?;

        let pid = child
            .id()
            .ok_or_else(|| FinderError::spawn(command.program(), "exited before it could be tracked"))?;
        let tracked = registry.register(pid, command.describe());

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FinderError::spawn(command.program(), "standard output not captured"))?;

        // written from its own task so a full stdout pipe can't block the file list
        let writer = match (command.input_files(), child.stdin.take()) {
            (Some(files), Some(stdin)) => Some(tokio::spawn(write_file_list(stdin, files.to_vec()))),
            _ => None,
        };

        debug!("Spawned search {} in {}", pid, working_dir.display());

        Ok(Self {
            tracked,
            command,
            child,
            lines: BufReader::new(stdout).lines(),
            writer,
        })
    }

    fn into_lines(self) -> BoxedStream<String> {
        Box::pin(stream::try_unfold(self, |mut running| async move {
            match running.lines.next_line().await? {
                Some(line) => Ok::<_, FinderError>(Some((line, running))),
                None => {
                    running.finish().await?;
                    Ok(None)
                }
            }
        }))
    }

    async fn finish(&mut self) -> FinderResult<()> {
        let status = self.child.wait().await?;
        self.tracked.mark_exited();

        if !self.command.accepts(&status) {
            return Err(FinderError::process_failed(self.command.describe(), status));
        }

        if let Some(writer) = self.writer.take() {
            writer
                .await
                .map_err(|e| FinderError::Io(format!("file list writer failed: {}", e)))??;
        }

        debug!("Search {} finished with {}", self.tracked.pid(), status);
        Ok(())
    }
}

async fn write_file_list(mut stdin: ChildStdin, files: Vec<String>) -> std::io::Result<()> {
    let mut buffer = Vec::with_capacity(files.iter().map(|f| f.len() + 1).sum());
    for file in &files {
        buffer.extend_from_slice(file.as_bytes());
        buffer.push(0);
    }

    stdin.write_all(&buffer).await?;
    stdin.flush().await?;
    // dropping stdin closes the pipe so the reader sees EOF
    Ok(())
}
