//! Output sinks for the usage stream
//!
//! Each sink consumes the stream to completion and returns the number of
//! usages written. The first error in the stream aborts the sink.

use std::path::Path;

use anyhow::{Context, Result};
use futures::StreamExt;
use rusqlite::{Connection, params};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info};
use usage_finder_core::{UsageRecord, UsageStream};

/// Records inserted per SQLite transaction
pub const SQLITE_BATCH_SIZE: usize = 100;

/// Compact JSON, no spaces after separators
pub fn as_json_line(usage: &UsageRecord) -> Result<String> {
    serde_json::to_string(usage).context("Failed to serialize usage")
}

/// Write one JSON line per usage, optionally flushing after each line
pub async fn write_json_lines<W>(mut usages: UsageStream, mut writer: W, flush_each: bool) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(usage) = usages.next().await {
        let line = as_json_line(&usage?)?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        if flush_each {
            writer.flush().await?;
        }
        written += 1;
    }
    writer.flush().await?;
    Ok(written)
}

pub async fn output_to_stdout(usages: UsageStream) -> Result<usize> {
    write_json_lines(usages, tokio::io::stdout(), true).await
}

pub async fn output_to_file(usages: UsageStream, path: &Path) -> Result<usize> {
    let file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create output file {}", path.display()))?;

    write_json_lines(usages, BufWriter::new(file), false)
        .await
        .with_context(|| format!("Failed writing usages to {}", path.display()))
}

pub async fn output_to_sqlite(
    usages: UsageStream,
    database: &Path,
    table: &str,
    batch_size: usize,
) -> Result<usize> {
    let (database, table_name) = (database.to_path_buf(), table.to_string());
    let mut sink = tokio::task::spawn_blocking(move || SqliteSink::open(&database, &table_name))
        .await
        .context("SQLite open task failed")??;
    let mut batches = usages.chunks(batch_size);
    let mut written = 0;

    while let Some(batch) = batches.next().await {
        let batch = batch.into_iter().collect::<Result<Vec<_>, _>>()?;
        // rusqlite blocks, keep it off the runtime threads
        let (returned, inserted) = tokio::task::spawn_blocking(move || {
            let inserted = sink.insert_all(&batch);
            (sink, inserted)
        })
        .await
        .context("SQLite insert task failed")?;
        sink = returned;
        written += inserted?;
    }

    info!("Inserted {} usages into {}", written, table);
    Ok(written)
}

/// Table of usages, one column per record field
pub struct SqliteSink {
    conn: Connection,
    table: String,
}

impl SqliteSink {
    /// Open or create `database` and make sure `table` exists
    pub fn open(database: &Path, table: &str) -> Result<Self> {
        let conn = Connection::open(database)
            .with_context(|| format!("Failed to open database {}", database.display()))?;
        Self::with_connection(conn, table)
    }

    pub fn with_connection(conn: Connection, table: &str) -> Result<Self> {
        let sink = Self {
            conn,
            table: quote_identifier(table),
        };
        sink.init_schema()?;
        Ok(sink)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        repo TEXT NOT NULL,
                        component TEXT NOT NULL,
                        library TEXT NOT NULL,
                        labels TEXT NOT NULL,
                        template_language TEXT NOT NULL,
                        line_count INTEGER NOT NULL,
                        parenthesis_count INTEGER NOT NULL,
                        length INTEGER NOT NULL,
                        repo_last_updated TEXT NOT NULL,
                        usage_example TEXT NOT NULL,
                        code TEXT NOT NULL,
                        path TEXT NOT NULL
                    )",
                    self.table
                ),
                [],
            )
            .with_context(|| format!("Failed to create table {}", self.table))?;
        Ok(())
    }

    /// Insert a batch of usages in one transaction
    pub fn insert_all(&mut self, usages: &[UsageRecord]) -> Result<usize> {
        if usages.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "INSERT INTO {} (repo, component, library, labels, template_language, line_count, \
             parenthesis_count, length, repo_last_updated, usage_example, code, path) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            self.table
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for usage in usages {
                stmt.execute(params![
                    usage.repo,
                    usage.component,
                    usage.library.as_str(),
                    serde_json::to_string(&usage.labels)?,
                    usage.template_language.as_str(),
                    usage.line_count as i64,
                    usage.parenthesis_count as i64,
                    usage.length as i64,
                    usage.repo_last_updated,
                    serde_json::to_string(&usage.usage_example)?,
                    usage.code,
                    usage.path,
                ])?;
            }
        }
        tx.commit()?;

        debug!("Committed batch of {} usages", usages.len());
        Ok(usages.len())
    }

    #[cfg(test)]
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
