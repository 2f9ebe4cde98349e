//! Line splitting for git's progress stream.
//!
//! git redraws progress in place by ending updates with `\r` instead of `\n`,
//! so a plain `lines()` reader would only see the final state of each phase.
//! Both bytes terminate a line here.

use tokio::io::{AsyncRead, AsyncReadExt};

const CHUNK_SIZE: usize = 4096;

/// Incremental splitter that accepts arbitrary byte chunks.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buf: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completed, in order.
    ///
    /// Empty lines (including the gap in `\r\n`) are skipped. Invalid UTF-8
    /// is replaced rather than rejected.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' || byte == b'\r' {
                if !self.buf.is_empty() {
                    lines.push(String::from_utf8_lossy(&self.buf).into_owned());
                    self.buf.clear();
                }
            } else {
                self.buf.push(byte);
            }
        }
        lines
    }

    /// Return the unterminated remainder, if any.
    pub fn finish(self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.buf).into_owned())
        }
    }
}

/// Read `reader` to EOF, calling `on_line` for each line in stream order.
pub async fn read_lines<R, F>(mut reader: R, mut on_line: F) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut splitter = LineSplitter::new();
    let mut chunk = [0u8; CHUNK_SIZE];

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        for line in splitter.push(&chunk[..read]) {
            on_line(line);
        }
    }

    if let Some(rest) = splitter.finish() {
        on_line(rest);
    }
    Ok(())
}
