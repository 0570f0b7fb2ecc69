// SPDX-License-Identifier: MIT

//! Incremental line reader shared by every harness adapter: tracks a byte
//! offset into a growing JSONL file and hands back only newly-complete
//! lines on each poll, resetting on truncation (the log file being
//! replaced rather than appended to).

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::AdapterError;

pub struct LineTailer {
    path: PathBuf,
    offset: u64,
}

impl LineTailer {
    pub fn new(path: PathBuf) -> Self {
        Self { path, offset: 0 }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns every complete (newline-terminated) line appended since the
    /// last call. A trailing partial line is left for the next poll. If the
    /// file has shrunk below the tracked offset, it is treated as replaced
    /// and read from the start.
    pub fn poll(&mut self) -> Result<Vec<String>, AdapterError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AdapterError::Io(self.path.clone(), e)),
        };
        let len = file.metadata().map_err(|e| AdapterError::Io(self.path.clone(), e))?.len();
        if len < self.offset {
            self.offset = 0;
        }
        file.seek(SeekFrom::Start(self.offset)).map_err(|e| AdapterError::Io(self.path.clone(), e))?;

        let mut reader = BufReader::new(file);
        let mut lines = Vec::new();
        loop {
            let mut buf = Vec::new();
            let bytes_read =
                reader.read_until(b'\n', &mut buf).map_err(|e| AdapterError::Io(self.path.clone(), e))?;
            if bytes_read == 0 {
                break;
            }
            if !buf.ends_with(b"\n") {
                break; // incomplete trailing line, revisit next poll
            }
            self.offset += bytes_read as u64;
            buf.pop();
            if let Ok(line) = String::from_utf8(buf) {
                if !line.trim().is_empty() {
                    lines.push(line);
                }
            }
        }
        Ok(lines)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "tailer_tests.rs"]
mod tests;
