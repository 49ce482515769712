use std::borrow::Cow;
use std::fmt;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

use crate::error::{Error, Result};

/// One line of the log, located by byte offsets.
///
/// `end` is exclusive and points just past the line terminator, so it is the
/// start of the next line (or the file length for an unterminated last line).
/// The raw bytes never include the terminator. The timestamp is not stored;
/// ask a [`TimestampParser`](crate::TimestampParser) for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    start: u64,
    end: u64,
    raw: Vec<u8>,
}

impl LogLine {
    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.raw
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Resolves arbitrary byte offsets to the line that contains them.
///
/// The locator owns the stream and tracks its cursor. Reading a line leaves
/// the cursor right after it, so walking forward line by line never seeks.
/// The stream length is captured once at construction; bytes appended later
/// are not searched.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use tgrep::LineLocator;
///
/// let data = b"Feb 9 10:00:00 first\nFeb 9 10:00:01 second\n".to_vec();
/// let mut locator = LineLocator::new(Cursor::new(data), 8).unwrap();
///
/// // Any offset inside the second line (including its newline) finds it.
/// let line = locator.locate(30).unwrap();
/// assert_eq!(line.start(), 21);
/// assert_eq!(line.text(), "Feb 9 10:00:01 second");
///
/// let first = locator.prev_line(&line).unwrap().unwrap();
/// assert_eq!(first.start(), 0);
/// ```
pub struct LineLocator<R> {
    reader: BufReader<R>,
    len: u64,
    pos: u64,
    scan_chunk: usize,
    scratch: Vec<u8>,
}

impl<R: Read + Seek> LineLocator<R> {
    pub fn new(mut inner: R, scan_chunk: usize) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            reader: BufReader::new(inner),
            len,
            pos: 0,
            scan_chunk: scan_chunk.max(1),
            scratch: Vec::new(),
        })
    }

    /// Size of the stream in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Returns the line containing `offset`.
    ///
    /// Offsets at or past the end resolve to the last line. A newline byte
    /// at exactly `offset` terminates the line being located; it is never
    /// mistaken for the end of the previous line.
    pub fn locate(&mut self, offset: u64) -> Result<LogLine> {
        if self.len == 0 {
            return Err(Error::Searching("log file is empty".into()));
        }
        let offset = offset.min(self.len - 1);
        let start = self.find_line_start(offset)?;
        self.read_line_at(start)?
            .ok_or_else(|| Error::Searching(format!("no line at offset {start}")))
    }

    /// Reads the line beginning at `start`, which must be a line start.
    /// Returns `None` at end of stream.
    pub fn read_line_at(&mut self, start: u64) -> Result<Option<LogLine>> {
        if start >= self.len {
            return Ok(None);
        }
        self.seek_to(start)?;
        let mut raw = Vec::new();
        let read = self.reader.read_until(b'\n', &mut raw)?;
        self.pos = start + read as u64;
        if raw.last() == Some(&b'\n') {
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
        }
        Ok(Some(LogLine {
            start,
            end: self.pos,
            raw,
        }))
    }

    pub fn next_line(&mut self, line: &LogLine) -> Result<Option<LogLine>> {
        self.read_line_at(line.end)
    }

    pub fn prev_line(&mut self, line: &LogLine) -> Result<Option<LogLine>> {
        if line.start == 0 {
            return Ok(None);
        }
        self.locate(line.start - 1).map(Some)
    }

    pub fn first_line(&mut self) -> Result<LogLine> {
        self.locate(0)
    }

    pub fn last_line(&mut self) -> Result<LogLine> {
        self.locate(self.len)
    }

    /// Scans the bytes before `offset` backwards, one chunk at a time, for
    /// the newline ending the previous line.
    fn find_line_start(&mut self, offset: u64) -> Result<u64> {
        let mut end = offset;
        while end > 0 {
            let chunk_start = end.saturating_sub(self.scan_chunk as u64);
            let len = (end - chunk_start) as usize;
            self.seek_to(chunk_start)?;
            self.scratch.resize(len, 0);
            self.reader.read_exact(&mut self.scratch[..len])?;
            self.pos = end;
            if let Some(idx) = self.scratch[..len].iter().rposition(|&b| b == b'\n') {
                return Ok(chunk_start + idx as u64 + 1);
            }
            end = chunk_start;
        }
        Ok(0)
    }

    fn seek_to(&mut self, offset: u64) -> Result<()> {
        if offset != self.pos {
            // Relative seeks keep the read buffer when the target is inside it.
            self.reader.seek_relative(offset as i64 - self.pos as i64)?;
            self.pos = offset;
        }
        Ok(())
    }
}
