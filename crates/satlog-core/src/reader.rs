//! Log file discovery and line streaming.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Default file name pattern for dedicated server logs.
pub const DEFAULT_LOG_PATTERN: &str = "FactoryGame*.log";

/// Buffer size for `BufReader` (64KB; server logs get large).
const BUFFER_SIZE: usize = 64 * 1024;

/// Finds files in `dir` matching `pattern`, sorted by path.
pub fn discover_log_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, Error> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = Path::new(&escaped_dir).join(pattern);

    let entries =
        glob::glob(&full_pattern.to_string_lossy()).map_err(|source| Error::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %e.path().display(), error = %e.error(), "skipping unreadable path");
                None
            }
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(Error::NoLogFilesFound {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }

    tracing::debug!(count = files.len(), dir = %dir.display(), "discovered log files");
    Ok(files)
}

/// The name a file is reported under (its file name, not the full path).
pub fn source_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// One line of a log file, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// 1-based.
    pub line_number: u64,
    pub text: String,
}

/// Streams lines from a reader, replacing invalid UTF-8 rather than failing.
#[derive(Debug)]
pub struct LogLines<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: u64,
}

impl<R: BufRead> LogLines<R> {
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for LogLines<R> {
    type Item = std::io::Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                let mut bytes = self.buf.as_slice();
                if let Some(rest) = bytes.strip_suffix(b"\n") {
                    bytes = rest;
                }
                if let Some(rest) = bytes.strip_suffix(b"\r") {
                    bytes = rest;
                }
                Some(Ok(LogLine {
                    line_number: self.line_number,
                    text: String::from_utf8_lossy(bytes).into_owned(),
                }))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Opens a log file for streaming.
pub fn open_log(path: &Path) -> Result<LogLines<BufReader<File>>, Error> {
    let file = File::open(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LogLines::new(BufReader::with_capacity(BUFFER_SIZE, file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    #[test]
    fn discovers_matching_files_in_sorted_order() {
        let temp = tempfile::tempdir().unwrap();
        for name in ["FactoryGame-backup-2.log", "FactoryGame.log", "other.log", "FactoryGame.txt"] {
            std::fs::write(temp.path().join(name), "").unwrap();
        }
        std::fs::create_dir(temp.path().join("FactoryGame-dir.log")).unwrap();

        let files = discover_log_files(temp.path(), DEFAULT_LOG_PATTERN).unwrap();
        let names: Vec<_> = files.iter().map(|p| source_name(p)).collect();
        assert_eq!(names, ["FactoryGame-backup-2.log", "FactoryGame.log"]);
    }

    #[test]
    fn empty_directory_is_no_log_files_found() {
        let temp = tempfile::tempdir().unwrap();
        let err = discover_log_files(temp.path(), DEFAULT_LOG_PATTERN).unwrap_err();
        assert!(matches!(err, Error::NoLogFilesFound { .. }));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let err = discover_log_files(temp.path(), "[").unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }

    #[test]
    fn lines_are_numbered_and_stripped() {
        let input = "first\r\nsecond\n\nlast";
        let lines: Vec<_> = LogLines::new(Cursor::new(input))
            .map(Result::unwrap)
            .collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].line_number, 2);
        assert_eq!(lines[2].text, "");
        assert_eq!(lines[3].text, "last");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let input: &[u8] = b"Join: Al\xffce\n";
        let line = LogLines::new(Cursor::new(input)).next().unwrap().unwrap();
        assert_eq!(line.text, "Join: Al\u{fffd}ce");
    }

    #[test]
    fn missing_file_is_a_file_read_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = open_log(&temp.path().join("FactoryGame.log")).unwrap_err();
        assert!(err.is_recoverable());
    }
}
