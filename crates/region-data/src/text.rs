//! Plain-text content files.
//!
//! Two shapes of text file live under an entity's localized directory:
//!
//! - prose files (`name.txt`, `quick_info.txt`, `overview.txt`), read whole;
//! - numbered block files (`text_0`, `text_1`, ...), each holding a header on
//!   line 1, an ignored divider on line 2 and the body on line 3.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// One `(header, body)` pair read from a numbered text file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentBlock {
    pub header: String,
    pub body: String,
}

// ===========================================================================
// Block reader
// ===========================================================================

/// Read a three-line text block from `reader`.
///
/// Lines missing at the end of the stream default to empty, so a file with
/// only a header is valid. Any other read failure is reported as
/// [`LoadError::Read`] against `label`.
pub fn read_text_block<R: BufRead>(mut reader: R, label: &Path) -> Result<ContentBlock, LoadError> {
    let header = read_line(&mut reader, label)?;
    // Line 2 is the divider.
    read_line(&mut reader, label)?;
    let body = read_line(&mut reader, label)?;

    Ok(ContentBlock { header, body })
}

fn read_line<R: BufRead>(reader: &mut R, label: &Path) -> Result<String, LoadError> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|source| LoadError::Read {
            file: label.to_path_buf(),
            source,
        })?;
    Ok(trim_line_ending(&line).to_string())
}

/// Strip exactly one trailing `\n` or `\r\n`.
pub(crate) fn trim_line_ending(s: &str) -> &str {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .unwrap_or(s)
}

/// Open and read the block file at `path`, or `Ok(None)` if there is none.
pub fn open_text_block(path: &Path) -> Result<Option<ContentBlock>, LoadError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LoadError::Read {
                file: path.to_path_buf(),
                source,
            });
        }
    };
    read_text_block(BufReader::new(file), path).map(Some)
}

// ===========================================================================
// Prose files
// ===========================================================================

/// Read a required localized prose file belonging to the entity at `entity`.
pub fn read_prose(file: &Path, entity: &Path) -> Result<String, LoadError> {
    match std::fs::read_to_string(file) {
        Ok(text) => Ok(trim_line_ending(&text).to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(LoadError::MissingContent {
            file: file.to_path_buf(),
            entity: entity.to_path_buf(),
        }),
        Err(source) => Err(LoadError::Read {
            file: file.to_path_buf(),
            source,
        }),
    }
}

// ===========================================================================
// Numbered blocks
// ===========================================================================

/// Lazy scan over `text_0`, `text_1`, ... in a localized directory.
///
/// Probes one index at a time and ends at the first missing index; a gap is
/// not an error. The scan ends after yielding an error as well. Cloning an
/// unstarted scan gives an independent restart point.
#[derive(Debug, Clone)]
pub struct NumberedBlocks {
    dir: PathBuf,
    next: usize,
    finished: bool,
}

impl NumberedBlocks {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            next: 0,
            finished: false,
        }
    }

    /// File name of the block at `index`.
    pub fn file_name(index: usize) -> String {
        format!("text_{index}")
    }
}

impl Iterator for NumberedBlocks {
    type Item = Result<ContentBlock, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let path = self.dir.join(Self::file_name(self.next));
        match open_text_block(&path) {
            Ok(Some(block)) => {
                self.next += 1;
                Some(Ok(block))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for NumberedBlocks {}

// ===========================================================================
// Tests
// ===========================================================================
