//! Backing storage for the log, task list and ledger files.
//!
//! Callers pick the capability explicitly: open a file by path, or hand over
//! a readable stream. A path-backed store tracks the file's modification time
//! so staleness can be detected; a stream is read once into memory and any
//! later writes go to that in-memory copy.

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Result, StoreError};

/// Where a store reads its content from.
pub enum Source {
    /// A file on disk. A missing file reads as empty.
    Path(PathBuf),
    /// A readable stream, consumed once when the store is opened.
    Stream(Box<dyn Read>),
}

impl Source {
    /// Convenience constructor for path-backed sources.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Convenience constructor for in-memory text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Stream(Box::new(io::Cursor::new(text.into().into_bytes())))
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// An opened source.
#[derive(Debug)]
pub(crate) enum Backing {
    File { path: PathBuf },
    Memory { text: String },
}

impl Backing {
    pub(crate) fn open(source: Source) -> Result<Self> {
        match source {
            Source::Path(path) => Ok(Self::File { path }),
            Source::Stream(mut reader) => {
                let mut text = String::new();
                reader
                    .read_to_string(&mut text)
                    .map_err(StoreError::Stream)?;
                Ok(Self::Memory { text })
            }
        }
    }

    /// Path of the backing file, if any.
    pub(crate) fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path } => Some(path),
            Self::Memory { .. } => None,
        }
    }

    /// Current modification time. `None` for streams and missing files.
    pub(crate) fn mtime(&self) -> Option<SystemTime> {
        self.path()
            .and_then(|p| fs::metadata(p).ok())
            .and_then(|m| m.modified().ok())
    }

    /// Reads the whole content. A missing file reads as empty.
    pub(crate) fn read(&self) -> Result<String> {
        match self {
            Self::File { path } => match fs::read_to_string(path) {
                Ok(text) => Ok(text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
                Err(source) => Err(StoreError::Read {
                    path: path.clone(),
                    source,
                }),
            },
            Self::Memory { text } => Ok(text.clone()),
        }
    }

    /// Appends raw text, creating the file if needed.
    pub(crate) fn append(&mut self, chunk: &str) -> Result<()> {
        match self {
            Self::File { path } => {
                let write_err = |source| StoreError::Write {
                    path: path.clone(),
                    source,
                };
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&*path)
                    .map_err(write_err)?;
                file.write_all(chunk.as_bytes()).map_err(write_err)
            }
            Self::Memory { text } => {
                text.push_str(chunk);
                Ok(())
            }
        }
    }

    /// Replaces the whole content.
    pub(crate) fn rewrite(&mut self, content: &str) -> Result<()> {
        match self {
            Self::File { path } => fs::write(&*path, content).map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            }),
            Self::Memory { text } => {
                content.clone_into(text);
                Ok(())
            }
        }
    }
}
