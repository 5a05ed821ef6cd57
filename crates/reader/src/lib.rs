// This software is licensed under a dual license model:
//
// GNU Affero General Public License v3 (AGPLv3): You may use, modify, and
// distribute this software under the terms of the AGPLv3.
//
// Elastic License v2 (ELv2): You may also use, modify, and distribute this
// software under the Elastic License v2, which has specific restrictions.
//
// We welcome any commercial collaboration or support. For inquiries
// regarding the licenses, please contact us at:
// vectorchord-inquiry@tensorchord.ai
//
// Copyright (c) 2025 TensorChord Inc.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported compression `{0}`")]
    UnsupportedCompression(String),
    #[error("failed to parse `{token}` as a number in record {record}")]
    Parse { record: usize, token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Zstd,
}

const UNSUPPORTED: &[&str] = &["xz", "lz4", "lzma", "zip", "7z"];

impl Compression {
    pub fn infer(path: &Path) -> Result<Self, Error> {
        let extension = path
            .extension()
            .and_then(|x| x.to_str())
            .unwrap_or_default();
        match extension {
            "gz" => Ok(Compression::Gzip),
            "bz2" => Ok(Compression::Bzip2),
            "zst" => Ok(Compression::Zstd),
            x if UNSUPPORTED.contains(&x) => Err(Error::UnsupportedCompression(x.to_string())),
            _ => Ok(Compression::None),
        }
    }

    fn program(self) -> Option<&'static str> {
        match self {
            Compression::None => None,
            Compression::Gzip => Some("gzip"),
            Compression::Bzip2 => Some("bzip2"),
            Compression::Zstd => Some("zstd"),
        }
    }
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "none" => Ok(Compression::None),
            "gzip" | "gz" => Ok(Compression::Gzip),
            "bzip2" | "bz2" => Ok(Compression::Bzip2),
            "zstd" | "zst" => Ok(Compression::Zstd),
            _ => Err(Error::UnsupportedCompression(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    Record,
    Eof,
    Error,
}

struct Source {
    reader: Box<dyn BufRead>,
    child: Option<Child>,
}

impl Drop for Source {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// A forward-only pass over delimited records of a possibly compressed file.
pub struct LineReader {
    path: PathBuf,
    compression: Compression,
    delimiter: u8,
    source: Option<Source>,
    buffer: Vec<u8>,
    state: ReadState,
    error: Option<std::io::Error>,
}

impl LineReader {
    pub fn open(path: impl AsRef<Path>, delimiter: u8) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let compression = Compression::infer(&path)?;
        Self::with_compression(path, delimiter, compression)
    }

    pub fn with_compression(
        path: impl AsRef<Path>,
        delimiter: u8,
        compression: Compression,
    ) -> Result<Self, Error> {
        let mut this = Self {
            path: path.as_ref().to_path_buf(),
            compression,
            delimiter,
            source: None,
            buffer: Vec::new(),
            state: ReadState::Eof,
            error: None,
        };
        this.rewind()?;
        Ok(this)
    }

    /// Reopens the file, so that the next `advance` yields the first record.
    pub fn rewind(&mut self) -> Result<(), Error> {
        self.source = None;
        let io = |source| Error::Io {
            path: self.path.clone(),
            source,
        };
        let source = match self.compression.program() {
            None => Source {
                reader: Box::new(BufReader::new(File::open(&self.path).map_err(io)?)),
                child: None,
            },
            Some(program) => {
                log::debug!("decompressing {} with {program}", self.path.display());
                let mut child = Command::new(program)
                    .arg("-dc")
                    .arg(&self.path)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .spawn()
                    .map_err(io)?;
                let stdout: Box<dyn Read> = match child.stdout.take() {
                    Some(stdout) => Box::new(stdout),
                    None => Box::new(std::io::empty()),
                };
                Source {
                    reader: Box::new(BufReader::new(stdout)),
                    child: Some(child),
                }
            }
        };
        self.source = Some(source);
        self.buffer.clear();
        self.state = ReadState::Eof;
        self.error = None;
        Ok(())
    }

    pub fn advance(&mut self) -> ReadState {
        self.buffer.clear();
        let Some(source) = self.source.as_mut() else {
            self.state = ReadState::Eof;
            return self.state;
        };
        self.state = match source.reader.read_until(self.delimiter, &mut self.buffer) {
            Ok(0) => ReadState::Eof,
            Ok(_) => {
                if self.buffer.last() == Some(&self.delimiter) {
                    self.buffer.pop();
                }
                ReadState::Record
            }
            Err(e) => {
                self.error = Some(e);
                ReadState::Error
            }
        };
        if self.state == ReadState::Eof {
            self.finish();
        }
        self.state
    }

    fn finish(&mut self) {
        if let Some(mut source) = self.source.take() {
            if let Some(mut child) = source.child.take() {
                match child.wait() {
                    Ok(status) if !status.success() => {
                        self.error = Some(std::io::Error::other(format!(
                            "decompressor exited with {status}"
                        )));
                        self.state = ReadState::Error;
                    }
                    Ok(_) => (),
                    Err(e) => {
                        self.error = Some(e);
                        self.state = ReadState::Error;
                    }
                }
            }
        }
    }

    pub fn state(&self) -> ReadState {
        self.state
    }

    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take().map(|source| Error::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }
}

/// Parses numbers separated by whitespace or commas.
pub fn parse_vector<T: FromStr>(record: usize, bytes: &[u8]) -> Result<Vec<T>, Error> {
    let text = String::from_utf8_lossy(bytes);
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<T>().map_err(|_| Error::Parse {
                record,
                token: token.to_string(),
            })
        })
        .collect()
}
