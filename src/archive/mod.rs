//! C4: Archive Extractor (§4.4).
//!
//! Dispatch is magic-byte based: the first tar-block's worth of bytes is
//! peeked (without losing them) so we can tell gzip/xz/bzip2/plain-tar apart
//! from "not an archive at all" before committing to a decoder.

mod tar_extract;

use std::io::{self, Read};

use thiserror::Error;

pub use tar_extract::extract_tar;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("io error during extraction: {0}")]
    Io(#[from] io::Error),

    #[error("unsupported archive format")]
    UnsupportedArchiveError,

    #[error("failed to create directory '{path}': {source}")]
    ArchiveDirCreateError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to create file '{path}': {source}")]
    ArchiveFileCreateError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to create symlink '{path}' -> '{target}': {source}")]
    SymlinkExtractionError {
        path: String,
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("unsupported tar entry type at '{path}'")]
    UnsupportedEntryError { path: String },

    #[error("archive entry '{path}' would extract outside the target directory")]
    PathTraversal { path: String },
}

/// The format detected by sniffing the leading bytes of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Gzip,
    Xz,
    Bzip2,
    Tar,
    /// No recognized archive magic: treat the stream as a single plain file.
    Plain,
}

const SNIFF_LEN: usize = 512;

/// A reader that replays a fixed prefix it already consumed for sniffing,
/// then falls through to the wrapped reader for everything after.
pub struct Sniffed<R> {
    inner: R,
    prefix: Vec<u8>,
    pos: usize,
}

impl<R: Read> Read for Sniffed<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.prefix.len() {
            let n = buf.len().min(self.prefix.len() - self.pos);
            buf[..n].copy_from_slice(&self.prefix[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

impl<R: Clone> Clone for Sniffed<R> {
    fn clone(&self) -> Self {
        Sniffed {
            inner: self.inner.clone(),
            prefix: self.prefix.clone(),
            pos: self.pos,
        }
    }
}

impl<R> Sniffed<R> {
    /// Drop the buffered sniff prefix and return the wrapped reader,
    /// positioned wherever the shared underlying stream currently sits.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Peek up to one tar block's worth of bytes, identify the format, and
/// return a reader that will still yield those bytes on the first read.
pub fn sniff<R: Read>(mut reader: R) -> io::Result<(ArchiveFormat, Sniffed<R>)> {
    let mut prefix = vec![0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < prefix.len() {
        let n = reader.read(&mut prefix[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    prefix.truncate(filled);

    let format = detect_format(&prefix);
    Ok((
        format,
        Sniffed {
            inner: reader,
            prefix,
            pos: 0,
        },
    ))
}

fn detect_format(head: &[u8]) -> ArchiveFormat {
    if head.len() >= 2 && head[0] == 0x1f && head[1] == 0x8b {
        return ArchiveFormat::Gzip;
    }
    if head.len() >= 6 && head[..6] == [0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00] {
        return ArchiveFormat::Xz;
    }
    if head.len() >= 3 && head[..3] == [0x42, 0x5a, 0x68] {
        return ArchiveFormat::Bzip2;
    }
    if head.len() >= 263 && &head[257..262] == b"ustar" {
        return ArchiveFormat::Tar;
    }
    ArchiveFormat::Plain
}
