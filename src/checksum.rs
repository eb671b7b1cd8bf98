//! C3: Checksum Validator (§4.3).
//!
//! [`ValidatingReader`] is a pass-through reader that hashes every byte that
//! flows through it and compares the digest against the expected hex once
//! explicitly finalized. Cloning a `ValidatingReader` shares the same
//! underlying byte source and hash state (via `Rc<RefCell<_>>`) rather than
//! forking the stream, so the extractor can hand one clone to a decompressor
//! while keeping another clone around to drain whatever the decompressor
//! didn't consume — which is how trailing bytes after a valid tar stream
//! still end up hashed (§4.3's "critical" note).

use std::cell::RefCell;
use std::io::{self, Read};
use std::rc::Rc;

use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

use crate::types::Checksum;

#[derive(Error, Debug)]
pub enum ChecksumError {
    #[error("unsupported checksum algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("io error while validating checksum: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone)]
enum DigestState {
    Sha256(Box<Sha256>),
    Sha512(Box<Sha512>),
}

impl DigestState {
    fn update(&mut self, data: &[u8]) {
        match self {
            DigestState::Sha256(h) => h.update(data),
            DigestState::Sha512(h) => h.update(data),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            DigestState::Sha256(h) => hex::encode(h.finalize()),
            DigestState::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

struct Shared {
    reader: Box<dyn Read>,
    hasher: Option<DigestState>,
    expected_hex: String,
}

/// A cloneable handle onto a shared, hashing byte stream.
pub struct ValidatingReader(Rc<RefCell<Shared>>);

impl Clone for ValidatingReader {
    fn clone(&self) -> Self {
        ValidatingReader(Rc::clone(&self.0))
    }
}

impl Read for ValidatingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut shared = self.0.borrow_mut();
        let n = shared.reader.read(buf)?;
        if n > 0 {
            if let Some(hasher) = shared.hasher.as_mut() {
                hasher.update(&buf[..n]);
            }
        }
        Ok(n)
    }
}

impl ValidatingReader {
    /// Wrap `reader`, hashing with the algorithm named by `checksum`.
    /// `checksum: None` disables verification entirely (delivery proceeds
    /// without it, per §4.6 step 1).
    pub fn wrap(
        reader: Box<dyn Read>,
        checksum: Option<&Checksum>,
    ) -> Result<Self, ChecksumError> {
        let (hasher, expected_hex) = match checksum {
            None => (None, String::new()),
            Some(Checksum::Sha256(hex)) => (Some(DigestState::Sha256(Box::default())), hex.clone()),
            Some(Checksum::Sha512(hex)) => (Some(DigestState::Sha512(Box::default())), hex.clone()),
            Some(Checksum::Unknown { algorithm, .. }) => {
                return Err(ChecksumError::UnsupportedAlgorithm(algorithm.clone()));
            }
        };

        Ok(ValidatingReader(Rc::new(RefCell::new(Shared {
            reader,
            hasher,
            expected_hex,
        }))))
    }

    /// Drain any remaining bytes (so trailing garbage after a valid tar
    /// stream still gets hashed) and compare the finalized digest.
    pub fn drain_and_finalize(mut self) -> Result<(), ChecksumError> {
        io::copy(&mut self, &mut io::sink())?;
        self.finalize()
    }

    fn finalize(&self) -> Result<(), ChecksumError> {
        let shared = self.0.borrow();
        match &shared.hasher {
            None => Ok(()),
            Some(hasher) => {
                let actual = hasher.clone().finalize_hex();
                if actual.eq_ignore_ascii_case(&shared.expected_hex) {
                    Ok(())
                } else {
                    tracing::warn!(expected = %shared.expected_hex, actual, "checksum mismatch");
                    Err(ChecksumError::Mismatch {
                        expected: shared.expected_hex.clone(),
                        actual,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::Digest as _;

    fn sha256_hex(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    #[test]
    fn matching_checksum_passes() {
        let data = b"hello world".to_vec();
        let expected = sha256_hex(&data);
        let checksum = Checksum::Sha256(expected);
        let mut reader =
            ValidatingReader::wrap(Box::new(io::Cursor::new(data.clone())), Some(&checksum))
                .unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
        reader.drain_and_finalize().unwrap();
    }

    #[test]
    fn mismatched_checksum_fails() {
        let data = b"hello world".to_vec();
        let checksum = Checksum::Sha256("0".repeat(64));
        let mut reader =
            ValidatingReader::wrap(Box::new(io::Cursor::new(data)), Some(&checksum)).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        let err = reader.drain_and_finalize().unwrap_err();
        assert!(matches!(err, ChecksumError::Mismatch { .. }));
    }

    #[test]
    fn unsupported_algorithm_rejected_before_reading() {
        let checksum = Checksum::Unknown {
            algorithm: "md5".into(),
            hex: "abc".into(),
        };
        let err = ValidatingReader::wrap(Box::new(io::Cursor::new(vec![])), Some(&checksum))
            .err()
            .unwrap();
        assert!(matches!(err, ChecksumError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn trailing_bytes_after_partial_read_still_fail_checksum() {
        // Simulate the extractor only consuming a prefix via one clone,
        // then draining the rest via a second clone sharing state.
        let data = b"AAAABBBBCCCC".to_vec();
        let expected = sha256_hex(b"AAAABBBB"); // checksum of a prefix only
        let checksum = Checksum::Sha256(expected);
        let reader =
            ValidatingReader::wrap(Box::new(io::Cursor::new(data)), Some(&checksum)).unwrap();

        let mut consumer = reader.clone();
        let mut prefix = [0u8; 8];
        consumer.read_exact(&mut prefix).unwrap();
        drop(consumer);

        // Trailing bytes still flow through the shared hasher when drained.
        let err = reader.drain_and_finalize().unwrap_err();
        assert!(matches!(err, ChecksumError::Mismatch { .. }));
    }

    #[test]
    fn no_checksum_always_passes() {
        let mut reader =
            ValidatingReader::wrap(Box::new(io::Cursor::new(b"data".to_vec())), None).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        reader.drain_and_finalize().unwrap();
    }
}
