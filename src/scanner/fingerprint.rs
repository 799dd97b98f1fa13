//! Bounded-sample content fingerprints.
//!
//! # Overview
//!
//! A fingerprint is the MD5 digest of a file's first 512 bytes followed by
//! its last 512 bytes. Files of 512 bytes or less are digested whole. I/O per
//! file is constant regardless of size.
//!
//! # Limitation
//!
//! Two files of the same size whose first and last 512 bytes coincide but
//! whose middles differ produce the same fingerprint and are reported as
//! duplicates. Keep the sampling window as is; results depend on it.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use serde::{Serialize, Serializer};

use super::FileAccessError;

/// Bytes sampled from each end of a file.
pub const SAMPLE_SIZE: usize = 512;

/// 128-bit content fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Fingerprint of an in-memory sample buffer.
    #[must_use]
    pub fn of_bytes(sample: &[u8]) -> Self {
        Self(md5::compute(sample).0)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex encoding (32 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:x}", md5::Digest(self.0))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Compute the fingerprint of the file at `path`.
///
/// # Errors
///
/// Returns `FileAccessError` if the file cannot be opened, stat'd, or read.
///
/// # Example
///
/// ```no_run
/// use dupsafe::scanner::fingerprint;
/// use std::path::Path;
///
/// let fp = fingerprint(Path::new("photo.jpg")).unwrap();
/// assert_eq!(fp.to_hex().len(), 32);
/// ```
pub fn fingerprint(path: &Path) -> Result<Fingerprint, FileAccessError> {
    let wrap = |e: io::Error| FileAccessError::new(path, e);

    let mut file = File::open(path).map_err(wrap)?;
    let length = file.metadata().map_err(wrap)?.len();

    let mut sample = Vec::with_capacity(SAMPLE_SIZE * 2);
    (&mut file)
        .take(SAMPLE_SIZE as u64)
        .read_to_end(&mut sample)
        .map_err(wrap)?;

    if length > SAMPLE_SIZE as u64 {
        let mut tail = [0u8; SAMPLE_SIZE];
        file.seek(SeekFrom::Start(length - SAMPLE_SIZE as u64))
            .map_err(wrap)?;
        file.read_exact(&mut tail).map_err(wrap)?;
        sample.extend_from_slice(&tail);
    }

    let fp = Fingerprint::of_bytes(&sample);
    log::trace!("Fingerprint {} for {}", fp, path.display());
    Ok(fp)
}
