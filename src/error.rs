use std::fmt;
use std::io;

/// Failure taxonomy for the unpack pipeline.
///
/// Everything here is fatal except where the caller explicitly recovers:
/// `EncryptedEntry` triggers the single sanitize-and-retry in
/// [`crate::extract::read_entry_cleaning`]. A DEX with a wrong magic is not
/// an error at all, it is reported on [`crate::DexModule::valid`].
#[derive(Debug)]
pub enum UnpackError {
    /// The target entry is missing from the archive listing.
    EntryNotFound(String),

    /// The archive reader rejected the entry as flag-encrypted.
    EncryptedEntry(String),

    /// A length field is inconsistent with the buffer that holds it.
    MalformedPayload {
        /// Byte offset of the offending field.
        offset: usize,
        reason: String,
    },

    /// The encrypted region is smaller than the fixed ciphertext window.
    InsufficientData {
        needed: usize,
        have: usize,
    },

    /// The final block's padding is inconsistent, usually a wrong key/IV or
    /// corrupted input.
    PaddingError,

    /// Any other archive-level failure.
    Archive(zip::result::ZipError),

    Io(io::Error),
}

impl fmt::Display for UnpackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntryNotFound(name) => write!(f, "entry {} not found in archive", name),
            Self::EncryptedEntry(name) => {
                write!(f, "entry {} is flagged as encrypted", name)
            }
            Self::MalformedPayload { offset, reason } => {
                write!(f, "malformed payload at offset {}: {}", offset, reason)
            }
            Self::InsufficientData { needed, have } => {
                write!(
                    f,
                    "encrypted region too small: need {} bytes, have {}",
                    needed, have
                )
            }
            Self::PaddingError => write!(f, "block cipher padding is invalid"),
            Self::Archive(e) => write!(f, "archive error: {}", e),
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for UnpackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Archive(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for UnpackError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, UnpackError>;
