//! Pulls the packed payload entry out of the APK.

use std::io::{Cursor, Read};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Result, UnpackError};
use crate::zip_clean::remove_encryption_flag;

/// Reads one named entry from an in-memory archive.
pub fn read_entry(archive: &[u8], entry_name: &str) -> Result<Vec<u8>> {
    let mut zip = ZipArchive::new(Cursor::new(archive)).map_err(UnpackError::Archive)?;

    let mut entry = match zip.by_name(entry_name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(UnpackError::EntryNotFound(entry_name.to_string()))
        }
        Err(ZipError::UnsupportedArchive(msg)) if msg == ZipError::PASSWORD_REQUIRED => {
            return Err(UnpackError::EncryptedEntry(entry_name.to_string()))
        }
        Err(err) => return Err(UnpackError::Archive(err)),
    };

    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data)?;
    Ok(data)
}

/// [`read_entry`] with the packer's fake encryption handled: if the direct
/// read is rejected with [`UnpackError::EncryptedEntry`], the central
/// directory flags are cleared and the read is retried exactly once. A
/// second failure of any kind propagates.
///
/// With `force_clean` the flags are cleared up front and the direct attempt
/// is skipped.
pub fn read_entry_cleaning(archive: &[u8], entry_name: &str, force_clean: bool) -> Result<Vec<u8>> {
    if force_clean {
        debug!("clearing central directory flags before first read");
        return read_entry(&remove_encryption_flag(archive), entry_name);
    }

    match read_entry(archive, entry_name) {
        Err(UnpackError::EncryptedEntry(name)) => {
            info!(
                "{} is flagged as encrypted, clearing central directory flags and retrying",
                name
            );
            read_entry(&remove_encryption_flag(archive), entry_name)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            FileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    /// Flips the encryption bit back on, the way the packer ships its APKs.
    fn set_encryption_flags(archive: &mut [u8]) {
        let mut i = 0;
        while i + 10 <= archive.len() {
            if archive[i..i + 4] == [0x50, 0x4B, 0x01, 0x02] {
                archive[i + 8] |= 1;
            }
            i += 1;
        }
    }

    #[test]
    fn reads_entry_by_name() {
        let archive = build_zip(&[("classes.dex", b"payload"), ("resources.arsc", b"other")]);
        let data = read_entry(&archive, "classes.dex").unwrap();
        assert_eq!(data, b"payload");
    }

    #[test]
    fn missing_entry_is_not_found() {
        let archive = build_zip(&[("resources.arsc", b"other")]);
        match read_entry(&archive, "classes.dex") {
            Err(UnpackError::EntryNotFound(name)) => assert_eq!(name, "classes.dex"),
            other => panic!("expected EntryNotFound, got {:?}", other),
        }
    }

    #[test]
    fn flagged_entry_is_rejected_as_encrypted() {
        let mut archive = build_zip(&[("classes.dex", b"payload")]);
        set_encryption_flags(&mut archive);
        match read_entry(&archive, "classes.dex") {
            Err(UnpackError::EncryptedEntry(name)) => assert_eq!(name, "classes.dex"),
            other => panic!("expected EncryptedEntry, got {:?}", other),
        }
    }

    #[test]
    fn retry_recovers_flagged_entry() {
        let mut archive = build_zip(&[("classes.dex", b"payload")]);
        set_encryption_flags(&mut archive);
        let data = read_entry_cleaning(&archive, "classes.dex", false).unwrap();
        assert_eq!(data, b"payload");
    }

    #[test]
    fn force_clean_reads_flagged_entry_directly() {
        let mut archive = build_zip(&[("classes.dex", b"payload")]);
        set_encryption_flags(&mut archive);
        let data = read_entry_cleaning(&archive, "classes.dex", true).unwrap();
        assert_eq!(data, b"payload");
    }

    #[test]
    fn missing_entry_is_not_retried_into_success() {
        let mut archive = build_zip(&[("resources.arsc", b"other")]);
        set_encryption_flags(&mut archive);
        assert!(matches!(
            read_entry_cleaning(&archive, "classes.dex", false),
            Err(UnpackError::EntryNotFound(_))
        ));
    }
}
