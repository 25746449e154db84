//! Parsing of the packed `classes.dex` layout.
//!
//! Payload: [shell dex][hidden region][Shell Len (4, BE)]
//! Hidden region, once decrypted: [NameLen (1)][App Name][ [Size (4, BE)][DEX] ] * N

use crate::error::{Result, UnpackError};

fn read_be32(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Splits the payload into the decoy shell DEX and the hidden region, driven
/// by the big-endian length in the last 4 bytes.
pub fn parse_shell(payload: &[u8]) -> Result<(&[u8], &[u8])> {
    if payload.len() < 4 {
        return Err(UnpackError::MalformedPayload {
            offset: 0,
            reason: format!(
                "{} byte payload cannot hold a shell length trailer",
                payload.len()
            ),
        });
    }

    let trailer_at = payload.len() - 4;
    let shell_len = read_be32(payload, trailer_at) as usize;
    if shell_len > trailer_at {
        return Err(UnpackError::MalformedPayload {
            offset: trailer_at,
            reason: format!(
                "shell length {} exceeds the {} bytes before the trailer",
                shell_len, trailer_at
            ),
        });
    }

    Ok((&payload[..shell_len], &payload[shell_len..trailer_at]))
}

/// Walks the decrypted region: one length-prefixed application name, then
/// `(Size, DEX)` records until the remainder cannot hold a complete record.
/// Trailing bytes that do not form a record are a normal stop, not an error;
/// only a name overrunning the buffer is malformed.
pub fn parse_segments(decrypted: &[u8]) -> Result<(String, Vec<Vec<u8>>)> {
    if decrypted.is_empty() {
        return Err(UnpackError::MalformedPayload {
            offset: 0,
            reason: "decrypted region is empty, no name length byte".to_string(),
        });
    }

    let name_len = decrypted[0] as usize;
    if name_len > decrypted.len() - 1 {
        return Err(UnpackError::MalformedPayload {
            offset: 0,
            reason: format!(
                "application name of {} bytes overruns the {} byte buffer",
                name_len,
                decrypted.len()
            ),
        });
    }

    let app_name = std::str::from_utf8(&decrypted[1..1 + name_len])
        .map_err(|err| UnpackError::MalformedPayload {
            offset: 1 + err.valid_up_to(),
            reason: "application name is not valid UTF-8".to_string(),
        })?
        .to_string();

    let mut segments: Vec<Vec<u8>> = Vec::new();
    let mut index = 1 + name_len;

    while index + 4 <= decrypted.len() {
        let size = read_be32(decrypted, index) as usize;
        index += 4;

        if size > decrypted.len() - index {
            warn!(
                "dex #{} claims {} bytes with only {} remaining, stopping",
                segments.len() + 1,
                size,
                decrypted.len() - index
            );
            break;
        }

        segments.push(decrypted[index..index + size].to_vec());
        index += size;
    }

    Ok((app_name, segments))
}
