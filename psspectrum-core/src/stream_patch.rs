// ============================================================================
// psspectrum-core/src/stream_patch.rs
// ============================================================================
//
// STREAM PATCHER: In-Place Edits of MPEG-2 Elementary Video Streams
//
// The platform multiplexer expects two things from the M2V the encoder
// produces: a user-data block ahead of the first group of pictures, and a
// sequence-end code as the final four bytes. This module provides both edits
// as stateless operations on a single file path.
//
// KEY COMPONENTS:
// - Start code constants
// - inject_metadata: Splice a user-data payload before the first GOP
// - ensure_sequence_end_code: Append the sequence-end code when missing
//
// Injection is not idempotent: every call inserts another
// payload. The end code check is convergent: after one successful call every
// further call is a no-op.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{CoreError, CoreResult};

// ============================================================================
// START CODES
// ============================================================================

/// Group-of-pictures start code.
pub const GOP_START_CODE: [u8; 4] = [0x00, 0x00, 0x01, 0xB8];

/// User-data start code.
pub const USER_DATA_START_CODE: [u8; 4] = [0x00, 0x00, 0x01, 0xB2];

/// Sequence-end code.
pub const SEQUENCE_END_CODE: [u8; 4] = [0x00, 0x00, 0x01, 0xB7];

const START_CODE_PREFIX: [u8; 3] = [0x00, 0x00, 0x01];

fn hex(code: &[u8]) -> String {
    code.iter().map(|b| format!("{b:02X}")).collect()
}

// ============================================================================
// METADATA INJECTION
// ============================================================================

/// Offset of the first group-of-pictures start code in `buffer`.
pub fn find_gop_start(buffer: &[u8]) -> Option<usize> {
    memchr::memmem::find(buffer, &GOP_START_CODE)
}

/// Builds `[user-data start code][comment bytes]`.
///
/// The comment is copied verbatim, so it must be ASCII and must not contain a
/// start code prefix or the stream would no longer parse.
pub fn user_data_payload(comment: &str) -> CoreResult<Vec<u8>> {
    if !comment.is_ascii() {
        return Err(CoreError::Validation(
            "metadata comment must be plain ASCII".to_string(),
        ));
    }
    if memchr::memmem::find(comment.as_bytes(), &START_CODE_PREFIX).is_some() {
        return Err(CoreError::Validation(
            "metadata comment must not contain a start code prefix".to_string(),
        ));
    }

    let mut payload = Vec::with_capacity(USER_DATA_START_CODE.len() + comment.len());
    payload.extend_from_slice(&USER_DATA_START_CODE);
    payload.extend_from_slice(comment.as_bytes());
    Ok(payload)
}

/// Returns `buffer` with `payload` spliced in immediately before the first
/// GOP start code, or `None` if the buffer has no GOP.
pub fn splice_before_first_gop(buffer: &[u8], payload: &[u8]) -> Option<Vec<u8>> {
    let insertion_point = find_gop_start(buffer)?;

    let mut patched = Vec::with_capacity(buffer.len() + payload.len());
    patched.extend_from_slice(&buffer[..insertion_point]);
    patched.extend_from_slice(payload);
    patched.extend_from_slice(&buffer[insertion_point..]);
    Some(patched)
}

/// Inserts a user-data block carrying `comment` before the first GOP of the
/// M2V at `path` and returns the number of bytes inserted.
///
/// The whole file is read and the patched buffer fully assembled before the
/// file is overwritten. When no GOP is found the file is left untouched.
pub fn inject_metadata(path: &Path, comment: &str) -> CoreResult<usize> {
    let payload = user_data_payload(comment)?;
    let content = fs::read(path).map_err(|e| CoreError::patch_io(path, e))?;

    let patched = splice_before_first_gop(&content, &payload).ok_or_else(|| {
        CoreError::MarkerNotFound {
            path: path.to_path_buf(),
        }
    })?;

    fs::write(path, &patched).map_err(|e| CoreError::patch_io(path, e))?;
    log::debug!(
        "Injected {} byte user-data block into {}",
        payload.len(),
        path.display()
    );
    Ok(payload.len())
}

// ============================================================================
// SEQUENCE END CODE
// ============================================================================

/// What [`ensure_sequence_end_code`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCodeStatus {
    /// The file already ended with the code; nothing was written.
    AlreadyPresent,
    /// The code was appended.
    Appended,
    /// The file was shorter than one start code, so the code was appended
    /// without looking at its contents.
    ForceAppended,
}

impl fmt::Display for EndCodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = hex(&SEQUENCE_END_CODE);
        match self {
            EndCodeStatus::AlreadyPresent => {
                write!(f, "Sequence end code already exists. No action needed.")
            }
            EndCodeStatus::Appended => write!(
                f,
                "Successfully appended sequence end code ({code}) to M2V file."
            ),
            EndCodeStatus::ForceAppended => write!(
                f,
                "File was too small. Force-appended sequence end code ({code})."
            ),
        }
    }
}

/// Makes sure the file at `path` ends with the sequence-end code.
///
/// Existing bytes are never rewritten; the code is added with a single
/// append so repeated calls converge.
pub fn ensure_sequence_end_code(path: &Path) -> CoreResult<EndCodeStatus> {
    let size = fs::metadata(path)
        .map_err(|e| CoreError::patch_io(path, e))?
        .len();

    let status = if size < SEQUENCE_END_CODE.len() as u64 {
        EndCodeStatus::ForceAppended
    } else {
        let mut file = File::open(path).map_err(|e| CoreError::patch_io(path, e))?;
        let mut tail = [0u8; 4];
        file.seek(SeekFrom::End(-(SEQUENCE_END_CODE.len() as i64)))
            .and_then(|_| file.read_exact(&mut tail))
            .map_err(|e| CoreError::patch_io(path, e))?;

        if tail == SEQUENCE_END_CODE {
            return Ok(EndCodeStatus::AlreadyPresent);
        }
        EndCodeStatus::Appended
    };

    OpenOptions::new()
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(&SEQUENCE_END_CODE))
        .map_err(|e| CoreError::patch_io(path, e))?;

    log::debug!("{} ({})", status, path.display());
    Ok(status)
}
