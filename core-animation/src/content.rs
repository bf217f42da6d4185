//! # Content Resolver
//!
//! Turns a byte buffer or a filesystem path into a bounded, decompressed
//! byte buffer ready for the decoder.
//!
//! Input may be gzip-framed. Decompression is attempted in one shot into a
//! fixed-size buffer; on any failure the original bytes are returned
//! verbatim. Callers cannot cheaply distinguish "not gzip" from "corrupt
//! gzip", so both degrade to "try the bytes as-is" and a real failure is
//! deferred to the decode step. Legacy uncompressed payloads pass through
//! this fallback transparently.

use bytes::Bytes;
use flate2::{Decompress, FlushDecompress, Status};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Maximum accepted content size in bytes.
///
/// Oversized input is rejected before any decode attempt, not truncated.
pub const MAX_FILE_SIZE: usize = 2 * 1024 * 1024;

/// Read a file's contents, but only if its reported size fits the ceiling.
///
/// Any failure (missing file, unreadable, oversized) yields an empty buffer,
/// which downstream treats as a parse failure rather than a crash.
fn read_file(path: &Path) -> Bytes {
    let Ok(file) = fs::File::open(path) else {
        return Bytes::new();
    };
    let Ok(metadata) = file.metadata() else {
        return Bytes::new();
    };
    if metadata.len() > MAX_FILE_SIZE as u64 {
        debug!(path = %path.display(), size = metadata.len(), "animation file exceeds size ceiling");
        return Bytes::new();
    }
    let mut buffer = Vec::with_capacity(metadata.len() as usize);
    let mut file = file;
    match file.read_to_end(&mut buffer) {
        Ok(_) => Bytes::from(buffer),
        Err(_) => Bytes::new(),
    }
}

/// Resolve raw content: non-empty `data` wins, otherwise read from `path`.
pub fn read_content(data: Bytes, path: Option<&Path>) -> Bytes {
    if !data.is_empty() {
        return data;
    }
    match path {
        Some(path) => read_file(path),
        None => Bytes::new(),
    }
}

/// Attempt streaming gzip inflate into a fixed `MAX_FILE_SIZE + 1` buffer.
///
/// Falls back to the original bytes verbatim when the header is invalid,
/// inflate errors, or the output fills the whole buffer without the stream
/// signaling end (output would exceed the ceiling).
pub fn unpack_gzip(content: &[u8]) -> Vec<u8> {
    let mut inflate = Decompress::new_gzip(15);
    let mut output = vec![0u8; MAX_FILE_SIZE + 1];
    match inflate.decompress(content, &mut output, FlushDecompress::Finish) {
        Ok(Status::StreamEnd) => {
            let written = inflate.total_out() as usize;
            if written > MAX_FILE_SIZE {
                return content.to_vec();
            }
            output.truncate(written);
            output
        }
        // Ok(Ok)/Ok(BufError): output exhausted or input truncated mid-stream.
        Ok(_) | Err(_) => content.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(payload: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn unpacks_valid_gzip() {
        let payload = br#"{"fr":30,"w":100,"h":100}"#;
        assert_eq!(unpack_gzip(&gzip(payload)), payload);
    }

    #[test]
    fn non_gzip_bytes_pass_through_unchanged() {
        let raw = b"definitely not a gzip stream";
        assert_eq!(unpack_gzip(raw), raw);
    }

    #[test]
    fn corrupt_gzip_falls_back_to_original() {
        let mut bytes = gzip(b"some payload worth compressing, repeated a few times");
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xff;
        bytes[mid + 1] ^= 0xff;
        assert_eq!(unpack_gzip(&bytes), bytes);
    }

    #[test]
    fn oversized_inflate_output_falls_back() {
        // Highly compressible input that inflates past the ceiling.
        let huge = vec![b'a'; MAX_FILE_SIZE + 2];
        let compressed = gzip(&huge);
        assert!(compressed.len() <= MAX_FILE_SIZE);
        assert_eq!(unpack_gzip(&compressed), compressed);
    }

    #[test]
    fn read_content_prefers_raw_data() {
        let data = Bytes::from_static(b"inline");
        let resolved = read_content(data.clone(), Some(Path::new("/nonexistent")));
        assert_eq!(resolved, data);
    }

    #[test]
    fn read_content_missing_file_is_empty() {
        let resolved = read_content(Bytes::new(), Some(Path::new("/nonexistent/animation.tgs")));
        assert!(resolved.is_empty());
    }

    #[test]
    fn read_content_empty_without_path() {
        assert!(read_content(Bytes::new(), None).is_empty());
    }
}
