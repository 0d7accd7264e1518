use flate2::{Compression, write::GzEncoder};
use snafu::{Location, ResultExt, Snafu};
use std::io::Write;

/// Bodies at or below this size are always sent raw (1.4 KiB gzip floor).
pub const MIN_GZIP_LENGTH: usize = 1433;

/// Transform applied to a request body before it goes on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyEncoding {
    Raw,
    Gzip,
}

/// Decide whether a body of `body_len` bytes should be gzipped. Pure and
/// deterministic; compression requires the flag AND a body strictly larger
/// than [`MIN_GZIP_LENGTH`].
pub fn decide(body_len: usize, compression_enabled: bool) -> BodyEncoding {
    if compression_enabled && body_len > MIN_GZIP_LENGTH {
        BodyEncoding::Gzip
    } else {
        BodyEncoding::Raw
    }
}

/// Gzip a request body. The caller is responsible for declaring the encoding
/// in a `Content-Encoding` header; decompression on receive is the server's
/// concern.
pub fn compress_data(input: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(input).context(DataWritingSnafu)?;
    encoder.finish().context(DataWritingSnafu)
}

#[derive(Snafu, Debug)]
pub enum CompressionError {
    #[snafu(display("Failed to write data during compression"))]
    DataWriting {
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
}
