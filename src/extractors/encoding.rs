// src/extractors/encoding.rs
use encoding_rs::{Decoder, Encoding, SHIFT_JIS, UTF_8};
use std::io::{self, BufRead, Read};

use crate::utils::error::ExtractError;

/// Picks the encoding for delimited text: an explicit label wins, otherwise
/// the sample is sniffed.
pub fn resolve_encoding(label: Option<&str>, sample: &[u8]) -> Result<&'static Encoding, ExtractError> {
    match label {
        Some(label) => Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| ExtractError::UnsupportedEncoding(label.to_string())),
        None => Ok(detect_encoding(sample)),
    }
}

/// BOM first, then UTF-8 validity; anything else is taken as Shift_JIS,
/// the usual encoding of Japanese CSV exports.
pub fn detect_encoding(sample: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(sample) {
        return encoding;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => UTF_8,
        // Sample cut in the middle of a multi-byte sequence
        Err(e) if e.error_len().is_none() => UTF_8,
        Err(_) => SHIFT_JIS,
    }
}

/// `Read` adapter that transcodes any encoding to UTF-8 one buffer at a
/// time, so large files never have to be held in memory whole.
pub struct DecodingReader<R> {
    inner: R,
    decoder: Decoder,
    pending: Vec<u8>,
    pos: usize,
    eof: bool,
    had_errors: bool,
}

impl<R: BufRead> DecodingReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            decoder: encoding.new_decoder(),
            pending: Vec::new(),
            pos: 0,
            eof: false,
            had_errors: false,
        }
    }

    /// True once any malformed sequence was replaced with U+FFFD.
    pub fn had_errors(&self) -> bool {
        self.had_errors
    }
}

impl<R: BufRead> Read for DecodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.pending.len() {
                let n = buf.len().min(self.pending.len() - self.pos);
                buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.eof {
                return Ok(0);
            }

            let src = self.inner.fill_buf()?;
            let last = src.is_empty();
            let capacity = self
                .decoder
                .max_utf8_buffer_length(src.len())
                .unwrap_or(src.len() * 3 + 16);
            self.pending.clear();
            self.pending.resize(capacity, 0);
            self.pos = 0;

            let (_, read, written, had_errors) = self.decoder.decode_to_utf8(src, &mut self.pending, last);
            self.pending.truncate(written);
            self.had_errors |= had_errors;
            self.inner.consume(read);
            if last {
                self.eof = true;
            }
        }
    }
}
