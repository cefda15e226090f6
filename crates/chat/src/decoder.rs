//! Stream-aware UTF-8 decoding
//!
//! Chunk boundaries may fall inside a multi-byte character. Incomplete
//! trailing bytes are held back until the next chunk; invalid sequences
//! become U+FFFD.

use std::borrow::Cow;

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `chunk` (plus held-back bytes) as forms complete characters
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::with_capacity(self.pending.len());

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Cow::Borrowed(text) = String::from_utf8_lossy(&self.pending[..valid]) {
                        out.push_str(text);
                    }
                    match e.error_len() {
                        Some(invalid) => {
                            out.push(REPLACEMENT);
                            self.pending.drain(..valid + invalid);
                        }
                        None => {
                            // Incomplete character at the end: wait for more bytes
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Bytes held back waiting for the rest of a character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// End of stream: an unfinished character becomes U+FFFD
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            REPLACEMENT.to_string()
        }
    }
}
