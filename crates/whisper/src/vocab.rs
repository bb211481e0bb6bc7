use {
    crate::error::{Result, WhisperError},
    std::{collections::HashMap, path::Path},
};

/// Byte-level BPE keeps these byte ranges as-is in token strings; everything
/// else (whitespace and control bytes) is shifted up past 256 so the
/// vocabulary file stays printable.
fn is_printable_byte(byte: u8) -> bool {
    (b'!'..=b'~').contains(&byte) || (0xA1..=0xAC).contains(&byte) || byte >= 0xAE
}

/// Inverse of the printable-alphabet shift: entry `n` is the original byte
/// for the vocabulary character with code point `256 + n`.
fn build_byte_shift() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut next = 0;
    for byte in 0..=255u8 {
        if !is_printable_byte(byte) {
            table[next] = byte;
            next += 1;
        }
    }
    table
}

/// Immutable id -> token-string table with the byte-shift table needed to
/// turn raw byte-level BPE strings back into bytes.
///
/// Built once at service initialization, read-only afterwards. Control and
/// special ids live above the base table and decode to nothing.
#[derive(Debug)]
pub struct Vocabulary {
    tokens: Vec<String>,
    byte_shift: [u8; 256],
}

impl Vocabulary {
    /// Load a vocabulary from a JSON object mapping token string -> id.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref()).map_err(|error| {
            WhisperError::Vocab(format!(
                "failed to read {}: {error}",
                path.as_ref().display()
            ))
        })?;
        let table: HashMap<String, u32> = serde_json::from_str(&data)?;
        if table.is_empty() {
            return Err(WhisperError::Vocab("vocabulary file is empty".to_string()));
        }
        Ok(Self::from_table(table))
    }

    pub fn from_table(table: HashMap<String, u32>) -> Self {
        let size = table
            .values()
            .max()
            .map(|&max_id| max_id as usize + 1)
            .unwrap_or(0);
        let mut tokens = vec![String::new(); size];
        for (token, id) in table {
            tokens[id as usize] = token;
        }
        Self {
            tokens,
            byte_shift: build_byte_shift(),
        }
    }

    /// Number of entries in the base token table.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Raw bytes of an ordinary token; `None` for control/special ids.
    ///
    /// Characters above code point 256 are mapped through the shift table to
    /// recover the whitespace/control byte they stand in for. The returned
    /// bytes may end mid-way through a multi-byte UTF-8 sequence; feed them
    /// to a [`TextAssembler`] to accumulate complete text.
    pub fn decode(&self, id: i64) -> Option<Vec<u8>> {
        if id < 0 {
            return None;
        }
        let raw = self.tokens.get(id as usize)?;
        if raw.is_empty() {
            return None;
        }
        let mut bytes = Vec::with_capacity(raw.len());
        for ch in raw.chars() {
            let point = ch as u32;
            if point < 256 {
                bytes.push(point as u8);
            } else if let Some(&byte) = self.byte_shift.get((point - 256) as usize) {
                bytes.push(byte);
            }
        }
        Some(bytes)
    }
}

/// Accumulates raw token bytes and flushes only complete UTF-8 sequences.
///
/// Multi-byte characters split across sub-word tokens stay pending until
/// their continuation bytes arrive, so the growing output is always valid
/// UTF-8 and never rewritten.
#[derive(Debug, Default)]
pub struct TextAssembler {
    pending: Vec<u8>,
}

impl TextAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append token bytes, pushing the longest valid UTF-8 prefix onto `out`.
    pub fn push(&mut self, bytes: &[u8], out: &mut String) {
        self.pending.extend_from_slice(bytes);
        let mut start = 0;
        loop {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(text) => {
                    out.push_str(text);
                    start = self.pending.len();
                    break;
                }
                Err(error) => {
                    let valid = error.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&self.pending[start..start + valid]) {
                        out.push_str(text);
                    }
                    start += valid;
                    match error.error_len() {
                        // Incomplete trailing sequence: wait for the next token.
                        None => break,
                        Some(len) => {
                            out.push('\u{FFFD}');
                            start += len;
                        }
                    }
                }
            }
        }
        self.pending.drain(..start);
    }

    /// Bytes still waiting for a continuation.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_table_inverts_bpe_alphabet() {
        let table = build_byte_shift();
        // 'Ġ' (U+0120) stands for space, 'Ċ' (U+010A) for newline.
        assert_eq!(table[0x120 - 256], b' ');
        assert_eq!(table[0x10A - 256], b'\n');
        assert_eq!(table[0], 0x00);
        // 68 bytes fall outside the printable alphabet.
        let shifted = (0u16..=255).filter(|&b| !is_printable_byte(b as u8)).count();
        assert_eq!(shifted, 68);
    }
}
