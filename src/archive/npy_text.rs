//! Decoding of text stored as a `.npy` entry
//!
//! Sidecar metadata is written by NumPy as a string array, which
//! `ndarray-npy` has no element type for. This decoder reads the `.npy`
//! header directly and accepts byte strings (`S`), unicode strings (`U`,
//! UTF-32) and raw `u1`/`i1` byte arrays.

const MAGIC: &[u8] = b"\x93NUMPY";

/// Why an entry could not be decoded as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextDecodeError {
    BadMagic,
    Truncated,
    MissingDescr,
    UnsupportedDescr(String),
    InvalidText(String),
}

impl std::fmt::Display for TextDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextDecodeError::BadMagic => write!(f, "not a .npy entry"),
            TextDecodeError::Truncated => write!(f, "truncated .npy entry"),
            TextDecodeError::MissingDescr => write!(f, "header has no descr"),
            TextDecodeError::UnsupportedDescr(d) => write!(f, "unsupported dtype {}", d),
            TextDecodeError::InvalidText(m) => write!(f, "invalid text: {}", m),
        }
    }
}

/// Split a `.npy` entry into its header dictionary and payload.
fn split_header(bytes: &[u8]) -> Result<(&str, &[u8]), TextDecodeError> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(TextDecodeError::BadMagic);
    }
    let major = bytes[6];
    let (header_len, start) = if major == 1 {
        (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10)
    } else {
        if bytes.len() < 12 {
            return Err(TextDecodeError::Truncated);
        }
        (
            u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
            12,
        )
    };
    let end = start + header_len;
    if bytes.len() < end {
        return Err(TextDecodeError::Truncated);
    }
    let header = std::str::from_utf8(&bytes[start..end])
        .map_err(|e| TextDecodeError::InvalidText(e.to_string()))?;
    Ok((header, &bytes[end..]))
}

/// Pull the quoted `descr` value out of a header dictionary.
fn descr(header: &str) -> Result<&str, TextDecodeError> {
    let at = header
        .find("'descr'")
        .or_else(|| header.find("\"descr\""))
        .ok_or(TextDecodeError::MissingDescr)?;
    let rest = &header[at + "'descr'".len()..];
    let rest = rest.trim_start().strip_prefix(':').ok_or(TextDecodeError::MissingDescr)?;
    let rest = rest.trim_start();
    let quote = rest.chars().next().ok_or(TextDecodeError::MissingDescr)?;
    if quote != '\'' && quote != '"' {
        return Err(TextDecodeError::MissingDescr);
    }
    let body = &rest[1..];
    let close = body.find(quote).ok_or(TextDecodeError::MissingDescr)?;
    Ok(&body[..close])
}

fn utf8(bytes: &[u8]) -> Result<String, TextDecodeError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| TextDecodeError::InvalidText(e.to_string()))
}

/// Decode a whole `.npy` entry into a string.
pub fn decode_text(bytes: &[u8]) -> Result<String, TextDecodeError> {
    let (header, payload) = split_header(bytes)?;
    let descr = descr(header)?;
    let (order, kind) = match descr.chars().next() {
        Some(c @ ('<' | '>' | '|' | '=')) => (c, &descr[1..]),
        _ => ('|', descr),
    };

    if kind == "u1" || kind == "i1" {
        return utf8(payload);
    }
    if let Some(width) = kind.strip_prefix('S') {
        width
            .parse::<usize>()
            .map_err(|_| TextDecodeError::UnsupportedDescr(descr.to_string()))?;
        let trimmed = match payload.iter().rposition(|&b| b != 0) {
            Some(last) => &payload[..=last],
            None => &[][..],
        };
        return utf8(trimmed);
    }
    if let Some(width) = kind.strip_prefix('U') {
        width
            .parse::<usize>()
            .map_err(|_| TextDecodeError::UnsupportedDescr(descr.to_string()))?;
        let mut text = String::new();
        for chunk in payload.chunks_exact(4) {
            let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
            let code = if order == '>' {
                u32::from_be_bytes(raw)
            } else {
                u32::from_le_bytes(raw)
            };
            if code == 0 {
                break;
            }
            let c = char::from_u32(code).ok_or_else(|| {
                TextDecodeError::InvalidText(format!("bad code point {:#x}", code))
            })?;
            text.push(c);
        }
        return Ok(text);
    }
    Err(TextDecodeError::UnsupportedDescr(descr.to_string()))
}

/// Encode a string as a 0-d byte-string `.npy` entry, as NumPy writes it.
pub fn encode_bytes_scalar(text: &str) -> Vec<u8> {
    let dict = format!(
        "{{'descr': '|S{}', 'fortran_order': False, 'shape': (), }}",
        text.len().max(1)
    );
    // Magic (6) + version (2) + length (2) + dict + newline, padded to 64.
    let unpadded = 10 + dict.len() + 1;
    let padding = (64 - unpadded % 64) % 64;
    let mut header = dict;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let mut out = Vec::with_capacity(10 + header.len() + text.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(text.as_bytes());
    if text.is_empty() {
        out.push(0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(descr: &str, payload: &[u8]) -> Vec<u8> {
        let header = format!(
            "{{'descr': '{}', 'fortran_order': False, 'shape': (), }}\n",
            descr
        );
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_byte_string_round_trip() {
        let json = r#"{"time": 1.5, "period": 500}"#;
        let bytes = encode_bytes_scalar(json);
        assert_eq!((bytes.len() - json.len()) % 64, 0);
        assert_eq!(decode_text(&bytes).unwrap(), json);
    }

    #[test]
    fn test_byte_string_trailing_nul_trimmed() {
        let bytes = entry("|S8", b"abc\0\0\0\0\0");
        assert_eq!(decode_text(&bytes).unwrap(), "abc");
    }

    #[test]
    fn test_unicode_string() {
        let mut payload = Vec::new();
        for c in "hé".chars() {
            payload.extend_from_slice(&(c as u32).to_le_bytes());
        }
        payload.extend_from_slice(&[0; 4]);
        let bytes = entry("<U3", &payload);
        assert_eq!(decode_text(&bytes).unwrap(), "hé");
    }

    #[test]
    fn test_raw_uint8_payload() {
        let bytes = entry("|u1", b"{}");
        assert_eq!(decode_text(&bytes).unwrap(), "{}");
    }

    #[test]
    fn test_rejects_numeric_dtype() {
        let bytes = entry("<f8", &[0; 8]);
        assert_eq!(
            decode_text(&bytes),
            Err(TextDecodeError::UnsupportedDescr("<f8".to_string()))
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(decode_text(b"PK\x03\x04"), Err(TextDecodeError::BadMagic));
    }
}
