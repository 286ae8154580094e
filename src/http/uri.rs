//! Percent-decoding of request targets.
//!
//! `%XY` becomes the byte `0xXY`; every other byte is copied unchanged.
//! The decoded form is never longer than the input, which is what makes
//! [`decode_in_place`] possible.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A `%` was not followed by two more bytes.
    #[error("unexpected end of input after '%'")]
    UnexpectedEnd,
    /// One of the two bytes after a `%` is not a hexadecimal digit.
    #[error("hexadecimal digit expected, found {0:#04x}")]
    InvalidHexDigit(u8),
}

fn hex_value(digit: u8) -> Result<u8, DecodeError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        other => Err(DecodeError::InvalidHexDigit(other)),
    }
}

/// Decodes `source` and appends the result to `dest`.
///
/// On error `dest` may already contain the prefix that decoded successfully.
pub fn decode_into(source: &[u8], dest: &mut Vec<u8>) -> Result<(), DecodeError> {
    let mut bytes = source.iter().copied();
    while let Some(current) = bytes.next() {
        if current != b'%' {
            dest.push(current);
            continue;
        }

        let high = bytes.next().ok_or(DecodeError::UnexpectedEnd)?;
        let high = hex_value(high)?;
        let low = bytes.next().ok_or(DecodeError::UnexpectedEnd)?;
        let low = hex_value(low)?;
        dest.push(high * 16 + low);
    }
    Ok(())
}

/// Decodes `source` into a freshly allocated buffer.
pub fn decode(source: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoded = Vec::with_capacity(source.len());
    decode_into(source, &mut decoded)?;
    Ok(decoded)
}

/// Decodes `uri` in place and truncates it to the decoded length.
///
/// The write position never overtakes the read position, so every byte is
/// consumed before it can be overwritten. On error the buffer contents are
/// unspecified.
pub fn decode_in_place(uri: &mut Vec<u8>) -> Result<(), DecodeError> {
    let mut read = 0;
    let mut write = 0;

    while read < uri.len() {
        let current = uri[read];
        read += 1;
        if current == b'%' {
            let high = *uri.get(read).ok_or(DecodeError::UnexpectedEnd)?;
            let low = *uri.get(read + 1).ok_or(DecodeError::UnexpectedEnd)?;
            uri[write] = hex_value(high)? * 16 + hex_value(low)?;
            read += 2;
        } else {
            uri[write] = current;
        }
        write += 1;
    }

    uri.truncate(write);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_digits_are_case_insensitive() {
        assert_eq!(hex_value(b'a'), Ok(10));
        assert_eq!(hex_value(b'F'), Ok(15));
        assert_eq!(hex_value(b'g'), Err(DecodeError::InvalidHexDigit(b'g')));
    }
}
