//! Query encoding and best-effort link decoding

const HEX: &[u8; 16] = b"0123456789ABCDEF";

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~')
}

/// Encode free text into a form-safe token of at most `max_len` bytes.
///
/// Unreserved bytes pass through, spaces become `+`, everything else is
/// written as `%XX`. Characters are emitted whole: when the next character's
/// encoding would cross `max_len` the output stops there, so it never ends in
/// a partial escape or a partial multi-byte sequence.
pub fn encode(text: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(text.len().min(max_len));
    let mut piece = String::with_capacity(12);

    for ch in text.chars() {
        piece.clear();
        let mut utf8 = [0u8; 4];
        for &b in ch.encode_utf8(&mut utf8).as_bytes() {
            if is_unreserved(b) {
                piece.push(b as char);
            } else if b == b' ' {
                piece.push('+');
            } else {
                piece.push('%');
                piece.push(HEX[(b >> 4) as usize] as char);
                piece.push(HEX[(b & 0x0F) as usize] as char);
            }
        }

        if out.len() + piece.len() > max_len {
            break;
        }
        out.push_str(&piece);
    }

    out
}

/// Decode `+` and `%XX` escapes.
///
/// Malformed escapes are copied through literally. Byte sequences that do not
/// form valid UTF-8 after decoding are replaced rather than rejected.
pub fn decode(token: &str) -> String {
    let spaced = token.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}
