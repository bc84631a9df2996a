//! Modified UTF-8, the string encoding of JNI, JVMTI and class files.
//!
//! It differs from UTF-8 in two ways: NUL is written as `C0 80`, and
//! characters outside the Basic Multilingual Plane are written as a UTF-16
//! surrogate pair, each half encoded as three bytes.

const REPLACEMENT: u16 = 0xFFFD;

/// Decode modified UTF-8.
///
/// Standard four-byte UTF-8 sequences are accepted as well. Malformed
/// sequences and unpaired surrogates become U+FFFD.
pub fn decode(bytes: &[u8]) -> String {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let cont = |k: usize| bytes.get(i + k).copied().filter(|c| c & 0xC0 == 0x80).map(|c| u32::from(c & 0x3F));

        match b {
            0x00..=0x7F => {
                units.push(u16::from(b));
                i += 1;
            }
            0xC0..=0xDF => match cont(1) {
                Some(c1) => {
                    units.push(((u32::from(b & 0x1F) << 6) | c1) as u16);
                    i += 2;
                }
                None => {
                    units.push(REPLACEMENT);
                    i += 1;
                }
            },
            0xE0..=0xEF => match (cont(1), cont(2)) {
                (Some(c1), Some(c2)) => {
                    units.push(((u32::from(b & 0x0F) << 12) | (c1 << 6) | c2) as u16);
                    i += 3;
                }
                _ => {
                    units.push(REPLACEMENT);
                    i += 1;
                }
            },
            0xF0..=0xF7 => {
                let decoded = match (cont(1), cont(2), cont(3)) {
                    (Some(c1), Some(c2), Some(c3)) => {
                        char::from_u32((u32::from(b & 0x07) << 18) | (c1 << 12) | (c2 << 6) | c3)
                    }
                    _ => None,
                };
                match decoded {
                    Some(ch) => {
                        let mut buf = [0u16; 2];
                        units.extend_from_slice(ch.encode_utf16(&mut buf));
                        i += 4;
                    }
                    None => {
                        units.push(REPLACEMENT);
                        i += 1;
                    }
                }
            }
            _ => {
                units.push(REPLACEMENT);
                i += 1;
            }
        }
    }

    String::from_utf16_lossy(&units)
}

/// Encode `s` as modified UTF-8. The result never contains a zero byte.
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut buf = [0u16; 2];

    for ch in s.chars() {
        if ch != '\0' && ch.is_ascii() {
            out.push(ch as u8);
            continue;
        }
        for &unit in ch.encode_utf16(&mut buf).iter() {
            if unit < 0x800 {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            } else {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }

    out
}
