use lambda_location::mutf8::{decode, encode};

// U+1F600 as the surrogate pair D83D DE00
const GRINNING_MUTF8: &[u8] = b"\xED\xA0\xBD\xED\xB8\x80";

#[test]
fn ascii_is_unchanged() {
    assert_eq!(decode(b"MainKt$onCreate$1.kt"), "MainKt$onCreate$1.kt");
    assert_eq!(encode("Main.kt"), b"Main.kt");
}

#[test]
fn nul_uses_two_byte_form() {
    assert_eq!(encode("a\0b"), b"a\xC0\x80b");
    assert_eq!(decode(b"a\xC0\x80b"), "a\0b");
}

#[test]
fn supplementary_characters_are_surrogate_pairs() {
    assert_eq!(encode("\u{1F600}"), GRINNING_MUTF8);
    assert_eq!(decode(GRINNING_MUTF8), "\u{1F600}");
    // standard four-byte UTF-8 is accepted too
    assert_eq!(decode("\u{1F600}".as_bytes()), "\u{1F600}");
}

#[test]
fn bmp_characters_match_utf8() {
    let s = "Gr\u{fc}\u{df}e \u{4e2d}\u{6587}.kt";
    assert_eq!(encode(s), s.as_bytes());
    assert_eq!(decode(s.as_bytes()), s);
}

#[test]
fn encoded_text_has_no_zero_bytes_and_decodes_back() {
    let s = "\0x\u{7ff}\u{800}\u{ffff}\u{10000}\u{10ffff}";
    let bytes = encode(s);
    assert!(!bytes.contains(&0));
    assert_eq!(decode(&bytes), s);
}

#[test]
fn malformed_input_becomes_replacement() {
    assert_eq!(decode(b"a\x80b"), "a\u{fffd}b");
    assert_eq!(decode(b"a\xC3"), "a\u{fffd}");
    assert_eq!(decode(b"\xE4\xB8"), "\u{fffd}\u{fffd}");
    // a high surrogate with no low half
    assert_eq!(decode(b"\xED\xA0\xBDx"), "\u{fffd}x");
    assert_eq!(decode(b"\xFF"), "\u{fffd}");
}
