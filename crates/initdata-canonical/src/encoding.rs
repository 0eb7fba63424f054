use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except ASCII alphanumerics and the RFC 3986 unreserved marks.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Decodes one form-encoded bundle value.
///
/// `+` becomes a space, then `%XX` escapes are resolved. Malformed escapes
/// are kept literally and invalid UTF-8 is replaced, so this never fails.
pub fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Percent-encodes a value for use on the bundle wire.
///
/// The output contains only unreserved characters and `%XX` escapes, so it
/// never collides with the `&`, `=` or `+` delimiters.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}
