//! Phone number normalization for Brazilian mobile numbers.
//!
//! Older WhatsApp ids omit the ninth mobile digit (`55 61 8117 8174`), newer
//! ones include it (`55 61 9 8117 8174`). Both are reconciled to the nine-digit
//! subscriber form.

/// Length of the country + area code prefix.
const PREFIX_LEN: usize = 4;

/// Digit that opens every nine-digit mobile subscriber number.
const MOBILE_DIGIT: u8 = b'9';

/// Normalize a raw WhatsApp id into a dialable `+`-prefixed address.
///
/// When the id does not already carry `9` right after the four-digit country
/// and area prefix, the digit is inserted there. Empty input stays empty.
/// Ids that do not start with four ASCII digits are passed through with only
/// the `+` prefix added.
pub fn normalize_phone(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let bytes = raw.as_bytes();
    let has_prefix = bytes.len() >= PREFIX_LEN && bytes[..PREFIX_LEN].iter().all(u8::is_ascii_digit);
    if !has_prefix || bytes.get(PREFIX_LEN) == Some(&MOBILE_DIGIT) {
        return format!("+{raw}");
    }

    let (prefix, subscriber) = raw.split_at(PREFIX_LEN);
    format!("+{prefix}9{subscriber}")
}
