//! Phone normalization tests.

use wabridge::whatsapp::phone::normalize_phone;

#[test]
fn legacy_id_gains_ninth_digit() {
    assert_eq!(normalize_phone("556181178174"), "+5561981178174");
}

#[test]
fn nine_digit_id_only_gains_plus() {
    assert_eq!(normalize_phone("5561981178174"), "+5561981178174");
}

#[test]
fn normalization_is_idempotent_on_the_digits() {
    let once = normalize_phone("556181178174");
    let twice = normalize_phone(once.trim_start_matches('+'));
    assert_eq!(once, twice);
}

#[test]
fn empty_id_stays_empty() {
    assert_eq!(normalize_phone(""), "");
}

#[test]
fn short_ids_are_not_padded() {
    assert_eq!(normalize_phone("551"), "+551");
    assert_eq!(normalize_phone("5561"), "+55619");
}

#[test]
fn non_numeric_prefix_passes_through() {
    assert_eq!(normalize_phone("ab12345678"), "+ab12345678");
}
