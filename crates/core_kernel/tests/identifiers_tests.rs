//! Unit tests for the identifiers module

use core_kernel::CustomerId;
use proptest::prelude::*;

#[test]
fn test_value_round_trip() {
    let id = CustomerId::new(1);
    assert_eq!(id.value(), 1);
}

#[test]
fn test_prefix() {
    assert_eq!(CustomerId::prefix(), "CUS");
}

#[test]
fn test_from_str_accepts_plain_and_prefixed() {
    assert_eq!("15".parse::<CustomerId>().unwrap(), CustomerId::new(15));
    assert_eq!("CUS-15".parse::<CustomerId>().unwrap(), CustomerId::new(15));
}

#[test]
fn test_from_str_rejects_garbage() {
    assert!("".parse::<CustomerId>().is_err());
    assert!("CUS-".parse::<CustomerId>().is_err());
    assert!("POL-15".parse::<CustomerId>().is_err());
}

#[test]
fn test_ordering_follows_sequence() {
    assert!(CustomerId::new(1) < CustomerId::new(2));
}

#[test]
fn test_serializes_as_bare_number() {
    let json = serde_json::to_string(&CustomerId::new(42)).unwrap();
    assert_eq!(json, "42");

    let parsed: CustomerId = serde_json::from_str("42").unwrap();
    assert_eq!(parsed, CustomerId::new(42));
}

proptest! {
    #[test]
    fn display_then_parse_is_identity(value in any::<i64>()) {
        let id = CustomerId::new(value);
        let parsed: CustomerId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }
}
