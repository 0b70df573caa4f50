use domain::{AddressRegion, CacheEntry, PointValue, ScalarKind, TypedTag, ValueKind};

#[test]
fn region_parses_case_insensitive() {
    assert_eq!("d".parse::<AddressRegion>(), Ok(AddressRegion::D));
    assert_eq!(" Y ".parse::<AddressRegion>(), Ok(AddressRegion::Y));
    assert!("Q".parse::<AddressRegion>().is_err());
}

#[test]
fn value_kind_parses_wire_names() {
    assert_eq!("numberArray".parse::<ValueKind>(), Ok(ValueKind::NumberArray));
    assert_eq!("text".parse::<ValueKind>(), Ok(ValueKind::Text));
    assert_eq!("bool".parse::<ValueKind>(), Ok(ValueKind::Bool));
    assert!("int64".parse::<ValueKind>().is_err());
}

#[test]
fn failure_entry_keeps_expected_shape() {
    let entry = CacheEntry::failure("temp", ValueKind::NumberArray, "timeout", 1000);
    assert_eq!(entry.value, PointValue::Words(Vec::new()));
    assert_eq!(entry.error.as_deref(), Some("timeout"));

    let entry = CacheEntry::failure("flag", ValueKind::Bool, "timeout", 1000);
    assert_eq!(entry.value, PointValue::Bool(false));

    let entry = CacheEntry::failure("name", ValueKind::Text, "timeout", 1000);
    assert_eq!(entry.value, PointValue::Text(String::new()));
}

#[test]
fn tag_word_length_follows_scalar_kind() {
    assert_eq!(TypedTag::new("a", 0, ScalarKind::Int16).word_length, 1);
    assert_eq!(TypedTag::new("b", 1, ScalarKind::Int32).word_length, 2);
    assert_eq!(TypedTag::new("c", 3, ScalarKind::Real32).end(), 5);
    assert_eq!(TypedTag::bit("d", 0, 7).bit_position, Some(7));
}
