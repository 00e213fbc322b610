use super::*;

fn brief_spec_with_alias(raw: &str) -> BriefSpec {
    let mut map = Map::new();
    map.insert("alias".to_string(), Value::String(raw.to_string()));
    BriefSpec::new(map)
}

#[test]
fn alias_tail_strips_single_sigil_byte() {
    let spec = brief_spec_with_alias("*foo");
    assert_eq!(spec.alias_tail(), Some("foo"));
}

#[test]
fn alias_tail_missing_key_is_none() {
    let spec = BriefSpec::new(Map::new());
    assert_eq!(spec.alias_tail(), None);
}

#[test]
fn alias_tail_non_string_value_is_none() {
    let mut map = Map::new();
    map.insert("alias".to_string(), Value::Number(1.into()));
    assert_eq!(BriefSpec::new(map).alias_tail(), None);
}

#[test]
fn alias_tail_empty_string_is_none() {
    let spec = brief_spec_with_alias("");
    assert_eq!(spec.alias_tail(), None);
}

#[test]
fn operation_id_displays_as_string() {
    let id = OperationId::new("abc-123");
    assert_eq!(id.to_string(), "abc-123");
    assert_eq!(id.as_str(), "abc-123");
}
