use super::*;
use proptest::prelude::*;

#[test]
fn accepts_simple_alias() {
    assert!(Alias::new("foo").is_ok());
    assert!(Alias::new("Foo-bar_123").is_ok());
}

#[test]
fn rejects_empty() {
    assert_eq!(Alias::new(""), Err(AliasError::Empty));
}

#[test]
fn rejects_leading_digit() {
    assert_eq!(
        Alias::new("1abc"),
        Err(AliasError::InvalidCharacter { alias: "1abc".to_string(), at: 0 })
    );
}

#[test]
fn rejects_embedded_slash() {
    assert_eq!(
        Alias::new("foo/bar"),
        Err(AliasError::InvalidCharacter { alias: "foo/bar".to_string(), at: 3 })
    );
}

#[test]
fn display_roundtrips_as_str() {
    let alias = Alias::new("my-alias").unwrap();
    assert_eq!(alias.to_string(), "my-alias");
    assert_eq!(alias.as_str(), "my-alias");
}

proptest! {
    #[test]
    fn any_accepted_alias_matches_pattern(s in "[A-Za-z][A-Za-z0-9_-]{0,30}") {
        prop_assert!(Alias::new(s).is_ok());
    }

    #[test]
    fn strings_starting_with_digit_are_rejected(s in "[0-9][A-Za-z0-9_-]{0,10}") {
        prop_assert!(Alias::new(s).is_err());
    }
}
