use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_nothing_is_set() {
    let options = ImportOptions::from_lookup(lookup(&[])).unwrap();
    assert_eq!(options, ImportOptions::default());
    assert!(options.add_genealogy_tag);
    assert!(options.import_occupation);
    assert!(options.import_notes);
    assert!(options.color_by_gender);
    assert!(!options.create_sibling_links);
    assert!(options.auto_layout);
    assert_eq!(options.layout_direction, LayoutDirection::TopToBottom);
    assert_eq!(options.locale, Locale::En);
}

#[test]
fn every_key_is_read() {
    let options = ImportOptions::from_lookup(lookup(&[
        ("GENEALOGY_ADD_TAG", "false"),
        ("GENEALOGY_IMPORT_OCCUPATION", "0"),
        ("GENEALOGY_IMPORT_NOTES", "no"),
        ("GENEALOGY_COLOR_BY_GENDER", "off"),
        ("GENEALOGY_SIBLING_LINKS", "YES"),
        ("GENEALOGY_AUTO_LAYOUT", " false "),
        ("GENEALOGY_LAYOUT_DIRECTION", "bottom_to_top"),
        ("GENEALOGY_LOCALE", "FR"),
    ]))
    .unwrap();

    assert!(!options.add_genealogy_tag);
    assert!(!options.import_occupation);
    assert!(!options.import_notes);
    assert!(!options.color_by_gender);
    assert!(options.create_sibling_links);
    assert!(!options.auto_layout);
    assert_eq!(options.layout_direction, LayoutDirection::BottomToTop);
    assert_eq!(options.locale, Locale::Fr);
}

#[test]
fn invalid_boolean_is_an_error() {
    let err = ImportOptions::from_lookup(lookup(&[("GENEALOGY_SIBLING_LINKS", "maybe")])).unwrap_err();
    let ConfigError::InvalidValue { key, value } = err;
    assert_eq!(key, "GENEALOGY_SIBLING_LINKS");
    assert_eq!(value, "maybe");
}

#[test]
fn invalid_direction_and_locale_are_errors() {
    assert!(ImportOptions::from_lookup(lookup(&[("GENEALOGY_LAYOUT_DIRECTION", "sideways")])).is_err());
    assert!(ImportOptions::from_lookup(lookup(&[("GENEALOGY_LOCALE", "de")])).is_err());
}

#[test]
fn direction_and_locale_parsers() {
    assert_eq!(parse_direction("top-to-bottom").unwrap(), LayoutDirection::TopToBottom);
    assert_eq!(parse_direction("Bottom-To-Top").unwrap(), LayoutDirection::BottomToTop);
    assert_eq!(parse_locale(" en ").unwrap(), Locale::En);
    assert!(parse_locale("english").is_err());
}

#[test]
fn options_serialize_with_kebab_direction() {
    let json = serde_json::to_value(ImportOptions::default()).unwrap();
    assert_eq!(json["layout_direction"], "top-to-bottom");
    assert_eq!(json["locale"], "en");
}
