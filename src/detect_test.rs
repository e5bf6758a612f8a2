use super::*;

#[test]
fn gedcom_by_header() {
    assert_eq!(detect_by_content("0 HEAD\n1 GEDC\n0 TRLR\n"), Some(Format::Gedcom));
    assert_eq!(detect_by_content("\u{feff}0 HEAD\r\n"), Some(Format::Gedcom));
    assert_eq!(detect_by_content("\n\n   0 HEAD\n"), Some(Format::Gedcom));
}

#[test]
fn geneweb_by_leading_lines() {
    assert_eq!(detect_by_content("encoding: utf-8\n"), Some(Format::GeneWeb));
    assert_eq!(detect_by_content("gwplus\n\nfam A B + C D\n"), Some(Format::GeneWeb));
    assert_eq!(detect_by_content("\nfam DUPONT Jean + MARTIN Marie\n"), Some(Format::GeneWeb));
}

#[test]
fn fam_must_be_a_whole_keyword() {
    assert_eq!(detect_by_content("family history notes\n"), None);
}

#[test]
fn geneweb_sniff_is_bounded() {
    let mut text = "filler line\n".repeat(25);
    text.push_str("fam A B + C D\n");
    assert_eq!(detect_by_content(&text), None);
}

#[test]
fn extension_fallback() {
    assert_eq!(detect_by_name("tree.ged"), Some(Format::Gedcom));
    assert_eq!(detect_by_name("TREE.GED"), Some(Format::Gedcom));
    assert_eq!(detect_by_name("base.gw"), Some(Format::GeneWeb));
    assert_eq!(detect_by_name("notes.txt"), None);
    assert_eq!(detect_by_name("README"), None);
}

#[test]
fn content_wins_over_extension() {
    assert_eq!(detect("export.gw", "0 HEAD\n0 TRLR\n"), Some(Format::Gedcom));
    assert_eq!(detect("export.ged", "nothing recognizable"), Some(Format::Gedcom));
    assert_eq!(detect("export.txt", "nothing recognizable"), None);
}

#[test]
fn format_names() {
    assert_eq!(Format::Gedcom.name(), "GEDCOM");
    assert_eq!(Format::GeneWeb.name(), "GeneWeb");
}

#[test]
fn content_and_extension_agree_on_well_formed_files() {
    let samples = [
        ("family.ged", "0 HEAD\n1 GEDC\n2 VERS 5.5.1\n0 @I1@ INDI\n1 NAME Jean /Dupont/\n0 TRLR\n"),
        ("family.GED", "\u{feff}0 HEAD\r\n1 GEDC\r\n2 VERS 7.0\r\n0 TRLR\r\n"),
        ("base.gw", "encoding: utf-8\n\nfam DUPONT Jean + MARTIN Marie\nbeg\n- h Paul\nend\n"),
        ("base.gw", "gwplus\n\nfam DUPONT Jean 1920 MARTIN Marie 1922\n"),
        ("legacy.gw", "fam DUPONT Jean + MARTIN Marie\n"),
    ];
    for (name, text) in samples {
        let by_content = detect_by_content(text);
        assert!(by_content.is_some(), "{name} not recognized by content");
        assert_eq!(by_content, detect_by_name(name), "{name}");
    }
}
