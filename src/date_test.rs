use super::*;

fn ymd(date: &GenealogyDate) -> (Option<u8>, Option<u8>, Option<i32>) {
    (date.day, date.month, date.year)
}

// =============================================================================
// MONTH NAMES
// =============================================================================

#[test]
fn month_names_in_both_locales() {
    assert_eq!(month_from_name("JAN"), Some(1));
    assert_eq!(month_from_name("dec"), Some(12));
    assert_eq!(month_from_name("Décembre"), Some(12));
    assert_eq!(month_from_name("fevrier"), Some(2));
    assert_eq!(month_from_name("août"), Some(8));
    assert_eq!(month_from_name("sept."), Some(9));
    assert_eq!(month_from_name("brumaire"), None);
}

// =============================================================================
// GEDCOM
// =============================================================================

#[test]
fn gedcom_exact_date() {
    let date = parse_gedcom_date("12 MAR 1920");
    assert_eq!(ymd(&date), (Some(12), Some(3), Some(1920)));
    assert_eq!(date.modifier, DateModifier::Exact);
    assert_eq!(date.raw, "12 MAR 1920");
}

#[test]
fn gedcom_partial_dates() {
    assert_eq!(ymd(&parse_gedcom_date("MAR 1920")), (None, Some(3), Some(1920)));
    assert_eq!(ymd(&parse_gedcom_date("1920")), (None, None, Some(1920)));
}

#[test]
fn gedcom_modifiers() {
    let cases = [
        ("ABT 1900", DateModifier::About),
        ("EST 1900", DateModifier::About),
        ("CAL 1900", DateModifier::About),
        ("BEF 1900", DateModifier::Before),
        ("AFT 1900", DateModifier::After),
    ];
    for (raw, modifier) in cases {
        let date = parse_gedcom_date(raw);
        assert_eq!(date.modifier, modifier, "{raw}");
        assert_eq!(date.year, Some(1900), "{raw}");
    }
}

#[test]
fn gedcom_ranges() {
    let between = parse_gedcom_date("BET 1900 AND 1910");
    assert_eq!(between.modifier, DateModifier::Between);
    assert_eq!(between.year, Some(1900));
    assert_eq!(between.end_year, Some(1910));

    let period = parse_gedcom_date("FROM 3 JAN 1920 TO 1930");
    assert_eq!(period.modifier, DateModifier::Between);
    assert_eq!(ymd(&period), (Some(3), Some(1), Some(1920)));
    assert_eq!(period.end_year, Some(1930));
}

#[test]
fn fallback_reads_french_and_loose_text() {
    let french = parse_gedcom_date("12 mars 1920");
    assert_eq!(ymd(&french), (Some(12), Some(3), Some(1920)));

    let vers = parse_gedcom_date("vers 1850");
    assert_eq!(vers.modifier, DateModifier::About);
    assert_eq!(vers.year, Some(1850));

    let dotted = parse_gedcom_date("Abt. 1900");
    assert_eq!(dotted.modifier, DateModifier::About);
    assert_eq!(dotted.year, Some(1900));

    let entre = parse_gedcom_date("entre 1900 et 1910");
    assert_eq!(entre.modifier, DateModifier::Between);
    assert_eq!(entre.end_year, Some(1910));
}

#[test]
fn unparsable_date_keeps_raw() {
    let date = parse_gedcom_date("unknown");
    assert!(!date.has_components());
    assert_eq!(date.raw, "unknown");
    assert_eq!(format_gedcom_date(&date), "unknown");
}

#[test]
fn modifiers_survive_format_and_reparse() {
    let full = |modifier, end_year| GenealogyDate {
        day: Some(12),
        month: Some(3),
        year: Some(1920),
        modifier,
        end_year,
        raw: String::new(),
    };
    let cases = [
        full(DateModifier::Exact, None),
        full(DateModifier::About, None),
        full(DateModifier::Before, None),
        full(DateModifier::After, None),
        full(DateModifier::Between, Some(1930)),
        GenealogyDate { day: None, month: None, ..full(DateModifier::About, None) },
        GenealogyDate { day: None, month: Some(7), ..full(DateModifier::Before, None) },
    ];
    for original in cases {
        let formatted = format_gedcom_date(&original);
        let reparsed = parse_gedcom_date(&formatted);
        assert_eq!(ymd(&reparsed), ymd(&original), "{formatted}");
        assert_eq!(reparsed.modifier, original.modifier, "{formatted}");
        assert_eq!(reparsed.end_year, original.end_year, "{formatted}");
    }
}

// =============================================================================
// GENEWEB
// =============================================================================

#[test]
fn geneweb_full_and_partial_dates() {
    let full = parse_geneweb_date("12/03/1920").unwrap();
    assert_eq!(ymd(&full), (Some(12), Some(3), Some(1920)));
    assert_eq!(full.modifier, DateModifier::Exact);

    let month_year = parse_geneweb_date("03/1920").unwrap();
    assert_eq!(ymd(&month_year), (None, Some(3), Some(1920)));
}

#[test]
fn geneweb_prefix_modifiers() {
    assert_eq!(parse_geneweb_date("~1920").unwrap().modifier, DateModifier::About);
    assert_eq!(parse_geneweb_date("?1920").unwrap().modifier, DateModifier::About);
    assert_eq!(parse_geneweb_date("<1920").unwrap().modifier, DateModifier::Before);
    assert_eq!(parse_geneweb_date(">1920").unwrap().modifier, DateModifier::After);

    let range = parse_geneweb_date("1900..1910").unwrap();
    assert_eq!(range.modifier, DateModifier::Between);
    assert_eq!(range.year, Some(1900));
    assert_eq!(range.end_year, Some(1910));
}

#[test]
fn geneweb_drops_out_of_range_components() {
    let date = parse_geneweb_date("32/13/1920").unwrap();
    assert_eq!(ymd(&date), (None, None, Some(1920)));
}

#[test]
fn geneweb_calendar_suffix_and_alternatives() {
    assert_eq!(parse_geneweb_date("1920J").unwrap().year, Some(1920));
    assert_eq!(parse_geneweb_date("1920|1921").unwrap().year, Some(1920));
}

#[test]
fn geneweb_rejects_non_dates() {
    assert_eq!(parse_geneweb_date("0"), None);
    assert_eq!(parse_geneweb_date("Jean"), None);
    assert_eq!(parse_geneweb_date("#bp"), None);
    assert_eq!(parse_geneweb_date(""), None);
    assert_eq!(parse_geneweb_date("1/2/3/4"), None);
}

// =============================================================================
// TIMESTAMPS
// =============================================================================

fn millis(year: i32, month: Month, day: u8) -> i64 {
    Date::from_calendar_date(year, month, day).unwrap().midnight().assume_utc().unix_timestamp() * 1000
}

#[test]
fn timestamps_default_missing_components() {
    let epoch = parse_gedcom_date("1 JAN 1970");
    assert_eq!(to_timestamp_millis(&epoch), Some(0));

    let year_only = parse_gedcom_date("2000");
    assert_eq!(to_timestamp_millis(&year_only), Some(946_684_800_000));

    let historic = parse_gedcom_date("12 MAR 1820");
    assert_eq!(to_timestamp_millis(&historic), Some(millis(1820, Month::March, 12)));
}

#[test]
fn impossible_day_falls_back_to_first_of_month() {
    let date = GenealogyDate { day: Some(31), month: Some(2), year: Some(1900), ..GenealogyDate::default() };
    assert_eq!(to_timestamp_millis(&date), Some(millis(1900, Month::February, 1)));
}

#[test]
fn timestamps_need_a_year() {
    assert_eq!(to_timestamp_millis(&GenealogyDate::raw_only("?")), None);
}

#[test]
fn end_timestamp_uses_range_end() {
    let range = parse_gedcom_date("BET 1900 AND 1910");
    assert_eq!(end_timestamp_millis(&range), Some(millis(1910, Month::January, 1)));

    let single = parse_gedcom_date("1900");
    assert_eq!(end_timestamp_millis(&single), to_timestamp_millis(&single));
}
