use super::*;

// -----------------------------------------------------------------------
// normalize_brand_name
// -----------------------------------------------------------------------

#[test]
fn trims_and_collapses_whitespace() {
    assert_eq!(
        normalize_brand_name("  Acne \n\t Studios  ").as_deref(),
        Some("Acne Studios")
    );
}

#[test]
fn preserves_display_case() {
    assert_eq!(normalize_brand_name("MCQUEEN").as_deref(), Some("MCQUEEN"));
    assert_eq!(normalize_brand_name("by Malene Birger").as_deref(), Some("by Malene Birger"));
}

#[test]
fn strips_trailing_counts_and_markers() {
    assert_eq!(normalize_brand_name("Ganni (12)").as_deref(), Some("Ganni"));
    assert_eq!(normalize_brand_name("Ganni [3]").as_deref(), Some("Ganni"));
    assert_eq!(normalize_brand_name("Toteme →").as_deref(), Some("Toteme"));
    assert_eq!(normalize_brand_name("Jacquemus *").as_deref(), Some("Jacquemus"));
    assert_eq!(normalize_brand_name("Khaite.").as_deref(), Some("Khaite"));
    assert_eq!(normalize_brand_name("Staud »").as_deref(), Some("Staud"));
}

#[test]
fn strips_emoji() {
    assert_eq!(normalize_brand_name("🔥 Nanushka 🔥").as_deref(), Some("Nanushka"));
}

#[test]
fn keeps_inner_punctuation_used_in_brand_names() {
    assert_eq!(
        normalize_brand_name("Dolce & Gabbana").as_deref(),
        Some("Dolce & Gabbana")
    );
    assert_eq!(normalize_brand_name("A.P.C.").as_deref(), Some("A.P.C"));
    assert_eq!(normalize_brand_name("Levi's").as_deref(), Some("Levi's"));
    assert_eq!(normalize_brand_name("Off-White").as_deref(), Some("Off-White"));
}

#[test]
fn keeps_non_ascii_letters() {
    assert_eq!(normalize_brand_name("Gülşen Şahin").as_deref(), Some("Gülşen Şahin"));
}

#[test]
fn drops_noise_words_and_phrases() {
    for noise in ["All", "brands", "SALE", "New Arrivals", "Shop by Brand", "Ana Sayfa", "Next"] {
        assert!(normalize_brand_name(noise).is_none(), "expected {noise:?} to be noise");
    }
}

#[test]
fn drops_letter_groups_and_digit_heavy_labels() {
    assert!(normalize_brand_name("A-Z").is_none());
    assert!(normalize_brand_name("C-Ç").is_none());
    assert!(normalize_brand_name("2025").is_none());
    assert!(normalize_brand_name("50 70").is_none());
}

#[test]
fn drops_too_short_and_too_long() {
    assert!(normalize_brand_name("X").is_none());
    assert!(normalize_brand_name(&"a".repeat(81)).is_none());
}

// -----------------------------------------------------------------------
// dedupe_brand_names
// -----------------------------------------------------------------------

#[test]
fn dedupe_is_case_and_whitespace_insensitive_and_keeps_first_spelling() {
    let names = dedupe_brand_names(["Ganni", "GANNI", "  ganni ", "Acne  Studios", "acne studios"]);
    assert_eq!(names, vec!["Ganni", "Acne Studios"]);
}

#[test]
fn dedupe_drops_noise_entries() {
    let names = dedupe_brand_names(["View all", "Toteme", "", "Sale"]);
    assert_eq!(names, vec!["Toteme"]);
}

#[test]
fn dedup_key_lowercases_and_collapses() {
    assert_eq!(dedup_key(" Acne   Studios "), "acne studios");
}

// -----------------------------------------------------------------------
// looks_like_navigation
// -----------------------------------------------------------------------

#[test]
fn navigation_labels() {
    assert!(looks_like_navigation("Shop now"));
    assert!(looks_like_navigation("View all brands"));
    assert!(looks_like_navigation("A-Z"));
    assert!(looks_like_navigation("7"));
    assert!(looks_like_navigation(""));
    assert!(!looks_like_navigation("Maison Margiela"));
}
