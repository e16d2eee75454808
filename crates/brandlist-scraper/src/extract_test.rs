use super::*;

const BASE: &str = "https://shop.example.com/brands";

fn brands_of(html: &str) -> Vec<String> {
    GenericExtractor.extract(html, BASE, 1).brands
}

// -----------------------------------------------------------------------
// Brand links
// -----------------------------------------------------------------------

#[test]
fn extracts_brand_links_from_main_in_document_order() {
    let html = r#"
        <html><body>
          <header><a href="/brands">Brands</a><a href="/sale">Sale</a></header>
          <main>
            <ul>
              <li><a href="/brands/ganni">Ganni (12)</a></li>
              <li><a href="/brands/acne-studios">Acne Studios</a></li>
              <li><a href="/brands/toteme">Toteme</a></li>
              <li><a href="/brands/ganni">GANNI</a></li>
            </ul>
          </main>
          <footer><a href="/brands/footer-label">Footer Label</a></footer>
        </body></html>
    "#;
    assert_eq!(brands_of(html), vec!["Ganni", "Acne Studios", "Toteme"]);
}

#[test]
fn nested_container_markup_is_scoped_to_its_closing_tag() {
    let html = r#"
        <div id="MainContent">
          <div class="grid">
            <a href="/brands/ganni">Ganni</a>
            <a href="/brands/toteme">Toteme</a>
          </div>
          <a href="/brands/khaite">Khaite</a>
        </div>
        <div class="recs"><a href="/brands/outside-brand">Outside Brand</a></div>
    "#;
    assert_eq!(brands_of(html), vec!["Ganni", "Toteme", "Khaite"]);
}

#[test]
fn sparse_main_falls_back_to_whole_page() {
    let html = r#"
        <main><a href="/brands/ganni">Ganni</a></main>
        <nav>
          <a href="/designers/toteme">Toteme</a>
          <a href="/designers/khaite">Khaite</a>
        </nav>
    "#;
    assert_eq!(brands_of(html), vec!["Ganni", "Toteme", "Khaite"]);
}

#[test]
fn navigation_text_falls_back_to_url_slug() {
    let html = r#"
        <a href="/designers/maison-margiela">Shop now</a>
        <a href="/b/acne%20studios"></a>
    "#;
    assert_eq!(brands_of(html), vec!["maison margiela", "acne studios"]);
}

#[test]
fn filter_links_with_query_strings_are_ignored() {
    let html = r#"<a href="/brands/ganni?color=red">View all</a>"#;
    assert!(brands_of(html).is_empty());
}

#[test]
fn noise_labels_are_dropped() {
    let html = r#"
        <a href="/brands/all">All</a>
        <a href="/brands/sale">SALE</a>
        <a href="/brands/new-arrivals">New Arrivals</a>
        <a href="/brands/staud">Staud</a>
    "#;
    assert_eq!(brands_of(html), vec!["Staud"]);
}

#[test]
fn brand_class_and_data_attribute_markers_are_collected() {
    let html = r#"
        <div class="product"><span class="brand-name">Khaite</span></div>
        <div class="tile" data-brand="Staud"></div>
        <a class="designer-name" href="/p/123">Nanushka</a>
    "#;
    assert_eq!(brands_of(html), vec!["Khaite", "Staud", "Nanushka"]);
}

#[test]
fn entities_are_decoded() {
    let html = r#"
        <a href="/brands/dolce-gabbana">Dolce &amp; Gabbana</a>
        <a href="/brands/levis">Levi&#39;s</a>
        <a href="/brands/by-malene-birger">By&nbsp;Malene&#x20;Birger</a>
    "#;
    assert_eq!(
        brands_of(html),
        vec!["Dolce & Gabbana", "Levi's", "By Malene Birger"]
    );
}

#[test]
fn page_without_brand_markup_is_empty_not_an_error() {
    let page = GenericExtractor.extract("<html><body><p>Nothing to see</p></body></html>", BASE, 4);
    assert!(page.brands.is_empty());
    assert_eq!(page.next_url, None);
    assert_eq!(page.page_number, 4);
}

// -----------------------------------------------------------------------
// Next-page link
// -----------------------------------------------------------------------

#[test]
fn next_from_link_rel_next() {
    let html = r#"<head><link rel="next" href="/brands?page=2"></head>"#;
    assert_eq!(
        find_next_url(html, BASE).as_deref(),
        Some("https://shop.example.com/brands?page=2")
    );
}

#[test]
fn next_from_anchor_class_resolves_relative_query() {
    let html = r#"<a class="pagination__next" href="?page=3">&rsaquo;</a>"#;
    assert_eq!(
        find_next_url(html, "https://shop.example.com/brands?page=2").as_deref(),
        Some("https://shop.example.com/brands?page=3")
    );
}

#[test]
fn next_from_localized_label_or_aria_label() {
    let tr = r#"<a href="/markalar?sayfa=2">Sonraki</a>"#;
    assert_eq!(
        find_next_url(tr, "https://www.example.com.tr/markalar").as_deref(),
        Some("https://www.example.com.tr/markalar?sayfa=2")
    );

    let aria = r#"<a href="/brands/page/2" aria-label="Next page"><svg></svg></a>"#;
    assert_eq!(
        find_next_url(aria, BASE).as_deref(),
        Some("https://shop.example.com/brands/page/2")
    );
}

#[test]
fn unusable_next_links_are_skipped() {
    let html = r##"
        <a rel="next" href="javascript:void(0)">Next</a>
        <a class="next" href="#">Next</a>
        <a rel="next" href="/brands">Next</a>
    "##;
    assert_eq!(find_next_url(html, BASE), None);
}

#[test]
fn first_usable_next_link_wins_over_broken_one() {
    let html = r##"
        <a class="next" href="#">›</a>
        <a class="next" href="/brands?page=2">›</a>
    "##;
    assert_eq!(
        find_next_url(html, BASE).as_deref(),
        Some("https://shop.example.com/brands?page=2")
    );
}

#[test]
fn no_next_link_on_last_page() {
    let html = r#"<a href="/brands/ganni">Ganni</a><a href="/brands?page=1">Previous</a>"#;
    assert_eq!(find_next_url(html, BASE), None);
}

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

#[test]
fn slug_rules() {
    assert_eq!(slug_from_href("/brands/acne-studios").as_deref(), Some("acne studios"));
    assert_eq!(slug_from_href("/brands/ganni/").as_deref(), Some("ganni"));
    assert_eq!(slug_from_href("/brands/ganni?x=1"), None);
    assert_eq!(slug_from_href("/brands/x"), None);
    assert_eq!(slug_from_href("/brands/%F0%9F%94%A5"), None);
}

#[test]
fn decode_entities_leaves_unknown_entities() {
    assert_eq!(decode_entities("a &bogus; b &amp; c"), "a &bogus; b & c");
}
