//! Extraction of image sources from the HTML of Wikipedia articles and Seeklogo search results.

use scraper::{Html, Selector};
use std::sync::LazyLock;

static INFOBOX_IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".infobox-image").expect("invalid selector"));

static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").expect("invalid selector"));

static LOGO_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.logoGroupCt img.logoImage").expect("invalid selector"));

/// The source of the first image inside the first `infobox-image` element of a Wikipedia article, as written
/// in the page.
#[must_use]
pub fn wikipedia_infobox_image(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let infobox = document.select(&INFOBOX_IMAGE).next()?;

    infobox
        .select(&IMG)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
}

/// The source of the first logo in a Seeklogo search result page, as written in the page.
#[must_use]
pub fn seeklogo_logo(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    document
        .select(&LOGO_IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
}
