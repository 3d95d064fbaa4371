use crate::parsers::html::{clean_text, element_text, first, href, selector};
use crate::results::Record;
use scraper::{Html, Selector};
use std::sync::LazyLock;

pub const PROFILE_DESCRIPTION: &str = "Profile Description";
pub const SHORT_DESCRIPTION: &str = "Short Description";
pub const CATEGORIES: &str = "Categories";
pub const LINKEDIN: &str = "LinkedIn";

const WEBSITE_LABEL: &str = "Website";
const EMAIL_LABEL: &str = "E-mail";
const CATEGORY_SEPARATOR: &str = ", ";

static ADDRESS_ROWS: LazyLock<Selector> =
    LazyLock::new(|| selector("table.company-address tr.detail"));
static LABEL_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td.detail-label"));
static VALUE_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td.detail"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static PROFILE_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| selector("div.profile-description div.block-content"));
static SHORT_DESC: LazyLock<Selector> = LazyLock::new(|| selector("div.description"));
static BREADCRUMBS: LazyLock<Selector> = LazyLock::new(|| selector("div.breadcrumbs"));
static CATEGORY_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector("a.categories-company-new"));
static LINKEDIN_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector("div.social-company-page a.linkedin"));

/// Extracts the fields of a company detail page.
///
/// Every address-table row becomes a field named by its label. The
/// description, categories and LinkedIn fields are always present and left
/// blank when the page lacks them.
pub fn parse(html: &str) -> Record {
    let doc = Html::parse_document(html);
    let mut record = Record::new();

    for (label, value) in address_fields(&doc) {
        record.set(&label, value);
    }

    record.set(
        PROFILE_DESCRIPTION,
        doc.select(&PROFILE_CONTENT)
            .next()
            .map(element_text)
            .unwrap_or_default(),
    );
    record.set(
        SHORT_DESCRIPTION,
        doc.select(&SHORT_DESC)
            .next()
            .map(element_text)
            .unwrap_or_default(),
    );
    record.set(CATEGORIES, categories(&doc));
    record.set(
        LINKEDIN,
        doc.select(&LINKEDIN_LINK)
            .next()
            .and_then(href)
            .unwrap_or_default(),
    );

    record
}

/// Label/value pairs of the address table
fn address_fields(doc: &Html) -> Vec<(String, String)> {
    let mut fields = Vec::new();

    for row in doc.select(&ADDRESS_ROWS) {
        let Some(label_cell) = first(row, &LABEL_CELL) else {
            continue;
        };
        let label = element_text(label_cell);
        if label.is_empty() {
            continue;
        }

        let value_cell = first(row, &VALUE_CELL);
        let link = value_cell.and_then(|cell| first(cell, &ANCHOR)).and_then(href);

        // Links carry the real address; the visible text is often shortened
        let value = match label.as_str() {
            WEBSITE_LABEL => link.unwrap_or_default(),
            EMAIL_LABEL => link
                .map(|l| l.trim_start_matches("mailto:").trim().to_string())
                .unwrap_or_default(),
            _ => value_cell.map(element_text).unwrap_or_default(),
        };

        fields.push((label, value));
    }

    fields
}

/// Breadcrumb categories, without the leading root and trailing company crumbs
fn categories(doc: &Html) -> String {
    let Some(breadcrumbs) = doc.select(&BREADCRUMBS).next() else {
        return String::new();
    };

    let crumbs: Vec<String> = breadcrumbs
        .select(&CATEGORY_LINK)
        .map(|a| clean_text(&a.text().collect::<String>()))
        .collect();

    if crumbs.len() <= 2 {
        return String::new();
    }
    crumbs[1..crumbs.len() - 1].join(CATEGORY_SEPARATOR)
}
