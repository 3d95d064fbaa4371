use crate::parsers::detail::{self, CATEGORIES, LINKEDIN, PROFILE_DESCRIPTION, SHORT_DESCRIPTION};

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAGE: &str = r#"
        <html><body>
          <div class="breadcrumbs">
            <a class="categories-company-new" href="/">Home</a>
            <a class="categories-company-new" href="/c/printing">Printing</a>
            <a class="categories-company-new" href="/c/3d-printers"> 3D
               Printers </a>
            <a class="categories-company-new" href="/company/acme">Acme</a>
          </div>
          <div class="description">Industrial   additive
             manufacturing.</div>
          <table class="company-address">
            <tr class="detail">
              <td class="detail-label">Address</td>
              <td class="detail">1 Main St,
                  Springfield</td>
            </tr>
            <tr class="detail">
              <td class="detail-label">Website</td>
              <td class="detail"><a href=" https://acme.test/ ">acme.test</a></td>
            </tr>
            <tr class="detail">
              <td class="detail-label">E-mail</td>
              <td class="detail"><a href="mailto:info@acme.test">Send e-mail</a></td>
            </tr>
          </table>
          <div class="profile-description">
            <div class="block-title">Profile</div>
            <div class="block-content"><p>Acme builds</p><p>printers.</p></div>
          </div>
          <div class="social-company-page">
            <a class="twitter" href="https://twitter.test/acme">T</a>
            <a class="linkedin" href="https://linkedin.test/company/acme ">L</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_full_detail_page() {
        let record = detail::parse(FULL_PAGE);

        assert_eq!(record.get("Address"), Some("1 Main St, Springfield"));
        assert_eq!(record.get("Website"), Some("https://acme.test/"));
        assert_eq!(record.get("E-mail"), Some("info@acme.test"));
        assert_eq!(record.get(PROFILE_DESCRIPTION), Some("Acme builds printers."));
        assert_eq!(
            record.get(SHORT_DESCRIPTION),
            Some("Industrial additive manufacturing.")
        );
        assert_eq!(record.get(CATEGORIES), Some("Printing, 3D Printers"));
        assert_eq!(record.get(LINKEDIN), Some("https://linkedin.test/company/acme"));
        assert_eq!(record.name(), None);
    }

    #[test]
    fn test_missing_containers_yield_blank_fields() {
        let record = detail::parse("<html><body><p>Nothing here</p></body></html>");

        for key in [PROFILE_DESCRIPTION, SHORT_DESCRIPTION, CATEGORIES, LINKEDIN] {
            assert_eq!(record.get(key), Some(""), "field {} should be blank", key);
        }
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_profile_block_without_content_is_blank() {
        let html = r#"<div class="profile-description"><div class="block-title">Profile</div></div>"#;
        let record = detail::parse(html);
        assert_eq!(record.get(PROFILE_DESCRIPTION), Some(""));
    }

    #[test]
    fn test_link_fields_without_anchor_are_blank() {
        let html = r#"
            <table class="company-address">
              <tr class="detail"><td class="detail-label">Website</td><td class="detail">acme.test</td></tr>
              <tr class="detail"><td class="detail-label">E-mail</td><td class="detail">hidden</td></tr>
              <tr class="detail"><td class="detail">orphan value</td></tr>
            </table>
        "#;
        let record = detail::parse(html);

        assert_eq!(record.get("Website"), Some(""));
        assert_eq!(record.get("E-mail"), Some(""));
        // A row without a label is not a field
        assert_eq!(record.len(), 6);
    }

    #[test]
    fn test_categories_need_more_than_two_crumbs() {
        let html = r#"
            <div class="breadcrumbs">
              <a class="categories-company-new" href="/">Home</a>
              <a class="categories-company-new" href="/company/acme">Acme</a>
            </div>
        "#;
        let record = detail::parse(html);
        assert_eq!(record.get(CATEGORIES), Some(""));
    }
}
