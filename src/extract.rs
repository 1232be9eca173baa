//! Support table extraction from endpoint pages

use scraper::{ElementRef, Html, Selector};

/// Accessible label of the identity support table on every endpoint page
pub const SUPPORT_TABLE_LABEL: &str = "Microsoft Entra supported identities";

/// One data row of a support table: identity type and its support text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportRow {
    pub identity_type: String,
    pub support_text: String,
}

/// Text content of an element with every text node trimmed and empty
/// fragments dropped, joined without separator.
pub fn stripped_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Find the first `<table>` whose `aria-label` equals `label`.
pub fn find_labeled_table<'a>(doc: &'a Html, label: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse("table").ok()?;
    doc.select(&selector)
        .find(|table| table.value().attr("aria-label") == Some(label))
}

/// Extract the data rows of the labeled support table.
///
/// `None` when the page has no such table. The first `<tr>` is the header;
/// rows with fewer than two cells are skipped.
pub fn parse_support_table(html: &str, label: &str) -> Option<Vec<SupportRow>> {
    let doc = Html::parse_document(html);
    let table = find_labeled_table(&doc, label)?;

    let row_sel = Selector::parse("tr").ok()?;
    let cell_sel = Selector::parse("td, th").ok()?;

    let rows: Vec<ElementRef> = table.select(&row_sel).collect();
    if rows.len() < 2 {
        return Some(Vec::new());
    }

    let parsed = rows[1..]
        .iter()
        .filter_map(|row| {
            let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
            if cells.len() < 2 {
                return None;
            }
            Some(SupportRow {
                identity_type: stripped_text(cells[0]),
                support_text: stripped_text(cells[1]),
            })
        })
        .collect();

    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(table: &str) -> String {
        format!("<html><body><h2>Permissions</h2>{}</body></html>", table)
    }

    #[test]
    fn test_parse_support_table() {
        let html = page(
            r#"<table aria-label="Microsoft Entra supported identities">
                <thead><tr><th>Identity</th><th>Support</th></tr></thead>
                <tbody>
                  <tr><td>User</td><td>Yes</td></tr>
                  <tr><td>Service principal and
                      <a href="/managed">Managed identities</a></td><td>Yes</td></tr>
                </tbody>
            </table>"#,
        );
        let rows = parse_support_table(&html, SUPPORT_TABLE_LABEL).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].identity_type, "User");
        assert_eq!(rows[0].support_text, "Yes");
        assert_eq!(
            rows[1].identity_type,
            "Service principal andManaged identities"
        );
    }

    #[test]
    fn test_short_rows_skipped() {
        let html = page(
            r#"<table aria-label="Microsoft Entra supported identities">
                <tr><th>Identity</th><th>Support</th></tr>
                <tr><td>User</td><td>Yes</td></tr>
                <tr><td colspan="2">Note: preview only</td></tr>
                <tr><td>Service principal</td><td>No</td></tr>
            </table>"#,
        );
        let rows = parse_support_table(&html, SUPPORT_TABLE_LABEL).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].identity_type, "Service principal");
    }

    #[test]
    fn test_header_only_table() {
        let html = page(
            r#"<table aria-label="Microsoft Entra supported identities">
                <tr><th>Identity</th><th>Support</th></tr>
            </table>"#,
        );
        assert_eq!(parse_support_table(&html, SUPPORT_TABLE_LABEL), Some(vec![]));
    }

    #[test]
    fn test_other_tables_ignored() {
        let html = page(
            r#"<table aria-label="URI Parameters">
                <tr><th>Name</th><th>In</th></tr>
                <tr><td>workspaceId</td><td>path</td></tr>
            </table>"#,
        );
        assert_eq!(parse_support_table(&html, SUPPORT_TABLE_LABEL), None);
    }

    #[test]
    fn test_stripped_text() {
        let doc = Html::parse_fragment("<p>  Create \n <b> Item </b>  </p>");
        let sel = Selector::parse("p").unwrap();
        let p = doc.select(&sel).next().unwrap();
        assert_eq!(stripped_text(p), "CreateItem");
    }
}
