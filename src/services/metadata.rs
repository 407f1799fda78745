//! Lawsuit metadata extraction from DocMan category descriptions.
//!
//! Editors kept case details in an HTML table inside the description:
//! a label cell ("Autor", "Processo", ...) followed by the value cell.
//! Matching is deliberately loose: a cell matches when its text contains the
//! label anywhere, ignoring case, and the first matching cell in document
//! order wins. Existing data depends on that behavior.

use std::borrow::Cow;
use std::fmt;

use scraper::{ElementRef, Html, Selector};

use crate::models::LawsuitMetadata;

/// Maximum stored length of an extracted value, in characters.
pub const MAX_FIELD_LENGTH: usize = 255;

const ELLIPSIS: &str = "...";

/// A labeled field in the description table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Author,
    ProcessNumber,
    Protocol,
    Nature,
    Distribution,
    JudicialDistrict,
}

impl MetadataField {
    /// Label searched for in the table cells (lowercase).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Author => "autor",
            Self::ProcessNumber => "processo",
            Self::Protocol => "protocolo",
            Self::Nature => "natureza",
            Self::Distribution => "distribuição",
            Self::JudicialDistrict => "comarca",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Degraded extraction result. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionAnomaly {
    /// No cell contains the label.
    MissingLabel(MetadataField),
    /// The label cell has no following sibling cell.
    MissingValue(MetadataField),
}

impl fmt::Display for ExtractionAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLabel(field) => write!(f, "label '{}' not found", field),
            Self::MissingValue(field) => write!(f, "label '{}' has no value cell", field),
        }
    }
}

/// Extracted metadata plus whatever could not be found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub metadata: LawsuitMetadata,
    pub anomalies: Vec<ExtractionAnomaly>,
}

/// Extract the lawsuit metadata from a category description.
///
/// A missing or empty description yields empty strings for all six fields.
/// Otherwise a missing label leaves `author` and `process_number` empty and
/// the remaining fields `None`.
pub fn extract(description: Option<&str>) -> Extraction {
    let Some(html) = description.filter(|html| !html.is_empty()) else {
        return Extraction {
            metadata: LawsuitMetadata::blank(),
            anomalies: Vec::new(),
        };
    };

    let fragment = Html::parse_fragment(&wrap_orphan_rows(html));
    let cells = cell_selector();
    let mut anomalies = Vec::new();

    let mut lookup = |field: MetadataField| match find_labeled_value(&fragment, &cells, field) {
        Ok(value) => Some(truncate_field(value)),
        Err(anomaly) => {
            anomalies.push(anomaly);
            None
        }
    };

    let metadata = LawsuitMetadata {
        author: lookup(MetadataField::Author).unwrap_or_default(),
        process_number: lookup(MetadataField::ProcessNumber).unwrap_or_default(),
        protocol: lookup(MetadataField::Protocol),
        nature: lookup(MetadataField::Nature),
        distribution: lookup(MetadataField::Distribution),
        judicial_district: lookup(MetadataField::JudicialDistrict),
    };

    Extraction {
        metadata,
        anomalies,
    }
}

/// Cut a value to [`MAX_FIELD_LENGTH`] characters, ending it with `...`.
pub fn truncate_field(value: String) -> String {
    if value.chars().count() <= MAX_FIELD_LENGTH {
        return value;
    }
    let mut truncated: String = value
        .chars()
        .take(MAX_FIELD_LENGTH - ELLIPSIS.len())
        .collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

fn cell_selector() -> Selector {
    Selector::parse("td").expect("'td' is a valid selector")
}

/// Find the first cell containing the field's label and read its next sibling.
fn find_labeled_value(
    fragment: &Html,
    cells: &Selector,
    field: MetadataField,
) -> Result<String, ExtractionAnomaly> {
    let label = field.label();
    let cell = fragment
        .select(cells)
        .find(|cell| cell_text(cell).to_lowercase().contains(label))
        .ok_or(ExtractionAnomaly::MissingLabel(field))?;

    cell.next_siblings()
        .find_map(ElementRef::wrap)
        .map(|value| cell_text(&value))
        .ok_or(ExtractionAnomaly::MissingValue(field))
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Table rows outside a `<table>` are dropped by the HTML parser, so every
/// stretch of markup between tables that holds bare `<tr>`/`<td>` tags gets
/// its own `<table>` wrapper.
fn wrap_orphan_rows(html: &str) -> Cow<'_, str> {
    // ASCII lowercasing keeps byte offsets valid for slicing `html`
    let lower = html.to_ascii_lowercase();
    if !has_cell_tag(&lower) {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + 32);
    let mut wrapped = false;
    let mut depth = 0usize;
    // start of the pending outside stretch, or of the outermost open table
    let mut start = 0;
    let mut pos = 0;

    while let Some(offset) = lower[pos..].find('<') {
        let at = pos + offset;
        let tag = &lower[at..];

        if is_tag(tag, "<table") {
            if depth == 0 {
                wrapped |= push_outside(&mut out, &html[start..at], &lower[start..at]);
                start = at;
            }
            depth += 1;
        } else if is_tag(tag, "</table") && depth > 0 {
            depth -= 1;
            if depth == 0 {
                let end = tag.find('>').map_or(lower.len(), |close| at + close + 1);
                out.push_str(&html[start..end]);
                start = end;
                pos = end;
                continue;
            }
        }
        pos = at + 1;
    }

    if depth == 0 {
        wrapped |= push_outside(&mut out, &html[start..], &lower[start..]);
    } else {
        out.push_str(&html[start..]);
    }

    if wrapped {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(html)
    }
}

/// Append markup found outside any table, wrapping it when it holds cells.
fn push_outside(out: &mut String, segment: &str, lower: &str) -> bool {
    if has_cell_tag(lower) {
        out.push_str("<table>");
        out.push_str(segment);
        out.push_str("</table>");
        true
    } else {
        out.push_str(segment);
        false
    }
}

fn has_cell_tag(lower: &str) -> bool {
    lower
        .match_indices('<')
        .any(|(at, _)| is_tag(&lower[at..], "<tr") || is_tag(&lower[at..], "<td"))
}

/// Whether `s` starts with the tag `name`, not a longer tag name like `<track`.
fn is_tag(s: &str, name: &str) -> bool {
    s.strip_prefix(name).is_some_and(|rest| {
        rest.chars()
            .next()
            .map_or(true, |c| c == '>' || c == '/' || c.is_ascii_whitespace())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_TABLE: &str = r#"
        <p>Dados do processo</p>
        <table>
          <tbody>
            <tr><td><strong>Autor:</strong></td><td> Maria da Silva </td></tr>
            <tr><td>Nº do Processo</td><td>0001234-56.2019.8.26.0100</td></tr>
            <tr><td>Protocolo</td><td>2019/000123</td></tr>
            <tr><td>Natureza</td><td>Ação de cobrança</td></tr>
            <tr><td>DISTRIBUIÇÃO</td><td>14/03/2019</td></tr>
            <tr><td>Comarca</td><td>São Paulo</td></tr>
          </tbody>
        </table>"#;

    #[test]
    fn test_extracts_all_fields() {
        let extraction = extract(Some(FULL_TABLE));
        let m = extraction.metadata;

        assert_eq!(m.author, "Maria da Silva");
        assert_eq!(m.process_number, "0001234-56.2019.8.26.0100");
        assert_eq!(m.protocol.as_deref(), Some("2019/000123"));
        assert_eq!(m.nature.as_deref(), Some("Ação de cobrança"));
        assert_eq!(m.distribution.as_deref(), Some("14/03/2019"));
        assert_eq!(m.judicial_district.as_deref(), Some("São Paulo"));
        assert!(extraction.anomalies.is_empty());
    }

    #[test]
    fn test_missing_description_is_blank() {
        assert_eq!(extract(None).metadata, LawsuitMetadata::blank());
        assert_eq!(extract(Some("")).metadata, LawsuitMetadata::blank());
        assert!(extract(None).anomalies.is_empty());
    }

    #[test]
    fn test_missing_labels_are_asymmetric() {
        let extraction = extract(Some("<table><tr><td>Natureza</td><td>Cível</td></tr></table>"));
        let m = extraction.metadata;

        assert_eq!(m.author, "");
        assert_eq!(m.process_number, "");
        assert_eq!(m.protocol, None);
        assert_eq!(m.nature.as_deref(), Some("Cível"));
        assert_eq!(m.distribution, None);
        assert_eq!(m.judicial_district, None);
        assert!(extraction
            .anomalies
            .contains(&ExtractionAnomaly::MissingLabel(MetadataField::Protocol)));
        assert!(extraction
            .anomalies
            .contains(&ExtractionAnomaly::MissingLabel(MetadataField::Author)));
    }

    #[test]
    fn test_bare_row_is_parsed() {
        let m = extract(Some("<tr><td>Autor</td><td>John Doe</td></tr>")).metadata;
        assert_eq!(m.author, "John Doe");
    }

    #[test]
    fn test_bare_row_after_layout_table_is_parsed() {
        let html = "<table><tr><td>Resumo</td></tr></table>\
            <tr><td>Autor</td><td>John Doe</td></tr>";
        assert_eq!(extract(Some(html)).metadata.author, "John Doe");
    }

    #[test]
    fn test_only_rows_outside_tables_are_wrapped() {
        let inside = "<p>x</p><table><tbody><tr><td>a</td></tr></tbody></table>";
        assert!(matches!(wrap_orphan_rows(inside), Cow::Borrowed(_)));

        assert_eq!(
            wrap_orphan_rows("<TABLE><tr><td>a</td></tr></TABLE><td>b</td>"),
            "<TABLE><tr><td>a</td></tr></TABLE><table><td>b</td></table>"
        );
        assert_eq!(
            wrap_orphan_rows("<tr><td>a</td></tr><table><tr><td>b</td></tr></table>"),
            "<table><tr><td>a</td></tr></table><table><tr><td>b</td></tr></table>"
        );
        assert!(matches!(
            wrap_orphan_rows("<p><track src=\"a.vtt\"></p>"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_first_matching_cell_wins() {
        let html = "<table>\
            <tr><td>Autor</td><td>First</td></tr>\
            <tr><td>Co-autor</td><td>Second</td></tr>\
            </table>";
        assert_eq!(extract(Some(html)).metadata.author, "First");
    }

    #[test]
    fn test_substring_match_is_loose() {
        // "processo" also occurs inside an unrelated cell's text
        let html = "<table>\
            <tr><td>Andamento do processo</td><td>Arquivado</td></tr>\
            <tr><td>Processo</td><td>123</td></tr>\
            </table>";
        assert_eq!(extract(Some(html)).metadata.process_number, "Arquivado");
    }

    #[test]
    fn test_label_without_value_cell() {
        let extraction = extract(Some("<table><tr><td>Comarca</td></tr></table>"));
        assert_eq!(extraction.metadata.judicial_district, None);
        assert!(extraction
            .anomalies
            .contains(&ExtractionAnomaly::MissingValue(MetadataField::JudicialDistrict)));
    }

    #[test]
    fn test_long_value_is_truncated() {
        let long = "x".repeat(300);
        let html = format!("<table><tr><td>Natureza</td><td>{long}</td></tr></table>");
        let nature = extract(Some(&html)).metadata.nature.unwrap();

        assert_eq!(nature.chars().count(), MAX_FIELD_LENGTH);
        assert!(nature.ends_with("..."));
        assert!(nature.starts_with(&"x".repeat(252)));
    }

    #[test]
    fn test_truncate_counts_characters() {
        let value = "ç".repeat(MAX_FIELD_LENGTH);
        assert_eq!(truncate_field(value.clone()), value);

        let truncated = truncate_field("ã".repeat(MAX_FIELD_LENGTH + 1));
        assert_eq!(truncated.chars().count(), MAX_FIELD_LENGTH);
        assert!(truncated.ends_with("..."));
    }
}
