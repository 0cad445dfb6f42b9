//! CSV export of an analysis result. RFC 4180 quoting, `\n` line endings.

use crate::models::analysis::PolicyAnalysisResult;

pub const CSV_FILE_NAME: &str = "ad_policy_analysis.csv";
const HEADER: [&str; 4] = ["Category", "Severity", "Rule / Detail", "Explanation"];
const BOM: &str = "\u{FEFF}";
const NOT_APPLICABLE: &str = "N/A";

/// Quotes a field containing a comma, quote, CR or LF; inner quotes are doubled.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn feedback_rows<'a>(
    category: &'static str,
    items: &'a [String],
) -> impl Iterator<Item = [&'a str; 4]> {
    items
        .iter()
        .map(move |item| [category, NOT_APPLICABLE, item.as_str(), ""])
}

/// Rows without the header: content violations, then general suggestions,
/// then image policy, layout and branding feedback.
pub fn rows(result: &PolicyAnalysisResult) -> Vec<[&str; 4]> {
    let mut rows: Vec<[&str; 4]> = result
        .violations
        .iter()
        .map(|v| {
            [
                "Content Violation",
                v.severity.as_str(),
                v.rule.as_str(),
                v.explanation.as_str(),
            ]
        })
        .collect();
    rows.extend(feedback_rows("General Suggestion", &result.suggestions));

    if let Some(image) = &result.image_analysis {
        rows.extend(feedback_rows("Image Policy Violation", &image.policy_violations));
        rows.extend(feedback_rows("Image Layout Feedback", &image.layout_feedback));
        rows.extend(feedback_rows("Image Branding Feedback", &image.branding_feedback));
    }
    rows
}

fn line(fields: &[&str]) -> String {
    let mut line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// CSV text without the byte-order mark.
pub fn to_csv(result: &PolicyAnalysisResult) -> String {
    let mut csv = line(&HEADER);
    for row in rows(result) {
        csv.push_str(&line(&row));
    }
    csv
}

/// Download body: UTF-8 BOM so spreadsheet apps pick the right encoding.
pub fn to_csv_download(result: &PolicyAnalysisResult) -> String {
    format!("{BOM}{}", to_csv(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::mock::sample_result;

    /// Minimal RFC 4180 reader, enough to check that quoting round-trips.
    fn parse(csv: &str) -> Vec<Vec<String>> {
        let mut records = vec![];
        let mut record = vec![];
        let mut field = String::new();
        let mut quoted = false;
        let mut chars = csv.chars().peekable();
        while let Some(c) = chars.next() {
            match (quoted, c) {
                (true, '"') if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                (true, '"') => quoted = false,
                (true, c) => field.push(c),
                (false, '"') => quoted = true,
                (false, ',') => record.push(std::mem::take(&mut field)),
                (false, '\n') => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                (false, c) => field.push(c),
            }
        }
        records
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_field("cr\rhere"), "\"cr\rhere\"");
    }

    #[test]
    fn test_header_and_row_order() {
        let csv = to_csv(&sample_result(true));
        let records = parse(&csv);
        assert_eq!(records[0], HEADER.to_vec());
        let categories: Vec<&str> = records[1..].iter().map(|r| r[0].as_str()).collect();
        assert_eq!(
            categories,
            vec![
                "Content Violation",
                "General Suggestion",
                "Image Policy Violation",
                "Image Layout Feedback",
                "Image Branding Feedback",
            ]
        );
        assert_eq!(records[1][1], "high");
        assert_eq!(records[2][1], "N/A");
        assert_eq!(records[2][3], "");
    }

    #[test]
    fn test_suggestion_with_comma_is_one_quoted_field() {
        let csv = to_csv(&sample_result(false));
        assert!(csv.contains("General Suggestion,N/A,\"Shorten, then emphasize CTA\",\n"));

        let records = parse(&csv);
        let suggestion = &records[2];
        assert_eq!(suggestion.len(), 4);
        assert_eq!(suggestion[2], "Shorten, then emphasize CTA");
    }

    #[test]
    fn test_quotes_in_explanation_round_trip() {
        let result = sample_result(false);
        let records = parse(&to_csv(&result));
        assert_eq!(records[1][3], result.violations[0].explanation);
    }

    #[test]
    fn test_no_image_analysis_means_no_image_rows() {
        let csv = to_csv(&sample_result(false));
        assert!(!csv.contains("Image "));
        assert_eq!(parse(&csv).len(), 3);
    }

    #[test]
    fn test_download_starts_with_bom() {
        let body = to_csv_download(&sample_result(false));
        assert!(body.starts_with('\u{FEFF}'));
        assert!(body.ends_with('\n'));
    }
}
