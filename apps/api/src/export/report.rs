//! Printable HTML report of an analysis result.

use crate::models::analysis::PolicyAnalysisResult;
use crate::template::fill;

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Ad Policy Analysis Report</title>
<style>
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; }
h1, h2, h3 { color: #111; }
h1 { font-size: 24px; text-align: center; border-bottom: 2px solid #eee; padding-bottom: 10px; }
h2 { font-size: 20px; border-bottom: 1px solid #eee; padding-bottom: 5px; margin-top: 30px; }
table { width: 100%; border-collapse: collapse; margin-top: 15px; }
th, td { border: 1px solid #ddd; padding: 10px; text-align: left; }
th { background-color: #f2f2f2; }
pre { background-color: #f5f5f5; padding: 15px; border-radius: 5px; white-space: pre-wrap; word-wrap: break-word; border: 1px solid #ddd; }
.summary { background-color: #f8f9fa; padding: 15px; border-radius: 5px; border-left: 5px solid {status_color}; }
.summary-status { font-weight: bold; color: {status_color}; }
</style>
</head>
<body>
<h1>Ad Policy Analysis Report</h1>
<h2>Overview</h2>
<div class="summary">
<p><strong>Status:</strong> <span class="summary-status">{status_label}</span></p>
<p><strong>Summary:</strong> {summary}</p>
</div>
<h2>Content Violations</h2>
<table>
<thead><tr><th>Rule</th><th>Explanation</th><th>Severity</th></tr></thead>
<tbody>
{violations}
</tbody>
</table>
{image_analysis}
<h2>General Suggestions</h2>
<ul>
{suggestions}
</ul>
<h2>Corrected Text</h2>
<pre>{fixed_content}</pre>
</body>
</html>
"#;

const NO_VIOLATIONS_ROW: &str = r#"<tr><td colspan="3">No violations found.</td></tr>"#;
const NO_SUGGESTIONS_ITEM: &str = "<li>No suggestions.</li>";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("<li>{}</li>", escape_html(i)))
        .collect()
}

/// `<h3>` plus list, or nothing when `items` is empty.
fn section(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        String::new()
    } else {
        format!("<h3>{title}</h3>\n<ul>{}</ul>\n", list_items(items))
    }
}

pub fn render_report(result: &PolicyAnalysisResult) -> String {
    let violations: String = if result.violations.is_empty() {
        NO_VIOLATIONS_ROW.to_string()
    } else {
        result
            .violations
            .iter()
            .map(|v| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    escape_html(&v.rule),
                    escape_html(&v.explanation),
                    v.severity.as_str()
                )
            })
            .collect()
    };

    let suggestions = if result.suggestions.is_empty() {
        NO_SUGGESTIONS_ITEM.to_string()
    } else {
        list_items(&result.suggestions)
    };

    let image_analysis = result
        .image_analysis
        .as_ref()
        .map(|image| {
            format!(
                "<h2>Image Analysis</h2>\n{}{}{}",
                section("Image Policy Violations", &image.policy_violations),
                section("Layout &amp; Design Feedback", &image.layout_feedback),
                section("Branding Feedback", &image.branding_feedback),
            )
        })
        .unwrap_or_default();

    let summary = escape_html(&result.summary);
    let fixed_content = escape_html(&result.fixed_content);
    fill(
        REPORT_TEMPLATE,
        &[
            ("{status_color}", result.status.color()),
            ("{status_label}", result.status.label()),
            ("{summary}", summary.as_str()),
            ("{violations}", violations.as_str()),
            ("{image_analysis}", image_analysis.as_str()),
            ("{suggestions}", suggestions.as_str()),
            ("{fixed_content}", fixed_content.as_str()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::mock::sample_result;
    use crate::models::analysis::ComplianceStatus;

    #[test]
    fn test_escape_html_covers_all_specials() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_report_has_status_colour_and_escaped_text() {
        let mut result = sample_result(false);
        result.summary = "Claims <100% results>".to_string();
        let html = render_report(&result);
        assert!(html.contains("#ef4444"));
        assert!(html.contains("Non-compliant"));
        assert!(html.contains("Claims &lt;100% results&gt;"));
        assert!(html.contains("&quot;Cures acne in 2 days&quot;"));
        assert!(!html.contains("{summary}"));
    }

    #[test]
    fn test_report_without_violations_shows_placeholder_row() {
        let mut result = sample_result(false);
        result.status = ComplianceStatus::Compliant;
        result.violations.clear();
        let html = render_report(&result);
        assert!(html.contains("No violations found."));
        assert!(html.contains("#22c55e"));
    }

    #[test]
    fn test_image_sections_only_when_non_empty() {
        let mut result = sample_result(true);
        if let Some(image) = result.image_analysis.as_mut() {
            image.branding_feedback.clear();
        }
        let html = render_report(&result);
        assert!(html.contains("Image Analysis"));
        assert!(html.contains("Image Policy Violations"));
        assert!(!html.contains("Branding Feedback"));

        let html = render_report(&sample_result(false));
        assert!(!html.contains("Image Analysis"));
    }

    #[test]
    fn test_fixed_content_is_preformatted() {
        let mut result = sample_result(false);
        result.fixed_content = "Line one\nLine two".to_string();
        assert!(render_report(&result).contains("<pre>Line one\nLine two</pre>"));
    }

    #[test]
    fn test_placeholder_text_in_summary_is_not_expanded() {
        let mut result = sample_result(false);
        result.summary = "literal {fixed_content}".to_string();
        let html = render_report(&result);
        assert!(html.contains("literal {fixed_content}"));
    }
}
