// Changelog rendering for the package details dialog

use crate::release::ReleaseData;
use chrono::DateTime;

/// Tags allowed through to the admin page; attributes are always dropped
const ALLOWED_TAGS: &[&str] = &["h2", "h3", "h4", "ul", "li", "br", "p", "strong", "em"];

const NO_CHANGELOG: &str = "<p>No changelog available.</p>";

/// Render a release as changelog markup.
///
/// Release name becomes a heading, the publish date a "Released" line, and the
/// notes go through [`markdown_to_html`] and [`sanitize_markup`].
pub fn format_changelog(release: &ReleaseData) -> String {
    let mut changelog = String::new();

    if let Some(name) = non_empty(release.name.as_deref()) {
        changelog.push_str(&format!("<h3>{}</h3>", html_escape(name)));
    }

    if let Some(published) = non_empty(release.published_at.as_deref()) {
        changelog.push_str(&format!(
            "<p><strong>Released:</strong> {}</p>",
            html_escape(&format_release_date(published))
        ));
    }

    match non_empty(release.body.as_deref()) {
        Some(body) => {
            let body = sanitize_markup(&markdown_to_html(body));
            changelog.push_str(&format!(
                "<div class=\"fab-changelog-content\">{}</div>",
                body
            ));
        }
        None => changelog.push_str(NO_CHANGELOG),
    }

    changelog
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// "2024-03-05T10:00:00Z" -> "March 5, 2024"; unparseable input is returned as-is
pub fn format_release_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|date| date.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

enum Line<'a> {
    Heading(u8, &'a str),
    Item(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if let Some(text) = line.strip_prefix("### ") {
        Line::Heading(4, text)
    } else if let Some(text) = line.strip_prefix("## ") {
        Line::Heading(3, text)
    } else if let Some(text) = line.strip_prefix("# ") {
        Line::Heading(2, text)
    } else if let Some(text) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
        Line::Item(text)
    } else {
        Line::Text(line)
    }
}

/// Convert the small Markdown subset used in release notes.
///
/// Supports `#`/`##`/`###` headings, `*`/`-` list items (each contiguous run in
/// one `<ul>`), and explicit `<br />` between consecutive text lines. All text
/// is escaped; nothing from the input survives as markup.
pub fn markdown_to_html(body: &str) -> String {
    let mut html = String::new();
    let mut in_list = false;
    let mut previous_was_text = false;

    for raw in body.trim().lines() {
        let line = raw.trim_end();

        let kind = classify(line);
        if in_list && !matches!(kind, Line::Item(_)) {
            html.push_str("</ul>");
            in_list = false;
        }

        match kind {
            Line::Item(text) => {
                if !in_list {
                    html.push_str("<ul>");
                    in_list = true;
                }
                html.push_str(&format!("<li>{}</li>", html_escape(text.trim())));
                previous_was_text = false;
            }
            Line::Heading(level, text) => {
                html.push_str(&format!(
                    "<h{level}>{}</h{level}>",
                    html_escape(text.trim())
                ));
                previous_was_text = false;
            }
            Line::Text(text) => {
                if previous_was_text {
                    html.push_str("<br />\n");
                }
                html.push_str(&html_escape(text));
                previous_was_text = true;
            }
        }
    }

    if in_list {
        html.push_str("</ul>");
    }

    html
}

/// Keep only bare allowlisted tags; anything else that looks like a tag is escaped.
pub fn sanitize_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match candidate.find('>') {
            Some(end) => {
                match allowed_tag(&candidate[1..end]) {
                    Some(tag) => out.push_str(&tag),
                    None => out.push_str(&html_escape(&candidate[..=end])),
                }
                rest = &candidate[end + 1..];
            }
            None => {
                out.push_str(&html_escape(candidate));
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn allowed_tag(inner: &str) -> Option<String> {
    let inner = inner.trim();
    let (closing, name) = match inner.strip_prefix('/') {
        Some(name) => (true, name),
        None => (false, inner),
    };
    let name = name.trim_end_matches('/').trim();

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let name = name.to_ascii_lowercase();
    if !ALLOWED_TAGS.contains(&name.as_str()) {
        return None;
    }

    Some(match (closing, name.as_str()) {
        (false, "br") => "<br />".to_string(),
        (true, _) => format!("</{}>", name),
        (false, _) => format!("<{}>", name),
    })
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_single_list() {
        let html = markdown_to_html("## Fixes\n- bug A\n- bug B");
        assert_eq!(html, "<h3>Fixes</h3><ul><li>bug A</li><li>bug B</li></ul>");
        assert_eq!(html.matches("<ul>").count(), 1);
        assert_eq!(html.matches("<li>").count(), 2);
    }

    #[test]
    fn test_heading_levels() {
        let html = markdown_to_html("# One\n## Two\n### Three");
        assert_eq!(html, "<h2>One</h2><h3>Two</h3><h4>Three</h4>");
    }

    #[test]
    fn test_separate_list_runs() {
        let html = markdown_to_html("* a\n* b\nbetween\n- c");
        assert_eq!(html, "<ul><li>a</li><li>b</li></ul>between<ul><li>c</li></ul>");
    }

    #[test]
    fn test_text_lines_get_breaks() {
        let html = markdown_to_html("first\r\nsecond\n\nthird");
        assert_eq!(html, "first<br />\nsecond<br />\n<br />\nthird");
    }

    #[test]
    fn test_script_is_escaped() {
        let body = "## Fixes\n- <script>alert(1)</script>\n<img src=x onerror=alert(1)>";
        let html = sanitize_markup(&markdown_to_html(body));
        assert!(!html.contains("<script"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_sanitize_drops_attributes_and_unknown_tags() {
        assert_eq!(
            sanitize_markup("<h3 onclick=\"x()\">t</h3><BR/><iframe>"),
            "&lt;h3 onclick=&quot;x()&quot;&gt;t</h3><br />&lt;iframe&gt;"
        );
        assert_eq!(sanitize_markup("a < b"), "a &lt; b");
    }

    #[test]
    fn test_format_changelog_full() {
        let release = ReleaseData {
            name: Some("Version 1.2.0".into()),
            published_at: Some("2024-03-05T10:00:00Z".into()),
            body: Some("## Fixes\n- bug A\n- bug B".into()),
            ..Default::default()
        };
        let html = format_changelog(&release);
        assert!(html.starts_with("<h3>Version 1.2.0</h3>"));
        assert!(html.contains("<p><strong>Released:</strong> March 5, 2024</p>"));
        assert!(html.contains(
            "<div class=\"fab-changelog-content\"><h3>Fixes</h3><ul><li>bug A</li><li>bug B</li></ul></div>"
        ));
    }

    #[test]
    fn test_format_changelog_without_body() {
        let html = format_changelog(&ReleaseData::default());
        assert_eq!(html, "<p>No changelog available.</p>");
    }

    #[test]
    fn test_release_name_is_escaped() {
        let release = ReleaseData {
            name: Some("<b>1.2</b>".into()),
            ..Default::default()
        };
        assert!(format_changelog(&release).starts_with("<h3>&lt;b&gt;1.2&lt;/b&gt;</h3>"));
    }

    #[test]
    fn test_unparseable_date_kept() {
        assert_eq!(format_release_date("yesterday"), "yesterday");
    }
}
