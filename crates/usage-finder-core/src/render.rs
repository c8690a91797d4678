//! HTML rendering of usage examples for a read-only viewer

use crate::error::FinderResult;
use crate::usage::UsageExample;

/// Escape text for use in HTML content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render an example as a linked code block, one `<code>` element per line
/// so a stylesheet can number them from `line_number`
pub fn code_sample_html(example: &UsageExample) -> String {
    let code = format!(
        "<code>{}</code>",
        escape_html(&example.code).replace('\n', "</code>\n<code>")
    );

    format!(
        concat!(
            "<div class=\"code-sample\">\n",
            "<a href=\"{url}\">{path}:{line}</a>\n",
            "<pre style=\"counter-reset: line {offset}\">{code}</pre>\n",
            "</div>"
        ),
        url = escape_html(&example.github_url),
        path = escape_html(&example.path),
        line = example.line_number,
        offset = example.line_number.saturating_sub(1),
        code = code,
    )
}

/// Render a `usage_example` column value stored as JSON text
pub fn render_cell(value: &str) -> FinderResult<String> {
    let example: UsageExample = serde_json::from_str(value)?;
    Ok(code_sample_html(&example))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinderError;

    fn example() -> UsageExample {
        UsageExample {
            github_url: "https://github.com/hmrc/a/blob/abc/app/views/A.scala.html#L7-L8".to_string(),
            line_number: 7,
            code: "button(Button(\n  content = Text(\"<b>Go</b>\")))".to_string(),
            path: "app/views/A.scala.html".to_string(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">it's & more</a>"#),
            "&lt;a href=&quot;x&quot;&gt;it&#x27;s &amp; more&lt;/a&gt;"
        );
    }

    #[test]
    fn test_each_line_gets_its_own_code_element() {
        let html = code_sample_html(&example());
        assert!(html.contains("<code>button(Button(</code>\n<code>  content = Text(&quot;&lt;b&gt;Go&lt;/b&gt;&quot;)))</code>"));
        assert!(html.contains(r#"<a href="https://github.com/hmrc/a/blob/abc/app/views/A.scala.html#L7-L8">app/views/A.scala.html:7</a>"#));
        assert!(html.contains("counter-reset: line 6"));
    }

    #[test]
    fn test_render_cell() {
        let value = serde_json::to_string(&example()).unwrap();
        assert_eq!(render_cell(&value).unwrap(), code_sample_html(&example()));
    }

    #[test]
    fn test_render_cell_rejects_other_json() {
        assert!(matches!(render_cell("[1,2]"), Err(FinderError::Json(_))));
    }
}
