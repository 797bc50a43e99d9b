//! The fixed HTML shell and stylesheet wrapped around every rendered document.
//!
//! The look is GitHub's: system sans-serif body, ruled `h1`/`h2`, grey code
//! panels, striped tables and a left-ruled blockquote. It is deliberately not
//! configurable.

/// Stylesheet embedded in every document.
pub const STYLESHEET: &str = r#"
@page { size: A4; margin: 18mm 16mm; }
body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
    font-size: 16px;
    line-height: 1.6;
    padding: 30px;
    color: #24292e;
    max-width: 900px;
    margin: 0 auto;
}
h1, h2, h3, h4, h5, h6 {
    margin-top: 24px;
    margin-bottom: 16px;
    font-weight: 600;
    line-height: 1.25;
}
h1 { font-size: 2em; border-bottom: 1px solid #eaecef; padding-bottom: .3em; }
h2 { font-size: 1.5em; border-bottom: 1px solid #eaecef; padding-bottom: .3em; }
h3 { font-size: 1.25em; }
h4 { font-size: 1em; }
p, blockquote, ul, ol, table, pre { margin-top: 0; margin-bottom: 16px; }
a { color: #0366d6; text-decoration: none; }
code {
    font-family: "SFMono-Regular", Consolas, "Liberation Mono", Menlo, monospace;
    padding: 0.2em 0.4em;
    margin: 0;
    font-size: 85%;
    background-color: rgba(27, 31, 35, 0.05);
    border-radius: 3px;
}
pre {
    padding: 16px;
    overflow: auto;
    line-height: 1.45;
    background-color: #f6f8fa;
    border-radius: 3px;
}
pre code {
    display: block;
    padding: 0;
    font-size: 85%;
    background-color: transparent;
    white-space: pre-wrap;
    word-wrap: break-word;
}
table {
    border-collapse: collapse;
    width: 100%;
}
table th, table td {
    padding: 6px 13px;
    border: 1px solid #dfe2e5;
}
table th { font-weight: 600; }
table tr {
    background-color: #fff;
    border-top: 1px solid #c6cbd1;
}
table tr:nth-child(2n) {
    background-color: #f6f8fa;
}
img {
    max-width: 100%;
    box-sizing: border-box;
}
blockquote {
    padding: 0 1em;
    color: #6a737d;
    border-left: 0.25em solid #dfe2e5;
}
hr {
    height: 0.25em;
    padding: 0;
    margin: 24px 0;
    background-color: #e1e4e8;
    border: 0;
}
ul.contains-task-list { list-style: none; padding-left: 1.2em; }
dl dt { font-weight: 600; margin-top: 16px; }
dl dd { margin: 0 0 16px; padding: 0 16px; }
.footnotes { font-size: 85%; color: #6a737d; }
"#;

/// Wrap an HTML `body` fragment into a complete, self-contained document.
///
/// `highlight_css` is the class stylesheet for syntax-highlighted code spans.
pub fn wrap_document(title: &str, body: &str, highlight_css: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
<html>\n\
<head>\n\
<meta charset=\"utf-8\">\n\
<title>{title}</title>\n\
<style>\n{STYLESHEET}\n{highlight_css}\n</style>\n\
</head>\n\
<body>\n\
{body}\n\
</body>\n\
</html>\n",
        title = escape_html(title),
    )
}

/// Escape the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
