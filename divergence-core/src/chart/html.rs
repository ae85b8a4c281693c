//! Standalone HTML output for a figure.

use super::figure::Figure;
use std::path::Path;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Render a self-contained page that draws `figure` with plotly.js.
pub fn render_html(figure: &Figure, page_title: &str) -> Result<String, serde_json::Error> {
    // `</` inside the inline script would let label text close the script tag.
    let data = serde_json::to_string(&figure.data)?.replace("</", "<\\/");
    let layout = serde_json::to_string(&figure.layout)?.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
<script src="{PLOTLY_CDN}" charset="utf-8"></script>
<style>html, body {{ margin: 0; height: 100%; }} #divergence-chart {{ width: 100%; height: 100%; }}</style>
</head>
<body>
<div id="divergence-chart"></div>
<script type="text/javascript">
Plotly.newPlot("divergence-chart", {data}, {layout}, {{"responsive": true}});
</script>
</body>
</html>
"#,
        title = escape_text(page_title),
    ))
}

/// Write the rendered page to `path`, creating parent directories.
pub fn write_html(path: &Path, html: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
}

/// Strip markup from a plotly title and escape it for the `<title>` element.
fn escape_text(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '&' => plain.push_str("&amp;"),
            '>' => plain.push_str("&gt;"),
            '"' => plain.push_str("&quot;"),
            _ => plain.push(c),
        }
    }
    plain
}
