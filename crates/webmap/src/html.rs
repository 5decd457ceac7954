//! HTML page assembly for map documents.

/// Leaflet stylesheet and script.
pub const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
pub const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Fullscreen control plugin.
pub const FULLSCREEN_CSS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.2/Control.FullScreen.css";
pub const FULLSCREEN_JS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.2/Control.FullScreen.min.js";

/// Escape text for an HTML element body or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Encode a value as a JavaScript literal that is safe inside a `<script>` block.
pub fn js_literal(value: &serde_json::Value) -> String {
    // JSON is valid JS; only a closing tag sequence could end the script early.
    value.to_string().replace("</", "<\\/")
}

/// Encode a string as a JavaScript string literal.
pub fn js_string(s: &str) -> String {
    js_literal(&serde_json::Value::String(s.to_string()))
}

pub(crate) struct Page<'a> {
    pub title: &'a str,
    pub element_id: &'a str,
    pub width: &'a str,
    pub height: &'a str,
    pub fullscreen: bool,
    pub script: &'a str,
}

pub(crate) fn render_page(page: &Page<'_>) -> String {
    let mut head_assets = format!(
        "    <link rel=\"stylesheet\" href=\"{}\"/>\n    <script src=\"{}\"></script>\n",
        LEAFLET_CSS, LEAFLET_JS
    );
    if page.fullscreen {
        head_assets.push_str(&format!(
            "    <link rel=\"stylesheet\" href=\"{}\"/>\n    <script src=\"{}\"></script>\n",
            FULLSCREEN_CSS, FULLSCREEN_JS
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
    <title>{title}</title>
{assets}    <style>
        html, body {{ width: 100%; height: 100%; margin: 0; padding: 0; }}
        #{id} {{ position: relative; width: {width}; height: {height}; }}
    </style>
</head>
<body>
    <div class="leaflet-map" id="{id}"></div>
    <script>
{script}    </script>
</body>
</html>
"#,
        title = escape_html(page.title),
        assets = head_assets,
        id = page.element_id,
        width = escape_html(page.width),
        height = escape_html(page.height),
        script = page.script,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"A&B\"</b>"),
            "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_js_string_cannot_close_script() {
        let s = js_string("x</script><script>alert(1)");
        assert!(!s.contains("</script>"));
        assert!(s.starts_with('"') && s.ends_with('"'));
    }

    #[test]
    fn test_js_string_quotes() {
        assert_eq!(js_string("a\"b"), "\"a\\\"b\"");
    }
}
