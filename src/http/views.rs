//! View responses.
//!
//! Every matched view is served the same HTML page (the console renders
//! client-side); the server only tells it which view matched, the path
//! params and the backend base URL resolved for the host the browser used.

use url::Url;

use crate::routing::matcher::Params;
use crate::routing::View;

pub const VIEW_META: &str = "grid-console-view";
pub const PARAMS_META: &str = "grid-console-params";
pub const API_BASE_META: &str = "grid-console-api-base";

const BUILTIN_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Grid Console</title>
</head>
<body>
<div id="app"></div>
</body>
</html>
"#;

/// Render the page for `view`, injecting meta tags before `</head>`.
///
/// `template` replaces the built-in shell; without a `</head>` the tags are
/// prepended.
pub fn render_shell(template: Option<&str>, view: View, params: &Params, api_base: &Url) -> String {
    let template = template.unwrap_or(BUILTIN_SHELL);

    let params_json = serde_json::Value::Object(
        params
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect(),
    )
    .to_string();

    let tags = format!(
        "<meta name=\"{}\" content=\"{}\">\n<meta name=\"{}\" content=\"{}\">\n<meta name=\"{}\" content=\"{}\">\n",
        VIEW_META,
        view.name(),
        PARAMS_META,
        escape_attr(&params_json),
        API_BASE_META,
        escape_attr(api_base.as_str()),
    );

    match template.find("</head>") {
        Some(pos) => {
            let mut page = String::with_capacity(template.len() + tags.len());
            page.push_str(&template[..pos]);
            page.push_str(&tags);
            page.push_str(&template[pos..]);
            page
        }
        None => format!("{}{}", tags, template),
    }
}

fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
