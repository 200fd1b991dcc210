use crate::format::FormView;
use crate::schema::{legend, FeatureSchema};
use std::fmt::Write;

const HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Exoplanet Classifier</title>
</head>
<body>
"#;

const TAIL: &str = "</body>\n</html>\n";

fn escape(s: &str) -> String {
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

/// Input form: one numeric field per schema feature, with its legend when known.
pub(super) fn index(schema: &FeatureSchema) -> String {
    let mut html = String::from(HEAD);
    html.push_str("<h1>Exoplanet Classifier</h1>\n<form action=\"/predict\" method=\"post\">\n");
    for feature in schema.iter() {
        let name = escape(feature);
        let _ = writeln!(
            html,
            "<p><label for=\"{n}\">{n}</label> <input type=\"number\" step=\"any\" id=\"{n}\" name=\"{n}\" required>",
            n = name
        );
        if let Some(text) = legend(feature) {
            let _ = writeln!(html, "<br><small>{}</small>", escape(text));
        }
        html.push_str("</p>\n");
    }
    html.push_str("<button type=\"submit\">Classify</button>\n</form>\n");
    html.push_str(TAIL);
    html
}

/// Result page: predicted disposition plus the values the model was given.
pub(super) fn result(view: &FormView) -> String {
    let mut html = String::from(HEAD);
    let _ = writeln!(
        html,
        "<h1>Prediction: <span class=\"prediction\">{}</span></h1>",
        escape(&view.prediction)
    );
    html.push_str("<table>\n<tr><th>Feature</th><th>Value</th></tr>\n");
    for (name, value) in &view.system_data {
        let _ = writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", escape(name), value);
    }
    html.push_str("</table>\n<p><a href=\"/\">Classify another</a></p>\n");
    html.push_str(TAIL);
    html
}
