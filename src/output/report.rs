use crate::output::format_activation;
use crate::pagination::PageLink;
use crate::view::{FeatureView, SampleGroupView, SampleView, TokenGroupView};

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_token_group(out: &mut String, group: &TokenGroupView) {
    let title = group
        .tokens
        .iter()
        .map(|t| format!("{:?} → {:.3}", t.bytes, t.feature_act))
        .collect::<Vec<_>>()
        .join("\n");
    let class = if group.undecodable {
        "token pending"
    } else {
        "token"
    };
    out.push_str(&format!(
        r#"<span class="{class}" style="background-color: rgba(255, 140, 0, {:.3})" title="{}">{}</span>"#,
        group.intensity,
        escape_html(&title),
        escape_html(&group.text)
    ));
}

fn render_sample(out: &mut String, sample: &SampleView) {
    out.push_str("      <div class=\"sample\">");
    out.push_str(&format!(
        "<span class=\"sample-name\">{}: </span>",
        escape_html(&sample.name)
    ));
    for group in &sample.groups {
        render_token_group(out, group);
    }
    out.push_str("</div>\n");
}

fn render_group(out: &mut String, group: &SampleGroupView) {
    out.push_str("    <section class=\"sample-group\">\n");
    if let Some(name) = group.analysis_name.as_deref() {
        out.push_str(&format!("      <h2>{}</h2>\n", escape_html(name)));
    }
    out.push_str(&format!(
        "      <p class=\"max-act\">Max Activation: {}</p>\n",
        format_activation(group.max_activation)
    ));
    for sample in &group.samples {
        render_sample(out, sample);
    }
    out.push_str("      <nav class=\"pagination\">");
    for link in &group.pagination.links {
        match link {
            PageLink::Page { number, active } => {
                let class = if *active { "page active" } else { "page" };
                out.push_str(&format!("<span class=\"{class}\">{number}</span>"));
            }
            PageLink::Ellipsis => out.push_str("<span class=\"ellipsis\">…</span>"),
        }
    }
    out.push_str(&format!(
        "<span class=\"summary\">{} samples</span></nav>\n",
        group.total_samples
    ));
    out.push_str("    </section>\n");
}

pub fn render_html(view: &FeatureView) -> Vec<u8> {
    let title = escape_html(&view.title);
    let mut body = String::new();
    for group in &view.groups {
        render_group(&mut body, group);
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <title>{title}</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; }}
    .sample {{ margin: 0.5rem 0; font-family: monospace; white-space: pre-wrap; }}
    .sample-name {{ color: #374151; font-weight: bold; }}
    .token.pending {{ text-decoration: line-through; color: #9ca3af; }}
    .max-act {{ font-weight: bold; }}
    .pagination span {{ margin-right: 0.5rem; }}
    .pagination .active {{ font-weight: bold; text-decoration: underline; }}
  </style>
</head>
<body>
  <main>
    <h1>{title}</h1>
    <p>Max feature activation: {max_act:.3}</p>
{body}  </main>
</body>
</html>
"#,
        max_act = view.max_feature_act,
    );
    html.into_bytes()
}
