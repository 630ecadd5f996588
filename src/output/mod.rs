pub mod report;

use colored::Colorize;
use itertools::Itertools;

use crate::pagination::PageLink;
use crate::view::{FeatureView, PaginationView, SampleGroupView, SampleView, TokenGroupView};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn format_activation(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => "-".to_string(),
    }
}

/// Makes control characters in token text visible on a single line.
pub fn visible_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push('↵'),
            '\r' => out.push('␍'),
            '\t' => out.push('⇥'),
            c if c.is_control() => out.push('·'),
            c => out.push(c),
        }
    }
    out
}

fn highlight_rgb(intensity: f32) -> (u8, u8, u8) {
    let t = intensity.clamp(0.0, 1.0);
    let g = 255.0 - 115.0 * t;
    let b = 255.0 - 255.0 * t;
    (255, g.round() as u8, b.round() as u8)
}

fn render_token_group(group: &TokenGroupView, color: bool) -> String {
    let text = visible_text(&group.text);
    if !color {
        return text;
    }
    if group.undecodable {
        return text.dimmed().strikethrough().to_string();
    }
    if group.intensity <= 0.0 {
        return text;
    }
    let (r, g, b) = highlight_rgb(group.intensity);
    text.black().on_truecolor(r, g, b).to_string()
}

pub fn render_sample_line(sample: &SampleView, color: bool) -> String {
    let label = format!("{}:", sample.name);
    let label = if color {
        label.bold().to_string()
    } else {
        label
    };
    let body: String = sample
        .groups
        .iter()
        .map(|g| render_token_group(g, color))
        .collect();
    format!("{label} {body}")
}

pub fn render_pagination(pagination: &PaginationView, color: bool) -> String {
    let paint = |s: String, enabled: bool| {
        if color && !enabled {
            s.dimmed().to_string()
        } else {
            s
        }
    };
    let links = pagination
        .links
        .iter()
        .map(|link| match link {
            PageLink::Page {
                number,
                active: true,
            } => {
                let s = format!("[{number}]");
                if color {
                    s.bold().cyan().to_string()
                } else {
                    s
                }
            }
            PageLink::Page { number, .. } => number.to_string(),
            PageLink::Ellipsis => "…".to_string(),
        })
        .join(" ");
    format!(
        "{} {} {}  (page {}/{})",
        paint("«".to_string(), pagination.has_previous),
        links,
        paint("»".to_string(), pagination.has_next),
        pagination.current,
        pagination.max_page
    )
}

pub fn render_group_text(group: &SampleGroupView, color: bool) -> String {
    let mut out = String::new();
    if let Some(name) = group.analysis_name.as_deref() {
        let heading = format!("-- {name} --");
        if color {
            out.push_str(&heading.bold().to_string());
        } else {
            out.push_str(&heading);
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "Max Activation: {}\n",
        format_activation(group.max_activation)
    ));
    for sample in &group.samples {
        out.push_str(&render_sample_line(sample, color));
        out.push('\n');
    }
    out.push_str(&render_pagination(&group.pagination, color));
    out.push('\n');
    out
}

pub fn render_text(view: &FeatureView, color: bool) -> Vec<u8> {
    let mut out = String::new();
    let title = format!(
        "== {} (max activation {:.3}) ==",
        view.title, view.max_feature_act
    );
    if color {
        out.push_str(&title.bold().to_string());
    } else {
        out.push_str(&title);
    }
    out.push('\n');
    for group in &view.groups {
        out.push('\n');
        out.push_str(&render_group_text(group, color));
    }
    out.into_bytes()
}

pub fn render_json(view: &FeatureView) -> Vec<u8> {
    serde_json::to_vec_pretty(view).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_html(view: &FeatureView) -> Vec<u8> {
    report::render_html(view)
}

pub fn render(view: &FeatureView, format: OutputFormat, color: bool) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(view, color),
        OutputFormat::Json => render_json(view),
        OutputFormat::Html => render_html(view),
    }
}
