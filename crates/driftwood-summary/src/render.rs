use serde::Serialize;
use tera::{Context, Tera};

use crate::error::SummaryError;
use crate::summary::AdminSummary;

const TEXT_TEMPLATE: &str = r#"{% if errors | length > 0 -%}
Errors:
{% for item in errors -%}
- {{ item }}
{% endfor -%}
{% endif -%}
{% if completed | length > 0 -%}
Download:
{% for name in completed -%}
- {{ name }}
{% endfor -%}
{% endif -%}
{% if ifsp_download_needed | length > 0 -%}
Download IFSP:
{% for name in ifsp_download_needed -%}
- {{ name }}
{% endfor -%}
{% endif -%}
{% if ignoring | length > 0 -%}
Check on ignoring:
{% for name in ignoring -%}
- {{ name }}
{% endfor -%}
{% endif -%}
{% if failed | length > 0 -%}
Failed to message:
{% for item in failed -%}
- {{ item.name }} ({{ item.reason }})
{% endfor -%}
{% endif -%}
{% if call | length > 0 -%}
Call:
{% for item in call -%}
- {{ item.name }} ({{ item.detail }})
{% endfor -%}
{% endif -%}
"#;

const HTML_TEMPLATE: &str = r#"{% if errors | length > 0 -%}
<h2>Errors</h2><ul>{% for item in errors %}<li>{{ item }}</li>{% endfor %}</ul>
{% endif -%}
{% if completed | length > 0 -%}
<h2>Download</h2><ul>{% for name in completed %}<li>{{ name }}</li>{% endfor %}</ul>
{% endif -%}
{% if ifsp_download_needed | length > 0 -%}
<h2>Download IFSP</h2><ul>{% for name in ifsp_download_needed %}<li>{{ name }}</li>{% endfor %}</ul>
{% endif -%}
{% if ignoring | length > 0 -%}
<h2>Check on ignoring</h2><ul>{% for name in ignoring %}<li>{{ name }}</li>{% endfor %}</ul>
{% endif -%}
{% if failed | length > 0 -%}
<h2>Failed to message</h2><ul>{% for item in failed %}<li>{{ item.name }} ({{ item.reason }})</li>{% endfor %}</ul>
{% endif -%}
{% if call | length > 0 -%}
<h2>Call</h2><ul>{% for item in call %}<li>{{ item.name }} ({{ item.detail }})</li>{% endfor %}</ul>
{% endif -%}
"#;

/// Plain-text and HTML bodies of the admin email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSummary {
    pub text: String,
    pub html: String,
}

#[derive(Serialize)]
struct CallLine<'a> {
    name: &'a str,
    detail: String,
}

/// Render both bodies. Sections with no entries are left out entirely, so
/// an empty summary renders as two empty strings.
pub fn render_summary(summary: &AdminSummary) -> Result<RenderedSummary, SummaryError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("summary.txt", TEXT_TEMPLATE),
        ("summary.html", HTML_TEMPLATE),
    ])
    .map_err(|e| SummaryError::TemplateParse(e.to_string()))?;

    let call: Vec<CallLine<'_>> = summary
        .call
        .iter()
        .map(|entry| CallLine {
            name: entry.name(),
            detail: entry.detail(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("errors", &summary.errors);
    context.insert("completed", &summary.completed);
    context.insert("ifsp_download_needed", &summary.ifsp_download_needed);
    context.insert("ignoring", &summary.ignoring);
    context.insert("failed", &summary.failed);
    context.insert("call", &call);

    Ok(RenderedSummary {
        text: tera.render("summary.txt", &context)?,
        html: tera.render("summary.html", &context)?,
    })
}
