//! Clause template interpolation.
//!
//! A template is plain text containing `{{field:PATH}}` placeholders,
//! optionally with a formatter (`{{field:gift:amount:formattedAmount}}`)
//! and a fallback (`{{field:nickname|no nickname}}`). Substitution never
//! fails: unresolved paths render as the fallback or as nothing.

use serde_json::Value;

use crate::answers::AnswerStore;
use crate::diagnostics::Diagnostics;
use crate::numeric;
use crate::path::FieldPath;
use crate::value::{is_truthy, scalar_text};

const OPEN: &str = "{{field:";
const CLOSE: &str = "}}";

/// Person attributes shown, in order, when a list entry has no `fullDetails`.
const LIST_ENTRY_KEYS: [&str; 5] = ["relationship", "fullName", "email", "partnerAddress", "address"];

/// A named formatter applied to a resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    /// Amount as `£1,234.50`.
    FormattedAmount,
    /// List items joined with ` and `.
    SelectedPurposes,
    /// Any other name; renders the value unformatted.
    Other(String),
}

impl Format {
    pub fn parse(name: &str) -> Format {
        match name {
            "formattedAmount" => Format::FormattedAmount,
            "selectedPurposes" => Format::SelectedPurposes,
            other => Format::Other(other.to_string()),
        }
    }

    pub fn is_known(name: &str) -> bool {
        !matches!(Format::parse(name), Format::Other(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Format::FormattedAmount => "formattedAmount",
            Format::SelectedPurposes => "selectedPurposes",
            Format::Other(s) => s,
        }
    }
}

/// One parsed `{{field:..}}` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Text between `{{field:` and `}}`.
    pub raw: String,
    pub path: FieldPath,
    pub format: Option<Format>,
    pub fallback: Option<String>,
}

enum Piece<'a> {
    Text(&'a str),
    Token(Placeholder),
}

fn scan(template: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        if let Some(end) = after.find('}') {
            if after[end..].starts_with(CLOSE) {
                if let Some(ph) = parse_body(&after[..end]) {
                    if start > 0 {
                        pieces.push(Piece::Text(&rest[..start]));
                    }
                    pieces.push(Piece::Token(ph));
                    rest = &after[end + CLOSE.len()..];
                    continue;
                }
            }
        }
        // not a token; keep the braces literally
        pieces.push(Piece::Text(&rest[..start + 2]));
        rest = &rest[start + 2..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }
    pieces
}

fn parse_body(body: &str) -> Option<Placeholder> {
    let (path_part, fallback) = match body.split_once('|') {
        Some((p, f)) => (p, Some(f.to_string())),
        None => (body, None),
    };
    let path_part = path_part.trim();
    let (path_text, format) = match path_part.rsplit_once(':') {
        Some((head, last))
            if Format::is_known(last.trim()) || path_part.matches(':').count() == 2 =>
        {
            (head, Some(Format::parse(last.trim())))
        }
        _ => (path_part, None),
    };
    let path = FieldPath::parse(path_text)?;
    Some(Placeholder {
        raw: body.to_string(),
        path,
        format,
        fallback,
    })
}

/// All placeholders of a template, in order.
pub fn placeholders(template: &str) -> Vec<Placeholder> {
    scan(template)
        .into_iter()
        .filter_map(|p| match p {
            Piece::Token(ph) => Some(ph),
            Piece::Text(_) => None,
        })
        .collect()
}

/// Substitute every placeholder in `template`.
pub fn render(template: &str, answers: &AnswerStore) -> String {
    render_traced(template, answers, &mut Diagnostics::new())
}

/// Render a template given as JSON. Anything but a string renders empty.
pub fn render_value(template: &Value, answers: &AnswerStore) -> String {
    render_value_traced(template, answers, &mut Diagnostics::new())
}

/// Like [`render_value`], recording into `diag`.
pub fn render_value_traced(template: &Value, answers: &AnswerStore, diag: &mut Diagnostics) -> String {
    match template {
        Value::String(t) => render_traced(t, answers, diag),
        _ => String::new(),
    }
}

/// Like [`render`], recording unresolved paths and unknown formatters.
pub fn render_traced(template: &str, answers: &AnswerStore, diag: &mut Diagnostics) -> String {
    let mut out = String::with_capacity(template.len());
    for piece in scan(template) {
        match piece {
            Piece::Text(t) => out.push_str(t),
            Piece::Token(ph) => out.push_str(&substitute(&ph, answers, diag)),
        }
    }
    out
}

fn substitute(ph: &Placeholder, answers: &AnswerStore, diag: &mut Diagnostics) -> String {
    let text = match ph.path.resolve(answers) {
        Some(v) => ph
            .format
            .as_ref()
            .and_then(|f| apply_format(f, &v, diag))
            .unwrap_or_else(|| display_value(&v)),
        None => {
            tracing::debug!(path = %ph.path, "placeholder path did not resolve");
            diag.record_unresolved(&ph.path.dotted());
            String::new()
        }
    };
    if text.is_empty() {
        ph.fallback.clone().unwrap_or_default()
    } else {
        text
    }
}

// `None` when the formatter does not apply to the value.
fn apply_format(format: &Format, v: &Value, diag: &mut Diagnostics) -> Option<String> {
    match format {
        Format::FormattedAmount => numeric::parse_amount(v).map(numeric::format_gbp),
        Format::SelectedPurposes => v.as_array().map(|items| {
            items
                .iter()
                .map(scalar_text)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" and ")
        }),
        Format::Other(name) => {
            diag.record_unknown_format(name);
            None
        }
    }
}

/// Display text for a resolved answer.
///
/// - lists: each entry's display text, empties dropped, joined with `; `
/// - objects: `fullDetails`, else `value`, else the non-blank string
///   attributes joined with a space
/// - scalars: their text; `null` is empty
pub fn display_value(v: &Value) -> String {
    match v {
        Value::Array(items) => items
            .iter()
            .map(display_list_entry)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(map) => {
            if let Some(fd) = map.get("fullDetails").filter(|x| is_truthy(x)) {
                return scalar_text(fd);
            }
            if let Some(val) = map.get("value").filter(|x| is_truthy(x)) {
                return scalar_text(val);
            }
            map.values()
                .filter_map(|x| x.as_str())
                .filter(|s| !s.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        }
        other => scalar_text(other),
    }
}

fn display_list_entry(item: &Value) -> String {
    match item {
        Value::Object(map) => {
            if let Some(fd) = map.get("fullDetails").filter(|x| is_truthy(x)) {
                return scalar_text(fd);
            }
            LIST_ENTRY_KEYS
                .iter()
                .filter_map(|k| map.get(*k))
                .filter(|x| is_truthy(x))
                .map(scalar_text)
                .collect::<Vec<_>>()
                .join(" | ")
        }
        other => scalar_text(other),
    }
}

/// Whether `text` still contains a `{{...}}` pair with content, i.e. a
/// placeholder that was not substituted.
pub fn has_unresolved_placeholder(text: &str) -> bool {
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        if let Some(end) = after.find(CLOSE) {
            if !after[..end].trim().is_empty() {
                return true;
            }
        }
        rest = after;
    }
    false
}
