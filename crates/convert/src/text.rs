use std::sync::LazyLock;

use bytes::Bytes;
use pulldown_cmark::{Options, Parser, html};
use regex::{Captures, Regex};
use serde_json::{Map, Value};

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>")
        .expect("script/style regex is valid")
});

static BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</?(p|div|h[1-6]|li|ul|ol|tr|table|section|article|header|footer|blockquote|pre)\b[^>]*>")
        .expect("block tag regex is valid")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"));

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+").expect("blank line regex is valid"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([a-zA-Z]+));")
        .expect("entity regex is valid")
});

fn utf8(data: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(data).map_err(|e| format!("source is not valid UTF-8: {e}"))
}

/// Render markdown (with tables and strikethrough) to HTML.
pub(crate) fn markdown_to_html(data: &[u8]) -> Result<Bytes, String> {
    let source = utf8(data)?;
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut rendered = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut rendered, Parser::new_ext(source, options));
    Ok(Bytes::from(rendered))
}

/// Decode named and numeric character references in one pass, so `&amp;lt;`
/// stays `&lt;`. Unknown names are left as written.
fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let code = match (caps.get(1), caps.get(2)) {
                (Some(dec), _) => dec.as_str().parse().ok(),
                (_, Some(hex)) => u32::from_str_radix(hex.as_str(), 16).ok(),
                _ => {
                    let named = match &caps[3] {
                        "nbsp" => " ",
                        "lt" => "<",
                        "gt" => ">",
                        "quot" => "\"",
                        "apos" => "'",
                        "amp" => "&",
                        _ => return caps[0].to_owned(),
                    };
                    return named.to_owned();
                }
            };
            code.and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
                .to_string()
        })
        .into_owned()
}

/// Strip markup from HTML, keeping block boundaries as line breaks.
pub(crate) fn html_to_text(data: &[u8]) -> Result<Bytes, String> {
    let source = utf8(data)?;
    let text = SCRIPT_STYLE_RE.replace_all(source, "");
    let text = BREAK_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");

    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    Ok(Bytes::from(lines.join("\n").trim().to_owned()))
}

/// Parse CSV with a header row into a JSON array of objects.
///
/// Every value is a string. Keys follow header order; fields beyond the
/// header are dropped.
pub(crate) fn csv_to_json(data: &[u8]) -> Result<Bytes, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| format!("invalid CSV header: {e}"))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("invalid CSV row: {e}"))?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.to_owned(), Value::String(value.to_owned())))
            .collect();
        rows.push(Value::Object(row));
    }

    serde_json::to_vec(&rows)
        .map(Bytes::from)
        .map_err(|e| format!("failed to serialize rows: {e}"))
}

fn flatten_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn flatten_element(element: &Value) -> String {
    let values: Vec<String> = match element {
        Value::Object(fields) => fields.values().map(flatten_value).collect(),
        Value::Array(items) => items.iter().map(flatten_value).collect(),
        scalar => vec![flatten_value(scalar)],
    };
    values.join(" ")
}

/// Flatten a JSON array: one line per element, its values joined by a space.
pub(crate) fn json_to_text(data: &[u8]) -> Result<Bytes, String> {
    let parsed: Value =
        serde_json::from_slice(data).map_err(|e| format!("invalid JSON: {e}"))?;
    let Value::Array(elements) = parsed else {
        return Err("expected a JSON array".to_owned());
    };

    let lines: Vec<String> = elements.iter().map(flatten_element).collect();
    Ok(Bytes::from(lines.join("\n")))
}
