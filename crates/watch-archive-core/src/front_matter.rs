use std::fmt::Write;
use watch_archive_models::ResolvedRecord;

const FENCE: &str = "---";

/// Render a record as a front-matter block.
///
/// Key order is fixed. Scalars are double-quoted and lists use flow style,
/// so the block is valid YAML whatever the titles contain.
pub fn render(record: &ResolvedRecord) -> String {
    let mut out = String::with_capacity(512);
    out.push_str(FENCE);
    out.push('\n');
    scalar(&mut out, "title", &record.title);
    scalar(&mut out, "year", &record.year);
    scalar(&mut out, "date", &record.watched_date.format("%Y-%m-%d").to_string());
    list(&mut out, "theaters", &record.theaters);
    scalar(&mut out, "rating", &record.local_rating);
    list(&mut out, "remark", &record.remark);
    scalar(&mut out, "imdb_id", &record.external_id);
    scalar(&mut out, "cover", &record.cover_url);
    scalar(&mut out, "douban_url", &record.detail_url);
    out.push_str(FENCE);
    out.push('\n');
    out
}

fn scalar(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "{}: {}", key, quote(value));
}

fn list(out: &mut String, key: &str, values: &[String]) {
    let items: Vec<String> = values.iter().map(|v| quote(v)).collect();
    let _ = writeln!(out, "{}: [{}]", key, items.join(", "));
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' | '\r' => quoted.push(' '),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
