use std::fmt::Write as _;
use std::path::Path;

use quick_xml::escape::escape;
use tracing::debug;

use crate::error::Result;
use crate::model::catalog::{TsContext, TsDocument};
use crate::model::entry::TsMessage;
use crate::services::atomic::write_atomic;

const INDENT: &str = "    ";

/// Serialises `doc` in the layout Qt's lupdate writes, so diffs against
/// tool-generated files stay minimal.
pub fn rebuild(doc: &TsDocument) -> String {
    let mut out = String::with_capacity(256 + doc.message_count() * 160);

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE TS>\n");

    let _ = write!(
        out,
        "<TS version=\"{}\" language=\"{}\"",
        escape_attr(&doc.version),
        escape_attr(&doc.language)
    );
    if let Some(src) = &doc.source_language {
        let _ = write!(out, " sourcelanguage=\"{}\"", escape_attr(src));
    }
    out.push_str(">\n");

    for ctx in &doc.contexts {
        write_context(&mut out, ctx);
    }

    out.push_str("</TS>\n");
    out
}

pub fn write_file(path: &Path, doc: &TsDocument) -> Result<()> {
    let text = rebuild(doc);
    write_atomic(path, text.as_bytes())?;
    debug!(path = %path.display(), messages = doc.message_count(), "wrote ts file");
    Ok(())
}

fn write_context(out: &mut String, ctx: &TsContext) {
    out.push_str("<context>\n");
    leaf(out, 1, "name", &ctx.name);
    if let Some(c) = &ctx.comment {
        leaf(out, 1, "comment", c);
    }

    for msg in &ctx.messages {
        write_message(out, msg);
    }

    out.push_str("</context>\n");
}

fn write_message(out: &mut String, msg: &TsMessage) {
    indent(out, 1);
    if msg.numerus {
        out.push_str("<message numerus=\"yes\">\n");
    } else {
        out.push_str("<message>\n");
    }

    for loc in &msg.locations {
        indent(out, 2);
        let _ = write!(out, "<location filename=\"{}\"", escape_attr(&loc.filename));
        if let Some(line) = loc.line {
            let _ = write!(out, " line=\"{line}\"");
        }
        out.push_str("/>\n");
    }

    leaf(out, 2, "source", &msg.source);
    if let Some(c) = &msg.comment {
        leaf(out, 2, "comment", c);
    }
    if let Some(c) = &msg.extra_comment {
        leaf(out, 2, "extracomment", c);
    }
    if let Some(c) = &msg.translator_comment {
        leaf(out, 2, "translatorcomment", c);
    }

    indent(out, 2);
    out.push_str("<translation");
    if let Some(t) = msg.status.as_type_attr() {
        let _ = write!(out, " type=\"{t}\"");
    }
    out.push('>');

    if msg.numerus {
        out.push('\n');
        for form in &msg.numerus_forms {
            leaf(out, 3, "numerusform", form);
        }
        indent(out, 2);
    } else {
        out.push_str(&escape_text(&msg.translation));
    }
    out.push_str("</translation>\n");

    indent(out, 1);
    out.push_str("</message>\n");
}

fn leaf(out: &mut String, depth: usize, tag: &str, text: &str) {
    indent(out, depth);
    let _ = writeln!(out, "<{tag}>{}</{tag}>", escape_text(text));
}

/// Element text. Control characters XML cannot carry go out as `<byte>`, which
/// is how lupdate writes them and what the parser reads back.
fn escape_text(text: &str) -> String {
    let escaped = escape(text);
    if !escaped.chars().any(is_xml_forbidden) {
        return escaped.into_owned();
    }

    let mut out = String::with_capacity(escaped.len() + 16);
    for ch in escaped.chars() {
        if is_xml_forbidden(ch) {
            let _ = write!(out, "<byte value=\"x{:x}\"/>", ch as u32);
        } else {
            out.push(ch);
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    // attribute values are whitespace-normalised on read unless referenced
    escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

fn is_xml_forbidden(ch: char) -> bool {
    matches!(ch, '\u{1}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}')
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
