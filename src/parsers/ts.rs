use roxmltree::{Document, Node, ParsingOptions};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::model::catalog::{TsContext, TsDocument};
use crate::model::entry::{Location, TranslationStatus, TsMessage};
use crate::services::encoding;

pub fn parse(text: &str) -> Result<TsDocument> {
    // lupdate always writes `<!DOCTYPE TS>`, which roxmltree refuses by default
    let mut opts = ParsingOptions::default();
    opts.allow_dtd = true;

    let xml = Document::parse_with_options(text, opts).map_err(|e| {
        let pos = e.pos();
        CoreError::Xml {
            line: pos.row as usize,
            column: pos.col as usize,
            message: e.to_string(),
        }
    })?;

    let root = xml.root_element();
    if !root.has_tag_name("TS") {
        return Err(CoreError::Format(format!(
            "root element must be <TS>, found <{}>",
            root.tag_name().name()
        )));
    }

    let mut doc = TsDocument {
        version: root.attribute("version").unwrap_or("2.1").to_string(),
        language: root.attribute("language").unwrap_or("").to_string(),
        source_language: root.attribute("sourcelanguage").map(str::to_string),
        contexts: Vec::new(),
    };

    for ctx_el in children_named(root, "context") {
        doc.contexts.push(parse_context(ctx_el)?);
    }

    debug!(
        language = %doc.language,
        contexts = doc.contexts.len(),
        messages = doc.message_count(),
        "parsed ts document"
    );

    Ok(doc)
}

pub fn parse_bytes(bytes: &[u8]) -> Result<TsDocument> {
    let (text, encoding) = encoding::decode(bytes);
    debug!(encoding, "decoded ts bytes");
    parse(&text)
}

fn children_named<'a, 'input: 'a>(
    el: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    el.children().filter(move |n| n.has_tag_name(name))
}

fn child<'a, 'input>(el: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    el.children().find(|n| n.has_tag_name(name))
}

/// 1-based source line of `el`, for error messages only.
fn line_of(el: Node) -> u32 {
    el.document().text_pos_at(el.range().start).row
}

fn parse_context(el: Node) -> Result<TsContext> {
    let name = match child(el, "name") {
        Some(n) => element_text(n)?,
        None => {
            return Err(CoreError::Format(format!(
                "<context> without <name> at line {}",
                line_of(el)
            )))
        }
    };

    let comment = child(el, "comment").map(element_text).transpose()?;

    let mut messages = Vec::new();
    for msg_el in children_named(el, "message") {
        messages.push(parse_message(msg_el)?);
    }

    Ok(TsContext {
        name,
        comment,
        messages,
    })
}

fn parse_message(el: Node) -> Result<TsMessage> {
    let source = match child(el, "source") {
        Some(s) => element_text(s)?,
        None => {
            return Err(CoreError::Format(format!(
                "<message> without <source> at line {}",
                line_of(el)
            )))
        }
    };

    let numerus = el.attribute("numerus") == Some("yes");

    let mut msg = TsMessage {
        source,
        numerus,
        ..Default::default()
    };

    for node in el.children().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "location" => msg.locations.push(parse_location(node)?),
            "comment" => msg.comment = Some(element_text(node)?),
            "extracomment" => msg.extra_comment = Some(element_text(node)?),
            "translatorcomment" => msg.translator_comment = Some(element_text(node)?),
            "translation" => {
                let kind = node.attribute("type");
                msg.status = TranslationStatus::from_type_attr(kind).ok_or_else(|| {
                    CoreError::Format(format!(
                        "unknown translation type {:?} at line {}",
                        kind.unwrap_or_default(),
                        line_of(node)
                    ))
                })?;

                if numerus {
                    for form in children_named(node, "numerusform") {
                        msg.numerus_forms.push(element_text(form)?);
                    }
                } else {
                    msg.translation = element_text(node)?;
                }
            }
            // source is read above; everything else (userdata, oldsource, ...) is skipped
            _ => {}
        }
    }

    Ok(msg)
}

fn parse_location(el: Node) -> Result<Location> {
    let filename = el.attribute("filename").unwrap_or("").to_string();

    let line = match el.attribute("line") {
        // lupdate's relative form (`line="+3"`) needs the previous location to resolve
        Some(raw) if raw.trim_start().starts_with(['+', '-']) => {
            return Err(CoreError::Format(format!(
                "relative location line {raw:?} at line {} is not supported",
                line_of(el)
            )))
        }
        Some(raw) => Some(raw.trim().parse::<u32>().map_err(|_| {
            CoreError::Format(format!(
                "invalid location line {raw:?} at line {}",
                line_of(el)
            ))
        })?),
        None => None,
    };

    Ok(Location { filename, line })
}

/// Text content with `<byte value=".."/>` escapes resolved.
fn element_text(el: Node) -> Result<String> {
    let mut out = String::new();

    for node in el.children() {
        if node.is_text() {
            out.push_str(node.text().unwrap_or(""));
        } else if node.has_tag_name("byte") {
            let raw = node.attribute("value").unwrap_or("");
            let code = match raw.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => raw.parse::<u32>().ok(),
            };
            let ch = code.and_then(char::from_u32).ok_or_else(|| {
                CoreError::Format(format!(
                    "invalid <byte value={raw:?}> at line {}",
                    line_of(node)
                ))
            })?;
            out.push(ch);
        }
    }

    Ok(out)
}
