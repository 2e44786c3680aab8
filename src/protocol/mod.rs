use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::model::catalog::TsDocument;
use crate::parsers::ts;
use crate::services::merge::{self, ExtractedMessage, MergeOptions};
use crate::services::translation_memory::{store, TmStore};
use crate::services::project as project_service;
use crate::services::{encoding, locale, lookup, pipeline, qa, rebuild, stats};

mod command;
mod project;

use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

/// `payload.document` (JSON), then `payload.text` (TS XML), then `payload.path`.
fn document_from_payload(payload: &Value) -> Result<TsDocument, String> {
    if let Some(doc) = payload.get("document").filter(|v| !v.is_null()) {
        return serde_json::from_value(doc.clone())
            .map_err(|e| format!("invalid payload.document: {e}"));
    }

    if let Some(text) = payload.get("text").and_then(|v| v.as_str()) {
        return ts::parse(text).map_err(|e| e.to_string());
    }

    let path = get_str(payload, "path");
    if !path.is_empty() {
        let bytes = std::fs::read(path).map_err(|e| format!("failed to read {path}: {e}"))?;
        return ts::parse_bytes(&bytes).map_err(|e| e.to_string());
    }

    Err("payload.document, payload.text or payload.path is required".into())
}

fn tm_path_from_payload(payload: &Value) -> PathBuf {
    match get_str(payload, "tm_path") {
        "" => store::default_path(),
        p => PathBuf::from(p),
    }
}

/// Language pair for TM operations, defaulting to the document's own.
fn lang_pair(payload: &Value, doc: &TsDocument) -> Result<(String, String), String> {
    let source = match get_str(payload, "source_lang") {
        "" => doc.source_language.clone().unwrap_or_else(|| "en".to_string()),
        s => s.to_string(),
    };
    let target = match get_str(payload, "target_lang") {
        "" => doc.language.clone(),
        s => s.to_string(),
    };
    if target.is_empty() {
        return Err("payload.target_lang is required".into());
    }
    Ok((source, target))
}

fn handle_ts(cmd: Command, payload: &Value) -> Result<Value, String> {
    match cmd {
        Command::TsParse => {
            let doc = document_from_payload(payload)?;
            Ok(json!({ "document": doc }))
        }

        Command::TsRebuild => {
            let doc = document_from_payload(payload)?;
            let text = rebuild::rebuild(&doc);
            let path = get_str(payload, "path");
            // a path given alongside a document is the output target
            if !path.is_empty() && payload.get("document").is_some() {
                rebuild::write_file(Path::new(path), &doc).map_err(|e| e.to_string())?;
            }
            Ok(json!({ "text": text }))
        }

        Command::TsQa => {
            let doc = document_from_payload(payload)?;
            Ok(json!({ "issues": qa::run(&doc) }))
        }

        Command::TsStats => {
            let doc = document_from_payload(payload)?;
            Ok(json!({ "stats": stats::collect(&doc) }))
        }

        Command::TsLookup => {
            let doc = document_from_payload(payload)?;
            let context = get_str(payload, "context");
            let source = get_str(payload, "source");
            let comment = payload.get("comment").and_then(|v| v.as_str());

            if source.is_empty() {
                return Err("payload.source is required".into());
            }

            let translator = lookup::Translator::from_document(&doc);
            let found = translator.contains(context, source, comment);

            let text = match payload.get("n").and_then(|v| v.as_i64()) {
                Some(n) => translator.translate_plural(context, source, comment, n),
                None => translator.translate(context, source, comment).into_owned(),
            };

            let args: Vec<String> = payload
                .get("args")
                .and_then(|v| v.as_array())
                .map(|arr| {
                    arr.iter()
                        .map(|a| match a.as_str() {
                            Some(s) => s.to_string(),
                            None => a.to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default();

            let text = if args.is_empty() {
                text
            } else {
                lookup::format(&text, &args)
            };

            Ok(json!({ "text": text, "found": found }))
        }

        Command::TsMerge => {
            let mut doc = document_from_payload(payload)?;
            let messages: Vec<ExtractedMessage> = match payload.get("messages") {
                Some(v) => serde_json::from_value(v.clone())
                    .map_err(|e| format!("invalid payload.messages: {e}"))?,
                None => return Err("payload.messages must be an array".into()),
            };
            let opts = MergeOptions {
                drop_obsolete: payload
                    .get("drop_obsolete")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false),
            };

            let report = merge::merge(&mut doc, &messages, opts);
            Ok(json!({ "document": doc, "report": report }))
        }

        Command::TsTranslateWithTm => {
            let mut doc = document_from_payload(payload)?;
            let (source_lang, target_lang) = lang_pair(payload, &doc)?;
            let mut store = TmStore::open(tm_path_from_payload(payload));

            let cfg = pipeline::PipelineConfig {
                source_lang: &source_lang,
                target_lang: &target_lang,
            };
            let report = pipeline::run(&mut doc, &mut store, cfg).map_err(|e| e.to_string())?;
            Ok(json!({ "document": doc, "report": report }))
        }

        Command::TmHarvest => {
            let doc = document_from_payload(payload)?;
            let (source_lang, target_lang) = lang_pair(payload, &doc)?;
            let mut store = TmStore::open(tm_path_from_payload(payload));

            let added = store.harvest(&doc, &source_lang, &target_lang);
            store.save().map_err(|e| e.to_string())?;
            Ok(json!({ "added": added, "total": store.len() }))
        }

        _ => Err("unknown command".into()),
    }
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    let cmd = Command::from(cmd_str);
    tracing::debug!(cmd = cmd_str, "handling request");

    let result: Result<Value, String> = match cmd {
        Command::Ping => Ok(json!({ "message": "ts-core alive" })),

        Command::LocaleNormalize => {
            let tag = get_str(payload, "tag");
            let loc = locale::bcp47_to_locale(tag);
            let fallbacks = locale::fallback_chain(&loc);
            Ok(json!({ "locale": loc, "fallbacks": fallbacks }))
        }

        Command::LocaleResolve => {
            let project_path = get_str(payload, "project_path");
            if project_path.is_empty() {
                return err(id, "payload.project_path is required");
            }
            project_service::open_project(Path::new(project_path))
                .and_then(|p| locale::resolve_catalog(&p, get_str(payload, "tag")))
                .map(|(path, loc)| json!({ "path": path.to_string_lossy(), "locale": loc }))
                .map_err(|e| e.to_string())
        }

        Command::DetectEncoding => {
            let path_str = get_str(payload, "path");
            if path_str.is_empty() {
                return err(id, "payload.path is required");
            }
            encoding::detect_from_file(Path::new(path_str))
                .map_err(|e| e.to_string())
                .and_then(|r| serde_json::to_value(r).map_err(|e| e.to_string()))
        }

        Command::Unknown => Err("unknown command".into()),

        c if c.is_project() => project::handle(c, payload),

        c => handle_ts(c, payload),
    };

    match result {
        Ok(v) => ok(id, v),
        Err(e) => {
            tracing::warn!(cmd = cmd_str, error = %e, "request failed");
            err(id, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ts::fixtures;

    fn call(cmd: &str, payload: Value) -> Value {
        let req = json!({ "id": 7, "cmd": cmd, "payload": payload }).to_string();
        serde_json::from_str(&handle(&req)).unwrap()
    }

    #[test]
    fn ping_and_unknown() {
        let r = call("ping", json!({}));
        assert_eq!(r["status"], "ok");
        assert_eq!(r["id"], 7);

        let r = call("translate_entries", json!({}));
        assert_eq!(r["status"], "error");
        assert_eq!(r["message"], "unknown command");

        let r: Value = serde_json::from_str(&handle("{oops")).unwrap();
        assert_eq!(r["message"], "invalid json");
    }

    #[test]
    fn parse_then_rebuild_through_json() {
        let parsed = call("ts.parse", json!({ "text": fixtures::ZH_CN }));
        assert_eq!(parsed["status"], "ok");
        let doc = parsed["payload"]["document"].clone();
        assert_eq!(doc["contexts"][2]["messages"][0]["status"], "unfinished");

        let rebuilt = call("ts.rebuild", json!({ "document": doc }));
        assert_eq!(rebuilt["payload"]["text"], fixtures::ZH_CN);
    }

    #[test]
    fn lookup_formats_and_reports_fallback() {
        let r = call(
            "ts.lookup",
            json!({
                "text": fixtures::ZH_CN,
                "context": "UpdateWidget",
                "source": "Found new version: {}",
                "args": ["2.0.1"]
            }),
        );
        assert_eq!(r["payload"]["text"], "发现新版本：2.0.1");
        assert_eq!(r["payload"]["found"], true);

        let r = call(
            "ts.lookup",
            json!({ "text": fixtures::ZH_CN, "context": "UpdateWidget", "source": "Updater" }),
        );
        assert_eq!(r["payload"]["text"], "Updater");
        assert_eq!(r["payload"]["found"], false);
    }

    #[test]
    fn qa_and_stats_on_sample() {
        let r = call("ts.qa", json!({ "text": fixtures::ZH_CN }));
        assert_eq!(r["payload"]["issues"], json!([]));

        let r = call("ts.stats", json!({ "text": fixtures::ZH_CN }));
        assert_eq!(r["payload"]["stats"]["total"]["vanished"], 2);
    }

    #[test]
    fn merge_requires_messages() {
        let r = call("ts.merge", json!({ "text": fixtures::ZH_CN }));
        assert_eq!(r["status"], "error");

        let r = call(
            "ts.merge",
            json!({
                "text": fixtures::ZH_CN,
                "messages": [{ "context": "MainWindow", "source": "Warning" }],
                "drop_obsolete": true
            }),
        );
        assert_eq!(r["payload"]["report"]["removed"], 9);
    }

    #[test]
    fn harvest_and_prefill_share_a_memory_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let tm = dir.path().join("tm.json");
        let tm = tm.to_string_lossy();

        let r = call("tm.harvest", json!({ "text": fixtures::ZH_CN, "tm_path": tm }));
        assert_eq!(r["payload"]["added"], 7);

        let fresh = r#"<TS version="2.1" language="zh_CN">
<context>
    <name>AboutDialog</name>
    <message>
        <source>Cancel</source>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>"#;
        let r = call(
            "ts.translate_with_tm",
            json!({ "text": fresh, "tm_path": tm, "source_lang": "en" }),
        );
        assert_eq!(r["payload"]["report"]["used_tm"], 1);
        assert_eq!(
            r["payload"]["document"]["contexts"][0]["messages"][0]["translation"],
            "取消"
        );
    }

    #[test]
    fn missing_document_is_reported() {
        let r = call("ts.qa", json!({}));
        assert_eq!(r["status"], "error");
        assert!(r["message"].as_str().unwrap().contains("payload.document"));
    }

    #[test]
    fn locale_normalize() {
        let r = call("locale.normalize", json!({ "tag": "zh-Hans-CN" }));
        assert_eq!(r["payload"]["locale"], "zh_CN");
        assert_eq!(r["payload"]["fallbacks"], json!(["zh_CN", "zh"]));
    }
}
