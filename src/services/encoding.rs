use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::warn;

use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub declared: Option<String>,
    pub candidates: Vec<EncodingCandidate>,
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

fn declaration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*<\?xml[^>]*?encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
            .expect("xml declaration regex")
    })
}

/// Encoding label from the `<?xml ... encoding="..."?>` declaration, if any.
pub fn declared_label(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(256)];
    declaration_re()
        .captures(head)
        .map(|c| String::from_utf8_lossy(&c[1]).to_lowercase())
}

pub fn detect_from_file(path: &Path) -> Result<EncodingDetectionResult> {
    let bytes = fs::read(path)?;
    Ok(detect(&bytes))
}

pub fn detect(bytes: &[u8]) -> EncodingDetectionResult {
    let declared = declared_label(bytes);

    if bytes.starts_with(UTF8_BOM) {
        return EncodingDetectionResult {
            best: "utf-8-sig".into(),
            confidence: 0.99,
            declared,
            candidates: vec![
                EncodingCandidate {
                    name: "utf-8-sig".into(),
                    confidence: 0.99,
                },
                EncodingCandidate {
                    name: "utf-8".into(),
                    confidence: 0.90,
                },
            ],
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);

    let encoding = detector.guess(None, true);
    let best = encoding.name().to_lowercase();
    let confidence = estimate_confidence(bytes, encoding);

    let mut candidates = vec![EncodingCandidate {
        name: best.clone(),
        confidence,
    }];

    if let Some(label) = &declared {
        let declared_enc = Encoding::for_label(label.as_bytes());
        if let Some(enc) = declared_enc.filter(|e| *e != encoding) {
            candidates.push(EncodingCandidate {
                name: enc.name().to_lowercase(),
                confidence: estimate_confidence(bytes, enc),
            });
        }
    }

    if best == "utf-8" {
        candidates.push(EncodingCandidate {
            name: "utf-8-sig".into(),
            confidence: (confidence - 0.20).max(0.0),
        });
    }

    EncodingDetectionResult {
        best,
        confidence,
        declared,
        candidates,
    }
}

/// Decodes a TS file. BOM first, then the XML declaration, then strict UTF-8,
/// then a detector guess.
pub fn decode(bytes: &[u8]) -> (String, &'static str) {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return (decode_with(UTF_8, rest), "utf-8-sig");
    }

    if let Some(label) = declared_label(bytes) {
        match Encoding::for_label(label.as_bytes()) {
            Some(enc) => return (decode_with(enc, bytes), enc.name()),
            None => warn!(label = %label, "unknown declared encoding, guessing"),
        }
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return (s.to_string(), UTF_8.name());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    (decode_with(enc, bytes), enc.name())
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(encoding = encoding.name(), "malformed input replaced with U+FFFD");
    }
    text.into_owned()
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = text.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}
