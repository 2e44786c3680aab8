use serde::Serialize;

use crate::model::catalog::TsDocument;
use crate::model::entry::TranslationStatus;

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct StatusCounts {
    pub finished: usize,
    pub unfinished: usize,
    pub vanished: usize,
    pub obsolete: usize,
    pub completion: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ContextStats {
    pub name: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CatalogStats {
    pub language: String,
    pub total: StatusCounts,
    pub contexts: Vec<ContextStats>,
}

impl StatusCounts {
    fn add(&mut self, status: TranslationStatus) {
        match status {
            TranslationStatus::Finished => self.finished += 1,
            TranslationStatus::Unfinished => self.unfinished += 1,
            TranslationStatus::Vanished => self.vanished += 1,
            TranslationStatus::Obsolete => self.obsolete += 1,
        }
    }

    fn finish(&mut self) {
        let active = self.finished + self.unfinished;
        self.completion = if active == 0 {
            1.0
        } else {
            self.finished as f64 / active as f64
        };
    }
}

pub fn collect(doc: &TsDocument) -> CatalogStats {
    let mut total = StatusCounts::default();
    let mut contexts = Vec::with_capacity(doc.contexts.len());

    for ctx in &doc.contexts {
        let mut counts = StatusCounts::default();
        for m in &ctx.messages {
            counts.add(m.status);
            total.add(m.status);
        }
        counts.finish();
        contexts.push(ContextStats {
            name: ctx.name.clone(),
            counts,
        });
    }
    total.finish();

    CatalogStats {
        language: doc.language.clone(),
        total,
        contexts,
    }
}
