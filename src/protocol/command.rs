#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    TsParse,
    TsRebuild,
    TsQa,
    TsStats,
    TsLookup,
    TsMerge,
    TsTranslateWithTm,
    TmHarvest,
    LocaleNormalize,
    LocaleResolve,
    DetectEncoding,
    ProjectList,
    ProjectCreate,
    ProjectOpen,
    ProjectSave,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "ts.parse" => Command::TsParse,
            "ts.rebuild" => Command::TsRebuild,
            "ts.qa" => Command::TsQa,
            "ts.stats" => Command::TsStats,
            "ts.lookup" => Command::TsLookup,
            "ts.merge" => Command::TsMerge,
            "ts.translate_with_tm" => Command::TsTranslateWithTm,
            "tm.harvest" => Command::TmHarvest,
            "locale.normalize" => Command::LocaleNormalize,
            "locale.resolve" => Command::LocaleResolve,
            "encoding.detect" | "detect_encoding" => Command::DetectEncoding,
            "project.list" => Command::ProjectList,
            "project.create" => Command::ProjectCreate,
            "project.open" => Command::ProjectOpen,
            "project.save" => Command::ProjectSave,
            _ => Command::Unknown,
        }
    }
}

impl Command {
    pub fn is_project(&self) -> bool {
        matches!(
            self,
            Command::ProjectList
                | Command::ProjectCreate
                | Command::ProjectOpen
                | Command::ProjectSave
        )
    }
}
