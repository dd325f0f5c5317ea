pub mod analysis;
pub mod config;
pub mod error;
pub mod rules;
pub mod view;

pub use analysis::{
    analysis_schema, parse_analysis, AnalysisResult, RecommendedAction, Risk, RiskLevel, Tactic,
};
pub use config::DecoderConfig;
pub use error::{AnalysisError, ClipboardError, RuleValidationError, StoreError, StoreResult};
pub use rules::{
    new_rule_id, JsonFileBackend, MemoryBackend, Mutation, Rule, RuleBackend, RuleDraft, RuleStore,
};
pub use view::{Clipboard, CopyOutcome, ResultView, Tab};

/// Open the on-disk rulebook described by `config`.
pub fn open_rulebook(config: &DecoderConfig) -> StoreResult<RuleStore<JsonFileBackend>> {
    RuleStore::open(JsonFileBackend::new(config.rules_path()))
}

/// Like [`open_rulebook`], but an unreadable file is moved aside and the
/// session starts with an empty rulebook.
pub fn open_rulebook_or_recover(
    config: &DecoderConfig,
) -> StoreResult<RuleStore<JsonFileBackend>> {
    RuleStore::open_or_quarantine(JsonFileBackend::new(config.rules_path()))
}
