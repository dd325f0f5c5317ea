//! The rulebook: user-defined community guidelines and their persisted store.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RuleValidationError, StoreError, StoreResult};

/// Action label used when a draft leaves it blank.
pub const DEFAULT_ACTION: &str = "warn";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Free-form label such as "warn", "timeout" or "ban".
    pub default_action: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl Rule {
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        check_fields(&self.title, &self.description)
    }
}

/// A rule being written in the creation form, before it has an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_action")]
    pub default_action: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

fn default_action() -> String {
    DEFAULT_ACTION.to_string()
}

impl Default for RuleDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            default_action: default_action(),
            examples: vec![],
        }
    }
}

impl RuleDraft {
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        check_fields(&self.title, &self.description)
    }

    /// Turn a valid draft into a rule carrying `id`.
    pub fn into_rule(self, id: String) -> Result<Rule, RuleValidationError> {
        self.validate()?;
        let default_action = if self.default_action.trim().is_empty() {
            default_action()
        } else {
            self.default_action
        };
        Ok(Rule {
            id,
            title: self.title,
            description: self.description,
            default_action,
            examples: self.examples,
        })
    }
}

fn check_fields(title: &str, description: &str) -> Result<(), RuleValidationError> {
    if title.trim().is_empty() {
        return Err(RuleValidationError::EmptyTitle);
    }
    if description.trim().is_empty() {
        return Err(RuleValidationError::EmptyDescription);
    }
    Ok(())
}

/// Fresh identifier for a new rule.
pub fn new_rule_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// What a mutating call did to the rulebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    Applied,
    /// The target id was not present; nothing changed.
    NoOp,
}

// --- Persistence ---

/// Durable home of the rule collection. The whole collection is saved at once.
pub trait RuleBackend {
    fn load(&self) -> StoreResult<Vec<Rule>>;
    fn save(&mut self, rules: &[Rule]) -> StoreResult<()>;
}

/// Rulebook stored as a pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the current file aside to `<name>.corrupt`, replacing an older one.
    pub fn quarantine(&self) -> StoreResult<PathBuf> {
        let dest = self.sibling(".corrupt");
        fs::rename(&self.path, &dest).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(dest)
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "rules.json".into());
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "rules.json".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

impl RuleBackend for JsonFileBackend {
    fn load(&self) -> StoreResult<Vec<Rule>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no rulebook on disk, starting empty");
            return Ok(vec![]);
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Temp file + rename, so a reader never sees a half-written rulebook.
    fn save(&mut self, rules: &[Rule]) -> StoreResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        let json = serde_json::to_string_pretty(rules)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))
    }
}

/// In-process snapshot, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    snapshot: Vec<Rule>,
}

impl MemoryBackend {
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { snapshot: rules }
    }

    pub fn snapshot(&self) -> &[Rule] {
        &self.snapshot
    }
}

impl RuleBackend for MemoryBackend {
    fn load(&self) -> StoreResult<Vec<Rule>> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, rules: &[Rule]) -> StoreResult<()> {
        self.snapshot = rules.to_vec();
        Ok(())
    }
}

// --- Store ---

/// Owns the rulebook. Every mutation is written through to the backend before
/// it returns; a failed write rolls the in-memory change back.
#[derive(Debug)]
pub struct RuleStore<B: RuleBackend> {
    rules: Vec<Rule>,
    backend: B,
}

impl<B: RuleBackend> RuleStore<B> {
    pub fn open(backend: B) -> StoreResult<Self> {
        let rules = backend.load()?;
        tracing::info!(count = rules.len(), "rulebook loaded");
        Ok(Self { rules, backend })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Append a fully-formed rule. The caller owns id uniqueness.
    pub fn add_rule(&mut self, rule: Rule) -> StoreResult<Mutation> {
        if self.get(&rule.id).is_some() {
            tracing::warn!(id = %rule.id, "adding rule with an id already in the rulebook");
        }
        let id = rule.id.clone();
        self.rules.push(rule);
        if let Err(e) = self.persist() {
            self.rules.pop();
            return Err(e);
        }
        tracing::info!(%id, "rule added");
        Ok(Mutation::Applied)
    }

    /// Validate a draft, give it a fresh id and add it. An invalid draft is
    /// refused before anything is stored.
    pub fn create_rule(&mut self, draft: RuleDraft) -> StoreResult<Rule> {
        let rule = draft.into_rule(new_rule_id())?;
        self.add_rule(rule.clone())?;
        Ok(rule)
    }

    /// Replace the rule with the same id, keeping its position. Missing ids are
    /// a no-op so a stale editor cannot resurrect a deleted rule.
    pub fn update_rule(&mut self, rule: Rule) -> StoreResult<Mutation> {
        let Some(idx) = self.rules.iter().position(|r| r.id == rule.id) else {
            tracing::debug!(id = %rule.id, "update for unknown rule ignored");
            return Ok(Mutation::NoOp);
        };
        rule.validate()?;
        let id = rule.id.clone();
        let previous = std::mem::replace(&mut self.rules[idx], rule);
        if let Err(e) = self.persist() {
            self.rules[idx] = previous;
            return Err(e);
        }
        tracing::info!(%id, "rule updated");
        Ok(Mutation::Applied)
    }

    pub fn delete_rule(&mut self, id: &str) -> StoreResult<Mutation> {
        let Some(idx) = self.rules.iter().position(|r| r.id == id) else {
            tracing::debug!(%id, "delete for unknown rule ignored");
            return Ok(Mutation::NoOp);
        };
        let removed = self.rules.remove(idx);
        if let Err(e) = self.persist() {
            self.rules.insert(idx, removed);
            return Err(e);
        }
        tracing::info!(%id, "rule deleted");
        Ok(Mutation::Applied)
    }

    fn persist(&mut self) -> StoreResult<()> {
        self.backend.save(&self.rules)
    }
}

impl RuleStore<JsonFileBackend> {
    /// Open the on-disk rulebook. A file that cannot be read or decoded is
    /// moved aside and an empty rulebook is opened in its place.
    pub fn open_or_quarantine(backend: JsonFileBackend) -> StoreResult<Self> {
        match backend.load() {
            Ok(rules) => {
                tracing::info!(count = rules.len(), "rulebook loaded");
                Ok(Self { rules, backend })
            }
            Err(e @ (StoreError::Encoding(_) | StoreError::Io { .. })) => {
                let moved = backend.quarantine()?;
                tracing::warn!(
                    error = %e,
                    moved_to = %moved.display(),
                    "unreadable rulebook moved aside, starting empty"
                );
                Ok(Self {
                    rules: vec![],
                    backend,
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, title: &str) -> Rule {
        Rule {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{title} description"),
            default_action: "warn".to_string(),
            examples: vec![],
        }
    }

    fn store_with(ids: &[&str]) -> RuleStore<MemoryBackend> {
        let rules = ids.iter().map(|id| rule(id, &id.to_uppercase())).collect();
        RuleStore::open(MemoryBackend::with_rules(rules)).unwrap()
    }

    /// Backend whose writes can be switched off to exercise rollback.
    #[derive(Default)]
    struct FlakyBackend {
        fail: bool,
        saved: Vec<Rule>,
    }

    impl RuleBackend for FlakyBackend {
        fn load(&self) -> StoreResult<Vec<Rule>> {
            Ok(self.saved.clone())
        }

        fn save(&mut self, rules: &[Rule]) -> StoreResult<()> {
            if self.fail {
                return Err(StoreError::Backend("disk full".into()));
            }
            self.saved = rules.to_vec();
            Ok(())
        }
    }

    #[test]
    fn create_rule_scenario() {
        let mut store = RuleStore::open(MemoryBackend::default()).unwrap();
        let created = store
            .create_rule(RuleDraft {
                title: "No Spoilers".into(),
                description: "No revealing plot details".into(),
                default_action: "warn".into(),
                examples: vec![],
            })
            .unwrap();

        assert_eq!(store.len(), 1);
        assert!(!created.id.is_empty());
        let stored = &store.rules()[0];
        assert_eq!(stored, &created);
        assert_eq!(stored.title, "No Spoilers");
        assert_eq!(stored.description, "No revealing plot details");
        assert_eq!(stored.default_action, "warn");
        assert!(stored.examples.is_empty());

        assert_eq!(store.delete_rule(&created.id).unwrap(), Mutation::Applied);
        assert!(store.is_empty());
        assert!(store.backend().snapshot().is_empty());
    }

    #[test]
    fn create_rejects_empty_fields() {
        let mut store = RuleStore::open(MemoryBackend::default()).unwrap();

        let err = store
            .create_rule(RuleDraft {
                description: "something".into(),
                ..RuleDraft::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Invalid(RuleValidationError::EmptyTitle)
        ));

        let err = store
            .create_rule(RuleDraft {
                title: "Be kind".into(),
                description: "   ".into(),
                ..RuleDraft::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Invalid(RuleValidationError::EmptyDescription)
        ));
        assert!(store.is_empty());
        assert!(store.backend().snapshot().is_empty());
    }

    #[test]
    fn blank_default_action_falls_back_to_warn() {
        let draft = RuleDraft {
            title: "No spam".into(),
            description: "Links only when asked".into(),
            default_action: "".into(),
            examples: vec!["buy now".into()],
        };
        let rule = draft.into_rule("r1".into()).unwrap();
        assert_eq!(rule.default_action, DEFAULT_ACTION);
        assert_eq!(rule.examples, vec!["buy now".to_string()]);
    }

    #[test]
    fn any_action_label_is_accepted() {
        let mut store = store_with(&["a"]);
        let mut edited = store.get("a").unwrap().clone();
        edited.default_action = "shadowban for a week".into();
        assert_eq!(store.update_rule(edited).unwrap(), Mutation::Applied);
        assert_eq!(store.get("a").unwrap().default_action, "shadowban for a week");
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut store = RuleStore::open(MemoryBackend::default()).unwrap();
        for id in ["c", "a", "b"] {
            store.add_rule(rule(id, id)).unwrap();
        }
        let ids: Vec<&str> = store.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut store = RuleStore::open(MemoryBackend::default()).unwrap();
        for i in 0..50 {
            store
                .create_rule(RuleDraft {
                    title: format!("Rule {i}"),
                    description: "desc".into(),
                    ..RuleDraft::default()
                })
                .unwrap();
        }
        let mut ids: Vec<&str> = store.rules().iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn update_keeps_position() {
        let mut store = store_with(&["a", "b", "c"]);
        let mut edited = store.get("b").unwrap().clone();
        edited.title = "Renamed".into();
        edited.examples = vec!["first".into(), "second".into()];

        assert_eq!(store.update_rule(edited.clone()).unwrap(), Mutation::Applied);
        assert_eq!(store.rules()[1], edited);
        let ids: Vec<&str> = store.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(store.backend().snapshot(), store.rules());
    }

    #[test]
    fn update_missing_id_is_noop() {
        let mut store = store_with(&["a", "b"]);
        let before = store.rules().to_vec();

        let outcome = store.update_rule(rule("ghost", "Ghost")).unwrap();

        assert_eq!(outcome, Mutation::NoOp);
        assert_eq!(store.rules(), before.as_slice());
    }

    #[test]
    fn update_cannot_blank_title() {
        let mut store = store_with(&["a"]);
        let mut edited = store.get("a").unwrap().clone();
        edited.title = "  ".into();

        let err = store.update_rule(edited).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Invalid(RuleValidationError::EmptyTitle)
        ));
        assert_eq!(store.get("a").unwrap().title, "A");
    }

    #[test]
    fn delete_twice_is_idempotent() {
        let mut store = store_with(&["a", "b"]);
        assert_eq!(store.delete_rule("a").unwrap(), Mutation::Applied);
        let after_first = store.rules().to_vec();
        assert_eq!(store.delete_rule("a").unwrap(), Mutation::NoOp);
        assert_eq!(store.rules(), after_first.as_slice());
    }

    #[test]
    fn failed_write_rolls_back() {
        let mut store = RuleStore::open(FlakyBackend::default()).unwrap();
        store.add_rule(rule("a", "A")).unwrap();
        store.add_rule(rule("b", "B")).unwrap();
        store.backend.fail = true;

        assert!(store.add_rule(rule("c", "C")).is_err());
        assert_eq!(store.len(), 2);

        let mut edited = rule("a", "Changed");
        edited.description = "changed".into();
        assert!(store.update_rule(edited).is_err());
        assert_eq!(store.get("a").unwrap().title, "A");

        assert!(store.delete_rule("a").is_err());
        let ids: Vec<&str> = store.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(store.backend().saved, store.rules());
    }

    #[test]
    fn missing_examples_field_defaults_empty() {
        let raw = r#"[{"id":"x","title":"T","description":"D","default_action":"ban"}]"#;
        let rules: Vec<Rule> = serde_json::from_str(raw).unwrap();
        assert!(rules[0].examples.is_empty());
    }
}
