use std::sync::Mutex;

use decoder_core::{
    ClipboardError, CopyOutcome, DecoderConfig, JsonFileBackend, Mutation, ResultView, Rule,
    RuleDraft, RuleStore, Tab,
};
use tauri::{AppHandle, Manager};
use tauri_plugin_clipboard_manager::ClipboardExt;
use tracing_subscriber::prelude::*;

/// Managed state owning the rulebook. Every surface that edits rules goes through it.
/// Holds the load error instead when the rulebook could not be opened at all.
struct RulebookState(Mutex<Result<RuleStore<JsonFileBackend>, String>>);

impl RulebookState {
    fn with<T>(
        &self,
        f: impl FnOnce(&mut RuleStore<JsonFileBackend>) -> decoder_core::StoreResult<T>,
    ) -> Result<T, String> {
        let mut guard = self.0.lock().map_err(|e| e.to_string())?;
        let store = guard
            .as_mut()
            .map_err(|e| format!("rulebook unavailable: {e}"))?;
        f(store).map_err(|e| e.to_string())
    }
}

/// System clipboard through the Tauri clipboard plugin.
struct AppClipboard<'a>(&'a AppHandle);

impl decoder_core::Clipboard for AppClipboard<'_> {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.0
            .clipboard()
            .write_text(text)
            .map_err(|e| ClipboardError(e.to_string()))
    }
}

#[tauri::command]
fn list_rules(state: tauri::State<'_, RulebookState>) -> Result<Vec<Rule>, String> {
    state.with(|store| Ok(store.rules().to_vec()))
}

#[tauri::command]
fn create_rule(draft: RuleDraft, state: tauri::State<'_, RulebookState>) -> Result<Rule, String> {
    state.with(|store| store.create_rule(draft))
}

#[tauri::command]
fn update_rule(rule: Rule, state: tauri::State<'_, RulebookState>) -> Result<Mutation, String> {
    state.with(|store| store.update_rule(rule))
}

#[tauri::command]
fn delete_rule(id: String, state: tauri::State<'_, RulebookState>) -> Result<Mutation, String> {
    state.with(|store| store.delete_rule(&id))
}

/// Parse engine output and project it for the result panel.
#[tauri::command]
fn render_result(
    comment: String,
    payload: String,
    tab: Option<Tab>,
) -> Result<serde_json::Value, String> {
    let result = decoder_core::parse_analysis(&payload).map_err(|e| e.to_string())?;
    let mut view = ResultView::new(&comment, &result);
    view.select(tab.unwrap_or_default());
    serde_json::to_value(view.render()).map_err(|e| e.to_string())
}

#[tauri::command(async)]
fn copy_reply(app: AppHandle, payload: String, strategy: String) -> Result<CopyOutcome, String> {
    let result = decoder_core::parse_analysis(&payload).map_err(|e| e.to_string())?;
    let view = ResultView::new("", &result);
    Ok(view.copy_reply(&strategy, &AppClipboard(&app)))
}

#[tauri::command]
fn analysis_schema() -> Result<String, String> {
    decoder_core::analysis_schema().map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("DECODER_LOG")
        .unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().without_time())
        .try_init();
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_tracing();
    let config = DecoderConfig::from_env();
    tracing::info!(dir = %config.data_dir().display(), "starting decoder");

    tauri::Builder::default()
        .plugin(tauri_plugin_clipboard_manager::init())
        .setup(move |app| {
            let store = decoder_core::open_rulebook_or_recover(&config).map_err(|e| {
                tracing::warn!(error = %e, "rulebook unavailable for this session");
                e.to_string()
            });
            app.manage(RulebookState(Mutex::new(store)));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            list_rules,
            create_rule,
            update_rule,
            delete_rule,
            render_result,
            copy_reply,
            analysis_schema,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
