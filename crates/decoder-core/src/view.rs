//! Read-only projection of one analyzed comment into the four result tabs.
//!
//! A [`ResultView`] borrows the comment and its [`AnalysisResult`] for a single
//! render pass. Only the selected tab is local state; nothing here writes back
//! to the result.

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, RecommendedAction, RiskLevel};
use crate::error::ClipboardError;

pub const HIGH_RISK_TITLE: &str = "High Risk Detected";
pub const HIGH_RISK_BODY: &str = "Engagement is not recommended. Please report and ban.";

/// Recommended action hidden on high-risk comments.
pub const ENGAGE_ACTION: &str = "engage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tab {
    #[default]
    Translation,
    RiskAction,
    Replies,
    Receipts,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Translation, Tab::RiskAction, Tab::Replies, Tab::Receipts];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Translation => "Translation",
            Tab::RiskAction => "Risk & Action",
            Tab::Replies => "Reply Builder",
            Tab::Receipts => "Receipts",
        }
    }
}

/// Indicator tier for the risk dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

impl From<RiskLevel> for SeverityTier {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => SeverityTier::Low,
            RiskLevel::Medium => SeverityTier::Medium,
            RiskLevel::High => SeverityTier::High,
        }
    }
}

// --- Projections ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary<'a> {
    pub comment: &'a str,
    pub likely_goal: &'a str,
    /// "name (NN%)" per tactic, in detection order.
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationPanel<'a> {
    pub plain: &'a str,
    pub intent: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub label: &'static str,
    pub raised: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPanel<'a> {
    pub tier: SeverityTier,
    pub heading: String,
    pub reasons: String,
    /// `None` when an "engage" recommendation was withheld for a high-risk comment.
    pub action: Option<&'a RecommendedAction>,
    pub flags: [Flag; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighRiskWarning {
    pub title: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyCard<'a> {
    pub strategy: &'a str,
    pub label: String,
    pub text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "camelCase")]
pub enum ReplyPanel<'a> {
    /// High-risk comments never get reply suggestions.
    Suppressed(HighRiskWarning),
    Cards(Vec<ReplyCard<'a>>),
}

impl ReplyPanel<'_> {
    pub fn cards(&self) -> &[ReplyCard<'_>] {
        match self {
            ReplyPanel::Suppressed(_) => &[],
            ReplyPanel::Cards(cards) => cards,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceGroup<'a> {
    pub tactic: &'a str,
    pub phrases: &'a [String],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipts<'a> {
    pub evidence: Vec<EvidenceGroup<'a>>,
    pub coach_notes: &'a [String],
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tab", content = "panel", rename_all = "camelCase")]
pub enum Panel<'a> {
    Translation(TranslationPanel<'a>),
    RiskAction(RiskPanel<'a>),
    Replies(ReplyPanel<'a>),
    Receipts(Receipts<'a>),
}

/// Everything the frontend needs to draw a result, all tabs included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedResult<'a> {
    pub selected: Tab,
    pub summary: Summary<'a>,
    pub translation: TranslationPanel<'a>,
    pub risk_action: RiskPanel<'a>,
    pub replies: ReplyPanel<'a>,
    pub receipts: Receipts<'a>,
}

// --- Clipboard ---

/// Platform clipboard, write-only.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CopyOutcome {
    Copied,
    /// No reply to copy: the strategy is empty or replies are suppressed.
    Unavailable,
    Failed,
}

// --- View ---

#[derive(Debug, Clone, Copy)]
pub struct ResultView<'a> {
    comment: &'a str,
    result: &'a AnalysisResult,
    tab: Tab,
}

impl<'a> ResultView<'a> {
    pub fn new(comment: &'a str, result: &'a AnalysisResult) -> Self {
        Self {
            comment,
            result,
            tab: Tab::default(),
        }
    }

    pub fn selected(&self) -> Tab {
        self.tab
    }

    pub fn select(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn summary(&self) -> Summary<'a> {
        Summary {
            comment: self.comment,
            likely_goal: &self.result.likely_goal,
            badges: self
                .result
                .tactics
                .iter()
                .map(|t| format!("{} ({}%)", t.name, t.confidence_percent()))
                .collect(),
        }
    }

    pub fn translation(&self) -> TranslationPanel<'a> {
        TranslationPanel {
            plain: &self.result.translation_plain,
            intent: &self.result.translation_intent,
        }
    }

    pub fn risk_action(&self) -> RiskPanel<'a> {
        let risk = &self.result.risk;
        let action = &self.result.recommended_action;
        let withheld =
            self.result.is_high_risk() && action.primary.trim().eq_ignore_ascii_case(ENGAGE_ACTION);
        RiskPanel {
            tier: risk.level.into(),
            heading: format!("{} Risk", risk.level.title()),
            reasons: risk.reasons.join(", "),
            action: (!withheld).then_some(action),
            flags: [
                Flag {
                    label: "Hate / Slur",
                    raised: risk.contains_hate_or_slur,
                },
                Flag {
                    label: "Threat",
                    raised: risk.contains_threat,
                },
                Flag {
                    label: "Sexual Harassment",
                    raised: risk.sexual_harassment,
                },
            ],
        }
    }

    pub fn replies(&self) -> ReplyPanel<'a> {
        if self.result.is_high_risk() {
            return ReplyPanel::Suppressed(HighRiskWarning {
                title: HIGH_RISK_TITLE,
                body: HIGH_RISK_BODY,
            });
        }
        ReplyPanel::Cards(
            self.result
                .available_replies()
                .map(|(strategy, text)| ReplyCard {
                    strategy,
                    label: strategy.replace('_', " "),
                    text,
                })
                .collect(),
        )
    }

    pub fn receipts(&self) -> Receipts<'a> {
        Receipts {
            evidence: self
                .result
                .tactics
                .iter()
                .map(|t| EvidenceGroup {
                    tactic: &t.name,
                    phrases: &t.evidence_phrases,
                })
                .collect(),
            coach_notes: &self.result.coach_notes,
        }
    }

    pub fn panel(&self, tab: Tab) -> Panel<'a> {
        match tab {
            Tab::Translation => Panel::Translation(self.translation()),
            Tab::RiskAction => Panel::RiskAction(self.risk_action()),
            Tab::Replies => Panel::Replies(self.replies()),
            Tab::Receipts => Panel::Receipts(self.receipts()),
        }
    }

    pub fn current_panel(&self) -> Panel<'a> {
        self.panel(self.tab)
    }

    pub fn render(&self) -> RenderedResult<'a> {
        RenderedResult {
            selected: self.tab,
            summary: self.summary(),
            translation: self.translation(),
            risk_action: self.risk_action(),
            replies: self.replies(),
            receipts: self.receipts(),
        }
    }

    /// Copy one reply's text. Failures are reported, never raised.
    pub fn copy_reply(&self, strategy: &str, clipboard: &dyn Clipboard) -> CopyOutcome {
        let panel = self.replies();
        let Some(card) = panel.cards().iter().find(|c| c.strategy == strategy) else {
            return CopyOutcome::Unavailable;
        };
        match clipboard.write_text(card.text) {
            Ok(()) => CopyOutcome::Copied,
            Err(e) => {
                tracing::debug!(%strategy, error = %e, "reply copy failed");
                CopyOutcome::Failed
            }
        }
    }
}
