use std::path::PathBuf;

use parley_domain::{Conversation, GenerationParams, ModelId, ResourceReport, SessionContext};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Everything the browser can ask for, one variant per control.
///
/// Wire format: `{"action": "<id>", "params": {...}}`, `params` omitted for
/// actions without inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "params", rename_all = "snake_case")]
pub enum UiAction {
    /// Send a chat message and wait for the completed turn. Browsers that
    /// want the partial frames use `POST /api/chat` instead.
    Send { message: String },
    Clear,
    RefreshStatus,
    RefreshResources,
    ListModels,
    SwitchModel { model: ModelId },
    SetParameters { temperature: f64, max_tokens: u32 },
    Export,
    Import { path: Option<PathBuf> },
    Compare {
        prompt: String,
        model_a: ModelId,
        model_b: ModelId,
        temperature: f64,
        max_tokens: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionId {
    Send,
    Clear,
    RefreshStatus,
    RefreshResources,
    ListModels,
    SwitchModel,
    SetParameters,
    Export,
    Import,
    Compare,
}

impl UiAction {
    pub fn id(&self) -> ActionId {
        match self {
            UiAction::Send { .. } => ActionId::Send,
            UiAction::Clear => ActionId::Clear,
            UiAction::RefreshStatus => ActionId::RefreshStatus,
            UiAction::RefreshResources => ActionId::RefreshResources,
            UiAction::ListModels => ActionId::ListModels,
            UiAction::SwitchModel { .. } => ActionId::SwitchModel,
            UiAction::SetParameters { .. } => ActionId::SetParameters,
            UiAction::Export => ActionId::Export,
            UiAction::Import { .. } => ActionId::Import,
            UiAction::Compare { .. } => ActionId::Compare,
        }
    }
}

/// Fields an action reads from the page and the [`ActionOutput`] fields it
/// writes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionSpec {
    pub id: ActionId,
    pub inputs: &'static [&'static str],
    pub outputs: &'static [&'static str],
}

pub const ACTIONS: &[ActionSpec] = &[
    ActionSpec { id: ActionId::Send, inputs: &["message"], outputs: &["conversation", "status"] },
    ActionSpec { id: ActionId::Clear, inputs: &[], outputs: &["conversation"] },
    ActionSpec { id: ActionId::RefreshStatus, inputs: &[], outputs: &["status"] },
    ActionSpec { id: ActionId::RefreshResources, inputs: &[], outputs: &["resources"] },
    ActionSpec {
        id: ActionId::ListModels,
        inputs: &[],
        outputs: &["models", "comparison_models"],
    },
    ActionSpec { id: ActionId::SwitchModel, inputs: &["model"], outputs: &["status"] },
    ActionSpec {
        id: ActionId::SetParameters,
        inputs: &["temperature", "max_tokens"],
        outputs: &["params"],
    },
    ActionSpec { id: ActionId::Export, inputs: &[], outputs: &["status", "path"] },
    ActionSpec {
        id: ActionId::Import,
        inputs: &["path"],
        outputs: &["conversation", "status", "model", "params"],
    },
    ActionSpec {
        id: ActionId::Compare,
        inputs: &["prompt", "model_a", "model_b", "temperature", "max_tokens"],
        outputs: &["comparison", "status"],
    },
];

/// Result of one action. Only the fields named in the action's
/// [`ActionSpec::outputs`] are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<ModelId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_models: Option<Vec<ModelId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<GenerationParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Conversation and session context the page renders on load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub conversation: Conversation,
    pub context: SessionContext,
}
