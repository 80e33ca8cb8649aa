// ── Script bridge protocol ────────────────────────────────────────────────────
//
// JSON messages exchanged with the page-side half of the web surface.  The
// page builds the DOM dialogs from commands and answers with replies that
// carry the same id back.
//
//   command: {"op":"open","id":3,"title":"Choose File",...}
//   reply:   {"type":"single","id":3,"path":"/picked/notes.txt"}
//
// Button rows in message commands are listed in append order; the reply's
// `index` is the position of the clicked button in that list.

use serde::{Deserialize, Serialize};

use crate::{
    dispatch::{Delivery, Payload},
    error::{PickError, Result},
    normalize::{table, ButtonResult, SurfaceKind},
    options::ButtonSet,
};

// ── Commands ──────────────────────────────────────────────────────────────────

/// A dialog the page is asked to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BridgeCommand {
    Open {
        id: u32,
        title: String,
        allow_files: bool,
        allow_dirs: bool,
        allow_multiple: bool,
        /// `accept` attribute value, e.g. `.png,.jpg`; empty for any file.
        accept: String,
        /// Directory chosen files are imported into.
        base: String,
    },
    Save {
        id: u32,
        title: String,
        suggested: String,
        accept: String,
        /// Directory the save target is created in.
        base: String,
    },
    Message {
        id: u32,
        title: String,
        message: String,
        style: &'static str,
        icon: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        custom_icon: Option<String>,
        buttons: Vec<BridgeButton>,
    },
    Export {
        id: u32,
        title: String,
        source: String,
        suggested: String,
    },
}

/// One button in a message command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeButton {
    pub label: &'static str,
    pub action: &'static str,
}

/// The button row for `buttons`, in the order the web normalizer table
/// expects them to be appended.
pub fn button_row(buttons: ButtonSet) -> Vec<BridgeButton> {
    table(SurfaceKind::Web, buttons)
        .iter()
        .map(|&(_, outcome): &(i64, ButtonResult)| BridgeButton {
            label: outcome.label(),
            action: outcome.action(),
        })
        .collect()
}

impl BridgeCommand {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(PickError::Bridge)
    }
}

// ── Replies ───────────────────────────────────────────────────────────────────

/// A result posted back by the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeReply {
    Single {
        id: i64,
        #[serde(default)]
        path: Option<String>,
    },
    Lines {
        id: i64,
        #[serde(default)]
        lines: Option<String>,
    },
    Button {
        id: i64,
        index: i64,
    },
}

impl BridgeReply {
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(PickError::Bridge)
    }
}

impl From<BridgeReply> for Delivery {
    fn from(reply: BridgeReply) -> Self {
        match reply {
            BridgeReply::Single { id, path } => Delivery {
                id,
                payload: Payload::Single(path),
            },
            BridgeReply::Lines { id, lines } => Delivery {
                id,
                payload: Payload::Lines(lines),
            },
            BridgeReply::Button { id, index } => Delivery {
                id,
                payload: Payload::Button(index),
            },
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
