// ── Dialog options ────────────────────────────────────────────────────────────
//
// Plain data handed to the surfaces.  Nothing here knows about slots or
// callbacks; every type is `Send` so requests can be handed off from other
// threads through a `Handle`.

use std::path::PathBuf;

// ── File dialogs ──────────────────────────────────────────────────────────────

/// One entry in a file-type filter list, e.g. `Images` → `png`, `jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Display name shown in the dialog's type selector.
    pub name: String,
    /// Extensions without the leading dot.
    pub extensions: Vec<String>,
}

impl Filter {
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|e| (*e).to_owned()).collect(),
        }
    }
}

/// Configuration for open, folder, save, and export dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// Dialog title or prompt.
    pub title: Option<String>,
    /// Directory the dialog starts in.
    pub starting_path: Option<PathBuf>,
    /// Suggested file name (save and export).
    pub default_name: Option<String>,
    /// File-type filters; empty means "all files".
    pub filters: Vec<Filter>,
    /// Let the dialog accept more than one item.  Always on for `pick_files`
    /// and `pick_folders`; single-path picks report only the first choice.
    pub allow_multiple: bool,
    /// Allow creating directories from inside a save dialog.
    pub allow_create_directories: bool,
    /// Raw platform handle of the owning window (`HWND`, `NSWindow*`).
    pub parent_handle: Option<usize>,
}

impl FileOptions {
    /// Options with only a title set.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// All filter extensions, flattened in declaration order, empties skipped.
    pub(crate) fn extensions(&self) -> impl Iterator<Item = &str> {
        self.filters
            .iter()
            .flat_map(|f| f.extensions.iter())
            .map(String::as_str)
            .filter(|e| !e.is_empty())
    }
}

// ── Message dialogs ───────────────────────────────────────────────────────────

/// Which buttons a message dialog shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ButtonSet {
    #[default]
    Ok,
    OkCancel,
    YesNo,
    YesNoCancel,
}

impl ButtonSet {
    /// Every configuration, for exhaustive iteration in tests and tables.
    pub const ALL: [ButtonSet; 4] = [Self::Ok, Self::OkCancel, Self::YesNo, Self::YesNoCancel];

    /// Number of buttons in the configuration.
    pub fn count(self) -> usize {
        match self {
            Self::Ok => 1,
            Self::OkCancel | Self::YesNo => 2,
            Self::YesNoCancel => 3,
        }
    }
}

/// Visual style of a message dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageStyle {
    #[default]
    Info,
    Warning,
    Error,
    Question,
}

impl MessageStyle {
    /// Token understood by the script bridge.
    pub fn token(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Question => "question",
        }
    }
}

/// Icon shown in a message dialog.
///
/// `Custom` reads the image from [`MessageOptions::custom_icon_path`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IconSelector {
    #[default]
    Default,
    Custom,
    App,
    Trash,
    Folder,
    Document,
    Locked,
    Unlocked,
    Network,
    User,
    Caution,
    Error,
    Stop,
    Invalid,
}

impl IconSelector {
    /// Token understood by the script bridge.
    pub fn token(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Custom => "custom",
            Self::App => "app",
            Self::Trash => "trash",
            Self::Folder => "folder",
            Self::Document => "document",
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::Network => "network",
            Self::User => "user",
            Self::Caution => "caution",
            Self::Error => "error",
            Self::Stop => "stop",
            Self::Invalid => "invalid",
        }
    }
}

/// Configuration for message dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageOptions {
    /// Title bar text or bold heading.
    pub title: Option<String>,
    /// Main message text.
    pub message: Option<String>,
    /// Secondary text shown under the message.
    pub detail: Option<String>,
    pub buttons: ButtonSet,
    pub style: MessageStyle,
    pub icon: IconSelector,
    /// Image file used when `icon` is [`IconSelector::Custom`].
    pub custom_icon_path: Option<PathBuf>,
    /// Raw platform handle of the owning window.
    pub parent_handle: Option<usize>,
}

impl MessageOptions {
    /// A titled message with the given buttons; everything else default.
    pub fn new(title: impl Into<String>, message: impl Into<String>, buttons: ButtonSet) -> Self {
        Self {
            title: Some(title.into()),
            message: Some(message.into()),
            buttons,
            ..Self::default()
        }
    }

    /// Message text followed by the detail paragraph, for surfaces with a
    /// single body field.
    pub(crate) fn body(&self) -> String {
        match (self.message.as_deref(), self.detail.as_deref()) {
            (Some(m), Some(d)) if !d.is_empty() => format!("{m}\n\n{d}"),
            (Some(m), _) => m.to_owned(),
            (None, Some(d)) => d.to_owned(),
            (None, None) => String::new(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
