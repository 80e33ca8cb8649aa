// ── Dialog surfaces ───────────────────────────────────────────────────────────
//
// A surface is whatever actually puts a dialog on screen.  The coordinator
// asks it to present a request tagged with an id; the surface later answers
// through the `Courier` it was built with.  `present_*` must return promptly:
// a surface that needs to block (modal native dialogs) does so on another
// thread or on the UI thread's own turn, never inside the call.
//
// Returning `Err` means the request was not shown and will never be answered;
// the coordinator then completes it as cancelled.

use std::path::Path;

use crate::{
    error::{PickError, Result},
    normalize::SurfaceKind,
    options::{FileOptions, MessageOptions},
    request::RequestId,
};

/// What an open dialog lets the user choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    File,
    Files,
    Folder,
    Folders,
}

impl OpenMode {
    pub fn allows_files(self) -> bool {
        matches!(self, Self::File | Self::Files)
    }

    pub fn allows_folders(self) -> bool {
        matches!(self, Self::Folder | Self::Folders)
    }

    pub fn multiple(self) -> bool {
        matches!(self, Self::Files | Self::Folders)
    }

    /// Whether the dialog should accept several items.  Single-item modes
    /// honour `allow_multiple`; their result is cut down to the first entry.
    pub fn selects_many(self, options: &FileOptions) -> bool {
        self.multiple() || options.allow_multiple
    }

    /// Default prompt for surfaces that need one.
    pub fn prompt(self) -> &'static str {
        match self {
            Self::File => "Choose File",
            Self::Files => "Choose Files",
            Self::Folder | Self::Folders => "Choose Folder",
        }
    }
}

/// Capability set of a dialog backend.
pub trait Surface {
    /// Which family of button codes this surface reports.
    fn kind(&self) -> SurfaceKind;

    /// Show an open dialog.  Answers with `Payload::Single` or
    /// `Payload::Lines`.
    fn present_open(&mut self, id: RequestId, mode: OpenMode, options: &FileOptions) -> Result<()>;

    /// Show a save dialog.  Answers with `Payload::Single`.
    fn present_save(&mut self, id: RequestId, options: &FileOptions) -> Result<()>;

    /// Show a message dialog.  Answers with `Payload::Button` carrying the
    /// surface's own code for the pressed button.
    fn present_message(&mut self, id: RequestId, options: &MessageOptions) -> Result<()>;

    /// Hand `source` to the user as a download or copy.  Answers with
    /// `Payload::Button(0)` on success.
    ///
    /// Only the web surface can export; the default refuses.
    fn present_export(
        &mut self,
        id: RequestId,
        source: &Path,
        options: &FileOptions,
    ) -> Result<()> {
        let _ = (id, source, options);
        Err(PickError::Unsupported("export"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
