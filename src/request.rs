// ── Requests ──────────────────────────────────────────────────────────────────
//
// The in-flight side of a dialog call: its id, its kind, and the callback it
// owes exactly one invocation to.  A `PendingRequest` lives in the slot table
// from the moment its surface accepts it until its delivery.

use std::fmt;

use crate::normalize::ButtonResult;
use crate::options::ButtonSet;

// ── Request id ────────────────────────────────────────────────────────────────

/// Identifier of an in-flight request.
///
/// Always non-zero: `0` is the "no request" sentinel on the wire and is never
/// handed out.  Ids are recycled once their request has been delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u32);

impl RequestId {
    /// Validate a raw id received from a surface.
    ///
    /// Returns `None` for zero, negative, and oversized values.  Range checks
    /// against the table capacity happen in the table itself.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match u32::try_from(raw) {
            Ok(0) | Err(_) => None,
            Ok(id) => Some(Self(id)),
        }
    }

    /// The numeric id, as sent to surfaces.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Zero-based slot index backing this id.
    pub(crate) fn index(self) -> usize {
        self.0 as usize - 1
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }
}

impl From<RequestId> for i64 {
    fn from(id: RequestId) -> Self {
        i64::from(id.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Callbacks ─────────────────────────────────────────────────────────────────
//
// Results are lent to the callback for the duration of the call.  Anything the
// caller wants to keep must be copied out; the marshaller frees the rest as
// soon as the callback returns.  The caller's context is whatever the closure
// captures.

/// Receives the chosen path, or `None` on cancellation.
pub type PathCallback = Box<dyn FnOnce(Option<&str>) + Send + 'static>;

/// Receives every chosen path; an empty slice means cancellation.
pub type PathsCallback = Box<dyn FnOnce(&[String]) + Send + 'static>;

/// Receives the normalized button outcome of a message dialog.
pub type ButtonCallback = Box<dyn FnOnce(ButtonResult) + Send + 'static>;

/// Receives `true` when an export completed.
pub type ExportCallback = Box<dyn FnOnce(bool) + Send + 'static>;

// ── Kinds ─────────────────────────────────────────────────────────────────────

/// What a request asked the surface to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    OpenFile,
    OpenFiles,
    OpenFolder,
    OpenFolders,
    Save,
    Message,
    Export,
}

impl RequestKind {
    /// Short label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenFile => "open-file",
            Self::OpenFiles => "open-files",
            Self::OpenFolder => "open-folder",
            Self::OpenFolders => "open-folders",
            Self::Save => "save",
            Self::Message => "message",
            Self::Export => "export",
        }
    }
}

// ── Pending request ───────────────────────────────────────────────────────────

/// A request awaiting its single delivery.
///
/// One variant per kind; each carries exactly the callback shape that kind
/// completes with, so the dispatcher cannot hand a path list to a button
/// callback.
pub enum PendingRequest {
    OpenFile(PathCallback),
    OpenFiles(PathsCallback),
    OpenFolder(PathCallback),
    OpenFolders(PathsCallback),
    Save(PathCallback),
    /// `callback` is `None` for fire-and-forget alerts.
    Message {
        buttons: ButtonSet,
        callback: Option<ButtonCallback>,
    },
    Export(ExportCallback),
}

impl PendingRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::OpenFile(_) => RequestKind::OpenFile,
            Self::OpenFiles(_) => RequestKind::OpenFiles,
            Self::OpenFolder(_) => RequestKind::OpenFolder,
            Self::OpenFolders(_) => RequestKind::OpenFolders,
            Self::Save(_) => RequestKind::Save,
            Self::Message { .. } => RequestKind::Message,
            Self::Export(_) => RequestKind::Export,
        }
    }

    /// Complete the request with its cancellation-shaped result.
    ///
    /// Used when the request never reached a surface: the table was full or
    /// the surface refused to present it.
    pub(crate) fn cancel(self) {
        match self {
            Self::OpenFile(cb) | Self::OpenFolder(cb) | Self::Save(cb) => cb(None),
            Self::OpenFiles(cb) | Self::OpenFolders(cb) => cb(&[]),
            Self::Message { callback, .. } => {
                if let Some(cb) = callback {
                    cb(ButtonResult::Closed);
                }
            }
            Self::Export(cb) => cb(false),
        }
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message { buttons, callback } => f
                .debug_struct("Message")
                .field("buttons", buttons)
                .field("has_callback", &callback.is_some())
                .finish(),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
