// ── Button/result normalizer ──────────────────────────────────────────────────
//
// Every surface reports the button a user pressed in its own vocabulary: the
// AppKit alert answers with "first/second/third button added" ordinals, the
// browser bridge with the button's DOM append index, Win32 message boxes with
// fixed `ID*` constants.  Each (surface, configuration) pair gets its own
// table listing `(raw code, outcome)` in the order that surface registers its
// buttons.  Surfaces that add buttons one at a time build their button rows
// from these tables, so the registration order and the table cannot drift.
//
// Tables are never derived from one another.  A new surface gets new tables,
// written from its own registration order and tested on their own.

use crate::options::ButtonSet;

use self::ButtonResult as B;

// ── Canonical outcome ─────────────────────────────────────────────────────────

/// Surface-independent outcome of a message dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonResult {
    Ok,
    Cancel,
    Yes,
    No,
    /// Dismissed without a recognised button (window closed, unknown code).
    Closed,
}

impl ButtonResult {
    /// Button caption used by surfaces that label buttons themselves.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Cancel => "Cancel",
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Closed => "Close",
        }
    }

    /// Action token attached to a bridge button (`data-action`).
    pub fn action(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Cancel => "cancel",
            Self::Yes => "yes",
            Self::No => "no",
            Self::Closed => "close",
        }
    }
}

// ── Surface identity ──────────────────────────────────────────────────────────

/// Which family of raw codes a surface speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// AppKit `NSAlert`: `NSAlertFirstButtonReturn` (1000) upward, in
    /// `addButtonWithTitle:` order.
    Panel,
    /// Browser DOM surface: zero-based index of the button element in append
    /// order.
    Web,
    /// Win32 `MessageBoxW`: the `MESSAGEBOX_RESULT` of the pressed button.
    Win32,
}

/// One lookup table: `(raw code, outcome)` pairs in registration order.
pub type ButtonTable = &'static [(i64, ButtonResult)];

// ── Panel tables ──────────────────────────────────────────────────────────────

/// `NSAlertFirstButtonReturn`.
pub const ALERT_FIRST_BUTTON: i64 = 1000;
/// `NSAlertSecondButtonReturn`.
pub const ALERT_SECOND_BUTTON: i64 = 1001;
/// `NSAlertThirdButtonReturn`.
pub const ALERT_THIRD_BUTTON: i64 = 1002;

const PANEL_OK: ButtonTable = &[(ALERT_FIRST_BUTTON, B::Ok)];
const PANEL_OK_CANCEL: ButtonTable =
    &[(ALERT_FIRST_BUTTON, B::Ok), (ALERT_SECOND_BUTTON, B::Cancel)];
const PANEL_YES_NO: ButtonTable = &[(ALERT_FIRST_BUTTON, B::Yes), (ALERT_SECOND_BUTTON, B::No)];
const PANEL_YES_NO_CANCEL: ButtonTable = &[
    (ALERT_FIRST_BUTTON, B::Yes),
    (ALERT_SECOND_BUTTON, B::No),
    (ALERT_THIRD_BUTTON, B::Cancel),
];

// ── Web tables ────────────────────────────────────────────────────────────────
//
// The bridge lays actions out dismissive-first, affirmative-last, so the
// default action ends up at the right edge and receives focus.

const WEB_OK: ButtonTable = &[(0, B::Ok)];
const WEB_OK_CANCEL: ButtonTable = &[(0, B::Cancel), (1, B::Ok)];
const WEB_YES_NO: ButtonTable = &[(0, B::No), (1, B::Yes)];
const WEB_YES_NO_CANCEL: ButtonTable = &[(0, B::Cancel), (1, B::No), (2, B::Yes)];

// ── Win32 tables ──────────────────────────────────────────────────────────────
//
// Values of `IDOK`, `IDCANCEL`, `IDYES`, `IDNO` from WinUser.h.  MessageBoxW
// picks the button layout from its `MB_*` style, so the "registration order"
// here is the layout Windows uses for that style.

pub const IDOK: i64 = 1;
pub const IDCANCEL: i64 = 2;
pub const IDYES: i64 = 6;
pub const IDNO: i64 = 7;

const WIN32_OK: ButtonTable = &[(IDOK, B::Ok)];
const WIN32_OK_CANCEL: ButtonTable = &[(IDOK, B::Ok), (IDCANCEL, B::Cancel)];
const WIN32_YES_NO: ButtonTable = &[(IDYES, B::Yes), (IDNO, B::No)];
const WIN32_YES_NO_CANCEL: ButtonTable = &[(IDYES, B::Yes), (IDNO, B::No), (IDCANCEL, B::Cancel)];

// ── Lookup ────────────────────────────────────────────────────────────────────

/// The table `surface` uses for `buttons`.
pub fn table(surface: SurfaceKind, buttons: ButtonSet) -> ButtonTable {
    match (surface, buttons) {
        (SurfaceKind::Panel, ButtonSet::Ok) => PANEL_OK,
        (SurfaceKind::Panel, ButtonSet::OkCancel) => PANEL_OK_CANCEL,
        (SurfaceKind::Panel, ButtonSet::YesNo) => PANEL_YES_NO,
        (SurfaceKind::Panel, ButtonSet::YesNoCancel) => PANEL_YES_NO_CANCEL,

        (SurfaceKind::Web, ButtonSet::Ok) => WEB_OK,
        (SurfaceKind::Web, ButtonSet::OkCancel) => WEB_OK_CANCEL,
        (SurfaceKind::Web, ButtonSet::YesNo) => WEB_YES_NO,
        (SurfaceKind::Web, ButtonSet::YesNoCancel) => WEB_YES_NO_CANCEL,

        (SurfaceKind::Win32, ButtonSet::Ok) => WIN32_OK,
        (SurfaceKind::Win32, ButtonSet::OkCancel) => WIN32_OK_CANCEL,
        (SurfaceKind::Win32, ButtonSet::YesNo) => WIN32_YES_NO,
        (SurfaceKind::Win32, ButtonSet::YesNoCancel) => WIN32_YES_NO_CANCEL,
    }
}

/// Map a raw button code to its canonical outcome.
///
/// Codes outside the table for this configuration yield
/// [`ButtonResult::Closed`].
pub fn normalize(raw: i64, buttons: ButtonSet, surface: SurfaceKind) -> ButtonResult {
    table(surface, buttons)
        .iter()
        .find(|(code, _)| *code == raw)
        .map_or(ButtonResult::Closed, |(_, outcome)| *outcome)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
