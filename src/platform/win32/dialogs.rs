// ── Common dialogs ─────────────────────────────────────────────────────────────
//
// Thin blocking wrappers around the Win32 common-dialog, shell folder browser,
// and message-box APIs.  Each call runs a modal loop until the user answers,
// so the surface only ever calls them from a dialog worker thread.
//
// Cancellation is not an error: `Ok(None)` / `Ok(vec![])`.  `Err` means the
// API itself failed.
//
// This is inside `platform::win32` so `unsafe` is permitted per crate policy.

#![allow(unsafe_code)]

use std::ffi::c_void;

use windows::{
    core::{PCWSTR, PWSTR},
    Win32::{
        Foundation::HWND,
        System::Com::{
            CoInitializeEx, CoTaskMemFree, CoUninitialize, COINIT_APARTMENTTHREADED,
            COINIT_DISABLE_OLE1DDE,
        },
        UI::{
            Controls::Dialogs::{
                CommDlgExtendedError, GetOpenFileNameW, GetSaveFileNameW, OFN_ALLOWMULTISELECT,
                OFN_EXPLORER, OFN_FILEMUSTEXIST, OFN_HIDEREADONLY, OFN_NOCHANGEDIR,
                OFN_OVERWRITEPROMPT, OFN_PATHMUSTEXIST, OPENFILENAMEW,
            },
            Shell::{
                SHBrowseForFolderW, SHGetPathFromIDListW, BIF_NEWDIALOGSTYLE, BIF_RETURNONLYFSDIRS,
                BROWSEINFOW,
            },
            WindowsAndMessaging::{
                MessageBoxW, MB_ICONERROR, MB_ICONINFORMATION, MB_ICONQUESTION, MB_ICONWARNING,
                MB_OK, MB_OKCANCEL, MB_YESNO, MB_YESNOCANCEL, MESSAGEBOX_STYLE,
            },
        },
    },
};

use super::text::{filter_spec, from_wide, split_multi_select, wide};
use crate::{
    error::{PickError, Result},
    options::{ButtonSet, FileOptions, MessageOptions, MessageStyle},
};

// ── Buffer size ───────────────────────────────────────────────────────────────

/// Maximum path length in `WCHAR`s, including the null terminator.
/// `MAX_PATH` (260) is too short for modern Windows paths; use 32 768 which
/// is the documented maximum for `\\?\` extended paths.  Multi-select results
/// share the same buffer.
const PATH_BUF_LEN: usize = 32_768;

// ── Owner handle ──────────────────────────────────────────────────────────────

/// Rebuild the owner `HWND` from the integer carried in the options.
/// `None` means no owner.
pub(crate) fn owner(parent_handle: Option<usize>) -> HWND {
    HWND(parent_handle.unwrap_or(0) as *mut c_void)
}

// ── COM apartment ─────────────────────────────────────────────────────────────

/// Single-threaded COM apartment for the lifetime of the guard.  The folder
/// browser requires one on its calling thread.
pub(crate) struct ComApartment {
    entered: bool,
}

impl ComApartment {
    pub(crate) fn enter() -> Self {
        // SAFETY: called once at the top of a fresh worker thread; balanced by
        // CoUninitialize in Drop only when initialisation succeeded.
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED | COINIT_DISABLE_OLE1DDE) };
        if hr.is_err() {
            tracing::warn!(hresult = hr.0, "CoInitializeEx failed");
        }
        Self { entered: hr.is_ok() }
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.entered {
            // SAFETY: balances the successful CoInitializeEx on this thread.
            unsafe { CoUninitialize() };
        }
    }
}

// ── Open dialog ───────────────────────────────────────────────────────────────

/// Show the standard "Open" dialog.
///
/// Returns every chosen path; an empty list when the user cancelled.
pub(crate) fn show_open_dialog(options: &FileOptions, multiple: bool) -> Result<Vec<String>> {
    let mut buf = vec![0u16; PATH_BUF_LEN];
    let filter = filter_spec(&options.filters);
    let title = options.title.as_deref().map(wide);
    let initial_dir = options.starting_path.as_deref().map(|p| wide(&p.to_string_lossy()));

    let mut flags =
        OFN_FILEMUSTEXIST | OFN_PATHMUSTEXIST | OFN_HIDEREADONLY | OFN_NOCHANGEDIR | OFN_EXPLORER;
    if multiple {
        flags |= OFN_ALLOWMULTISELECT;
    }

    let mut ofn = OPENFILENAMEW {
        lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
        hwndOwner: owner(options.parent_handle),
        lpstrFilter: PCWSTR(filter.as_ptr()),
        lpstrFile: PWSTR(buf.as_mut_ptr()),
        nMaxFile: PATH_BUF_LEN as u32,
        lpstrTitle: title.as_ref().map_or(PCWSTR::null(), |t| PCWSTR(t.as_ptr())),
        lpstrInitialDir: initial_dir.as_ref().map_or(PCWSTR::null(), |d| PCWSTR(d.as_ptr())),
        Flags: flags,
        ..Default::default()
    };

    // SAFETY: `ofn` is fully initialised; `buf`, `filter`, `title`, and
    // `initial_dir` outlive this call.  GetOpenFileNameW reads and writes
    // only within the buffers we provided.  The calling thread owns a COM
    // apartment and pumps the dialog's own modal loop.
    let ok = unsafe { GetOpenFileNameW(&mut ofn) };

    if ok.as_bool() {
        Ok(split_multi_select(&buf))
    } else {
        dialog_failure("GetOpenFileNameW").map(|()| Vec::new())
    }
}

// ── Save dialog ───────────────────────────────────────────────────────────────

/// Show the standard "Save As" dialog.
///
/// `default_name` pre-populates the filename field.  Returns the chosen
/// path, or `None` if cancelled.
pub(crate) fn show_save_dialog(options: &FileOptions) -> Result<Option<String>> {
    let mut buf: Vec<u16> = options
        .default_name
        .as_deref()
        .unwrap_or_default()
        .encode_utf16()
        .chain(std::iter::repeat(0))
        .take(PATH_BUF_LEN)
        .collect();
    // Keep the final unit as terminator however long the suggestion was.
    buf[PATH_BUF_LEN - 1] = 0;

    let filter = filter_spec(&options.filters);
    let title = options.title.as_deref().map(wide);
    let initial_dir = options.starting_path.as_deref().map(|p| wide(&p.to_string_lossy()));

    let mut ofn = OPENFILENAMEW {
        lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
        hwndOwner: owner(options.parent_handle),
        lpstrFilter: PCWSTR(filter.as_ptr()),
        lpstrFile: PWSTR(buf.as_mut_ptr()),
        nMaxFile: PATH_BUF_LEN as u32,
        lpstrTitle: title.as_ref().map_or(PCWSTR::null(), |t| PCWSTR(t.as_ptr())),
        lpstrInitialDir: initial_dir.as_ref().map_or(PCWSTR::null(), |d| PCWSTR(d.as_ptr())),
        Flags: OFN_OVERWRITEPROMPT | OFN_PATHMUSTEXIST | OFN_NOCHANGEDIR | OFN_EXPLORER,
        ..Default::default()
    };

    // SAFETY: same invariants as show_open_dialog above.
    let ok = unsafe { GetSaveFileNameW(&mut ofn) };

    if ok.as_bool() {
        Ok(Some(from_wide(&buf)))
    } else {
        dialog_failure("GetSaveFileNameW").map(|()| None)
    }
}

/// Distinguish cancellation (`Ok`) from failure after a FALSE return.
fn dialog_failure(function: &'static str) -> Result<()> {
    // SAFETY: no preconditions; reads the thread's last common-dialog error.
    let code = unsafe { CommDlgExtendedError() }.0;
    if code == 0 {
        Ok(())
    } else {
        Err(PickError::Platform { function, code })
    }
}

// ── Folder browser ────────────────────────────────────────────────────────────

/// Show the shell folder browser.  Returns the chosen directory, or `None` if
/// the user cancelled or picked a virtual folder with no file-system path.
pub(crate) fn show_folder_dialog(options: &FileOptions) -> Result<Option<String>> {
    let mut display = vec![0u16; 260];
    let title = options.title.as_deref().map(wide);

    let info = BROWSEINFOW {
        hwndOwner: owner(options.parent_handle),
        pszDisplayName: PWSTR(display.as_mut_ptr()),
        lpszTitle: title.as_ref().map_or(PCWSTR::null(), |t| PCWSTR(t.as_ptr())),
        ulFlags: BIF_RETURNONLYFSDIRS | BIF_NEWDIALOGSTYLE,
        ..Default::default()
    };

    // SAFETY: `info` is fully initialised and `display` holds MAX_PATH units
    // as required for pszDisplayName; both outlive the call.  The calling
    // thread has entered an STA (see ComApartment), which the new-style
    // dialog requires.
    let pidl = unsafe { SHBrowseForFolderW(&info) };
    if pidl.is_null() {
        return Ok(None);
    }

    let mut path = [0u16; 260];
    // SAFETY: `pidl` is the non-null item list returned above; `path` is the
    // MAX_PATH buffer the API expects.
    let ok = unsafe { SHGetPathFromIDListW(pidl, &mut path) };
    // SAFETY: the item list was allocated by the shell with the COM task
    // allocator and is not used after this point.
    unsafe { CoTaskMemFree(Some(pidl as *const c_void)) };

    Ok(ok.as_bool().then(|| from_wide(&path)))
}

// ── Message box ───────────────────────────────────────────────────────────────

/// Show a message box and return the raw `ID*` value of the pressed button.
pub(crate) fn show_message_box(options: &MessageOptions) -> i64 {
    let body = wide(&options.body());
    let caption = wide(options.title.as_deref().unwrap_or_default());

    // SAFETY: `body` and `caption` are valid null-terminated UTF-16 strings
    // that remain allocated for the duration of the MessageBoxW call.
    let pressed = unsafe {
        MessageBoxW(
            owner(options.parent_handle),
            PCWSTR(body.as_ptr()),
            PCWSTR(caption.as_ptr()),
            message_style(options.buttons, options.style),
        )
    };
    i64::from(pressed.0)
}

fn message_style(buttons: ButtonSet, style: MessageStyle) -> MESSAGEBOX_STYLE {
    let buttons = match buttons {
        ButtonSet::Ok => MB_OK,
        ButtonSet::OkCancel => MB_OKCANCEL,
        ButtonSet::YesNo => MB_YESNO,
        ButtonSet::YesNoCancel => MB_YESNOCANCEL,
    };
    let icon = match style {
        MessageStyle::Info => MB_ICONINFORMATION,
        MessageStyle::Warning => MB_ICONWARNING,
        MessageStyle::Error => MB_ICONERROR,
        MessageStyle::Question => MB_ICONQUESTION,
    };
    buttons | icon
}
