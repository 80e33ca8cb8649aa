// ── AppKit panel surface ──────────────────────────────────────────────────────
//
// NSOpenPanel, NSSavePanel, and NSAlert driven through the Objective-C
// runtime with `objc::msg_send!`.  AppKit objects may only be touched on the
// main thread, so every dialog is queued on the main dispatch queue and runs
// on a later turn, never inside a `present_*` call.  With a parent window the
// dialog becomes a sheet whose completion block posts the result; without one
// it runs app-modal in a nested run loop.  Results go back through the
// courier either way.
//
// This is one of exactly two modules in the crate where `unsafe` code is
// permitted (the other is `platform::win32::dialogs`).  Every `unsafe` block
// MUST carry a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::{
    cell::Cell,
    ffi::{c_char, CStr},
    path::Path,
    sync::Once,
};

use ::dispatch::Queue;
use block::ConcreteBlock;
use objc::{
    class, msg_send,
    runtime::{Object, BOOL, NO, YES},
    sel, sel_impl,
};

use crate::{
    config::Config,
    dispatch::{Courier, Payload},
    error::Result,
    marshal,
    normalize::{table, SurfaceKind},
    options::{FileOptions, IconSelector, MessageOptions, MessageStyle},
    request::RequestId,
    surface::{OpenMode, Surface},
};

type Id = *mut Object;

/// `NSModalResponseOK`.
const MODAL_RESPONSE_OK: isize = 1;
/// `NSUTF8StringEncoding`.
const UTF8_ENCODING: usize = 4;
/// `NSApplicationActivationPolicyRegular`.
const ACTIVATION_POLICY_REGULAR: isize = 0;

// `NSAlertStyle` values.
const ALERT_STYLE_WARNING: usize = 0;
const ALERT_STYLE_INFORMATIONAL: usize = 1;
const ALERT_STYLE_CRITICAL: usize = 2;

// ── Main-thread helpers ───────────────────────────────────────────────────────

fn is_main_thread() -> bool {
    // SAFETY: +[NSThread isMainThread] is callable from any thread.
    let main: BOOL = unsafe { msg_send![class!(NSThread), isMainThread] };
    main != NO
}

/// Run `job` now if this is the main thread, otherwise on the main queue.
fn run_on_main(job: impl FnOnce() + Send + 'static) {
    if is_main_thread() {
        job();
    } else {
        Queue::main().exec_async(job);
    }
}

/// Make the process a regular, frontmost app once, so panels can appear
/// even when the host never started an NSApplication of its own.
fn ensure_app_initialized() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // SAFETY: only reached on the main thread (via run_on_main or a main
        // queue job); NSApplication's shared instance is created on demand.
        unsafe {
            let app: Id = msg_send![class!(NSApplication), sharedApplication];
            let _: BOOL = msg_send![app, setActivationPolicy: ACTIVATION_POLICY_REGULAR];
            let _: () = msg_send![app, finishLaunching];
            let _: () = msg_send![app, activateIgnoringOtherApps: YES];
        }
    });
}

/// Queue `job` on the main thread inside its own autorelease pool.
fn on_main_queue(job: impl FnOnce() + Send + 'static) {
    Queue::main().exec_async(move || {
        ensure_app_initialized();
        // SAFETY: running on the main queue; the pool is drained before the
        // block returns and every object created by `job` is autoreleased.
        let pool: Id = unsafe { msg_send![class!(NSAutoreleasePool), new] };
        job();
        // SAFETY: `pool` is the pool created above and not used again.
        unsafe {
            let _: () = msg_send![pool, drain];
        }
    });
}

// ── Foundation conversions ────────────────────────────────────────────────────

/// Autoreleased NSString copy of `s`.
///
/// # Safety
/// Must be called with an autorelease pool in place.
unsafe fn ns_string(s: &str) -> Id {
    let obj: Id = msg_send![class!(NSString), alloc];
    let obj: Id = msg_send![obj, initWithBytes: s.as_ptr() length: s.len() encoding: UTF8_ENCODING];
    msg_send![obj, autorelease]
}

/// Rust copy of an NSString, `None` for nil.
///
/// # Safety
/// `s` must be nil or a valid NSString.
unsafe fn rust_string(s: Id) -> Option<String> {
    if s.is_null() {
        return None;
    }
    let utf8: *const c_char = msg_send![s, UTF8String];
    if utf8.is_null() {
        return None;
    }
    Some(CStr::from_ptr(utf8).to_string_lossy().into_owned())
}

/// File-system path of an NSURL.
///
/// # Safety
/// `url` must be nil or a valid NSURL.
unsafe fn url_path(url: Id) -> Option<String> {
    if url.is_null() {
        return None;
    }
    rust_string(msg_send![url, path])
}

/// # Safety
/// Must be called with an autorelease pool in place.
unsafe fn directory_url(path: &Path) -> Id {
    let path = ns_string(&path.to_string_lossy());
    msg_send![class!(NSURL), fileURLWithPath: path isDirectory: YES]
}

/// NSMutableArray of every filter extension.
///
/// # Safety
/// Must be called with an autorelease pool in place.
unsafe fn extension_array(options: &FileOptions) -> Option<Id> {
    let mut extensions = options.extensions().peekable();
    extensions.peek()?;
    let array: Id = msg_send![class!(NSMutableArray), array];
    for ext in extensions {
        let _: () = msg_send![array, addObject: ns_string(ext.trim_start_matches('.'))];
    }
    Some(array)
}

// ── Presentation ──────────────────────────────────────────────────────────────

/// One request's answer, posted through the courier.
struct Completion {
    courier: Courier,
    id: RequestId,
}

impl Completion {
    fn finish(self, payload: Payload) {
        if !self.courier.deliver(self.id, payload) {
            tracing::debug!(id = %self.id, "coordinator gone before panel finished");
        }
    }
}

/// `NSWindow*` to attach a sheet to.  A null handle means app-modal.
fn sheet_window(parent_handle: Option<usize>) -> Option<Id> {
    parent_handle.filter(|&h| h != 0).map(|h| h as Id)
}

/// Show `dialog` (a panel or an alert) and hand its modal response to
/// `finish`.
///
/// With a window, `dialog` is attached as a sheet and `finish` runs from the
/// completion handler on a later main-thread turn.  Without one it runs
/// app-modal and `finish` is called before this returns.
///
/// # Safety
/// Main thread, with an autorelease pool in place.  `window`, when given,
/// must be a live NSWindow.
unsafe fn run_dialog(dialog: Id, window: Option<Id>, finish: impl FnOnce(Id, isize) + 'static) {
    let Some(window) = window else {
        let response: isize = msg_send![dialog, runModal];
        finish(dialog, response);
        return;
    };

    // The pool around this call drains long before the sheet closes, so the
    // dialog is retained until its handler has run.
    let _: Id = msg_send![dialog, retain];
    let finish = Cell::new(Some(finish));
    let handler = ConcreteBlock::new(move |response: isize| {
        if let Some(finish) = finish.take() {
            finish(dialog, response);
        }
        let _: () = msg_send![dialog, release];
    })
    .copy();
    let _: () = msg_send![dialog, beginSheetModalForWindow: window completionHandler: &*handler];
}

// ── Panels ────────────────────────────────────────────────────────────────────

/// # Safety
/// Main thread, with an autorelease pool in place.
unsafe fn configure_common(panel: Id, options: &FileOptions, with_filters: bool) {
    if let Some(title) = options.title.as_deref() {
        let _: () = msg_send![panel, setMessage: ns_string(title)];
    }
    if let Some(dir) = options.starting_path.as_deref() {
        let _: () = msg_send![panel, setDirectoryURL: directory_url(dir)];
    }
    if with_filters {
        if let Some(types) = extension_array(options) {
            let _: () = msg_send![panel, setAllowedFileTypes: types];
        }
    }
}

/// Paths of every URL an open panel returned.
///
/// # Safety
/// `panel` must be a live NSOpenPanel.
unsafe fn chosen_paths(panel: Id) -> Vec<String> {
    let urls: Id = msg_send![panel, URLs];
    let count: usize = msg_send![urls, count];
    (0..count)
        .filter_map(|i| {
            let url: Id = msg_send![urls, objectAtIndex: i];
            url_path(url)
        })
        .collect()
}

fn open_payload(mode: OpenMode, paths: Vec<String>) -> Payload {
    if mode.multiple() {
        Payload::Lines(marshal::encode(&paths))
    } else {
        Payload::Single(paths.into_iter().next())
    }
}

/// # Safety
/// Main thread, with an autorelease pool in place; see [`run_dialog`].
unsafe fn show_open_panel(mode: OpenMode, options: &FileOptions, done: Completion) {
    let panel: Id = msg_send![class!(NSOpenPanel), openPanel];
    let flag = |on: bool| if on { YES } else { NO };
    let _: () = msg_send![panel, setCanChooseFiles: flag(mode.allows_files())];
    let _: () = msg_send![panel, setCanChooseDirectories: flag(mode.allows_folders())];
    let _: () = msg_send![panel, setAllowsMultipleSelection: flag(mode.selects_many(options))];
    configure_common(panel, options, mode.allows_files());

    run_dialog(panel, sheet_window(options.parent_handle), move |panel, response| {
        let paths = if response == MODAL_RESPONSE_OK {
            chosen_paths(panel)
        } else {
            Vec::new()
        };
        done.finish(open_payload(mode, paths));
    });
}

/// # Safety
/// Main thread, with an autorelease pool in place; see [`run_dialog`].
unsafe fn show_save_panel(options: &FileOptions, done: Completion) {
    let panel: Id = msg_send![class!(NSSavePanel), savePanel];
    configure_common(panel, options, true);
    if let Some(name) = options.default_name.as_deref() {
        let _: () = msg_send![panel, setNameFieldStringValue: ns_string(name)];
    }
    let create = if options.allow_create_directories { YES } else { NO };
    let _: () = msg_send![panel, setCanCreateDirectories: create];

    run_dialog(panel, sheet_window(options.parent_handle), move |panel, response| {
        let path = if response == MODAL_RESPONSE_OK {
            url_path(msg_send![panel, URL])
        } else {
            None
        };
        done.finish(Payload::Single(path));
    });
}

// ── Alerts ────────────────────────────────────────────────────────────────────

fn alert_style(style: MessageStyle) -> usize {
    match style {
        MessageStyle::Error => ALERT_STYLE_CRITICAL,
        MessageStyle::Warning => ALERT_STYLE_WARNING,
        MessageStyle::Info | MessageStyle::Question => ALERT_STYLE_INFORMATIONAL,
    }
}

/// `+[NSImage imageNamed:]` name for the stock icons.
fn image_name(icon: IconSelector) -> Option<&'static str> {
    match icon {
        IconSelector::App => Some("NSApplicationIcon"),
        IconSelector::Folder => Some("NSFolder"),
        IconSelector::Document => Some("NSMultipleDocuments"),
        IconSelector::Locked => Some("NSLockLockedTemplate"),
        IconSelector::Unlocked => Some("NSLockUnlockedTemplate"),
        IconSelector::Network => Some("NSNetwork"),
        IconSelector::User => Some("NSUser"),
        IconSelector::Caution => Some("NSCaution"),
        IconSelector::Error => Some("NSCriticalAlertIcon"),
        IconSelector::Stop => Some("NSStopProgressTemplate"),
        IconSelector::Invalid => Some("NSInvalidDataFreestandingTemplate"),
        IconSelector::Default | IconSelector::Custom | IconSelector::Trash => None,
    }
}

/// # Safety
/// Main thread, with an autorelease pool in place.
unsafe fn alert_icon(options: &MessageOptions) -> Id {
    match options.icon {
        IconSelector::Default => std::ptr::null_mut(),
        IconSelector::Custom => match options.custom_icon_path.as_deref() {
            Some(path) => {
                let image: Id = msg_send![class!(NSImage), alloc];
                let file = ns_string(&path.to_string_lossy());
                let image: Id = msg_send![image, initWithContentsOfFile: file];
                if image.is_null() {
                    image
                } else {
                    msg_send![image, autorelease]
                }
            }
            None => std::ptr::null_mut(),
        },
        IconSelector::Trash => {
            let workspace: Id = msg_send![class!(NSWorkspace), sharedWorkspace];
            let trash: Id = msg_send![ns_string("~/.Trash"), stringByExpandingTildeInPath];
            msg_send![workspace, iconForFile: trash]
        }
        named => match image_name(named) {
            Some(name) => msg_send![class!(NSImage), imageNamed: ns_string(name)],
            None => std::ptr::null_mut(),
        },
    }
}

/// Show an alert and post its raw button ordinal.
///
/// # Safety
/// Main thread, with an autorelease pool in place; see [`run_dialog`].
unsafe fn show_alert(options: &MessageOptions, done: Completion) {
    let alert: Id = msg_send![class!(NSAlert), alloc];
    let alert: Id = msg_send![alert, init];
    let alert: Id = msg_send![alert, autorelease];

    if let Some(title) = options.title.as_deref() {
        let _: () = msg_send![alert, setMessageText: ns_string(title)];
    }
    let mut informative = options.message.clone().unwrap_or_default();
    if let Some(detail) = options.detail.as_deref().filter(|d| !d.is_empty()) {
        if !informative.is_empty() {
            informative.push_str("\n\n");
        }
        informative.push_str(detail);
    }
    if !informative.is_empty() {
        let _: () = msg_send![alert, setInformativeText: ns_string(&informative)];
    }
    let _: () = msg_send![alert, setAlertStyle: alert_style(options.style)];

    let icon = alert_icon(options);
    if !icon.is_null() {
        let _: () = msg_send![alert, setIcon: icon];
    }

    // Buttons are added in table order, so ordinal N is the table's Nth row.
    for (_, outcome) in table(SurfaceKind::Panel, options.buttons) {
        let _: Id = msg_send![alert, addButtonWithTitle: ns_string(outcome.label())];
    }

    run_dialog(alert, sheet_window(options.parent_handle), move |_, response| {
        done.finish(Payload::Button(response as i64));
    });
}

// ── Surface ───────────────────────────────────────────────────────────────────

/// Surface backed by AppKit panels and alerts.
///
/// A request whose options carry a parent handle is shown as a sheet on that
/// `NSWindow`; the rest run app-modal.
pub struct PanelSurface {
    courier: Courier,
}

impl PanelSurface {
    pub fn new(courier: Courier, _config: &Config) -> Self {
        run_on_main(ensure_app_initialized);
        Self { courier }
    }

    fn schedule(&self, id: RequestId, job: impl FnOnce(Completion) + Send + 'static) -> Result<()> {
        let done = Completion {
            courier: self.courier.clone(),
            id,
        };
        on_main_queue(move || job(done));
        Ok(())
    }
}

impl Surface for PanelSurface {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Panel
    }

    fn present_open(&mut self, id: RequestId, mode: OpenMode, options: &FileOptions) -> Result<()> {
        let options = options.clone();
        // SAFETY: scheduled through on_main_queue, which provides the main
        // thread and an autorelease pool; a parent handle is the caller's
        // live NSWindow.
        self.schedule(id, move |done| unsafe { show_open_panel(mode, &options, done) })
    }

    fn present_save(&mut self, id: RequestId, options: &FileOptions) -> Result<()> {
        let options = options.clone();
        // SAFETY: as in present_open.
        self.schedule(id, move |done| unsafe { show_save_panel(&options, done) })
    }

    fn present_message(&mut self, id: RequestId, options: &MessageOptions) -> Result<()> {
        let options = options.clone();
        // SAFETY: as in present_open.
        self.schedule(id, move |done| unsafe { show_alert(&options, done) })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_or_missing_parent_runs_app_modal() {
        assert!(sheet_window(None).is_none());
        assert!(sheet_window(Some(0)).is_none());
        assert_eq!(sheet_window(Some(0x1000)), Some(0x1000 as Id));
    }

    #[test]
    fn open_payload_shape_follows_mode() {
        let paths = || vec!["/a".to_owned(), "/b".to_owned()];
        assert_eq!(open_payload(OpenMode::File, paths()), Payload::Single(Some("/a".into())));
        assert_eq!(
            open_payload(OpenMode::Folders, paths()),
            Payload::Lines(Some("/a\n/b".into()))
        );
        assert_eq!(open_payload(OpenMode::Files, Vec::new()), Payload::Lines(None));
    }
}
