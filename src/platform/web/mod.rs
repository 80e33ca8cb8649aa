// ── Web surface ───────────────────────────────────────────────────────────────
//
// Dialogs drawn by the hosting page.  The Rust side only serialises commands
// and relays replies; the page builds the DOM, imports chosen files into the
// `picked` directory, creates save targets under `saved`, and answers with
// the request id it was given.
//
// Portable: the surface is generic over its `ScriptBridge`, so it runs (and
// is tested) on any target.  The wasm-bindgen binding lives in `js`.

pub mod protocol;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod js;

use std::path::Path;

use crate::{
    config::Config,
    dispatch::{Courier, Delivery},
    error::Result,
    normalize::SurfaceKind,
    options::{FileOptions, MessageOptions},
    request::RequestId,
    surface::{OpenMode, Surface},
};

use self::protocol::{button_row, BridgeCommand, BridgeReply};

/// Name suggested by save dialogs that were given none.
pub const DEFAULT_SAVE_NAME: &str = "untitled";

// ── Bridge ────────────────────────────────────────────────────────────────────

/// Outbound half of the script bridge: hands one JSON command to the page.
pub trait ScriptBridge {
    fn post(&mut self, command: &str) -> Result<()>;
}

/// In-memory bridge: keeps every command, for hosts that poll or for tests.
impl ScriptBridge for Vec<String> {
    fn post(&mut self, command: &str) -> Result<()> {
        self.push(command.to_owned());
        Ok(())
    }
}

/// Inbound half of the script bridge: turns reply text into deliveries.
///
/// Clone it into whatever callback the page invokes with its replies.
#[derive(Debug, Clone)]
pub struct ReplyRelay {
    courier: Courier,
}

impl ReplyRelay {
    pub fn new(courier: Courier) -> Self {
        Self { courier }
    }

    /// Parse one reply and queue it.  Malformed text is logged and dropped.
    pub fn receive(&self, text: &str) -> bool {
        match BridgeReply::parse(text) {
            Ok(reply) => {
                let Delivery { id, payload } = reply.into();
                self.courier.deliver(id, payload)
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring bridge reply");
                false
            }
        }
    }

    /// Run `after` each time a reply has been queued.  Replies otherwise
    /// wait for the host's next `Coordinator::pump`.
    pub fn notify<F: FnMut()>(self, after: F) -> NotifyingRelay<F> {
        NotifyingRelay { relay: self, after }
    }
}

/// [`ReplyRelay`] with a hook that runs once per queued reply, typically a
/// `pump` of the owning coordinator.
pub struct NotifyingRelay<F> {
    relay: ReplyRelay,
    after: F,
}

impl<F: FnMut()> NotifyingRelay<F> {
    pub fn receive(&mut self, text: &str) -> bool {
        let queued = self.relay.receive(text);
        if queued {
            (self.after)();
        }
        queued
    }
}

// ── Surface ───────────────────────────────────────────────────────────────────

/// Surface that drives page-side dialogs through a [`ScriptBridge`].
pub struct WebSurface<B: ScriptBridge> {
    bridge: B,
    relay: ReplyRelay,
    picked_dir: String,
    saved_dir: String,
}

impl<B: ScriptBridge> WebSurface<B> {
    pub fn new(bridge: B, courier: Courier, config: &Config) -> Self {
        Self {
            bridge,
            relay: ReplyRelay::new(courier),
            picked_dir: config.picked_dir.clone(),
            saved_dir: config.saved_dir.clone(),
        }
    }

    /// Relay for the page's replies to this surface's requests.
    pub fn relay(&self) -> ReplyRelay {
        self.relay.clone()
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    fn send(&mut self, command: &BridgeCommand) -> Result<()> {
        let json = command.to_json()?;
        tracing::trace!(%json, "bridge command");
        self.bridge.post(&json)
    }
}

impl<B: ScriptBridge> Surface for WebSurface<B> {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Web
    }

    fn present_open(&mut self, id: RequestId, mode: OpenMode, options: &FileOptions) -> Result<()> {
        let command = BridgeCommand::Open {
            id: id.get(),
            title: options.title.clone().unwrap_or_else(|| mode.prompt().to_owned()),
            allow_files: mode.allows_files(),
            allow_dirs: mode.allows_folders(),
            allow_multiple: mode.selects_many(options),
            accept: accept_list(options),
            base: self.picked_dir.clone(),
        };
        self.send(&command)
    }

    fn present_save(&mut self, id: RequestId, options: &FileOptions) -> Result<()> {
        let command = BridgeCommand::Save {
            id: id.get(),
            title: options.title.clone().unwrap_or_else(|| "Save File".to_owned()),
            suggested: options
                .default_name
                .clone()
                .unwrap_or_else(|| DEFAULT_SAVE_NAME.to_owned()),
            accept: accept_list(options),
            base: self.saved_dir.clone(),
        };
        self.send(&command)
    }

    fn present_message(&mut self, id: RequestId, options: &MessageOptions) -> Result<()> {
        let command = BridgeCommand::Message {
            id: id.get(),
            title: options.title.clone().unwrap_or_default(),
            message: options.body(),
            style: options.style.token(),
            icon: options.icon.token(),
            custom_icon: options
                .custom_icon_path
                .as_deref()
                .map(|p| p.to_string_lossy().into_owned()),
            buttons: button_row(options.buttons),
        };
        self.send(&command)
    }

    fn present_export(
        &mut self,
        id: RequestId,
        source: &Path,
        options: &FileOptions,
    ) -> Result<()> {
        let suggested = options
            .default_name
            .clone()
            .or_else(|| source.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| DEFAULT_SAVE_NAME.to_owned());
        let command = BridgeCommand::Export {
            id: id.get(),
            title: options.title.clone().unwrap_or_else(|| "Export File".to_owned()),
            source: source.to_string_lossy().into_owned(),
            suggested,
        };
        self.send(&command)
    }
}

/// Filter extensions as an HTML `accept` value: `.png,.jpg`.
fn accept_list(options: &FileOptions) -> String {
    options
        .extensions()
        .map(|ext| format!(".{}", ext.trim_start_matches('.')))
        .collect::<Vec<_>>()
        .join(",")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use serde_json::Value;

    use super::*;
    use crate::options::{ButtonSet, Filter, IconSelector, MessageStyle};

    fn surface() -> (WebSurface<Vec<String>>, mpsc::Receiver<Delivery>) {
        let (tx, rx) = mpsc::channel();
        let config = Config {
            picked_dir: "/in".into(),
            saved_dir: "/out".into(),
            ..Config::default()
        };
        (WebSurface::new(Vec::new(), Courier::new(tx), &config), rx)
    }

    fn id(raw: i64) -> RequestId {
        RequestId::from_raw(raw).expect("valid id")
    }

    fn last(s: &WebSurface<Vec<String>>) -> Value {
        serde_json::from_str(s.bridge().last().expect("command posted")).expect("json")
    }

    #[test]
    fn open_defaults_title_per_mode() {
        let (mut s, _rx) = surface();
        s.present_open(id(1), OpenMode::Files, &FileOptions::default()).expect("post");
        let v = last(&s);
        assert_eq!(v["op"], "open");
        assert_eq!(v["title"], "Choose Files");
        assert_eq!(v["allow_multiple"], true);
        assert_eq!(v["allow_dirs"], false);
        assert_eq!(v["base"], "/in");
        assert_eq!(v["accept"], "");
    }

    #[test]
    fn open_accept_from_filters() {
        let (mut s, _rx) = surface();
        let opts = FileOptions {
            title: Some("Pick image".into()),
            filters: vec![Filter::new("Images", &["png", "", ".jpg"])],
            ..FileOptions::default()
        };
        s.present_open(id(2), OpenMode::File, &opts).expect("post");
        let v = last(&s);
        assert_eq!(v["title"], "Pick image");
        assert_eq!(v["accept"], ".png,.jpg");
    }

    #[test]
    fn single_pick_honours_allow_multiple() {
        let (mut s, _rx) = surface();
        s.present_open(id(6), OpenMode::Folder, &FileOptions::default()).expect("post");
        assert_eq!(last(&s)["allow_multiple"], false);

        let many = FileOptions {
            allow_multiple: true,
            ..FileOptions::default()
        };
        s.present_open(id(7), OpenMode::File, &many).expect("post");
        let v = last(&s);
        assert_eq!(v["allow_multiple"], true);
        assert_eq!(v["title"], "Choose File");
    }

    #[test]
    fn save_suggests_untitled() {
        let (mut s, _rx) = surface();
        s.present_save(id(3), &FileOptions::default()).expect("post");
        let v = last(&s);
        assert_eq!(v["op"], "save");
        assert_eq!(v["suggested"], DEFAULT_SAVE_NAME);
        assert_eq!(v["base"], "/out");
    }

    #[test]
    fn message_carries_tokens_and_row() {
        let (mut s, _rx) = surface();
        let opts = MessageOptions {
            style: MessageStyle::Warning,
            icon: IconSelector::Trash,
            detail: Some("This cannot be undone.".into()),
            ..MessageOptions::new("Delete", "Delete 3 files?", ButtonSet::YesNoCancel)
        };
        s.present_message(id(4), &opts).expect("post");
        let v = last(&s);
        assert_eq!(v["style"], "warning");
        assert_eq!(v["icon"], "trash");
        assert_eq!(v["message"], "Delete 3 files?\n\nThis cannot be undone.");
        let labels: Vec<&str> = v["buttons"]
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|b| b["label"].as_str())
            .collect();
        assert_eq!(labels, ["Cancel", "No", "Yes"]);
    }

    #[test]
    fn export_suggests_source_name() {
        let (mut s, _rx) = surface();
        s.present_export(id(5), Path::new("/saved/report.csv"), &FileOptions::default())
            .expect("post");
        let v = last(&s);
        assert_eq!(v["op"], "export");
        assert_eq!(v["suggested"], "report.csv");
        assert_eq!(v["source"], "/saved/report.csv");
    }

    #[test]
    fn notifying_relay_runs_hook_per_queued_reply() {
        let (s, rx) = surface();
        let mut hits = 0;
        let mut relay = s.relay().notify(|| hits += 1);
        assert!(relay.receive(r#"{"type":"single","id":1,"path":"/in/a"}"#));
        assert!(!relay.receive("{not json"));
        assert!(relay.receive(r#"{"type":"button","id":2,"index":0}"#));
        drop(relay);
        assert_eq!(hits, 2);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn relay_forwards_valid_replies_only() {
        let (s, rx) = surface();
        let relay = s.relay();
        assert!(relay.receive(r#"{"type":"button","id":4,"index":1}"#));
        assert!(!relay.receive("{not json"));
        assert_eq!(rx.try_recv().map(|d| d.id).ok(), Some(4));
        assert!(rx.try_recv().is_err());
    }
}
