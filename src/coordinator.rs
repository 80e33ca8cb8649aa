// ── Coordinator ───────────────────────────────────────────────────────────────
//
// Owns the slot table and one surface, and is the only place requests enter
// and leave the table.  Every operation follows the same order:
//
//   1. allocate an id (full table → cancel now, surface untouched)
//   2. ask the surface to present the request under that id
//   3. on refusal, release the id and cancel now
//   4. otherwise store the request; its result arrives later via `pump`
//
// Surfaces only ever post into the delivery queue, so no result can be
// dispatched between steps 2 and 4.
//
// Calls from other threads go through a `Handle`, which queues commands that
// the next `pump` executes on the coordinating thread.

use std::{
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, Sender},
};

use tracing::{debug, warn};

use crate::{
    config::Config,
    dispatch::{self, Courier, Delivery, Payload},
    error::Result,
    normalize::ButtonResult,
    options::{ButtonSet, FileOptions, MessageOptions, MessageStyle},
    request::{PendingRequest, RequestId},
    slots::SlotTable,
    surface::{OpenMode, Surface},
};

// ── Commands ──────────────────────────────────────────────────────────────────

/// A request queued by a [`Handle`], executed on the next pump.
enum Command {
    Open {
        mode: OpenMode,
        options: FileOptions,
        request: PendingRequest,
    },
    Save {
        options: FileOptions,
        request: PendingRequest,
    },
    Message {
        options: MessageOptions,
        request: PendingRequest,
    },
    Export {
        source: PathBuf,
        options: FileOptions,
        request: PendingRequest,
    },
}

impl Command {
    fn into_request(self) -> PendingRequest {
        match self {
            Self::Open { request, .. }
            | Self::Save { request, .. }
            | Self::Message { request, .. }
            | Self::Export { request, .. } => request,
        }
    }
}

// ── Coordinator ───────────────────────────────────────────────────────────────

/// Correlates dialog requests with their eventual results.
///
/// Not `Sync`; create one per UI context.  Independent coordinators share
/// nothing.
pub struct Coordinator<S: Surface> {
    slots: SlotTable,
    surface: S,
    courier: Courier,
    deliveries: Receiver<Delivery>,
    commands_tx: Sender<Command>,
    commands: Receiver<Command>,
}

impl<S: Surface> Coordinator<S> {
    /// Build a coordinator whose surface is produced by `build`.
    ///
    /// `build` receives the courier the surface must post its results
    /// through, and the configuration.
    pub fn new(config: Config, build: impl FnOnce(Courier, &Config) -> S) -> Self {
        let (tx, deliveries) = mpsc::channel();
        let courier = Courier::new(tx);
        let surface = build(courier.clone(), &config);
        let (commands_tx, commands) = mpsc::channel();
        debug!(capacity = config.max_requests, surface = ?surface.kind(), "coordinator created");
        Self {
            slots: SlotTable::new(config.max_requests),
            surface,
            courier,
            deliveries,
            commands_tx,
            commands,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Another courier for the surface's delivery queue.
    pub fn courier(&self) -> Courier {
        self.courier.clone()
    }

    /// A `Send` handle for issuing requests from other threads.
    pub fn handle(&self) -> Handle {
        Handle {
            tx: self.commands_tx.clone(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Requests presented and not yet delivered.
    pub fn in_flight(&self) -> usize {
        self.slots.in_flight()
    }

    // ── Operations ────────────────────────────────────────────────────────────
    //
    // Each returns the id the request was presented under, or `None` when it
    // was completed as cancelled before returning.

    /// Choose one file.
    pub fn pick_file(
        &mut self,
        options: &FileOptions,
        callback: impl FnOnce(Option<&str>) + Send + 'static,
    ) -> Option<RequestId> {
        self.open(OpenMode::File, options, PendingRequest::OpenFile(Box::new(callback)))
    }

    /// Choose any number of files.  An empty slice means cancelled.
    pub fn pick_files(
        &mut self,
        options: &FileOptions,
        callback: impl FnOnce(&[String]) + Send + 'static,
    ) -> Option<RequestId> {
        self.open(OpenMode::Files, options, PendingRequest::OpenFiles(Box::new(callback)))
    }

    /// Choose one folder.
    pub fn pick_folder(
        &mut self,
        options: &FileOptions,
        callback: impl FnOnce(Option<&str>) + Send + 'static,
    ) -> Option<RequestId> {
        self.open(OpenMode::Folder, options, PendingRequest::OpenFolder(Box::new(callback)))
    }

    /// Choose any number of folders.
    pub fn pick_folders(
        &mut self,
        options: &FileOptions,
        callback: impl FnOnce(&[String]) + Send + 'static,
    ) -> Option<RequestId> {
        self.open(OpenMode::Folders, options, PendingRequest::OpenFolders(Box::new(callback)))
    }

    /// Choose a save destination.
    pub fn pick_save(
        &mut self,
        options: &FileOptions,
        callback: impl FnOnce(Option<&str>) + Send + 'static,
    ) -> Option<RequestId> {
        self.save(options, PendingRequest::Save(Box::new(callback)))
    }

    /// Show a message dialog with the buttons in `options`.
    pub fn pick_message(
        &mut self,
        options: &MessageOptions,
        callback: impl FnOnce(ButtonResult) + Send + 'static,
    ) -> Option<RequestId> {
        let request = PendingRequest::Message {
            buttons: options.buttons,
            callback: Some(Box::new(callback)),
        };
        self.message(options, request)
    }

    /// Show an informational OK-only message and forget about it.
    pub fn pick_alert(
        &mut self,
        title: &str,
        message: &str,
        parent_handle: Option<usize>,
    ) -> Option<RequestId> {
        let options = alert_options(title, message, parent_handle);
        let request = PendingRequest::Message {
            buttons: options.buttons,
            callback: None,
        };
        self.message(&options, request)
    }

    /// Ask an OK/Cancel question.
    pub fn pick_confirm(
        &mut self,
        title: &str,
        message: &str,
        parent_handle: Option<usize>,
        callback: impl FnOnce(ButtonResult) + Send + 'static,
    ) -> Option<RequestId> {
        let options = confirm_options(title, message, parent_handle);
        let request = PendingRequest::Message {
            buttons: options.buttons,
            callback: Some(Box::new(callback)),
        };
        self.message(&options, request)
    }

    /// Offer the file at `source` to the user.  `callback` receives `true`
    /// once the export went through.
    pub fn pick_export_file(
        &mut self,
        source: impl AsRef<Path>,
        options: &FileOptions,
        callback: impl FnOnce(bool) + Send + 'static,
    ) -> Option<RequestId> {
        self.export(source.as_ref(), options, PendingRequest::Export(Box::new(callback)))
    }

    // ── Results ───────────────────────────────────────────────────────────────

    /// Dispatch one delivery directly, bypassing the queue.
    ///
    /// Returns `true` when a pending request was completed.
    pub fn deliver(&mut self, raw_id: i64, payload: Payload) -> bool {
        let kind = self.surface.kind();
        dispatch::dispatch(&mut self.slots, kind, Delivery { id: raw_id, payload })
    }

    /// Execute queued handle commands, then dispatch every queued delivery.
    ///
    /// Never blocks.  Returns the number of requests completed by
    /// deliveries in this call.
    pub fn pump(&mut self) -> usize {
        while let Ok(command) = self.commands.try_recv() {
            self.execute(command);
        }

        let kind = self.surface.kind();
        let mut completed = 0;
        while let Ok(delivery) = self.deliveries.try_recv() {
            if dispatch::dispatch(&mut self.slots, kind, delivery) {
                completed += 1;
            }
        }
        completed
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn execute(&mut self, command: Command) {
        match command {
            Command::Open { mode, options, request } => {
                self.open(mode, &options, request);
            }
            Command::Save { options, request } => {
                self.save(&options, request);
            }
            Command::Message { options, request } => {
                self.message(&options, request);
            }
            Command::Export {
                source,
                options,
                request,
            } => {
                self.export(&source, &options, request);
            }
        }
    }

    fn open(
        &mut self,
        mode: OpenMode,
        options: &FileOptions,
        request: PendingRequest,
    ) -> Option<RequestId> {
        self.submit(request, |surface, id| surface.present_open(id, mode, options))
    }

    fn save(&mut self, options: &FileOptions, request: PendingRequest) -> Option<RequestId> {
        self.submit(request, |surface, id| surface.present_save(id, options))
    }

    fn message(&mut self, options: &MessageOptions, request: PendingRequest) -> Option<RequestId> {
        self.submit(request, |surface, id| surface.present_message(id, options))
    }

    fn export(
        &mut self,
        source: &Path,
        options: &FileOptions,
        request: PendingRequest,
    ) -> Option<RequestId> {
        self.submit(request, |surface, id| surface.present_export(id, source, options))
    }

    fn submit(
        &mut self,
        request: PendingRequest,
        present: impl FnOnce(&mut S, RequestId) -> Result<()>,
    ) -> Option<RequestId> {
        let kind = request.kind().as_str();

        let Some(id) = self.slots.allocate() else {
            warn!(kind, capacity = self.slots.capacity(), "request table full, cancelling");
            request.cancel();
            return None;
        };

        if let Err(err) = present(&mut self.surface, id) {
            warn!(%id, kind, error = %err, "surface did not present request, cancelling");
            self.slots.release(id);
            request.cancel();
            return None;
        }

        match self.slots.store(id, request) {
            Ok(()) => {
                debug!(%id, kind, "request presented");
                Some(id)
            }
            Err(request) => {
                warn!(%id, kind, "slot lost its reservation, cancelling");
                request.cancel();
                None
            }
        }
    }
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Cloneable, `Send` entry point for requests made off the coordinating
/// thread.
///
/// Requests are queued and presented on the coordinator's next
/// [`pump`](Coordinator::pump).  If the coordinator is gone the request is
/// cancelled on the calling thread before the method returns.
#[derive(Clone)]
pub struct Handle {
    tx: Sender<Command>,
}

impl Handle {
    pub fn pick_file(
        &self,
        options: FileOptions,
        callback: impl FnOnce(Option<&str>) + Send + 'static,
    ) {
        self.open(OpenMode::File, options, PendingRequest::OpenFile(Box::new(callback)));
    }

    pub fn pick_files(
        &self,
        options: FileOptions,
        callback: impl FnOnce(&[String]) + Send + 'static,
    ) {
        self.open(OpenMode::Files, options, PendingRequest::OpenFiles(Box::new(callback)));
    }

    pub fn pick_folder(
        &self,
        options: FileOptions,
        callback: impl FnOnce(Option<&str>) + Send + 'static,
    ) {
        self.open(OpenMode::Folder, options, PendingRequest::OpenFolder(Box::new(callback)));
    }

    pub fn pick_folders(
        &self,
        options: FileOptions,
        callback: impl FnOnce(&[String]) + Send + 'static,
    ) {
        self.open(OpenMode::Folders, options, PendingRequest::OpenFolders(Box::new(callback)));
    }

    pub fn pick_save(
        &self,
        options: FileOptions,
        callback: impl FnOnce(Option<&str>) + Send + 'static,
    ) {
        let request = PendingRequest::Save(Box::new(callback));
        self.send(Command::Save { options, request });
    }

    pub fn pick_message(
        &self,
        options: MessageOptions,
        callback: impl FnOnce(ButtonResult) + Send + 'static,
    ) {
        let request = PendingRequest::Message {
            buttons: options.buttons,
            callback: Some(Box::new(callback)),
        };
        self.send(Command::Message { options, request });
    }

    pub fn pick_alert(&self, title: &str, message: &str, parent_handle: Option<usize>) {
        let options = alert_options(title, message, parent_handle);
        let request = PendingRequest::Message {
            buttons: options.buttons,
            callback: None,
        };
        self.send(Command::Message { options, request });
    }

    pub fn pick_confirm(
        &self,
        title: &str,
        message: &str,
        parent_handle: Option<usize>,
        callback: impl FnOnce(ButtonResult) + Send + 'static,
    ) {
        let options = confirm_options(title, message, parent_handle);
        let request = PendingRequest::Message {
            buttons: options.buttons,
            callback: Some(Box::new(callback)),
        };
        self.send(Command::Message { options, request });
    }

    pub fn pick_export_file(
        &self,
        source: impl Into<PathBuf>,
        options: FileOptions,
        callback: impl FnOnce(bool) + Send + 'static,
    ) {
        let request = PendingRequest::Export(Box::new(callback));
        self.send(Command::Export {
            source: source.into(),
            options,
            request,
        });
    }

    fn open(&self, mode: OpenMode, options: FileOptions, request: PendingRequest) {
        self.send(Command::Open { mode, options, request });
    }

    fn send(&self, command: Command) {
        if let Err(mpsc::SendError(command)) = self.tx.send(command) {
            let request = command.into_request();
            warn!(kind = request.kind().as_str(), "coordinator dropped, cancelling");
            request.cancel();
        }
    }
}

// ── Presets ───────────────────────────────────────────────────────────────────

fn alert_options(title: &str, message: &str, parent_handle: Option<usize>) -> MessageOptions {
    MessageOptions {
        style: MessageStyle::Info,
        parent_handle,
        ..MessageOptions::new(title, message, ButtonSet::Ok)
    }
}

fn confirm_options(title: &str, message: &str, parent_handle: Option<usize>) -> MessageOptions {
    MessageOptions {
        style: MessageStyle::Question,
        parent_handle,
        ..MessageOptions::new(title, message, ButtonSet::OkCancel)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
