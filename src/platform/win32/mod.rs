// ── Win32 surface ─────────────────────────────────────────────────────────────
//
// Common dialogs and message boxes are modal: each call runs its own message
// loop until the user answers.  `present_*` therefore hands every dialog to a
// short-lived worker thread that enters a COM apartment, blocks in the dialog,
// and posts the result through the courier.  Owner windows travel as plain
// integers; the worker rebuilds the `HWND`.
//
// `dialogs` is one of exactly two modules in the crate where `unsafe` code is
// permitted (the other is `platform::macos`).  Every `unsafe` block MUST carry
// a `// SAFETY:` comment.  `text` is pure Rust and builds on every target.

#[cfg_attr(not(all(windows, feature = "native")), allow(dead_code))]
mod text;

#[cfg(all(windows, feature = "native"))]
mod dialogs;

#[cfg(all(windows, feature = "native"))]
pub use self::surface::Win32Surface;

#[cfg(all(windows, feature = "native"))]
mod surface {
    use std::thread;

    use super::dialogs::{self, ComApartment};
    use crate::{
        config::Config,
        dispatch::{Courier, Payload},
        error::{PickError, Result},
        marshal,
        normalize::SurfaceKind,
        options::{FileOptions, MessageOptions},
        request::RequestId,
        surface::{OpenMode, Surface},
    };

    /// Surface backed by the Win32 common dialogs.
    pub struct Win32Surface {
        courier: Courier,
    }

    impl Win32Surface {
        pub fn new(courier: Courier, _config: &Config) -> Self {
            Self { courier }
        }

        /// Run `job` on a dialog worker and post what it returns under `id`.
        fn spawn(
            &self,
            id: RequestId,
            job: impl FnOnce() -> Payload + Send + 'static,
        ) -> Result<()> {
            let courier = self.courier.clone();
            thread::Builder::new()
                .name(format!("pick-dialog-{}", id.get()))
                .spawn(move || {
                    let _apartment = ComApartment::enter();
                    let payload = job();
                    if !courier.deliver(id, payload) {
                        tracing::debug!(%id, "coordinator gone before dialog finished");
                    }
                })
                .map(drop)
                .map_err(PickError::Io)
        }
    }

    /// Log a dialog failure and substitute the cancellation result.
    fn or_cancel<T: Default>(id: RequestId, result: Result<T>) -> T {
        result.unwrap_or_else(|err| {
            tracing::warn!(%id, error = %err, "dialog failed");
            T::default()
        })
    }

    impl Surface for Win32Surface {
        fn kind(&self) -> SurfaceKind {
            SurfaceKind::Win32
        }

        fn present_open(
            &mut self,
            id: RequestId,
            mode: OpenMode,
            options: &FileOptions,
        ) -> Result<()> {
            let options = options.clone();
            let many = mode.selects_many(&options);
            self.spawn(id, move || match mode {
                OpenMode::File => {
                    let paths = or_cancel(id, dialogs::show_open_dialog(&options, many));
                    Payload::Single(paths.into_iter().next())
                }
                OpenMode::Files => {
                    let paths = or_cancel(id, dialogs::show_open_dialog(&options, true));
                    Payload::Lines(marshal::encode(&paths))
                }
                // The shell browser selects a single folder; the multi-folder
                // form reports it as a one-entry list.
                OpenMode::Folder => {
                    Payload::Single(or_cancel(id, dialogs::show_folder_dialog(&options)))
                }
                OpenMode::Folders => {
                    let folder = or_cancel(id, dialogs::show_folder_dialog(&options));
                    Payload::Lines(folder.and_then(|f| marshal::encode(&[f])))
                }
            })
        }

        fn present_save(&mut self, id: RequestId, options: &FileOptions) -> Result<()> {
            let options = options.clone();
            self.spawn(id, move || {
                Payload::Single(or_cancel(id, dialogs::show_save_dialog(&options)))
            })
        }

        fn present_message(&mut self, id: RequestId, options: &MessageOptions) -> Result<()> {
            let options = options.clone();
            self.spawn(id, move || Payload::Button(dialogs::show_message_box(&options)))
        }
    }
}
