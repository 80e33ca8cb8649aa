// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except:
//   • `platform::win32::dialogs` – Win32 common-dialog FFI
//   • `platform::macos`          – AppKit through the Objective-C runtime
// Each unsafe block in those modules MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! Non-blocking file pickers and message boxes.
//!
//! Every operation returns immediately; its result arrives later through the
//! callback passed in, exactly once.  A [`Coordinator`] correlates each
//! finished dialog with the request that opened it, whatever surface drew
//! the dialog:
//!
//! * [`platform::web::WebSurface`]: page-side DOM dialogs over a JSON
//!   script bridge (portable; wasm-bindgen binding with the `web` feature).
//! * `platform::win32::Win32Surface`: Win32 common dialogs (`native`
//!   feature, Windows).
//! * `platform::macos::PanelSurface`: AppKit panels and alerts (`native`
//!   feature, macOS).
//!
//! ```
//! use pick::{platform::web::WebSurface, Config, Coordinator, FileOptions, Payload};
//!
//! let mut pick = Coordinator::new(Config::default(), |courier, config| {
//!     WebSurface::new(Vec::<String>::new(), courier, config)
//! });
//! let id = pick
//!     .pick_file(&FileOptions::titled("Open"), |path| println!("chosen: {path:?}"))
//!     .expect("presented");
//!
//! // Later, when the page answers:
//! pick.courier().deliver(id, Payload::Single(Some("/picked/a.txt".into())));
//! assert_eq!(pick.pump(), 1);
//! ```

pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod marshal;
pub mod normalize;
pub mod options;
pub mod platform;
pub mod request;
pub mod slots;
pub mod surface;

pub use config::Config;
pub use coordinator::{Coordinator, Handle};
pub use dispatch::{Courier, Delivery, Payload};
pub use error::{PickError, Result};
pub use normalize::{ButtonResult, SurfaceKind};
pub use options::{ButtonSet, FileOptions, Filter, IconSelector, MessageOptions, MessageStyle};
pub use request::{RequestId, RequestKind};
pub use surface::{OpenMode, Surface};
