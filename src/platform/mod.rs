// ── Platform surfaces ─────────────────────────────────────────────────────────
//
// One sub-module per dialog backend.  The web surface is portable; the native
// ones are compiled only with the `native` feature on their own OS (build.rs
// rejects `native` everywhere else).  All FFI is confined to these modules
// and never leaks outward: each exposes a type implementing `Surface`.

pub mod web;
pub mod win32;

#[cfg(all(target_os = "macos", feature = "native"))]
pub mod macos;
