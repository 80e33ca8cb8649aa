/// pick build script.
///
/// Validates that the `native` feature is only requested on targets that have
/// a native dialog surface.  Everything else (the core and the web bridge
/// protocol) is portable and needs no gate.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Cargo exposes enabled features to build scripts as CARGO_FEATURE_<NAME>.
    if std::env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }

    // Hard gate: fail loudly rather than silently producing a library whose
    // native surface does not exist.
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" && target_os != "macos" {
        panic!(
            "pick has no native dialog surface for this target \
             (CARGO_CFG_TARGET_OS = {target_os:?}); build without the `native` feature"
        );
    }
}
