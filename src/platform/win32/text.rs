// ── UTF-16 helpers for the common dialogs ─────────────────────────────────────
//
// Pure string handling, kept apart from the FFI so it builds and is tested on
// every target.

use crate::options::Filter;

/// Null-terminated UTF-16 copy of `s`.
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Text up to the first null (or the whole buffer).
pub(crate) fn from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

/// `lpstrFilter` contents: `Name (*.a;*.b)\0*.a;*.b\0…\0`, always ending with
/// an "All Files" entry and the terminating extra null.
pub(crate) fn filter_spec(filters: &[Filter]) -> Vec<u16> {
    let mut list = String::new();
    for filter in filters {
        let patterns: Vec<String> = filter
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.'))
            .filter(|e| !e.is_empty())
            .map(|e| format!("*.{e}"))
            .collect();
        if patterns.is_empty() {
            continue;
        }
        let patterns = patterns.join(";");
        list.push_str(&format!("{} ({patterns})\0{patterns}\0", filter.name));
    }
    list.push_str("All Files (*.*)\0*.*\0\0");
    list.encode_utf16().collect()
}

/// Paths from an `OFN_ALLOWMULTISELECT | OFN_EXPLORER` result buffer.
///
/// One selection comes back as `path\0\0`; several as
/// `dir\0name1\0name2\0\0`.
pub(crate) fn split_multi_select(buf: &[u16]) -> Vec<String> {
    let mut parts = buf
        .split(|&c| c == 0)
        .take_while(|s| !s.is_empty())
        .map(String::from_utf16_lossy);
    let Some(first) = parts.next() else {
        return Vec::new();
    };
    let names: Vec<String> = parts.collect();
    if names.is_empty() {
        return vec![first];
    }
    let dir = first.trim_end_matches('\\');
    names.into_iter().map(|name| format!("{dir}\\{name}")).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
