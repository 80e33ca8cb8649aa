// ── Multi-value marshalling ───────────────────────────────────────────────────
//
// Variable-length results cross the surface boundary as one text blob with
// one entry per line.  `\n` separates entries and never terminates the last
// one; entries are assumed not to contain `\n` (paths from the supported
// surfaces never do, and the encoding does not escape).
//
// An empty list is encoded as an absent blob, never as a single empty line,
// so that decoding stays unambiguous.  An absent or empty blob decodes to an
// empty list, the same shape as a cancellation.

/// Entry separator.
pub const SEPARATOR: char = '\n';

/// Join `entries` into a blob.  Returns `None` for an empty list.
pub fn encode<S: AsRef<str>>(entries: &[S]) -> Option<String> {
    let (first, rest) = entries.split_first()?;
    let mut blob = String::from(first.as_ref());
    for entry in rest {
        blob.push(SEPARATOR);
        blob.push_str(entry.as_ref());
    }
    Some(blob)
}

/// Split a blob into owned entries, in order.
///
/// Empty trailing entries (a blob ending in one or more separators) are not
/// produced by well-formed encoders and are dropped rather than surfaced.
pub fn decode(blob: Option<&str>) -> Vec<String> {
    let Some(blob) = blob else {
        return Vec::new();
    };
    let mut entries: Vec<String> = blob.split(SEPARATOR).map(str::to_owned).collect();
    while entries.last().is_some_and(String::is_empty) {
        entries.pop();
    }
    entries
}

/// Extract only the first entry of a blob.
///
/// Used when a single-path request is answered with the multi-value encoding
/// (a folder pick that enumerates the files beneath it).  The remainder is
/// never materialised.
pub fn first_line(blob: Option<&str>) -> Option<String> {
    let blob = blob?;
    let first = blob.split(SEPARATOR).next().unwrap_or_default();
    if first.is_empty() {
        None
    } else {
        Some(first.to_owned())
    }
}

/// Decode `blob`, lend the entries to `f`, and release them as soon as `f`
/// returns.
///
/// The entries are only borrowed by `f`; callers that need them afterwards
/// must copy them.
pub fn with_decoded<R>(blob: Option<&str>, f: impl FnOnce(&[String]) -> R) -> R {
    let entries = decode(blob);
    let out = f(&entries);
    drop(entries);
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
