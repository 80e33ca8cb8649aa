// ── Id allocation ─────────────────────────────────────────────────────────────
//
// Round-robin cursor over the slot indexes.  Recently released ids are the
// last to be handed out again, which keeps a late delivery for a freed id from
// landing on a brand-new request for as long as the table has room.

/// Cursor that proposes slot indexes in wrapping order.
///
/// Index `i` backs request id `i + 1`; the cursor starts at id 1 and wraps
/// from id `capacity` back to id 1, so id 0 is never produced.
#[derive(Debug, Clone)]
pub(crate) struct IdCursor {
    next: usize,
    capacity: usize,
}

impl IdCursor {
    pub(crate) fn new(capacity: usize) -> Self {
        Self { next: 0, capacity }
    }

    /// Probe at most `capacity` indexes, starting at the cursor, and return
    /// the first one `is_free` accepts.
    ///
    /// Every probe advances the cursor, successful or not.
    pub(crate) fn find(&mut self, mut is_free: impl FnMut(usize) -> bool) -> Option<usize> {
        for _ in 0..self.capacity {
            let index = self.next;
            self.next = (self.next + 1) % self.capacity;
            if is_free(index) {
                return Some(index);
            }
        }
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
