// ── Request slot table ────────────────────────────────────────────────────────
//
// Fixed-capacity registry of in-flight requests.  A slot moves through
//
//     Free ──allocate──▶ Reserved ──store──▶ Pending ──take──▶ Free
//                           └──────release──────────────────▶ Free
//
// `Reserved` covers the window between handing an id to a surface and the
// surface accepting the request.  Lookups that hit a reserved slot behave
// exactly like lookups that hit a free one: nothing is returned and nothing
// changes.
//
// Pure Rust; no platform calls.

mod ids;

use tracing::trace;

use crate::request::{PendingRequest, RequestId};

use self::ids::IdCursor;

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Free,
    Reserved,
    Pending(PendingRequest),
}

/// Registry of in-flight requests keyed by [`RequestId`].
#[derive(Debug)]
pub struct SlotTable {
    slots: Vec<Slot>,
    cursor: IdCursor,
    in_flight: usize,
}

impl SlotTable {
    /// A table with ids `1..=capacity`, all free.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| Slot::Free).collect(),
            cursor: IdCursor::new(capacity),
            in_flight: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots that are reserved or hold a pending request.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Reserve a free slot.  Returns `None` when every slot is taken.
    pub fn allocate(&mut self) -> Option<RequestId> {
        let slots = &self.slots;
        let index = self.cursor.find(|i| matches!(slots[i], Slot::Free))?;
        self.slots[index] = Slot::Reserved;
        self.in_flight += 1;
        Some(RequestId::from_index(index))
    }

    /// Attach `request` to a reserved id.
    ///
    /// Hands the request back if `id` was not reserved, so the caller can
    /// still complete it.
    pub fn store(&mut self, id: RequestId, request: PendingRequest) -> Result<(), PendingRequest> {
        match self.slots.get_mut(id.index()) {
            Some(slot @ Slot::Reserved) => {
                *slot = Slot::Pending(request);
                Ok(())
            }
            _ => Err(request),
        }
    }

    /// Remove and return the request stored under `id`.
    ///
    /// Free, reserved, and out-of-range ids yield `None` and leave the table
    /// untouched.
    pub fn take(&mut self, id: RequestId) -> Option<PendingRequest> {
        let slot = self.slots.get_mut(id.index())?;
        if !matches!(slot, Slot::Pending(_)) {
            trace!(%id, "no pending request");
            return None;
        }
        self.in_flight -= 1;
        match std::mem::take(slot) {
            Slot::Pending(request) => Some(request),
            Slot::Free | Slot::Reserved => None,
        }
    }

    /// Free a reserved slot whose request was never stored.
    ///
    /// Returns `false` (and does nothing) unless `id` is reserved; a slot
    /// holding a request can only be emptied by [`take`](Self::take).
    pub fn release(&mut self, id: RequestId) -> bool {
        match self.slots.get_mut(id.index()) {
            Some(slot @ Slot::Reserved) => {
                *slot = Slot::Free;
                self.in_flight -= 1;
                true
            }
            _ => false,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
