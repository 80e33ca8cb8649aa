// ── Delivery dispatch ─────────────────────────────────────────────────────────
//
// Surfaces never call back into the coordinator.  When a dialog finishes they
// post a `Delivery` (raw id plus raw payload) through their `Courier`, and the
// coordinator feeds each one to `dispatch`, which takes the pending request
// out of its slot and completes it.
//
// A request leaves its slot before its callback runs, so a second delivery
// for the same id finds nothing and is dropped.

use std::sync::mpsc::Sender;

use crate::{
    marshal,
    normalize::{normalize, ButtonResult, SurfaceKind},
    request::{PendingRequest, RequestId},
    slots::SlotTable,
};

// ── Payloads ──────────────────────────────────────────────────────────────────

/// Raw result of a finished dialog, in the encoding the surface produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// One path, or `None` when the user cancelled.
    Single(Option<String>),
    /// Newline-separated path blob (see [`marshal`]); `None` or empty when
    /// nothing was chosen.
    Lines(Option<String>),
    /// Surface-specific button code; also `0` for a completed export.
    Button(i64),
}

/// A payload addressed to a request id, as received from a surface.
///
/// `id` is kept signed and unvalidated until dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub id: i64,
    pub payload: Payload,
}

// ── Courier ───────────────────────────────────────────────────────────────────

/// Sending half of a coordinator's delivery queue, handed to its surface.
///
/// Cheap to clone and `Send`, so surfaces can move it onto worker threads or
/// into script-bridge closures.
#[derive(Debug, Clone)]
pub struct Courier {
    tx: Sender<Delivery>,
}

impl Courier {
    pub(crate) fn new(tx: Sender<Delivery>) -> Self {
        Self { tx }
    }

    /// Queue a result for the next [`pump`](crate::Coordinator::pump).
    ///
    /// Returns `false` once the coordinator has been dropped; the result is
    /// discarded in that case.
    pub fn deliver(&self, id: impl Into<i64>, payload: Payload) -> bool {
        self.tx
            .send(Delivery {
                id: id.into(),
                payload,
            })
            .is_ok()
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Complete the request addressed by `delivery`, if there is one.
///
/// Ids that are zero, negative, out of range, free, or still reserved are
/// ignored.  Returns `true` when a request was completed.
pub fn dispatch(slots: &mut SlotTable, surface: SurfaceKind, delivery: Delivery) -> bool {
    let Some(id) = RequestId::from_raw(delivery.id) else {
        tracing::debug!(raw_id = delivery.id, "dropping delivery with invalid id");
        return false;
    };
    let Some(request) = slots.take(id) else {
        tracing::debug!(%id, "dropping stale delivery");
        return false;
    };
    tracing::trace!(%id, kind = request.kind().as_str(), ?surface, "delivering");
    complete(request, delivery.payload, surface);
    true
}

/// Invoke the request's callback with `payload` converted to its shape.
fn complete(request: PendingRequest, payload: Payload, surface: SurfaceKind) {
    use PendingRequest as R;

    match (request, payload) {
        // Single path.
        (R::OpenFile(cb) | R::OpenFolder(cb) | R::Save(cb), Payload::Single(path)) => {
            cb(path.as_deref())
        }
        (R::OpenFile(cb) | R::OpenFolder(cb) | R::Save(cb), Payload::Lines(blob)) => {
            cb(marshal::first_line(blob.as_deref()).as_deref())
        }
        (R::OpenFile(cb) | R::OpenFolder(cb) | R::Save(cb), Payload::Button(_)) => cb(None),

        // Path list.
        (R::OpenFiles(cb) | R::OpenFolders(cb), Payload::Lines(blob)) => {
            marshal::with_decoded(blob.as_deref(), |paths| cb(paths))
        }
        (R::OpenFiles(cb) | R::OpenFolders(cb), Payload::Single(_) | Payload::Button(_)) => cb(&[]),

        // Message.
        (R::Message { buttons, callback }, payload) => {
            let result = match payload {
                Payload::Button(code) => normalize(code, buttons, surface),
                // A single-path reply means the page dismissed the dialog
                // through its default action.
                Payload::Single(_) => ButtonResult::Ok,
                Payload::Lines(_) => ButtonResult::Closed,
            };
            if let Some(cb) = callback {
                cb(result);
            }
        }

        // Export.
        (R::Export(cb), Payload::Single(path)) => cb(path.is_some()),
        (R::Export(cb), Payload::Lines(blob)) => cb(blob.is_some_and(|b| !b.is_empty())),
        (R::Export(cb), Payload::Button(code)) => cb(code == 0),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{mpsc, Arc, Mutex};

    use super::*;
    use crate::options::ButtonSet;

    use PendingRequest as R;

    type Log = Arc<Mutex<Vec<String>>>;

    fn pending(slots: &mut SlotTable, request: PendingRequest) -> i64 {
        let id = slots.allocate().expect("free slot");
        slots.store(id, request).expect("reserved");
        id.into()
    }

    fn single(log: &Log) -> Box<dyn FnOnce(Option<&str>) + Send> {
        let log = Arc::clone(log);
        Box::new(move |p: Option<&str>| log.lock().unwrap().push(format!("single:{p:?}")))
    }

    fn multi(log: &Log) -> Box<dyn FnOnce(&[String]) + Send> {
        let log = Arc::clone(log);
        Box::new(move |p: &[String]| log.lock().unwrap().push(format!("multi:{}", p.join("|"))))
    }

    fn button(log: &Log) -> Box<dyn FnOnce(ButtonResult) + Send> {
        let log = Arc::clone(log);
        Box::new(move |r: ButtonResult| log.lock().unwrap().push(format!("button:{r:?}")))
    }

    fn export(log: &Log) -> Box<dyn FnOnce(bool) + Send> {
        let log = Arc::clone(log);
        Box::new(move |ok: bool| log.lock().unwrap().push(format!("export:{ok}")))
    }

    fn run(request: PendingRequest, payload: Payload, surface: SurfaceKind) -> bool {
        let mut slots = SlotTable::new(4);
        let id = pending(&mut slots, request);
        dispatch(&mut slots, surface, Delivery { id, payload })
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn single_path_kinds() {
        let log = Log::default();
        let s = SurfaceKind::Web;
        assert!(run(R::OpenFile(single(&log)), Payload::Single(Some("/picked/a".into())), s));
        assert!(run(R::Save(single(&log)), Payload::Single(None), s));
        let both = Payload::Lines(Some("/picked/d/x\n/picked/d/y".into()));
        assert!(run(R::OpenFolder(single(&log)), both, s));
        assert!(run(R::OpenFile(single(&log)), Payload::Button(1), s));
        assert_eq!(
            entries(&log),
            [
                r#"single:Some("/picked/a")"#,
                "single:None",
                r#"single:Some("/picked/d/x")"#,
                "single:None"
            ]
        );
    }

    #[test]
    fn multi_path_kinds() {
        let log = Log::default();
        let s = SurfaceKind::Web;
        assert!(run(R::OpenFiles(multi(&log)), Payload::Lines(Some("/a\n/b".into())), s));
        assert!(run(R::OpenFolders(multi(&log)), Payload::Lines(None), s));
        assert!(run(R::OpenFiles(multi(&log)), Payload::Single(Some("/a".into())), s));
        assert!(run(R::OpenFiles(multi(&log)), Payload::Button(0), s));
        assert_eq!(entries(&log), ["multi:/a|/b", "multi:", "multi:", "multi:"]);
    }

    #[test]
    fn message_normalizes_with_the_delivering_surface() {
        let log = Log::default();
        let msg = |log: &Log| R::Message {
            buttons: ButtonSet::YesNo,
            callback: Some(button(log)),
        };
        assert!(run(msg(&log), Payload::Button(1), SurfaceKind::Web));
        assert!(run(msg(&log), Payload::Button(1000), SurfaceKind::Panel));
        assert!(run(msg(&log), Payload::Button(7), SurfaceKind::Win32));
        assert!(run(msg(&log), Payload::Single(Some("x".into())), SurfaceKind::Web));
        assert!(run(msg(&log), Payload::Single(None), SurfaceKind::Web));
        assert!(run(msg(&log), Payload::Lines(Some("x".into())), SurfaceKind::Web));
        assert_eq!(
            entries(&log),
            [
                "button:Yes",
                "button:Yes",
                "button:No",
                "button:Ok",
                "button:Ok",
                "button:Closed"
            ]
        );
    }

    #[test]
    fn alert_without_callback_still_consumes_slot() {
        let mut slots = SlotTable::new(1);
        let id = pending(
            &mut slots,
            R::Message {
                buttons: ButtonSet::Ok,
                callback: None,
            },
        );
        let delivery = Delivery {
            id,
            payload: Payload::Button(1000),
        };
        assert!(dispatch(&mut slots, SurfaceKind::Panel, delivery));
        assert_eq!(slots.in_flight(), 0);
    }

    #[test]
    fn export_outcomes() {
        let log = Log::default();
        let s = SurfaceKind::Web;
        assert!(run(R::Export(export(&log)), Payload::Button(0), s));
        assert!(run(R::Export(export(&log)), Payload::Button(1), s));
        assert!(run(R::Export(export(&log)), Payload::Single(Some("/saved/out.txt".into())), s));
        assert!(run(R::Export(export(&log)), Payload::Lines(Some(String::new())), s));
        assert_eq!(entries(&log), ["export:true", "export:false", "export:true", "export:false"]);
    }

    #[test]
    fn invalid_and_stale_ids_are_dropped() {
        let log = Log::default();
        let mut slots = SlotTable::new(2);
        let id = pending(&mut slots, R::Save(single(&log)));
        let s = SurfaceKind::Web;

        for raw in [0, -1, -1000, 3, i64::MAX] {
            assert!(!dispatch(&mut slots, s, Delivery { id: raw, payload: Payload::Single(None) }));
        }
        assert!(entries(&log).is_empty());

        assert!(dispatch(&mut slots, s, Delivery { id, payload: Payload::Single(None) }));
        assert!(!dispatch(&mut slots, s, Delivery { id, payload: Payload::Single(None) }));
        assert_eq!(entries(&log), ["single:None"]);
    }

    #[test]
    fn reserved_but_unstored_id_is_dropped() {
        let mut slots = SlotTable::new(2);
        let id = slots.allocate().expect("free slot");
        assert!(!dispatch(
            &mut slots,
            SurfaceKind::Web,
            Delivery {
                id: id.into(),
                payload: Payload::Button(0)
            }
        ));
        assert_eq!(slots.in_flight(), 1);
    }

    #[test]
    fn courier_reports_closed_queue() {
        let (tx, rx) = mpsc::channel();
        let courier = Courier::new(tx);
        assert!(courier.deliver(5, Payload::Button(2)));
        assert_eq!(
            rx.recv().ok(),
            Some(Delivery {
                id: 5,
                payload: Payload::Button(2)
            })
        );
        drop(rx);
        assert!(!courier.deliver(5, Payload::Button(2)));
    }
}
