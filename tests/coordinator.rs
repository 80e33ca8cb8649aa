// End-to-end checks of request correlation through the public API, using the
// web surface over an in-memory bridge.

use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Arc, Mutex},
    thread,
};

use pick::{
    platform::web::{ReplyRelay, WebSurface},
    ButtonResult, ButtonSet, Config, Coordinator, FileOptions, MessageOptions, Payload, RequestId,
};

type Web = Coordinator<WebSurface<Vec<String>>>;
type Log = Arc<Mutex<Vec<(usize, Option<String>)>>>;

fn web(capacity: usize) -> Web {
    Coordinator::new(Config::with_max_requests(capacity), |courier, config| {
        WebSurface::new(Vec::new(), courier, config)
    })
}

fn relay(c: &Web) -> ReplyRelay {
    c.surface().relay()
}

fn posted(c: &Web) -> Vec<serde_json::Value> {
    c.surface()
        .bridge()
        .iter()
        .map(|text| serde_json::from_str(text).expect("command json"))
        .collect()
}

/// Issue a single-file pick whose callback records `(tag, path)`.
fn pick_tagged(c: &mut Web, log: &Log, tag: usize) -> Option<RequestId> {
    let log = Arc::clone(log);
    c.pick_file(&FileOptions::default(), move |path| {
        log.lock().unwrap().push((tag, path.map(str::to_owned)));
    })
}

#[test]
fn full_table_completes_in_any_order_without_cross_talk() {
    let log = Log::default();
    let mut c = web(64);
    let ids: Vec<RequestId> = (0..64)
        .map(|tag| pick_tagged(&mut c, &log, tag).expect("presented"))
        .collect();
    assert_eq!(c.in_flight(), 64);
    assert_eq!(posted(&c).len(), 64);

    // 37 is coprime with 64, so this visits every tag once, out of order.
    let relay = relay(&c);
    for step in 0..64 {
        let tag = (step * 37) % 64;
        let reply = serde_json::json!({
            "type": "single",
            "id": ids[tag].get(),
            "path": format!("/picked/{tag}.txt"),
        });
        assert!(relay.receive(&reply.to_string()));
    }
    assert_eq!(c.pump(), 64);
    assert_eq!(c.in_flight(), 0);

    let mut seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 64);
    seen.sort();
    for (tag, (got_tag, path)) in seen.into_iter().enumerate() {
        assert_eq!(got_tag, tag);
        assert_eq!(path, Some(format!("/picked/{tag}.txt")));
    }
}

#[test]
fn one_past_capacity_is_cancelled_synchronously() {
    let log = Log::default();
    let mut c = web(64);
    for tag in 0..64 {
        assert!(pick_tagged(&mut c, &log, tag).is_some());
    }

    assert!(pick_tagged(&mut c, &log, 64).is_none());
    assert_eq!(*log.lock().unwrap(), [(64, None)]);
    assert_eq!(posted(&c).len(), 64, "surface never contacted");
    assert_eq!(c.in_flight(), 64);
}

#[test]
fn invalid_ids_are_silent_no_ops() {
    let log = Log::default();
    let mut c = web(4);
    let id = pick_tagged(&mut c, &log, 0).expect("presented");

    for raw in [0, -1, -64, 5, 1_000_000] {
        assert!(!c.deliver(raw, Payload::Single(Some("/nope".into()))));
    }
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(c.in_flight(), 1);

    assert!(c.deliver(id.into(), Payload::Single(None)));
    assert!(!c.deliver(id.into(), Payload::Single(Some("/again".into()))));
    assert_eq!(*log.lock().unwrap(), [(0, None)]);
}

#[test]
fn stale_delivery_never_reaches_the_old_callback() {
    let log = Log::default();
    let mut c = web(2);
    let first = pick_tagged(&mut c, &log, 1).expect("presented");
    assert!(c.deliver(first.into(), Payload::Single(Some("/picked/one".into()))));

    // Duplicate reply for the freed id, before reuse.
    assert!(!c.deliver(first.into(), Payload::Single(Some("/picked/dup".into()))));

    // Fill the table so the freed id is handed out again.
    let second = pick_tagged(&mut c, &log, 2).expect("presented");
    let third = pick_tagged(&mut c, &log, 3).expect("presented");
    assert_ne!(second, third);
    assert_eq!(third, first, "id recycled after a full lap");

    assert!(c.deliver(first.into(), Payload::Single(Some("/picked/three".into()))));
    let seen = log.lock().unwrap().clone();
    assert_eq!(
        seen,
        [
            (1, Some("/picked/one".to_owned())),
            (3, Some("/picked/three".to_owned()))
        ]
    );
}

#[test]
fn web_round_trip_for_every_result_shape() {
    let mut c = web(8);
    let files = Arc::new(Mutex::new(Vec::new()));
    let folder = Arc::new(Mutex::new(None));
    let answer = Arc::new(Mutex::new(None));
    let exported = Arc::new(Mutex::new(None));

    let f = Arc::clone(&files);
    c.pick_files(&FileOptions::default(), move |paths| {
        f.lock().unwrap().extend_from_slice(paths);
    });
    let d = Arc::clone(&folder);
    c.pick_folder(&FileOptions::default(), move |path| {
        *d.lock().unwrap() = path.map(str::to_owned);
    });
    let a = Arc::clone(&answer);
    c.pick_message(
        &MessageOptions::new("Save", "Save changes?", ButtonSet::YesNoCancel),
        move |result| {
            *a.lock().unwrap() = Some(result);
        },
    );
    let e = Arc::clone(&exported);
    c.pick_export_file("/saved/report.csv", &FileOptions::default(), move |ok| {
        *e.lock().unwrap() = Some(ok);
    });

    let ops: Vec<String> = posted(&c)
        .iter()
        .map(|v| v["op"].as_str().expect("op").to_owned())
        .collect();
    assert_eq!(ops, ["open", "open", "message", "export"]);

    let relay = relay(&c);
    assert!(relay.receive(r#"{"type":"lines","id":1,"lines":"/picked/a.png\n/picked/b.png"}"#));
    let folder_reply = r#"{"type":"lines","id":2,"lines":"/picked/dir/x.txt\n/picked/dir/y.txt"}"#;
    assert!(relay.receive(folder_reply));
    // Web YES/NO/CANCEL appends Cancel, No, Yes.
    assert!(relay.receive(r#"{"type":"button","id":3,"index":2}"#));
    assert!(relay.receive(r#"{"type":"button","id":4,"index":0}"#));
    assert!(!relay.receive(r#"{"type":"button","id":4"#));
    assert_eq!(c.pump(), 4);

    assert_eq!(*files.lock().unwrap(), ["/picked/a.png", "/picked/b.png"]);
    assert_eq!(folder.lock().unwrap().as_deref(), Some("/picked/dir/x.txt"));
    assert_eq!(*answer.lock().unwrap(), Some(ButtonResult::Yes));
    assert_eq!(*exported.lock().unwrap(), Some(true));
}

#[test]
fn cancelled_multi_pick_yields_empty_list() {
    let mut c = web(2);
    let count = Arc::new(Mutex::new(None));
    let n = Arc::clone(&count);
    let id = c
        .pick_folders(&FileOptions::default(), move |paths| {
            *n.lock().unwrap() = Some(paths.len());
        })
        .expect("presented");
    let reply = format!(r#"{{"type":"lines","id":{},"lines":null}}"#, id.get());
    assert!(relay(&c).receive(&reply));
    assert_eq!(c.pump(), 1);
    assert_eq!(*count.lock().unwrap(), Some(0));
}

#[test]
fn handles_from_many_threads_are_served_by_pump() {
    let mut c = web(16);
    let results = Arc::new(Mutex::new(Vec::new()));

    let workers: Vec<_> = (0..4)
        .map(|n| {
            let handle = c.handle();
            let results = Arc::clone(&results);
            thread::spawn(move || {
                handle.pick_confirm("Confirm", &format!("Step {n}?"), None, move |r| {
                    results.lock().unwrap().push((n, r));
                });
            })
        })
        .collect();
    for w in workers {
        w.join().expect("worker");
    }

    assert_eq!(c.pump(), 0);
    let commands = posted(&c);
    assert_eq!(commands.len(), 4);

    // Answer each confirm according to which step it was for; OK sits at
    // index 1 on the web surface, Cancel at 0.
    let relay = relay(&c);
    for cmd in &commands {
        let step: usize = cmd["message"]
            .as_str()
            .and_then(|m| m.strip_prefix("Step "))
            .and_then(|m| m.strip_suffix('?'))
            .and_then(|m| m.parse().ok())
            .expect("step number");
        let reply = serde_json::json!({"type": "button", "id": cmd["id"], "index": step % 2});
        assert!(relay.receive(&reply.to_string()));
    }
    assert_eq!(c.pump(), 4);

    let mut got = results.lock().unwrap().clone();
    got.sort_by_key(|(n, _)| *n);
    assert_eq!(
        got,
        [
            (0, ButtonResult::Cancel),
            (1, ButtonResult::Ok),
            (2, ButtonResult::Cancel),
            (3, ButtonResult::Ok)
        ]
    );
}

#[test]
fn independent_coordinators_share_nothing() {
    let log = Log::default();
    let mut a = web(1);
    let mut b = web(1);
    let ia = pick_tagged(&mut a, &log, 0).expect("presented");
    let ib = pick_tagged(&mut b, &log, 1).expect("presented");
    assert_eq!(ia, ib);

    assert!(b.deliver(ib.into(), Payload::Single(Some("/b".into()))));
    assert_eq!(a.in_flight(), 1);
    assert_eq!(*log.lock().unwrap(), [(1, Some("/b".to_owned()))]);
}

#[test]
fn single_pick_with_allow_multiple_keeps_the_first_choice() {
    let log = Log::default();
    let mut c = web(2);
    let options = FileOptions {
        allow_multiple: true,
        ..FileOptions::default()
    };
    let l = Arc::clone(&log);
    let id = c
        .pick_file(&options, move |path| {
            l.lock().unwrap().push((0, path.map(str::to_owned)));
        })
        .expect("presented");
    assert_eq!(posted(&c)[0]["allow_multiple"], true);

    let reply = serde_json::json!({
        "type": "lines",
        "id": id.get(),
        "lines": "/picked/a.png\n/picked/b.png",
    });
    assert!(relay(&c).receive(&reply.to_string()));
    assert_eq!(c.pump(), 1);
    assert_eq!(*log.lock().unwrap(), [(0, Some("/picked/a.png".to_owned()))]);
}

#[test]
fn reply_hook_completes_requests_without_a_host_pump() {
    let log = Log::default();
    let mut c = web(2);
    let id = pick_tagged(&mut c, &log, 7).expect("presented");

    let shared: Rc<RefCell<Option<Web>>> = Rc::default();
    let hook = Rc::clone(&shared);
    let mut relay = relay(&c).notify(move || {
        if let Some(c) = hook.borrow_mut().as_mut() {
            c.pump();
        }
    });
    *shared.borrow_mut() = Some(c);

    let reply = serde_json::json!({"type": "single", "id": id.get(), "path": "/picked/hooked"});
    assert!(relay.receive(&reply.to_string()));
    assert_eq!(*log.lock().unwrap(), [(7, Some("/picked/hooked".to_owned()))]);
    assert_eq!(shared.borrow().as_ref().map(|c| c.in_flight()), Some(0));
}
