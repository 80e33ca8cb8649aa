// ── wasm-bindgen binding of the script bridge ─────────────────────────────────
//
// Expects the page to define a global `pickBridge` object:
//
//   pickBridge.post(json)        show the dialog described by `json`
//   pickBridge.connect(onReply)  register the reply callback, called with
//                                one JSON reply string per finished dialog

use wasm_bindgen::prelude::*;

use crate::{
    config::Config,
    dispatch::Courier,
    error::{PickError, Result},
};

use super::{ReplyRelay, ScriptBridge, WebSurface};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = pickBridge, js_name = post, catch)]
    fn bridge_post(command: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = pickBridge, js_name = connect)]
    fn bridge_connect(on_reply: &Closure<dyn FnMut(String)>);
}

/// Bridge to the page's `pickBridge` object.
///
/// Owns the reply closure; dropping the bridge invalidates the callback the
/// page holds, so keep the surface alive for as long as dialogs may finish.
pub struct JsBridge {
    _on_reply: Closure<dyn FnMut(String)>,
}

impl JsBridge {
    /// Register `relay` as the page's reply callback.
    pub fn connect(relay: ReplyRelay) -> Self {
        Self::connect_with(relay, || {})
    }

    /// Register `relay`, running `after_reply` once each reply is queued.
    pub fn connect_with(relay: ReplyRelay, after_reply: impl FnMut() + 'static) -> Self {
        let mut relay = relay.notify(after_reply);
        let on_reply = Closure::wrap(Box::new(move |reply: String| {
            relay.receive(&reply);
        }) as Box<dyn FnMut(String)>);
        bridge_connect(&on_reply);
        Self { _on_reply: on_reply }
    }
}

impl ScriptBridge for JsBridge {
    fn post(&mut self, command: &str) -> Result<()> {
        bridge_post(command).map_err(|e| PickError::Script(format!("{e:?}")))
    }
}

/// A web surface wired to the page, for use as a coordinator builder:
/// `Coordinator::new(config, page_surface)`.
///
/// Replies are only queued here.  Callbacks run on the host's next
/// `Coordinator::pump`; use [`page_surface_with`] to pump as replies arrive.
pub fn page_surface(courier: Courier, config: &Config) -> WebSurface<JsBridge> {
    let bridge = JsBridge::connect(ReplyRelay::new(courier.clone()));
    WebSurface::new(bridge, courier, config)
}

/// Builder like [`page_surface`] whose bridge runs `after_reply` once each
/// page reply has been queued.
///
/// The hook runs from the page's event loop, outside any coordinator call,
/// so it may borrow a shared coordinator and `pump` it:
///
/// ```ignore
/// let pick: Rc<RefCell<Option<Coordinator<WebSurface<JsBridge>>>>> = Rc::default();
/// let hook = Rc::clone(&pick);
/// let built = Coordinator::new(config, page_surface_with(move || {
///     if let Some(c) = hook.borrow_mut().as_mut() {
///         c.pump();
///     }
/// }));
/// *pick.borrow_mut() = Some(built);
/// ```
pub fn page_surface_with(
    after_reply: impl FnMut() + 'static,
) -> impl FnOnce(Courier, &Config) -> WebSurface<JsBridge> {
    move |courier: Courier, config: &Config| {
        let bridge = JsBridge::connect_with(ReplyRelay::new(courier.clone()), after_reply);
        WebSurface::new(bridge, courier, config)
    }
}
