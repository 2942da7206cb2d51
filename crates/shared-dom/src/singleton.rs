//! One live agent per page
//!
//! Each agent publishes `{ destroy }` on `window` under a fixed name. A
//! freshly injected copy calls the predecessor's `destroy` before it builds
//! anything, so repeated injection never stacks observers or timers.

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Tear down whatever agent is published under `name`.
///
/// Returns whether a predecessor was found.
pub fn destroy_previous(name: &str) -> Result<bool, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let existing = Reflect::get(&window, &name.into())?;
    if existing.is_undefined() || existing.is_null() {
        return Ok(false);
    }

    let destroy = Reflect::get(&existing, &"destroy".into())?;
    if let Some(destroy) = destroy.dyn_ref::<Function>() {
        destroy.call0(&existing)?;
    }
    Reflect::set(&window, &name.into(), &JsValue::NULL)?;
    Ok(true)
}

/// Publish `destroy` under `name`.
///
/// The hook closure is leaked on purpose: it may run from a foreign module
/// instance after this one has dropped everything else.
pub fn publish(name: &str, destroy: impl FnMut() + 'static) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let hook = Closure::wrap(Box::new(destroy) as Box<dyn FnMut()>);

    let handle = Object::new();
    Reflect::set(&handle, &"destroy".into(), hook.as_ref())?;
    Reflect::set(&window, &name.into(), &handle)?;
    hook.forget();
    Ok(())
}

/// Drop the published handle, leaving `window[name]` null
pub fn unpublish(name: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    Reflect::set(&window, &name.into(), &JsValue::NULL)?;
    Ok(())
}
