//! Capacitor shell and plugin bindings.
//!
//! Inside the packaged app the wasm build runs in the shell's web view, where
//! Capacitor injects a global `Capacitor` object. [`CapacitorShell`] answers
//! the platform probe from it and [`CapacitorModuleLoader`] resolves the
//! registered plugins (`Capacitor.Plugins.*`) into bridge modules. In a plain
//! browser there is no `Capacitor` global: the shell reports "not native" and
//! every plugin lookup fails with `NotAvailable`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::{
    error::Result as BridgeResult, AppModule, AppState, BackButtonEvent, ConnectionType,
    EventCallback, HapticsModule, ImpactStyle, KeyboardEvent, KeyboardModule, ListenerHandle,
    NativeModuleLoader, NativeShell, NetworkModule, NetworkStatus, NotificationKind,
    StatusBarModule, StatusBarStyle,
};
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde::Deserialize;
use tracing::{debug, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};

use crate::error::{js_error, WasmError, WasmResult};

const STATUS_BAR: &str = "StatusBar";
const KEYBOARD: &str = "Keyboard";
const HAPTICS: &str = "Haptics";
const APP: &str = "App";
const NETWORK: &str = "Network";

fn capacitor_global() -> Option<JsValue> {
    let value = Reflect::get(&js_sys::global(), &JsValue::from_str("Capacitor")).ok()?;
    (!value.is_undefined() && !value.is_null()).then_some(value)
}

fn call_method(target: &JsValue, method: &str, args: &[&JsValue]) -> WasmResult<JsValue> {
    let function = Reflect::get(target, &JsValue::from_str(method))?
        .dyn_into::<Function>()
        .map_err(|_| WasmError::NotAvailable(format!("{method} is not a function")))?;

    let arguments = Array::new();
    for arg in args {
        arguments.push(arg);
    }

    function
        .apply(target, &arguments)
        .map_err(|err| WasmError::js(method, err))
}

fn options(entries: &[(&str, &str)]) -> JsValue {
    let object = Object::new();
    for (key, value) in entries {
        let _ = Reflect::set(&object, &JsValue::from_str(key), &JsValue::from_str(value));
    }
    object.into()
}

/// [`NativeShell`] backed by the `Capacitor` global.
#[derive(Debug, Default, Clone, Copy)]
pub struct CapacitorShell;

impl NativeShell for CapacitorShell {
    fn is_native_platform(&self) -> BridgeResult<bool> {
        let Some(capacitor) = capacitor_global() else {
            return Ok(false);
        };
        Ok(call_method(&capacitor, "isNativePlatform", &[])?
            .as_bool()
            .unwrap_or(false))
    }

    fn platform_name(&self) -> BridgeResult<String> {
        let capacitor = capacitor_global()
            .ok_or_else(|| WasmError::NotAvailable("Capacitor".to_string()))?;
        let name = call_method(&capacitor, "getPlatform", &[])?
            .as_string()
            .ok_or_else(|| WasmError::Payload("getPlatform returned a non-string".to_string()))?;
        Ok(name)
    }
}

/// A registered Capacitor plugin object.
struct Plugin {
    name: &'static str,
    object: JsValue,
}

impl Plugin {
    fn lookup(name: &'static str) -> WasmResult<Self> {
        let capacitor = capacitor_global()
            .ok_or_else(|| WasmError::NotAvailable("Capacitor".to_string()))?;
        let plugins = Reflect::get(&capacitor, &JsValue::from_str("Plugins"))?;
        let object = Reflect::get(&plugins, &JsValue::from_str(name))?;
        if object.is_undefined() || object.is_null() {
            return Err(WasmError::NotAvailable(format!("Capacitor plugin {name}")));
        }
        debug!(plugin = name, "Capacitor plugin resolved");
        Ok(Self { name, object })
    }

    /// Invoke a plugin method and await its promise.
    async fn call(&self, method: &str, options: Option<JsValue>) -> BridgeResult<JsValue> {
        let context = format!("{}.{}", self.name, method);
        let result = match &options {
            Some(options) => call_method(&self.object, method, &[options])?,
            None => call_method(&self.object, method, &[])?,
        };
        JsFuture::from(Promise::resolve(&result))
            .await
            .map_err(|err| js_error(&context, err))
    }

    fn listen<T, D>(
        &self,
        event: &'static str,
        decode: D,
        callback: EventCallback<T>,
    ) -> BridgeResult<Box<dyn ListenerHandle>>
    where
        T: 'static,
        D: Fn(JsValue) -> WasmResult<T> + 'static,
    {
        let active = Rc::new(Cell::new(true));
        let gate = Rc::clone(&active);
        let plugin = self.name;
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
            if !gate.get() {
                return;
            }
            match decode(payload) {
                Ok(value) => callback(value),
                Err(e) => warn!(plugin, event, error = %e, "Ignoring malformed plugin event"),
            }
        });

        let registration = call_method(
            &self.object,
            "addListener",
            &[&JsValue::from_str(event), closure.as_ref()],
        )?;

        Ok(Box::new(PluginListener::new(registration, closure, active)))
    }
}

struct ListenerState {
    handle: Option<JsValue>,
    removed: bool,
    closure: Option<Closure<dyn FnMut(JsValue)>>,
}

/// Handle for a plugin listener.
///
/// `addListener` resolves its handle asynchronously; a removal requested
/// before that is applied as soon as the handle arrives. The closure stays
/// alive until the plugin has let go of it.
struct PluginListener {
    state: Rc<RefCell<ListenerState>>,
    active: Rc<Cell<bool>>,
}

impl PluginListener {
    fn new(
        registration: JsValue,
        closure: Closure<dyn FnMut(JsValue)>,
        active: Rc<Cell<bool>>,
    ) -> Self {
        let state = Rc::new(RefCell::new(ListenerState {
            handle: None,
            removed: false,
            closure: Some(closure),
        }));

        let pending = Rc::clone(&state);
        spawn_local(async move {
            let resolved = JsFuture::from(Promise::resolve(&registration)).await;
            let mut state = pending.borrow_mut();
            match resolved {
                Ok(handle) if state.removed => {
                    release(&handle);
                    state.closure = None;
                }
                Ok(handle) => state.handle = Some(handle),
                Err(err) => warn!(error = %js_error("addListener", err), "Plugin listener not installed"),
            }
        });

        Self { state, active }
    }
}

impl ListenerHandle for PluginListener {
    fn remove(self: Box<Self>) {
        self.active.set(false);
        let mut state = self.state.borrow_mut();
        state.removed = true;
        if let Some(handle) = state.handle.take() {
            release(&handle);
            state.closure = None;
        }
    }
}

fn release(handle: &JsValue) {
    if let Err(e) = call_method(handle, "remove", &[]) {
        warn!(error = %e, "Failed to remove plugin listener");
    }
}

/// Several listeners removed together.
struct ListenerGroup(Vec<Box<dyn ListenerHandle>>);

impl ListenerHandle for ListenerGroup {
    fn remove(self: Box<Self>) {
        for handle in self.0 {
            handle.remove();
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyboardInfo {
    keyboard_height: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateChange {
    is_active: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackButton {
    can_go_back: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionStatus {
    connected: bool,
    connection_type: String,
}

impl From<ConnectionStatus> for NetworkStatus {
    fn from(status: ConnectionStatus) -> Self {
        let connection_type = match status.connection_type.as_str() {
            "wifi" => ConnectionType::Wifi,
            "cellular" => ConnectionType::Cellular,
            "none" => ConnectionType::None,
            _ => ConnectionType::Unknown,
        };
        NetworkStatus {
            connected: status.connected,
            connection_type,
        }
    }
}

fn decode_network(payload: JsValue) -> WasmResult<NetworkStatus> {
    Ok(serde_wasm_bindgen::from_value::<ConnectionStatus>(payload)?.into())
}

/// `@capacitor/status-bar`
pub struct CapacitorStatusBar {
    plugin: Plugin,
}

#[async_trait(?Send)]
impl StatusBarModule for CapacitorStatusBar {
    async fn set_style(&self, style: StatusBarStyle) -> BridgeResult<()> {
        self.plugin
            .call("setStyle", Some(options(&[("style", style.as_str())])))
            .await?;
        Ok(())
    }

    async fn set_background_color(&self, color: &str) -> BridgeResult<()> {
        self.plugin
            .call("setBackgroundColor", Some(options(&[("color", color)])))
            .await?;
        Ok(())
    }
}

/// `@capacitor/haptics`
pub struct CapacitorHaptics {
    plugin: Plugin,
}

#[async_trait(?Send)]
impl HapticsModule for CapacitorHaptics {
    async fn impact(&self, style: ImpactStyle) -> BridgeResult<()> {
        let style = match style {
            ImpactStyle::Light => "LIGHT",
            ImpactStyle::Medium => "MEDIUM",
            ImpactStyle::Heavy => "HEAVY",
        };
        self.plugin
            .call("impact", Some(options(&[("style", style)])))
            .await?;
        Ok(())
    }

    async fn notification(&self, kind: NotificationKind) -> BridgeResult<()> {
        let kind = match kind {
            NotificationKind::Success => "SUCCESS",
            NotificationKind::Warning => "WARNING",
            NotificationKind::Error => "ERROR",
        };
        self.plugin
            .call("notification", Some(options(&[("type", kind)])))
            .await?;
        Ok(())
    }
}

/// `@capacitor/keyboard`
pub struct CapacitorKeyboard {
    plugin: Plugin,
}

#[async_trait(?Send)]
impl KeyboardModule for CapacitorKeyboard {
    fn add_listener(
        &self,
        callback: EventCallback<KeyboardEvent>,
    ) -> BridgeResult<Box<dyn ListenerHandle>> {
        let show = self.plugin.listen(
            "keyboardWillShow",
            |payload| {
                let info: KeyboardInfo = serde_wasm_bindgen::from_value(payload)?;
                Ok(KeyboardEvent::WillShow {
                    keyboard_height: info.keyboard_height.max(0.0).round() as u32,
                })
            },
            Arc::clone(&callback),
        )?;

        let hide = match self
            .plugin
            .listen("keyboardWillHide", |_| Ok(KeyboardEvent::WillHide), callback)
        {
            Ok(hide) => hide,
            Err(e) => {
                show.remove();
                return Err(e);
            }
        };

        Ok(Box::new(ListenerGroup(vec![show, hide])))
    }

    async fn hide(&self) -> BridgeResult<()> {
        self.plugin.call("hide", None).await?;
        Ok(())
    }
}

/// `@capacitor/app`
pub struct CapacitorApp {
    plugin: Plugin,
}

impl AppModule for CapacitorApp {
    fn add_state_listener(
        &self,
        callback: EventCallback<AppState>,
    ) -> BridgeResult<Box<dyn ListenerHandle>> {
        self.plugin.listen(
            "appStateChange",
            |payload| {
                let change: StateChange = serde_wasm_bindgen::from_value(payload)?;
                Ok(AppState::from_active(change.is_active))
            },
            callback,
        )
    }

    fn add_back_button_listener(
        &self,
        callback: EventCallback<BackButtonEvent>,
    ) -> BridgeResult<Box<dyn ListenerHandle>> {
        self.plugin.listen(
            "backButton",
            |payload| {
                let event: BackButton = serde_wasm_bindgen::from_value(payload)?;
                Ok(BackButtonEvent {
                    can_go_back: event.can_go_back,
                })
            },
            callback,
        )
    }
}

/// `@capacitor/network`
pub struct CapacitorNetwork {
    plugin: Plugin,
}

#[async_trait(?Send)]
impl NetworkModule for CapacitorNetwork {
    async fn get_status(&self) -> BridgeResult<NetworkStatus> {
        let payload = self.plugin.call("getStatus", None).await?;
        Ok(decode_network(payload)?)
    }

    fn add_status_listener(
        &self,
        callback: EventCallback<NetworkStatus>,
    ) -> BridgeResult<Box<dyn ListenerHandle>> {
        self.plugin
            .listen("networkStatusChange", decode_network, callback)
    }
}

/// [`NativeModuleLoader`] resolving modules from `Capacitor.Plugins`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CapacitorModuleLoader;

#[async_trait(?Send)]
impl NativeModuleLoader for CapacitorModuleLoader {
    async fn load_status_bar(&self) -> BridgeResult<Arc<dyn StatusBarModule>> {
        Ok(Arc::new(CapacitorStatusBar {
            plugin: Plugin::lookup(STATUS_BAR)?,
        }))
    }

    async fn load_keyboard(&self) -> BridgeResult<Arc<dyn KeyboardModule>> {
        Ok(Arc::new(CapacitorKeyboard {
            plugin: Plugin::lookup(KEYBOARD)?,
        }))
    }

    async fn load_haptics(&self) -> BridgeResult<Arc<dyn HapticsModule>> {
        Ok(Arc::new(CapacitorHaptics {
            plugin: Plugin::lookup(HAPTICS)?,
        }))
    }

    async fn load_app(&self) -> BridgeResult<Arc<dyn AppModule>> {
        Ok(Arc::new(CapacitorApp {
            plugin: Plugin::lookup(APP)?,
        }))
    }

    async fn load_network(&self) -> BridgeResult<Arc<dyn NetworkModule>> {
        Ok(Arc::new(CapacitorNetwork {
            plugin: Plugin::lookup(NETWORK)?,
        }))
    }
}
