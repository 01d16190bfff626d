#![cfg(target_arch = "wasm32")]
//! Browser tests for the web bridges.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use bridge_traits::{
    HttpMethod, HttpRequest, HttpTransport, MultipartFile, MultipartForm, NativeModuleLoader,
    NativeShell, TokenStore, TransportError, UploadProgress, WebHost, WindowEvent,
};
use bytes::Bytes;
use bridge_wasm::{
    CapacitorModuleLoader, CapacitorShell, FetchTransport, LocalStorageTokenStore, WebSysHost,
};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_plain_browser_is_not_native() {
    assert!(!CapacitorShell.is_native_platform().unwrap());
    assert!(CapacitorShell.platform_name().is_err());
}

#[wasm_bindgen_test]
async fn test_plugins_unavailable_without_capacitor() {
    assert!(CapacitorModuleLoader.load_network().await.is_err());
    assert!(CapacitorModuleLoader.load_status_bar().await.is_err());
}

#[wasm_bindgen_test]
fn test_token_store_round_trip() {
    let store = LocalStorageTokenStore::with_key("test_auth_token").unwrap();
    store.clear();
    assert_eq!(store.read(), None);

    store.store("abc").unwrap();
    assert_eq!(store.read(), Some("abc".to_string()));

    store.clear();
    assert_eq!(store.read(), None);
}

#[wasm_bindgen_test]
fn test_unset_css_property_reads_none() {
    let host = WebSysHost::new().unwrap();
    assert_eq!(host.css_custom_property("--safe-area-inset-top"), None);
}

#[wasm_bindgen_test]
fn test_window_listener_fires_until_removed() {
    let host = WebSysHost::new().unwrap();
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let handle = host
        .add_window_listener(
            WindowEvent::Resize,
            Arc::new(move |_| counter.set(counter.get() + 1)),
        )
        .unwrap();

    let window = web_sys::window().unwrap();
    let event = web_sys::Event::new("resize").unwrap();
    window.dispatch_event(&event).unwrap();
    assert_eq!(hits.get(), 1);

    handle.remove();
    window.dispatch_event(&event).unwrap();
    assert_eq!(hits.get(), 1);
}

#[wasm_bindgen_test]
async fn test_unreachable_host_is_connect_error() {
    let transport = FetchTransport::new().unwrap();
    let err = transport
        .send(HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:9/"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Connect(_)));
}

#[wasm_bindgen_test]
async fn test_upload_reports_progress_with_known_total() {
    let origin = web_sys::window().unwrap().location().origin().unwrap();
    let form = MultipartForm::new().file(MultipartFile {
        field_name: "file".into(),
        file_name: "cover.png".into(),
        content_type: Some("image/png".into()),
        data: Bytes::from(vec![7u8; 4096]),
    });
    let request = HttpRequest::new(HttpMethod::Post, format!("{origin}/upload")).multipart(form);

    let samples: Rc<RefCell<Vec<UploadProgress>>> = Rc::default();
    let sink = Rc::clone(&samples);
    let transport = FetchTransport::new().unwrap();
    transport
        .send_with_progress(request, Arc::new(move |p| sink.borrow_mut().push(p)))
        .await
        .unwrap();

    let samples = samples.borrow();
    let last = samples.last().expect("at least one progress sample");
    assert_eq!(last.total, Some(last.loaded));
    assert!(last.loaded >= 4096);
}

#[wasm_bindgen_test]
async fn test_upload_to_unreachable_host_is_connect_error() {
    let transport = FetchTransport::new().unwrap();
    let request = HttpRequest::new(HttpMethod::Post, "http://127.0.0.1:9/upload")
        .multipart(MultipartForm::new().text("name", "cover"));
    let err = transport
        .send_with_progress(request, Arc::new(|_| {}))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Connect(_)));
}
