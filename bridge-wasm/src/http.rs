//! WebAssembly implementation of the `HttpTransport` bridge trait.
//!
//! Plain requests go through the browser's `fetch` API. Uploads that want
//! progress go through `XMLHttpRequest`, whose upload target emits `progress`
//! events; `fetch` has no equivalent. Both paths abort the request when the
//! per-request timeout elapses.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    HttpRequest, HttpResponse, HttpTransport, MultipartForm, ProgressCallback, RequestBody,
    TransportError, UploadProgress,
};
use bytes::Bytes;
use futures::{
    channel::oneshot,
    future::{select, Either},
    pin_mut, FutureExt,
};
use gloo_timers::future::TimeoutFuture;
use js_sys::{try_iter, Array, Object, Uint8Array};
use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};
use tracing::debug;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AbortController, Blob, BlobPropertyBag, FormData, ProgressEvent, Request, RequestInit,
    RequestMode, Response, Window, XmlHttpRequest, XmlHttpRequestResponseType,
    XmlHttpRequestUpload,
};

use crate::error::{js_message, js_request_error};

/// Transport backed by the browser's `fetch` API, with `XMLHttpRequest` for
/// uploads that report progress.
pub struct FetchTransport {
    window: Window,
}

impl FetchTransport {
    /// Create a transport bound to the current browser window.
    pub fn new() -> BridgeResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".to_string()))?;
        Ok(Self { window })
    }

    fn build_request(
        &self,
        request: &HttpRequest,
        signal: Option<&web_sys::AbortSignal>,
    ) -> Result<Request, TransportError> {
        let init = RequestInit::new();
        init.set_method(request.method.as_str());
        init.set_mode(RequestMode::Cors);

        if let Some(signal) = signal {
            init.set_signal(Some(signal));
        }

        match &request.body {
            Some(RequestBody::Bytes(body)) => {
                let body_array = Uint8Array::from(body.as_ref());
                init.set_body(&JsValue::from(body_array));
            }
            Some(RequestBody::Multipart(form)) => {
                init.set_body(&JsValue::from(build_form_data(form)?));
            }
            None => {}
        }

        let headers =
            web_sys::Headers::new().map_err(|err| js_request_error("create headers", err))?;
        for (key, value) in &request.headers {
            headers
                .set(key, value)
                .map_err(|err| js_request_error("set header", err))?;
        }
        init.set_headers(&headers);

        Request::new_with_str_and_init(&request.url, &init)
            .map_err(|err| js_request_error("build request", err))
    }

    async fn fetch_with_timeout(
        &self,
        req: &Request,
        controller: Option<AbortController>,
        timeout: Option<Duration>,
    ) -> Result<Response, TransportError> {
        let fetch = JsFuture::from(self.window.fetch_with_request(req));

        let result = if let (Some(timeout), Some(controller)) = (timeout, controller) {
            let timeout_ms = timeout.as_millis().min(u32::MAX as u128) as u32;
            let timeout_fut = TimeoutFuture::new(timeout_ms).map(|_| ());
            pin_mut!(timeout_fut);
            pin_mut!(fetch);

            match select(fetch, timeout_fut).await {
                Either::Left((response, _)) => response,
                Either::Right((_, pending_fetch)) => {
                    controller.abort();
                    // Poll once more so the aborted fetch settles.
                    let _ = pending_fetch.await;
                    return Err(TransportError::Timeout(timeout));
                }
            }
        } else {
            fetch.await
        };

        // fetch only rejects when no response arrived (DNS, CORS, offline).
        let js_value = result.map_err(|err| TransportError::Connect(js_message(&err)))?;
        js_value
            .dyn_into::<Response>()
            .map_err(|_| TransportError::Other("fetch returned non-Response".into()))
    }

    async fn read_body(response: &Response) -> Result<Bytes, TransportError> {
        let promise = response
            .array_buffer()
            .map_err(|err| TransportError::Other(js_message(&err)))?;
        let buffer = JsFuture::from(promise)
            .await
            .map_err(|err| TransportError::Other(js_message(&err)))?;
        let array = Uint8Array::new(&buffer);
        let mut bytes = vec![0u8; array.length() as usize];
        array.copy_to(&mut bytes);
        Ok(Bytes::from(bytes))
    }

    fn collect_headers(response: &Response) -> HashMap<String, String> {
        let mut map = HashMap::new();
        let Ok(Some(iterator)) = try_iter(&JsValue::from(response.headers())) else {
            return map;
        };

        for entry in iterator.flatten() {
            let pair = Array::from(&entry);
            if pair.length() >= 2 {
                if let (Some(key), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string())
                {
                    map.insert(key, value);
                }
            }
        }

        map
    }
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let controller = if request.timeout.is_some() {
            Some(
                AbortController::new()
                    .map_err(|err| js_request_error("create abort controller", err))?,
            )
        } else {
            None
        };

        let signal = controller.as_ref().map(|c| c.signal());
        let req = self.build_request(&request, signal.as_ref())?;
        let response = self
            .fetch_with_timeout(&req, controller, request.timeout)
            .await?;
        let body = Self::read_body(&response).await?;
        let headers = Self::collect_headers(&response);

        debug!(
            method = %request.method,
            url = %request.url,
            status = response.status(),
            "fetch completed"
        );

        Ok(HttpResponse {
            status: response.status(),
            headers,
            body,
        })
    }

    async fn send_with_progress(
        &self,
        request: HttpRequest,
        progress: ProgressCallback,
    ) -> Result<HttpResponse, TransportError> {
        let xhr = XmlHttpRequest::new()
            .map_err(|err| js_request_error("create XMLHttpRequest", err))?;
        xhr.open_with_async(request.method.as_str(), &request.url, true)
            .map_err(|err| js_request_error("open XMLHttpRequest", err))?;
        xhr.set_response_type(XmlHttpRequestResponseType::Arraybuffer);
        for (key, value) in &request.headers {
            xhr.set_request_header(key, value)
                .map_err(|err| js_request_error("set header", err))?;
        }

        let upload = xhr
            .upload()
            .map_err(|err| js_request_error("upload target", err))?;
        let on_progress = Closure::<dyn FnMut(ProgressEvent)>::new(move |event: ProgressEvent| {
            progress(progress_sample(&event));
        });
        upload.set_onprogress(Some(on_progress.as_ref().unchecked_ref()));

        let (tx, rx) = oneshot::channel();
        let tx = Rc::new(RefCell::new(Some(tx)));
        let on_load = settle_on(&tx, Settled::Loaded);
        let on_error = settle_on(&tx, Settled::Failed);
        xhr.set_onload(Some(on_load.as_ref().unchecked_ref()));
        xhr.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let sent = match &request.body {
            Some(RequestBody::Bytes(body)) => {
                let body: Object = Uint8Array::from(body.as_ref()).into();
                xhr.send_with_opt_buffer_source(Some(&body))
            }
            Some(RequestBody::Multipart(form)) => {
                xhr.send_with_opt_form_data(Some(&build_form_data(form)?))
            }
            None => xhr.send(),
        };
        if let Err(err) = sent {
            detach_handlers(&xhr, &upload);
            return Err(TransportError::Connect(js_message(&err)));
        }

        let settled = match request.timeout {
            Some(timeout) => {
                let timeout_ms = timeout.as_millis().min(u32::MAX as u128) as u32;
                let timer = TimeoutFuture::new(timeout_ms);
                pin_mut!(timer);
                match select(rx, timer).await {
                    Either::Left((settled, _)) => settled.ok(),
                    Either::Right(_) => {
                        detach_handlers(&xhr, &upload);
                        let _ = xhr.abort();
                        return Err(TransportError::Timeout(timeout));
                    }
                }
            }
            None => rx.await.ok(),
        };
        detach_handlers(&xhr, &upload);

        match settled {
            Some(Settled::Loaded) => {
                let response = read_xhr_response(&xhr)?;
                debug!(
                    method = %request.method,
                    url = %request.url,
                    status = response.status,
                    "upload completed"
                );
                Ok(response)
            }
            Some(Settled::Failed) => Err(TransportError::Connect(
                "XMLHttpRequest network error".to_string(),
            )),
            None => Err(TransportError::Other(
                "XMLHttpRequest dropped before settling".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Settled {
    Loaded,
    Failed,
}

fn settle_on(
    tx: &Rc<RefCell<Option<oneshot::Sender<Settled>>>>,
    outcome: Settled,
) -> Closure<dyn FnMut()> {
    let tx = Rc::clone(tx);
    Closure::<dyn FnMut()>::new(move || {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(outcome);
        }
    })
}

// The closures are dropped when the caller returns; the XHR must not call them after that.
fn detach_handlers(xhr: &XmlHttpRequest, upload: &XmlHttpRequestUpload) {
    upload.set_onprogress(None);
    xhr.set_onload(None);
    xhr.set_onerror(None);
}

fn progress_sample(event: &ProgressEvent) -> UploadProgress {
    UploadProgress {
        loaded: event.loaded() as u64,
        total: event
            .length_computable()
            .then(|| event.total() as u64),
    }
}

fn read_xhr_response(xhr: &XmlHttpRequest) -> Result<HttpResponse, TransportError> {
    let status = xhr
        .status()
        .map_err(|err| TransportError::Other(js_message(&err)))?;
    let body = match xhr.response() {
        Ok(buffer) if !buffer.is_null() && !buffer.is_undefined() => {
            Bytes::from(Uint8Array::new(&buffer).to_vec())
        }
        Ok(_) => Bytes::new(),
        Err(err) => return Err(TransportError::Other(js_message(&err))),
    };
    let headers = xhr
        .get_all_response_headers()
        .map(|raw| parse_header_block(&raw))
        .unwrap_or_default();

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

/// Parse the `name: value` lines returned by `getAllResponseHeaders`.
fn parse_header_block(raw: &str) -> HashMap<String, String> {
    raw.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

fn build_form_data(form: &MultipartForm) -> Result<FormData, TransportError> {
    let data = FormData::new().map_err(|err| js_request_error("create form data", err))?;

    for (name, value) in &form.text_fields {
        data.append_with_str(name, value)
            .map_err(|err| js_request_error("append form field", err))?;
    }

    for file in &form.files {
        let parts = Array::of1(&Uint8Array::from(file.data.as_ref()));
        let options = BlobPropertyBag::new();
        if let Some(content_type) = &file.content_type {
            options.set_type(content_type);
        }
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|err| js_request_error("create blob", err))?;
        data.append_with_blob_and_filename(&file.field_name, &blob, &file.file_name)
            .map_err(|err| js_request_error("append form file", err))?;
    }

    Ok(data)
}
