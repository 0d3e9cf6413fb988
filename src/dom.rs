use pulsegrid_core::SetupError;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn canvas_by_id(
    document: &web::Document,
    id: &'static str,
) -> Result<web::HtmlCanvasElement, SetupError> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web::HtmlCanvasElement>().ok())
        .ok_or(SetupError::MissingElement(id))
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        log::warn!("[dom] no #{} to attach a click handler to", element_id);
    }
}

/// Range input: `handler` receives the parsed value on every `input` event.
/// Presses on the slider do not propagate past it.
pub fn add_range_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut(f32) + 'static,
) {
    let Some(input) = document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
    else {
        log::warn!("[dom] no range input #{}", element_id);
        return;
    };
    let input_for_cb = input.clone();
    let closure = Closure::wrap(Box::new(move || {
        match input_for_cb.value().parse::<f32>() {
            Ok(v) => handler(v),
            Err(e) => log::warn!("[dom] unparsable slider value: {}", e),
        }
    }) as Box<dyn FnMut()>);
    _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
    closure.forget();

    // dragging a slider must not reach window-level pointer handlers
    let swallow = Closure::wrap(
        Box::new(|ev: web::Event| ev.stop_propagation()) as Box<dyn FnMut(web::Event)>
    );
    _ = input.add_event_listener_with_callback("mousedown", swallow.as_ref().unchecked_ref());
    swallow.forget();
}

/// File input: `handler` receives the first selected file.
pub fn add_file_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut(web::File) + 'static,
) {
    let Some(input) = document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
    else {
        log::warn!("[dom] no file input #{}", element_id);
        return;
    };
    let input_for_cb = input.clone();
    let closure = Closure::wrap(Box::new(move || {
        if let Some(file) = input_for_cb.files().and_then(|list| list.get(0)) {
            handler(file);
        }
    }) as Box<dyn FnMut()>);
    _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn set_text(document: &web::Document, element_id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        el.set_text_content(Some(text));
    }
}

pub fn alert(message: &str) {
    if let Some(w) = web::window() {
        _ = w.alert_with_message(message);
    }
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// Keep the backing store matched to CSS size on window resize. `then`
/// runs after the canvas has its new size.
pub fn wire_canvas_resize(canvas: &web::HtmlCanvasElement, mut then: impl FnMut(u32, u32) + 'static) {
    sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let closure = Closure::wrap(Box::new(move || {
        sync_canvas_backing_size(&canvas_resize);
        then(canvas_resize.width(), canvas_resize.height());
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

/// Runs `handler` once when the page is being unloaded.
pub fn on_page_hide(handler: impl FnOnce() + 'static) {
    let mut handler = Some(handler);
    let closure = Closure::wrap(Box::new(move || {
        if let Some(h) = handler.take() {
            h();
        }
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
