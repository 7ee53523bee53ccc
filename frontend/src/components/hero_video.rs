use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{AddEventListenerOptions, Document, HtmlVideoElement};

use crate::dom;

fn try_play(video: &HtmlVideoElement) {
    // Autoplay can be refused; the poster frame stays up in that case.
    if let Ok(promise) = video.play() {
        spawn_local(async move {
            if JsFuture::from(promise).await.is_err() {
                debug!("hero video: autoplay refused");
            }
        });
    }
}

/// Starts the muted background video of the hero as early as possible.
pub fn start(document: &Document) {
    let Some(video) = dom::query(document, "#hero .hero-bg-video")
        .and_then(|v| v.dyn_into::<HtmlVideoElement>().ok())
    else {
        return;
    };
    video.set_muted(true);
    let _ = video.set_attribute("playsinline", "");
    try_play(&video);

    let retry = {
        let video = video.clone();
        Closure::once_into_js(move || {
            debug!("hero video: metadata loaded, retrying play");
            try_play(&video);
        })
    };
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    let _ = video.add_event_listener_with_callback_and_add_event_listener_options(
        "loadedmetadata",
        retry.unchecked_ref(),
        &options,
    );
}
