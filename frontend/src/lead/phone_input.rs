//! Glue for the third-party `intlTelInput` phone widget, when the page loads it.

use std::cell::RefCell;

use gloo_net::http::Request;
use js_sys::{Function, Reflect};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;

const GEO_IP_URL: &str = "https://ipapi.co/json/";
const FALLBACK_COUNTRY: &str = "US";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneInputOptions {
    pub initial_country: &'static str,
    pub preferred_countries: Vec<&'static str>,
    pub separate_dial_code: bool,
    pub utils_script: &'static str,
}

impl Default for PhoneInputOptions {
    fn default() -> Self {
        Self {
            initial_country: "auto",
            preferred_countries: vec!["us", "de", "in", "br", "id", "tr", "mx"],
            separate_dial_code: true,
            utils_script: "https://cdn.jsdelivr.net/npm/intl-tel-input@18.2.1/build/js/utils.js",
        }
    }
}

#[derive(Deserialize)]
pub struct GeoIp {
    pub country_code: Option<String>,
}

pub fn country_or_fallback(geo: Option<GeoIp>) -> String {
    geo.and_then(|g| g.country_code)
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| FALLBACK_COUNTRY.to_string())
}

async fn lookup_country() -> String {
    let geo = match Request::get(GEO_IP_URL).send().await {
        Ok(response) => response.json::<GeoIp>().await.ok(),
        Err(e) => {
            debug!("geo ip lookup failed: {}", e);
            None
        }
    };
    country_or_fallback(geo)
}

fn geo_ip_lookup() -> JsValue {
    Closure::wrap(Box::new(|callback: Function| {
        spawn_local(async move {
            let country = lookup_country().await;
            let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&country));
        });
    }) as Box<dyn FnMut(Function)>)
    .into_js_value()
}

pub struct PhoneInput {
    input: HtmlInputElement,
    instance: RefCell<Option<JsValue>>,
}

impl PhoneInput {
    pub fn new(input: HtmlInputElement) -> Self {
        Self {
            input,
            instance: RefCell::new(None),
        }
    }

    /// Initializes the widget once; a page without the widget script keeps the plain input.
    pub fn init(&self) {
        if self.instance.borrow().is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(factory) = Reflect::get(&window, &JsValue::from_str("intlTelInput"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
        else {
            debug!("phone input: intlTelInput not loaded");
            return;
        };
        let options = match serde_wasm_bindgen::to_value(&PhoneInputOptions::default()) {
            Ok(options) => options,
            Err(e) => {
                warn!("phone input: options: {}", e);
                return;
            }
        };
        let _ = Reflect::set(&options, &JsValue::from_str("geoIpLookup"), &geo_ip_lookup());
        match factory.call2(&JsValue::NULL, &self.input, &options) {
            Ok(instance) => *self.instance.borrow_mut() = Some(instance),
            Err(e) => warn!("phone input: init failed: {:?}", e),
        }
    }

    /// Full international number from the widget, else the raw input value.
    pub fn number(&self) -> String {
        let from_widget = self.instance.borrow().as_ref().and_then(|instance| {
            let get_number = Reflect::get(instance, &JsValue::from_str("getNumber"))
                .ok()?
                .dyn_into::<Function>()
                .ok()?;
            get_number.call0(instance).ok()?.as_string()
        });
        from_widget
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.input.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_use_widget_names() {
        let value = serde_json::to_value(PhoneInputOptions::default()).unwrap();
        assert_eq!(value["initialCountry"], "auto");
        assert_eq!(value["separateDialCode"], true);
        assert_eq!(value["preferredCountries"][0], "us");
        assert!(value.get("utilsScript").is_some());
    }

    #[test]
    fn country_falls_back_to_us() {
        assert_eq!(country_or_fallback(None), "US");
        assert_eq!(country_or_fallback(Some(GeoIp { country_code: None })), "US");
        assert_eq!(
            country_or_fallback(Some(GeoIp {
                country_code: Some("BR".into())
            })),
            "BR"
        );
    }
}
