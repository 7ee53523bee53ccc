use js_sys::Reflect;
use wasm_bindgen::JsValue;

pub const WHATSAPP_NUMBER: &str = "8618913609266";
pub const WHATSAPP_FLOAT_TEXT: &str =
    "Hi, I'm interested in your plastic recycling solution. Please share a proposal and quotation.";
pub const WHATSAPP_CTA_TEXT: &str = "Hello, I'm interested in your plastic recycling solutions.";
pub const LEAD_SOURCE: &str = "Gangsu Machinery Website";
pub const LEAD_GREETING: &str = "Hello Gangsu Machinery Team,";

pub const DESKTOP_MIN_WIDTH: f64 = 980.0;
pub const MOBILE_MAX_WIDTH: f64 = 768.0;

pub const HEADER_SCROLLED_AT: f64 = 20.0;
pub const HEADER_GLASS_AT: f64 = 8.0;
pub const CTA_BAR_THRESHOLD: f64 = 200.0;

/// Grace delay between losing hover and closing the mega menu.
pub const MEGA_CLOSE_DELAY_MS: u32 = 180;
pub const DRAWER_RESIZE_DEBOUNCE_MS: u32 = 120;
pub const PHONE_WIDGET_INIT_DELAY_MS: u32 = 100;

pub const CONTACT_PATH: &str = "/contact/";
pub const THANK_YOU_PATH: &str = "/thank-you/";

#[cfg(debug_assertions)]
pub fn get_lead_webhook_url() -> &'static str {
    "http://localhost:3001/api/leads"  // Local capture endpoint for development
}

#[cfg(not(debug_assertions))]
pub fn get_lead_webhook_url() -> &'static str {
    "https://script.google.com/macros/s/AKfycbzClsdMzYrJngPHFCkk5PcXQQigTwr2qeu7DDehPUxH0t3qvABBj4AmpoJGWEiTqDU0Cg/exec"
}

/// Reads a non-empty string global set by the page before the bundle loads.
fn page_global(name: &str) -> Option<String> {
    let window = web_sys::window()?;
    let value = Reflect::get(&window, &JsValue::from_str(name)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    let text = value
        .as_string()
        .or_else(|| value.as_f64().map(|n| format!("{}", n as u64)))?;
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

pub fn whatsapp_number() -> String {
    page_global("WHATSAPP_NUMBER")
        .map(|n| digits_only(&n))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| WHATSAPP_NUMBER.to_string())
}

pub fn whatsapp_float_text() -> String {
    page_global("WHATSAPP_DEFAULT_TEXT").unwrap_or_else(|| WHATSAPP_FLOAT_TEXT.to_string())
}

pub fn lead_webhook_url() -> String {
    page_global("LEAD_WEBHOOK_URL").unwrap_or_else(|| get_lead_webhook_url().to_string())
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `https://wa.me/<number>?text=<encoded>`
pub fn whatsapp_link(number: &str, text: &str) -> String {
    format!("https://wa.me/{}?text={}", number, urlencoding::encode(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_only_strips_formatting() {
        assert_eq!(digits_only("+86 189-1360 9266"), "8618913609266");
        assert_eq!(digits_only("n/a"), "");
    }

    #[test]
    fn whatsapp_link_encodes_text() {
        assert_eq!(
            whatsapp_link("123", "Hi, I'm here & ready"),
            "https://wa.me/123?text=Hi%2C%20I%27m%20here%20%26%20ready"
        );
    }
}
