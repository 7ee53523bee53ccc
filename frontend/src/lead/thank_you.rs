use crate::config::THANK_YOU_PATH;
use crate::dom;

/// Identifier reported for a form: its id, else its first class.
pub fn form_label(id: &str, class_name: &str) -> String {
    if !id.is_empty() {
        return id.to_string();
    }
    class_name.split_whitespace().next().unwrap_or_default().to_string()
}

/// `/thank-you/` with the non-empty `product`, `page` and `form` parameters.
pub fn thank_you_url(product: &str, page: &str, form: &str) -> String {
    let query: Vec<String> = [("product", product), ("page", page), ("form", form)]
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();
    if query.is_empty() {
        THANK_YOU_PATH.to_string()
    } else {
        format!("{}?{}", THANK_YOU_PATH, query.join("&"))
    }
}

/// Sends the visitor to the thank-you page, recording where the lead came from.
pub fn redirect(form: Option<&web_sys::Element>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let product = window
        .document()
        .and_then(|d| dom::query(&d, "h1"))
        .and_then(|h1| h1.text_content())
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    let page = window.location().pathname().unwrap_or_default();
    let form = form
        .map(|f| form_label(&f.id(), &f.class_name()))
        .unwrap_or_default();
    let _ = window.location().set_href(&thank_you_url(&product, &page, &form));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_id() {
        assert_eq!(form_label("contactFormElement", "lead-form"), "contactFormElement");
        assert_eq!(form_label("", "  lead-form wide "), "lead-form");
        assert_eq!(form_label("", ""), "");
    }

    #[test]
    fn url_skips_empty_params() {
        assert_eq!(thank_you_url("", "", ""), "/thank-you/");
        assert_eq!(
            thank_you_url("PET Washing Line", "/products/pet/", ""),
            "/thank-you/?product=PET%20Washing%20Line&page=%2Fproducts%2Fpet%2F"
        );
        assert_eq!(thank_you_url("", "", "lead-form"), "/thank-you/?form=lead-form");
    }
}
