use serde::Serialize;

use crate::config::{LEAD_GREETING, LEAD_SOURCE};

/// Fields read from the lead form. Missing inputs read as empty strings.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Lead {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub material: String,
    pub capacity: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct LeadPayload<'a> {
    #[serde(flatten)]
    pub lead: &'a Lead,
    pub source: &'a str,
}

impl Lead {
    pub fn payload(&self) -> LeadPayload<'_> {
        LeadPayload {
            lead: self,
            source: LEAD_SOURCE,
        }
    }

    /// Message prefilled in the WhatsApp chat opened after submission.
    pub fn whatsapp_text(&self) -> String {
        let text = format!(
            "{}\n\nName: {}\nCompany: {}\nEmail: {}\nPhone: {}\n\nMaterial: {}\nCapacity: {}\n\nMessage:\n{}",
            LEAD_GREETING,
            self.name,
            self.company,
            self.email,
            self.phone,
            self.material,
            self.capacity,
            self.message,
        );
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead() -> Lead {
        Lead {
            name: "Ana".into(),
            company: "Reciclar SA".into(),
            email: "ana@example.com".into(),
            phone: "+5511999999999".into(),
            material: "PET bottles".into(),
            capacity: "1 t/h".into(),
            message: "Need a washing line.\n".into(),
        }
    }

    #[test]
    fn whatsapp_text_layout() {
        let text = lead().whatsapp_text();
        assert!(text.starts_with(
            "Hello Gangsu Machinery Team,\n\nName: Ana\nCompany: Reciclar SA\n"
        ));
        assert!(text.contains("\n\nMaterial: PET bottles\nCapacity: 1 t/h\n\nMessage:\n"));
        assert!(text.ends_with("Need a washing line."));
    }

    #[test]
    fn payload_is_flat_with_source() {
        let lead = lead();
        let value = serde_json::to_value(lead.payload()).unwrap();
        assert_eq!(value["name"], "Ana");
        assert_eq!(value["capacity"], "1 t/h");
        assert_eq!(value["source"], "Gangsu Machinery Website");
        assert_eq!(value.as_object().unwrap().len(), 8);
    }

    #[test]
    fn empty_form_still_has_all_labels() {
        let text = Lead::default().whatsapp_text();
        assert!(text.contains("Name: \n"));
        assert!(text.ends_with("Message:"));
    }
}
