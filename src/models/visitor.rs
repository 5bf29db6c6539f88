use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub company: String,
}

impl VisitorContact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingDetails {
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl Default for BillingDetails {
    fn default() -> Self {
        BillingDetails {
            tax_id: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            postal_code: String::new(),
            country: default_country(),
        }
    }
}

fn default_country() -> String {
    "Spain".to_string()
}

/// Contact-and-billing form as the contact step submits it: one flat payload
/// that splits into the visitor contact and the billing details.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl ContactForm {
    /// Field-level validation mirroring the contact form: first name, last
    /// name, email and phone are required, and the email must carry a TLD.
    pub fn validate(&self) -> Result<(VisitorContact, BillingDetails), BTreeMap<String, String>> {
        let mut errors = BTreeMap::new();

        if self.first_name.trim().is_empty() {
            errors.insert("firstName".to_string(), "First name is required".to_string());
        }
        if self.last_name.trim().is_empty() {
            errors.insert("lastName".to_string(), "Last name is required".to_string());
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email".to_string(), "Email is required".to_string());
        } else if !is_valid_email(email) {
            errors.insert("email".to_string(), "Enter a valid email address".to_string());
        }

        if self.phone.trim().is_empty() {
            errors.insert("phone".to_string(), "Phone number is required".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let contact = VisitorContact {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: email.to_lowercase(),
            phone: self.phone.trim().to_string(),
            company: self.company.trim().to_string(),
        };
        let billing = BillingDetails {
            tax_id: self.tax_id.trim().to_string(),
            address_line1: self.address_line1.trim().to_string(),
            address_line2: self.address_line2.trim().to_string(),
            city: self.city.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            country: if self.country.trim().is_empty() {
                default_country()
            } else {
                self.country.trim().to_string()
            },
        };
        Ok((contact, billing))
    }
}

fn is_valid_email(email: &str) -> bool {
    if !email_address::EmailAddress::is_valid(email) {
        return false;
    }
    // Require a TLD; bare `user@host` addresses are rejected like the form does.
    match email.find('@') {
        Some(at) => email[at + 1..].contains('.'),
        None => false,
    }
}
