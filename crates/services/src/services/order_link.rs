//! Links that hand an order inquiry off to WhatsApp with a pre-filled message.

use serde::Serialize;
use ts_rs::TS;

const WHATSAPP_BASE_URL: &str = "https://wa.me";

#[derive(Debug, Clone, Serialize, TS)]
pub struct OrderLink {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct OrderLinks {
    phone: String,
    store_name: String,
}

impl OrderLinks {
    /// Non-digits are stripped from `phone` (`"+62 812-3456"` -> `"628123456"`).
    pub fn new(phone: &str, store_name: impl Into<String>) -> Self {
        Self {
            phone: phone.chars().filter(char::is_ascii_digit).collect(),
            store_name: store_name.into(),
        }
    }

    pub fn product_inquiry(&self, product_name: &str) -> OrderLink {
        self.link(&format!(
            "Halo, saya tertarik dengan produk:\n\n*{product_name}*\n\nApakah produk ini masih tersedia?"
        ))
    }

    pub fn general_inquiry(&self) -> OrderLink {
        self.link(&format!(
            "Halo, saya tertarik dengan produk di {}!",
            self.store_name
        ))
    }

    fn link(&self, message: &str) -> OrderLink {
        OrderLink {
            url: format!(
                "{WHATSAPP_BASE_URL}/{}?text={}",
                self.phone,
                urlencoding::encode(message)
            ),
        }
    }
}
