//! # Receipt Payload
//!
//! Flat, render-ready payloads assembled from a just-committed sale plus
//! the business configuration.
//!
//! The core never draws anything: receipt-image rendering, QR-code image
//! generation and outbound messaging are external collaborators. They
//! consume these payloads read-only, after commit.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{BusinessConfig, DocumentType, Sale};

// =============================================================================
// Receipt Payload
// =============================================================================

/// One rendered line on the receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub name: String,
    pub unit: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// Everything an external renderer needs, flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptPayload {
    // Business identity (from the configuration singleton)
    pub business_name: String,
    pub business_tax_id: String,
    pub business_address: String,
    pub business_phone: String,

    // Document
    pub document_type: DocumentType,
    pub document_number: String,
    pub timestamp: String,
    pub vendor: String,
    pub client_tax_id: Option<String>,

    // Lines, in the order they were rung up
    pub lines: Vec<ReceiptLine>,

    // Totals
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_cents: i64,
    pub change_cents: i64,

    /// Pre-encoded machine-readable payload for the external QR renderer:
    /// `taxId|docType|total|date`.
    pub qr_payload: String,
}

impl ReceiptPayload {
    /// Assembles the payload from a committed sale and the current
    /// business configuration.
    pub fn assemble(sale: &Sale, config: &BusinessConfig) -> Self {
        let qr_payload = format!(
            "{}|{}|{}.{:02}|{}",
            config.tax_id,
            sale.document_type.label(),
            sale.total().major(),
            sale.total().minor(),
            sale.day,
        );

        ReceiptPayload {
            business_name: config.name.clone(),
            business_tax_id: config.tax_id.clone(),
            business_address: config.address.clone(),
            business_phone: config.phone.clone(),
            document_type: sale.document_type,
            document_number: sale.document_number.clone(),
            timestamp: sale.created_at.to_rfc3339(),
            vendor: sale.vendor.clone(),
            client_tax_id: sale.client_tax_id.clone(),
            lines: sale
                .lines
                .iter()
                .map(|l| ReceiptLine {
                    name: l.name.clone(),
                    unit: l.unit.clone(),
                    quantity: l.quantity,
                    unit_price_cents: l.unit_price_cents,
                    line_total_cents: l.line_total_cents,
                })
                .collect(),
            subtotal_cents: sale.subtotal_cents,
            discount_cents: sale.discount_cents,
            total_cents: sale.total_cents,
            payment_cents: sale.payment_cents,
            change_cents: sale.change_cents,
            qr_payload,
        }
    }

    /// Human-readable share summary for the external messaging wrapper.
    pub fn message_text(&self) -> String {
        let mut text = String::new();
        text.push_str(&format!("*{}*\n", self.business_name));
        text.push_str(&format!(
            "{}: {}\n",
            self.document_type.label(),
            self.document_number
        ));
        text.push_str(&format!("Fecha: {}\n", self.timestamp));
        text.push_str(&format!("Atendido por: {}\n", self.vendor));
        text.push_str("--------------------------------\n");
        for line in &self.lines {
            text.push_str(&format!(
                "{} x {} .. {}\n",
                line.quantity,
                line.name,
                Money::from_cents(line.line_total_cents)
            ));
        }
        text.push_str("--------------------------------\n");
        text.push_str(&format!(
            "*TOTAL: {}*\n",
            Money::from_cents(self.total_cents)
        ));
        text
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleLine;
    use chrono::{TimeZone, Utc};

    fn sample_sale() -> Sale {
        Sale {
            id: 1,
            document_type: DocumentType::Boleta,
            document_number: "B001-483920".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 10, 15, 30, 0).unwrap(),
            day: "2024-01-10".to_string(),
            vendor: "Turno Mañana".to_string(),
            client_tax_id: None,
            lines: vec![SaleLine {
                product_id: Some(1),
                name: "Arroz Extra".to_string(),
                category: "Abarrotes".to_string(),
                unit: "kg".to_string(),
                unit_price_cents: 450,
                quantity: 2,
                line_total_cents: 900,
            }],
            subtotal_cents: 900,
            discount_cents: 0,
            total_cents: 900,
            payment_cents: 1000,
            change_cents: 100,
        }
    }

    fn sample_config() -> BusinessConfig {
        BusinessConfig {
            name: "INVERSIONES CIELO Y DYLAN".to_string(),
            tax_id: "20602953638".to_string(),
            address: "Imperial, Cañete".to_string(),
            phone: "918944885".to_string(),
        }
    }

    #[test]
    fn test_qr_payload_format() {
        let payload = ReceiptPayload::assemble(&sample_sale(), &sample_config());
        assert_eq!(payload.qr_payload, "20602953638|BOLETA|9.00|2024-01-10");
    }

    #[test]
    fn test_assemble_copies_lines_in_order() {
        let payload = ReceiptPayload::assemble(&sample_sale(), &sample_config());
        assert_eq!(payload.lines.len(), 1);
        assert_eq!(payload.lines[0].name, "Arroz Extra");
        assert_eq!(payload.lines[0].line_total_cents, 900);
        assert_eq!(payload.change_cents, 100);
    }

    #[test]
    fn test_message_text_carries_header_and_total() {
        let text = ReceiptPayload::assemble(&sample_sale(), &sample_config()).message_text();
        assert!(text.contains("INVERSIONES CIELO Y DYLAN"));
        assert!(text.contains("BOLETA: B001-483920"));
        assert!(text.contains("2 x Arroz Extra"));
        assert!(text.contains("TOTAL: S/ 9.00"));
    }
}
