use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PoStatus {
    #[default]
    Draft,
    Sent,
    Acknowledged,
    Received,
    Cancelled,
}

string_enum!(PoStatus {
    Draft => "draft",
    Sent => "sent",
    Acknowledged => "acknowledged",
    Received => "received",
    Cancelled => "cancelled",
});

impl PoStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PoStatus::Received | PoStatus::Cancelled)
    }

    /// The hardened state machine: draft → sent → acknowledged → received,
    /// with cancelled reachable from any non-terminal state. Setting the
    /// current status again is always allowed.
    ///
    /// Only consulted when transition enforcement is switched on.
    pub fn can_transition_to(&self, next: PoStatus) -> bool {
        if *self == next {
            return true;
        }
        match (self, next) {
            (s, PoStatus::Cancelled) => !s.is_terminal(),
            (PoStatus::Draft, PoStatus::Sent) => true,
            (PoStatus::Sent, PoStatus::Acknowledged) => true,
            (PoStatus::Acknowledged, PoStatus::Received) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub po_number: String,
    pub vendor_id: Uuid,
    pub po_date: DateTime<Utc>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub status: PoStatus,
    /// Cents.
    pub total_amount: i64,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoLineItem {
    pub id: Uuid,
    pub po_id: Uuid,
    pub line_number: i32,
    pub product_id: Option<Uuid>,
    pub part_number: String,
    pub description: Option<String>,
    pub quantity: i32,
    /// Cents.
    pub unit_price: i32,
    /// Cents.
    pub total_price: i64,
    pub received_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PoLineItem {
    pub fn outstanding(&self) -> i32 {
        (self.quantity - self.received_quantity).max(0)
    }
}

/// A purchase order together with its line items, ordered by line number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub line_items: Vec<PoLineItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPoLine {
    #[serde(default)]
    pub product_id: Option<Uuid>,
    pub part_number: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseOrder {
    pub po_number: String,
    pub vendor_id: Uuid,
    pub po_date: DateTime<Utc>,
    #[serde(default)]
    pub expected_delivery_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub line_items: Vec<NewPoLine>,
}

impl NewPurchaseOrder {
    /// Builds the header and numbered line rows; the total is the sum of the
    /// line totals.
    pub fn into_detail(self, created_by: Option<String>, now: DateTime<Utc>) -> PurchaseOrderDetail {
        let po_id = Uuid::now_v7();
        let line_items: Vec<PoLineItem> = self
            .line_items
            .into_iter()
            .enumerate()
            .map(|(idx, line)| PoLineItem {
                id: Uuid::now_v7(),
                po_id,
                line_number: idx as i32 + 1,
                product_id: line.product_id,
                part_number: line.part_number.trim().to_string(),
                description: line.description,
                quantity: line.quantity,
                unit_price: line.unit_price,
                total_price: i64::from(line.quantity) * i64::from(line.unit_price),
                received_quantity: 0,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let order = PurchaseOrder {
            id: po_id,
            po_number: self.po_number.trim().to_string(),
            vendor_id: self.vendor_id,
            po_date: self.po_date,
            expected_delivery_date: self.expected_delivery_date,
            actual_delivery_date: None,
            status: PoStatus::Draft,
            total_amount: line_items.iter().map(|l| l.total_price).sum(),
            notes: self.notes,
            created_by,
            created_at: now,
            updated_at: now,
        };

        PurchaseOrderDetail { order, line_items }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseOrderPatch {
    pub status: Option<PoStatus>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl PurchaseOrder {
    pub fn apply(&mut self, patch: PurchaseOrderPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(d) = patch.expected_delivery_date {
            self.expected_delivery_date = Some(d);
        }
        if let Some(d) = patch.actual_delivery_date {
            self.actual_delivery_date = Some(d);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
    }
}

/// Goods received against one line; stock for the linked product moves
/// through the same audited path as a manual adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineReceipt {
    pub po_id: Uuid,
    pub line_id: Uuid,
    pub quantity: i32,
    pub reason: String,
    pub received_by: Option<String>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptOutcome {
    pub line: PoLineItem,
    /// The restocked product, when the line is linked to one.
    pub product: Option<super::Product>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardened_transitions() {
        use PoStatus::*;
        assert!(Draft.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Acknowledged));
        assert!(Acknowledged.can_transition_to(Received));
        assert!(Sent.can_transition_to(Cancelled));
        assert!(!Received.can_transition_to(Draft));
        assert!(!Received.can_transition_to(Cancelled));
        assert!(!Draft.can_transition_to(Received));
        assert!(!Cancelled.can_transition_to(Sent));
    }

    #[test]
    fn totals_are_summed_from_lines() {
        let detail = NewPurchaseOrder {
            po_number: "PO-1".into(),
            vendor_id: Uuid::now_v7(),
            po_date: Utc::now(),
            expected_delivery_date: None,
            notes: None,
            line_items: vec![
                NewPoLine { part_number: "A".into(), quantity: 3, unit_price: 250, ..Default::default() },
                NewPoLine { part_number: "B".into(), quantity: 1, unit_price: 1000, ..Default::default() },
            ],
        }
        .into_detail(None, Utc::now());

        assert_eq!(detail.order.total_amount, 1750);
        assert_eq!(detail.line_items[1].line_number, 2);
        assert!(detail.line_items.iter().all(|l| l.po_id == detail.order.id));
    }
}
