use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parsed receipt, exactly as the model returned it.
///
/// The expected shape is `{restaurant, items: [{name, quantity, unit_price, total}],
/// summary: {subtotal, taxes: {label: amount}, round_off, grand_total}}` (see the
/// `extract_bill_data` tool schema), but nothing here enforces it: nulls, omitted
/// fields and extra fields all pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bill(pub Value);

impl Bill {
    pub fn restaurant(&self) -> Option<&str> {
        self.0.get("restaurant").and_then(Value::as_str)
    }

    pub fn items(&self) -> &[Value] {
        self.0
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nulls_pass_through() {
        let raw = r#"{"restaurant": "Cafe", "items": [], "summary": {"subtotal": 10, "taxes": {"SGST": null}, "round_off": null, "grand_total": 10}}"#;
        let bill: Bill = serde_json::from_str(raw).unwrap();
        assert_eq!(bill.0["summary"]["round_off"], Value::Null);
        assert_eq!(
            serde_json::to_value(&bill).unwrap(),
            serde_json::from_str::<Value>(raw).unwrap()
        );
    }

    #[test]
    fn omitted_and_extra_fields_are_kept_as_sent() {
        let raw = json!({
            "restaurant": "Cafe",
            "items": [{ "name": "Tea" }],
            "summary": { "subtotal": 1, "grand_total": 1, "service_charge": 5 }
        });
        let bill: Bill = serde_json::from_value(raw.clone()).unwrap();
        let out = serde_json::to_value(&bill).unwrap();
        assert_eq!(out, raw);
        assert!(out["summary"].get("round_off").is_none());
        assert!(out["items"][0].get("total").is_none());
    }

    #[test]
    fn totals_and_types_are_not_checked() {
        let bill: Bill = serde_json::from_str(
            r#"{"items": [{"name": "Idli", "quantity": "two", "unit_price": 30, "total": 30}], "summary": {"subtotal": 999, "grand_total": 1}}"#,
        )
        .unwrap();
        assert_eq!(bill.items()[0]["quantity"], "two");
        assert_eq!(bill.0["summary"]["subtotal"], 999);
        assert_eq!(bill.restaurant(), None);
    }

    #[test]
    fn reads_restaurant_and_items() {
        let bill = Bill(json!({ "restaurant": "Cafe", "items": [{ "name": "Tea" }, { "name": "Bun" }] }));
        assert_eq!(bill.restaurant(), Some("Cafe"));
        assert_eq!(bill.items().len(), 2);
    }
}
