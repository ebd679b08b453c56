//! Describe a target type as a JSON skeleton

use crate::error::ExtractorError;
use serde::Serialize;

/// Pretty JSON of `T::default()`
///
/// Field order follows declaration order, so the output is stable for a given
/// type.
pub fn describe<T: Default + Serialize>() -> Result<String, ExtractorError> {
    serde_json::to_string_pretty(&T::default()).map_err(|e| ExtractorError::Schema(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use moneysaver_domain::{AssistantActionView, TransactionView};
    use serde_json::Value;

    #[test]
    fn test_transaction_view_skeleton() {
        let schema = describe::<TransactionView>().unwrap();
        let value: Value = serde_json::from_str(&schema).unwrap();

        assert_eq!(value["transaction_type"], "");
        assert_eq!(value["amount"], 0);
        assert_eq!(value["item"]["name"], "");
        assert_eq!(value["item"]["description"], "");
        assert_eq!(value["item"]["category"], "");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_describe_is_deterministic() {
        assert_eq!(
            describe::<TransactionView>().unwrap(),
            describe::<TransactionView>().unwrap()
        );
    }

    #[test]
    fn test_field_order_follows_declaration() {
        let schema = describe::<TransactionView>().unwrap();
        let type_pos = schema.find("transaction_type").unwrap();
        let amount_pos = schema.find("amount").unwrap();
        let item_pos = schema.find("item").unwrap();
        assert!(type_pos < amount_pos && amount_pos < item_pos);
    }

    #[test]
    fn test_action_view_skeleton() {
        let value: Value = serde_json::from_str(&describe::<AssistantActionView>().unwrap()).unwrap();
        assert_eq!(value["action_type"], "");
    }
}
