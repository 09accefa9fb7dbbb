//! 响应信封 `{data, message}` 的拆解

use clinic_core::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 取 `payload.data`，缺失或为null时退回整个payload
pub fn unwrap_data(payload: Value) -> Value {
    if let Some(data) = payload.get("data") {
        if !data.is_null() {
            return data.clone();
        }
    }
    payload
}

/// 非数组一律视为空列表
pub fn ensure_array<T: DeserializeOwned>(value: Value) -> Result<Vec<T>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Into::into))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

/// 仅取 `payload.data`，为null时返回None
pub fn data_or_none<T: DeserializeOwned>(payload: Value) -> Result<Option<T>> {
    match payload.get("data") {
        Some(data) if !data.is_null() => Ok(Some(serde_json::from_value(data.clone())?)),
        _ => Ok(None),
    }
}

/// 响应中的 `message` 字段
pub fn message_of(payload: &Value) -> Option<String> {
    payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_data() {
        assert_eq!(unwrap_data(json!({"data": [1, 2], "message": "ok"})), json!([1, 2]));
        assert_eq!(
            unwrap_data(json!({"data": null, "message": "ok"})),
            json!({"data": null, "message": "ok"})
        );
        assert_eq!(unwrap_data(json!([3])), json!([3]));
        assert_eq!(unwrap_data(Value::Null), Value::Null);
    }

    #[test]
    fn test_ensure_array() {
        let items: Vec<i64> = ensure_array(json!([1, 2, 3])).unwrap();
        assert_eq!(items, vec![1, 2, 3]);

        let items: Vec<i64> = ensure_array(json!({"message": "no data"})).unwrap();
        assert!(items.is_empty());

        let items: Vec<i64> = ensure_array(Value::Null).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_data_or_none() {
        let value: Option<String> = data_or_none(json!({"data": "x"})).unwrap();
        assert_eq!(value.as_deref(), Some("x"));

        let value: Option<String> = data_or_none(json!({"message": "ok"})).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_message_of() {
        assert_eq!(message_of(&json!({"message": "Token tidak valid"})).as_deref(), Some("Token tidak valid"));
        assert_eq!(message_of(&json!({"message": ""})), None);
        assert_eq!(message_of(&json!({"message": 42})), None);
        assert_eq!(message_of(&Value::Null), None);
    }
}
