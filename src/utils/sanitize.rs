use serde_json::Value;

/// Sanitizes credentials and phone numbers in gateway payloads for logging
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, val) in map {
                let sanitized_val = if is_sensitive_field(key) {
                    mask_value(val)
                } else {
                    sanitize_json(val)
                };
                sanitized.insert(key.clone(), sanitized_val);
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_json).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_field(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "password"
            | "username"
            | "msisdn"
            | "accountnumber"
            | "senderphonenumber"
            | "sender_phone_number"
            | "recipient_phone_number"
            | "authorization"
    )
}

fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.chars().count() > 8 => {
            let chars: Vec<char> = s.chars().collect();
            let visible: String = chars[..3].iter().collect();
            let end: String = chars[chars.len() - 2..].iter().collect();
            Value::String(format!("{}****{}", visible, end))
        }
        _ => Value::String("****".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_credentials() {
        let input = json!({
            "function": "BEEP.postPayment",
            "payload": {
                "credentials": {"username": "remit", "password": "secret"},
                "packet": [{"MSISDN": "+2348011111111", "amount": "2.01"}]
            }
        });

        let sanitized = sanitize_json(&input);
        assert_eq!(sanitized["payload"]["credentials"]["password"], "****");
        assert_eq!(sanitized["payload"]["credentials"]["username"], "****");
        assert_eq!(sanitized["payload"]["packet"][0]["MSISDN"], "+23****11");
        assert_eq!(sanitized["payload"]["packet"][0]["amount"], "2.01");
        assert_eq!(sanitized["function"], "BEEP.postPayment");
    }
}
