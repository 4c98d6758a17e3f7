//! Lenient deserializers for backend payloads.
//!
//! Decimal columns arrive as strings (`"15000.00"`) and counters sometimes as
//! numeric strings; both decode into plain numbers here.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl Numeric {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Unsigned(value) => Some(*value as f64),
            Numeric::Signed(value) => Some(*value as f64),
            Numeric::Float(value) => Some(*value),
            Numeric::Text(raw) => raw.trim().parse::<f64>().ok(),
        }
        .filter(|value| value.is_finite())
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Numeric::Unsigned(value) => Some(*value),
            Numeric::Signed(value) => u64::try_from(*value).ok(),
            Numeric::Float(value) if *value >= 0.0 && value.is_finite() => Some(*value as u64),
            Numeric::Float(_) => None,
            Numeric::Text(raw) => {
                let trimmed = raw.trim();
                trimmed
                    .parse::<u64>()
                    .ok()
                    .or_else(|| Numeric::Float(trimmed.parse().ok()?).as_u64())
            }
        }
    }
}

pub fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Numeric>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Numeric::as_u64).unwrap_or(0))
}

pub fn lenient_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Numeric>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Numeric::as_u64))
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Numeric>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Numeric::as_f64).unwrap_or(0.0))
}

pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Numeric>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Numeric::as_f64))
}

/// Accepts strings, numbers or null and yields a trimmed string, if any.
pub fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        Some(serde_json::Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "super::lenient_u64", default)]
        count: u64,
        #[serde(deserialize_with = "super::lenient_f64", default)]
        price: f64,
        #[serde(deserialize_with = "super::lenient_opt_u64", default)]
        parent: Option<u64>,
        #[serde(deserialize_with = "super::lenient_opt_string", default)]
        label: Option<String>,
    }

    #[test]
    fn decimal_strings_decode_as_numbers() {
        let sample: Sample =
            serde_json::from_str(r#"{"count":"12","price":"15000.50","parent":"7","label":3}"#)
                .expect("sample decodes");
        assert_eq!(sample.count, 12);
        assert!((sample.price - 15000.5).abs() < f64::EPSILON);
        assert_eq!(sample.parent, Some(7));
        assert_eq!(sample.label.as_deref(), Some("3"));
    }

    #[test]
    fn garbage_falls_back_to_zero_or_none() {
        let sample: Sample =
            serde_json::from_str(r#"{"count":"abc","price":null,"parent":-3,"label":"  "}"#)
                .expect("sample decodes");
        assert_eq!(sample.count, 0);
        assert_eq!(sample.price, 0.0);
        assert_eq!(sample.parent, None);
        assert_eq!(sample.label, None);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let sample: Sample = serde_json::from_str("{}").expect("sample decodes");
        assert_eq!(sample.count, 0);
        assert_eq!(sample.parent, None);
    }
}
