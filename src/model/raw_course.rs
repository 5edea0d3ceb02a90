use serde_json::{Map, Value};

/// A loosely typed CMS row. Lookups follow JavaScript truthiness: `null`,
/// `""`, `0` and `false` read as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(pub Map<String, Value>);

impl Record {
    pub fn from_value(value: Value) -> Option<Record> {
        match value {
            Value::Object(map) => Some(Record(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| is_present(value))
    }

    /// First present value among `keys`, in order.
    pub fn first(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_text)
    }

    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key))
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(value_number)
    }

    pub fn first_number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| self.number(key))
    }

    /// WordPress-style `{ "rendered": "..." }` or a plain string.
    pub fn rendered(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Object(inner) => inner
                .get("rendered")
                .filter(|value| is_present(value))
                .and_then(value_text),
            other => value_text(other),
        }
    }

    /// Integer id, accepting numeric strings.
    pub fn id(&self, key: &str) -> Option<u64> {
        let number = self.number(key)?;
        (number >= 0.0 && number.fract() == 0.0).then_some(number as u64)
    }
}

pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Scalars as display text; arrays and objects have none.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// A reservation row from the course table joined with its lookup rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimaryRawCourse {
    pub reservation: Record,
    pub detail: Option<Record>,
    pub location: Option<Record>,
}

/// A flat course row from one of the fallback endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackRawCourse(pub Record);

#[derive(Debug, Clone, PartialEq)]
pub enum RawCourse {
    Primary(PrimaryRawCourse),
    Fallback(FallbackRawCourse),
}
