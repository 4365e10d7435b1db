//! Field conversions shared by the entity providers.
//!
//! Chargebee reports amounts in cents and timestamps in epoch seconds; the
//! platform expects dollars and epoch milliseconds. Enum values are shown in
//! Start Case.

use crate::api::Record;
use serde_json::{Number, Value};

/// Item ids of invoices and credit notes are wrapped in pipes from API
/// version 2 on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdFormat {
    version: u32,
}

impl IdFormat {
    pub fn new(version: u32) -> Self {
        Self { version }
    }

    pub fn wrap(&self, id: &str) -> String {
        if self.version == 1 {
            id.to_string()
        } else {
            format!("|{}|", id)
        }
    }

    pub fn wrap_value(&self, id: Option<&Value>) -> Option<Value> {
        id.and_then(Value::as_str).map(|id| Value::String(self.wrap(id)))
    }
}

/// `version` of a data request: an integer, or a string holding one.
/// Absent or unparseable values mean version 1.
pub fn parse_version(version: Option<&Value>) -> u32 {
    match version {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()).unwrap_or(1),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(1),
        _ => 1,
    }
}

pub fn cents_to_dollars(value: Option<&Value>) -> Option<Value> {
    let cents = value?.as_f64()?;
    Number::from_f64(cents / 100.0).map(Value::Number)
}

pub fn seconds_to_millis(value: Option<&Value>) -> Option<Value> {
    let seconds = value?.as_i64()?;
    Some(Value::from(seconds.saturating_mul(1000)))
}

/// `"not_paid"` -> `"Not Paid"`, `"PlanUSDMonthly"` -> `"Plan USD Monthly"`.
pub fn start_case(value: &str) -> String {
    words(value)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn words(value: &str) -> Vec<String> {
    let chars: Vec<char> = value.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.map_or(false, |n| n.is_lowercase()))
                || (prev.is_alphabetic() && c.is_numeric())
                || (prev.is_numeric() && c.is_alphabetic());
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

pub fn start_case_value(value: Option<&Value>) -> Option<Value> {
    value
        .and_then(Value::as_str)
        .map(|s| Value::String(start_case(s)))
}

/// Set `key`, or drop it when there is no value.
pub fn put(record: &mut Record, key: &str, value: Option<Value>) {
    match value {
        Some(value) => {
            record.insert(key.to_string(), value);
        }
        None => {
            record.remove(key);
        }
    }
}

pub fn convert_cents(record: &mut Record, keys: &[&str]) {
    for key in keys {
        let value = cents_to_dollars(record.get(*key));
        put(record, key, value);
    }
}

pub fn convert_seconds(record: &mut Record, keys: &[&str]) {
    for key in keys {
        let value = seconds_to_millis(record.get(*key));
        put(record, key, value);
    }
}

pub fn convert_start_case(record: &mut Record, keys: &[&str]) {
    for key in keys {
        let value = start_case_value(record.get(*key));
        put(record, key, value);
    }
}

pub fn str_field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// `key` of every object in the `list` array, joined with `;`.
pub fn join_ids(record: &Record, list: &str, key: &str, map: impl Fn(&str) -> String) -> Option<String> {
    let items = record.get(list)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.get(key).and_then(Value::as_str))
            .map(map)
            .collect::<Vec<_>>()
            .join(";"),
    )
}
