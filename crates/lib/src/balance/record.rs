//! Balance record: wire shape from the balance service and duration
//! normalization.

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// One employee's hour-bank balance, normalized from the service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRecord {
    pub employee_name: String,
    pub is_debtor: bool,
    /// Normalized duration text, e.g. "2H30M" or "45M".
    pub duration_text: String,
    pub as_of_date: NaiveDate,
}

/// Raw response body fields (Portuguese field names from the service).
#[derive(Debug, Deserialize)]
struct WireBalance {
    nome: String,
    devedor: bool,
    horas: String,
    data: String,
}

fn hour_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+H").expect("hour pattern"))
}

fn minute_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+M").expect("minute pattern"))
}

/// Extract the hour and minute components of a raw duration like "2H30M".
/// The two components are matched independently; with no hour match only the
/// minute portion is returned. No bounds are validated, so a raw value with
/// neither component normalizes to the empty string.
pub fn convert_duration(raw: &str) -> String {
    let hours = hour_pattern().find(raw).map(|m| m.as_str()).unwrap_or("");
    let minutes = minute_pattern().find(raw).map(|m| m.as_str()).unwrap_or("");
    if hours.is_empty() {
        minutes.to_string()
    } else {
        format!("{}{}", hours, minutes)
    }
}

/// Normalize a service response body into one record.
///
/// The production service returns a single JSON object; the dev fixture
/// service wraps the same object in a one-element array. The array shape is a
/// quirk of the fixture, not a contract, so both are accepted here and the
/// rest of the code only ever sees one shape.
pub fn parse_balance_body(body: &str) -> Result<BalanceRecord, String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| format!("invalid json: {}", e))?;
    let object = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| "empty response array".to_string())?,
        other => other,
    };
    let wire: WireBalance =
        serde_json::from_value(object).map_err(|e| format!("unexpected shape: {}", e))?;
    // "data" is ISO-ish; some fixtures append a time component, so only the
    // date prefix is parsed.
    let date_part = wire.data.get(..10).unwrap_or(&wire.data);
    let as_of_date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| format!("bad date {:?}: {}", wire.data, e))?;
    Ok(BalanceRecord {
        employee_name: wire.nome,
        is_debtor: wire.devedor,
        duration_text: convert_duration(&wire.horas),
        as_of_date,
    })
}
