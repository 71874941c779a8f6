//! Reply formatting: balance record to the Portuguese reply line.

use crate::balance::BalanceRecord;

/// Compose the reply for one balance record. Pure: the same record always
/// formats to the same string.
pub fn format_reply(record: &BalanceRecord) -> String {
    let first_name = record
        .employee_name
        .split_whitespace()
        .next()
        .unwrap_or(record.employee_name.as_str());
    let sign = if record.is_debtor { "-" } else { "+" };
    format!(
        "Olá {}! Seu saldo é de {}{} até {}.",
        first_name,
        sign,
        record.duration_text,
        record.as_of_date.format("%d/%m/%Y"),
    )
}
