use serde_json::Value;

use super::{AdapterError, types::Inflation};

/// `/cosmos/mint/v1beta1/inflation`: `{"inflation": "0.130000000000000000"}`
pub fn reshape_standard_inflation(raw: &Value) -> Result<Inflation, AdapterError> {
    let inflation = numeric_field(raw, "inflation")?;

    if shift_decimal(&inflation, 0).is_none() {
        return Err(AdapterError::InvalidNumber(inflation));
    }

    Ok(Inflation { inflation })
}

/// Inflation reported as a percentage, e.g. `{"inflation_rate": "12.06"}`
/// for 12.06%, converted to the canonical fraction `"0.1206"`
pub fn reshape_percentage_inflation(raw: &Value) -> Result<Inflation, AdapterError> {
    let rate = numeric_field(raw, "inflation_rate")?;

    let inflation = shift_decimal(&rate, 2).ok_or(AdapterError::InvalidNumber(rate))?;

    Ok(Inflation { inflation })
}

/// Inflation re-derived as `annual_provisions / current_supply` from
/// `/cosmos/mint/v1beta1/annual_provisions` and
/// `/cosmos/bank/v1beta1/supply/by_denom`
pub fn reshape_provisions_inflation(
    provisions: &Value,
    supply: &Value,
) -> Result<Inflation, AdapterError> {
    let annual = numeric_field(provisions, "annual_provisions")?;
    let amount = supply
        .get("amount")
        .ok_or(AdapterError::MissingField("amount"))
        .and_then(|a| numeric_field(a, "amount"))?;

    let annual_f: f64 = annual
        .parse()
        .map_err(|_| AdapterError::InvalidNumber(annual.clone()))?;
    let supply_f: f64 = amount
        .parse()
        .map_err(|_| AdapterError::InvalidNumber(amount.clone()))?;

    if !(supply_f > 0.0) || !annual_f.is_finite() {
        return Err(AdapterError::InvalidNumber(format!("{annual}/{amount}")));
    }

    Ok(Inflation {
        inflation: (annual_f / supply_f).to_string(),
    })
}

/// Read a field that the gateway may send either as a string or as a number
fn numeric_field(raw: &Value, name: &'static str) -> Result<String, AdapterError> {
    match raw.get(name) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(AdapterError::InvalidNumber(other.to_string())),
        None => Err(AdapterError::MissingField(name)),
    }
}

/// Divide a non-negative decimal string by `10^places` without going through
/// floating point. Returns `None` for anything that is not a plain decimal.
pub fn shift_decimal(value: &str, places: usize) -> Option<String> {
    let (int, frac) = value.split_once('.').unwrap_or((value, ""));

    if int.is_empty() && frac.is_empty() {
        return None;
    }

    if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut digits = format!("{int}{frac}");
    let scale = frac.len() + places;

    if digits.len() <= scale {
        digits = format!("{}{digits}", "0".repeat(scale - digits.len() + 1));
    }

    let (whole, fraction) = digits.split_at(digits.len() - scale);

    let whole = whole.trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        Some(whole.to_string())
    } else {
        Some(format!("{whole}.{fraction}"))
    }
}
