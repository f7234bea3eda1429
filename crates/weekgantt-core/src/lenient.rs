//! Forgiving field decoding for persisted and typed-in task values.
//!
//! A malformed field never fails the whole task: numbers given as strings are
//! parsed, anything unusable falls back to the field's safe default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{is_hex_color, TaskKind};

pub(crate) fn number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => number_text(s),
        _ => None,
    }
}

fn number_text(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64)
    })
}

fn saturate_i32(n: i64) -> i32 {
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Week typed by the user; non-numeric input becomes 0
pub fn parse_week_input(raw: &str) -> i32 {
    number_text(raw).map(saturate_i32).unwrap_or(0)
}

/// Duration typed by the user; anything below one week becomes 1
pub fn parse_duration_input(raw: &str) -> u32 {
    number_text(raw).map(|n| n.clamp(1, i64::from(u32::MAX)) as u32).unwrap_or(1)
}

/// Progress typed by the user, clamped to 0..=100; non-numeric input becomes 0
pub fn parse_progress_input(raw: &str) -> u8 {
    number_text(raw).map(|n| n.clamp(0, 100) as u8).unwrap_or(0)
}

pub(crate) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

pub(crate) fn kind<'de, D: Deserializer<'de>>(d: D) -> Result<TaskKind, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if s.eq_ignore_ascii_case("payment") => TaskKind::Payment,
        _ => TaskKind::Task,
    })
}

pub(crate) fn level<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(number(&value).map(|n| n.clamp(0, i64::from(u32::MAX)) as u32).unwrap_or(0))
}

pub(crate) fn week<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(number(&value).map(saturate_i32).unwrap_or(0))
}

pub(crate) fn duration<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(d)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(
        number(&value).map(|n| n.clamp(1, i64::from(u32::MAX)) as u32).unwrap_or(1),
    ))
}

pub(crate) fn progress<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(number(&value).map(|n| n.clamp(0, 100) as u8).unwrap_or(0))
}

pub(crate) fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(d)?, Value::Bool(true)))
}

pub(crate) fn color<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if is_hex_color(&s) => Some(s),
        _ => None,
    })
}
