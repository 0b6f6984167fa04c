//! Input checks applied before anything reaches a collaborator.
//!
//! Client payloads are loosely typed JSON, so numbers follow the usual web
//! client conventions: an "integer" is any number with no fractional part
//! inside the signed 32-bit range, and a missing, `null`, `false`, `0` or
//! empty-string value means "not set".

use serde_json::Value;
use uuid::{Uuid, Variant};

/// Largest accepted bet (0.1 BTC).
pub const MAX_BET_SATOSHIS: i64 = 10_000_000;
/// Bets are placed in whole bits.
pub const BET_INCREMENT: i64 = 100;
/// Auto cash-out must be strictly above 1.00x.
pub const MIN_AUTO_CASH_OUT_EXCLUSIVE: i64 = 100;
/// Chat messages are measured in UTF-16 code units.
pub const MAX_CHAT_MESSAGE_LEN: usize = 500;

const HYPHENATED_UUID_LEN: usize = 36;

pub fn as_int(value: &Value) -> Option<i64> {
    let n = value.as_f64()?;
    if n.fract() == 0.0 && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX) {
        Some(n as i64)
    } else {
        None
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BetAmountError {
    #[error("No place bet amount: {0}")]
    NotInteger(String),
    #[error("Must place a bet in multiples of 100, got: {0}")]
    NotMultiple(i64),
    #[error("Max bet size is .1 BTC got: {0}")]
    TooLarge(i64),
}

/// A positive multiple of 100 no larger than [`MAX_BET_SATOSHIS`].
pub fn bet_amount(value: &Value) -> Result<u64, BetAmountError> {
    let amount = as_int(value).ok_or_else(|| BetAmountError::NotInteger(value.to_string()))?;
    if amount <= 0 || amount % BET_INCREMENT != 0 {
        return Err(BetAmountError::NotMultiple(amount));
    }
    if amount > MAX_BET_SATOSHIS {
        return Err(BetAmountError::TooLarge(amount));
    }
    Ok(amount as u64)
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("auto cash out must be an integer above 100")]
pub struct InvalidAutoCashOut;

/// Falsy values clear the setting; anything else must be an integer > 100.
pub fn auto_cash_out(value: &Value) -> Result<Option<u64>, InvalidAutoCashOut> {
    if !is_truthy(value) {
        return Ok(None);
    }
    match as_int(value) {
        Some(n) if n > MIN_AUTO_CASH_OUT_EXCLUSIVE => Ok(Some(n as u64)),
        _ => Err(InvalidAutoCashOut),
    }
}

/// Parse a hyphenated RFC 4122 version-4 UUID. Other UUID spellings
/// (braced, URN, simple) are rejected.
pub fn uuid_v4(value: &Value) -> Option<Uuid> {
    let s = value.as_str()?;
    if s.len() != HYPHENATED_UUID_LEN {
        return None;
    }
    let uuid = Uuid::try_parse(s).ok()?;
    (uuid.get_version_num() == 4 && uuid.get_variant() == Variant::RFC4122).then_some(uuid)
}

pub fn chat_message_len_ok(message: &str) -> bool {
    let len = message.encode_utf16().count();
    (1..=MAX_CHAT_MESSAGE_LEN).contains(&len)
}
