//! Calendar-date handling for prescription expiry.
//!
//! Expiry dates are `YYYY-MM-DD` strings. A date denotes the instant
//! `00:00:00 UTC` of that day, and a prescription is expired once the ledger
//! clock is strictly past that instant.

use soroban_sdk::String;

use crate::ContractError;

const DATE_LEN: usize = 10;
const SECONDS_PER_DAY: i64 = 86_400;

fn digits(buf: &[u8]) -> Result<u32, ContractError> {
    let mut value = 0u32;
    for &b in buf {
        if !b.is_ascii_digit() {
            return Err(ContractError::InvalidExpiryDate);
        }
        value = value * 10 + u32::from(b - b'0');
    }
    Ok(value)
}

fn is_leap(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Parses `YYYY-MM-DD` into seconds since the Unix epoch (may be negative).
pub fn parse_date(date: &String) -> Result<i64, ContractError> {
    if date.len() as usize != DATE_LEN {
        return Err(ContractError::InvalidExpiryDate);
    }
    let mut buf = [0u8; DATE_LEN];
    date.copy_into_slice(&mut buf);

    if buf[4] != b'-' || buf[7] != b'-' {
        return Err(ContractError::InvalidExpiryDate);
    }
    let year = digits(&buf[0..4])?;
    let month = digits(&buf[5..7])?;
    let day = digits(&buf[8..10])?;

    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(ContractError::InvalidExpiryDate);
    }

    let days = days_from_civil(i64::from(year), i64::from(month), i64::from(day));
    Ok(days * SECONDS_PER_DAY)
}

/// Whether a prescription with this expiry date is expired at ledger time `now`.
///
/// `None` never expires.
pub fn is_expired(expiry_date: &Option<String>, now: u64) -> Result<bool, ContractError> {
    match expiry_date {
        None => Ok(false),
        Some(date) => {
            let expiry = parse_date(date)?;
            Ok(i128::from(now) > i128::from(expiry))
        }
    }
}
