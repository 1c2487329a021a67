//! Gregorian Easter computation (anonymous Gregorian algorithm).

use crate::DueProcessError;
use chrono::NaiveDate;

/// Easter Sunday of the given Gregorian year.
pub fn easter_sunday(year: i32) -> Result<NaiveDate, DueProcessError> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let n = h + l - 7 * m + 114;
    let month = n / 31;
    let day = n % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .ok_or_else(|| DueProcessError::InvalidDate(format!("no Easter date for year {}", year)))
}

/// The two floating holidays preceding Easter Sunday: Good Friday and
/// Holy Saturday, in that order.
pub fn easter_holidays(year: i32) -> Result<[NaiveDate; 2], DueProcessError> {
    let easter = easter_sunday(year)?;
    let out_of_range =
        || DueProcessError::InvalidDate(format!("Easter holidays out of range for {}", year));
    let saturday = easter.pred_opt().ok_or_else(out_of_range)?;
    let friday = saturday.pred_opt().ok_or_else(out_of_range)?;
    Ok([friday, saturday])
}
