//! Compact JSON payloads without heap allocation.
use core::fmt::{self, Write};
use heapless::String;

use crate::CalibratedReading;

/// Capacity that fits any reading, including negative temperatures and
/// wrapped pressure values.
pub const PAYLOAD_CAPACITY: usize = 96;

/// Build the JSON object published for one reading.
///
/// Temperature is °C with 2 decimals, pressure kPa with 3 decimals and
/// humidity %RH with 2 decimals, e.g.
/// `{"temperature": 25.08, "pressure": 100.656, "humidity": 55.00}`.
///
/// Returns `fmt::Error` if `N` is too small.
pub fn build_payload<const N: usize>(reading: &CalibratedReading) -> Result<String<N>, fmt::Error> {
    let mut s: String<N> = String::new();
    s.write_str("{\"temperature\": ")?;
    write_temperature(&mut s, reading.temperature)?;
    s.write_str(", \"pressure\": ")?;
    write_pressure(&mut s, reading.pressure)?;
    s.write_str(", \"humidity\": ")?;
    write_humidity(&mut s, reading.humidity)?;
    s.write_char('}')?;
    Ok(s)
}

fn write_temperature<W: Write>(w: &mut W, centi_celsius: i32) -> fmt::Result {
    let sign = if centi_celsius < 0 { "-" } else { "" };
    let abs = centi_celsius.unsigned_abs();
    write!(w, "{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn write_pressure<W: Write>(w: &mut W, pascal: u32) -> fmt::Result {
    write!(w, "{}.{:03}", pascal / 1000, pascal % 1000)
}

/// Hundredths of a percent, exact ties rounded to even like `printf("%.2f")`.
fn write_humidity<W: Write>(w: &mut W, q10_percent: i32) -> fmt::Result {
    let scaled = q10_percent.max(0) as u64 * 100;
    let mut hundredths = scaled / 1024;
    let remainder = scaled % 1024;
    if remainder > 512 || (remainder == 512 && hundredths % 2 == 1) {
        hundredths += 1;
    }
    write!(w, "{}.{:02}", hundredths / 100, hundredths % 100)
}
