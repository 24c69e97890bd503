//! 32-bit fixed-point compensation from the BME280 datasheet (section 4.2.3).
//!
//! Every function here is pure. Intermediate values use two's complement
//! wrapping so out-of-range raw input produces the datasheet's bit pattern
//! instead of a panic.

use crate::{CalibratedReading, RawSample};
use crate::calibration::CalibrationParameters;

/// Upper clamp of the humidity accumulator, 100 %RH in Q22.10 before the shift.
const HUMIDITY_MAX: i32 = 419_430_400;

/// Fine-resolution temperature shared by all three conversions.
pub fn fine_temperature(raw_temperature: i32, calib: &CalibrationParameters) -> i32 {
    let t1 = calib.dig_t1 as i32;
    let t2 = calib.dig_t2 as i32;
    let t3 = calib.dig_t3 as i32;

    // datasheet form: scale by T2 before the shift, not T2 >> 11
    let var1 = ((raw_temperature >> 3).wrapping_sub(t1 << 1)).wrapping_mul(t2) >> 11;
    let delta = (raw_temperature >> 4).wrapping_sub(t1);
    let var2 = ((delta.wrapping_mul(delta) >> 12).wrapping_mul(t3)) >> 14;
    var1.wrapping_add(var2)
}

/// Temperature in hundredths of a degree Celsius.
pub fn convert_temperature(raw_temperature: i32, calib: &CalibrationParameters) -> i32 {
    temperature_from_fine(fine_temperature(raw_temperature, calib))
}

/// Pressure in Pa.
///
/// Returns 0 when the calibration makes the divisor vanish.
pub fn convert_pressure(
    raw_pressure: i32,
    raw_temperature: i32,
    calib: &CalibrationParameters,
) -> u32 {
    pressure_from_fine(raw_pressure, fine_temperature(raw_temperature, calib), calib)
}

/// Relative humidity in 1/1024 %RH, always within `0..=102400`.
pub fn convert_humidity(
    raw_humidity: i32,
    raw_temperature: i32,
    calib: &CalibrationParameters,
) -> i32 {
    humidity_from_fine(raw_humidity, fine_temperature(raw_temperature, calib), calib)
}

/// Converts one burst, deriving the fine temperature once.
pub fn compensate(raw: &RawSample, calib: &CalibrationParameters) -> CalibratedReading {
    let t_fine = fine_temperature(raw.temperature, calib);
    CalibratedReading {
        temperature: temperature_from_fine(t_fine),
        pressure: pressure_from_fine(raw.pressure, t_fine, calib),
        humidity: humidity_from_fine(raw.humidity, t_fine, calib),
    }
}

fn temperature_from_fine(t_fine: i32) -> i32 {
    (t_fine.wrapping_mul(5).wrapping_add(128)) >> 8
}

fn pressure_from_fine(raw_pressure: i32, t_fine: i32, calib: &CalibrationParameters) -> u32 {
    let p1 = calib.dig_p1 as i32;
    let p2 = calib.dig_p2 as i32;
    let p3 = calib.dig_p3 as i32;
    let p4 = calib.dig_p4 as i32;
    let p5 = calib.dig_p5 as i32;
    let p6 = calib.dig_p6 as i32;
    let p7 = calib.dig_p7 as i32;
    let p8 = calib.dig_p8 as i32;
    let p9 = calib.dig_p9 as i32;

    let mut var1 = (t_fine >> 1).wrapping_sub(64000);
    let quarter_sq = (var1 >> 2).wrapping_mul(var1 >> 2);
    let mut var2 = (quarter_sq >> 11).wrapping_mul(p6);
    var2 = var2.wrapping_add(var1.wrapping_mul(p5) << 1);
    var2 = (var2 >> 2).wrapping_add(p4 << 16);
    var1 = ((p3.wrapping_mul(quarter_sq >> 13) >> 3).wrapping_add(p2.wrapping_mul(var1) >> 1)) >> 18;
    var1 = (32768i32.wrapping_add(var1)).wrapping_mul(p1) >> 15;
    if var1 == 0 {
        return 0;
    }

    let divisor = var1 as u32;
    let mut pressure = ((1_048_576i32.wrapping_sub(raw_pressure) as u32)
        .wrapping_sub((var2 >> 12) as u32))
    .wrapping_mul(3125);
    // keep the top bit for the quotient when the numerator still fits
    pressure = if pressure < 0x8000_0000 {
        (pressure << 1) / divisor
    } else {
        (pressure / divisor).wrapping_mul(2)
    };

    let var1 = p9.wrapping_mul((((pressure >> 3).wrapping_mul(pressure >> 3)) >> 13) as i32) >> 12;
    let var2 = (((pressure >> 2) as i32).wrapping_mul(p8)) >> 13;
    (pressure as i32).wrapping_add((var1.wrapping_add(var2).wrapping_add(p7)) >> 4) as u32
}

fn humidity_from_fine(raw_humidity: i32, t_fine: i32, calib: &CalibrationParameters) -> i32 {
    let h1 = calib.dig_h1 as i32;
    let h2 = calib.dig_h2 as i32;
    let h3 = calib.dig_h3 as i32;
    let h4 = calib.dig_h4 as i32;
    let h5 = calib.dig_h5 as i32;
    let h6 = calib.dig_h6 as i32;

    let x = t_fine.wrapping_sub(76800);
    let offset = ((raw_humidity << 14)
        .wrapping_sub(h4 << 20)
        .wrapping_sub(h5.wrapping_mul(x))
        .wrapping_add(16384))
        >> 15;
    let h6_term = x.wrapping_mul(h6) >> 10;
    let h3_term = (x.wrapping_mul(h3) >> 11).wrapping_add(32768);
    let scale = ((h6_term.wrapping_mul(h3_term) >> 10).wrapping_add(2_097_152))
        .wrapping_mul(h2)
        .wrapping_add(8192)
        >> 14;

    let mut humidity = offset.wrapping_mul(scale);
    let squared = ((humidity >> 15).wrapping_mul(humidity >> 15)) >> 7;
    humidity = humidity.wrapping_sub(squared.wrapping_mul(h1) >> 4);
    humidity.clamp(0, HUMIDITY_MAX) >> 12
}
