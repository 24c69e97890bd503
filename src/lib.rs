#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

//! BME280 driver for the Embassy async runtime.
//!
//! Reads the factory calibration and raw ADC registers over I2C and converts
//! them with the vendor's 32-bit fixed-point compensation. Readings are handed
//! to a [`Publisher`] which serializes them as JSON.
//!
//! ## Units
//! - **Temperature**: centi-degrees Celsius, `2508` = 25.08 °C
//! - **Pressure**: Pascal, `100656` = 100.656 kPa
//! - **Humidity**: 1/1024 %RH, `56317` = 55.00 %RH

// must come first so the logging macros are visible in every module
mod fmt;

mod bme280;
pub mod calibration;
pub mod compensation;
pub mod config;
pub mod payload;
pub mod publish;
pub mod registers;

pub use bme280::Bme280Sensor;
pub use calibration::CalibrationParameters;
pub use config::{Bme280Config, Filter, Mode, Oversampling, Standby};
pub use publish::{CycleError, LogPublisher, Publisher};

/// Raw ADC output of one measurement burst.
///
/// All three values come from the same 8-byte read, so the temperature is the
/// one that was measured together with the pressure and humidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// 20-bit pressure reading.
    pub pressure: i32,
    /// 20-bit temperature reading.
    pub temperature: i32,
    /// 16-bit humidity reading.
    pub humidity: i32,
}

/// Compensated reading in fixed-point units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibratedReading {
    /// Hundredths of a degree Celsius.
    pub temperature: i32,
    /// Pascal. Divide by 1000 for kPa.
    pub pressure: u32,
    /// 1/1024 of a percent relative humidity, `0..=102400`.
    pub humidity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bme280Error {
    /// The bus write or read failed.
    I2CError,
    /// A conversion was requested before the calibration was read.
    NotCalibrated,
    /// The device at the address did not report the BME280 chip id.
    UnexpectedChipId(u8),
}
