use crate::registers;

/// Oversampling setting for one measurement channel.
///
/// Higher rates average more internal samples, trading measurement time for
/// lower noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Oversampling {
    /// Channel disabled; the output register keeps its reset value.
    Skipped = 0,
    #[default]
    X1 = 1,
    X2 = 2,
    X4 = 3,
    X8 = 4,
    X16 = 5,
}

/// IIR filter coefficient for pressure and temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Filter {
    #[default]
    Off = 0,
    X2 = 1,
    X4 = 2,
    X8 = 3,
    X16 = 4,
}

/// Inactive time between measurements in normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Standby {
    #[default]
    Micros500 = 0,
    Micros62500 = 1,
    Millis125 = 2,
    Millis250 = 3,
    Millis500 = 4,
    Millis1000 = 5,
    Millis10 = 6,
    Millis20 = 7,
}

/// Sensor power mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    #[default]
    Sleep = 0b00,
    /// One measurement, then back to sleep.
    Forced = 0b01,
    /// Free-running with the configured standby time.
    Normal = 0b11,
}

/// Complete sensor configuration.
///
/// The default is the datasheet's "handheld device dynamic" profile:
/// 500 ms standby, x16 filter, x16 temperature and pressure oversampling in
/// normal mode, x4 humidity oversampling. Every raw read then re-triggers a
/// forced measurement at `sample_oversampling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bme280Config {
    pub standby: Standby,
    pub filter: Filter,
    pub temperature_oversampling: Oversampling,
    pub pressure_oversampling: Oversampling,
    pub humidity_oversampling: Oversampling,
    pub mode: Mode,
    /// Oversampling written to all three channels before each raw read.
    pub sample_oversampling: Oversampling,
}

impl Default for Bme280Config {
    fn default() -> Self {
        Self {
            standby: Standby::Millis500,
            filter: Filter::X16,
            temperature_oversampling: Oversampling::X16,
            pressure_oversampling: Oversampling::X16,
            humidity_oversampling: Oversampling::X4,
            mode: Mode::Normal,
            sample_oversampling: Oversampling::X1,
        }
    }
}

impl Bme280Config {
    /// `config` register value. Bit 0 (3-wire SPI) stays cleared.
    pub fn config_value(&self) -> u8 {
        ((self.standby as u8) << 5) | ((self.filter as u8) << 2)
    }

    /// `ctrl_meas` register value.
    pub fn ctrl_meas_value(&self) -> u8 {
        ctrl_meas(
            self.temperature_oversampling,
            self.pressure_oversampling,
            self.mode,
        )
    }

    pub fn ctrl_hum_value(&self) -> u8 {
        self.humidity_oversampling as u8
    }

    /// Register writes performed by a configuration pass, in bus order.
    ///
    /// `ctrl_hum` only takes effect once `ctrl_meas` is written again, which
    /// happens before every raw read.
    pub fn register_writes(&self) -> [[u8; 2]; 3] {
        [
            [registers::CONFIG, self.config_value()],
            [registers::CTRL_MEAS, self.ctrl_meas_value()],
            [registers::CTRL_HUM, self.ctrl_hum_value()],
        ]
    }
}

pub(crate) fn ctrl_meas(osrs_t: Oversampling, osrs_p: Oversampling, mode: Mode) -> u8 {
    ((osrs_t as u8) << 5) | ((osrs_p as u8) << 2) | (mode as u8)
}
