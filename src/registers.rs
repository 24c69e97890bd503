//! BME280 register map (datasheet table 18).

/// Bus address with SDO tied to VDDIO.
pub const DEFAULT_ADDRESS: u8 = 0x77;
/// Bus address with SDO tied to GND.
pub const ALTERNATE_ADDRESS: u8 = 0x76;

/// Value of the `id` register on a BME280.
pub const CHIP_ID: u8 = 0x60;
/// Writing this to [`RESET`] runs the power-on-reset procedure.
pub const SOFT_RESET: u8 = 0xB6;

pub const ID: u8 = 0xD0;
pub const RESET: u8 = 0xE0;
pub const CTRL_HUM: u8 = 0xF2;
pub const CTRL_MEAS: u8 = 0xF4;
pub const CONFIG: u8 = 0xF5;

/// dig_T1 LSB; start of the temperature/pressure block, 0x88..=0xA1.
pub const CALIB_00: u8 = 0x88;
pub const CALIB_00_LEN: usize = 26;
/// dig_H2 LSB; start of the humidity block, 0xE1..=0xE8.
pub const CALIB_26: u8 = 0xE1;
pub const CALIB_26_LEN: usize = 8;

/// press_msb; pressure, temperature and humidity follow in that order.
pub const PRESS_MSB: u8 = 0xF7;
pub const DATA_LEN: usize = 8;
