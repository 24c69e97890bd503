use crate::registers::{CALIB_00_LEN, CALIB_26_LEN};

/// Factory-fused compensation coefficients.
///
/// Unique to every chip and fixed for its lifetime. Read once per power-on
/// session and required by every conversion. There is no zeroed default;
/// values come from [`from_registers`](Self::from_registers).
///
/// ```compile_fail
/// let _ = embassy_bme280_mqtt::CalibrationParameters::default();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationParameters {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,

    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,

    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

impl CalibrationParameters {
    /// Decodes the two calibration blocks.
    ///
    /// `tp` holds 0x88..=0xA1 and `hum` holds 0xE1..=0xE8.
    pub fn from_registers(tp: &[u8; CALIB_00_LEN], hum: &[u8; CALIB_26_LEN]) -> Self {
        Self {
            dig_t1: u16_le(tp, 0),
            dig_t2: i16_le(tp, 2),
            dig_t3: i16_le(tp, 4),

            dig_p1: u16_le(tp, 6),
            dig_p2: i16_le(tp, 8),
            dig_p3: i16_le(tp, 10),
            dig_p4: i16_le(tp, 12),
            dig_p5: i16_le(tp, 14),
            dig_p6: i16_le(tp, 16),
            dig_p7: i16_le(tp, 18),
            dig_p8: i16_le(tp, 20),
            dig_p9: i16_le(tp, 22),

            // 0xA0 is unused
            dig_h1: tp[25],
            dig_h2: i16_le(hum, 0),
            dig_h3: hum[2],
            // H4 = E4[7:0] E5[3:0], H5 = E6[7:0] E5[7:4]
            dig_h4: nibble_packed(hum[3], hum[4] & 0x0F),
            dig_h5: nibble_packed(hum[5], hum[4] >> 4),
            dig_h6: hum[6] as i8,
        }
    }
}

fn u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn i16_le(buf: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// 12-bit signed value from a sign-carrying high byte and a low nibble.
fn nibble_packed(msb: u8, low_nibble: u8) -> i16 {
    ((msb as i8 as i16) << 4) | (low_nibble as i16)
}
