use embedded_hal_async::i2c::I2c;

use crate::calibration::CalibrationParameters;
use crate::config::{self, Bme280Config, Mode, Oversampling};
use crate::registers;
use crate::{Bme280Error, CalibratedReading, RawSample, compensation};

/// One BME280 on a borrowed I2C bus.
///
/// Holds the calibration snapshot for the current power-on session. The
/// snapshot is taken by [`init`](Self::init) and dropped by
/// [`reset`](Self::reset), so readings are never compensated with
/// coefficients from another session.
pub struct Bme280Sensor<'a, T: I2c> {
    i2c: &'a mut T,
    address: u8,
    config: Bme280Config,
    calibration: Option<CalibrationParameters>,
}

impl<'a, T: I2c> Bme280Sensor<'a, T> {
    pub fn new(i2c: &'a mut T, address: u8) -> Self {
        Self::with_config(i2c, address, Bme280Config::default())
    }

    pub fn with_config(i2c: &'a mut T, address: u8, config: Bme280Config) -> Self {
        Self {
            i2c,
            address,
            config,
            calibration: None,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn config(&self) -> &Bme280Config {
        &self.config
    }

    /// Calibration snapshot, `None` until [`init`](Self::init) succeeds.
    pub fn calibration(&self) -> Option<&CalibrationParameters> {
        self.calibration.as_ref()
    }

    /// Checks the chip id, configures the device and reads its calibration.
    pub async fn init(&mut self) -> Result<(), Bme280Error> {
        let id = self.chip_id().await?;
        if id != registers::CHIP_ID {
            error!("Unexpected chip id {=u8:#x} at {=u8:#x}", id, self.address);
            return Err(Bme280Error::UnexpectedChipId(id));
        }
        self.configure().await?;
        let calibration = self.read_calibration().await?;
        debug!("Calibration: {:?}", calibration);
        self.calibration = Some(calibration);
        info!("BME280 at {=u8:#x} ready", self.address);
        Ok(())
    }

    pub async fn chip_id(&mut self) -> Result<u8, Bme280Error> {
        let mut buf = [0u8; 1];
        self.i2c_write_read(&[registers::ID], &mut buf).await?;
        Ok(buf[0])
    }

    /// Writes `config`, `ctrl_meas` and `ctrl_hum` in that order.
    pub async fn configure(&mut self) -> Result<(), Bme280Error> {
        for write in self.config.register_writes() {
            self.i2c_write(&write).await?;
        }
        Ok(())
    }

    /// Power-on reset. The calibration must be read again afterwards.
    pub async fn reset(&mut self) -> Result<(), Bme280Error> {
        self.calibration = None;
        self.i2c_write(&[registers::RESET, registers::SOFT_RESET]).await
    }

    /// Reads both calibration blocks without touching the session snapshot.
    pub async fn read_calibration(&mut self) -> Result<CalibrationParameters, Bme280Error> {
        let mut tp = [0u8; registers::CALIB_00_LEN];
        let mut hum = [0u8; registers::CALIB_26_LEN];
        self.i2c_write_read(&[registers::CALIB_00], &mut tp).await?;
        self.i2c_write_read(&[registers::CALIB_26], &mut hum).await?;
        Ok(CalibrationParameters::from_registers(&tp, &hum))
    }

    /// Triggers a forced measurement at the configured per-read
    /// oversampling and reads the result burst.
    pub async fn read_raw(&mut self) -> Result<RawSample, Bme280Error> {
        self.read_raw_with(self.config.sample_oversampling).await
    }

    /// Writes `ctrl_hum` and a forced `ctrl_meas`, then reads the data
    /// registers without waiting, so the burst holds the last completed
    /// conversion.
    pub async fn read_raw_with(&mut self, mode: Oversampling) -> Result<RawSample, Bme280Error> {
        self.i2c_write(&[registers::CTRL_HUM, mode as u8]).await?;
        self.i2c_write(&[
            registers::CTRL_MEAS,
            config::ctrl_meas(mode, mode, Mode::Forced),
        ])
        .await?;

        let mut buf = [0u8; registers::DATA_LEN];
        self.i2c_write_read(&[registers::PRESS_MSB], &mut buf).await?;
        trace!("Received I2C data: {:?}", &buf);
        Ok(raw_sample(&buf))
    }

    /// Reads one burst and compensates it with this session's calibration.
    pub async fn read(&mut self) -> Result<CalibratedReading, Bme280Error> {
        if self.calibration.is_none() {
            return Err(Bme280Error::NotCalibrated);
        }
        let raw = self.read_raw().await?;
        self.compensate(&raw)
    }

    pub fn compensate(&self, raw: &RawSample) -> Result<CalibratedReading, Bme280Error> {
        let calibration = self.calibration.as_ref().ok_or(Bme280Error::NotCalibrated)?;
        Ok(compensation::compensate(raw, calibration))
    }

    async fn i2c_write_read(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), Bme280Error> {
        match self.i2c.write_read(self.address, write, read).await {
            Ok(_) => Ok(()),
            Err(_) => Err(Bme280Error::I2CError),
        }
    }

    async fn i2c_write(&mut self, write: &[u8]) -> Result<(), Bme280Error> {
        match self.i2c.write(self.address, write).await {
            Ok(_) => Ok(()),
            Err(_) => Err(Bme280Error::I2CError),
        }
    }
}

fn raw_sample(buf: &[u8; registers::DATA_LEN]) -> RawSample {
    let b = buf.map(i32::from);
    RawSample {
        pressure: (b[0] << 12) | (b[1] << 4) | (b[2] >> 4),
        temperature: (b[3] << 12) | (b[4] << 4) | (b[5] >> 4),
        humidity: (b[6] << 8) | b[7],
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::calibration::tests::{DATASHEET_TP, SAMPLE_HUM};
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};

    const ADDR: u8 = registers::DEFAULT_ADDRESS;

    /// pressure 415148, temperature 519888, humidity 30000
    pub(crate) const DATA: [u8; 8] = [0x65, 0x5a, 0xc0, 0x7e, 0xed, 0x00, 0x75, 0x30];

    pub(crate) fn init_transactions() -> Vec<Transaction> {
        vec![
            Transaction::write_read(ADDR, vec![0xD0], vec![0x60]),
            Transaction::write(ADDR, vec![0xF5, 0x90]),
            Transaction::write(ADDR, vec![0xF4, 0xB7]),
            Transaction::write(ADDR, vec![0xF2, 0x03]),
            Transaction::write_read(ADDR, vec![0x88], DATASHEET_TP.to_vec()),
            Transaction::write_read(ADDR, vec![0xE1], SAMPLE_HUM.to_vec()),
        ]
    }

    pub(crate) fn read_transactions() -> Vec<Transaction> {
        vec![
            Transaction::write(ADDR, vec![0xF2, 0x01]),
            Transaction::write(ADDR, vec![0xF4, 0x25]),
            Transaction::write_read(ADDR, vec![0xF7], DATA.to_vec()),
        ]
    }

    #[test]
    fn raw_sample_unpacks_20_and_16_bit_fields() {
        let raw = raw_sample(&DATA);
        assert_eq!(
            raw,
            RawSample {
                pressure: 415148,
                temperature: 519888,
                humidity: 30000,
            }
        );
        let full = raw_sample(&[0xFF; 8]);
        assert_eq!(full.pressure, 0xFFFFF);
        assert_eq!(full.temperature, 0xFFFFF);
        assert_eq!(full.humidity, 0xFFFF);
    }

    #[test]
    fn init_then_read() {
        let mut expectations = init_transactions();
        expectations.extend(read_transactions());
        let mut i2c = Mock::new(&expectations);

        let mut sensor = Bme280Sensor::new(&mut i2c, ADDR);
        block_on(sensor.init()).unwrap();
        assert_eq!(sensor.calibration().unwrap().dig_t1, 27504);
        let reading = block_on(sensor.read()).unwrap();
        assert_eq!(
            reading,
            CalibratedReading {
                temperature: 2508,
                pressure: 100656,
                humidity: 56317,
            }
        );

        i2c.done();
    }

    #[test]
    fn read_before_calibration_is_rejected_without_bus_traffic() {
        let mut i2c = Mock::new(&[]);
        let mut sensor = Bme280Sensor::new(&mut i2c, ADDR);

        assert_eq!(block_on(sensor.read()), Err(Bme280Error::NotCalibrated));
        let raw = RawSample {
            pressure: 415148,
            temperature: 519888,
            humidity: 30000,
        };
        assert_eq!(sensor.compensate(&raw), Err(Bme280Error::NotCalibrated));

        i2c.done();
    }

    #[test]
    fn calibration_reads_are_idempotent() {
        let block = |_| {
            [
                Transaction::write_read(ADDR, vec![0x88], DATASHEET_TP.to_vec()),
                Transaction::write_read(ADDR, vec![0xE1], SAMPLE_HUM.to_vec()),
            ]
        };
        let expectations: Vec<_> = (0..2).flat_map(block).collect();
        let mut i2c = Mock::new(&expectations);

        let mut sensor = Bme280Sensor::new(&mut i2c, ADDR);
        let first = block_on(sensor.read_calibration()).unwrap();
        let second = block_on(sensor.read_calibration()).unwrap();
        assert_eq!(first, second);
        // reading the blocks alone does not start a session
        assert!(sensor.calibration().is_none());

        i2c.done();
    }

    #[test]
    fn calibration_failure_leaves_session_uncalibrated() {
        let expectations = [
            Transaction::write_read(ADDR, vec![0xD0], vec![0x60]),
            Transaction::write(ADDR, vec![0xF5, 0x90]),
            Transaction::write(ADDR, vec![0xF4, 0xB7]),
            Transaction::write(ADDR, vec![0xF2, 0x03]),
            Transaction::write_read(ADDR, vec![0x88], DATASHEET_TP.to_vec()),
            Transaction::write_read(ADDR, vec![0xE1], vec![0; 8]).with_error(ErrorKind::Other),
        ];
        let mut i2c = Mock::new(&expectations);

        let mut sensor = Bme280Sensor::new(&mut i2c, ADDR);
        assert_eq!(block_on(sensor.init()), Err(Bme280Error::I2CError));
        assert!(sensor.calibration().is_none());

        i2c.done();
    }

    #[test]
    fn wrong_chip_id_aborts_init() {
        let expectations = [Transaction::write_read(ADDR, vec![0xD0], vec![0x58])];
        let mut i2c = Mock::new(&expectations);

        let mut sensor = Bme280Sensor::new(&mut i2c, ADDR);
        assert_eq!(
            block_on(sensor.init()),
            Err(Bme280Error::UnexpectedChipId(0x58))
        );

        i2c.done();
    }

    #[test]
    fn compensation_needs_the_session_calibration() {
        let raw = raw_sample(&DATA);
        let mut i2c = Mock::new(&init_transactions());

        let mut sensor = Bme280Sensor::new(&mut i2c, ADDR);
        assert_eq!(sensor.compensate(&raw), Err(Bme280Error::NotCalibrated));
        block_on(sensor.init()).unwrap();
        assert_eq!(
            sensor.compensate(&raw),
            Ok(CalibratedReading {
                temperature: 2508,
                pressure: 100656,
                humidity: 56317,
            })
        );

        i2c.done();
    }

    #[test]
    fn reset_drops_calibration() {
        let mut expectations = init_transactions();
        expectations.push(Transaction::write(ADDR, vec![0xE0, 0xB6]));
        let mut i2c = Mock::new(&expectations);

        let mut sensor = Bme280Sensor::new(&mut i2c, ADDR);
        block_on(sensor.init()).unwrap();
        block_on(sensor.reset()).unwrap();
        assert!(sensor.calibration().is_none());
        assert_eq!(block_on(sensor.read()), Err(Bme280Error::NotCalibrated));

        i2c.done();
    }

    #[test]
    fn raw_read_retriggers_with_requested_oversampling() {
        let expectations = [
            Transaction::write(0x76, vec![0xF2, 0x05]),
            Transaction::write(0x76, vec![0xF4, 0b101_101_01]),
            Transaction::write_read(0x76, vec![0xF7], DATA.to_vec()),
        ];
        let mut i2c = Mock::new(&expectations);

        let mut sensor = Bme280Sensor::new(&mut i2c, registers::ALTERNATE_ADDRESS);
        let raw = block_on(sensor.read_raw_with(Oversampling::X16)).unwrap();
        assert_eq!(raw.temperature, 519888);

        i2c.done();
    }

    #[test]
    fn failed_data_read_is_reported() {
        let mut expectations = init_transactions();
        expectations.extend([
            Transaction::write(ADDR, vec![0xF2, 0x01]),
            Transaction::write(ADDR, vec![0xF4, 0x25]),
            Transaction::write_read(ADDR, vec![0xF7], vec![0; 8]).with_error(ErrorKind::Other),
        ]);
        let mut i2c = Mock::new(&expectations);

        let mut sensor = Bme280Sensor::new(&mut i2c, ADDR);
        block_on(sensor.init()).unwrap();
        assert_eq!(block_on(sensor.read()), Err(Bme280Error::I2CError));
        // the snapshot survives a failed cycle
        assert!(sensor.calibration().is_some());

        i2c.done();
    }

    #[test]
    fn custom_configuration_is_written() {
        let config = Bme280Config {
            standby: config::Standby::Millis1000,
            filter: config::Filter::Off,
            temperature_oversampling: Oversampling::X1,
            pressure_oversampling: Oversampling::X1,
            humidity_oversampling: Oversampling::X1,
            mode: Mode::Normal,
            sample_oversampling: Oversampling::X1,
        };
        let expectations = [
            Transaction::write(ADDR, vec![0xF5, 0xA0]),
            Transaction::write(ADDR, vec![0xF4, 0x27]),
            Transaction::write(ADDR, vec![0xF2, 0x01]),
        ];
        let mut i2c = Mock::new(&expectations);

        let mut sensor = Bme280Sensor::with_config(&mut i2c, ADDR, config);
        block_on(sensor.configure()).unwrap();

        i2c.done();
    }
}
