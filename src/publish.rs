//! Polling cycle that hands each reading to a publisher.
use core::fmt;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::payload::{PAYLOAD_CAPACITY, build_payload};
use crate::{Bme280Error, Bme280Sensor, CalibratedReading};

/// Receives one reading per cycle, e.g. an MQTT client or a serial link.
pub trait Publisher {
    type Error;

    async fn publish(&mut self, reading: &CalibratedReading) -> Result<(), Self::Error>;
}

/// Why a cycle produced no published reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleError<E> {
    /// The sensor could not be read; nothing was published.
    Sensor(Bme280Error),
    /// The reading was taken but the publisher rejected it.
    Publish(E),
}

/// Logs the JSON payload of every reading.
#[derive(Debug, Default)]
pub struct LogPublisher;

impl Publisher for LogPublisher {
    type Error = fmt::Error;

    async fn publish(&mut self, reading: &CalibratedReading) -> Result<(), Self::Error> {
        let payload = build_payload::<PAYLOAD_CAPACITY>(reading)?;
        info!("{=str}", payload.as_str());
        Ok(())
    }
}

/// Reads the sensor once and publishes the result.
///
/// A failed read skips publishing. Nothing is retried here.
pub async fn poll_once<T, P>(
    sensor: &mut Bme280Sensor<'_, T>,
    publisher: &mut P,
) -> Result<CalibratedReading, CycleError<P::Error>>
where
    T: I2c,
    P: Publisher,
{
    let reading = sensor.read().await.map_err(CycleError::Sensor)?;
    publisher
        .publish(&reading)
        .await
        .map_err(CycleError::Publish)?;
    Ok(reading)
}

/// One polling cycle followed by the wait for the next one.
pub async fn cycle<T, P, D>(
    sensor: &mut Bme280Sensor<'_, T>,
    publisher: &mut P,
    delay: &mut D,
    period_ms: u32,
) -> Result<CalibratedReading, CycleError<P::Error>>
where
    T: I2c,
    P: Publisher,
    D: DelayNs,
{
    let result = poll_once(sensor, publisher).await;
    match &result {
        Ok(reading) => debug!("Published {:?}", reading),
        Err(CycleError::Sensor(e)) => warn!("Sensor read failed: {:?}", e),
        Err(CycleError::Publish(_)) => warn!("Publish failed"),
    }
    delay.delay_ms(period_ms).await;
    result
}

/// Polls forever, retrying on the next cycle after any failure.
pub async fn run<T, P, D>(
    sensor: &mut Bme280Sensor<'_, T>,
    publisher: &mut P,
    delay: &mut D,
    period_ms: u32,
) -> !
where
    T: I2c,
    P: Publisher,
    D: DelayNs,
{
    loop {
        let _ = cycle(sensor, publisher, delay, period_ms).await;
    }
}
