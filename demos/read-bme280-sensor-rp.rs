#![no_std]
#![no_main]

use defmt::{error, info};
use defmt_rtt as _;
use embassy_bme280_mqtt::publish::{self, LogPublisher};
use embassy_bme280_mqtt::registers::DEFAULT_ADDRESS;
use embassy_bme280_mqtt::{Bme280Error, Bme280Sensor};
use embassy_executor::Spawner;
use embassy_rp::peripherals::I2C0;
use embassy_rp::{bind_interrupts, i2c};
use embassy_time::{Delay, Duration, Timer};
use panic_probe as _;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

const DEFAULT_POLL_INTERVAL_MS: u32 = 500;

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let p = embassy_rp::init(Default::default());

    let sda = p.PIN_4;
    let scl = p.PIN_5;

    // Configure I2C
    let mut config = i2c::Config::default();
    config.frequency = 100_000;
    let mut i2c = i2c::I2c::new_async(p.I2C0, scl, sda, Irqs, config);

    let poll_interval_ms = option_env!("POLL_INTERVAL_MS")
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

    // Create sensor instance
    let mut sensor = Bme280Sensor::new(&mut i2c, DEFAULT_ADDRESS);

    // Configure and read calibration; no readings until this succeeds
    loop {
        match sensor.init().await {
            Ok(()) => break,
            Err(e) => match e {
                Bme280Error::I2CError => error!("I2C communication error"),
                Bme280Error::UnexpectedChipId(id) => error!("Not a BME280, chip id {=u8:#x}", id),
                Bme280Error::NotCalibrated => error!("Calibration missing"),
            },
        }
        Timer::after(Duration::from_secs(1)).await;
    }

    // let the first normal-mode conversion finish before polling
    Timer::after(Duration::from_millis(500)).await;

    info!("Polling every {} ms", poll_interval_ms);
    let mut publisher = LogPublisher;
    let mut delay = Delay;
    publish::run(&mut sensor, &mut publisher, &mut delay, poll_interval_ms).await
}
