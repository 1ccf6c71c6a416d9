// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Embassy Async Runtime
use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_time::{Delay, Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::Blocking;
use esp_hal::i2s::master::{Config as I2sConfig, DataFormat, I2s, I2sTx};
use esp_hal::ledc::channel::{self, ChannelIFace};
use esp_hal::ledc::timer::{self, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::rng::Rng;
use esp_hal::spi;
use esp_hal::spi::master::Spi;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal_smartled::smart_led_buffer;
use static_cell::StaticCell;

// SD-Karte
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::SdCard;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use phone_core::indicator::OFF;
use phone_core::{ColorOutput, ColorWriter, DeviceCoordinator, IndicatorStyle};
use phone_core::{PlaybackEngine, StatusIndicator};
use phone_firmware::config::{
    AUDIO_DMA_SIZE, BOOT_FLASH_COLOR, BOOT_FLASH_MS, BUTTON_ACTIONS, BUTTON_PINS, I2S_ROUTE,
    LED_COUNT, LED_GPIO_PIN, PWM_FREQUENCY_KHZ, PWM_PINS, RMT_CLOCK_MHZ, SAMPLE_RATE_HZ,
    SD_CS_PIN, SD_FREQUENCY_MHZ, SD_INIT_FREQUENCY_KHZ, SD_MISO_PIN, SD_MOSI_PIN, SD_SCK_PIN,
};
use phone_firmware::hal::{
    HardwareRngColors, PwmRgbWriter, RmtLedWriter, SdAudioPipeline, SdStorage, SdVolume,
};
use phone_firmware::tasks::control_loop;

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Erstellt einen LEDC-Kanal für eine Farbe des MOSFET-Strips (Start: aus)
fn pwm_channel(
    ledc: &Ledc<'static>,
    pwm_timer: &'static timer::Timer<'static, LowSpeed>,
    number: channel::Number,
    pin: impl PeripheralOutput<'static>,
) -> channel::Channel<'static, LowSpeed> {
    let mut channel = ledc.channel(number, pin);
    channel
        .configure(channel::config::Config {
            timer: pwm_timer,
            duty_pct: 0,
            pin_config: channel::config::PinConfig::PushPull,
        })
        .expect("Failed to configure LEDC channel");
    channel
}

/// Main Entry Point
///
/// Initialisiert Hardware, mountet die SD-Karte und läuft dann endlos im
/// Steuer-Zyklus. Es werden keine weiteren Tasks gespawnt.
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);
    info!("Embassy initialized!");
    info!(
        "Pins: buttons={}, PWM RGB={}, LED strip={}, SD CS/SCK/MOSI/MISO={}/{}/{}/{}",
        BUTTON_PINS,
        PWM_PINS,
        LED_GPIO_PIN,
        SD_CS_PIN,
        SD_SCK_PIN,
        SD_MOSI_PIN,
        SD_MISO_PIN
    );

    // ------------------------------------------------------------------------
    // Taster (aktiv-low, interner Pull-Up), Reihenfolge wie BUTTON_PINS
    // ------------------------------------------------------------------------
    let pull_up = || InputConfig::default().with_pull(Pull::Up);
    let buttons = [
        Input::new(peripherals.GPIO0, pull_up()),
        Input::new(peripherals.GPIO1, pull_up()),
        Input::new(peripherals.GPIO2, pull_up()),
        Input::new(peripherals.GPIO3, pull_up()),
        Input::new(peripherals.GPIO4, pull_up()),
        Input::new(peripherals.GPIO5, pull_up()),
        Input::new(peripherals.GPIO6, pull_up()),
        Input::new(peripherals.GPIO7, pull_up()),
        Input::new(peripherals.GPIO9, pull_up()),
    ];

    // ------------------------------------------------------------------------
    // SmartLED Strip + Start-Signal
    // ------------------------------------------------------------------------
    // Buffer für SmartLED Daten erstellen (LED_COUNT LEDs)
    let mut rmt_buffer = smart_led_buffer!(LED_COUNT);
    let mut pixels = RmtLedWriter::new(
        peripherals.GPIO8,
        peripherals.RMT,
        RMT_CLOCK_MHZ,
        &mut rmt_buffer,
    )
    .expect("Failed to initialize RMT");

    if pixels.write(BOOT_FLASH_COLOR).is_err() {
        error!("Failed to write boot flash");
    }
    Timer::after(Duration::from_millis(BOOT_FLASH_MS)).await;
    if pixels.write(OFF).is_err() {
        error!("Failed to clear LED strip");
    }

    // ------------------------------------------------------------------------
    // MOSFET Strip: LEDC, 5 kHz, 8 Bit
    // ------------------------------------------------------------------------
    let mut ledc = Ledc::new(peripherals.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

    // Timer muss 'static sein, die Kanäle halten eine Referenz darauf
    static PWM_TIMER: StaticCell<timer::Timer<'static, LowSpeed>> = StaticCell::new();
    let pwm_timer = PWM_TIMER.init(ledc.timer::<LowSpeed>(timer::Number::Timer0));
    pwm_timer
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty8Bit,
            clock_source: timer::LSClockSource::APBClk,
            frequency: Rate::from_khz(PWM_FREQUENCY_KHZ),
        })
        .expect("Failed to configure LEDC timer");
    let pwm_timer: &'static timer::Timer<'static, LowSpeed> = pwm_timer;

    let strip = PwmRgbWriter::new(
        pwm_channel(&ledc, pwm_timer, channel::Number::Channel0, peripherals.GPIO16),
        pwm_channel(&ledc, pwm_timer, channel::Number::Channel1, peripherals.GPIO17),
        pwm_channel(&ledc, pwm_timer, channel::Number::Channel2, peripherals.GPIO18),
    );

    // ------------------------------------------------------------------------
    // SD-Karte über SPI
    // ------------------------------------------------------------------------
    let spi_bus = Spi::new(
        peripherals.SPI2,
        spi::master::Config::default()
            .with_frequency(Rate::from_khz(SD_INIT_FREQUENCY_KHZ))
            .with_mode(spi::Mode::_0),
    )
    .expect("Failed to initialize SPI")
    .with_sck(peripherals.GPIO11)
    .with_mosi(peripherals.GPIO14)
    .with_miso(peripherals.GPIO15);
    let sd_cs = Output::new(peripherals.GPIO10, Level::High, OutputConfig::default());
    let Ok(sd_device) = ExclusiveDevice::new(spi_bus, sd_cs, Delay);

    let card = SdCard::new(sd_device, Delay);
    // Erster Zugriff initialisiert die Karte (mit Init-Takt), danach schneller
    match card.num_bytes() {
        Ok(size) => {
            info!("Card size is {} bytes", size);
            let fast = spi::master::Config::default()
                .with_frequency(Rate::from_mhz(SD_FREQUENCY_MHZ))
                .with_mode(spi::Mode::_0);
            if let Err(e) = card.spi(|device| device.bus_mut().apply_config(&fast)) {
                error!("Failed to raise SPI clock: {}", defmt::Debug2Format(&e));
            }
        }
        Err(e) => error!("SD card not responding: {}", defmt::Debug2Format(&e)),
    }

    static SD_VOLUME: StaticCell<SdVolume> = StaticCell::new();
    let sd_volume: &'static SdVolume = SD_VOLUME.init(SdVolume::new(card));
    let mut storage = SdStorage::new(sd_volume);

    // ------------------------------------------------------------------------
    // Audio: I2S (Philips, 16 Bit Stereo) mit zirkulärem DMA
    // ------------------------------------------------------------------------
    let (_, _, tx_buffer, tx_descriptors) = esp_hal::dma_buffers!(0, AUDIO_DMA_SIZE);
    let i2s = I2s::new(
        peripherals.I2S0,
        peripherals.DMA_CH0,
        I2sConfig::new_tdm_philips()
            .with_sample_rate(Rate::from_hz(SAMPLE_RATE_HZ))
            .with_data_format(DataFormat::Data16Channel16),
    )
    .expect("Failed to initialize I2S");

    // Pins wie in I2S_ROUTE, 'static weil jede Session einen Transfer darauf startet
    static I2S_TX: StaticCell<I2sTx<'static, Blocking>> = StaticCell::new();
    let i2s_tx = I2S_TX.init(
        i2s.i2s_tx
            .with_bclk(peripherals.GPIO19)
            .with_ws(peripherals.GPIO20)
            .with_dout(peripherals.GPIO21)
            .build(tx_descriptors),
    );

    let pipeline = SdAudioPipeline::new(sd_volume, i2s_tx, tx_buffer);

    // ------------------------------------------------------------------------
    // Koordinator zusammensetzen
    // ------------------------------------------------------------------------
    let engine = PlaybackEngine::new(pipeline, I2S_ROUTE);
    let indicator = StatusIndicator::new(
        IndicatorStyle::Animated,
        HardwareRngColors::new(Rng::new()),
    );
    // Beide Strips zeigen dieselbe Farbe
    let output = ColorOutput::new((strip, pixels));

    // Mountet die SD-Karte (genau einmal)
    let coordinator = DeviceCoordinator::new(
        BUTTON_PINS,
        BUTTON_ACTIONS,
        engine,
        indicator,
        output,
        &mut storage,
    );
    info!("Setup complete, entering control loop");

    control_loop(coordinator, buttons).await
}
