// SmartLED Strip Writer (WS2812/Neopixel über RMT)
//
// Alle Pixel zeigen dieselbe Farbe wie der MOSFET-Strip, gedimmt mit
// LED_BRIGHTNESS.

use esp_hal::Blocking;
use esp_hal::rmt::{PulseCode, Rmt};
use esp_hal::time::Rate;
use esp_hal_smartled::SmartLedsAdapter;
use phone_core::{Color, ColorWriter, OutputError, dim};
use smart_leds_trait::SmartLedsWrite;

use crate::config::{LED_BRIGHTNESS, LED_COUNT};

/// Buffer-Größe: 24 Bits pro LED (3 Farben * 8 Bits) + 1 Reset
pub const LED_BUFFER_SIZE: usize = LED_COUNT * 24 + 1;

/// Real Hardware LED Writer
///
/// Nutzt ESP32 RMT Peripheral um WS2812 LEDs anzusteuern.
///
/// Hinweis: Der Buffer wird in main() erstellt (smart_led_buffer! Macro)
/// und als Parameter übergeben statt im Constructor allokiert.
pub struct RmtLedWriter<'a> {
    led: SmartLedsAdapter<'a, LED_BUFFER_SIZE>,
    brightness: u8,
}

impl<'a> RmtLedWriter<'a> {
    /// Erstellt einen neuen RmtLedWriter
    ///
    /// # Parameter
    /// - `gpio8`: GPIO8 Peripheral für LED-Datenleitung
    /// - `rmt_peripheral`: RMT Peripheral
    /// - `rmt_clock_mhz`: RMT Clock Frequenz in MHz (z.B. 80)
    /// - `buffer`: Buffer für LED-Daten (erstellt mit smart_led_buffer!(LED_COUNT))
    pub fn new(
        gpio8: esp_hal::peripherals::GPIO8<'a>,
        rmt_peripheral: esp_hal::peripherals::RMT<'a>,
        rmt_clock_mhz: u32,
        buffer: &'a mut [PulseCode; LED_BUFFER_SIZE],
    ) -> Result<Self, esp_hal::rmt::Error> {
        let rmt: Rmt<'a, Blocking> = Rmt::new(rmt_peripheral, Rate::from_mhz(rmt_clock_mhz))?;

        // SmartLED Adapter erstellen
        let led = SmartLedsAdapter::new(rmt.channel0, gpio8, buffer);

        Ok(Self {
            led,
            brightness: LED_BRIGHTNESS,
        })
    }
}

impl ColorWriter for RmtLedWriter<'_> {
    fn write(&mut self, color: Color) -> Result<(), OutputError> {
        let pixel = Color {
            r: dim(color.r, self.brightness),
            g: dim(color.g, self.brightness),
            b: dim(color.b, self.brightness),
        };

        self.led
            .write([pixel; LED_COUNT].into_iter())
            .map_err(|_| OutputError::WriteFailed)
    }
}
