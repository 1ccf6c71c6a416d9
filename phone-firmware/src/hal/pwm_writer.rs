// MOSFET LED-Strip Writer (drei PWM-Kanäle)
//
// Generisch über embedded_hal::pwm::SetDutyCycle, in der Firmware sind das
// die LEDC-Kanäle (5 kHz, 8 Bit).

use embedded_hal::pwm::SetDutyCycle;
use phone_core::{Color, ColorWriter, OutputError};

pub struct PwmRgbWriter<C> {
    red: C,
    green: C,
    blue: C,
}

impl<C: SetDutyCycle> PwmRgbWriter<C> {
    pub fn new(red: C, green: C, blue: C) -> Self {
        Self { red, green, blue }
    }
}

impl<C: SetDutyCycle> ColorWriter for PwmRgbWriter<C> {
    /// Setzt alle drei Duty-Cycles (Kanalwert / 255)
    fn write(&mut self, color: Color) -> Result<(), OutputError> {
        for (channel, value) in [
            (&mut self.red, color.r),
            (&mut self.green, color.g),
            (&mut self.blue, color.b),
        ] {
            channel
                .set_duty_cycle_fraction(u16::from(value), 255)
                .map_err(|_| OutputError::WriteFailed)?;
        }
        Ok(())
    }
}
