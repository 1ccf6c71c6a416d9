// Zufallsfarben aus dem Hardware-RNG

use esp_hal::rng::Rng;
use phone_core::{Color, ColorGenerator};

/// Tanz-Farben für die Wiedergabe, jeder Kanal gleichverteilt 0-255
pub struct HardwareRngColors {
    rng: Rng,
}

impl HardwareRngColors {
    pub fn new(rng: Rng) -> Self {
        Self { rng }
    }
}

impl ColorGenerator for HardwareRngColors {
    fn next_color(&mut self) -> Color {
        let [r, g, b, _] = self.rng.random().to_le_bytes();
        Color { r, g, b }
    }
}
