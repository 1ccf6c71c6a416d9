//! Farb-Ausgabe und Farb-Strategien

use rand_core::RngCore;

use crate::traits::{ColorGenerator, ColorWriter, OutputError};
use crate::types::Color;

/// "Setze jetzt diese Farbe" über eine beliebige physische Ausgabe
///
/// Merkt sich nur die zuletzt geschriebene Farbe. Gleiche Farben werden
/// nicht erneut geschrieben, jede neue Farbe geht sofort auf die Hardware.
pub struct ColorOutput<W> {
    writer: W,
    last: Option<Color>,
}

impl<W: ColorWriter> ColorOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last: None }
    }

    /// Schreibt die Farbe auf die Hardware (Seiteneffekt)
    ///
    /// Nach einem Fehler bleibt die letzte Farbe unverändert, der nächste
    /// Aufruf versucht es erneut.
    pub fn set_color(&mut self, color: Color) -> Result<(), OutputError> {
        if self.last == Some(color) {
            return Ok(());
        }

        self.writer.write(color)?;
        self.last = Some(color);
        Ok(())
    }

    /// Zuletzt erfolgreich geschriebene Farbe
    pub fn last_color(&self) -> Option<Color> {
        self.last
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}

/// Gleichverteilte Zufallsfarben aus einem beliebigen RNG
pub struct UniformColors<R> {
    rng: R,
}

impl<R: RngCore> UniformColors<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> ColorGenerator for UniformColors<R> {
    fn next_color(&mut self) -> Color {
        let [r, g, b, _] = self.rng.next_u32().to_le_bytes();
        Color { r, g, b }
    }
}
