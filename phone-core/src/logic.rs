//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

use core::f32::consts::PI;

use crate::playback::MAX_OUTPUT_LEVEL;
use crate::types::{ButtonAction, DeviceState, TrackRef};

/// Periode des "Atmens" im Leerlauf in Millisekunden
pub const BREATH_PERIOD_MS: u64 = 4000;

/// Skalierung der Hüllkurve: (e - 1/e) * 108 ≈ 253
const BREATH_SCALE: f32 = 108.0;

/// 1/e - Minimum von exp(sin(x)), damit die Hüllkurve bei 0 beginnt
const INV_E: f32 = 0.367_879_44;

/// Ereignisse der Wiedergabe-Zustandsmaschine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    Play,
    Stop,
    EnterUsbTransfer,
    ExitUsbTransfer,
}

/// Zentrale Übergangs-Funktion über [`DeviceState`]
///
/// `None` bedeutet: Ereignis ist im aktuellen Zustand nicht erlaubt.
///
/// | Zustand      | Play    | Stop        | EnterUsb    | ExitUsb |
/// |--------------|---------|-------------|-------------|---------|
/// | Idle         | Playing | Idle        | UsbTransfer | -       |
/// | Playing      | Playing | Idle        | UsbTransfer | -       |
/// | UsbTransfer  | -       | Idle        | UsbTransfer | Idle    |
pub fn transition(state: DeviceState, event: Transition) -> Option<DeviceState> {
    use DeviceState::*;

    match (state, event) {
        (UsbTransfer, Transition::Play) => None,
        (_, Transition::Play) => Some(Playing),
        // Stop führt aus jedem Zustand nach Idle, auch aus dem USB-Modus
        (_, Transition::Stop) => Some(Idle),
        (_, Transition::EnterUsbTransfer) => Some(UsbTransfer),
        (UsbTransfer, Transition::ExitUsbTransfer) => Some(Idle),
        (_, Transition::ExitUsbTransfer) => None,
    }
}

/// Was ein bestätigter Tastendruck auslöst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Play(TrackRef),
    Stop,
    /// Kein Speicher: Fehler-Blinken, keine Wiedergabe-Aktion
    StorageError,
    Ignore,
}

/// Löst die Aktion eines Tasters gegen die Speicher-Verfügbarkeit auf
///
/// Ohne Speicher meldet JEDER Taster einen Fehler, auch Stop und
/// unbelegte Taster.
pub fn resolve_press(action: ButtonAction, storage_available: bool) -> Dispatch {
    if !storage_available {
        return Dispatch::StorageError;
    }

    match action {
        ButtonAction::Play(track) => Dispatch::Play(track),
        ButtonAction::Stop => Dispatch::Stop,
        ButtonAction::Unassigned => Dispatch::Ignore,
    }
}

/// Helligkeit des blauen "Atmens" zum Zeitpunkt `now_ms`
///
/// `exp(sin(t))` ergibt eine weiche, nicht-lineare Hüllkurve: schnelles
/// Aufleuchten, langes Ausklingen. Periodisch mit [`BREATH_PERIOD_MS`].
///
/// ```
/// # use phone_core::logic::{breathing_level, BREATH_PERIOD_MS};
/// assert_eq!(breathing_level(0), breathing_level(BREATH_PERIOD_MS));
/// ```
pub fn breathing_level(now_ms: u64) -> u8 {
    let phase = (now_ms % BREATH_PERIOD_MS) as f32 / BREATH_PERIOD_MS as f32;
    let envelope = libm::expf(libm::sinf(phase * 2.0 * PI)) - INV_E;
    // `as u8` sättigt: kleine negative Rundungsfehler werden 0
    (envelope * BREATH_SCALE) as u8
}

/// Lage der Sample-Daten in einer WAV-Datei (Offset ab Dateianfang)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavData {
    pub offset: u32,
    pub len: u32,
}

/// Durchsucht den Anfang einer RIFF/WAVE-Datei nach `fmt ` und `data`
///
/// Akzeptiert nur PCM, 16 Bit, Stereo. Der `fmt `-Chunk muss vor dem
/// `data`-Chunk stehen und beide müssen in `header` beginnen. Andere
/// Chunks (`LIST`, `fact`, ...) werden übersprungen.
pub fn find_pcm16_data(header: &[u8]) -> Option<WavData> {
    if header.len() < 12 || &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
        return None;
    }

    let mut pcm16 = false;
    let mut pos = 12usize;
    while pos + 8 <= header.len() {
        let id = &header[pos..pos + 4];
        let size = u32::from_le_bytes([
            header[pos + 4],
            header[pos + 5],
            header[pos + 6],
            header[pos + 7],
        ]);
        let body = pos + 8;

        if id == b"fmt " {
            let fmt = header.get(body..body + 16)?;
            let format = u16::from_le_bytes([fmt[0], fmt[1]]);
            let channels = u16::from_le_bytes([fmt[2], fmt[3]]);
            let bits_per_sample = u16::from_le_bytes([fmt[14], fmt[15]]);
            pcm16 = size >= 16 && format == 1 && channels == 2 && bits_per_sample == 16;
        } else if id == b"data" {
            return pcm16.then_some(WavData {
                offset: body as u32,
                len: size,
            });
        }

        // Chunks sind auf gerade Länge aufgefüllt
        let padded = (size as usize).checked_add(size as usize & 1)?;
        pos = body.checked_add(padded)?;
    }
    None
}

/// Skaliert 16-Bit-LE-Samples mit `level / MAX_OUTPUT_LEVEL`
///
/// Ein ungerades letztes Byte bleibt unverändert.
pub fn apply_level(samples: &mut [u8], level: u8) {
    if level >= MAX_OUTPUT_LEVEL {
        return;
    }

    for sample in samples.chunks_exact_mut(2) {
        let value = i32::from(i16::from_le_bytes([sample[0], sample[1]]));
        let scaled = (value * i32::from(level) / i32::from(MAX_OUTPUT_LEVEL)) as i16;
        sample.copy_from_slice(&scaled.to_le_bytes());
    }
}

/// Dimmt einen Farbkanal: `value * brightness / 255`
pub fn dim(value: u8, brightness: u8) -> u8 {
    ((u16::from(value) * u16::from(brightness)) / 255) as u8
}
