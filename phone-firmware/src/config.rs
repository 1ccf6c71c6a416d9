// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
//
// Die GPIO-Nummern hier dienen dem Logging und der Route-Beschreibung.
// Die eigentliche Pin-Vergabe passiert in main.rs über die typisierten
// Peripherals und muss mit diesen Werten übereinstimmen.

use phone_core::{ButtonAction, Color, I2sRoute, TrackRef};

// ============================================================================
// Taster
// ============================================================================

/// Anzahl der Taster am Gehäuse
pub const BUTTON_COUNT: usize = 9;

/// GPIO-Pins der Taster (Index 0 = Taster 1)
/// Aktiv-low mit internem Pull-Up
pub const BUTTON_PINS: [u8; BUTTON_COUNT] = [0, 1, 2, 3, 4, 5, 6, 7, 9];

/// Pfad des Titels für Taster 1
/// Wird zur Build-Zeit aus der Environment Variable PHONE_TRACK_A geladen
/// (siehe .env), sonst gilt der Default
pub const TRACK_A_PATH: &str = match option_env!("PHONE_TRACK_A") {
    Some(path) => path,
    None => "FILE1.WAV",
};

/// Titel für Taster 1, ein leerer Pfad bricht den Build ab
pub const TRACK_A: TrackRef = match TrackRef::new(TRACK_A_PATH) {
    Some(track) => track,
    None => panic!("PHONE_TRACK_A darf nicht leer sein"),
};

/// Aktion pro Taster: 1 = Titel A, 2 = Stop, Rest ohne Funktion
pub const BUTTON_ACTIONS: [ButtonAction; BUTTON_COUNT] = [
    ButtonAction::Play(TRACK_A),
    ButtonAction::Stop,
    ButtonAction::Unassigned,
    ButtonAction::Unassigned,
    ButtonAction::Unassigned,
    ButtonAction::Unassigned,
    ButtonAction::Unassigned,
    ButtonAction::Unassigned,
    ButtonAction::Unassigned,
];

// ============================================================================
// MOSFET LED-Strip (PWM)
// ============================================================================

/// GPIO-Pins der PWM-Kanäle (Rot, Grün, Blau)
pub const PWM_PINS: [u8; 3] = [16, 17, 18];

/// PWM-Frequenz in kHz
pub const PWM_FREQUENCY_KHZ: u32 = 5;

// Auflösung: 8 Bit (Duty 0-255), siehe timer::config::Duty::Duty8Bit in main.rs

// ============================================================================
// SmartLED Strip (WS2812/Neopixel)
// ============================================================================

/// GPIO-Pin für die Datenleitung des Strips
pub const LED_GPIO_PIN: u8 = 8;

/// Helligkeits-Faktor für den Strip (0-255)
/// Wert ist gedimmt für Augenschonung
pub const LED_BRIGHTNESS: u8 = 64;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

/// Anzahl der LEDs im Strip
pub const LED_COUNT: usize = 8;

/// Start-Signal: kurzes Grün auf dem Strip
pub const BOOT_FLASH_COLOR: Color = Color { r: 0, g: 24, b: 0 };
pub const BOOT_FLASH_MS: u64 = 150;

// ============================================================================
// Audio (I2S)
// ============================================================================

/// I2S-Routing zum Verstärker (ohne MCLK)
pub const I2S_ROUTE: I2sRoute = I2sRoute {
    bclk: 19,
    lrc: 20,
    dout: 21,
    mclk: None,
};

/// Abtastrate der WAV-Dateien (16 Bit Stereo)
pub const SAMPLE_RATE_HZ: u32 = 44_100;

/// Maximal gelesene Bytes pro pump()-Aufruf (ca. 11,6 ms Audio)
pub const AUDIO_BLOCK_SIZE: usize = 2048;

/// Ring-Buffer des zirkulären DMA-Transfers (ca. 46 ms Audio)
/// Die Zyklus-Pause muss deutlich kürzer sein, sonst läuft der Ring leer
pub const AUDIO_DMA_SIZE: usize = 4 * AUDIO_BLOCK_SIZE;

// ============================================================================
// SD-Karte (SPI)
// ============================================================================

/// GPIO-Pins des SPI-Busses
pub const SD_CS_PIN: u8 = 10;
pub const SD_SCK_PIN: u8 = 11;
pub const SD_MOSI_PIN: u8 = 14;
pub const SD_MISO_PIN: u8 = 15;

/// SPI-Takt während der Karten-Initialisierung (SD-Standard: max. 400 kHz)
pub const SD_INIT_FREQUENCY_KHZ: u32 = 400;

/// SPI-Takt nach der Initialisierung
pub const SD_FREQUENCY_MHZ: u32 = 16;

// ============================================================================
// Steuer-Zyklus
// ============================================================================

/// Pause zwischen zwei Zyklen in Millisekunden
/// Deutlich unter dem Entprell-Fenster (50 ms)
pub const CYCLE_INTERVAL_MS: u64 = 1;
