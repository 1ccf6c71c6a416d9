// Library-Root: Hardware-Implementierungen und Steuer-Zyklus
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;

// Re-exports von phone-core
pub use phone_core::{
    ColorOutput, DeviceCoordinator, IndicatorStyle, PlaybackEngine, StatusIndicator,
};

// ============================================================================
// Testing-Strategie
// ============================================================================
//
// Diese Crate kompiliert nur für riscv32imac-unknown-none-elf (esp-hal,
// embassy). Die gesamte Logik (Entprellung, Zustandsmaschine, Anzeige,
// Steuer-Zyklus) liegt deshalb in phone-core und wird dort bzw. in
// phone-tests auf dem Host mit Mocks getestet.
//
// Hier bleibt nur dünner Hardware-Code: Trait-Implementierungen (hal/) und
// die Schleife, die Pegel und Zeit in den Koordinator gibt (tasks/).
