// SD-Karte: FAT-Volume über SPI (embedded-sdmmc)
//
// SdVolume wird einmal in main() erstellt und von Speicher-Prüfung und
// Audio-Pipeline gemeinsam benutzt. Alles läuft im selben Steuer-Zyklus,
// daher reicht eine Cell für das Root-Verzeichnis.

use core::cell::Cell;

use defmt::{error, info};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::{
    Mode, RawDirectory, RawFile, SdCard, TimeSource, Timestamp, VolumeIdx, VolumeManager,
};
use esp_hal::Blocking;
use esp_hal::gpio::Output;
use esp_hal::spi::master::Spi;
use phone_core::{AudioError, Storage};

pub type SdSpiDevice = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, Delay>;
pub type SdBlockDevice = SdCard<SdSpiDevice, Delay>;

/// Feste Zeitquelle, wir schreiben keine Dateien
#[derive(Default)]
pub struct FixedTimeSource;

impl TimeSource for FixedTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 0,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

pub struct SdVolume {
    manager: VolumeManager<SdBlockDevice, FixedTimeSource>,
    root: Cell<Option<RawDirectory>>,
}

impl SdVolume {
    pub fn new(card: SdBlockDevice) -> Self {
        Self {
            manager: VolumeManager::new(card, FixedTimeSource),
            root: Cell::new(None),
        }
    }

    /// Öffnet Volume 0 und dessen Root-Verzeichnis
    fn mount(&self) -> Result<RawDirectory, embedded_sdmmc::Error<embedded_sdmmc::SdCardError>> {
        let volume = self.manager.open_raw_volume(VolumeIdx(0))?;
        self.manager.open_root_dir(volume)
    }

    pub fn is_mounted(&self) -> bool {
        self.root.get().is_some()
    }

    /// Öffnet eine Datei im Root-Verzeichnis zum Lesen
    ///
    /// Ein führendes `/` wird ignoriert, Namen sind 8.3 (z.B. `FILE1.WAV`).
    pub fn open(&self, path: &str) -> Result<RawFile, AudioError> {
        let root = self.root.get().ok_or(AudioError::Storage)?;
        let name = path.trim_start_matches('/');

        self.manager
            .open_file_in_dir(root, name, Mode::ReadOnly)
            .map_err(|e| match e {
                embedded_sdmmc::Error::NotFound | embedded_sdmmc::Error::FilenameError(_) => {
                    AudioError::TrackNotFound
                }
                _ => AudioError::Storage,
            })
    }

    /// Liest ab der aktuellen Position, 0 = Dateiende
    pub fn read(&self, file: RawFile, buffer: &mut [u8]) -> Result<usize, AudioError> {
        self.manager
            .read(file, buffer)
            .map_err(|_| AudioError::Storage)
    }

    /// Setzt die Leseposition auf `offset` Bytes ab Dateianfang
    pub fn seek(&self, file: RawFile, offset: u32) -> Result<(), AudioError> {
        self.manager
            .file_seek_from_start(file, offset)
            .map_err(|_| AudioError::Storage)
    }

    pub fn close(&self, file: RawFile) {
        if let Err(e) = self.manager.close_file(file) {
            error!("Failed to close file: {}", defmt::Debug2Format(&e));
        }
    }
}

/// Speicher-Prüfung für den Koordinator
pub struct SdStorage<'a> {
    volume: &'a SdVolume,
}

impl<'a> SdStorage<'a> {
    pub fn new(volume: &'a SdVolume) -> Self {
        Self { volume }
    }
}

impl Storage for SdStorage<'_> {
    fn mount(&mut self) -> bool {
        if self.volume.is_mounted() {
            return true;
        }

        match self.volume.mount() {
            Ok(root) => {
                self.volume.root.set(Some(root));
                info!("SD volume 0 mounted");
                true
            }
            Err(e) => {
                error!("SD mount failed: {}", defmt::Debug2Format(&e));
                false
            }
        }
    }
}
