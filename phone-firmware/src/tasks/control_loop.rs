// Steuer-Zyklus - Taster lesen, Koordinator ausführen, kurz abgeben
use embassy_time::{Duration, Instant, Timer};
use esp_hal::gpio::Input;
use phone_core::{AudioPipeline, ColorGenerator, ColorWriter, DeviceCoordinator, Level};

use crate::config::CYCLE_INTERVAL_MS;

/// Roh-Pegel aller Taster als Snapshot für einen Zyklus
pub fn read_levels<const N: usize>(buttons: &[Input<'_>; N]) -> [Level; N] {
    core::array::from_fn(|i| {
        if buttons[i].is_low() {
            Level::Low
        } else {
            Level::High
        }
    })
}

/// Control Loop - läuft endlos im main()-Future
///
/// Die komplette Logik steckt im [`DeviceCoordinator`] (phone-core, mit
/// Mocks getestet). Hier passiert nur noch Hardware-I/O:
/// - Zeitstempel von embassy-time
/// - Pegel der Taster-Inputs
/// - Async Delay zwischen den Zyklen
///
/// # Parameter
/// - `coordinator`: fertig konfigurierter Koordinator (Speicher ist gemountet)
/// - `buttons`: Taster-Inputs, Index passend zu den Aktionen im Koordinator
pub async fn control_loop<P, W, G, const N: usize>(
    mut coordinator: DeviceCoordinator<P, W, G, N>,
    buttons: [Input<'_>; N],
) -> !
where
    P: AudioPipeline,
    W: ColorWriter,
    G: ColorGenerator,
{
    loop {
        let now_ms = Instant::now().as_millis();
        let levels = read_levels(&buttons);

        coordinator.run_cycle(now_ms, &levels);

        // Async Delay: gibt die CPU kurz ab
        Timer::after(Duration::from_millis(CYCLE_INTERVAL_MS)).await;
    }
}
