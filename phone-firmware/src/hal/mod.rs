// Hardware Abstraction Layer (HAL) Module
//
// Implementierungen der phone-core Traits für die ESP32-C6 Peripherals.

pub mod audio;
pub mod led_writer;
pub mod pwm_writer;
pub mod rng_colors;
pub mod sd_card;

pub use audio::SdAudioPipeline;
pub use led_writer::{LED_BUFFER_SIZE, RmtLedWriter};
pub use pwm_writer::PwmRgbWriter;
pub use rng_colors::HardwareRngColors;
pub use sd_card::{FixedTimeSource, SdBlockDevice, SdStorage, SdVolume};
