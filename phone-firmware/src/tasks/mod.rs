// Task-Modul: der Steuer-Zyklus
//
// Es gibt genau eine Schleife (im main()-Future), keine weiteren Tasks.

pub mod control_loop;

pub use control_loop::{control_loop, read_levels};
