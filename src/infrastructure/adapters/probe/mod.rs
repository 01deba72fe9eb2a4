//! Probe Adapters

mod symphonia_probe;

pub use symphonia_probe::SymphoniaAudioProbe;
