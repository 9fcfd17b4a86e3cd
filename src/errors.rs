// Error types for lapdelta

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum LapDeltaError {
    // Errors from the analytics core
    #[snafu(display(
        "Lap {lap_number} of {driver} has {samples} usable samples, at least 2 are required"
    ))]
    InsufficientData {
        driver: String,
        lap_number: u32,
        samples: usize,
    },
    #[snafu(display("Lap {lap_number} of {driver} has a degenerate distance series: {reason}"))]
    DegenerateSeries {
        driver: String,
        lap_number: u32,
        reason: String,
    },
    #[snafu(display("No laps are bound, track dominance cannot be computed"))]
    NoContendingLaps,
    #[snafu(display("Invalid track segmentation: {reason}"))]
    InvalidSegmentation { reason: String },

    // Comparison session errors
    #[snafu(display("Slot {slot} does not exist"))]
    SlotOutOfRange { slot: usize },
    #[snafu(display("Lap {lap_number} of {driver} not found in session"))]
    LapNotFound { driver: String, lap_number: u32 },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Session file errors
    #[snafu(display("Invalid telemetry file: {path}"))]
    InvalidTelemetryFile { path: String },
    #[snafu(display("Error loading telemetry file"))]
    TelemetryLoaderError { source: io::Error },
    #[snafu(display("Error writing telemetry file"))]
    WriterError { source: io::Error },
}
