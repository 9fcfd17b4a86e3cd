// Library interface for lapdelta
// This allows integration tests to access internal modules

pub mod analysis;
pub mod colors;
pub mod comparison;
pub mod config;
pub mod errors;
pub mod format;
pub mod session;
pub mod telemetry;
pub mod track;

// Re-export commonly used types
pub use analysis::{AlignedDelta, DominanceMap, TrackSegmentation, compute_delta, compute_dominance};
pub use comparison::{ComparisonRenderer, ComparisonSession, ComparisonView, Notice, SessionContext};
pub use config::AppConfig;
pub use errors::LapDeltaError;
pub use session::SessionKind;
pub use telemetry::{LapInfo, LapProvider, LapSeries, LapTelemetrySample, SessionFile, SessionInfo};
