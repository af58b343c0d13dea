pub mod error;
pub mod thresholds;
pub mod types;

pub use error::{BrambleError, BrambleResult};
pub use thresholds::{DecisionPolicy, ThresholdTable};
pub use types::{
    AnalysisDetails, AnalysisRecord, AnalysisResult, AutomationFlags, DistributionSummary,
    FieldPattern, Flag, FlagTag, IntervalStats, KeystrokeSample, LoginTelemetry, Scores,
    TrajectoryCapture, TrajectoryPoint, TrajectorySummary, TypingPattern,
};
