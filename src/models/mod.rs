pub mod analysis;
pub mod deal;
pub mod negotiation;

pub use analysis::{ AnalysisResult, Level, PriceAnalysis, ScreenshotUpload, Sentiment };
pub use deal::{ CategorySavings, CloseOutcome, CloseReport, CompletedDeal, SavingsMilestone, SavingsStats };
pub use negotiation::{
    Category,
    MessageKind,
    NegotiationMessage,
    NegotiationStatus,
    NegotiationTab,
    ProgressStage,
    SessionFilter,
    SessionUpdate,
};
