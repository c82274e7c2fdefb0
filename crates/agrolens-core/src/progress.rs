/// Stage of an engine request, reported to a [`ProgressReporter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStage {
    FetchingImagery,
    ComputingIndices,
    Aggregating,
    Rendering,
    Zoning,
    AssemblingSeries,
    TrainingModel,
    Forecasting,
}

impl std::fmt::Display for EngineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchingImagery => write!(f, "Fetching imagery"),
            Self::ComputingIndices => write!(f, "Computing indices"),
            Self::Aggregating => write!(f, "Aggregating statistics"),
            Self::Rendering => write!(f, "Rendering overlay"),
            Self::Zoning => write!(f, "Delineating zones"),
            Self::AssemblingSeries => write!(f, "Assembling series"),
            Self::TrainingModel => write!(f, "Training model"),
            Self::Forecasting => write!(f, "Forecasting"),
        }
    }
}

/// Thread-safe progress reporting for engine requests.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items in
    /// this stage (e.g. candidate dates), if known.
    fn begin_stage(&self, _stage: EngineStage, _total_items: Option<usize>) {}

    /// Work items completed so far within the current stage.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores every event.
pub struct NoOpReporter;

impl ProgressReporter for NoOpReporter {}
