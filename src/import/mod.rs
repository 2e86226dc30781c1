pub mod extractor;
pub mod pipeline;
pub mod progress;

pub use extractor::{BuiltinExtractor, TextExtractor};
pub use pipeline::{combine_profile, AnalysisPhase, CvImport, ImportState};
pub use progress::{progress_label, AnalysisLog, AnalysisStep, GUIDANCE_STEPS};
