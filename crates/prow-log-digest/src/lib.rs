//! Prow console log digestion for chat notifications.
//!
//! Derives the job outcome, failure summary, and run duration from a raw CI
//! console log and composes the text that gets posted to the team channel.
//!
//! ```rust
//! use prow_log_digest::{extract_result, ExtractionPolicy, JobOutcome};
//!
//! let log = "Summarizing 1 Failure:\n  [FAIL] upgrade\nTest Suite Failed\n\
//!            Reporting job state 'failed'\nRan for 1h2m";
//! let result = extract_result(log, &ExtractionPolicy::default());
//! assert_eq!(result.outcome, JobOutcome::Failed);
//! assert!(result.reportable);
//! assert!(result.message.ends_with("Ran for 1h2m\n"));
//! ```

pub mod control_sequences;
pub mod result_extractor;

pub use control_sequences::{contains_control_sequences, strip_control_sequences};
pub use result_extractor::{
    extract_result, ExtractionPolicy, ExtractionResult, JobOutcome, SummaryStatus,
    MISSING_SUMMARY_PLACEHOLDER,
};
