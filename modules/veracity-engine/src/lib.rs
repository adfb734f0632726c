pub mod arbiter;
pub mod checker;
pub mod credibility;
pub mod entities;
pub mod extraction;
pub mod gatherer;
pub mod prompt;
pub mod report;
pub mod search;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod translate;
pub mod verifier;

pub use checker::FactChecker;
pub use report::ClassificationReport;
