//! Memo domain module

mod artifact;

pub use artifact::{MemoArtifact, TakeSummary, MEMO_FILE_NAME};
