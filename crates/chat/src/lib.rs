pub mod samples;
pub mod session;
pub mod transcript;

pub use samples::SAMPLE_QUESTIONS;
pub use session::{ConversationSession, Phase, Rejection, SubmitOutcome, GENERIC_FAILURE};
pub use transcript::TranscriptEntry;
