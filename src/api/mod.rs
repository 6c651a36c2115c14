//! Typed wrappers for the interview-prep backend endpoints.
//!
//! All calls go through [`crate::gateway::Gateway`]:
//! - /auth/login/, /auth/register/ — session management
//! - /interview/setup/             — AI-generated interview questions, paged

pub mod interview;
pub mod session;

pub use interview::{Difficulty, InterviewForm, InterviewType, QuestionPager, QUESTIONS_PER_PAGE};
pub use session::{LoginRequest, RegisterRequest, Session};
