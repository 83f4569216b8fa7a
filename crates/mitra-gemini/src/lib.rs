//! Gemini-backed tutor driver for Mitra.
//!
//! Implements [`mitra_tutor::TutorBackend`] on top of the Gemini
//! `generateContent` REST API: one-shot image problem extraction with a
//! flash model and a replayed-history chat conversation with a pro
//! model. Per the backend contract, all network and API failures stay
//! inside this crate and surface to the student only as fixed Hindi
//! fallback messages.

pub mod client;
pub mod driver;
pub mod error;
pub mod prompt;
pub mod types;

pub use client::GeminiClient;
pub use driver::GeminiTutor;
pub use error::GeminiError;
