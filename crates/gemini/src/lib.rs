//! Minimal Gemini API client.
//!
//! Covers what the relay needs and nothing more: multi-turn
//! `generateContent`, resumable file upload and file status lookup. The
//! [`GenerativeApi`] trait is the seam the relay core depends on, so tests
//! can swap in a fake without a network.

pub mod chat;
pub mod client;
pub mod error;
pub mod types;

pub use {
    chat::{ChatSession, SessionConfig},
    client::{GEMINI_API_BASE, GeminiClient, GenerativeApi},
    error::{Error, Result},
    types::{
        Candidate, Content, FileData, FileRecord, FileState, GenerateContentRequest,
        GenerateContentResponse, HarmBlockThreshold, HarmCategory, Part, SafetySetting,
    },
};
