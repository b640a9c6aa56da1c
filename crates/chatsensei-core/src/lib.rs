pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod style;
pub mod view;

// Re-export main types for convenience
pub use api::{
    AnalysisRequest, AnalysisResponse, Backend, FeedbackRequest, FeedbackResponse, Preferences,
    SuggestClient, Suggestions,
};
pub use config::Config;
pub use controller::{CardRef, ChatAssistant, Command, Completion, Request};
pub use error::ClientError;
pub use style::{Style, Tone};
pub use view::{FeedbackMark, Region, SuggestionCard, View};
