pub mod client;
pub mod types;

pub use client::{parse_error_detail, Backend, SuggestClient};
pub use types::{
    format_weight, AnalysisRequest, AnalysisResponse, FeedbackRequest, FeedbackResponse,
    Preferences, Suggestions,
};
