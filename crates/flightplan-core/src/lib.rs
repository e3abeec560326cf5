pub mod api;
pub mod config;
pub mod conversation;
pub mod error;
pub mod render;
pub mod state;
pub mod upload;

// Re-export main types for convenience
pub use api::FlightPlanClient;
pub use config::Config;
pub use conversation::{ConversationSession, PendingChat, BACKEND_ERROR_MARKER, SUGGESTIONS};
pub use error::ApiError;
pub use state::{Message, Role};
pub use upload::{PendingUpload, UploadResult, UploadSession, UploadState};
