mod auth;
mod state;

pub use auth::TokenManager;
pub use state::FileStateStore;
pub use state::ProcessedReleaseLog;
pub use state::StateError;
pub use state::StateStore;
pub use state::PROCESSED_RELEASES_STATE;
