pub mod dto;
mod extractors;
mod middleware;
pub mod handlers;
pub mod openapi;
mod routes;
mod state;

pub use extractors::{UploadForm, UploadedImage};
pub use routes::create_router;
pub use state::AppState;
