//! Request and response bodies for the REST surface

mod requests;
mod responses;

pub use requests::{HistoryQuery, LoginRequest, RegisterRequest, SendMessageRequest};
pub use responses::{AuthResponse, ContactResponse, CurrentUserResponse, HealthResponse};
