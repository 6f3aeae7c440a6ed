//! HTTP adapter for the developer endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ErrorResponse, ExtractQuery, ExtractResponse, HealthResponse, MessageRequest, ResetRequest,
    ResetResponse, SessionQuery, SessionResponse, TurnResponse,
};
pub use handlers::DevHandlers;
pub use routes::dev_routes;
