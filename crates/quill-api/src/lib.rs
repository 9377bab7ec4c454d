pub mod auth;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod posts;
pub mod reactions;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, AppStateInner};
