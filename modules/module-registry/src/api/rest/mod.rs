pub mod dto;
pub mod error;
pub mod handlers;
pub mod links;
pub mod routes;

pub use links::Links;
pub use routes::register_routes;
