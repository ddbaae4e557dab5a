pub mod token_dto;
pub mod token_handlers;
pub mod token_models;
pub mod token_repository;

pub use token_dto::{RegisterTokenRequest, RegisterTokenResponse};
pub use token_handlers::register_token;
pub use token_models::TokenRegistration;
pub use token_repository::{PgTokenRepository, TokenRepository};
