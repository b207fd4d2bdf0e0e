pub mod authenticator;
pub mod claims;
pub mod context;
pub mod error;
pub mod factory;
pub mod interceptor;
pub mod password;
pub mod policy;
pub mod principal;
pub mod token_service;

pub use authenticator::{CredentialAuthenticator, Credentials, Registration};
pub use context::SecurityContext;
pub use error::AuthError;
pub use factory::build_token_service;
pub use interceptor::AuthenticationInterceptor;
pub use policy::AuthorizationPolicy;
pub use token_service::TokenService;
