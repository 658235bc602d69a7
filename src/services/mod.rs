pub mod token;
pub use token::{IssuedToken, TokenClaims, TokenError, TokenService};

pub mod identity;
pub use identity::IdentityResolver;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod post_service;
pub mod post_service_impl;
pub use post_service::{PostError, PostService};
pub use post_service_impl::SeaOrmPostService;
