pub mod anthropic;
pub mod factory;
pub mod http_client;
pub mod ollama;
pub mod reliable;
pub mod scrub;
pub mod template;
pub mod traits;

pub use factory::{Backend, BackendKind, describe_backend, select_backend};
pub use scrub::{api_error, sanitize_api_error, scrub_secrets};
pub use template::render_template;
pub use traits::Provider;
