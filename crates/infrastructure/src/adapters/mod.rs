//! Adapters implementing application ports

mod api_key_identity_adapter;
mod wkhtmltopdf_adapter;

pub use api_key_identity_adapter::{
    ApiKeyHashError, ApiKeyIdentityAdapter, hash_api_key, verify_api_key,
};
pub use wkhtmltopdf_adapter::WkhtmltopdfAdapter;
