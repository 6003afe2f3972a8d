pub mod errors;

pub use errors::AnkiMdError;
