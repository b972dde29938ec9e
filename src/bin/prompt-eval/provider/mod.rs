mod build;
mod resolve;

pub use build::build_provider;
pub use resolve::resolve_endpoint;
