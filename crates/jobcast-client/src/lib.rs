pub mod config;
pub mod fetcher;
pub mod publish;
pub mod query;
pub mod session;

pub use config::PublishConfig;
pub use fetcher::DocumentFetcher;
pub use publish::PublishPipeline;
pub use query::DomQuery;
pub use session::HttpSession;
