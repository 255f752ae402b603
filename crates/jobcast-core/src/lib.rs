pub mod error;
pub mod models;
pub mod testutil;
pub mod traits;

pub use error::AppError;
pub use models::{PublishBatch, Record};
pub use traits::{HttpResponse, Payload, Transport};
