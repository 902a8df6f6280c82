pub mod account;
pub mod comment;
pub mod deal;
pub mod error;
pub mod lifecycle;
pub mod meeting;
pub mod pack;
pub mod policy;
pub mod store;
pub mod supplier;
pub mod types;

pub use error::{NegoError, Result};
pub use store::Store;
