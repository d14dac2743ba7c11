//! FanTrade Order Book
//!
//! Owns every order and its status. Submission and cancellation are the only
//! writers of non-FILLED transitions; the matching engine claims fills through
//! [`OrderBook::fill_with`].

pub mod book;
pub mod error;
pub mod request;

pub use book::OrderBook;
pub use error::OrderError;
pub use request::{OrderRequest, OrderRequestBuilder};
