pub mod book;
pub mod service;
pub mod store;
