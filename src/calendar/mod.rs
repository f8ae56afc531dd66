pub mod args;
pub mod event;
pub mod handlers;
pub mod http;
