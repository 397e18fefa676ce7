//! Application services for message submission and queries.

mod facade;

pub use facade::MessageService;
