pub mod error;
pub mod forecast;
pub mod page;
