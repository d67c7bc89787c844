pub mod extract;
pub mod read;
pub mod search;
