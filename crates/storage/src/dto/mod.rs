pub mod common;
pub mod join_request;
pub mod team;
