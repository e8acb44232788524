pub mod join_requests;
pub mod teams;
