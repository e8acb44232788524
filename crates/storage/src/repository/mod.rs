pub mod hackathon;
pub mod join_request;
pub mod team;
pub mod user;
