pub mod hackathon;
pub mod join_request;
pub mod skill_match;
pub mod team;
pub mod team_member;
pub mod user;

pub use hackathon::Hackathon;
pub use join_request::{JoinRequest, JoinRequestStatus};
pub use team::{Team, TeamStatus};
pub use team_member::TeamRole;
pub use user::User;
