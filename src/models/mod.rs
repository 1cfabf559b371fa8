pub mod membership;
pub mod reference;
pub mod resource;
pub mod user;

pub use membership::ProjectMembership;
pub use reference::EntityRef;
pub use resource::{
    FeedbackRecord, MeetingRecord, PageRecord, ProjectRecord, Resource, ResourceKind, TaskIssueRecord,
    TaskRecord,
};
pub use user::{Actor, Role, UserRecord};
