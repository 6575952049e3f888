pub mod assignment;
pub mod course;
pub mod discussion;
pub mod notification;
pub mod user;

pub use assignment::Assignment;
pub use course::{Course, CourseResource};
pub use discussion::{DiscussionPost, DiscussionTopic, TopicDetail};
pub use notification::Notification;
pub use user::{
    CasBindRequest, ChangePasswordRequest, LoginRequest, NewUserRequest, TokenResponse,
    UpdateUserRequest, User, UserProfile,
};
