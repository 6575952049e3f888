//! Sync services: run a scraper, then reconcile its records into the store
//! by natural key inside a single transaction.

pub mod assignment_sync;
pub mod course_sync;
pub mod discussion_sync;
pub mod notification_sync;

pub use assignment_sync::{AssignmentSyncService, AssignmentSyncStats};
pub use course_sync::{CourseSyncService, CourseSyncStats};
pub use discussion_sync::{DiscussionSyncService, DiscussionSyncStats};
pub use notification_sync::{NotificationSyncService, NotificationSyncStats};
