//! Domain models for archive records

mod content;
mod email;
mod link;
mod sync_state;

pub use content::{ContentItem, ProblemDocument};
pub use email::{BodyFormat, EmailRecord, EmailRecordBuilder, MessageId};
pub use link::{LinkRecord, MANUAL_SOURCE, ProblemId};
pub use sync_state::MailSyncState;
