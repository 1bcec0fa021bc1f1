mod note;
mod user;

pub use note::{
    CreateNoteRequest, MonthlyCounts, Note, NoteAnalytics, NoteRecord, PrivacyRequest,
    ShareRequest, UpdateNoteRequest, month_label,
};
pub use user::{LoginRequest, PublicUser, User, UserListing, UserSummary};
