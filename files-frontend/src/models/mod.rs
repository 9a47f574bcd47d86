pub mod file;
pub mod user;

pub use file::FileRecord;
pub use user::SignedInUser;
