use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata of one uploaded file, stored in the document database next to
/// the object in file storage.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub storage_path: String,
    /// Token that lets a plain link download the object.
    pub download_token: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    /// Human readable size for listings.
    pub fn display_size(&self) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

        let mut size = self.size as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }

        if unit == 0 {
            format!("{} {}", self.size, UNITS[0])
        } else {
            format!("{:.1} {}", size, UNITS[unit])
        }
    }
}
