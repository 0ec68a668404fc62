use serde::{Deserialize, Serialize};

use crate::domain::{Decision, FileEntry};

pub const FOLDER_ROUTE: &str = "api/folder";
pub const FOLDER_PICKER_ROUTE: &str = "api/folder/picker";
pub const MOLECULE_ROUTE: &str = "api/molecule";
pub const DECISION_ROUTE: &str = "api/decision";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRequest {
    pub folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedFile {
    pub name: String,
    pub path: String,
}

impl From<ListedFile> for FileEntry {
    fn from(value: ListedFile) -> Self {
        FileEntry::pending(value.name, value.path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderResponse {
    /// Folder path as resolved by the backend.
    pub folder: String,
    pub files: Vec<ListedFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderPickerResponse {
    pub folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoleculeQuery {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoleculeResponse {
    pub content: String,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub path: String,
    pub decision: Decision,
}
