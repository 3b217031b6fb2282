//! Transform document state: text, saved snapshot and file path

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

const UNSAVED_NAME: &str = "Unsaved document";

/// An editable transform document.
///
/// `is_modified()` is true exactly when the text differs from the snapshot
/// taken at load or last save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformDocument {
    text: String,
    original_text: String,
    path: Option<PathBuf>,
    is_new: bool,
}

impl TransformDocument {
    /// Empty, never-saved document
    pub fn new() -> Self {
        Self {
            is_new: true,
            ..Self::default()
        }
    }

    /// Load a document from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Ok(Self {
            original_text: text.clone(),
            text,
            path: Some(path.to_path_buf()),
            is_new: false,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }

    pub fn is_modified(&self) -> bool {
        self.text != self.original_text
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Point the document at a new file. The next `save()` writes there.
    pub fn set_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.path = Some(path.into());
        self.is_new = false;
    }

    /// Write the text to the document's path. Returns `Ok(false)` when the
    /// document has no path yet.
    pub fn save(&mut self) -> Result<bool> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        fs::write(path, &self.text)?;
        self.original_text = self.text.clone();
        self.is_new = false;
        Ok(true)
    }

    /// Title for the editor tab: file name or placeholder, `" *"` when dirty
    pub fn display_name(&self) -> String {
        let base = self
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNSAVED_NAME.to_string());
        if self.is_modified() {
            format!("{} *", base)
        } else {
            base
        }
    }
}
