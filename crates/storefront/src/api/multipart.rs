//! Multipart form payloads as plain data.

use babynest_core::FileUpload;

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text { name: String, value: String },
    File { name: String, file: FileUpload },
}

impl Part {
    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// An ordered multipart form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<Part>,
}

impl MultipartForm {
    /// Create an empty form.
    #[must_use]
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Append a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append a text field when `value` is present.
    #[must_use]
    pub fn text_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    /// Append a file field when `file` is present.
    #[must_use]
    pub fn file_opt(mut self, name: impl Into<String>, file: Option<FileUpload>) -> Self {
        if let Some(file) = file {
            self.parts.push(Part::File {
                name: name.into(),
                file,
            });
        }
        self
    }

    /// Replace every field called `name` with a single text field.
    pub fn set_text(&mut self, name: &str, value: impl Into<String>) {
        self.parts.retain(|part| part.name() != name);
        self.parts.push(Part::Text {
            name: name.to_owned(),
            value: value.into(),
        });
    }

    /// Values of every text field called `name`.
    #[must_use]
    pub fn text_values(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { name: n, value } if n == name => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether any field carries a file.
    #[must_use]
    pub fn has_files(&self) -> bool {
        self.parts.iter().any(|part| matches!(part, Part::File { .. }))
    }

    /// Fields in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Consume the form into its fields.
    #[must_use]
    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }
}
