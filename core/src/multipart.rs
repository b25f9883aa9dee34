//! Snapshot upload payloads.
//!
//! A `MultipartForm` records text fields and binary file parts in insertion
//! order. It stays plain data until a `Session` sends it, at which point it
//! becomes a `reqwest` multipart form and reqwest writes the wire framing.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::error::ClientError;

const OCTET_STREAM: &str = "application/octet-stream";

/// Value of one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        data: Vec<u8>,
    },
}

/// One named field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    /// The text value, if this is a text field.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            FormValue::Text(text) => Some(text),
            FormValue::File { .. } => None,
        }
    }
}

/// Ordered `multipart/form-data` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    fields: Vec<FormField>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.fields.push(FormField {
            name: name.to_string(),
            value: FormValue::Text(value.to_string()),
        });
        self
    }

    pub fn part(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.fields.push(FormField {
            name: name.to_string(),
            value: FormValue::File {
                file_name: file_name.to_string(),
                content_type: content_type.to_string(),
                data: data.to_vec(),
            },
        });
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Text values of every field named `name`, in order.
    pub fn texts<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name == name)
            .filter_map(FormField::text)
    }

    /// Bytes of field values, excluding multipart framing.
    pub fn payload_len(&self) -> usize {
        self.fields
            .iter()
            .map(|f| match &f.value {
                FormValue::Text(text) => text.len(),
                FormValue::File { data, .. } => data.len(),
            })
            .sum()
    }

    /// Convert into a reqwest form. Fails on an unparsable part content type.
    pub(crate) fn to_reqwest(&self) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for field in &self.fields {
            form = match &field.value {
                FormValue::Text(text) => form.text(field.name.clone(), text.clone()),
                FormValue::File {
                    file_name,
                    content_type,
                    data,
                } => {
                    let part = Part::bytes(data.clone())
                        .file_name(file_name.clone())
                        .mime_str(content_type)
                        .map_err(|e| {
                            ClientError::Configuration(format!(
                                "invalid content type `{content_type}` for `{file_name}`: {e}"
                            ))
                        })?;
                    form.part(field.name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

/// One binary payload of a snapshot upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl SnapshotPart {
    pub fn from_bytes(
        field: impl Into<String>,
        file_name: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: OCTET_STREAM.to_string(),
            data: data.into(),
        }
    }

    /// Read a file from disk as a part named `field`.
    pub fn from_path(field: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        Ok(Self::from_bytes(field, file_name, data))
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// The code artifacts of one snapshot upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub parts: Vec<SnapshotPart>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_part(mut self, part: SnapshotPart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn total_bytes(&self) -> usize {
        self.parts.iter().map(|p| p.data.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn fields_keep_insertion_order() {
        let form = MultipartForm::new()
            .text("stacks", "jvm")
            .text("platform", "java_8")
            .text("stacks", "python")
            .part("input", "app.jar", "application/java-archive", b"PK\x03\x04");

        let names: Vec<&str> = form.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["stacks", "platform", "stacks", "input"]);
        assert_eq!(form.texts("stacks").collect::<Vec<_>>(), ["jvm", "python"]);
        assert_eq!(
            form.fields()[3].value,
            FormValue::File {
                file_name: "app.jar".into(),
                content_type: "application/java-archive".into(),
                data: b"PK\x03\x04".to_vec(),
            }
        );
        assert_eq!(form.payload_len(), 3 + 6 + 6 + 4);
    }

    #[test]
    fn converts_to_reqwest_form() {
        let form = MultipartForm::new()
            .text("platform", "java_8")
            .part("input", "app.jar", OCTET_STREAM, b"PK");
        let encoded = form.to_reqwest().unwrap();
        assert!(!encoded.boundary().is_empty());
    }

    #[test]
    fn unparsable_content_type_is_configuration_error() {
        let form = MultipartForm::new().part("input", "app.jar", "not a mime", b"PK");
        let err = form.to_reqwest().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn part_from_path_reads_file() {
        let dir = std::env::temp_dir().join(format!("analysis-client-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("classes.jar");
        std::fs::write(&path, b"bytes").unwrap();

        let part = SnapshotPart::from_path("input", &path).unwrap();
        assert_eq!(part.file_name, "classes.jar");
        assert_eq!(part.data, b"bytes");
        assert_eq!(part.content_type, OCTET_STREAM);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn part_from_missing_path_is_io_error() {
        let err = SnapshotPart::from_path("input", "/definitely/not/here.jar").unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[test]
    fn snapshot_counts_bytes() {
        let snapshot = Snapshot::new()
            .with_part(SnapshotPart::from_bytes("input", "a.jar", vec![0; 3]))
            .with_part(SnapshotPart::from_bytes("input", "b.jar", vec![0; 4]));
        assert_eq!(snapshot.total_bytes(), 7);
    }
}
