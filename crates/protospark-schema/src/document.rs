//! # Schema Documents
//!
//! The rendered proto3 text produced by the compiler, kept together with the
//! structured message blocks it was rendered from.
//!
//! Layout:
//!
//! ```text
//! syntax="proto3";
//!
//! import "google/protobuf/timestamp.proto";
//!
//! message TestMessage {
//!   string type = 1;
//!   string test_param_string = 2;
//! }
//! ```
//!
//! The text is fully determined by the blocks and imports, so two compiles
//! of the same definition set produce byte-identical documents and the same
//! [`fingerprint`](SchemaDocument::fingerprint).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use protospark_core::MessageName;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Syntax header written at the top of every document.
pub const SYNTAX_HEADER: &str = "syntax=\"proto3\";";

/// One field line in a message block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    /// snake_case field name.
    pub name: String,
    /// Type as written in the document.
    pub type_name: String,
    /// Field number.
    pub number: u32,
    /// Whether the field is repeated.
    pub repeated: bool,
}

/// One `message` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageBlock {
    /// Message name.
    pub name: MessageName,
    /// Fields in number order.
    pub fields: Vec<SchemaField>,
}

/// A rendered schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDocument {
    text: String,
    imports: Vec<String>,
    messages: Vec<MessageBlock>,
}

impl SchemaDocument {
    /// Render a document from its imports and message blocks.
    pub fn render(imports: Vec<String>, messages: Vec<MessageBlock>) -> Self {
        let mut text = String::new();
        text.push_str(SYNTAX_HEADER);
        text.push_str("\n\n");
        for import in &imports {
            // Writing to a String cannot fail.
            let _ = writeln!(text, "import \"{import}\";");
        }
        text.push('\n');
        for message in &messages {
            let _ = writeln!(text, "message {} {{", message.name);
            for field in &message.fields {
                let prefix = if field.repeated { "repeated " } else { "" };
                let _ = writeln!(
                    text,
                    "  {prefix}{} {} = {};",
                    field.type_name, field.name, field.number
                );
            }
            text.push_str("}\n\n");
        }
        Self {
            text,
            imports,
            messages,
        }
    }

    /// The document text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Import paths in first-use order, without duplicates.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Message blocks in definition order.
    pub fn messages(&self) -> &[MessageBlock] {
        &self.messages
    }

    /// Look up a message block by name.
    pub fn message(&self, name: &str) -> Option<&MessageBlock> {
        self.messages.iter().find(|m| m.name.as_str() == name)
    }

    /// SHA-256 of the document text, lowercase hex.
    ///
    /// Peers can compare fingerprints to confirm they compiled the same
    /// definition set before exchanging envelopes.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.text.as_bytes()))
    }

    /// Write the document to `dir/file_name`, creating missing directories.
    ///
    /// Returns the full path written.
    pub fn write_to(&self, dir: impl AsRef<Path>, file_name: &str) -> std::io::Result<PathBuf> {
        let full_path = dir.as_ref().join(file_name);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, &self.text)?;
        tracing::debug!(path = %full_path.display(), bytes = self.text.len(), "wrote schema document");
        Ok(full_path)
    }
}

impl std::fmt::Display for SchemaDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for SchemaDocument {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
