use reqwest::Method;
use serde::Serialize;
use std::collections::HashMap;

/// Serialization capability for document payloads, resolved at the request
/// builder boundary. Blanket-implemented for every `serde::Serialize` type,
/// so any payload variant qualifies without dynamic type inspection.
pub trait SerializableDocument {
    fn serialize(&self) -> Result<Vec<u8>, serde_json::Error>;
}

impl<T: Serialize> SerializableDocument for T {
    fn serialize(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Logical CRUD intent against the document store, prior to physical
/// request construction. Created per call site and consumed once.
pub enum DocumentOperation<'a> {
    Read {
        document_id: &'a str,
    },
    Create {
        document: &'a dyn SerializableDocument,
    },
    Replace {
        document_id: &'a str,
        document: &'a dyn SerializableDocument,
    },
    Delete {
        document_id: &'a str,
    },
    /// Enumerate the collection; no document id.
    List,
}

impl DocumentOperation<'_> {
    pub fn method(&self) -> Method {
        match self {
            DocumentOperation::Read { .. } | DocumentOperation::List => Method::GET,
            DocumentOperation::Create { .. } => Method::POST,
            DocumentOperation::Replace { .. } => Method::PUT,
            DocumentOperation::Delete { .. } => Method::DELETE,
        }
    }

    pub fn document_id(&self) -> Option<&str> {
        match self {
            DocumentOperation::Read { document_id }
            | DocumentOperation::Replace { document_id, .. }
            | DocumentOperation::Delete { document_id } => Some(document_id),
            DocumentOperation::Create { .. } | DocumentOperation::List => None,
        }
    }

    pub fn document(&self) -> Option<&dyn SerializableDocument> {
        match self {
            DocumentOperation::Create { document }
            | DocumentOperation::Replace { document, .. } => Some(*document),
            _ => None,
        }
    }
}

/// One document-store request: the operation plus per-call extras.
pub struct DocumentRequest<'a> {
    pub operation: DocumentOperation<'a>,
    /// Merged over the builder's defaults; caller keys win on collision.
    pub additional_headers: Option<HashMap<String, String>>,
    /// Appended to the resolved URL path.
    pub additional_url_path: Option<String>,
}

impl<'a> DocumentRequest<'a> {
    pub fn new(operation: DocumentOperation<'a>) -> Self {
        Self {
            operation,
            additional_headers: None,
            additional_url_path: None,
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.additional_headers = Some(headers);
        self
    }

    pub fn with_url_path(mut self, path: impl Into<String>) -> Self {
        self.additional_url_path = Some(path.into());
        self
    }
}
