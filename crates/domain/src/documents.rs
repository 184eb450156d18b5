// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Evidence documents attached on the upload-data step.
//!
//! Documents of kind `Other` are committed in two phases: the free-text name
//! must be confirmed before a file may be attached.

use crate::error::DomainError;
use crate::upload::FileRef;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of an evidence document, unique within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(u32);

impl DocumentId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The declared type of an evidence document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    DueDiligenceStatement,
    CertificateOfOrigin,
    LandTitle,
    Invoice,
    BillOfLading,
    SupplierDeclaration,
    /// Free-text type; requires a confirmed custom name.
    Other,
}

impl DocumentKind {
    /// Returns the wire representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DueDiligenceStatement => "due_diligence_statement",
            Self::CertificateOfOrigin => "certificate_of_origin",
            Self::LandTitle => "land_title",
            Self::Invoice => "invoice",
            Self::BillOfLading => "bill_of_lading",
            Self::SupplierDeclaration => "supplier_declaration",
            Self::Other => "other",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "due_diligence_statement" => Ok(Self::DueDiligenceStatement),
            "certificate_of_origin" => Ok(Self::CertificateOfOrigin),
            "land_title" => Ok(Self::LandTitle),
            "invoice" => Ok(Self::Invoice),
            "bill_of_lading" => Ok(Self::BillOfLading),
            "supplier_declaration" => Ok(Self::SupplierDeclaration),
            "other" => Ok(Self::Other),
            _ => Err(DomainError::InvalidDocumentKind(s.to_string())),
        }
    }
}

/// One evidence document slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceDocument {
    pub id: DocumentId,
    pub declared_type: DocumentKind,
    /// Confirmed custom name. Only ever set for `Other`.
    pub custom_name: Option<String>,
    /// The attached file, once uploaded.
    pub file: Option<FileRef>,
}

impl EvidenceDocument {
    /// Returns true once a file has been attached.
    #[must_use]
    pub const fn is_uploaded(&self) -> bool {
        self.file.is_some()
    }

    /// Returns true if a file may be attached now.
    #[must_use]
    pub const fn accepts_upload(&self) -> bool {
        !matches!(self.declared_type, DocumentKind::Other) || self.custom_name.is_some()
    }
}

/// The ordered evidence documents of a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceDocuments {
    documents: Vec<EvidenceDocument>,
    next_id: u32,
}

impl Default for EvidenceDocuments {
    fn default() -> Self {
        Self::new()
    }
}

impl EvidenceDocuments {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            documents: Vec::new(),
            next_id: 1,
        }
    }

    /// The documents in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[EvidenceDocument] {
        &self.documents
    }

    /// Returns true if at least one document has a file attached.
    #[must_use]
    pub fn any_uploaded(&self) -> bool {
        self.documents.iter().any(EvidenceDocument::is_uploaded)
    }

    fn get_mut(&mut self, id: DocumentId) -> Result<&mut EvidenceDocument, DomainError> {
        self.documents
            .iter_mut()
            .find(|document| document.id == id)
            .ok_or(DomainError::DocumentNotFound(id))
    }

    /// Adds an empty slot of the given kind and returns its id.
    pub fn add(&mut self, declared_type: DocumentKind) -> DocumentId {
        let id: DocumentId = DocumentId(self.next_id);
        self.next_id += 1;
        self.documents.push(EvidenceDocument {
            id,
            declared_type,
            custom_name: None,
            file: None,
        });
        id
    }

    /// Confirms the free-text name of an `Other` document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no document has the given id
    /// - the document is not of kind `Other`
    /// - the trimmed name is empty
    pub fn confirm_name(&mut self, id: DocumentId, name: &str) -> Result<(), DomainError> {
        let document: &mut EvidenceDocument = self.get_mut(id)?;
        if document.declared_type != DocumentKind::Other {
            return Err(DomainError::CustomNameNotApplicable(id));
        }
        let name: &str = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidCustomName);
        }
        document.custom_name = Some(name.to_string());
        Ok(())
    }

    /// Attaches an already pre-checked file to a document slot, replacing any previous file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no document has the given id
    /// - the document is of kind `Other` and its name is not confirmed
    pub fn attach(&mut self, id: DocumentId, file: FileRef) -> Result<(), DomainError> {
        let document: &mut EvidenceDocument = self.get_mut(id)?;
        if !document.accepts_upload() {
            return Err(DomainError::CustomNameRequired(id));
        }
        document.file = Some(file);
        Ok(())
    }

    /// Removes a document slot.
    ///
    /// # Errors
    ///
    /// Returns an error if no document has the given id.
    pub fn remove(&mut self, id: DocumentId) -> Result<(), DomainError> {
        let position: usize = self
            .documents
            .iter()
            .position(|document| document.id == id)
            .ok_or(DomainError::DocumentNotFound(id))?;
        self.documents.remove(position);
        Ok(())
    }
}
