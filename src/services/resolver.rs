//! Identifier resolver
//!
//! Maps any [`EntityRef`] to the numeric id that filter queries need, or to
//! the document id that path-based addressing needs. Numeric ids are never
//! put into a path; document ids are looked up through a filter query.

use tracing::{debug, warn};

use crate::models::{EntityKind, EntityRef};
use crate::strapi::{Identity, Query, StrapiClient};
use crate::utils::errors::{HubError, Result};

#[derive(Clone, Debug)]
pub struct IdentifierResolver {
    client: StrapiClient,
}

impl IdentifierResolver {
    pub fn new(client: StrapiClient) -> Self {
        Self { client }
    }

    /// Canonical numeric id for an entity reference
    pub async fn resolve_id(&self, kind: EntityKind, reference: &EntityRef) -> Result<u64> {
        match reference {
            EntityRef::Numeric(0) => Err(HubError::InvalidInput(format!("{} id must be positive", kind))),
            EntityRef::Numeric(id) => Ok(*id),
            EntityRef::Document(document_id) => {
                let identity = self
                    .lookup(kind, Query::new().eq("documentId", document_id))
                    .await?
                    .ok_or_else(|| unresolved(kind, reference))?;
                debug!(kind = %kind, document_id = %document_id, id = identity.id, "Resolved document id");
                Ok(identity.id)
            }
        }
    }

    /// Document id for path-based addressing
    pub async fn resolve_document_id(&self, kind: EntityKind, reference: &EntityRef) -> Result<String> {
        match reference {
            EntityRef::Document(document_id) => Ok(document_id.clone()),
            EntityRef::Numeric(id) => {
                let identity = self
                    .lookup(kind, Query::new().eq("id", id))
                    .await?
                    .ok_or_else(|| unresolved(kind, reference))?;
                identity
                    .document_id
                    .filter(|d| !d.is_empty())
                    .ok_or_else(|| unresolved(kind, reference))
            }
        }
    }

    /// Resolve a batch once; returns the resolved ids (deduplicated, in input
    /// order) and the references that could not be resolved.
    pub async fn resolve_many(&self, kind: EntityKind, references: &[EntityRef]) -> Result<(Vec<u64>, Vec<EntityRef>)> {
        let mut resolved: Vec<u64> = Vec::with_capacity(references.len());
        let mut unresolved_refs = Vec::new();

        for reference in references {
            match self.resolve_id(kind, reference).await {
                Ok(id) => {
                    if !resolved.contains(&id) {
                        resolved.push(id);
                    }
                }
                Err(HubError::UnresolvedIdentifier { .. }) | Err(HubError::InvalidInput(_)) => {
                    warn!(kind = %kind, identifier = %reference, "Skipping identifier that could not be resolved");
                    unresolved_refs.push(reference.clone());
                }
                Err(e) => return Err(e),
            }
        }

        Ok((resolved, unresolved_refs))
    }

    async fn lookup(&self, kind: EntityKind, query: Query) -> Result<Option<Identity>> {
        let matches = match kind {
            EntityKind::User => self.client.find_users::<Identity>(&query).await?,
            _ => self.client.find::<Identity>(kind.collection(), &query).await?,
        };
        Ok(matches.into_iter().next())
    }
}

fn unresolved(kind: EntityKind, reference: &EntityRef) -> HubError {
    HubError::UnresolvedIdentifier {
        kind,
        identifier: reference.to_string(),
    }
}
