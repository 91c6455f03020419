//! Owner scoping
//!
//! Every entity belongs to exactly one user. Reads are restricted to the
//! caller's own rows and ids referenced in write payloads are resolved
//! against the caller's own rows only, so a foreign id is indistinguishable
//! from one that does not exist.

use anyhow::Result;
use uuid::Uuid;

use crate::models::{Attribute, AttributeKind, Recipe};
use crate::repositories::AttributeRepository;

/// Entity with an owning user
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Attribute {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for Recipe {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// Keep only the items owned by `owner`
pub fn scope_to_owner<'a, T, I>(owner: Uuid, items: I) -> impl Iterator<Item = &'a T>
where
    T: Owned + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .filter(move |item| item.owner_id() == owner)
}

/// Outcome of resolving requested relation ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Requested ids owned by the caller, unique, in request order
    pub ids: Vec<i64>,
    /// Requested ids that are unknown or owned by someone else
    pub rejected: Vec<i64>,
}

/// Resolve `requested` ids against the owner's attributes of `kind`
pub async fn resolve_owned(
    attributes: &dyn AttributeRepository,
    owner: Uuid,
    kind: AttributeKind,
    requested: &[i64],
) -> Result<Resolution> {
    let mut unique = Vec::with_capacity(requested.len());
    for id in requested {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }

    let owned: Vec<i64> = attributes
        .find_by_ids(owner, kind, &unique)
        .await?
        .into_iter()
        .map(|attribute| attribute.id)
        .collect();

    let (ids, rejected): (Vec<i64>, Vec<i64>) =
        unique.into_iter().partition(|id| owned.contains(id));
    Ok(Resolution { ids, rejected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryRepository;

    #[test]
    fn test_scope_to_owner_filters_foreign_items() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let items = vec![
            Attribute {
                id: 1,
                name: "Mine".to_string(),
                user_id: owner,
            },
            Attribute {
                id: 2,
                name: "Theirs".to_string(),
                user_id: other,
            },
        ];

        let scoped: Vec<i64> = scope_to_owner(owner, &items).map(|a| a.id).collect();
        assert_eq!(scoped, vec![1]);
    }

    #[tokio::test]
    async fn test_resolve_owned_rejects_foreign_and_unknown_ids() {
        let repo = InMemoryRepository::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let own = repo
            .create(owner, AttributeKind::Ingredient, "Flour")
            .await
            .unwrap();
        let foreign = repo
            .create(other, AttributeKind::Ingredient, "Sugar")
            .await
            .unwrap();

        let resolution = resolve_owned(
            &repo,
            owner,
            AttributeKind::Ingredient,
            &[foreign.id, own.id, own.id, 999],
        )
        .await
        .unwrap();

        assert_eq!(resolution.ids, vec![own.id]);
        assert_eq!(resolution.rejected, vec![foreign.id, 999]);
    }
}
