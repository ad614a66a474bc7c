//! Label Space: bijection between `(role, domain)` pairs and dense class ids.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::matching::MatchError;

/// Separator used to build the combined label key.
pub const LABEL_SEPARATOR: &str = " || ";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleDomain {
    pub role: String,
    pub domain: String,
}

impl RoleDomain {
    /// Trims both parts. Pairing stays case-sensitive.
    pub fn new(role: &str, domain: &str) -> Self {
        Self {
            role: role.trim().to_string(),
            domain: domain.trim().to_string(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}{}{}", self.role, LABEL_SEPARATOR, self.domain)
    }
}

/// Immutable after `fit`. Ids are assigned in lexicographic order of the
/// combined `"role || domain"` key. Pairs whose keys collide because a part
/// contains the separator stay distinct, ordered by `(role, domain)`.
#[derive(Debug, Clone, Default)]
pub struct LabelSpace {
    labels: Vec<RoleDomain>,
    ids: HashMap<RoleDomain, usize>,
}

impl LabelSpace {
    pub fn fit<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let by_key: BTreeSet<(String, RoleDomain)> = pairs
            .into_iter()
            .map(|(role, domain)| {
                let label = RoleDomain::new(role, domain);
                (label.key(), label)
            })
            .collect();

        let labels: Vec<RoleDomain> = by_key.into_iter().map(|(_, label)| label).collect();
        let ids = labels
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id))
            .collect();

        Self { labels, ids }
    }

    pub fn encode(&self, role: &str, domain: &str) -> Result<usize, MatchError> {
        let label = RoleDomain::new(role, domain);
        self.ids
            .get(&label)
            .copied()
            .ok_or(MatchError::UnknownLabel {
                role: label.role,
                domain: label.domain,
            })
    }

    pub fn decode(&self, id: usize) -> Result<&RoleDomain, MatchError> {
        self.labels.get(id).ok_or(MatchError::LabelOutOfRange {
            id,
            len: self.labels.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(id, label)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RoleDomain)> {
        self.labels.iter().enumerate()
    }
}
