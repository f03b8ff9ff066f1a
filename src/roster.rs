use std::collections::HashSet;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{CodeId, Document, RedeemCode};

/// In-memory mirror of the remote redeem code collection.
///
/// Codes are keyed by their id. Iteration yields codes in the order they were inserted, which
/// is the order of the last fetch followed by every code generated since.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    codes: IndexMap<CodeId, RedeemCode>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RedeemCode> {
        self.codes.values()
    }

    pub fn get(&self, id: &str) -> Option<&RedeemCode> {
        self.codes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.codes.contains_key(id)
    }

    pub fn ids(&self) -> Vec<CodeId> {
        self.codes.keys().cloned().collect_vec()
    }

    /// Appends `code`, or replaces the entry with the same id in place.
    pub fn insert(&mut self, code: RedeemCode) {
        self.codes.insert(code.id.clone(), code);
    }

    /// Returns `false` if no code with this id is known.
    pub fn set_used(&mut self, id: &str, is_used: bool) -> bool {
        match self.codes.get_mut(id) {
            Some(code) => {
                code.is_used = is_used;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<RedeemCode> {
        self.codes.shift_remove(id)
    }

    /// Removes every code whose id is contained in `ids`. Returns the number of removed codes.
    pub fn remove_all(&mut self, ids: &[CodeId]) -> usize {
        let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.codes.len();
        self.codes.retain(|id, _| !ids.contains(id.as_str()));
        before - self.codes.len()
    }
}

/// Equal when both hold the same codes in the same order.
impl PartialEq for Roster {
    fn eq(&self, other: &Self) -> bool {
        self.codes.len() == other.codes.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Roster {}

impl FromIterator<RedeemCode> for Roster {
    fn from_iter<I: IntoIterator<Item = RedeemCode>>(iter: I) -> Self {
        let mut roster = Roster::new();
        for code in iter {
            roster.insert(code);
        }
        roster
    }
}

impl From<Vec<Document>> for Roster {
    fn from(documents: Vec<Document>) -> Self {
        documents.into_iter().map(RedeemCode::from).collect()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a RedeemCode;
    type IntoIter = indexmap::map::Values<'a, CodeId, RedeemCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.codes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertr::prelude::*;

    fn code(id: &str) -> RedeemCode {
        RedeemCode {
            id: id.to_owned(),
            is_used: false,
            created_at: None,
        }
    }

    #[test]
    fn insert_keeps_ids_unique() {
        let mut roster: Roster = [code("a"), code("b")].into_iter().collect();
        roster.insert(RedeemCode {
            is_used: true,
            ..code("a")
        });

        assert_that(roster.len()).is_equal_to(2);
        assert_that(roster.ids()).is_equal_to(vec!["a".to_owned(), "b".to_owned()]);
        assert_that(roster.get("a").map(|it| it.is_used)).is_equal_to(Some(true));
    }

    #[test]
    fn set_used_reports_unknown_ids() {
        let mut roster: Roster = [code("a")].into_iter().collect();
        assert_that(roster.set_used("a", true)).is_true();
        assert_that(roster.set_used("unknown", true)).is_false();
    }

    #[test]
    fn remove_all_only_removes_listed_ids() {
        let mut roster: Roster = [code("a"), code("b"), code("c")].into_iter().collect();
        let removed = roster.remove_all(&["a".to_owned(), "c".to_owned(), "x".to_owned()]);

        assert_that(removed).is_equal_to(2);
        assert_that(roster.ids()).is_equal_to(vec!["b".to_owned()]);
    }

    #[test]
    fn remove_keeps_order_of_remaining_codes() {
        let mut roster: Roster = [code("a"), code("b"), code("c")].into_iter().collect();

        assert_that(roster.remove("b").map(|it| it.id)).is_equal_to(Some("b".to_owned()));
        assert_that(roster.remove("b").is_none()).is_true();
        assert_that(roster.ids()).is_equal_to(vec!["a".to_owned(), "c".to_owned()]);
    }

    #[test]
    fn equality_respects_order() {
        let ab: Roster = [code("a"), code("b")].into_iter().collect();
        let ba: Roster = [code("b"), code("a")].into_iter().collect();

        assert_that(ab.clone()).is_equal_to(ab.clone());
        assert_that(ab).is_not_equal_to(ba);
    }

    #[test]
    fn large_fetch_keeps_document_order() {
        let documents = (0..5000)
            .map(|n| Document {
                id: format!("code-{n:04}"),
                fields: crate::CodeFields {
                    is_used: n % 2 == 0,
                    created_at: None,
                },
            })
            .collect_vec();

        let roster = Roster::from(documents);

        assert_that(roster.len()).is_equal_to(5000);
        assert_that(roster.ids()[4999].clone()).is_equal_to("code-4999".to_owned());
        assert_that(roster.get("code-1234").map(|it| it.is_used)).is_equal_to(Some(true));
    }
}
