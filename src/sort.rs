use std::cmp::Ordering;

use crate::{RedeemCode, Roster};

/// Column the derived view is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Code,
    Date,
    Used,
    /// Roster order.
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Presentation-only ordering of the roster. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// State after the user picked `column`: picking the current column again flips the
    /// direction, picking another one starts out descending.
    pub fn select(self, column: SortColumn) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                column,
                direction: SortDirection::Descending,
            }
        }
    }

    /// Compares two codes in this state's column and direction.
    pub fn compare(&self, a: &RedeemCode, b: &RedeemCode) -> Ordering {
        let natural = match self.column {
            SortColumn::Code => a.id.cmp(&b.id),
            SortColumn::Date => compare_created_at(a, b),
            SortColumn::Used => a.is_used.cmp(&b.is_used),
            SortColumn::None => Ordering::Equal,
        };
        self.direction.apply(natural)
    }
}

/// Codes without a creation time compare equal to every other code.
pub fn compare_created_at(a: &RedeemCode, b: &RedeemCode) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}

/// One row of the derived view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRow {
    /// 1-based position in the view.
    pub number: usize,
    pub code: RedeemCode,
}

/// Orders the roster for display. Recomputed in full on every call.
pub fn sorted_view(roster: &Roster, sort: SortState) -> Vec<CodeRow> {
    let mut codes = roster.iter().cloned().collect::<Vec<_>>();
    if sort.column != SortColumn::None {
        stable_sort_by(&mut codes, |a, b| sort.compare(a, b));
    }
    codes
        .into_iter()
        .enumerate()
        .map(|(index, code)| CodeRow {
            number: index + 1,
            code,
        })
        .collect()
}

/// Stable insertion sort.
///
/// The date comparison is not a total order (a code without creation time is equal to both
/// an older and a newer code), which `slice::sort_by` is allowed to panic on. This never does
/// and keeps equal elements in their original order.
fn stable_sort_by<T>(items: &mut [T], mut compare: impl FnMut(&T, &T) -> Ordering) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}
