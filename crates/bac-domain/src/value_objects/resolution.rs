//! Resolution results and association tables
//!
//! [`ResolutionResult`] carries a best-effort value together with a flag
//! telling whether any sub-lookup failed to resolve. The flag is computed as
//! an OR over the outcomes of every step that produced the value; once a
//! result is built it is never modified.
//!
//! [`AssociationTable`] is the two-key (row, column) structure the bridging
//! pipeline assembles from join records and resolved values.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value annotated with whether it is complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult<T> {
    value: T,
    partial: bool,
}

impl<T> ResolutionResult<T> {
    /// Build a result with an explicit partial flag
    pub fn new(value: T, partial: bool) -> Self {
        Self { value, partial }
    }

    /// A fully resolved value
    pub fn complete(value: T) -> Self {
        Self::new(value, false)
    }

    /// A best-effort value with at least one unresolved piece
    pub fn partial(value: T) -> Self {
        Self::new(value, true)
    }

    /// Build a result whose flag is the OR of every sub-step outcome
    pub fn from_outcomes<I>(value: T, partial_outcomes: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        Self::new(value, partial_outcomes.into_iter().any(|partial| partial))
    }

    /// The resolved value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Whether some piece could not be resolved
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Split into value and flag
    pub fn into_parts(self) -> (T, bool) {
        (self.value, self.partial)
    }

    /// Consume and return the value
    pub fn into_value(self) -> T {
        self.value
    }

    /// Transform the value, keeping the flag
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ResolutionResult<U> {
        ResolutionResult::new(f(self.value), self.partial)
    }

    /// Chain a further step; the combined flag is the OR of both
    pub fn and_then<U, F: FnOnce(T) -> ResolutionResult<U>>(self, f: F) -> ResolutionResult<U> {
        let next = f(self.value);
        ResolutionResult::new(next.value, self.partial || next.partial)
    }
}

impl<T: Default> ResolutionResult<T> {
    /// Empty, complete result
    pub fn empty() -> Self {
        Self::complete(T::default())
    }
}

/// Two-key lookup table keyed by a composite (row, column)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationTable<R: Ord, C: Ord, V> {
    cells: BTreeMap<(R, C), V>,
}

impl<R: Ord, C: Ord, V> Default for AssociationTable<R, C, V> {
    fn default() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }
}

impl<R: Ord + Clone, C: Ord + Clone, V> AssociationTable<R, C, V> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair each join record with its resolved value.
    ///
    /// Records whose legacy id has no resolved value are left out. Returns
    /// the table and the number of records that were dropped.
    pub fn assemble<L, I>(join_records: I, values: &HashMap<L, V>) -> (Self, usize)
    where
        L: Eq + Hash,
        V: Clone,
        I: IntoIterator<Item = (R, C, L)>,
    {
        let mut table = Self::new();
        let mut dropped = 0;
        for (row, column, legacy_id) in join_records {
            match values.get(&legacy_id) {
                Some(value) => {
                    table.insert(row, column, value.clone());
                }
                None => dropped += 1,
            }
        }
        (table, dropped)
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(&mut self, row: R, column: C, value: V) -> Option<V> {
        self.cells.insert((row, column), value)
    }

    /// Look up one cell
    pub fn get(&self, row: &R, column: &C) -> Option<&V> {
        self.cells.get(&(row.clone(), column.clone()))
    }

    /// All (column, value) pairs of one row
    pub fn row<'a>(&'a self, row: &'a R) -> impl Iterator<Item = (&'a C, &'a V)> + 'a {
        self.cells
            .iter()
            .filter(move |((r, _), _)| r == row)
            .map(|((_, c), v)| (c, v))
    }

    /// Distinct row keys
    pub fn rows(&self) -> BTreeSet<&R> {
        self.cells.keys().map(|(r, _)| r).collect()
    }

    /// Every cell in (row, column) order
    pub fn iter(&self) -> impl Iterator<Item = (&R, &C, &V)> {
        self.cells.iter().map(|((r, c), v)| (r, c, v))
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the table holds no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Serialize)]
struct CellRef<'a, R, C, V> {
    row: &'a R,
    column: &'a C,
    value: &'a V,
}

#[derive(Deserialize)]
struct Cell<R, C, V> {
    row: R,
    column: C,
    value: V,
}

// Encoded as a list of cells so composite keys survive formats that only
// allow string map keys.
impl<R, C, V> Serialize for AssociationTable<R, C, V>
where
    R: Ord + Serialize,
    C: Ord + Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.cells.iter().map(|((row, column), value)| CellRef {
            row,
            column,
            value,
        }))
    }
}

impl<'de, R, C, V> Deserialize<'de> for AssociationTable<R, C, V>
where
    R: Ord + DeserializeOwned,
    C: Ord + DeserializeOwned,
    V: DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cells = Vec::<Cell<R, C, V>>::deserialize(deserializer)?;
        Ok(Self {
            cells: cells
                .into_iter()
                .map(|cell| ((cell.row, cell.column), cell.value))
                .collect(),
        })
    }
}
