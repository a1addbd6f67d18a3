use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bitvec::prelude::*;

/// Item identifier.
///
/// Cheap to clone: the string is shared between the catalog, every rating map
/// that mentions the item and every prediction produced for it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(Arc<str>);

impl ItemId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&ItemId> for ItemId {
    fn from(id: &ItemId) -> Self {
        id.clone()
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One categorical column of an item, one-hot encoded over the column's category universe.
///
/// A multi-valued attribute (e.g. a list of genres) simply sets several bits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorySet(BitVec<u64, Lsb0>);

impl CategorySet {
    /// An empty set over a universe of `universe` categories.
    pub fn with_universe(universe: usize) -> Self {
        Self(bitvec![u64, Lsb0; 0; universe])
    }

    /// A set over `universe` categories with the given members set.
    ///
    /// Members past the universe grow it.
    pub fn from_members(universe: usize, members: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::with_universe(universe);
        for m in members {
            set.insert(m);
        }
        set
    }

    /// Mark category `idx` as present.
    pub fn insert(&mut self, idx: usize) {
        if idx >= self.0.len() {
            self.0.resize(idx + 1, false);
        }
        self.0.set(idx, true);
    }

    /// Whether category `idx` is present.
    pub fn contains(&self, idx: usize) -> bool {
        self.0.get(idx).is_some_and(|bit| *bit)
    }

    /// Number of categories present.
    pub fn count(&self) -> usize {
        self.0.count_ones()
    }

    /// Size of the category universe.
    pub fn universe(&self) -> usize {
        self.0.len()
    }

    /// `|self ∩ other|`.
    pub fn intersection_len(&self, other: &CategorySet) -> usize {
        self.0.iter_ones().filter(|&i| other.contains(i)).count()
    }

    /// `|self ∪ other|`.
    pub fn union_len(&self, other: &CategorySet) -> usize {
        self.count() + other.count() - self.intersection_len(other)
    }

    /// Jaccard distance `1 - |∩| / |∪|`, or 0 when both sets are empty.
    pub fn jaccard_distance(&self, other: &CategorySet) -> f64 {
        let union = self.union_len(other);
        if union == 0 {
            return 0.0;
        }
        1.0 - self.intersection_len(other) as f64 / union as f64
    }
}

/// A catalog entry: an identifier and its typed attribute columns.
///
/// Attribute vectors are column-aligned across a catalog: position `i` of
/// `ints()` means the same column for every item. Items compare, order and hash
/// by identifier only.
#[derive(Clone, Debug)]
pub struct Item {
    id: ItemId,
    ints: Vec<i64>,
    reals: Vec<f64>,
    years: Vec<i32>,
    booleans: Vec<String>,
    categories: Vec<CategorySet>,
}

impl Item {
    /// An item with no attributes.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            ints: Vec::new(),
            reals: Vec::new(),
            years: Vec::new(),
            booleans: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// Set the integer columns.
    pub fn with_ints(mut self, ints: Vec<i64>) -> Self {
        self.ints = ints;
        self
    }

    /// Set the real-valued columns.
    pub fn with_reals(mut self, reals: Vec<f64>) -> Self {
        self.reals = reals;
        self
    }

    /// Set the date columns, as ordinal years.
    pub fn with_years(mut self, years: Vec<i32>) -> Self {
        self.years = years;
        self
    }

    /// Set the boolean columns. Values are compared as strings.
    pub fn with_booleans<S: Into<String>>(mut self, booleans: impl IntoIterator<Item = S>) -> Self {
        self.booleans = booleans.into_iter().map(Into::into).collect();
        self
    }

    /// Set the categorical columns.
    pub fn with_categories(mut self, categories: Vec<CategorySet>) -> Self {
        self.categories = categories;
        self
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn ints(&self) -> &[i64] {
        &self.ints
    }

    pub fn reals(&self) -> &[f64] {
        &self.reals
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn booleans(&self) -> &[String] {
        &self.booleans
    }

    pub fn categories(&self) -> &[CategorySet] {
        &self.categories
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Item {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}
