use std::collections::BTreeMap;

use super::item::{Item, ItemId};
use super::user::User;
use crate::error::{Error, Result};

/// Per-column value ranges of the numeric and date attributes of a catalog.
///
/// Item distance normalizes each column difference by `max - min`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeBounds {
    pub int_min: Vec<i64>,
    pub int_max: Vec<i64>,
    pub real_min: Vec<f64>,
    pub real_max: Vec<f64>,
    pub year_min: Vec<i32>,
    pub year_max: Vec<i32>,
}

impl AttributeBounds {
    /// Column-wise min/max over a set of items.
    ///
    /// Columns missing from an item (ragged input) are ignored for that item.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let mut bounds = Self::default();
        for item in items {
            fold(&mut bounds.int_min, &mut bounds.int_max, item.ints(), |a, b| a < b);
            fold(&mut bounds.real_min, &mut bounds.real_max, item.reals(), |a, b| a < b);
            fold(&mut bounds.year_min, &mut bounds.year_max, item.years(), |a, b| a < b);
        }
        bounds
    }

    /// `max - min` of integer column `col`, 0 if unknown.
    pub fn int_range(&self, col: usize) -> f64 {
        range(&self.int_min, &self.int_max, col, |v| v as f64)
    }

    /// `max - min` of real column `col`, 0 if unknown.
    pub fn real_range(&self, col: usize) -> f64 {
        range(&self.real_min, &self.real_max, col, |v| v)
    }

    /// `max - min` of year column `col`, 0 if unknown.
    pub fn year_range(&self, col: usize) -> f64 {
        range(&self.year_min, &self.year_max, col, f64::from)
    }
}

fn fold<T: Copy>(min: &mut Vec<T>, max: &mut Vec<T>, values: &[T], less: impl Fn(T, T) -> bool) {
    for (col, &v) in values.iter().enumerate() {
        if col >= min.len() {
            min.push(v);
            max.push(v);
            continue;
        }
        if less(v, min[col]) {
            min[col] = v;
        }
        if less(max[col], v) {
            max[col] = v;
        }
    }
}

fn range<T: Copy>(min: &[T], max: &[T], col: usize, to_f64: impl Fn(T) -> f64) -> f64 {
    match (min.get(col), max.get(col)) {
        (Some(&lo), Some(&hi)) => to_f64(hi) - to_f64(lo),
        _ => 0.0,
    }
}

/// The item catalog: items by id plus the attribute bounds used to normalize distances.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: BTreeMap<ItemId, Item>,
    bounds: AttributeBounds,
}

impl Catalog {
    /// Build a catalog, checking that every item has the same number of
    /// columns of each attribute type, and deriving the bounds from the items.
    pub fn new(items: impl IntoIterator<Item = Item>) -> Result<Self> {
        let items: BTreeMap<ItemId, Item> =
            items.into_iter().map(|item| (item.id().clone(), item)).collect();

        if let Some(first) = items.values().next() {
            for item in items.values().skip(1) {
                check_arity("int", first.ints().len(), item.ints().len())?;
                check_arity("real", first.reals().len(), item.reals().len())?;
                check_arity("date", first.years().len(), item.years().len())?;
                check_arity("boolean", first.booleans().len(), item.booleans().len())?;
                check_arity("categorical", first.categories().len(), item.categories().len())?;
            }
        }

        let bounds = AttributeBounds::from_items(items.values());
        Ok(Self { items, bounds })
    }

    /// Replace the derived bounds with externally computed ones (e.g. bounds
    /// taken over a larger dataset than this catalog).
    pub fn with_bounds(mut self, bounds: AttributeBounds) -> Result<Self> {
        let expected = self.bounds.clone();
        check_arity("int", expected.int_min.len(), bounds.int_min.len())?;
        check_arity("int", expected.int_max.len(), bounds.int_max.len())?;
        check_arity("real", expected.real_min.len(), bounds.real_min.len())?;
        check_arity("real", expected.real_max.len(), bounds.real_max.len())?;
        check_arity("date", expected.year_min.len(), bounds.year_min.len())?;
        check_arity("date", expected.year_max.len(), bounds.year_max.len())?;
        self.bounds = bounds;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Items in identifier order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn bounds(&self) -> &AttributeBounds {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn check_arity(kind: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::DimensionMismatch {
            kind,
            expected,
            found,
        });
    }
    Ok(())
}

/// Observed ratings per item across a dataset, and the dataset's rating ceiling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RatingTable {
    per_item: BTreeMap<ItemId, Vec<f64>>,
    max_rating: f64,
}

impl RatingTable {
    /// Collect every rating of every user.
    ///
    /// The ceiling is the largest rating seen (0 for an empty dataset).
    pub fn from_users<'a>(users: impl IntoIterator<Item = &'a User>) -> Self {
        let mut table = Self::default();
        for user in users {
            for (item, &rating) in user.ratings() {
                table.per_item.entry(item.clone()).or_default().push(rating);
                if rating > table.max_rating {
                    table.max_rating = rating;
                }
            }
        }
        table
    }

    /// Override the rating ceiling (e.g. a 5-star scale where nobody gave 5).
    pub fn with_max_rating(mut self, max_rating: f64) -> Self {
        self.max_rating = max_rating;
        self
    }

    pub fn max_rating(&self) -> f64 {
        self.max_rating
    }

    /// Every rating observed for `item`.
    pub fn observed(&self, item: &str) -> Option<&[f64]> {
        self.per_item.get(item).map(Vec::as_slice)
    }

    /// Mean observed rating of `item`, `None` if it was never rated.
    pub fn mean(&self, item: &str) -> Option<f64> {
        let ratings = self.observed(item)?;
        if ratings.is_empty() {
            return None;
        }
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    }
}
