//! Extremum-with-ties detection over `(item, count)` pairs. The report uses
//! this for every "most"/"least" question, listing all tied items instead of
//! picking one arbitrarily.

use thiserror::Error;

/// Returned when there is nothing to take an extremum of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot find extrema of an empty sequence")]
pub struct EmptyInputError;

/// Max and min tie groups of a counted sequence. Each group keeps the order in
/// which its members appeared in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extrema<T> {
    pub max_group: Vec<T>,
    pub max_count: u64,
    pub min_group: Vec<T>,
    pub min_count: u64,
}

/// Scan `items` once, collecting every item tied for the highest count and
/// every item tied for the lowest count.
///
/// The two groups are tracked independently, so a single item (or a sequence
/// where every count is equal) lands in both.
pub fn find_extrema<T, I>(items: I) -> Result<Extrema<T>, EmptyInputError>
where
    T: Clone,
    I: IntoIterator<Item = (T, u64)>,
{
    let mut iter = items.into_iter();
    let (first, first_count) = iter.next().ok_or(EmptyInputError)?;

    let mut extrema = Extrema {
        max_group: vec![first.clone()],
        max_count: first_count,
        min_group: vec![first],
        min_count: first_count,
    };

    for (item, count) in iter {
        if count > extrema.max_count {
            extrema.max_count = count;
            extrema.max_group.clear();
            extrema.max_group.push(item.clone());
        } else if count == extrema.max_count {
            extrema.max_group.push(item.clone());
        }

        if count < extrema.min_count {
            extrema.min_count = count;
            extrema.min_group.clear();
            extrema.min_group.push(item);
        } else if count == extrema.min_count {
            extrema.min_group.push(item);
        }
    }

    Ok(extrema)
}
