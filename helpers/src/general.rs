use std::error::Error;
use std::fmt;

/// InputValueError is used if some simulation option or parameter does not fulfill the posed
/// requirements, e.g., a race without any laps or drivers.
#[derive(Debug, Clone)]
pub struct InputValueError;

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value")
    }
}

impl Error for InputValueError {}

pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that sort the array x. The sort is stable, i.e. equal values keep
/// the order of their indices.
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut idxs: Vec<usize> = (0..x.len()).collect();

    match order {
        SortOrder::Ascending => idxs.sort_by(|&a, &b| {
            x[a].partial_cmp(&x[b])
                .expect("argsort requires comparable values (no NaN)!")
        }),
        SortOrder::Descending => idxs.sort_by(|&a, &b| {
            x[b].partial_cmp(&x[a])
                .expect("argsort requires comparable values (no NaN)!")
        }),
    };

    idxs
}

/// is_permutation checks if x contains every value of 1..=x.len() exactly once.
pub fn is_permutation(x: &[u32]) -> bool {
    let mut seen = vec![false; x.len()];

    for &val in x.iter() {
        if val == 0 || val as usize > x.len() || seen[val as usize - 1] {
            return false;
        }
        seen[val as usize - 1] = true;
    }
    true
}

/// lin_interp returns the linearly interpolated value at x for given discrete data points xp, fp.
/// xp must be increasing. Inspired by numpy.interp.
pub fn lin_interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    if xp.len() != fp.len() || xp.is_empty() {
        panic!("Number of items in xp and fp must be equal and non-zero!")
    }

    if x <= xp[0] {
        return fp[0];
    }

    for i in 1..xp.len() {
        if x <= xp[i] {
            return fp[i - 1] + (x - xp[i - 1]) * (fp[i] - fp[i - 1]) / (xp[i] - xp[i - 1]);
        }
    }

    fp[fp.len() - 1]
}
