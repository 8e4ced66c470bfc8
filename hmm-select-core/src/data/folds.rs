/// Deterministic k-way partition of `n` items into contiguous folds.
///
/// Items are never shuffled. The first `n % n_splits` folds hold one extra
/// item, so fold sizes differ by at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
	n_splits: usize,
}

impl KFold {
	/// Creates a splitter with `n_splits` folds.
	///
	/// # Errors
	/// Returns an error if `n_splits < 2`.
	pub fn new(n_splits: usize) -> Result<Self, String> {
		if n_splits < 2 {
			return Err("n_splits must be >= 2".to_owned());
		}
		Ok(Self { n_splits })
	}

	/// Returns one `(train_indices, test_indices)` pair per fold.
	///
	/// # Errors
	/// Returns an error if there are fewer items than folds.
	pub fn split(&self, n_items: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>, String> {
		if n_items < self.n_splits {
			return Err(format!("cannot split {} items into {} folds", n_items, self.n_splits));
		}

		let base = n_items / self.n_splits;
		let extra = n_items % self.n_splits;

		let mut folds = Vec::with_capacity(self.n_splits);
		let mut start = 0;
		for fold in 0..self.n_splits {
			let size = if fold < extra { base + 1 } else { base };
			let stop = start + size;
			let test: Vec<usize> = (start..stop).collect();
			let train: Vec<usize> = (0..start).chain(stop..n_items).collect();
			folds.push((train, test));
			start = stop;
		}
		Ok(folds)
	}
}
