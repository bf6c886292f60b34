use std::cmp::Ordering;
use std::num::NonZeroUsize;
use std::thread::available_parallelism;

use eyre::Result;

// Negative values are interpreted as "all cores except N - 1", zero is a single thread.
fn _normalize(requested: isize, max: isize) -> usize {
    match requested.cmp(&0) {
        Ordering::Less => (max + requested + 1).max(1) as usize,
        Ordering::Equal => 1,
        Ordering::Greater => requested.min(max) as usize,
    }
}

/// Translate the user-requested number of threads into the number of worker threads to spawn.
/// `-1` requests all available cores, `-2` all but one, and so on.
pub fn available(requested: isize) -> Result<NonZeroUsize> {
    let max = available_parallelism()?.get() as isize;
    let threads = _normalize(requested, max);
    Ok(NonZeroUsize::new(threads).unwrap_or(NonZeroUsize::MIN))
}
