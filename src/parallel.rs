//! Bounded fan-out over independent work items.

use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Worker threads to use when the caller does not choose.
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Apply `f` to every item on at most `workers` scoped threads.
///
/// Each worker claims the next unprocessed index from a shared counter, so no
/// more than `workers` calls of `f` run at once. Results come back in the
/// order of `items`. A panic in `f` is re-raised on the calling thread.
pub fn map_bounded<T, R, F>(items: &[T], workers: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let workers = workers.clamp(1, items.len().max(1));
    let next = &AtomicUsize::new(0);
    let f = &f;

    let mut indexed: Vec<(usize, R)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(item) = items.get(index) else {
                            break;
                        };
                        done.push((index, f(item)));
                    }
                    done
                })
            })
            .collect();

        let mut indexed = Vec::with_capacity(items.len());
        for handle in handles {
            match handle.join() {
                Ok(done) => indexed.extend(done),
                Err(payload) => panic::resume_unwind(payload),
            }
        }
        indexed
    });

    indexed.sort_unstable_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn keeps_input_order() {
        let items: Vec<u64> = (0..100).collect();
        let doubled = map_bounded(&items, 3, |&n| {
            // uneven work so workers finish out of order
            thread::sleep(Duration::from_micros((100 - n) * 10));
            n * 2
        });
        assert_eq!(doubled, items.iter().map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn never_exceeds_worker_count() {
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let items = vec![(); 40];
        map_bounded(&items, 3, |_| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(2));
            active.fetch_sub(1, Ordering::SeqCst);
        });
        let peak = peak.load(Ordering::SeqCst);
        assert!((1..=3).contains(&peak), "peak={peak}");
    }

    #[test]
    fn handles_empty_input_and_zero_workers() {
        let empty: Vec<u8> = Vec::new();
        assert!(map_bounded(&empty, 8, |&b| b).is_empty());
        assert_eq!(map_bounded(&[1, 2, 3], 0, |&n| n + 1), vec![2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "bad item")]
    fn worker_panic_reaches_the_caller() {
        map_bounded(&[1, 2, 3], 2, |&n| {
            if n == 2 {
                panic!("bad item");
            }
            n
        });
    }
}
