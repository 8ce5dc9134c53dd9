use std::future::Future;

use futures::stream::{self, StreamExt};

/// Run `f` over `items` with at most `limit` in flight.
///
/// Results keep the input order. Every item runs to completion before the
/// first error (in input order) is returned, so no result is silently
/// dropped mid-flight.
pub async fn parallel<I, T, F, Fut, R, E>(items: I, limit: usize, f: F) -> Result<Vec<R>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let results: Vec<Result<R, E>> = stream::iter(items)
        .map(f)
        .buffered(limit.max(1))
        .collect()
        .await;
    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn keeps_input_order() {
        let out = parallel(vec![30u64, 10, 20], 3, |ms| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok::<_, ()>(ms)
        })
        .await
        .unwrap();
        assert_eq!(out, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn first_error_after_all_finished() {
        let finished = AtomicUsize::new(0);
        let result = parallel(0..5, 2, |i| {
            let finished = &finished;
            async move {
                finished.fetch_add(1, Ordering::SeqCst);
                if i == 1 || i == 3 { Err(i) } else { Ok(i) }
            }
        })
        .await;
        assert_eq!(result, Err(1));
        assert_eq!(finished.load(Ordering::SeqCst), 5);
    }
}
