//! Fan-in merging of independently progressing result streams
//!
//! Items are yielded in arrival order. Within one source order is preserved,
//! across sources there is no ordering guarantee at all. Sources are polled
//! lazily, so nothing is buffered beyond what the search processes' own pipes
//! hold.

use std::pin::Pin;

use futures::Stream;

use crate::error::FinderResult;
use crate::usage::UsageRecord;

/// A boxed, sendable stream of fallible results
pub type BoxedStream<T> = Pin<Box<dyn Stream<Item = FinderResult<T>> + Send>>;

/// The stream handed to output sinks
pub type UsageStream = BoxedStream<UsageRecord>;

/// Merge any number of sources into one stream. Merges may be nested.
pub fn merge<T>(sources: impl IntoIterator<Item = BoxedStream<T>>) -> BoxedStream<T>
where
    T: Send + 'static,
{
    Box::pin(futures::stream::select_all(sources))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinderError;
    use futures::channel::mpsc;
    use futures::{StreamExt, stream};

    fn source(items: Vec<u32>) -> BoxedStream<u32> {
        Box::pin(stream::iter(items.into_iter().map(Ok)))
    }

    fn channel_source() -> (mpsc::UnboundedSender<u32>, BoxedStream<u32>) {
        let (tx, rx) = mpsc::unbounded();
        (tx, Box::pin(rx.map(Ok)))
    }

    #[tokio::test]
    async fn test_merge_preserves_order_within_each_source() {
        let merged = merge(vec![source(vec![1, 2, 3]), source(vec![10, 20, 30])]);
        let items: Vec<u32> = merged.map(|item| item.unwrap()).collect().await;

        assert_eq!(items.len(), 6);
        let small: Vec<u32> = items.iter().copied().filter(|i| *i < 10).collect();
        let large: Vec<u32> = items.iter().copied().filter(|i| *i >= 10).collect();
        assert_eq!(small, vec![1, 2, 3]);
        assert_eq!(large, vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn test_merge_is_lazy() {
        let (tx_a, a) = channel_source();
        let (_tx_b, b) = channel_source();
        let mut merged = merge(vec![a, b]);

        tx_a.unbounded_send(7).unwrap();
        // b is still open, but a's item is available straight away
        assert_eq!(merged.next().await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_merge_of_nothing_ends_immediately() {
        let mut merged = merge(Vec::<BoxedStream<u32>>::new());
        assert!(merged.next().await.is_none());
    }

    #[tokio::test]
    async fn test_nested_merge_contains_union() {
        let inner_a = merge(vec![source(vec![1]), source(vec![2, 3])]);
        let inner_b = merge(vec![source(vec![4])]);
        let mut items: Vec<u32> = merge(vec![inner_a, inner_b])
            .map(|item| item.unwrap())
            .collect()
            .await;
        items.sort();
        assert_eq!(items, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_merge_passes_errors_through() {
        let failing: BoxedStream<u32> =
            Box::pin(stream::iter(vec![Err(FinderError::malformed("bad path"))]));
        let items: Vec<FinderResult<u32>> = merge(vec![failing]).collect().await;
        assert_eq!(items, vec![Err(FinderError::malformed("bad path"))]);
    }
}
