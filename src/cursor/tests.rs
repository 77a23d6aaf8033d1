//! Tests for cursor module

use super::*;
use crate::error::{Error, Result, PAGE_OUT_OF_RANGE};
use crate::page::{PageRequest, ResourcePage};
use crate::types::Termination;
use async_trait::async_trait;
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use std::sync::Mutex;
use test_case::test_case;

// ============================================================================
// Scripted transports
// ============================================================================

#[derive(Debug, Clone)]
enum Step {
    Page(Vec<&'static str>, Option<&'static str>),
    OutOfRange,
    Fail(u16),
}

fn page(items: &[&'static str], token: Option<&'static str>) -> Step {
    Step::Page(items.to_vec(), token)
}

/// Answers by page number; pages past the script are out of range
fn answer(
    steps: &[Step],
    request: &PageRequest<&'static str>,
) -> Result<ResourcePage<&'static str>> {
    match steps.get(request.page_number as usize) {
        Some(Step::Page(items, token)) => Ok(ResourcePage::new(
            items.clone(),
            token.map(ToString::to_string),
        )),
        Some(Step::OutOfRange) | None => {
            Err(Error::rest(400, PAGE_OUT_OF_RANGE, "Page is out of range"))
        }
        Some(Step::Fail(status)) => Err(Error::http_status(*status, "upstream failure")),
    }
}

struct Script {
    steps: Vec<Step>,
    calls: Vec<PageRequest<&'static str>>,
    /// 1-based call number that fails once with a 500
    fail_on_call: Option<usize>,
}

impl Script {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            calls: Vec::new(),
            fail_on_call: None,
        }
    }

    fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }
}

impl FetchPage<&'static str> for Script {
    type Item = &'static str;
    type Page = ResourcePage<&'static str>;

    fn fetch_page(&mut self, request: &PageRequest<&'static str>) -> Result<Self::Page> {
        self.calls.push(request.clone());
        if self.fail_on_call == Some(self.calls.len()) {
            return Err(Error::http_status(500, "Internal Server Error"));
        }
        answer(&self.steps, request)
    }
}

struct AsyncScript {
    steps: Vec<Step>,
    calls: Mutex<Vec<PageRequest<&'static str>>>,
}

impl AsyncScript {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AsyncFetchPage<&'static str> for AsyncScript {
    type Item = &'static str;
    type Page = ResourcePage<&'static str>;

    async fn fetch_page(&self, request: &PageRequest<&'static str>) -> Result<Self::Page> {
        self.calls.lock().unwrap().push(request.clone());
        tokio::task::yield_now().await;
        answer(&self.steps, request)
    }
}

fn two_pages() -> Vec<Step> {
    vec![page(&["a", "b"], Some("t1")), page(&["c"], None)]
}

fn drain<Fe, F>(cursor: &mut PageCursor<Fe, F>) -> Vec<Fe::Item>
where
    Fe: FetchPage<F>,
    F: Clone,
{
    let mut items = Vec::new();
    while cursor.has_next().unwrap() {
        items.push(cursor.advance().unwrap().unwrap());
    }
    items
}

// ============================================================================
// PageOutcome Tests
// ============================================================================

#[test]
fn test_outcome_from_page() {
    let outcome = PageOutcome::from_fetch(Ok(ResourcePage::last(vec![1]))).unwrap();
    assert!(!outcome.is_end());
}

#[test]
fn test_outcome_from_out_of_range() {
    let result: Result<ResourcePage<u8>> = Err(Error::rest(400, PAGE_OUT_OF_RANGE, "x"));
    assert!(PageOutcome::from_fetch(result).unwrap().is_end());

    let result: Result<ResourcePage<u8>> = Err(Error::PageOutOfRange { page: 4 });
    assert!(PageOutcome::from_fetch(result).unwrap().is_end());
}

#[test]
fn test_outcome_passes_other_errors() {
    let result: Result<ResourcePage<u8>> = Err(Error::rest(401, 20003, "Authenticate"));
    let err = PageOutcome::from_fetch(result).unwrap_err();
    assert_eq!(err.code(), Some(20003));
}

// ============================================================================
// PageCursor Tests
// ============================================================================

#[test]
fn test_walk_stops_at_missing_token() {
    let mut cursor = PageCursor::new(Script::new(two_pages()), 0, 2, "status=open");

    assert_eq!(drain(&mut cursor), vec!["a", "b", "c"]);
    assert!(!cursor.has_next().unwrap());
    assert!(cursor.is_finished());

    // No third request is made once a page arrives without a token
    let calls = &cursor.fetcher().calls;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], PageRequest::new(0, 2, "status=open"));
    assert_eq!(calls[1], PageRequest::new(1, 2, "status=open").with_token("t1"));
    assert_eq!(cursor.next_page_token(), None);
    assert_eq!(cursor.page_number(), 2);
}

#[test]
fn test_probe_next_page_ends_on_out_of_range() {
    let mut cursor = PageCursor::new(Script::new(two_pages()), 0, 2, "")
        .with_termination(Termination::ProbeNextPage);

    assert_eq!(drain(&mut cursor), vec!["a", "b", "c"]);

    let calls = &cursor.fetcher().calls;
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2].page_number, 2);
    assert!(calls[2].next_page_token.is_none());

    // The out-of-range answer is not retried
    assert!(!cursor.has_next().unwrap());
    assert_eq!(cursor.fetcher().calls.len(), 3);
    // Only successful fetches move the page number
    assert_eq!(cursor.page_number(), 2);
}

#[test]
fn test_probe_next_page_ends_on_empty_page() {
    let steps = vec![page(&["a"], None), page(&["b"], None), page(&[], None)];
    let mut cursor =
        PageCursor::new(Script::new(steps), 0, 1, "").with_termination(Termination::ProbeNextPage);

    assert_eq!(drain(&mut cursor), vec!["a", "b"]);
    assert_eq!(cursor.fetcher().calls.len(), 3);
}

#[test_case(0, 3 ; "empty collection")]
#[test_case(1, 3 ; "single item")]
#[test_case(7, 3 ; "partial last page")]
#[test_case(9, 3 ; "exact multiple")]
#[test_case(5, 1 ; "one item per page")]
fn test_walk_yields_every_item_once(total: u32, page_size: u32) {
    let items: Vec<u32> = (0..total).collect();
    let chunks: Vec<Vec<u32>> = items.chunks(page_size as usize).map(<[u32]>::to_vec).collect();

    let mut cursor = PageCursor::from_fn(
        |req: &PageRequest<()>| {
            let index = req.page_number as usize;
            Ok(match chunks.get(index) {
                Some(chunk) => ResourcePage::with_token(chunk.clone(), format!("p{}", index + 1)),
                None => ResourcePage::empty(),
            })
        },
        0,
        page_size,
        (),
    );

    let walked: Vec<u32> = cursor.by_ref().collect::<Result<_>>().unwrap();
    assert_eq!(walked, items);
    assert_eq!(cursor.pages_fetched(), chunks.len() as u64 + 1);
}

#[test]
fn test_restart_reproduces_sequence() {
    let steps = vec![
        page(&["a", "b"], Some("t1")),
        page(&["c", "d"], Some("t2")),
        page(&["e"], None),
    ];
    let mut cursor = PageCursor::new(Script::new(steps), 0, 2, "kind=call");

    let first = drain(&mut cursor);
    cursor.restart();
    assert_eq!(cursor.fetcher().calls.len(), 3, "restart must not fetch");
    assert_eq!(cursor.page_number(), 0);
    assert_eq!(cursor.page_size(), 2);
    assert_eq!(*cursor.filters(), "kind=call");
    assert!(cursor.next_page_token().is_none());
    assert_eq!(cursor.buffered(), 0);

    let second = drain(&mut cursor);
    assert_eq!(first, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(first, second);

    let calls = &cursor.fetcher().calls;
    assert_eq!(&calls[..3], &calls[3..]);
}

#[test]
fn test_restart_mid_page_discards_buffer() {
    let mut cursor = PageCursor::new(Script::new(two_pages()), 0, 2, "");

    assert_eq!(cursor.advance().unwrap(), Some("a"));
    assert_eq!(cursor.buffered(), 1);

    cursor.restart();
    assert_eq!(cursor.buffered(), 0);
    assert!(cursor.current().is_none());
    assert_eq!(cursor.advance().unwrap(), Some("a"));
}

#[test]
fn test_restart_after_out_of_range_walks_again() {
    let mut cursor = PageCursor::new(Script::new(vec![Step::OutOfRange]), 0, 10, "");
    assert!(!cursor.has_next().unwrap());
    assert!(cursor.is_finished());

    cursor.restart();
    assert!(!cursor.is_finished());
    assert!(!cursor.has_next().unwrap());
    assert_eq!(cursor.fetcher().calls.len(), 2);
}

#[test]
fn test_out_of_range_on_first_call_is_empty() {
    let mut cursor = PageCursor::new(Script::new(vec![Step::OutOfRange]), 0, 10, "");

    assert!(!cursor.has_next().unwrap());
    assert_eq!(cursor.advance().unwrap(), None);
    assert!(cursor.current().is_none());
    assert_eq!(cursor.fetcher().calls.len(), 1);
    assert_eq!(cursor.pages_fetched(), 0);
}

#[test]
fn test_advance_without_has_next_fetches_lazily() {
    let mut cursor = PageCursor::new(Script::new(two_pages()), 0, 2, "");
    assert!(cursor.fetcher().calls.is_empty());

    assert_eq!(cursor.advance().unwrap(), Some("a"));
    assert_eq!(cursor.advance().unwrap(), Some("b"));
    assert_eq!(cursor.advance().unwrap(), Some("c"));
    assert_eq!(cursor.advance().unwrap(), None);
    assert_eq!(cursor.advance().unwrap(), None);
    assert_eq!(cursor.fetcher().calls.len(), 2);
}

#[test]
fn test_transport_error_leaves_state_for_retry() {
    // Second call fails once with a 500
    let mut cursor = PageCursor::new(Script::new(two_pages()).failing_on(2), 0, 2, "");

    assert_eq!(cursor.advance().unwrap(), Some("a"));
    assert_eq!(cursor.advance().unwrap(), Some("b"));

    let err = cursor.has_next().unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert_eq!(cursor.page_number(), 1);
    assert_eq!(cursor.next_page_token(), Some("t1"));
    assert_eq!(cursor.buffered(), 0);
    assert_eq!(cursor.pages_fetched(), 1);

    // Retrying issues the identical request
    assert!(cursor.has_next().unwrap());
    let calls = &cursor.fetcher().calls;
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1], calls[2]);
    assert_eq!(cursor.advance().unwrap(), Some("c"));
}

#[test]
fn test_transport_error_on_advance() {
    let steps = vec![page(&["a"], Some("t1")), Step::Fail(503)];
    let mut cursor = PageCursor::new(Script::new(steps), 0, 1, "");

    assert_eq!(cursor.advance().unwrap(), Some("a"));
    let err = cursor.advance().unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
    assert!(!cursor.is_finished());
}

#[test]
fn test_non_out_of_range_rest_error_propagates() {
    let mut cursor = PageCursor::from_fn(
        |_req: &PageRequest<()>| -> Result<ResourcePage<u8>> {
            Err(Error::rest(401, 20003, "Authenticate"))
        },
        0,
        10,
        (),
    );

    let err = cursor.has_next().unwrap_err();
    assert_eq!(err.code(), Some(20003));
}

#[test]
fn test_iterator_yields_error_then_recovers() {
    let mut cursor = PageCursor::new(Script::new(two_pages()).failing_on(1), 0, 2, "");

    assert!(matches!(cursor.next(), Some(Err(Error::HttpStatus { .. }))));
    assert_eq!(cursor.next().unwrap().unwrap(), "a");

    let rest: Vec<_> = cursor.collect::<Result<_>>().unwrap();
    assert_eq!(rest, vec!["b", "c"]);
}

#[test]
fn test_collect_stops_at_first_error() {
    let steps = vec![page(&["a"], Some("t1")), Step::Fail(502)];
    let cursor = PageCursor::new(Script::new(steps), 0, 1, "");

    let result: Result<Vec<_>> = cursor.collect();
    assert!(matches!(result, Err(Error::HttpStatus { status: 502, .. })));
}

#[test]
fn test_anyhow_errors_propagate_from_closures() {
    let mut cursor = PageCursor::from_fn(
        |_req: &PageRequest<()>| -> Result<Vec<u8>> {
            Err(anyhow::anyhow!("socket closed").into())
        },
        0,
        10,
        (),
    );

    let err = cursor.advance().unwrap_err();
    assert!(matches!(err, Error::Anyhow(_)));
    assert_eq!(err.to_string(), "socket closed");
}

#[test]
fn test_count_items_is_unsupported() {
    let mut cursor = PageCursor::new(Script::new(two_pages()), 0, 2, "");

    assert!(matches!(
        cursor.count_items(),
        Err(Error::Unsupported { operation: "count" })
    ));
    assert_eq!(cursor.advance().unwrap(), Some("a"));
    assert!(matches!(cursor.count_items(), Err(Error::Unsupported { .. })));
    drain(&mut cursor);
    assert!(matches!(cursor.count_items(), Err(Error::Unsupported { .. })));

    // Counting never touches the transport
    assert_eq!(cursor.fetcher().calls.len(), 2);
}

#[test]
fn test_current_does_not_advance() {
    let mut cursor = PageCursor::new(Script::new(two_pages()), 0, 2, "");
    assert!(cursor.current().is_none());

    assert!(cursor.has_next().unwrap());
    assert_eq!(cursor.current(), Some(&"a"));
    assert_eq!(cursor.current(), Some(&"a"));
    assert!(cursor.has_next().unwrap());
    assert_eq!(cursor.fetcher().calls.len(), 1);
}

#[test]
fn test_empty_page_with_token_is_skipped() {
    let steps = vec![page(&[], Some("t1")), page(&["a"], None)];
    let mut cursor = PageCursor::new(Script::new(steps), 0, 5, "");

    assert_eq!(drain(&mut cursor), vec!["a"]);
    assert_eq!(cursor.pages_fetched(), 2);
}

#[test]
fn test_repeated_token_on_empty_page_ends_walk() {
    let steps = vec![
        page(&[], Some("t1")),
        page(&[], Some("t1")),
        page(&["never"], None),
    ];
    let mut cursor = PageCursor::new(Script::new(steps), 0, 5, "");

    assert!(!cursor.has_next().unwrap());
    assert!(cursor.is_finished());
    assert_eq!(cursor.fetcher().calls.len(), 2);
}

#[test]
fn test_repeated_token_keeps_page_items() {
    let steps = vec![
        page(&["a"], Some("t1")),
        page(&["b"], Some("t1")),
        page(&["c"], None),
    ];
    let mut cursor = PageCursor::new(Script::new(steps), 0, 1, "");

    assert_eq!(drain(&mut cursor), vec!["a", "b"]);
    assert_eq!(cursor.fetcher().calls.len(), 2);
}

#[test]
fn test_repeated_token_ends_probe_walk() {
    let steps = vec![page(&["a"], Some("t1")), page(&["b"], Some("t1"))];
    let mut cursor =
        PageCursor::new(Script::new(steps), 0, 1, "").with_termination(Termination::ProbeNextPage);

    assert_eq!(drain(&mut cursor), vec!["a", "b"]);
    assert_eq!(cursor.fetcher().calls.len(), 2);
}

#[test]
fn test_empty_final_page_ends_walk() {
    let mut cursor = PageCursor::new(Script::new(vec![page(&[], None)]), 0, 5, "");

    assert!(!cursor.has_next().unwrap());
    assert!(cursor.is_finished());
    assert_eq!(cursor.pages_fetched(), 1);
}

#[test]
fn test_custom_start_page() {
    let mut cursor = PageCursor::from_fn(
        |req: &PageRequest<()>| {
            Ok(if req.page_number < 7 {
                let token = format!("p{}", req.page_number + 1);
                ResourcePage::with_token(vec![req.page_number], token)
            } else {
                ResourcePage::empty()
            })
        },
        5,
        1,
        (),
    );

    let pages: Vec<u32> = cursor.by_ref().collect::<Result<_>>().unwrap();
    assert_eq!(pages, vec![5, 6]);
    assert_eq!(cursor.page_number(), 8);
    assert_eq!(cursor.params().start_page, 5);
}

#[test]
fn test_size_hint_reports_buffer_only() {
    let mut cursor = PageCursor::new(Script::new(two_pages()), 0, 2, "");
    assert_eq!(cursor.size_hint(), (0, None));

    cursor.has_next().unwrap();
    assert_eq!(cursor.size_hint(), (2, None));
}

#[test]
fn test_with_params() {
    let params = CursorParams::new(3, 25, "to=+1555");
    let cursor = PageCursor::with_params(Script::new(Vec::new()), params.clone());
    assert_eq!(cursor.params(), &params);
    assert_eq!(cursor.page_number(), 3);
    assert_eq!(cursor.page_size(), 25);
}

// ============================================================================
// AsyncPageCursor Tests
// ============================================================================

#[tokio::test]
async fn test_async_walk() {
    let mut cursor = AsyncPageCursor::new(AsyncScript::new(two_pages()), 0, 2, "");

    let mut items = Vec::new();
    while cursor.has_next().await.unwrap() {
        assert_eq!(cursor.current().copied(), Some(["a", "b", "c"][items.len()]));
        items.push(cursor.advance().await.unwrap().unwrap());
    }

    assert_eq!(items, vec!["a", "b", "c"]);
    assert_eq!(cursor.fetcher().call_count(), 2);
    assert!(cursor.is_finished());
}

#[tokio::test]
async fn test_async_stream_collects_all_items() {
    let steps = vec![
        page(&["a", "b"], Some("t1")),
        page(&["c", "d"], Some("t2")),
        Step::OutOfRange,
    ];
    let cursor = AsyncPageCursor::new(AsyncScript::new(steps), 0, 2, "")
        .with_termination(Termination::ProbeNextPage);

    let items: Vec<_> = cursor.into_stream().try_collect().await.unwrap();
    assert_eq!(items, vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn test_async_stream_stops_on_error() {
    let steps = vec![page(&["a"], Some("t1")), Step::Fail(500)];
    let cursor = AsyncPageCursor::new(AsyncScript::new(steps), 0, 1, "");

    let result: Result<Vec<_>> = cursor.into_stream().try_collect().await;
    assert!(matches!(result, Err(Error::HttpStatus { status: 500, .. })));
}

#[tokio::test]
async fn test_async_restart() {
    let mut cursor = AsyncPageCursor::new(AsyncScript::new(two_pages()), 0, 2, "");

    assert_eq!(cursor.advance().await.unwrap(), Some("a"));
    cursor.restart();
    assert_eq!(cursor.page_number(), 0);
    assert!(cursor.next_page_token().is_none());
    assert_eq!(cursor.fetcher().call_count(), 1);

    let mut items = Vec::new();
    while let Some(item) = cursor.advance().await.unwrap() {
        items.push(item);
    }
    assert_eq!(items, vec!["a", "b", "c"]);
    assert_eq!(cursor.pages_fetched(), 2);
}

#[test]
fn test_async_out_of_range_first_call() {
    let mut cursor = AsyncPageCursor::new(AsyncScript::new(Vec::new()), 0, 2, "");

    let has_next = tokio_test::block_on(cursor.has_next()).unwrap();
    assert!(!has_next);
    assert!(matches!(cursor.count_items(), Err(Error::Unsupported { .. })));
    assert_eq!(cursor.buffered(), 0);
}
