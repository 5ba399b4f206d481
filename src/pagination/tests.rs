//! Tests for the pagination state machine
//!
//! Driven by a scripted fake transport so the loop logic is exercised
//! without any network I/O.

use super::*;
use crate::document::FormState;
use crate::error::{Error, Result};
use crate::http::{FetchResponse, Transport};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

/// Transport that replays a scripted sequence of responses and records every
/// POST body it receives
struct FakeTransport {
    responses: Mutex<VecDeque<Result<FetchResponse>>>,
    posts: Mutex<Vec<Vec<(String, String)>>>,
}

impl FakeTransport {
    fn new(responses: Vec<Result<FetchResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            posts: Mutex::new(Vec::new()),
        }
    }

    fn posts(&self) -> Vec<Vec<(String, String)>> {
        self.posts.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<FetchResponse> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport received more requests than scripted")
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, _url: &str) -> Result<FetchResponse> {
        self.next_response()
    }

    async fn post_form(&self, _url: &str, fields: &[(String, String)]) -> Result<FetchResponse> {
        self.posts.lock().unwrap().push(fields.to_vec());
        self.next_response()
    }
}

fn ok(body: String) -> Result<FetchResponse> {
    Ok(FetchResponse {
        final_url: "https://example.com/Schedule.aspx".to_string(),
        body,
    })
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn numbered_anchor(page: u32, label: &str) -> String {
    format!(
        "<td><a href=\"javascript:__doPostBack('ctl00$ContentPlaceHolder1$gvData','Page${page}')\">{label}</a></td>"
    )
}

/// Build a WebForms-shaped page: hidden state fields, a data grid, and an
/// optional pager row
fn page(viewstate: &str, extra_hidden: &str, rows: &[[&str; 2]], pager_cells: &str) -> String {
    let row_html: String = rows
        .iter()
        .map(|r| format!("<tr class=\"GridRow\"><td>{}</td><td>{}</td></tr>", r[0], r[1]))
        .collect();
    let pager_html = if pager_cells.is_empty() {
        String::new()
    } else {
        format!(
            "<tr class=\"GridPager\"><td colspan=\"2\"><table><tr>{pager_cells}</tr></table></td></tr>"
        )
    };
    format!(
        r#"<html><body><form method="post" action="./Schedule.aspx">
<input type="hidden" name="__VIEWSTATE" value="{viewstate}" />
<input type="hidden" name="__EVENTVALIDATION" value="ev-{viewstate}" />
{extra_hidden}
<table class="GridView" id="ContentPlaceHolder1_gvData">
<tr class="GridHeader"><th>Date</th><th>Course</th></tr>
{row_html}
{pager_html}
</table>
</form></body></html>"#
    )
}

#[tokio::test]
async fn test_five_page_run_terminates_when_anchors_run_out() {
    let responses = vec![
        ok(page("v1", "", &[["01/09", "Algebra"]], &numbered_anchor(2, "2"))),
        ok(page("v2", "", &[["02/09", "Logic"]], &numbered_anchor(3, "3"))),
        ok(page("v3", "", &[["03/09", "Calculus"]], &numbered_anchor(4, "4"))),
        ok(page("v4", "", &[["04/09", "Physics"]], &numbered_anchor(5, "5"))),
        ok(page("v5", "", &[["05/09", "Chemistry"]], "")),
    ];
    let transport = FakeTransport::new(responses);
    let controller = PaginationController::new(&transport, "https://example.com/Schedule.aspx");

    let report = controller.run(None).await.unwrap();

    assert_eq!(report.pages.len(), 5);
    assert_eq!(report.termination, Termination::NoNextPage);
    assert_eq!(report.requests, 5);

    let posts = transport.posts();
    assert_eq!(posts.len(), 4);
    for (i, post) in posts.iter().enumerate() {
        assert_eq!(
            field(post, "__EVENTTARGET"),
            Some("ctl00$ContentPlaceHolder1$gvData")
        );
        assert_eq!(
            field(post, "__EVENTARGUMENT"),
            Some(format!("Page${}", i + 2).as_str())
        );
        assert_eq!(field(post, "__LASTFOCUS"), Some(""));
    }
}

#[tokio::test]
async fn test_duplicate_content_stops_run_without_appending() {
    // Page 2 advertises more pages only via an ellipsis anchor; the server
    // then re-serves page 2's content for the Page$3 postback.
    let page2_rows = [["02/09", "Logic"]];
    let responses = vec![
        ok(page("v1", "", &[["01/09", "Algebra"]], &numbered_anchor(2, "2"))),
        ok(page("v2", "", &page2_rows, &numbered_anchor(9, "..."))),
        ok(page("v3", "", &page2_rows, &numbered_anchor(9, "..."))),
    ];
    let transport = FakeTransport::new(responses);
    let controller = PaginationController::new(&transport, "https://example.com/Schedule.aspx");

    let report = controller.run(None).await.unwrap();

    // Three requests issued, but only the distinct pages are kept
    assert_eq!(report.requests, 3);
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.termination, Termination::DuplicatePage);
}

#[tokio::test]
async fn test_filter_form_is_submitted_exactly_once() {
    let responses = vec![
        ok(page("v0", "", &[["unfiltered", "X"]], "")),
        ok(page("v1", "", &[["01/09", "Algebra"]], &numbered_anchor(2, "2"))),
        ok(page("v2", "", &[["02/09", "Logic"]], "")),
    ];
    let transport = FakeTransport::new(responses);
    let controller = PaginationController::new(&transport, "https://example.com/Schedule.aspx");

    let mut filters = BTreeMap::new();
    filters.insert(
        "ctl00$ContentPlaceHolder1$ddlYear".to_string(),
        "2025".to_string(),
    );
    let report = controller.run(Some(&filters)).await.unwrap();

    // The pre-filter document is not part of the result
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.requests, 3);

    let posts = transport.posts();
    assert_eq!(posts.len(), 2);

    // Filter POST: empty event target, filter field present, state echoed
    assert_eq!(field(&posts[0], "__EVENTTARGET"), Some(""));
    assert_eq!(field(&posts[0], "__EVENTARGUMENT"), Some(""));
    assert_eq!(
        field(&posts[0], "ctl00$ContentPlaceHolder1$ddlYear"),
        Some("2025")
    );
    assert_eq!(field(&posts[0], "__VIEWSTATE"), Some("v0"));

    // Page-advance POST: no filter fields, state from the filtered response
    assert_eq!(
        field(&posts[1], "__EVENTTARGET"),
        Some("ctl00$ContentPlaceHolder1$gvData")
    );
    assert_eq!(field(&posts[1], "__EVENTARGUMENT"), Some("Page$2"));
    assert_eq!(field(&posts[1], "ctl00$ContentPlaceHolder1$ddlYear"), None);
    assert_eq!(field(&posts[1], "__VIEWSTATE"), Some("v1"));
}

#[tokio::test]
async fn test_form_state_merge_keeps_fields_absent_from_newer_pages() {
    let tree_state = r#"<input type="hidden" name="tvMain_ExpandState" value="t1" />"#;
    let responses = vec![
        // Page 1 carries the tree state; later pages omit it
        ok(page("v1", tree_state, &[["01/09", "Algebra"]], &numbered_anchor(2, "2"))),
        ok(page("v2", "", &[["02/09", "Logic"]], &numbered_anchor(3, "3"))),
        ok(page("v3", "", &[["03/09", "Calculus"]], "")),
    ];
    let transport = FakeTransport::new(responses);
    let controller = PaginationController::new(&transport, "https://example.com/Schedule.aspx");

    controller.run(None).await.unwrap();

    let posts = transport.posts();
    assert_eq!(posts.len(), 2);

    // First advance echoes page 1's state
    assert_eq!(field(&posts[0], "__VIEWSTATE"), Some("v1"));
    assert_eq!(field(&posts[0], "tvMain_ExpandState"), Some("t1"));

    // Second advance: view state overridden by page 2, tree state retained
    assert_eq!(field(&posts[1], "__VIEWSTATE"), Some("v2"));
    assert_eq!(field(&posts[1], "tvMain_ExpandState"), Some("t1"));
}

#[tokio::test]
async fn test_mid_run_failure_returns_collected_pages() {
    let responses = vec![
        ok(page("v1", "", &[["01/09", "Algebra"]], &numbered_anchor(2, "2"))),
        Err(Error::http_status(503, "unavailable")),
    ];
    let transport = FakeTransport::new(responses);
    let controller = PaginationController::new(&transport, "https://example.com/Schedule.aspx");

    let err = controller.run(None).await.unwrap_err();

    assert_eq!(err.pages.len(), 1);
    assert!(matches!(err.source, Error::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_missing_view_state_on_first_fetch_is_malformed() {
    let responses = vec![ok(
        "<html><body><p>maintenance page, no form</p></body></html>".to_string(),
    )];
    let transport = FakeTransport::new(responses);
    let controller = PaginationController::new(&transport, "https://example.com/Schedule.aspx");

    let err = controller.run(None).await.unwrap_err();

    assert!(err.pages.is_empty());
    assert!(matches!(err.source, Error::MalformedDocument { .. }));
}

#[test]
fn test_postback_body_contains_protocol_fields() {
    let mut state = FormState::new();
    state.insert("__VIEWSTATE", "vs");
    state.insert("ctl00$ContentPlaceHolder1$ddlYear", "2024");

    let mut extra = BTreeMap::new();
    extra.insert(
        "ctl00$ContentPlaceHolder1$ddlYear".to_string(),
        "2025".to_string(),
    );

    let body = postback_body(
        "ctl00$ContentPlaceHolder1$gvData",
        "Page$4",
        &state,
        Some(&extra),
    );

    assert_eq!(
        field(&body, "__EVENTTARGET"),
        Some("ctl00$ContentPlaceHolder1$gvData")
    );
    assert_eq!(field(&body, "__EVENTARGUMENT"), Some("Page$4"));
    assert_eq!(field(&body, "__LASTFOCUS"), Some(""));
    assert_eq!(field(&body, "__VIEWSTATE"), Some("vs"));
    // Caller-supplied fields override state fields of the same name
    assert_eq!(
        field(&body, "ctl00$ContentPlaceHolder1$ddlYear"),
        Some("2025")
    );
}

#[test]
fn test_pagination_state_advances_monotonically() {
    let mut state = PaginationState::new(FormState::new(), Default::default());
    assert_eq!(state.page, 1);
    state.advance();
    state.advance();
    assert_eq!(state.page, 3);
}
