//! The pagination controller
//!
//! Orchestrates transport, form-state extraction, and page signatures into
//! the fetch loop. The server's own "has more pages" indicator is not
//! trustworthy, so duplicate content detection is the authoritative
//! termination guard: a page-advance that re-serves the previous content
//! ends the run and the duplicate is never appended.

use super::types::{PaginationState, RunError, RunReport, Termination};
use crate::document::{extract_form_state, extract_page_signature, has_next_page, FormState};
use crate::error::Error;
use crate::http::Transport;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Grid control identity used for page-advance postbacks
#[derive(Debug, Clone)]
pub struct PagerSettings {
    /// Fully-qualified control id of the grid widget that owns pagination
    pub event_target: String,
}

impl Default for PagerSettings {
    fn default() -> Self {
        Self {
            event_target: "ctl00$ContentPlaceHolder1$gvData".to_string(),
        }
    }
}

/// The protocol state machine driving one scrape run
///
/// States: `Init → FirstFetch → (OptionalFilteredFetch) → PageLoop → Done`.
/// There is no backward transition; pages are fetched strictly in increasing
/// order, each request built from the form state of the previous response.
pub struct PaginationController<'a, T: Transport + ?Sized> {
    transport: &'a T,
    target_url: String,
    settings: PagerSettings,
}

impl<'a, T: Transport + ?Sized> PaginationController<'a, T> {
    /// Create a controller for the given target URL
    pub fn new(transport: &'a T, target_url: impl Into<String>) -> Self {
        Self {
            transport,
            target_url: target_url.into(),
            settings: PagerSettings::default(),
        }
    }

    /// Override the pager settings
    #[must_use]
    pub fn with_settings(mut self, settings: PagerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Fetch every page of the grid
    ///
    /// `filters` are submitted once as a search-form POST before any
    /// pagination occurs. A failure mid-run returns a [`RunError`] carrying
    /// the pages already collected.
    pub async fn run(
        &self,
        filters: Option<&BTreeMap<String, String>>,
    ) -> Result<RunReport, RunError> {
        let mut pages: Vec<String> = Vec::new();
        let mut requests = 0u32;

        // FirstFetch: an unconditional GET whose only purpose is obtaining a
        // valid view-state/event-validation pair to echo on the first postback.
        debug!(url = %self.target_url, "fetching initial page");
        let first = match self.transport.get(&self.target_url).await {
            Ok(resp) => resp,
            Err(e) => return Err(RunError::new(pages, e)),
        };
        requests += 1;

        let mut form_state = extract_form_state(&first.body);
        if !form_state.has_view_state() {
            return Err(RunError::new(
                pages,
                Error::malformed("initial fetch carries no view-state token"),
            ));
        }
        let mut current = first.body;

        // OptionalFilteredFetch: submit the search form exactly once.
        if let Some(filters) = filters {
            debug!(fields = filters.len(), "submitting filter form");
            let body = postback_body("", "", &form_state, Some(filters));
            let resp = match self.transport.post_form(&self.target_url, &body).await {
                Ok(resp) => resp,
                Err(e) => return Err(RunError::new(pages, e)),
            };
            requests += 1;
            form_state = extract_form_state(&resp.body);
            current = resp.body;
        }

        pages.push(current.clone());
        let mut state = PaginationState::new(form_state, extract_page_signature(&current));

        // PageLoop: advance while the current document shows evidence of a
        // next page; stop authoritatively on duplicate content.
        let termination = loop {
            if !has_next_page(&current, state.page) {
                break Termination::NoNextPage;
            }
            state.advance();

            debug!(page = state.page, "advancing to next page");
            let body = postback_body(
                &self.settings.event_target,
                &format!("Page${}", state.page),
                &state.form_state,
                None,
            );
            let resp = match self.transport.post_form(&self.target_url, &body).await {
                Ok(resp) => resp,
                Err(e) => return Err(RunError::new(pages, e)),
            };
            requests += 1;

            let signature = extract_page_signature(&resp.body);
            if signature == state.previous_signature {
                info!(
                    "duplicate content on page {}, stopping at page {}",
                    state.page,
                    state.page - 1
                );
                break Termination::DuplicatePage;
            }

            state.form_state.merge(extract_form_state(&resp.body));
            current = resp.body;
            pages.push(current.clone());
            state.previous_signature = signature;
        };

        info!(
            pages = pages.len(),
            requests, "pagination run complete"
        );
        Ok(RunReport {
            pages,
            termination,
            requests,
        })
    }
}

/// Build a URL-encoded postback body
///
/// Always contains `__EVENTTARGET`, `__EVENTARGUMENT`, and `__LASTFOCUS`,
/// plus every known form-state field, plus any caller-supplied extras.
/// Extras override state fields of the same name.
pub fn postback_body(
    event_target: &str,
    event_argument: &str,
    state: &FormState,
    extra: Option<&BTreeMap<String, String>>,
) -> Vec<(String, String)> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    fields.insert("__EVENTTARGET".to_string(), event_target.to_string());
    fields.insert("__EVENTARGUMENT".to_string(), event_argument.to_string());
    fields.insert("__LASTFOCUS".to_string(), String::new());

    for (key, value) in state {
        fields.insert(key.clone(), value.clone());
    }
    if let Some(extra) = extra {
        for (key, value) in extra {
            fields.insert(key.clone(), value.clone());
        }
    }

    fields.into_iter().collect()
}
