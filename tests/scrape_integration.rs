//! End-to-end pipeline tests against a mock WebForms server

use gridscrape::config::{HttpSettings, OutputSettings, RunConfig};
use gridscrape::error::Error;
use gridscrape::{ScrapeEngine, Termination};
use std::collections::BTreeMap;
use std::path::PathBuf;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A grid page with the full eight-column schedule layout
fn schedule_page(viewstate: &str, rows: &[(&str, &str)], next_page: Option<u32>) -> String {
    let row_html: String = rows
        .iter()
        .map(|(date, course)| {
            format!(
                "<tr class=\"GridRow\"><td>{date}</td><td>ג'</td><td>09:00</td><td>10:30</td>\
                 <td>{course}</td><td>ד\"ר כהן</td><td>101</td><td></td></tr>"
            )
        })
        .collect();
    let pager = match next_page {
        Some(n) => format!(
            "<tr class=\"GridPager\"><td colspan=\"8\"><table><tr><td>\
             <a href=\"javascript:__doPostBack('ctl00$ContentPlaceHolder1$gvData','Page${n}')\">{n}</a>\
             </td></tr></table></td></tr>"
        ),
        None => String::new(),
    };
    format!(
        r#"<html><body><form method="post" action="./Schedule.aspx">
<input type="hidden" name="__VIEWSTATE" value="{viewstate}" />
<input type="hidden" name="__EVENTVALIDATION" value="ev-{viewstate}" />
<table class="GridView" id="ContentPlaceHolder1_gvData">
<tr class="GridHeader"><th>תאריך</th><th>יום</th><th>התחלה</th><th>סיום</th><th>שם</th><th>מרצים</th><th>חדר</th><th>הערה</th></tr>
{row_html}
{pager}
</table>
</form></body></html>"#
    )
}

fn run_config(server_uri: &str, output_dir: PathBuf) -> RunConfig {
    let mut cookies = BTreeMap::new();
    cookies.insert("BCI_OL_KEY".to_string(), "test-session".to_string());

    RunConfig {
        url: format!("{server_uri}/Schedule.aspx"),
        cookies,
        form_data: None,
        event_target: "ctl00$ContentPlaceHolder1$gvData".to_string(),
        http: HttpSettings {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            max_retries: 1,
            requests_per_second: 1000,
        },
        output: OutputSettings {
            dir: output_dir,
            calendar_name: "Test Calendar".to_string(),
            timezone: "Asia/Jerusalem".to_string(),
        },
        login: None,
        rules_file: None,
    }
}

#[tokio::test]
async fn test_full_pipeline_over_two_pages() {
    let server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();

    // Session cookie must travel on every request
    Mock::given(method("GET"))
        .and(path("/Schedule.aspx"))
        .and(header("cookie", "BCI_OL_KEY=test-session"))
        .respond_with(ResponseTemplate::new(200).set_body_string(schedule_page(
            "v1",
            &[("01/09/2025", "אלגברה")],
            Some(2),
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Schedule.aspx"))
        .and(body_string_contains("__EVENTARGUMENT=Page%242"))
        .and(body_string_contains("__VIEWSTATE=v1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(schedule_page(
            "v2",
            &[("02/09/2025", "לוגיקה")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = run_config(&server.uri(), out.path().to_path_buf());
    let engine = ScrapeEngine::new(config).unwrap();
    let report = engine.run().await.unwrap();

    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.records_extracted, 2);
    assert_eq!(report.termination, Termination::NoNextPage);

    // All three artifacts are on disk
    assert!(out.path().join("html/page_001.html").exists());
    assert!(out.path().join("html/page_002.html").exists());

    let records_json = std::fs::read_to_string(out.path().join("json/classes.json")).unwrap();
    let records: serde_json::Value = serde_json::from_str(&records_json).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 2);

    let ics = std::fs::read_to_string(out.path().join("calendar.ics")).unwrap();
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    assert!(ics.contains("DTSTART:20250901T090000"));
    assert!(ics.contains("DTSTART:20250902T090000"));
}

#[tokio::test]
async fn test_partial_pages_are_persisted_when_a_fetch_fails() {
    let server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/Schedule.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(schedule_page(
            "v1",
            &[("01/09/2025", "אלגברה")],
            Some(2),
        )))
        .mount(&server)
        .await;

    // Every page-advance attempt fails hard
    Mock::given(method("POST"))
        .and(path("/Schedule.aspx"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let config = run_config(&server.uri(), out.path().to_path_buf());
    let engine = ScrapeEngine::new(config).unwrap();
    let err = engine.fetch_pages().await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    // The page collected before the failure was saved for the caller
    assert!(out.path().join("html/page_001.html").exists());
    assert!(!out.path().join("html/page_002.html").exists());
}

#[tokio::test]
async fn test_expired_session_aborts_before_any_page_is_fetched() {
    let server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();

    // An expired session answers 200 with the login page
    Mock::given(method("GET"))
        .and(path("/Schedule.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><form action="./Login.aspx">
<input type="text" name="ctl00$ContentPlaceHolder1$edtUsername" />
</form></body></html>"#,
        ))
        .mount(&server)
        .await;

    let config = run_config(&server.uri(), out.path().to_path_buf());
    let engine = ScrapeEngine::new(config).unwrap();
    let err = engine.run().await.unwrap_err();

    assert!(matches!(err, Error::Session { .. }));
    assert!(!out.path().join("html").exists());
}
