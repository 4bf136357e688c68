//! Integration tests for the harvester
//!
//! These tests use wiremock to serve synthetic listing pages and run the
//! full fetch, parse, aggregate and store cycle end-to-end.

use dkmh_harvest::codes::{Term, TermCode};
use dkmh_harvest::config::{Config, ParserStrategy};
use dkmh_harvest::crawler::Harvester;
use dkmh_harvest::storage::{SqliteStorage, Storage};
use dkmh_harvest::HarvestError;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server_uri: &str, db_path: &str, page_size: u32) -> Config {
    let mut config = Config::default();
    config.endpoint.base_url = format!("{}/qldt", server_uri);
    config.endpoint.page_size = page_size;
    config.endpoint.request_timeout_secs = 5;
    config.endpoint.connect_timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config.output.database_path = db_path.to_string();
    config
}

fn db_path(dir: &TempDir) -> String {
    dir.path().join("database.db").to_string_lossy().to_string()
}

/// Renders one registration row the way the portal lays it out
fn row(index: usize, student_id: &str, section_code: &str, course_name: &str, credits: &str) -> String {
    format!(
        concat!(
            r#"<tr><td style="width: 20px">{}</td><td style="width: 40px">{}</td>"#,
            r#"<td style="width: 100px">Trần Thị B</td><td style="width: 60px">02/03/2004</td>"#,
            r#"<td style="width: 100px">QH-2022-I/CQ-C-A</td><td style="width: 50px">{}</td>"#,
            r#"<td style="width: 160px">{}</td><td style="width: 15px">CL</td>"#,
            r#"<td style="width: 15px">{}</td><td style="width: 60px"></td>"#,
            r#"<td style="width: 140px; display:none">{}</td></tr>"#
        ),
        index, student_id, section_code, course_name, credits, index
    )
}

/// Renders a listing page, with a count announcement when given
fn page(rows: &[String], count: Option<(u64, u64, u64)>) -> String {
    let summary = count
        .map(|(first, last, total)| format!("Kết quả từ {} tới {} trên {}.", first, last, total))
        .unwrap_or_default();
    format!(
        "<html><body><div class=\"summary\">{}</div><table class=\"items\"><tbody>{}</tbody></table></body></html>",
        summary,
        rows.join("\n")
    )
}

async fn mount_page(server: &MockServer, term_code: &str, number: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/qldt"))
        .and(query_param("SinhvienLmh[term_id]", term_code))
        .and(query_param("SinhvienLmh_page", number.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn term_code() -> TermCode {
    TermCode::compute(25, Term::First)
}

#[tokio::test]
async fn test_harvest_two_sections_of_one_course() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "044",
        1,
        page(
            &[
                row(1, "22020001", "INT2211 1", "Cơ sở dữ liệu", "4"),
                row(2, "22020002", "INT2211 2", "Cơ sở dữ liệu", "4"),
            ],
            Some((1, 2, 2)),
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &db_path(&temp_dir), 25_000);
    let mut harvester = Harvester::new(config, "test-hash".to_string()).unwrap();
    let report = harvester.run(&term_code()).await.unwrap();

    assert_eq!(report.term_code.as_str(), "044");
    assert_eq!(report.tally.pages_fetched, 1);
    assert_eq!(report.tally.records_seen, 2);
    assert_eq!(report.stored.courses, 1);
    assert_eq!(report.stored.sections, 2);
    assert_eq!(report.stored.enrolments, 2);

    let snapshot = harvester.storage().load_snapshot().unwrap();
    assert_eq!(snapshot.courses.len(), 1);
    assert_eq!(snapshot.courses[0].course_code, "INT2211");
    assert_eq!(snapshot.courses[0].course_name, "Cơ sở dữ liệu");
    assert_eq!(snapshot.courses[0].credits, Some(4));
    assert_eq!(
        snapshot
            .sections
            .iter()
            .map(|s| s.section_code.as_str())
            .collect::<Vec<_>>(),
        vec!["INT2211 1", "INT2211 2"]
    );
    assert!(snapshot
        .sections
        .iter()
        .all(|s| s.course_code == "INT2211"));

    let run = harvester.storage().get_latest_run().unwrap().unwrap();
    assert_eq!(run.term_code, "044");
    assert_eq!(run.config_hash, "test-hash");
}

#[tokio::test]
async fn test_harvest_follows_pages_until_count_reaches_total() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "044",
        1,
        page(&[row(1, "S1", "INT2211 1", "Cơ sở dữ liệu", "4")], Some((1, 25_000, 60_000))),
    )
    .await;
    mount_page(
        &mock_server,
        "044",
        2,
        page(&[row(2, "S2", "INT3103 1", "Mạng máy tính", "3")], Some((25_001, 50_000, 60_000))),
    )
    .await;
    mount_page(
        &mock_server,
        "044",
        3,
        page(&[row(3, "S3", "MAT1093 5", "Đại số", "4")], Some((50_001, 60_000, 60_000))),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &db_path(&temp_dir), 25_000);
    let mut harvester = Harvester::new(config, "hash".to_string()).unwrap();
    let report = harvester.run(&term_code()).await.unwrap();

    assert_eq!(report.tally.pages_fetched, 3);
    assert_eq!(report.stored.courses, 3);
    assert_eq!(report.stored.enrolments, 3);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests
        .iter()
        .all(|r| r.url.query_pairs().any(|(k, v)| k == "pageSize" && v == "25000")));

    // Unmatched fourth page would have failed the run with a 404
    mock_server.verify().await;
}

#[tokio::test]
async fn test_missing_count_ends_harvest() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "044",
        1,
        page(&[row(1, "S1", "INT2211 1", "Cơ sở dữ liệu", "4")], None),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &db_path(&temp_dir), 25_000);
    let mut harvester = Harvester::new(config, "hash".to_string()).unwrap();
    let report = harvester.run(&term_code()).await.unwrap();

    assert_eq!(report.tally.pages_fetched, 1);
    assert_eq!(report.stored.enrolments, 1);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_rows_across_pages_collapse() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "044",
        1,
        page(
            &[
                row(1, "S1", "INT2211 1", "Cơ sở dữ liệu", "4"),
                row(2, "S2", "INT2211 1", "Cơ sở dữ liệu", "4"),
            ],
            Some((1, 2, 4)),
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "044",
        2,
        page(
            &[
                row(3, "S1", "INT2211 1", "Cơ sở dữ liệu", "4"),
                row(4, "S3", "INT2211 1", "Cơ sở dữ liệu", "4"),
            ],
            Some((3, 4, 4)),
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &db_path(&temp_dir), 2);
    let mut harvester = Harvester::new(config, "hash".to_string()).unwrap();
    let report = harvester.run(&term_code()).await.unwrap();

    assert_eq!(report.tally.records_accepted, 4);
    assert_eq!(report.stored.enrolments, 3);

    let enrolments = harvester
        .storage()
        .get_enrolments_for_student("S1")
        .unwrap();
    assert_eq!(enrolments.len(), 1);
}

#[tokio::test]
async fn test_exempted_and_incomplete_rows_are_dropped() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "044",
        1,
        page(
            &[
                row(1, "S1", "INT2211 1", "Cơ sở dữ liệu", "4"),
                row(2, "S2", "FLF1107 mien", "Tiếng Anh B1", "5"),
                row(3, "S3", "PES1015 1", "Bóng chuyền", "1"),
                row(4, "", "INT2211 1", "Cơ sở dữ liệu", "4"),
                row(5, "S5", "", "Cơ sở dữ liệu", "4"),
            ],
            Some((1, 5, 5)),
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &db_path(&temp_dir), 25_000);
    let mut harvester = Harvester::new(config, "hash".to_string()).unwrap();
    let report = harvester.run(&term_code()).await.unwrap();

    assert_eq!(report.tally.records_seen, 5);
    assert_eq!(report.tally.records_dropped(), 4);
    assert_eq!(report.stored.courses, 1);
    assert_eq!(report.stored.enrolments, 1);
}

#[tokio::test]
async fn test_table_parser_strategy() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "044",
        1,
        page(
            &[
                row(1, "S1", "INT2211 1", "Cơ sở dữ liệu", "4"),
                row(2, "S2", "INT2211 2", "Cơ sở dữ liệu", "4"),
            ],
            Some((1, 2, 2)),
        ),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri(), &db_path(&temp_dir), 25_000);
    config.parser.strategy = ParserStrategy::Table;
    let mut harvester = Harvester::new(config, "hash".to_string()).unwrap();
    let report = harvester.run(&term_code()).await.unwrap();

    assert_eq!(report.stored.courses, 1);
    assert_eq!(report.stored.sections, 2);
    assert_eq!(report.stored.enrolments, 2);
}

#[tokio::test]
async fn test_failed_harvest_keeps_previous_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let db = db_path(&temp_dir);

    // First run succeeds
    {
        let mock_server = MockServer::start().await;
        mount_page(
            &mock_server,
            "044",
            1,
            page(&[row(1, "S1", "INT2211 1", "Cơ sở dữ liệu", "4")], Some((1, 1, 1))),
        )
        .await;

        let config = create_test_config(&mock_server.uri(), &db, 25_000);
        let mut harvester = Harvester::new(config, "hash".to_string()).unwrap();
        harvester.run(&term_code()).await.unwrap();
    }

    // Second run fails on its second page
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "044",
        1,
        page(&[row(1, "S9", "MAT1093 5", "Đại số", "4")], Some((1, 1, 2))),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/qldt"))
        .and(query_param("SinhvienLmh_page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &db, 1);
    let mut harvester = Harvester::new(config, "hash".to_string()).unwrap();
    let result = harvester.run(&term_code()).await;

    assert!(matches!(
        result,
        Err(HarvestError::HttpStatus { status: 500, .. })
    ));

    let storage = SqliteStorage::new(std::path::Path::new(&db)).unwrap();
    let snapshot = storage.load_snapshot().unwrap();
    assert_eq!(snapshot.courses.len(), 1);
    assert_eq!(snapshot.courses[0].course_code, "INT2211");
    assert_eq!(snapshot.enrolments.len(), 1);
    assert_eq!(snapshot.enrolments[0].student_id, "S1");
}

#[tokio::test]
async fn test_unreachable_server_is_an_error() {
    let temp_dir = TempDir::new().unwrap();

    // Nothing listens on a port released by a closed listener
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let config = create_test_config(&uri, &db_path(&temp_dir), 25_000);
    let mut harvester = Harvester::new(config, "hash".to_string()).unwrap();
    let result = harvester.run(&term_code()).await;

    assert!(matches!(result, Err(HarvestError::Http { .. })));
    assert!(harvester.storage().load_snapshot().unwrap().is_empty());
    assert!(harvester.storage().get_latest_run().unwrap().is_none());
}

#[tokio::test]
async fn test_empty_listing_replaces_snapshot_with_empty_one() {
    let temp_dir = TempDir::new().unwrap();
    let db = db_path(&temp_dir);

    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "044",
        1,
        page(&[row(1, "S1", "INT2211 1", "Cơ sở dữ liệu", "4")], Some((1, 1, 1))),
    )
    .await;
    let config = create_test_config(&mock_server.uri(), &db, 25_000);
    Harvester::new(config, "hash".to_string())
        .unwrap()
        .run(&term_code())
        .await
        .unwrap();

    // A term the portal does not know returns a page without rows or count
    let other_server = MockServer::start().await;
    mount_page(&other_server, "045", 1, page(&[], None)).await;
    let config = create_test_config(&other_server.uri(), &db, 25_000);
    let mut harvester = Harvester::new(config, "hash".to_string()).unwrap();
    let report = harvester
        .run(&TermCode::compute(25, Term::Second))
        .await
        .unwrap();

    assert_eq!(report.stored.enrolments, 0);
    assert!(harvester.storage().load_snapshot().unwrap().is_empty());
}
