use mapnav::{
    ConditionKind, ControllerOptions, Coordinate, Geocoder, LocationProvider,
    LocationSearchController, MapError, MarkerKind, MemoryReporter, Outcome, QueryRetention,
};
use std::sync::Arc;

use test_utils::initialize_logger_once;
use test_utils::shared::{
    CannedGeocoder, FailingGeocoder, FakeLocation, GatedGeocoder, RecordingMap,
};

const MUMBAI: &str = r#"[{"lat":"19.07","lon":"72.87","display_name":"Mumbai, Maharashtra, India"}]"#;
const DELHI: &str = r#"[{"lat":"28.61","lon":"77.20"}]"#;

struct Harness {
    controller: LocationSearchController,
    map: Arc<RecordingMap>,
    reporter: Arc<MemoryReporter>,
}

fn harness(
    geocoder: Arc<dyn Geocoder>,
    location: Arc<dyn LocationProvider>,
    options: ControllerOptions,
) -> Harness {
    initialize_logger_once();
    let map = Arc::new(RecordingMap::default());
    let reporter = Arc::new(MemoryReporter::new());
    let controller =
        LocationSearchController::new(geocoder, location, map.clone(), reporter.clone(), options);
    Harness {
        controller,
        map,
        reporter,
    }
}

fn with_geocoder(geocoder: CannedGeocoder) -> Harness {
    harness(
        Arc::new(geocoder),
        Arc::new(FakeLocation::granted(0.0, 0.0)),
        ControllerOptions::default(),
    )
}

#[tokio::test]
async fn starts_at_default_center_with_empty_query() {
    let h = with_geocoder(CannedGeocoder::new());
    assert_eq!(h.controller.current_center(), Coordinate::default_center());
    assert_eq!(h.controller.query_text(), "");
    assert!(h.controller.last_result().is_none());
    assert_eq!(h.controller.markers().len(), 1);
}

#[tokio::test]
async fn search_moves_to_first_result() {
    let geocoder = CannedGeocoder::new().respond("Mumbai", MUMBAI);
    let h = with_geocoder(geocoder);

    let outcome = h.controller.submit_search("Mumbai").await;

    let expected = Coordinate::new(19.07, 72.87).unwrap();
    assert_eq!(outcome, Outcome::Moved(expected));
    assert_eq!(h.controller.current_center(), expected);
    assert!(h.reporter.reports().is_empty());

    let regions = h.map.regions();
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].center, expected);
    assert_eq!(regions[0].latitude_delta, 0.0922);
    assert_eq!(regions[0].longitude_delta, 0.0421);

    let result = h.controller.last_result().expect("search result kept");
    assert_eq!(
        result.display_name.as_deref(),
        Some("Mumbai, Maharashtra, India")
    );
}

#[tokio::test]
async fn only_the_first_element_counts() {
    let body = r#"[{"lat":"48.85","lon":"2.35"},{"lat":"33.66","lon":"-95.55"}]"#;
    let h = with_geocoder(CannedGeocoder::new().respond("Paris", body));

    h.controller.submit_search("Paris").await;

    assert_eq!(
        h.controller.current_center(),
        Coordinate::new(48.85, 2.35).unwrap()
    );
}

#[tokio::test]
async fn empty_results_leave_center_and_report() {
    let h = with_geocoder(CannedGeocoder::new().respond("zzzNoSuchPlacezzz", "[]"));

    let outcome = h.controller.submit_search("zzzNoSuchPlacezzz").await;

    assert_eq!(outcome, Outcome::Unchanged(ConditionKind::NoResultsFound));
    assert_eq!(h.controller.current_center(), Coordinate::default_center());
    assert_eq!(h.reporter.kinds(), vec![ConditionKind::NoResultsFound]);
    assert!(h.map.regions().is_empty());
}

#[tokio::test]
async fn malformed_bodies_leave_center_and_report() {
    let geocoder = CannedGeocoder::new()
        .respond("html", "<html>Service Unavailable</html>")
        .respond("no-lon", r#"[{"lat":"19.07"}]"#)
        .respond("garbage-lat", r#"[{"lat":"abc","lon":"72.87"}]"#);
    let h = with_geocoder(geocoder);

    for query in ["html", "no-lon", "garbage-lat"] {
        let outcome = h.controller.submit_search(query).await;
        assert_eq!(outcome, Outcome::Unchanged(ConditionKind::SearchFailed));
    }

    assert_eq!(h.controller.current_center(), Coordinate::default_center());
    assert_eq!(h.reporter.kinds(), vec![ConditionKind::SearchFailed; 3]);
    assert!(h.map.regions().is_empty());
    assert!(h.controller.last_result().is_none());
}

#[tokio::test]
async fn transport_failure_reports_search_failed() {
    // No canned body: the fake answers with an HTTP 500 error.
    let h = with_geocoder(CannedGeocoder::new());

    let outcome = h.controller.submit_search("anything").await;

    assert_eq!(outcome, Outcome::Unchanged(ConditionKind::SearchFailed));
    let reports = h.reporter.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].detail.contains("anything"));
}

#[tokio::test]
async fn geocoder_errors_report_their_own_condition() {
    let h = harness(
        Arc::new(FailingGeocoder::new(|query| {
            MapError::NoResultsFound(query.to_string())
        })),
        Arc::new(FakeLocation::granted(0.0, 0.0)),
        ControllerOptions::default(),
    );

    let outcome = h.controller.submit_search("Atlantis").await;

    assert_eq!(outcome, Outcome::Unchanged(ConditionKind::NoResultsFound));
    assert_eq!(h.reporter.kinds(), vec![ConditionKind::NoResultsFound]);
    assert!(h.reporter.reports()[0].detail.contains("Atlantis"));
    assert_eq!(h.controller.current_center(), Coordinate::default_center());
}

#[tokio::test]
async fn position_permission_error_reports_permission_denied() {
    let h = harness(
        Arc::new(CannedGeocoder::new()),
        Arc::new(FakeLocation::revoked()),
        ControllerOptions::default(),
    );

    let outcome = h.controller.request_device_location().await;

    assert_eq!(outcome, Outcome::Unchanged(ConditionKind::PermissionDenied));
    assert_eq!(h.reporter.kinds(), vec![ConditionKind::PermissionDenied]);
}

#[tokio::test]
async fn empty_query_is_forwarded_unchanged() {
    let geocoder = Arc::new(CannedGeocoder::new().respond("", "[]"));
    let h = harness(
        geocoder.clone(),
        Arc::new(FakeLocation::granted(0.0, 0.0)),
        ControllerOptions::default(),
    );

    h.controller.submit_search("").await;

    assert_eq!(geocoder.queries(), vec![String::new()]);
    assert_eq!(h.reporter.kinds(), vec![ConditionKind::NoResultsFound]);
}

#[tokio::test]
async fn repeated_search_is_idempotent() {
    let h = with_geocoder(CannedGeocoder::new().respond("Mumbai", MUMBAI));

    let first = h.controller.submit_search("Mumbai").await;
    let after_first = h.controller.current_center();
    let second = h.controller.submit_search("Mumbai").await;

    assert_eq!(first, second);
    assert_eq!(after_first, h.controller.current_center());
}

#[tokio::test]
async fn submit_current_query_uses_search_box() {
    let h = with_geocoder(CannedGeocoder::new().respond("Delhi", DELHI));

    h.controller.set_query_text("Delhi");
    let outcome = h.controller.submit_current_query().await;

    assert_eq!(outcome, Outcome::Moved(Coordinate::new(28.61, 77.20).unwrap()));
    assert_eq!(h.controller.query_text(), "Delhi");
}

#[tokio::test]
async fn query_retention_policies() {
    let geocoder = || {
        Arc::new(
            CannedGeocoder::new()
                .respond("Mumbai", MUMBAI)
                .respond("nowhere", "[]"),
        )
    };
    let location = || Arc::new(FakeLocation::granted(0.0, 0.0));

    let on_success = harness(
        geocoder(),
        location(),
        ControllerOptions::default().with_query_retention(QueryRetention::ClearOnSuccess),
    );
    on_success.controller.set_query_text("nowhere");
    on_success.controller.submit_current_query().await;
    assert_eq!(on_success.controller.query_text(), "nowhere");
    on_success.controller.set_query_text("Mumbai");
    on_success.controller.submit_current_query().await;
    assert_eq!(on_success.controller.query_text(), "");

    let always = harness(
        geocoder(),
        location(),
        ControllerOptions::default().with_query_retention(QueryRetention::ClearAlways),
    );
    always.controller.set_query_text("nowhere");
    always.controller.submit_current_query().await;
    assert_eq!(always.controller.query_text(), "");
}

#[tokio::test]
async fn device_location_moves_to_sample() {
    let h = harness(
        Arc::new(CannedGeocoder::new()),
        Arc::new(FakeLocation::granted(51.5072, -0.1276)),
        ControllerOptions::default(),
    );

    let outcome = h.controller.request_device_location().await;

    let expected = Coordinate::new(51.5072, -0.1276).unwrap();
    assert_eq!(outcome, Outcome::Moved(expected));
    assert_eq!(h.controller.current_center(), expected);
    assert_eq!(h.map.regions().len(), 1);
    assert!(h.reporter.reports().is_empty());
    // Device location does not count as a search result.
    assert!(h.controller.last_result().is_none());
}

#[tokio::test]
async fn denied_permission_reports_and_keeps_center() {
    let h = harness(
        Arc::new(CannedGeocoder::new()),
        Arc::new(FakeLocation::denied()),
        ControllerOptions::default(),
    );

    let outcome = h.controller.request_device_location().await;

    assert_eq!(outcome, Outcome::Unchanged(ConditionKind::PermissionDenied));
    assert_eq!(h.controller.current_center(), Coordinate::default_center());
    assert_eq!(h.reporter.kinds(), vec![ConditionKind::PermissionDenied]);
    assert!(h.map.regions().is_empty());
}

#[tokio::test]
async fn failed_sample_reports_location_unavailable() {
    let h = harness(
        Arc::new(CannedGeocoder::new()),
        Arc::new(FakeLocation::failing("GPS timed out")),
        ControllerOptions::default(),
    );

    let outcome = h.controller.request_device_location().await;

    assert_eq!(
        outcome,
        Outcome::Unchanged(ConditionKind::LocationUnavailable)
    );
    assert_eq!(h.controller.current_center(), Coordinate::default_center());
    assert!(h.reporter.reports()[0].detail.contains("GPS timed out"));
}

#[tokio::test]
async fn later_search_wins_when_it_finishes_first() {
    let geocoder = Arc::new(GatedGeocoder::new());
    let release_mumbai = geocoder.gate("Mumbai");
    let release_delhi = geocoder.gate("Delhi");
    let h = harness(
        geocoder,
        Arc::new(FakeLocation::granted(0.0, 0.0)),
        ControllerOptions::default(),
    );

    let (first, second, _) = tokio::join!(
        h.controller.submit_search("Mumbai"),
        h.controller.submit_search("Delhi"),
        async {
            release_delhi.send(DELHI.to_string()).unwrap();
            tokio::task::yield_now().await;
            release_mumbai.send(MUMBAI.to_string()).unwrap();
        }
    );

    let delhi = Coordinate::new(28.61, 77.20).unwrap();
    assert_eq!(first, Outcome::Superseded);
    assert_eq!(second, Outcome::Moved(delhi));
    assert_eq!(h.controller.current_center(), delhi);
    assert_eq!(h.map.regions().len(), 1);
}

#[tokio::test]
async fn stale_search_is_dropped_when_it_finishes_first() {
    let geocoder = Arc::new(GatedGeocoder::new());
    let release_mumbai = geocoder.gate("Mumbai");
    let release_delhi = geocoder.gate("Delhi");
    let h = harness(
        geocoder,
        Arc::new(FakeLocation::granted(0.0, 0.0)),
        ControllerOptions::default(),
    );

    let (first, second, _) = tokio::join!(
        h.controller.submit_search("Mumbai"),
        h.controller.submit_search("Delhi"),
        async {
            release_mumbai.send(MUMBAI.to_string()).unwrap();
            tokio::task::yield_now().await;
            release_delhi.send(DELHI.to_string()).unwrap();
        }
    );

    let delhi = Coordinate::new(28.61, 77.20).unwrap();
    assert_eq!(first, Outcome::Superseded);
    assert_eq!(second, Outcome::Moved(delhi));
    assert_eq!(h.controller.current_center(), delhi);
    assert!(h.reporter.reports().is_empty());
}

#[tokio::test]
async fn search_issued_after_location_request_wins() {
    let geocoder = Arc::new(GatedGeocoder::new());
    let release_mumbai = geocoder.gate("Mumbai");
    let (location, release_gps) = FakeLocation::granted(51.5072, -0.1276).gated();
    let h = harness(geocoder, Arc::new(location), ControllerOptions::default());

    let (located, searched, _) = tokio::join!(
        h.controller.request_device_location(),
        h.controller.submit_search("Mumbai"),
        async {
            release_mumbai.send(MUMBAI.to_string()).unwrap();
            tokio::task::yield_now().await;
            release_gps.send(()).unwrap();
        }
    );

    let mumbai = Coordinate::new(19.07, 72.87).unwrap();
    assert_eq!(searched, Outcome::Moved(mumbai));
    assert_eq!(located, Outcome::Superseded);
    assert_eq!(h.controller.current_center(), mumbai);
}

#[tokio::test]
async fn markers_include_last_search_result() {
    let geocoder = Arc::new(CannedGeocoder::new().respond("Mumbai", MUMBAI));
    let h = harness(
        geocoder,
        Arc::new(FakeLocation::granted(51.5072, -0.1276)),
        ControllerOptions::default(),
    );

    h.controller.submit_search("Mumbai").await;
    h.controller.request_device_location().await;

    let markers = h.controller.markers();
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].kind, MarkerKind::Center);
    assert_eq!(
        markers[0].coordinate,
        Coordinate::new(51.5072, -0.1276).unwrap()
    );
    assert_eq!(markers[1].kind, MarkerKind::SearchResult);
    assert_eq!(markers[1].coordinate, Coordinate::new(19.07, 72.87).unwrap());
}

#[tokio::test]
async fn stale_failed_search_keeps_newer_text() {
    let geocoder = Arc::new(GatedGeocoder::new());
    let release_atlantis = geocoder.gate("Atlantis");
    let h = harness(
        geocoder,
        Arc::new(FakeLocation::granted(51.5072, -0.1276)),
        ControllerOptions::default().with_query_retention(QueryRetention::ClearAlways),
    );

    let (searched, located, _) = tokio::join!(
        h.controller.submit_search("Atlantis"),
        h.controller.request_device_location(),
        async {
            h.controller.set_query_text("typed later");
            release_atlantis.send("[]".to_string()).unwrap();
        }
    );

    let london = Coordinate::new(51.5072, -0.1276).unwrap();
    assert_eq!(located, Outcome::Moved(london));
    assert_eq!(searched, Outcome::Unchanged(ConditionKind::NoResultsFound));
    // The failure is still reported, but it neither moves the map nor clears the box.
    assert_eq!(h.reporter.kinds(), vec![ConditionKind::NoResultsFound]);
    assert_eq!(h.controller.current_center(), london);
    assert_eq!(h.controller.query_text(), "typed later");
    assert_eq!(h.map.regions().len(), 1);
}

#[tokio::test]
async fn stale_failed_location_is_reported_without_moving() {
    let (location, release_gps) = FakeLocation::failing("GPS timed out").gated();
    let h = harness(
        Arc::new(CannedGeocoder::new().respond("Mumbai", MUMBAI)),
        Arc::new(location),
        ControllerOptions::default(),
    );
    h.controller.set_query_text("Mumbai");

    let (located, searched, _) = tokio::join!(
        h.controller.request_device_location(),
        h.controller.submit_current_query(),
        async {
            release_gps.send(()).unwrap();
        }
    );

    let mumbai = Coordinate::new(19.07, 72.87).unwrap();
    assert_eq!(searched, Outcome::Moved(mumbai));
    assert_eq!(
        located,
        Outcome::Unchanged(ConditionKind::LocationUnavailable)
    );
    assert_eq!(h.reporter.kinds(), vec![ConditionKind::LocationUnavailable]);
    assert_eq!(h.controller.current_center(), mumbai);
    assert_eq!(h.controller.query_text(), "Mumbai");
    assert_eq!(h.map.regions().len(), 1);
}
