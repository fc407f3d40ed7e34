// src/controller.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{ControllerOptions, QueryRetention};
use crate::coordinate::{Coordinate, Region};
use crate::geocoding::{Geocoder, SearchResult};
use crate::location::{LocationProvider, PermissionStatus};
use crate::map::{MapDisplay, Marker, MarkerKind};
use crate::report::{ConditionKind, Reporter};

/// What a controller operation did to the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// The center moved to this coordinate and the camera was animated.
    Moved(Coordinate),
    /// Nothing changed; the condition was reported.
    Unchanged(ConditionKind),
    /// The operation succeeded, but a newer one had been issued meanwhile, so
    /// its result was dropped.
    Superseded,
}

#[derive(Debug)]
struct ControllerState {
    current_center: Coordinate,
    query_text: String,
    last_result: Option<SearchResult>,
}

/// Owns the map center and the search box, and moves the map on request.
///
/// Each action (a search submission or a location-button press) takes a
/// token from one shared counter before it suspends. When it resumes, it
/// applies its result only if no newer action has been issued since, so the
/// most recently started action always wins, whatever order the network
/// answers in. In-flight requests are never cancelled.
///
/// Non-fatal conditions go to the injected [`Reporter`]; no operation returns
/// an error.
pub struct LocationSearchController {
    geocoder: Arc<dyn Geocoder>,
    location: Arc<dyn LocationProvider>,
    map: Arc<dyn MapDisplay>,
    reporter: Arc<dyn Reporter>,
    options: ControllerOptions,
    state: Mutex<ControllerState>,
    latest_token: AtomicU64,
}

impl LocationSearchController {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        location: Arc<dyn LocationProvider>,
        map: Arc<dyn MapDisplay>,
        reporter: Arc<dyn Reporter>,
        options: ControllerOptions,
    ) -> Self {
        LocationSearchController {
            geocoder,
            location,
            map,
            reporter,
            options,
            state: Mutex::new(ControllerState {
                current_center: options.initial_center,
                query_text: String::new(),
                last_result: None,
            }),
            latest_token: AtomicU64::new(0),
        }
    }

    // The state is plain data, so a poisoned lock is still usable.
    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue_token(&self) -> u64 {
        self.latest_token.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_center(&self) -> Coordinate {
        self.state().current_center
    }

    pub fn region(&self) -> Region {
        Region::around(self.current_center())
    }

    pub fn query_text(&self) -> String {
        self.state().query_text.clone()
    }

    pub fn set_query_text(&self, text: &str) {
        self.state().query_text = text.to_string();
    }

    pub fn last_result(&self) -> Option<SearchResult> {
        self.state().last_result.clone()
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Markers to render: the center, plus the latest search result if any.
    pub fn markers(&self) -> Vec<Marker> {
        let state = self.state();
        let mut markers = vec![Marker {
            kind: MarkerKind::Center,
            coordinate: state.current_center,
        }];
        if let Some(result) = &state.last_result {
            markers.push(Marker {
                kind: MarkerKind::SearchResult,
                coordinate: result.coordinate,
            });
        }
        markers
    }

    /// Centers the map on the device's current position.
    pub async fn request_device_location(&self) -> Outcome {
        let token = self.issue_token();
        log::debug!("Location request #{} started", token);

        if self.location.request_permission().await == PermissionStatus::Denied {
            self.reporter.report(
                ConditionKind::PermissionDenied,
                "foreground location permission was denied",
            );
            return Outcome::Unchanged(ConditionKind::PermissionDenied);
        }

        match self.location.current_position().await {
            Ok(position) => self.apply(token, position, None),
            Err(e) => {
                let kind = match e.condition() {
                    ConditionKind::PermissionDenied => ConditionKind::PermissionDenied,
                    _ => ConditionKind::LocationUnavailable,
                };
                self.reporter
                    .report(kind, &format!("could not read current position: {}", e));
                Outcome::Unchanged(kind)
            }
        }
    }

    /// Geocodes `text` and centers the map on the first match.
    ///
    /// The text is sent exactly as given, empty or not.
    pub async fn submit_search(&self, text: &str) -> Outcome {
        let token = self.issue_token();
        let query = text.to_string();
        log::debug!("Search #{} started for {:?}", token, query);

        let outcome = match self.geocoder.search(query.clone()).await {
            Ok(Some(found)) => self.apply(token, found.coordinate, Some(found)),
            Ok(None) => {
                self.reporter.report(
                    ConditionKind::NoResultsFound,
                    &format!("no location found for {:?}", query),
                );
                Outcome::Unchanged(ConditionKind::NoResultsFound)
            }
            Err(e) => {
                let kind = e.condition();
                self.reporter
                    .report(kind, &format!("searching for {:?} failed: {}", query, e));
                Outcome::Unchanged(kind)
            }
        };

        self.retain_query(token, &outcome);
        outcome
    }

    /// Submits whatever is currently in the search box.
    pub async fn submit_current_query(&self) -> Outcome {
        let text = self.query_text();
        self.submit_search(&text).await
    }

    fn apply(&self, token: u64, center: Coordinate, result: Option<SearchResult>) -> Outcome {
        {
            let mut state = self.state();
            let latest = self.latest_token.load(Ordering::SeqCst);
            if latest != token {
                log::debug!(
                    "Dropping result of request #{}; request #{} is newer",
                    token,
                    latest
                );
                return Outcome::Superseded;
            }
            state.current_center = center;
            if result.is_some() {
                state.last_result = result;
            }
        }

        // Called without the state lock held so the map may read the controller back.
        self.map.animate_to_region(Region::around(center));
        log::debug!(
            "Request #{} moved the map to ({}, {})",
            token,
            center.latitude(),
            center.longitude()
        );
        Outcome::Moved(center)
    }

    // Only the latest action may touch the search box, whether it moved the map or not.
    fn retain_query(&self, token: u64, outcome: &Outcome) {
        let clear = match (self.options.query_retention, outcome) {
            (QueryRetention::Keep, _) => false,
            (_, Outcome::Superseded) => false,
            (QueryRetention::ClearOnSuccess, Outcome::Moved(_)) => true,
            (QueryRetention::ClearOnSuccess, Outcome::Unchanged(_)) => false,
            (QueryRetention::ClearAlways, _) => true,
        };
        if !clear {
            return;
        }

        let mut state = self.state();
        let latest = self.latest_token.load(Ordering::SeqCst);
        if latest != token {
            log::debug!(
                "Keeping query text: search #{} is stale, request #{} is newer",
                token,
                latest
            );
            return;
        }
        state.query_text.clear();
    }
}
