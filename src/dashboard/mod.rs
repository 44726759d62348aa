//! Orchestrator: fans out the four panel pipelines and drives refreshes
//!
//! A full load runs every pipeline concurrently inside one task and waits for
//! all of them. Pipelines share nothing but the sink, and each writes only its
//! own panel, so a slow or broken source never holds back another panel.

pub mod state;

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::DaybriefConfig;
use crate::location::{LocationProvider, locate};
use crate::models::{Location, NewsCategory};
use crate::resilient::{Sourced, Tier};
use crate::services::Services;

pub use state::{
    DashboardState, NewsPanel, Notification, NotificationLevel, PanelContent, PanelKind,
    PanelSink, PanelState, Snapshot,
};

const PANEL_ERROR: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Offline,
}

/// Requests delivered to the refresh loop
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Manual full refresh
    RefreshAll,
    RefreshPanel(PanelKind),
    /// Category selector changed
    NewsCategory(NewsCategory),
    /// Weather for a position supplied by the browser
    WeatherAt(Location),
    Connectivity(Connectivity),
}

/// Terminal state reached by one panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PanelOutcome {
    Rendered { tier: Tier },
    Failed { message: String },
}

/// Result of a full load, one entry per panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub weather: PanelOutcome,
    pub news: PanelOutcome,
    pub quote: PanelOutcome,
    pub activity: PanelOutcome,
}

pub struct Dashboard<S, L> {
    services: Services,
    sink: S,
    locator: L,
    default_location: Location,
    geolocation_budget: Duration,
    refresh_interval: Duration,
    news_category: NewsCategory,
    /// Position last reported by the browser, preferred over geolocation
    last_location: Option<Location>,
    online: bool,
}

impl<S: PanelSink, L: LocationProvider> Dashboard<S, L> {
    #[must_use]
    pub fn new(services: Services, sink: S, locator: L, config: &DaybriefConfig) -> Self {
        let news_category = services.news.default_category();
        Self {
            services,
            sink,
            locator,
            default_location: Location::from(&config.location),
            geolocation_budget: Duration::from_secs(
                config.location.geolocation_timeout_seconds.into(),
            ),
            refresh_interval: Duration::from_secs(config.refresh.interval_seconds),
            news_category,
            last_location: None,
            online: true,
        }
    }

    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[must_use]
    pub fn news_category(&self) -> NewsCategory {
        self.news_category
    }

    /// Refresh every panel and wait until each one reaches a terminal state
    pub async fn load_all(&self) -> LoadReport {
        let started = std::time::Instant::now();
        info!("Loading all panels");

        let (weather, news, quote, activity) = futures::join!(
            self.load_weather(),
            self.load_news(self.news_category),
            self.load_quote(),
            self.load_activity(),
        );

        self.sink.load_finished(Utc::now());
        info!(
            "All panels loaded in {:.3}s",
            started.elapsed().as_secs_f64()
        );

        LoadReport {
            weather,
            news,
            quote,
            activity,
        }
    }

    /// Refresh the weather panel at the last browser position, else
    /// geolocate within the budget
    pub async fn load_weather(&self) -> PanelOutcome {
        self.sink.set_loading(PanelKind::Weather);
        let location = match &self.last_location {
            Some(location) => location.clone(),
            None => {
                locate(
                    &self.locator,
                    self.geolocation_budget,
                    &self.default_location,
                )
                .await
            }
        };
        self.render_weather(&location).await
    }

    /// Refresh the weather panel for an explicit position
    pub async fn load_weather_at(&self, location: &Location) -> PanelOutcome {
        self.sink.set_loading(PanelKind::Weather);
        self.render_weather(location).await
    }

    async fn render_weather(&self, location: &Location) -> PanelOutcome {
        let fetched = self.services.weather.fetch(location);
        self.finish(PanelKind::Weather, fetched, PanelContent::Weather)
            .await
    }

    pub async fn load_news(&self, category: NewsCategory) -> PanelOutcome {
        self.sink.select_category(category);
        self.sink.set_loading(PanelKind::News);
        let fetched = self.services.news.fetch(category);
        self.finish(PanelKind::News, fetched, |articles| {
            PanelContent::News(NewsPanel { category, articles })
        })
        .await
    }

    pub async fn load_quote(&self) -> PanelOutcome {
        self.sink.set_loading(PanelKind::Quote);
        let fetched = self.services.quote.fetch();
        self.finish(PanelKind::Quote, fetched, PanelContent::Quote)
            .await
    }

    pub async fn load_activity(&self) -> PanelOutcome {
        self.sink.set_loading(PanelKind::Activity);
        let fetched = self.services.activity.fetch();
        self.finish(PanelKind::Activity, fetched, PanelContent::Activity)
            .await
    }

    /// Await one pipeline and write its result to the panel. A panicking
    /// pipeline is contained here and shown as the panel's error block.
    async fn finish<T, F>(
        &self,
        kind: PanelKind,
        fetched: impl Future<Output = Sourced<T>>,
        wrap: F,
    ) -> PanelOutcome
    where
        F: FnOnce(T) -> PanelContent,
    {
        match AssertUnwindSafe(fetched).catch_unwind().await {
            Ok(Sourced { value, tier }) => {
                self.sink.render(tier, wrap(value));
                info!(panel = %kind, %tier, "Panel rendered");
                PanelOutcome::Rendered { tier }
            }
            Err(_) => {
                error!(panel = %kind, "Panel pipeline panicked");
                self.sink.fail(kind, PANEL_ERROR.to_string());
                PanelOutcome::Failed {
                    message: PANEL_ERROR.to_string(),
                }
            }
        }
    }

    async fn load_panel(&self, kind: PanelKind) -> PanelOutcome {
        match kind {
            PanelKind::Weather => self.load_weather().await,
            PanelKind::News => self.load_news(self.news_category).await,
            PanelKind::Quote => self.load_quote().await,
            PanelKind::Activity => self.load_activity().await,
        }
    }

    /// Apply one event
    pub async fn handle(&mut self, event: DashboardEvent) {
        debug!(?event, "Handling dashboard event");
        match event {
            DashboardEvent::RefreshAll => {
                self.load_all().await;
            }
            DashboardEvent::RefreshPanel(kind) => {
                self.load_panel(kind).await;
            }
            DashboardEvent::NewsCategory(category) => {
                self.news_category = category;
                self.load_news(category).await;
            }
            DashboardEvent::WeatherAt(location) => {
                self.load_weather_at(&location).await;
                self.last_location = Some(location);
            }
            DashboardEvent::Connectivity(Connectivity::Offline) => {
                self.online = false;
                info!("Network went offline");
                self.sink.notify(Notification::new(
                    "You are offline. Some features may not work.",
                    NotificationLevel::Warning,
                ));
            }
            DashboardEvent::Connectivity(Connectivity::Online) => {
                self.online = true;
                info!("Network back online");
                self.sink.notify(Notification::new(
                    "Back online! Refreshing data...",
                    NotificationLevel::Success,
                ));
                self.load_all().await;
            }
        }
    }

    /// Initial load, then serve events and the periodic refresh until the
    /// event channel closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<DashboardEvent>) {
        self.load_all().await;

        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.refresh_interval, self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => {
                        info!("Event channel closed, stopping refresh loop");
                        break;
                    }
                },
                _ = ticker.tick() => {
                    if self.online {
                        info!("Periodic refresh");
                        self.load_all().await;
                    } else {
                        debug!("Offline, skipping periodic refresh");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::NoGeolocation;
    use crate::models::Quote;
    use std::sync::{Arc, Mutex};

    /// Records every sink call in order
    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
        notes: Mutex<Vec<Notification>>,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn renders(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| c.starts_with("render:"))
                .count()
        }
    }

    impl PanelSink for RecordingSink {
        fn set_loading(&self, kind: PanelKind) {
            self.calls.lock().unwrap().push(format!("loading:{kind}"));
        }

        fn render(&self, tier: Tier, content: PanelContent) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("render:{}:{tier}", content.kind()));
        }

        fn fail(&self, kind: PanelKind, message: String) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("fail:{kind}:{message}"));
        }

        fn notify(&self, notification: Notification) {
            self.notes.lock().unwrap().push(notification);
        }

        fn select_category(&self, category: NewsCategory) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("category:{category}"));
        }
    }

    /// Lets a test keep reading the sink while `run` owns the dashboard
    impl PanelSink for Arc<RecordingSink> {
        fn set_loading(&self, kind: PanelKind) {
            self.as_ref().set_loading(kind);
        }

        fn render(&self, tier: Tier, content: PanelContent) {
            self.as_ref().render(tier, content);
        }

        fn fail(&self, kind: PanelKind, message: String) {
            self.as_ref().fail(kind, message);
        }

        fn notify(&self, notification: Notification) {
            self.as_ref().notify(notification);
        }
    }

    /// Every endpoint points at a closed local port
    fn offline_config() -> DaybriefConfig {
        let dead = "http://127.0.0.1:9";
        let mut config = DaybriefConfig::default();
        config.weather.base_url = dead.to_string();
        config.weather.fallback_url = dead.to_string();
        config.news.base_url = dead.to_string();
        config.news.fallback_url = dead.to_string();
        config.quote.base_url = dead.to_string();
        config.activity.base_url = dead.to_string();
        config.http.timeout_seconds = 2;
        config
    }

    fn dashboard() -> Dashboard<RecordingSink, NoGeolocation> {
        let config = offline_config();
        let services = Services::from_config(&config).unwrap();
        Dashboard::new(services, RecordingSink::default(), NoGeolocation, &config)
    }

    #[tokio::test]
    async fn test_load_all_falls_back_to_samples() {
        let dashboard = dashboard();
        let report = dashboard.load_all().await;

        let sample = PanelOutcome::Rendered { tier: Tier::Sample };
        assert_eq!(report.weather, sample);
        assert_eq!(report.news, sample);
        assert_eq!(report.quote, sample);
        assert_eq!(report.activity, sample);

        let calls = dashboard.sink().calls();
        for kind in PanelKind::ALL {
            let loading = calls.iter().position(|c| *c == format!("loading:{kind}"));
            let rendered = calls
                .iter()
                .position(|c| *c == format!("render:{kind}:sample"));
            assert!(loading.unwrap() < rendered.unwrap(), "{kind}: {calls:?}");
        }
    }

    async fn exploding_quote() -> Sourced<Quote> {
        panic!("boom")
    }

    #[tokio::test]
    async fn test_panic_in_pipeline_fails_only_that_panel() {
        let dashboard = dashboard();
        let outcome = dashboard
            .finish(PanelKind::Quote, exploding_quote(), PanelContent::Quote)
            .await;

        assert_eq!(
            outcome,
            PanelOutcome::Failed {
                message: PANEL_ERROR.to_string()
            }
        );
        assert_eq!(
            dashboard.sink().calls(),
            vec![format!("fail:quote:{PANEL_ERROR}")]
        );
    }

    #[tokio::test]
    async fn test_offline_notifies_without_fetching() {
        let mut dashboard = dashboard();
        dashboard
            .handle(DashboardEvent::Connectivity(Connectivity::Offline))
            .await;

        assert!(dashboard.sink().calls().is_empty());
        let notes = dashboard.sink().notes.lock().unwrap().clone();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, "You are offline. Some features may not work.");
        assert_eq!(notes[0].level, NotificationLevel::Warning);
    }

    #[tokio::test]
    async fn test_back_online_refreshes_everything() {
        let mut dashboard = dashboard();
        dashboard
            .handle(DashboardEvent::Connectivity(Connectivity::Offline))
            .await;
        dashboard
            .handle(DashboardEvent::Connectivity(Connectivity::Online))
            .await;

        let notes = dashboard.sink().notes.lock().unwrap().clone();
        assert_eq!(notes[1].message, "Back online! Refreshing data...");
        assert_eq!(notes[1].level, NotificationLevel::Success);
        let renders = dashboard
            .sink()
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("render:"))
            .count();
        assert_eq!(renders, 4);
    }

    #[tokio::test]
    async fn test_category_change_is_remembered() {
        let mut dashboard = dashboard();
        assert_eq!(dashboard.news_category(), NewsCategory::General);

        dashboard
            .handle(DashboardEvent::NewsCategory(NewsCategory::Science))
            .await;

        assert_eq!(dashboard.news_category(), NewsCategory::Science);
        assert_eq!(
            dashboard.sink().calls(),
            vec![
                "category:science".to_string(),
                "loading:news".to_string(),
                "render:news:sample".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_full_load_reports_the_current_category() {
        let config = offline_config();
        let state = DashboardState::new();
        let mut dashboard = Dashboard::new(
            Services::from_config(&config).unwrap(),
            state.clone(),
            NoGeolocation,
            &config,
        );
        dashboard
            .handle(DashboardEvent::NewsCategory(NewsCategory::Health))
            .await;
        dashboard.load_all().await;

        assert_eq!(state.snapshot().news_category, NewsCategory::Health);
    }

    #[tokio::test]
    async fn test_browser_position_is_kept_for_later_refreshes() {
        let mut dashboard = dashboard();
        let munich = Location::new(48.14, 11.58, "Your Location");
        dashboard
            .handle(DashboardEvent::WeatherAt(munich.clone()))
            .await;

        assert_eq!(dashboard.last_location, Some(munich));
    }

    #[tokio::test]
    async fn test_single_panel_refresh_touches_only_that_panel() {
        let mut dashboard = dashboard();
        dashboard
            .handle(DashboardEvent::RefreshPanel(PanelKind::Activity))
            .await;
        assert_eq!(
            dashboard.sink().calls(),
            vec![
                "loading:activity".to_string(),
                "render:activity:sample".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_run_stops_when_channel_closes() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(DashboardEvent::RefreshPanel(PanelKind::Quote))
            .await
            .unwrap();
        drop(tx);

        dashboard()
            .with_refresh_interval(Duration::from_secs(3600))
            .run(rx)
            .await;
    }

    async fn wait_for_renders(sink: &RecordingSink, expected: usize) {
        for _ in 0..1000 {
            if sink.renders() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {expected} renders, got {:?}", sink.calls());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_skips_ticks_while_offline() {
        let config = offline_config();
        let sink = Arc::new(RecordingSink::default());
        let dashboard = Dashboard::new(
            Services::from_config(&config).unwrap(),
            Arc::clone(&sink),
            NoGeolocation,
            &config,
        )
        .with_refresh_interval(Duration::from_secs(60));
        let (tx, rx) = mpsc::channel(4);
        let running = tokio::spawn(dashboard.run(rx));

        wait_for_renders(&sink, 4).await;
        tx.send(DashboardEvent::Connectivity(Connectivity::Offline))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(150)).await;

        assert_eq!(sink.renders(), 4, "{:?}", sink.calls());
        let warned = sink
            .notes
            .lock()
            .unwrap()
            .iter()
            .any(|n| n.level == NotificationLevel::Warning);
        assert!(warned);

        tx.send(DashboardEvent::Connectivity(Connectivity::Online))
            .await
            .unwrap();
        wait_for_renders(&sink, 8).await;

        // Ticks resume once back online
        tokio::time::sleep(Duration::from_secs(60)).await;
        wait_for_renders(&sink, 12).await;

        drop(tx);
        running.await.unwrap();
    }
}
