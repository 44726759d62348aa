//! Panel states and the render target the orchestrator writes into

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::models::{Activity, NewsArticle, NewsCategory, Quote, WeatherView};
use crate::resilient::Tier;

/// How long a notification stays visible
pub const NOTIFICATION_TTL_SECS: i64 = 5;
const MAX_NOTIFICATIONS: usize = 5;

/// One of the four independent dashboard sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Weather,
    News,
    Quote,
    Activity,
}

impl PanelKind {
    pub const ALL: [PanelKind; 4] = [
        PanelKind::Weather,
        PanelKind::News,
        PanelKind::Quote,
        PanelKind::Activity,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelKind::Weather => "weather",
            PanelKind::News => "news",
            PanelKind::Quote => "quote",
            PanelKind::Activity => "activity",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsPanel {
    pub category: NewsCategory,
    pub articles: Vec<NewsArticle>,
}

/// Display-ready content for one panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum PanelContent {
    Weather(WeatherView),
    News(NewsPanel),
    Quote(Quote),
    Activity(Activity),
}

impl PanelContent {
    #[must_use]
    pub fn kind(&self) -> PanelKind {
        match self {
            PanelContent::Weather(_) => PanelKind::Weather,
            PanelContent::News(_) => PanelKind::News,
            PanelContent::Quote(_) => PanelKind::Quote,
            PanelContent::Activity(_) => PanelKind::Activity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PanelState {
    #[default]
    Idle,
    Loading,
    Rendered {
        tier: Tier,
        content: PanelContent,
    },
    Failed {
        message: String,
    },
}

impl PanelState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PanelState::Rendered { .. } | PanelState::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
}

/// Transient message about connectivity changes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at < TimeDelta::seconds(NOTIFICATION_TTL_SECS)
    }
}

/// Everything the page needs to draw itself
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub weather: PanelState,
    pub news: PanelState,
    pub quote: PanelState,
    pub activity: PanelState,
    pub notifications: Vec<Notification>,
    /// Category currently chosen in the news selector
    pub news_category: NewsCategory,
    pub last_refreshed: Option<DateTime<Utc>>,
    /// Set when the dashboard could not start; shown as a blocking modal
    pub fatal: Option<String>,
}

impl Snapshot {
    #[must_use]
    pub fn panel(&self, kind: PanelKind) -> &PanelState {
        match kind {
            PanelKind::Weather => &self.weather,
            PanelKind::News => &self.news,
            PanelKind::Quote => &self.quote,
            PanelKind::Activity => &self.activity,
        }
    }

    fn panel_mut(&mut self, kind: PanelKind) -> &mut PanelState {
        match kind {
            PanelKind::Weather => &mut self.weather,
            PanelKind::News => &mut self.news,
            PanelKind::Quote => &mut self.quote,
            PanelKind::Activity => &mut self.activity,
        }
    }

    /// Notifications still inside their display window
    #[must_use]
    pub fn visible_notifications(&self, now: DateTime<Utc>) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| n.is_visible_at(now))
            .collect()
    }
}

/// UI collaborator: four panel containers plus a notification surface.
///
/// Each pipeline writes only to its own panel.
pub trait PanelSink: Send + Sync {
    fn set_loading(&self, kind: PanelKind);
    fn render(&self, tier: Tier, content: PanelContent);
    fn fail(&self, kind: PanelKind, message: String);
    fn notify(&self, notification: Notification);
    fn select_category(&self, _category: NewsCategory) {}
    fn load_finished(&self, _at: DateTime<Utc>) {}
}

/// Shared in-memory sink read by the web layer
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    inner: Arc<RwLock<Snapshot>>,
}

impl DashboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_fatal(&self, message: impl Into<String>) {
        self.update(|s| s.fatal = Some(message.into()));
    }

    fn update(&self, f: impl FnOnce(&mut Snapshot)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

impl PanelSink for DashboardState {
    fn set_loading(&self, kind: PanelKind) {
        self.update(|s| *s.panel_mut(kind) = PanelState::Loading);
    }

    fn render(&self, tier: Tier, content: PanelContent) {
        let kind = content.kind();
        self.update(|s| *s.panel_mut(kind) = PanelState::Rendered { tier, content });
    }

    fn fail(&self, kind: PanelKind, message: String) {
        self.update(|s| *s.panel_mut(kind) = PanelState::Failed { message });
    }

    fn notify(&self, notification: Notification) {
        self.update(|s| {
            s.notifications.push(notification);
            let overflow = s.notifications.len().saturating_sub(MAX_NOTIFICATIONS);
            s.notifications.drain(..overflow);
        });
    }

    fn select_category(&self, category: NewsCategory) {
        self.update(|s| s.news_category = category);
    }

    fn load_finished(&self, at: DateTime<Utc>) {
        self.update(|s| s.last_refreshed = Some(at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_content() -> PanelContent {
        PanelContent::Quote(Quote::new("Stay hungry.", Some("Steve Jobs".into())))
    }

    #[test]
    fn test_panel_lifecycle() {
        let state = DashboardState::new();
        assert_eq!(state.snapshot().quote, PanelState::Idle);

        state.set_loading(PanelKind::Quote);
        assert_eq!(state.snapshot().quote, PanelState::Loading);

        state.render(Tier::Primary, quote_content());
        let snapshot = state.snapshot();
        assert!(snapshot.quote.is_terminal());
        assert_eq!(snapshot.weather, PanelState::Idle);
    }

    #[test]
    fn test_render_is_idempotent() {
        let state = DashboardState::new();
        state.render(Tier::Sample, quote_content());
        let first = state.snapshot().quote;
        state.render(Tier::Sample, quote_content());
        assert_eq!(state.snapshot().quote, first);
    }

    #[test]
    fn test_new_content_replaces_old() {
        let state = DashboardState::new();
        state.render(Tier::Primary, quote_content());
        let replacement = PanelContent::Quote(Quote::new("Other", None));
        state.render(Tier::Secondary, replacement.clone());
        assert_eq!(
            state.snapshot().quote,
            PanelState::Rendered {
                tier: Tier::Secondary,
                content: replacement
            }
        );
    }

    #[test]
    fn test_notifications_are_bounded_and_expire() {
        let state = DashboardState::new();
        for i in 0..8 {
            state.notify(Notification::new(format!("n{i}"), NotificationLevel::Info));
        }
        let snapshot = state.snapshot();
        assert_eq!(snapshot.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(snapshot.notifications[0].message, "n3");

        let now = Utc::now();
        assert_eq!(snapshot.visible_notifications(now).len(), MAX_NOTIFICATIONS);
        let later = now + TimeDelta::seconds(NOTIFICATION_TTL_SECS + 1);
        assert!(snapshot.visible_notifications(later).is_empty());
    }

    #[test]
    fn test_render_moves_content_into_its_own_panel() {
        let state = DashboardState::new();
        state.set_loading(PanelKind::News);
        state.render(Tier::Primary, quote_content());
        let snapshot = state.snapshot();
        assert_eq!(snapshot.news, PanelState::Loading);
        assert_eq!(
            snapshot.quote,
            PanelState::Rendered {
                tier: Tier::Primary,
                content: quote_content()
            }
        );
    }

    #[test]
    fn test_selected_category_survives_loading() {
        let state = DashboardState::new();
        assert_eq!(state.snapshot().news_category, NewsCategory::General);
        state.select_category(NewsCategory::Sports);
        state.set_loading(PanelKind::News);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.news_category, NewsCategory::Sports);
        assert_eq!(snapshot.news, PanelState::Loading);
    }

    #[test]
    fn test_panel_kind_parse() {
        assert_eq!(PanelKind::parse("news"), Some(PanelKind::News));
        assert_eq!(PanelKind::parse("stocks"), None);
    }

    #[test]
    fn test_snapshot_serializes_tagged_states() {
        let state = DashboardState::new();
        state.set_loading(PanelKind::Weather);
        state.render(Tier::Primary, quote_content());
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["weather"]["state"], "loading");
        assert_eq!(json["quote"]["state"], "rendered");
        assert_eq!(json["quote"]["tier"], "primary");
        assert_eq!(json["quote"]["content"]["kind"], "quote");
        assert_eq!(json["quote"]["content"]["data"]["author"], "Steve Jobs");
    }
}
