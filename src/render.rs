//! HTML for the dashboard page
//!
//! Every function here is pure: the same snapshot always yields the same
//! markup, so re-rendering a panel never duplicates content.

use chrono::{DateTime, Utc};

use crate::dashboard::{
    NewsPanel, Notification, NotificationLevel, PanelContent, PanelKind, PanelState, Snapshot,
};
use crate::models::{Activity, NewsCategory, Quote, WeatherView};
use crate::resilient::Tier;

pub const PAGE_CSS: &str = r#"
:root {
  --bg: #f4f6fb;
  --panel: #ffffff;
  --border: rgba(0, 0, 0, 0.08);
  --text: #0c1625;
  --text-muted: #5b6678;
  --accent: #2563eb;
  --positive: #0ea66c;
  --negative: #e11d48;
  --warning: #d97706;
  --radius: 10px;
  --shadow-soft: 0 10px 36px rgba(0, 0, 0, 0.10);
  --font-body: "Inter", system-ui, -apple-system, sans-serif;
}

* { box-sizing: border-box; }
body {
  margin: 0;
  background: var(--bg);
  color: var(--text);
  font-family: var(--font-body);
  line-height: 1.4;
}

header {
  display: flex;
  justify-content: space-between;
  align-items: center;
  padding: 16px 24px;
}
header .updated { color: var(--text-muted); font-size: 13px; }

main {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
  gap: 16px;
  padding: 0 24px 24px;
}

.panel {
  background: var(--panel);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  box-shadow: var(--shadow-soft);
  padding: 16px;
  min-height: 180px;
}
.panel h2 { display: flex; justify-content: space-between; margin: 0 0 12px; font-size: 17px; }
.panel h2 button { font-size: 12px; }

.tier { font-size: 11px; padding: 2px 8px; border-radius: 999px; background: var(--bg); color: var(--text-muted); }
.tier-sample { color: var(--warning); }

.loading { color: var(--text-muted); text-align: center; padding: 40px 0; }
.error { color: var(--negative); text-align: center; padding: 24px 0; }

.weather-main { display: flex; align-items: center; gap: 16px; }
.weather-temp { font-size: 40px; font-weight: 600; }
.weather-details { display: grid; grid-template-columns: 1fr 1fr; gap: 4px 16px; margin-top: 12px; font-size: 13px; }

.news-list { display: flex; flex-direction: column; gap: 10px; }
.news-card { border-bottom: 1px solid var(--border); padding-bottom: 8px; }
.news-card h3 { font-size: 14px; margin: 0 0 4px; }
.news-card p { margin: 0 0 4px; font-size: 13px; color: var(--text-muted); }
.news-meta { font-size: 11px; color: var(--text-muted); display: flex; justify-content: space-between; }

blockquote { font-size: 18px; font-style: italic; margin: 0 0 8px; }
.quote-author { text-align: right; color: var(--text-muted); }

.activity-name { font-size: 18px; font-weight: 600; margin-bottom: 8px; }
.activity-meta { display: flex; gap: 12px; font-size: 13px; color: var(--text-muted); }

.notifications { position: fixed; top: 16px; right: 16px; display: flex; flex-direction: column; gap: 8px; }
.notification { padding: 10px 14px; border-radius: var(--radius); color: #fff; box-shadow: var(--shadow-soft); }
.notification-info { background: var(--accent); }
.notification-success { background: var(--positive); }
.notification-warning { background: var(--warning); }

.modal-backdrop { position: fixed; inset: 0; background: rgba(0, 0, 0, 0.5); display: flex; align-items: center; justify-content: center; }
.modal { background: var(--panel); border-radius: var(--radius); padding: 24px; max-width: 420px; text-align: center; }
"#;

/// Page behaviour: buttons and the category selector post events, browser
/// connectivity changes are forwarded, and the position is offered once per
/// session.
const PAGE_SCRIPT: &str = r#"
async function post(path, body) {
  const init = { method: 'POST' };
  if (body !== undefined) {
    init.headers = { 'Content-Type': 'application/json' };
    init.body = JSON.stringify(body);
  }
  try { await fetch(path, init); } catch (e) { console.warn('request failed', e); }
  setTimeout(() => window.location.reload(), 1500);
}

document.querySelectorAll('[data-refresh]').forEach((button) => {
  button.addEventListener('click', () => {
    const panel = button.dataset.refresh;
    post(panel === 'all' ? '/api/refresh' : '/api/refresh/' + panel);
  });
});

const category = document.getElementById('news-category');
if (category) {
  category.addEventListener('change', () => {
    post('/api/news?category=' + encodeURIComponent(category.value));
  });
}

window.addEventListener('online', () => post('/api/connectivity', { online: true }));
window.addEventListener('offline', () => post('/api/connectivity', { online: false }));

if (navigator.geolocation && !sessionStorage.getItem('daybrief-located')) {
  sessionStorage.setItem('daybrief-located', '1');
  navigator.geolocation.getCurrentPosition(
    (pos) => post('/api/weather?lat=' + pos.coords.latitude + '&lon=' + pos.coords.longitude),
    (err) => console.warn('geolocation unavailable', err.message),
    { timeout: 5000 }
  );
}
"#;

/// Escape text for use in element content and quoted attributes
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[must_use]
pub fn loading_html() -> String {
    r#"<div class="loading"><i class="fas fa-spinner fa-spin"></i> Loading...</div>"#.to_string()
}

/// Error block shown in place of a panel's content
#[must_use]
pub fn error_html(message: &str) -> String {
    format!(
        r#"<div class="error"><i class="fas fa-exclamation-triangle"></i><p>{}</p><button onclick="window.location.reload()">Reload Page</button></div>"#,
        escape(message)
    )
}

fn tier_badge(tier: Tier) -> String {
    format!(r#"<span class="tier tier-{tier}">{tier}</span>"#)
}

#[must_use]
pub fn weather_html(view: &WeatherView) -> String {
    format!(
        r#"<div class="weather-main"><i class="{icon} fa-3x"></i><div><div class="weather-temp">{temp}</div><div>{description}</div><div class="weather-location"><i class="fas fa-map-marker-alt"></i> {label}</div></div></div>
<div class="weather-details"><span>Feels like: {feels}</span><span>Humidity: {humidity}</span><span>Wind: {wind}</span><span>Pressure: {pressure}</span></div>"#,
        icon = view.icon.css_class(),
        temp = view.format_temperature(),
        description = escape(&view.description),
        label = escape(&view.location_label),
        feels = view.format_feels_like(),
        humidity = view.format_humidity(),
        wind = view.format_wind(),
        pressure = view.format_pressure(),
    )
}

fn category_selector(selected: NewsCategory) -> String {
    let options: String = NewsCategory::ALL
        .iter()
        .map(|c| {
            let marker = if *c == selected { " selected" } else { "" };
            format!(r#"<option value="{0}"{marker}>{0}</option>"#, c.as_str())
        })
        .collect();
    format!(r#"<select id="news-category">{options}</select>"#)
}

#[must_use]
pub fn news_html(panel: &NewsPanel) -> String {
    let cards: String = panel
        .articles
        .iter()
        .map(|article| {
            format!(
                r#"<article class="news-card"><h3>{title}</h3><p>{description}</p><div class="news-meta"><span>{source}</span><span>{published}</span></div><a href="{url}" target="_blank" rel="noopener">Read More</a></article>"#,
                title = escape(&article.display_title()),
                description = escape(&article.display_description()),
                source = escape(article.display_source()),
                published = article.display_published(),
                url = escape(&article.url),
            )
        })
        .collect();
    format!(r#"<div class="news-list">{cards}</div>"#)
}

#[must_use]
pub fn quote_html(quote: &Quote) -> String {
    format!(
        r#"<blockquote>"{}"</blockquote><div class="quote-author">- {}</div>"#,
        escape(&quote.content),
        escape(&quote.author)
    )
}

#[must_use]
pub fn activity_html(activity: &Activity) -> String {
    let mut meta = format!(
        r#"<span><i class="fas fa-tag"></i> {}</span><span><i class="fas fa-users"></i> {}</span>"#,
        escape(&activity.category),
        activity.participants_label()
    );
    if activity.price > 0.0 {
        meta.push_str(&format!(
            r#"<span><i class="fas fa-dollar-sign"></i> {}</span>"#,
            activity.price_label()
        ));
    }

    let link = activity
        .link
        .as_deref()
        .map(|l| {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener">Learn More</a>"#,
                escape(l)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="activity-name">{}</div><div class="activity-meta">{meta}</div>{link}"#,
        escape(&activity.activity)
    )
}

fn content_html(content: &PanelContent) -> String {
    match content {
        PanelContent::Weather(view) => weather_html(view),
        PanelContent::News(panel) => news_html(panel),
        PanelContent::Quote(quote) => quote_html(quote),
        PanelContent::Activity(activity) => activity_html(activity),
    }
}

fn panel_title(kind: PanelKind) -> &'static str {
    match kind {
        PanelKind::Weather => "Weather",
        PanelKind::News => "Top Headlines",
        PanelKind::Quote => "Quote of the Day",
        PanelKind::Activity => "Something To Do",
    }
}

/// One panel section. `news_category` drives the selector in the news header.
#[must_use]
pub fn panel_html(kind: PanelKind, state: &PanelState, news_category: NewsCategory) -> String {
    let (badge, body) = match state {
        PanelState::Idle | PanelState::Loading => (String::new(), loading_html()),
        PanelState::Rendered { tier, content } => (tier_badge(*tier), content_html(content)),
        PanelState::Failed { message } => (String::new(), error_html(message)),
    };
    let selector = if kind == PanelKind::News {
        category_selector(news_category)
    } else {
        String::new()
    };

    format!(
        r#"<section class="panel" id="{kind}-panel"><h2><span>{title} {badge}</span><span>{selector}<button data-refresh="{kind}">Refresh</button></span></h2><div class="panel-body">{body}</div></section>"#,
        title = panel_title(kind),
    )
}

#[must_use]
pub fn notifications_html(notifications: &[&Notification]) -> String {
    let items: String = notifications
        .iter()
        .map(|n| {
            let level = match n.level {
                NotificationLevel::Info => "info",
                NotificationLevel::Success => "success",
                NotificationLevel::Warning => "warning",
            };
            format!(
                r#"<div class="notification notification-{level}">{}</div>"#,
                escape(&n.message)
            )
        })
        .collect();
    format!(r#"<div class="notifications">{items}</div>"#)
}

/// Blocking modal for a dashboard that could not start
#[must_use]
pub fn fatal_modal_html(message: &str) -> String {
    format!(
        r#"<div class="modal-backdrop"><div class="modal"><h2>Something went wrong</h2><p>{}</p><p>Please refresh the page.</p><button onclick="window.location.reload()">Refresh</button></div></div>"#,
        escape(message)
    )
}

/// The full page for `snapshot` as seen at `now`
#[must_use]
pub fn page(snapshot: &Snapshot, now: DateTime<Utc>) -> String {
    let panels: String = PanelKind::ALL
        .into_iter()
        .map(|kind| panel_html(kind, snapshot.panel(kind), snapshot.news_category))
        .collect();
    let updated = snapshot
        .last_refreshed
        .map(|at| format!("Last updated {}", at.format("%H:%M:%S UTC")))
        .unwrap_or_default();
    let modal = snapshot
        .fatal
        .as_deref()
        .map(fatal_modal_html)
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Daybrief</title>
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css">
<style>{PAGE_CSS}</style>
</head>
<body>
<header><h1>Daybrief</h1><div><span class="updated">{updated}</span> <button data-refresh="all">Refresh All</button></div></header>
{notifications}
<main>{panels}</main>
{modal}
<script>{PAGE_SCRIPT}</script>
</body>
</html>"#,
        notifications = notifications_html(&snapshot.visible_notifications(now)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Measure, NewsArticle, WeatherIcon};
    use chrono::TimeDelta;

    fn view() -> WeatherView {
        WeatherView {
            temperature: 18,
            description: "light rain".to_string(),
            humidity: Measure::Unknown,
            wind_speed: 3.4,
            pressure: Measure::Value(1012.0),
            feels_like: 16,
            location_label: "Berlin".to_string(),
            icon: WeatherIcon::Rain,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_weather_card() {
        let html = weather_html(&view());
        assert!(html.contains("18°C"));
        assert!(html.contains("Humidity: unknown"));
        assert!(html.contains("Pressure: 1012 hPa"));
        assert!(html.contains("fas fa-cloud-rain"));
        assert!(html.contains("Berlin"));
    }

    #[test]
    fn test_activity_price_and_link_are_conditional() {
        let free = Activity::new("Read a book", "education", 1, 0.0, None);
        let html = activity_html(&free);
        assert!(html.contains("1 participant"));
        assert!(!html.contains("fa-dollar-sign"));
        assert!(!html.contains("Learn More"));

        let paid = Activity::new(
            "Go to a concert",
            "music",
            3,
            0.5,
            Some("https://example.com".into()),
        );
        let html = activity_html(&paid);
        assert!(html.contains("3 participants"));
        assert!(html.contains("$$"));
        assert!(html.contains(r#"href="https://example.com""#));
    }

    #[test]
    fn test_news_cards_use_display_rules() {
        let panel = NewsPanel {
            category: NewsCategory::Science,
            articles: vec![NewsArticle {
                title: "t".repeat(81),
                description: None,
                source_name: None,
                published_at: None,
                url: "https://news.example/1".to_string(),
            }],
        };
        let html = news_html(&panel);
        assert!(html.contains(&format!("{}...", "t".repeat(80))));
        assert!(html.contains("No description available"));
        assert!(html.contains("Unknown Source"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let quote = Quote::new("<script>alert(1)</script>", None);
        let html = quote_html(&quote);
        assert!(!html.contains("<script>"));
        assert!(html.contains("- Unknown"));
    }

    #[test]
    fn test_panel_states() {
        let loading = panel_html(PanelKind::Quote, &PanelState::Loading, NewsCategory::General);
        assert!(loading.contains("Loading..."));

        let failed = panel_html(
            PanelKind::Quote,
            &PanelState::Failed {
                message: "Request timed out".to_string(),
            },
            NewsCategory::General,
        );
        assert!(failed.contains("Request timed out"));
        assert!(failed.contains("Reload Page"));

        let rendered = PanelState::Rendered {
            tier: Tier::Sample,
            content: PanelContent::Quote(Quote::new("Hi", None)),
        };
        let html = panel_html(PanelKind::Quote, &rendered, NewsCategory::General);
        assert!(html.contains("tier-sample"));
        assert_eq!(
            html,
            panel_html(PanelKind::Quote, &rendered, NewsCategory::General)
        );
    }

    #[test]
    fn test_category_selector_marks_selection() {
        let html = panel_html(PanelKind::News, &PanelState::Loading, NewsCategory::Sports);
        assert!(html.contains(r#"<option value="sports" selected>"#));
        assert!(html.contains(r#"<option value="general">"#));
    }

    #[test]
    fn test_page_keeps_chosen_category_while_news_reloads() {
        let snapshot = Snapshot {
            news: PanelState::Loading,
            news_category: NewsCategory::Health,
            ..Snapshot::default()
        };
        let html = page(&snapshot, Utc::now());
        assert!(html.contains(r#"<option value="health" selected>"#));
        assert!(!html.contains(r#"<option value="general" selected>"#));
    }

    #[test]
    fn test_page_shows_fatal_modal_and_fresh_notifications() {
        let now = Utc::now();
        let mut snapshot = Snapshot {
            fatal: Some("Failed to load dashboard".to_string()),
            ..Snapshot::default()
        };
        let mut old = Notification::new("stale", NotificationLevel::Info);
        old.created_at = now - TimeDelta::seconds(30);
        snapshot.notifications = vec![
            old,
            Notification::new("You are offline", NotificationLevel::Warning),
        ];

        let html = page(&snapshot, now);
        assert!(html.contains("modal-backdrop"));
        assert!(html.contains("Failed to load dashboard"));
        assert!(html.contains("notification-warning"));
        assert!(!html.contains("stale"));
        for kind in PanelKind::ALL {
            assert!(html.contains(&format!(r#"id="{kind}-panel""#)));
        }
    }
}
