//! Activity suggestion view model

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub activity: String,
    pub category: String,
    /// Always at least 1
    pub participants: u32,
    /// Normalized cost, 0.0 (free) to 1.0
    pub price: f64,
    pub link: Option<String>,
}

impl Activity {
    /// Build an activity, clamping participants to >= 1 and price to [0, 1]
    #[must_use]
    pub fn new(
        activity: impl Into<String>,
        category: impl Into<String>,
        participants: u32,
        price: f64,
        link: Option<String>,
    ) -> Self {
        let price = if price.is_finite() { price.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            activity: activity.into(),
            category: category.into(),
            participants: participants.max(1),
            price,
            link: link.filter(|l| !l.trim().is_empty()),
        }
    }

    #[must_use]
    pub fn price_label(&self) -> &'static str {
        price_label(self.price)
    }

    /// e.g. `1 participant`, `3 participants`
    #[must_use]
    pub fn participants_label(&self) -> String {
        let plural = if self.participants > 1 { "s" } else { "" };
        format!("{} participant{plural}", self.participants)
    }
}

/// 0 is "Free", (0, 0.3] "$", (0.3, 0.6] "$$", anything above "$$$"
#[must_use]
pub fn price_label(price: f64) -> &'static str {
    if price == 0.0 {
        "Free"
    } else if price <= 0.3 {
        "$"
    } else if price <= 0.6 {
        "$$"
    } else {
        "$$$"
    }
}
