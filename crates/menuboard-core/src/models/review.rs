use serde::{Deserialize, Serialize};

/// Highest star rating a customer can give
pub const MAX_RATING: u8 = 5;

/// A customer review with three sub-ratings.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    #[serde(default)]
    pub restaurant_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_governorate: Option<String>,
    #[serde(default)]
    pub customer_city: Option<String>,
    pub place_rating: u8,
    pub products_rating: u8,
    pub service_rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Review {
    pub fn average_rating(&self) -> f64 {
        (self.place_rating as f64 + self.products_rating as f64 + self.service_rating as f64) / 3.0
    }

    pub fn location(&self) -> String {
        let parts: Vec<&str> = [&self.customer_governorate, &self.customer_city]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect();
        parts.join(" - ")
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_approved {
            "Approved"
        } else {
            "Pending"
        }
    }
}

/// Which reviews to list in the reviews tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewFilter {
    #[default]
    All,
    Pending,
    Approved,
}

impl ReviewFilter {
    pub fn label(&self) -> &'static str {
        match self {
            ReviewFilter::All => "All",
            ReviewFilter::Pending => "Pending",
            ReviewFilter::Approved => "Approved",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ReviewFilter::All => ReviewFilter::Pending,
            ReviewFilter::Pending => ReviewFilter::Approved,
            ReviewFilter::Approved => ReviewFilter::All,
        }
    }

    /// Approval flag to filter on, if any
    pub fn approved(&self) -> Option<bool> {
        match self {
            ReviewFilter::All => None,
            ReviewFilter::Pending => Some(false),
            ReviewFilter::Approved => Some(true),
        }
    }

    pub fn matches(&self, review: &Review) -> bool {
        self.approved().map_or(true, |approved| review.is_approved == approved)
    }
}

/// Render a rating as filled and empty stars, clamped to 0..=5
pub fn stars(rating: u8) -> String {
    let filled = rating.min(MAX_RATING) as usize;
    format!(
        "{}{}",
        "★".repeat(filled),
        "☆".repeat(MAX_RATING as usize - filled)
    )
}
