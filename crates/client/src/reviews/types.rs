//! Review rows and submission validation.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Rating used when a submission leaves it unset.
pub const DEFAULT_RATING: u8 = 5;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A stored review row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub location: String,
    /// ISO 3166-1 alpha-2 code; absent on rows created before the column existed.
    #[serde(default)]
    pub countrycode: Option<String>,
    /// Date of the flight, `YYYY-MM-DD`.
    pub date: String,
    pub created_at: String,
    pub approved: bool,
}

/// A review as submitted by a visitor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewReview {
    pub name: String,
    #[serde(default)]
    pub rating: Option<u8>,
    pub comment: String,
    pub location: String,
    pub countrycode: String,
    /// Defaults to today (UTC) when unset.
    #[serde(default)]
    pub date: Option<String>,
}

/// Insert payload sent to the store.
#[derive(Debug, Serialize)]
pub(crate) struct ReviewInsert {
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub location: String,
    pub countrycode: String,
    pub date: String,
    pub approved: bool,
}

impl NewReview {
    /// Validate the submission.
    ///
    /// Name, location, country code and comment must be non-blank, the rating
    /// must be 1 to 5 and the date must be a calendar date.
    pub fn validate(&self) -> Result<(), StoreError> {
        let required = [
            ("name", &self.name),
            ("location", &self.location),
            ("countrycode", &self.countrycode),
            ("comment", &self.comment),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(StoreError::Invalid(format!("{field} is required")));
        }

        let rating = self.rating.unwrap_or(DEFAULT_RATING);
        if !(1..=5).contains(&rating) {
            return Err(StoreError::Invalid(format!("rating must be between 1 and 5, got {rating}")));
        }

        if let Some(date) = &self.date {
            NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
                .map_err(|_| StoreError::Invalid(format!("date must be YYYY-MM-DD, got '{date}'")))?;
        }

        Ok(())
    }

    pub(crate) fn into_insert(self, approved: bool) -> ReviewInsert {
        let date = match self.date {
            Some(date) => date.trim().to_string(),
            None => Utc::now().date_naive().format(DATE_FORMAT).to_string(),
        };

        ReviewInsert {
            name: self.name.trim().to_string(),
            rating: self.rating.unwrap_or(DEFAULT_RATING),
            comment: self.comment.trim().to_string(),
            location: self.location.trim().to_string(),
            countrycode: self.countrycode.trim().to_uppercase(),
            date,
            approved,
        }
    }
}
