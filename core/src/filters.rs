//! Filter criteria for the event directory.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Constraint on the booked state of listed events
///
/// Only meaningful while an identity is active; the directory omits the
/// parameter entirely for unauthenticated sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookedFilter {
    /// Only events the active user has booked
    Booked,
    /// Only events the active user has not booked
    NotBooked,
    /// No constraint
    All,
}

impl BookedFilter {
    /// Wire representation of the `booked` query parameter
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Booked => "true",
            Self::NotBooked => "false",
            Self::All => "all",
        }
    }
}

/// Sort direction over the event date
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Earliest first
    #[default]
    Ascending,
    /// Latest first
    Descending,
}

impl SortDirection {
    /// Wire representation of the `sort` query parameter
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Filter criteria for a directory listing
///
/// Absent fields mean "no constraint". Changing any field resets the
/// directory to page 1 (see `EventDirectory::set_filters`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFilters {
    /// Restrict to one category label
    pub category: Option<String>,
    /// Earliest event date, inclusive
    pub start_date: Option<NaiveDate>,
    /// Latest event date, inclusive
    pub end_date: Option<NaiveDate>,
    /// Restrict by booked state of the active user
    pub booked: Option<BookedFilter>,
    /// Sort direction over date
    pub sort: Option<SortDirection>,
}

impl EventFilters {
    /// Filters with no constraints
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Query parameters for the events listing endpoint
    ///
    /// Only set fields are emitted. The `booked` parameter is dropped when
    /// `authenticated` is false since the server cannot evaluate it without
    /// an identity.
    #[must_use]
    pub fn query_pairs(&self, authenticated: bool) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(booked) = self.booked {
            if authenticated {
                pairs.push(("booked", booked.as_param().to_string()));
            }
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_param().to_string()));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_emit_no_pairs() {
        assert!(EventFilters::none().query_pairs(true).is_empty());
    }

    #[test]
    fn set_fields_are_emitted_in_wire_form() {
        let filters = EventFilters {
            category: Some("Music".to_string()),
            start_date: NaiveDate::from_ymd_opt(2025, 7, 1),
            end_date: None,
            booked: Some(BookedFilter::Booked),
            sort: Some(SortDirection::Descending),
        };

        let pairs = filters.query_pairs(true);
        assert_eq!(
            pairs,
            vec![
                ("category", "Music".to_string()),
                ("startDate", "2025-07-01".to_string()),
                ("booked", "true".to_string()),
                ("sort", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn booked_is_dropped_without_identity() {
        let filters = EventFilters {
            booked: Some(BookedFilter::NotBooked),
            ..EventFilters::none()
        };

        assert!(filters.query_pairs(false).is_empty());
        assert_eq!(
            filters.query_pairs(true),
            vec![("booked", "false".to_string())]
        );
    }
}
