//! Reports section: a static catalog with location and data-type filters.

use citypulse_city_models::{ReportFormat, ReportStatus};
use serde::Serialize;

/// Locations offered by the location filter. The first entry means
/// "no filter".
pub const LOCATIONS: &[&str] = &[
    "All Locations",
    "Downtown District",
    "Residential Area A",
    "Residential Area B",
    "Industrial Zone",
    "Commercial Hub",
    "Eco Park Zone",
];

/// Data types offered by the data-type filter. The first entry means
/// "no filter".
pub const DATA_TYPES: &[&str] = &[
    "All Data Types",
    "Traffic Analytics",
    "Environmental Data",
    "Utility Consumption",
    "Public Safety",
    "Citizen Complaints",
    "Infrastructure Status",
];

/// A generated or in-progress report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Report ID.
    pub id: u32,
    /// Title.
    pub title: String,
    /// One-line summary of the contents.
    pub description: String,
    /// Data type, one of [`DATA_TYPES`].
    pub data_type: String,
    /// Location, one of [`LOCATIONS`].
    pub location: String,
    /// Period covered.
    pub date_range: String,
    /// Generation status.
    pub status: ReportStatus,
    /// When it was generated.
    pub generated_at: String,
    /// File size in megabytes.
    pub size_mb: f64,
    /// Download format.
    pub format: ReportFormat,
}

/// Location and data-type filter. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Location to match exactly.
    pub location: Option<String>,
    /// Data type to match exactly.
    pub data_type: Option<String>,
}

impl ReportFilter {
    /// Builds a filter from selector values, treating the "All ..." entries
    /// as no filter.
    #[must_use]
    pub fn from_selection(location: &str, data_type: &str) -> Self {
        let pick = |value: &str, all: &str| (value != all).then(|| value.to_string());
        Self {
            location: pick(location, LOCATIONS[0]),
            data_type: pick(data_type, DATA_TYPES[0]),
        }
    }

    /// Returns `true` if `report` passes both filters.
    #[must_use]
    pub fn matches(&self, report: &Report) -> bool {
        self.location.as_ref().is_none_or(|l| *l == report.location)
            && self
                .data_type
                .as_ref()
                .is_none_or(|t| *t == report.data_type)
    }
}

/// The report list plus the currently selected report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportCatalog {
    reports: Vec<Report>,
    selected: Option<u32>,
}

impl Default for ReportCatalog {
    fn default() -> Self {
        Self {
            reports: builtin_reports(),
            selected: None,
        }
    }
}

impl ReportCatalog {
    /// All reports.
    #[must_use]
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Reports passing `filter`, in catalog order.
    #[must_use]
    pub fn filtered(&self, filter: &ReportFilter) -> Vec<&Report> {
        self.reports.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Selects a report by ID. Returns it, or `None` (clearing the
    /// selection) if no report has that ID.
    pub fn select(&mut self, id: u32) -> Option<&Report> {
        self.selected = self.reports.iter().any(|r| r.id == id).then_some(id);
        self.selected()
    }

    /// The selected report, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&Report> {
        let id = self.selected?;
        self.reports.iter().find(|r| r.id == id)
    }
}

fn builtin_reports() -> Vec<Report> {
    [
        (
            "Monthly Traffic Analysis",
            "Comprehensive traffic flow analysis with congestion patterns and peak hour insights",
            "Traffic Analytics",
            "Downtown District",
            "Nov 1-30, 2024",
            ReportStatus::Ready,
            "2 hours ago",
            2.4,
            ReportFormat::Pdf,
        ),
        (
            "Air Quality Trends Report",
            "Environmental monitoring data with AQI trends and pollution source analysis",
            "Environmental Data",
            "Industrial Zone",
            "Oct 15 - Nov 15, 2024",
            ReportStatus::Generating,
            "In progress",
            1.8,
            ReportFormat::Excel,
        ),
        (
            "Utility Consumption Overview",
            "Water and electricity usage patterns across residential and commercial zones",
            "Utility Consumption",
            "All Locations",
            "Q3 2024",
            ReportStatus::Ready,
            "1 day ago",
            3.2,
            ReportFormat::Pdf,
        ),
        (
            "Citizen Complaint Summary",
            "Analysis of public complaints with sentiment trends and resolution metrics",
            "Public Safety",
            "All Locations",
            "Last 30 days",
            ReportStatus::Ready,
            "4 hours ago",
            1.1,
            ReportFormat::Excel,
        ),
    ]
    .into_iter()
    .zip(1..)
    .map(
        |(
            (title, description, data_type, location, date_range, status, generated_at, size_mb, format),
            id,
        )| Report {
            id,
            title: title.to_string(),
            description: description.to_string(),
            data_type: data_type.to_string(),
            location: location.to_string(),
            date_range: date_range.to_string(),
            status,
            generated_at: generated_at.to_string(),
            size_mb,
            format,
        },
    )
    .collect()
}
