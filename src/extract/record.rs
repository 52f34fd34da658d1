use serde::{Deserialize, Serialize};

/// Column order used by every tabular export
pub const EXPORT_COLUMNS: [&str; 8] = [
    "company_name",
    "email",
    "phone",
    "address",
    "website",
    "description",
    "source_url",
    "job_title",
];

/// A single contact record recovered from a list or detail page
///
/// Every field except `source_url` is optional; a partial record is valid.
/// Fields are declared in export column order so serialized output is
/// column-stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Organization name
    pub company_name: Option<String>,

    /// Contact email address (decoded)
    pub email: Option<String>,

    /// Contact phone number
    pub phone: Option<String>,

    /// Postal address or work location
    pub address: Option<String>,

    /// External website
    pub website: Option<String>,

    /// Free-text description, truncated
    pub description: Option<String>,

    /// The page the data was read from
    pub source_url: String,

    /// Role title, when the page heading names a position
    pub job_title: Option<String>,
}

impl ExtractionRecord {
    /// Creates an empty record for the given source page
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    /// Returns true if the record carries an organization name or at least
    /// one contact field
    ///
    /// Only substantive records are ever handed to the caller.
    pub fn is_substantive(&self) -> bool {
        self.company_name.is_some() || self.has_contact()
    }

    /// Returns true if any of address, email, phone or website is present
    pub fn has_contact(&self) -> bool {
        self.address.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.website.is_some()
    }

    /// Returns the record as a row of cells in `EXPORT_COLUMNS` order
    pub fn to_row(&self) -> [&str; 8] {
        [
            self.company_name.as_deref().unwrap_or_default(),
            self.email.as_deref().unwrap_or_default(),
            self.phone.as_deref().unwrap_or_default(),
            self.address.as_deref().unwrap_or_default(),
            self.website.as_deref().unwrap_or_default(),
            self.description.as_deref().unwrap_or_default(),
            self.source_url.as_str(),
            self.job_title.as_deref().unwrap_or_default(),
        ]
    }

    /// Number of optional fields that carry a value
    pub fn populated_fields(&self) -> usize {
        [
            &self.company_name,
            &self.email,
            &self.phone,
            &self.address,
            &self.website,
            &self.description,
            &self.job_title,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    }
}
