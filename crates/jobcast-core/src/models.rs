use uuid::Uuid;

use crate::error::AppError;

/// A normalized job listing, ready for publishing.
///
/// Field names are fixed by the catalog API contract. `county` is the
/// only optional field and is omitted from the JSON when absent.
/// Records are immutable once constructed; build a new one instead of
/// patching.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    /// Opaque unique identifier for this listing.
    pub id: String,
    pub job_title: String,
    pub job_link: String,
    pub company: String,
    pub country: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
}

impl Record {
    /// Create a record, validating that every required field is non-empty.
    pub fn new(
        id: impl Into<String>,
        job_title: impl Into<String>,
        job_link: impl Into<String>,
        company: impl Into<String>,
        country: impl Into<String>,
        city: impl Into<String>,
    ) -> Result<Self, AppError> {
        let record = Self {
            id: id.into(),
            job_title: job_title.into(),
            job_link: job_link.into(),
            company: company.into(),
            country: country.into(),
            city: city.into(),
            county: None,
        };
        record.validate()?;
        Ok(record)
    }

    /// Create a record with a freshly generated UUIDv4 identifier.
    ///
    /// Most career pages expose no stable listing id, so scrapers mint
    /// one per run.
    pub fn with_generated_id(
        job_title: impl Into<String>,
        job_link: impl Into<String>,
        company: impl Into<String>,
        country: impl Into<String>,
        city: impl Into<String>,
    ) -> Result<Self, AppError> {
        Self::new(
            Uuid::new_v4().to_string(),
            job_title,
            job_link,
            company,
            country,
            city,
        )
    }

    /// Attach the optional county.
    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("id", &self.id),
            ("job_title", &self.job_title),
            ("job_link", &self.job_link),
            ("company", &self.company),
            ("country", &self.country),
            ("city", &self.city),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::InvalidRecord(format!("field '{name}' is empty")));
            }
        }
        Ok(())
    }
}

/// An ordered collection of records for one company, built per scraping
/// run and consumed whole by the publish pipeline.
#[derive(Debug, Clone)]
pub struct PublishBatch {
    company: String,
    records: Vec<Record>,
}

impl PublishBatch {
    pub fn new(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
