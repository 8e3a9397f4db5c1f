//! A single operator release.

use opkit_manifest::{ClusterServiceVersion, CustomResourceDefinition};
use serde::Serialize;

/// One operator release and the relations it declares.
///
/// The graph fields mirror the underlying CSV document; setters keep the two
/// in sync so an edited record exports exactly what the editor shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionRecord {
    name: String,
    version: String,
    replaces: Option<String>,
    skips: Vec<String>,
    skip_range: Option<String>,
    valid: bool,
    #[serde(skip)]
    csv: ClusterServiceVersion,
    #[serde(skip)]
    crds: Vec<CustomResourceDefinition>,
}

impl VersionRecord {
    /// Create a record for a release with no relations.
    ///
    /// Records start out valid; validation clears the flag when it finds
    /// errors.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let version = version.into();
        Self {
            csv: ClusterServiceVersion::new(name.clone(), version.clone()),
            name,
            version,
            replaces: None,
            skips: Vec::new(),
            skip_range: None,
            valid: true,
            crds: Vec::new(),
        }
    }

    /// Build a record from a parsed CSV. A missing version becomes `""`.
    #[must_use]
    pub fn from_csv(csv: ClusterServiceVersion) -> Self {
        Self {
            name: csv.name().to_string(),
            version: csv.version().map(str::trim).unwrap_or_default().to_string(),
            replaces: csv.replaces().map(str::to_string),
            skips: csv
                .skips()
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            skip_range: csv.skip_range(),
            valid: true,
            csv,
            crds: Vec::new(),
        }
    }

    /// Builder: set `replaces`.
    #[must_use]
    pub fn with_replaces(mut self, replaces: impl Into<String>) -> Self {
        self.set_replaces(Some(replaces.into()));
        self
    }

    /// Builder: set `skips`.
    #[must_use]
    pub fn with_skips<I, S>(mut self, skips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_skips(skips.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: set the skip range.
    #[must_use]
    pub fn with_skip_range(mut self, range: impl Into<String>) -> Self {
        self.set_skip_range(Some(range.into()));
        self
    }

    /// Builder: attach a CRD.
    #[must_use]
    pub fn with_crd(mut self, crd: CustomResourceDefinition) -> Self {
        self.crds.push(crd);
        self
    }

    /// Unique CSV name, e.g. `etcdoperator.v0.9.4`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version string as written in the CSV.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Name of the directly superseded release.
    #[must_use]
    pub fn replaces(&self) -> Option<&str> {
        self.replaces.as_deref()
    }

    /// Names of explicitly skipped releases.
    #[must_use]
    pub fn skips(&self) -> &[String] {
        &self.skips
    }

    /// Skip range expression.
    #[must_use]
    pub fn skip_range(&self) -> Option<&str> {
        self.skip_range.as_deref()
    }

    /// Result of the last validation pass.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Record the outcome of validation.
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// The CSV document backing this record.
    #[must_use]
    pub fn csv(&self) -> &ClusterServiceVersion {
        &self.csv
    }

    /// CRDs shipped with this release.
    #[must_use]
    pub fn crds(&self) -> &[CustomResourceDefinition] {
        &self.crds
    }

    /// Attach a CRD, replacing one with the same name.
    pub fn attach_crd(&mut self, crd: CustomResourceDefinition) {
        match self.crds.iter_mut().find(|c| c.name() == crd.name()) {
            Some(existing) => *existing = crd,
            None => self.crds.push(crd),
        }
    }

    /// Set or clear `replaces`. Blank values clear it.
    pub fn set_replaces(&mut self, replaces: Option<String>) {
        let replaces = replaces
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self.csv.set_replaces(replaces.clone());
        self.replaces = replaces;
    }

    /// Replace `skips`. Blank entries are dropped.
    pub fn set_skips(&mut self, skips: Vec<String>) {
        let skips: Vec<String> = skips
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.csv.set_skips(skips.clone());
        self.skips = skips;
    }

    /// Set or clear the skip range. Blank values clear it.
    pub fn set_skip_range(&mut self, range: Option<String>) {
        let range = range
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self.csv.set_skip_range(range.clone());
        self.skip_range = range;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opkit_manifest::csv::SKIP_RANGE_ANNOTATION;

    #[test]
    fn test_from_csv_reads_relations() {
        let mut csv = ClusterServiceVersion::new("demo.v2.0.0", " 2.0.0 ");
        csv.set_replaces(Some("demo.v1.0.0".to_string()));
        csv.set_skips(vec!["demo.v1.1.0".to_string(), "  ".to_string()]);
        csv.set_skip_range(Some(">=1.0.0 <2.0.0".to_string()));

        let record = VersionRecord::from_csv(csv);

        assert_eq!(record.name(), "demo.v2.0.0");
        assert_eq!(record.version(), "2.0.0");
        assert_eq!(record.replaces(), Some("demo.v1.0.0"));
        assert_eq!(record.skips(), ["demo.v1.1.0".to_string()]);
        assert_eq!(record.skip_range(), Some(">=1.0.0 <2.0.0"));
        assert!(record.is_valid());
    }

    #[test]
    fn test_setters_keep_csv_in_sync() {
        let mut record = VersionRecord::new("demo.v2.0.0", "2.0.0")
            .with_replaces("demo.v1.0.0")
            .with_skips(["demo.v1.1.0"])
            .with_skip_range("<2.0.0");

        assert_eq!(record.csv().replaces(), Some("demo.v1.0.0"));
        assert_eq!(record.csv().skips(), ["demo.v1.1.0".to_string()]);
        assert_eq!(
            record
                .csv()
                .metadata
                .annotation(SKIP_RANGE_ANNOTATION)
                .as_deref(),
            Some("<2.0.0")
        );

        record.set_replaces(Some("   ".to_string()));
        record.set_skip_range(None);
        assert_eq!(record.replaces(), None);
        assert_eq!(record.csv().replaces(), None);
        assert_eq!(record.csv().skip_range(), None);
    }

    #[test]
    fn test_json_output_omits_documents() {
        let record = VersionRecord::new("demo.v1.0.0", "1.0.0");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], "demo.v1.0.0");
        assert_eq!(json["valid"], true);
        assert!(json.get("csv").is_none());
    }
}
