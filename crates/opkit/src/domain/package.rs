//! The package aggregate and its editing operations.
//!
//! Every mutating method ends with [`Package::revalidate`], which re-resolves
//! each channel's version list and re-runs validation so the record
//! `valid` flags and channel lists never go stale.

use super::{Channel, VersionRecord};
use crate::error::{Error, Result};
use crate::graph;
use crate::validation::{self, ValidationReport};
use opkit_manifest::{PackageChannel, PackageManifest};

/// An operator package: its releases and upgrade channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    name: String,
    records: Vec<VersionRecord>,
    channels: Vec<Channel>,
    dangling_default: Option<String>,
    report: ValidationReport,
}

impl Package {
    /// Create an empty package.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(name, Vec::new(), Vec::new())
    }

    /// Assemble a package from records and channels, resolving and
    /// validating it.
    pub fn from_parts(
        name: impl Into<String>,
        records: Vec<VersionRecord>,
        channels: Vec<Channel>,
    ) -> Self {
        let mut package = Self {
            name: name.into(),
            records,
            channels,
            dangling_default: None,
            report: ValidationReport::default(),
        };
        package.revalidate();
        package
    }

    /// Assemble a package from a parsed manifest and its records.
    ///
    /// The default channel comes from `defaultChannel`; a name that matches
    /// no channel leaves every channel non-default and is reported by
    /// validation.
    #[must_use]
    pub fn from_manifest(manifest: &PackageManifest, records: Vec<VersionRecord>) -> Self {
        let default_channel = manifest.default_channel.as_deref().map(str::trim);
        let channels: Vec<Channel> = manifest
            .channels
            .iter()
            .map(|c| {
                let mut channel = Channel::new(c.name.trim(), c.current_csv.trim());
                channel.set_default(default_channel == Some(channel.name()));
                channel
            })
            .collect();

        let dangling_default = default_channel
            .filter(|name| !channels.iter().any(|c| c.name() == *name))
            .map(str::to_string);

        let mut package = Self {
            name: manifest.package_name.trim().to_string(),
            records,
            channels,
            dangling_default,
            report: ValidationReport::default(),
        };
        package.revalidate();
        package
    }

    /// Render the package manifest for this package.
    #[must_use]
    pub fn to_manifest(&self) -> PackageManifest {
        PackageManifest {
            package_name: self.name.clone(),
            channels: self
                .channels
                .iter()
                .map(|c| PackageChannel {
                    name: c.name().to_string(),
                    current_csv: c.head().to_string(),
                })
                .collect(),
            default_channel: self.default_channel().map(|c| c.name().to_string()),
        }
    }

    /// Package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All version records, in insertion order.
    #[must_use]
    pub fn records(&self) -> &[VersionRecord] {
        &self.records
    }

    /// All channels, in insertion order.
    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// A declared default channel that names no channel, as read from a
    /// manifest. Cleared by [`Package::set_default_channel`].
    #[must_use]
    pub fn dangling_default(&self) -> Option<&str> {
        self.dangling_default.as_deref()
    }

    /// Findings of the last validation pass.
    #[must_use]
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Look up a record by CSV name.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&VersionRecord> {
        self.records.iter().find(|r| r.name() == name)
    }

    /// Look up a record by version string.
    #[must_use]
    pub fn record_by_version(&self, version: &str) -> Option<&VersionRecord> {
        self.records.iter().find(|r| r.version() == version)
    }

    /// Look up a channel by name.
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name() == name)
    }

    /// The default channel, if one is marked.
    #[must_use]
    pub fn default_channel(&self) -> Option<&Channel> {
        self.channels.iter().find(|c| c.is_default())
    }

    /// Whether a channel passes the channel validity check.
    #[must_use]
    pub fn is_channel_valid(&self, channel: &Channel) -> bool {
        validation::channel_is_valid(channel, &self.records)
    }

    /// Records reachable from at least one channel, in record order.
    #[must_use]
    pub fn published_records(&self) -> Vec<&VersionRecord> {
        self.records
            .iter()
            .filter(|r| {
                self.channels
                    .iter()
                    .any(|c| c.versions().iter().any(|v| v == r.version()))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Add a release.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a record with the same name exists.
    pub fn add_version(&mut self, record: VersionRecord) -> Result<()> {
        if self.record(record.name()).is_some() {
            return Err(Error::Validation(format!(
                "A version named '{}' already exists",
                record.name()
            )));
        }
        tracing::debug!(package = %self.name, csv = %record.name(), "Adding version");
        self.records.push(record);
        self.revalidate();
        Ok(())
    }

    /// Remove a release and return it.
    ///
    /// References to it from other records are left alone; the resolver
    /// treats them as broken references.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionNotFound`] if no record has this name.
    pub fn remove_version(&mut self, name: &str) -> Result<VersionRecord> {
        let index = self.record_index(name)?;
        let removed = self.records.remove(index);
        tracing::debug!(package = %self.name, csv = %name, "Removed version");
        self.revalidate();
        Ok(removed)
    }

    /// Set or clear `replaces` on a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionNotFound`] if no record has this name.
    pub fn set_replaces(&mut self, name: &str, replaces: Option<String>) -> Result<()> {
        let index = self.record_index(name)?;
        self.records[index].set_replaces(replaces);
        self.revalidate();
        Ok(())
    }

    /// Replace the `skips` list of a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionNotFound`] if no record has this name.
    pub fn set_skips(&mut self, name: &str, skips: Vec<String>) -> Result<()> {
        let index = self.record_index(name)?;
        self.records[index].set_skips(skips);
        self.revalidate();
        Ok(())
    }

    /// Set or clear the skip range of a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionNotFound`] if no record has this name.
    pub fn set_skip_range(&mut self, name: &str, range: Option<String>) -> Result<()> {
        let index = self.record_index(name)?;
        self.records[index].set_skip_range(range);
        self.revalidate();
        Ok(())
    }

    /// Add a channel. The first channel of a package becomes the default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a channel with the same name exists.
    pub fn add_channel(&mut self, name: &str, head: &str) -> Result<()> {
        if self.channel(name).is_some() {
            return Err(Error::Validation(format!(
                "A channel named '{name}' already exists"
            )));
        }
        let mut channel = Channel::new(name, head);
        channel.set_default(self.channels.is_empty());
        self.channels.push(channel);
        self.revalidate();
        Ok(())
    }

    /// Remove a channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelNotFound`] if no channel has this name.
    pub fn remove_channel(&mut self, name: &str) -> Result<Channel> {
        let index = self.channel_index(name)?;
        let removed = self.channels.remove(index);
        self.revalidate();
        Ok(removed)
    }

    /// Point a channel at a new head CSV.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelNotFound`] if no channel has this name.
    pub fn set_channel_head(&mut self, channel: &str, head: &str) -> Result<()> {
        let index = self.channel_index(channel)?;
        self.channels[index].set_head(head.to_string());
        self.revalidate();
        Ok(())
    }

    /// Mark a channel as the only default, or clear the default with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelNotFound`] if the named channel does not exist.
    pub fn set_default_channel(&mut self, channel: Option<&str>) -> Result<()> {
        if let Some(name) = channel {
            self.channel_index(name)?;
        }
        for c in &mut self.channels {
            let is_default = Some(c.name()) == channel;
            c.set_default(is_default);
        }
        self.dangling_default = None;
        self.revalidate();
        Ok(())
    }

    /// Re-resolve channels and re-run validation.
    pub fn revalidate(&mut self) {
        for channel in &mut self.channels {
            let versions = graph::resolve_channel_versions(&self.records, channel.head());
            channel.set_versions(versions);
        }
        self.report = validation::validate_package(self);
        validation::apply_record_validity(&mut self.records, &self.report);
        tracing::trace!(
            package = %self.name,
            errors = self.report.error_count(),
            warnings = self.report.warning_count(),
            "Package revalidated"
        );
    }

    fn record_index(&self, name: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.name() == name)
            .ok_or_else(|| Error::VersionNotFound(name.to_string()))
    }

    fn channel_index(&self, name: &str) -> Result<usize> {
        self.channels
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| Error::ChannelNotFound(name.to_string()))
    }
}
