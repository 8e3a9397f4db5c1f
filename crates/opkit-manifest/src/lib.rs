//! Typed YAML documents for Operator Lifecycle Manager packaging metadata.
//!
//! This library models the three document kinds that make up an operator
//! package on disk:
//!
//! - [`ClusterServiceVersion`]: one operator release
//! - [`CustomResourceDefinition`]: an API shipped with a release
//! - [`PackageManifest`]: the package name, its channels and their heads
//!
//! Only the fields the packaging workflow reads or edits are typed. Every
//! other field is carried through untouched so a document survives a
//! parse/render cycle.
//!
//! # Example
//!
//! ```
//! use opkit_manifest::{parse_documents, Document};
//!
//! let yaml = r#"
//! packageName: etcd
//! defaultChannel: alpha
//! channels:
//!   - name: alpha
//!     currentCSV: etcdoperator.v0.9.4
//! "#;
//!
//! let docs = parse_documents(yaml).unwrap();
//! assert!(matches!(docs[0], Document::PackageManifest(_)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod crd;
pub mod csv;
pub mod document;
pub mod error;
pub mod meta;
pub mod package;
pub mod warning;

pub use crd::CustomResourceDefinition;
pub use csv::ClusterServiceVersion;
pub use document::{parse_documents, parse_documents_lenient, to_yaml, Document, DocumentKind};
pub use error::{Error, Result};
pub use meta::ObjectMeta;
pub use package::{PackageChannel, PackageManifest};
pub use warning::Warning;
