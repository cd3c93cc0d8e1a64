//! Reference & Package Resolution Core: assembly identity parsing, the package version
//! cache, the resolver (online/offline), the assets resolver, the reference converter,
//! the transitive detector, and the static classification tables.

pub mod assets;
pub mod cache;
pub mod classify;
pub mod convert;
pub mod error;
pub mod identity;
pub mod package;
pub mod project;
pub mod resolver;
pub mod result;
pub mod transitive;
pub mod version;

pub use assets::{AssetResolution, AssetsResolver, ExternalRestore, ResolvedAssembly};
pub use cache::PackageVersionCache;
pub use convert::{convert_references, ConversionResult, LegacyReference};
pub use identity::AssemblyIdentity;
pub use package::{DependencyEdge, PackageReference, PackageResolution, ReferenceFate, UnconvertedReference};
pub use project::{LegacyPackageEntry, ParsedLegacyProject, ProjectItem};
pub use resolver::{OfflineResolver, OnlineResolver, PackageResolver};
pub use result::{MigrationResult, RemovedElement, RemovedElementKind};
pub use transitive::{mark_transitive, minimal_direct_set, DependencyGraph};
pub use version::{AssemblyVersion, PackageVersion, PackageVersionCore, VersionError};
