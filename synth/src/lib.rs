//! Project synthesizer: turns a parsed legacy project into a new SDK-style project
//! XML document, driven by the reference converter, transitive detector and classifier
//! in `resolve`.

pub mod document;
pub mod framework;
pub mod sdk;
pub mod synthesize;

pub use document::{NewProjectDocument, XmlItem};
pub use framework::convert_target_framework_version;
pub use sdk::{detect_sdk, Sdk};
pub use synthesize::{synthesize, SynthesisConfig, SynthesisOutput};

/// Builds the shared-properties file document: one `PropertyGroup` aggregating
/// properties whose value was identical across at least two projects.
pub fn shared_properties_document(properties: &[(String, String)]) -> NewProjectDocument {
    NewProjectDocument {
        sdk: None,
        properties: properties.to_vec(),
        item_groups: Vec::new(),
        imports: Vec::new(),
        raw_targets: Vec::new(),
    }
}

/// Builds the central package list file document: one `ItemGroup` of `PackageVersion`
/// entries.
pub fn central_package_list_document(packages: &[resolve::PackageReference]) -> NewProjectDocument {
    let items = packages
        .iter()
        .map(|p| XmlItem::new("PackageVersion", p.id.clone()).with_attr("Version", p.version.clone()))
        .collect();
    NewProjectDocument {
        sdk: None,
        properties: Vec::new(),
        item_groups: vec![items],
        imports: Vec::new(),
        raw_targets: Vec::new(),
    }
}
