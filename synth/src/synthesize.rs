//! Produces a new project XML document from a parsed legacy project, using the
//! converter, transitive detector and classifier from `resolve`.

use resolve::classify::{IMPLICIT_COMPILE_EXTENSIONS, PRESERVE_PROPERTIES, PROBLEMATIC_TARGETS, REMOVE_PROPERTIES};
use resolve::convert::{convert_references, LegacyReference};
use resolve::transitive::{mark_transitive, minimal_direct_set, DependencyGraph};
use resolve::{MigrationResult, PackageReference, PackageResolver, ParsedLegacyProject, RemovedElementKind};

use crate::document::{NewProjectDocument, XmlItem};
use crate::framework::convert_target_framework_version;
use crate::sdk::detect_sdk;

pub struct SynthesisConfig<'a> {
    pub target_framework_override: Option<&'a str>,
    pub central_package_management: bool,
}

impl Default for SynthesisConfig<'_> {
    fn default() -> Self {
        Self { target_framework_override: None, central_package_management: false }
    }
}

pub struct SynthesisOutput {
    pub document: NewProjectDocument,
    pub result: MigrationResult,
    pub packages: Vec<PackageReference>,
}

pub fn synthesize(
    project: &ParsedLegacyProject,
    dependency_graph: &DependencyGraph,
    resolver: &dyn PackageResolver,
    config: &SynthesisConfig,
) -> SynthesisOutput {
    let output_path = project.path.clone();
    let mut result = MigrationResult::new(project.path.clone(), output_path);

    let sdk = detect_sdk(project);
    let mut doc = NewProjectDocument { sdk: Some(sdk.attribute().to_string()), ..Default::default() };

    let framework = resolve_target_framework(project, config, &mut result, &mut doc);

    emit_preserved_properties(project, &mut doc, &mut result);
    emit_basename_properties(project, &mut doc);

    let packages = migrate_packages(project, &framework, resolver, dependency_graph, &mut doc, &mut result, config);

    emit_project_references(project, &mut doc);
    emit_compile_items(project, &mut doc, &mut result);
    emit_embedded_resources(project, &mut doc);
    emit_content_items(project, &mut doc);
    emit_unconverted_references(&result, &mut doc);
    emit_imports_and_targets(project, &mut doc, &mut result);

    SynthesisOutput { document: doc, result, packages }
}

fn resolve_target_framework(
    project: &ParsedLegacyProject,
    config: &SynthesisConfig,
    result: &mut MigrationResult,
    doc: &mut NewProjectDocument,
) -> String {
    let framework = if let Some(tfv) = project.property("TargetFrameworkVersion") {
        convert_target_framework_version(tfv).unwrap_or_else(|| {
            result.warn(format!("could not convert TargetFrameworkVersion '{tfv}', using override/default"));
            config.target_framework_override.unwrap_or("net8.0").to_string()
        })
    } else if let Some(tf) = project.property("TargetFramework") {
        tf.to_string()
    } else {
        config.target_framework_override.unwrap_or("net8.0").to_string()
    };

    doc.properties.push(("TargetFramework".into(), framework.clone()));

    if let Some(output_type) = project.property("OutputType") {
        doc.properties.push(("OutputType".into(), output_type.to_string()));
    }

    framework
}

fn emit_preserved_properties(project: &ParsedLegacyProject, doc: &mut NewProjectDocument, result: &mut MigrationResult) {
    for name in PRESERVE_PROPERTIES {
        if let Some(value) = project.property(name) {
            if !value.is_empty() {
                doc.properties.push(((*name).to_string(), value.to_string()));
            }
        }
    }
    for name in REMOVE_PROPERTIES {
        if project.property(name).is_some() {
            result.remove(RemovedElementKind::Property, *name, "build-system-generated, subsumed by SDK defaults");
        }
    }
}

fn emit_basename_properties(project: &ParsedLegacyProject, doc: &mut NewProjectDocument) {
    let stem = project.file_stem();
    if let Some(assembly_name) = project.property("AssemblyName") {
        if assembly_name != stem {
            doc.properties.push(("AssemblyName".into(), assembly_name.to_string()));
        }
    }
    if let Some(root_namespace) = project.property("RootNamespace") {
        if root_namespace != stem {
            doc.properties.push(("RootNamespace".into(), root_namespace.to_string()));
        }
    }
}

fn migrate_packages(
    project: &ParsedLegacyProject,
    framework: &str,
    resolver: &dyn PackageResolver,
    dependency_graph: &DependencyGraph,
    doc: &mut NewProjectDocument,
    result: &mut MigrationResult,
    config: &SynthesisConfig,
) -> Vec<PackageReference> {
    let legacy_refs: Vec<LegacyReference> = project
        .items_of_kind("Reference")
        .map(|item| LegacyReference {
            include: item.include.clone(),
            hint_path: item.metadata_str("HintPath").map(str::to_string),
            private: item.metadata_flag("Private"),
            metadata: item.metadata.clone(),
        })
        .collect();

    let mut conversion = convert_references(&legacy_refs, framework, resolver);

    for entry in &project.packages_config {
        if !conversion.packages.iter().any(|p| p.id.eq_ignore_ascii_case(&entry.id)) {
            let mut pkg = PackageReference::new(entry.id.clone(), entry.version.clone());
            if entry.development_dependency {
                pkg.metadata.insert("PrivateAssets".into(), "all".into());
            }
            conversion.packages.push(pkg);
        }
    }

    for warning in &conversion.warnings {
        result.warn(warning.clone());
    }
    result.unconverted.extend(conversion.unconverted.clone());

    let marked = mark_transitive(&conversion.packages, dependency_graph);
    let minimal = minimal_direct_set(&marked);

    let mut items = Vec::new();
    for pkg in &minimal {
        let mut item = XmlItem::new("PackageReference", pkg.id.clone());
        if !config.central_package_management {
            item = item.with_attr("Version", pkg.version.clone());
        }
        for (k, v) in &pkg.metadata {
            item = item.with_attr(k.clone(), v.clone());
        }
        items.push(item);
    }
    if !items.is_empty() {
        doc.item_groups.push(items);
    }

    result.packages = minimal.clone();
    minimal
}

fn emit_project_references(project: &ParsedLegacyProject, doc: &mut NewProjectDocument) {
    const ALLOW_LIST: &[&str] = &["Name", "Private", "SpecificVersion"];
    let mut items = Vec::new();
    for item in project.items_of_kind("ProjectReference") {
        let mut xml_item = XmlItem::new("ProjectReference", item.include.clone());
        for key in ALLOW_LIST {
            if let Some(v) = item.metadata_str(key) {
                xml_item = xml_item.with_attr(*key, v.to_string());
            }
        }
        items.push(xml_item);
    }
    if !items.is_empty() {
        doc.item_groups.push(items);
    }
}

fn emit_compile_items(project: &ParsedLegacyProject, doc: &mut NewProjectDocument, result: &mut MigrationResult) {
    let mut items = Vec::new();
    for item in project.items_of_kind("Compile") {
        let outside_tree = item.include.starts_with("..");
        let has_interesting_metadata = item.metadata_str("Generator").is_some()
            || item.metadata_str("DesignTime").is_some()
            || item.metadata_str("Visible").is_some()
            || item.metadata_flag("AutoGen");
        let is_exclusion = item.metadata_str("DependentUpon").is_some();

        if !outside_tree && !has_interesting_metadata && !is_exclusion {
            let ext_is_implicit = IMPLICIT_COMPILE_EXTENSIONS
                .iter()
                .any(|ext| item.include.to_ascii_lowercase().ends_with(&format!(".{ext}")));
            if ext_is_implicit {
                result.remove(RemovedElementKind::Item, item.include.clone(), "implicitly included by the SDK glob");
                continue;
            }
        }

        let mut xml_item = XmlItem::new("Compile", item.include.clone());
        for key in ["Generator", "DesignTime", "Visible", "DependentUpon", "Link"] {
            if let Some(v) = item.metadata_str(key) {
                xml_item = xml_item.with_metadata(key, v.to_string());
            }
        }
        items.push(xml_item);
    }
    if !items.is_empty() {
        doc.item_groups.push(items);
    }
}

fn emit_embedded_resources(project: &ParsedLegacyProject, doc: &mut NewProjectDocument) {
    let mut items = Vec::new();
    for item in project.items_of_kind("EmbeddedResource") {
        let has_metadata = !item.metadata.is_empty();
        if !has_metadata {
            continue;
        }
        let mut xml_item = XmlItem::new("EmbeddedResource", item.include.clone()).update();
        for (key, value) in &item.metadata {
            xml_item = xml_item.with_metadata(key.clone(), value.clone());
        }
        items.push(xml_item);
    }
    if !items.is_empty() {
        doc.item_groups.push(items);
    }
}

fn emit_content_items(project: &ParsedLegacyProject, doc: &mut NewProjectDocument) {
    let mut items = Vec::new();
    for item in project.items_of_kind("Content") {
        if let Some(copy) = item.metadata_str("CopyToOutputDirectory") {
            let xml_item = XmlItem::new("None", item.include.clone()).with_metadata("CopyToOutputDirectory", copy.to_string());
            items.push(xml_item);
        }
    }
    if !items.is_empty() {
        doc.item_groups.push(items);
    }
}

fn emit_unconverted_references(result: &MigrationResult, doc: &mut NewProjectDocument) {
    let mut items = Vec::new();
    for unconverted in &result.unconverted {
        let mut item = XmlItem::new("Reference", unconverted.identity.to_string());
        if let Some(hint) = &unconverted.hint_path {
            item = item.with_metadata("HintPath", hint.clone());
        }
        if unconverted.private {
            item = item.with_metadata("Private", "True");
        }
        for (k, v) in &unconverted.metadata {
            item = item.with_metadata(k.clone(), v.clone());
        }
        items.push(item);
    }
    if !items.is_empty() {
        doc.item_groups.push(items);
    }
}

fn emit_imports_and_targets(project: &ParsedLegacyProject, doc: &mut NewProjectDocument, result: &mut MigrationResult) {
    for import in &project.raw_imports {
        let is_removable = REMOVE_PROPERTIES.iter().any(|p| import.contains(p)) || import.contains("Microsoft.Common.props") || import.contains("Microsoft.CSharp.targets");
        if is_removable {
            result.remove(RemovedElementKind::Import, import.clone(), "default import subsumed by the SDK");
            continue;
        }
        doc.imports.push(import.clone());
    }

    for target in &project.raw_targets {
        let is_problematic = PROBLEMATIC_TARGETS.iter().any(|name| target.contains(name));
        if is_problematic && !target.trim().is_empty() {
            result.warn(format!("custom target overrides a build hook the SDK also defines: {target}"));
        }
        doc.raw_targets.push(target.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolve::resolver::OfflineResolver;
    use resolve::{LegacyPackageEntry, ProjectItem};
    use std::collections::BTreeMap;

    fn reference_item(include: &str, hint_path: &str) -> ProjectItem {
        let mut metadata = BTreeMap::new();
        metadata.insert("HintPath".into(), hint_path.into());
        ProjectItem { kind: "Reference".into(), include: include.into(), metadata }
    }

    #[test]
    fn end_to_end_migrates_packages_config_reference() {
        let mut project = ParsedLegacyProject::default();
        project.path = "App.csproj".into();
        project.properties.insert("TargetFrameworkVersion".into(), "v4.7.2".into());
        project.items.push(reference_item(
            "Newtonsoft.Json, Version=12.0.3, Culture=neutral, PublicKeyToken=30ad4fe6b2a6aeed",
            r"..\packages\Newtonsoft.Json.12.0.3\lib\net45\Newtonsoft.Json.dll",
        ));
        project.packages_config.push(LegacyPackageEntry {
            id: "Newtonsoft.Json".into(),
            version: "12.0.3".into(),
            target_framework: None,
            development_dependency: false,
        });

        let resolver = OfflineResolver::bundled();
        let output = synthesize(&project, &DependencyGraph::new(), &resolver, &SynthesisConfig::default());
        let xml = output.document.to_xml_string();

        assert!(xml.contains("<TargetFramework>net472</TargetFramework>"));
        assert!(xml.contains(r#"<PackageReference Include="Newtonsoft.Json" Version="12.0.3" />"#));
        assert!(!xml.contains("<Reference "));
        assert!(output.result.success);
    }

    #[test]
    fn target_framework_conversion() {
        let mut project = ParsedLegacyProject::default();
        project.properties.insert("TargetFrameworkVersion".into(), "v4.7.2".into());
        let resolver = OfflineResolver::bundled();
        let output = synthesize(&project, &DependencyGraph::new(), &resolver, &SynthesisConfig::default());
        assert!(output.document.to_xml_string().contains("<TargetFramework>net472</TargetFramework>"));
    }
}
