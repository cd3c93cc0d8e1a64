//! Reads legacy `.csproj` and `packages.config` XML into the read-only evaluator view
//! (`resolve::ParsedLegacyProject`) the rest of the pipeline depends on. A hand-rolled,
//! non-validating event walk over `quick_xml::Reader` — we only need property/item
//! shape, not a general MSBuild evaluator (conditions, imports of imports, etc. are
//! left as opaque strings).

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use resolve::error::InputError;
use resolve::{LegacyPackageEntry, ParsedLegacyProject, ProjectItem};

/// Item element names that carry build-relevant metadata vs. everything else (ignored
/// children of `Project`, e.g. `Choose`, `UsingTask`, which the original build
/// tolerated and so must we, by just not producing items for them).
const KNOWN_ITEM_KINDS: &[&str] = &[
    "Reference",
    "ProjectReference",
    "Compile",
    "Content",
    "EmbeddedResource",
    "None",
    "Page",
    "ApplicationDefinition",
    "Resource",
    "Folder",
];

pub fn parse_project_file(path: &Path) -> Result<ParsedLegacyProject, InputError> {
    let contents = std::fs::read_to_string(path)?;
    let mut project = parse_project_str(&contents)?;
    project.path = path.to_path_buf();

    if let Some(config_path) = sibling_packages_config(path) {
        if config_path.exists() {
            let config_contents = std::fs::read_to_string(&config_path)?;
            project.packages_config = parse_packages_config_str(&config_contents)?;
        }
    }

    Ok(project)
}

fn sibling_packages_config(project_path: &Path) -> Option<std::path::PathBuf> {
    project_path.parent().map(|dir| dir.join("packages.config"))
}

fn item_from_attrs(
    kind: &str,
    e: &quick_xml::events::BytesStart<'_>,
) -> (String, BTreeMap<String, String>, String) {
    let mut metadata = BTreeMap::new();
    let mut include = String::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().unwrap_or_default().into_owned();
        if key == "Include" || key == "Update" {
            include = value;
        } else {
            metadata.insert(key, value);
        }
    }
    (kind.to_string(), metadata, include)
}

pub fn parse_project_str(xml: &str) -> Result<ParsedLegacyProject, InputError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut project = ParsedLegacyProject::default();
    let mut saw_root = false;

    // Stack of currently-open PropertyGroup/ItemGroup/Target/Import context, plus the
    // name of whatever leaf element is accumulating text (a property or a raw target
    // body).
    let mut in_property_group = false;
    let mut in_item_group = false;
    let mut in_target = false;
    let mut target_depth = 0u32;
    let mut current_property: Option<String> = None;
    let mut property_text = String::new();
    let mut current_item: Option<(String, BTreeMap<String, String>, String)> = None;
    let mut item_depth = 0u32;
    let mut current_metadata_key: Option<String> = None;
    let mut metadata_text = String::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(|e| InputError::Xml(e.to_string()))? {
            Event::Eof => break,
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

                match name.as_str() {
                    "Project" => {
                        saw_root = true;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"ToolsVersion" {
                                project.tools_version =
                                    Some(attr.unescape_value().unwrap_or_default().into_owned());
                            }
                        }
                    }
                    "PropertyGroup" => in_property_group = true,
                    "ItemGroup" => in_item_group = true,
                    "Import" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"Project" {
                                project.raw_imports.push(attr.unescape_value().unwrap_or_default().into_owned());
                            }
                        }
                    }
                    "Target" => {
                        if !in_target {
                            in_target = true;
                            target_depth = 0;
                            let mut target_name = String::new();
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"Name" {
                                    target_name = attr.unescape_value().unwrap_or_default().into_owned();
                                }
                            }
                            project.raw_targets.push(target_name);
                        } else {
                            target_depth += 1;
                        }
                    }
                    _ if in_target => {
                        target_depth += 1;
                    }
                    _ if in_item_group && current_item.is_none() && KNOWN_ITEM_KINDS.contains(&name.as_str()) => {
                        let (kind, metadata, include) = item_from_attrs(&name, &e);
                        current_item = Some((kind, metadata, include));
                        item_depth = 0;
                    }
                    _ if current_item.is_some() => {
                        item_depth += 1;
                        current_metadata_key = Some(name.clone());
                        metadata_text.clear();
                    }
                    _ if in_property_group && current_property.is_none() => {
                        current_property = Some(name.clone());
                        property_text.clear();
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

                match name.as_str() {
                    "Project" => {
                        saw_root = true;
                    }
                    "Import" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"Project" {
                                project.raw_imports.push(attr.unescape_value().unwrap_or_default().into_owned());
                            }
                        }
                    }
                    _ if in_target => {}
                    _ if in_item_group && current_item.is_none() && KNOWN_ITEM_KINDS.contains(&name.as_str()) => {
                        let (kind, metadata, include) = item_from_attrs(&name, &e);
                        project.items.push(ProjectItem { kind, include, metadata });
                    }
                    _ if current_item.is_some() => {
                        if let Some((_, metadata, _)) = current_item.as_mut() {
                            metadata.insert(name, String::new());
                        }
                    }
                    _ if in_property_group && current_property.is_none() => {
                        project.properties.insert(name, String::new());
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                let text = t.unescape().unwrap_or_default().into_owned();
                if current_metadata_key.is_some() {
                    metadata_text.push_str(&text);
                } else if current_property.is_some() {
                    property_text.push_str(&text);
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if in_target {
                    if target_depth == 0 && name == "Target" {
                        in_target = false;
                    } else if target_depth > 0 {
                        target_depth -= 1;
                    }
                    continue;
                }
                if let Some(key) = current_metadata_key.take() {
                    if key == name {
                        if let Some((_, metadata, _)) = current_item.as_mut() {
                            metadata.insert(key, std::mem::take(&mut metadata_text));
                        }
                        continue;
                    }
                    current_metadata_key = Some(key);
                    continue;
                }
                if let Some((kind, _, _)) = current_item.as_ref() {
                    if kind == &name {
                        let (kind, metadata, include) = current_item.take().unwrap();
                        project.items.push(ProjectItem { kind, include, metadata });
                        continue;
                    }
                }
                if let Some(prop) = current_property.as_ref() {
                    if prop == &name {
                        project.properties.insert(
                            current_property.take().unwrap(),
                            std::mem::take(&mut property_text),
                        );
                        continue;
                    }
                }
                match name.as_str() {
                    "PropertyGroup" => in_property_group = false,
                    "ItemGroup" => in_item_group = false,
                    _ => {}
                }
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(InputError::MissingRoot);
    }

    Ok(project)
}

pub fn parse_packages_config_str(xml: &str) -> Result<Vec<LegacyPackageEntry>, InputError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(|e| InputError::Xml(e.to_string()))? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"package" => {
                let mut id = String::new();
                let mut version = String::new();
                let mut target_framework = None;
                let mut development_dependency = false;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default().into_owned();
                    match attr.key.as_ref() {
                        b"id" => id = value,
                        b"version" => version = value,
                        b"targetFramework" => target_framework = Some(value),
                        b"developmentDependency" => development_dependency = value.eq_ignore_ascii_case("true"),
                        _ => {}
                    }
                }
                entries.push(LegacyPackageEntry { id, version, target_framework, development_dependency });
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0" DefaultTargets="Build" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <TargetFrameworkVersion>v4.7.2</TargetFrameworkVersion>
    <AssemblyName>MyApp</AssemblyName>
    <ProjectGuid>{AAAA-BBBB}</ProjectGuid>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="Newtonsoft.Json, Version=9.0.0.0, Culture=neutral, PublicKeyToken=30ad4fe6b2a6aeed">
      <HintPath>..\packages\Newtonsoft.Json.9.0.1\lib\net45\Newtonsoft.Json.dll</HintPath>
    </Reference>
    <Compile Include="Program.cs" />
  </ItemGroup>
  <Import Project="$(MSBuildToolsPath)\Microsoft.CSharp.targets" />
</Project>
"#;

    #[test]
    fn parses_properties_items_and_imports() {
        let project = parse_project_str(SAMPLE).unwrap();
        assert_eq!(project.tools_version.as_deref(), Some("15.0"));
        assert_eq!(project.property("TargetFrameworkVersion"), Some("v4.7.2"));
        assert_eq!(project.property("AssemblyName"), Some("MyApp"));
        assert_eq!(project.raw_imports.len(), 1);

        let refs: Vec<_> = project.items_of_kind("Reference").collect();
        assert_eq!(refs.len(), 1);
        assert!(refs[0].include.starts_with("Newtonsoft.Json"));
        assert_eq!(
            refs[0].metadata_str("HintPath"),
            Some(r"..\packages\Newtonsoft.Json.9.0.1\lib\net45\Newtonsoft.Json.dll")
        );

        let compiles: Vec<_> = project.items_of_kind("Compile").collect();
        assert_eq!(compiles.len(), 1);
        assert_eq!(compiles[0].include, "Program.cs");
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = parse_project_str("<NotAProject></NotAProject>").unwrap_err();
        assert!(matches!(err, InputError::MissingRoot));
    }

    #[test]
    fn parses_packages_config() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<packages>
  <package id="Newtonsoft.Json" version="9.0.1" targetFramework="net472" />
  <package id="xunit" version="2.4.1" targetFramework="net472" developmentDependency="true" />
</packages>"#;
        let entries = parse_packages_config_str(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "Newtonsoft.Json");
        assert!(entries[1].development_dependency);
    }
}
