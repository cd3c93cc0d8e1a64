//! Light-weight re-scan of an already-migrated SDK-style project, used by the
//! post-migration cleanup commands (`clean-deps`, `clean-cpm`) that operate on output
//! rather than legacy input. Unlike `legacy_xml`, this only extracts the handful of
//! elements those commands care about.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use resolve::error::InputError;
use resolve::PackageReference;

#[derive(Debug, Default)]
pub struct SdkProjectScan {
    pub target_framework: Option<String>,
    pub packages: Vec<PackageReference>,
}

pub fn scan_sdk_project(path: &Path) -> Result<SdkProjectScan, InputError> {
    let contents = std::fs::read_to_string(path)?;
    scan_sdk_project_str(&contents)
}

fn scan_sdk_project_str(xml: &str) -> Result<SdkProjectScan, InputError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut scan = SdkProjectScan::default();
    let mut in_target_framework = false;

    let mut buf = Vec::new();
    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| InputError::Xml(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(e) if e.name().as_ref() == b"TargetFramework" => {
                in_target_framework = true;
            }
            Event::End(e) if e.name().as_ref() == b"TargetFramework" => {
                in_target_framework = false;
            }
            Event::Text(t) if in_target_framework => {
                scan.target_framework = Some(t.unescape().unwrap_or_default().into_owned());
            }
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"PackageReference" => {
                let mut id = None;
                let mut version = None;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default().into_owned();
                    match attr.key.as_ref() {
                        b"Include" => id = Some(value),
                        b"Version" => version = Some(value),
                        _ => {}
                    }
                }
                if let Some(id) = id {
                    scan.packages.push(PackageReference::new(id, version.unwrap_or_default()));
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(scan)
}

/// Drops every `PackageReference` line whose `Include` matches (case-insensitively)
/// one of `ids`, by whole-line string matching against the rendered attribute. Good
/// enough for the single-element-per-line output this tool (and most hand-formatted
/// SDK-style projects) produces; a reference with interesting child metadata split
/// across lines is left alone rather than risking a partial removal.
pub fn remove_package_reference_lines(contents: &str, ids: &[String]) -> String {
    let lower_ids: Vec<String> = ids.iter().map(|id| id.to_ascii_lowercase()).collect();
    contents
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if !trimmed.starts_with("<PackageReference") {
                return true;
            }
            !lower_ids.iter().any(|id| {
                let needle = format!("include=\"{id}\"");
                trimmed.to_ascii_lowercase().contains(&needle)
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

/// Strips the `Version="..."` attribute from every `PackageReference` line, for the
/// switch to central package management where versions live in `Directory.Packages.props`.
pub fn strip_package_reference_versions(contents: &str) -> String {
    contents
        .lines()
        .map(|line| {
            if line.trim_start().starts_with("<PackageReference") {
                strip_attribute(line, "Version")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

fn strip_attribute(line: &str, attr: &str) -> String {
    let needle = format!(" {attr}=\"");
    let Some(start) = line.find(&needle) else {
        return line.to_string();
    };
    let value_start = start + needle.len();
    let Some(rel_end) = line[value_start..].find('"') else {
        return line.to_string();
    };
    let end = value_start + rel_end + 1;
    format!("{}{}", &line[..start], &line[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_target_framework_and_package_references() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json" Version="13.0.3" />
    <PackageReference Include="Serilog" Version="3.0.0" />
  </ItemGroup>
</Project>"#;
        let scan = scan_sdk_project_str(xml).unwrap();
        assert_eq!(scan.target_framework.as_deref(), Some("net8.0"));
        assert_eq!(scan.packages.len(), 2);
        assert_eq!(scan.packages[0].id, "Newtonsoft.Json");
    }

    #[test]
    fn removes_only_the_matching_package_reference() {
        let contents = "<ItemGroup>\n    <PackageReference Include=\"A\" Version=\"1.0\" />\n    <PackageReference Include=\"B\" Version=\"2.0\" />\n</ItemGroup>\n";
        let result = remove_package_reference_lines(contents, &["A".to_string()]);
        assert!(!result.contains("Include=\"A\""));
        assert!(result.contains("Include=\"B\""));
    }

    #[test]
    fn strips_version_attribute_leaving_include() {
        let contents = "    <PackageReference Include=\"A\" Version=\"1.0\" />\n";
        let result = strip_package_reference_versions(contents);
        assert!(result.contains("Include=\"A\""));
        assert!(!result.contains("Version"));
    }
}
