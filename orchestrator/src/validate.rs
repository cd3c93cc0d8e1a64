//! Post-migration validator: re-parses each written output and confirms schema
//! validity plus absence of duplicate items. Failures are always warnings — never
//! rollbacks.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use resolve::error::ValidationError;

pub fn validate_output(path: &Path) -> Result<(), ValidationError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ValidationError {
        path: path.to_path_buf(),
        message: format!("could not re-read output: {e}"),
    })?;

    let mut reader = Reader::from_str(&contents);
    reader.config_mut().trim_text(true);

    let mut saw_root_with_sdk = false;
    let mut seen_includes: Vec<String> = Vec::new();
    let mut duplicate = None;

    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| ValidationError {
            path: path.to_path_buf(),
            message: format!("malformed output xml: {e}"),
        })?;
        match event {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "Project" {
                    saw_root_with_sdk = e.attributes().flatten().any(|a| a.key.as_ref() == b"Sdk");
                }
                if let Some(include) = e.attributes().flatten().find_map(|a| {
                    (a.key.as_ref() == b"Include")
                        .then(|| a.unescape_value().unwrap_or_default().into_owned())
                }) {
                    let key = format!("{name}:{include}");
                    if seen_includes.contains(&key) {
                        duplicate = Some(key);
                    } else {
                        seen_includes.push(key);
                    }
                }
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root_with_sdk {
        return Err(ValidationError {
            path: path.to_path_buf(),
            message: "output has no Sdk-style Project root".to_string(),
        });
    }
    if let Some(key) = duplicate {
        return Err(ValidationError { path: path.to_path_buf(), message: format!("duplicate item: {key}") });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_output_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("App.csproj");
        std::fs::write(
            &path,
            r#"<Project Sdk="Microsoft.NET.Sdk"><ItemGroup><PackageReference Include="Foo" Version="1.0.0" /></ItemGroup></Project>"#,
        )
        .unwrap();
        assert!(validate_output(&path).is_ok());
    }

    #[test]
    fn missing_sdk_attribute_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("App.csproj");
        std::fs::write(&path, "<Project></Project>").unwrap();
        assert!(validate_output(&path).is_err());
    }

    #[test]
    fn duplicate_item_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("App.csproj");
        std::fs::write(
            &path,
            r#"<Project Sdk="Microsoft.NET.Sdk"><ItemGroup><PackageReference Include="Foo" Version="1.0.0" /><PackageReference Include="Foo" Version="2.0.0" /></ItemGroup></Project>"#,
        )
        .unwrap();
        assert!(validate_output(&path).is_err());
    }
}
