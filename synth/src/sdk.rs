use resolve::ParsedLegacyProject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sdk {
    Default,
    WindowsDesktop,
    Web,
}

impl Sdk {
    pub fn attribute(self) -> &'static str {
        match self {
            Sdk::Default => "Microsoft.NET.Sdk",
            Sdk::WindowsDesktop => "Microsoft.NET.Sdk.WindowsDesktop",
            Sdk::Web => "Microsoft.NET.Sdk.Web",
        }
    }
}

/// The SDK attribute follows from detected capabilities, not just the file extension
/// — a desktop UI variant when WPF/WinForms items are declared, a web variant when
/// web-app markers are present, default otherwise.
pub fn detect_sdk(project: &ParsedLegacyProject) -> Sdk {
    let has_desktop_markers = project.items_of_kind("Page").next().is_some()
        || project.items_of_kind("ApplicationDefinition").next().is_some()
        || project.property("UseWPF").map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false)
        || project.property("UseWindowsForms").map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false);
    if has_desktop_markers {
        return Sdk::WindowsDesktop;
    }

    let has_web_markers = project.property("ProjectTypeGuids").map(|g| g.contains("349c5851-65df-11da-9384-00065b846f21")).unwrap_or(false)
        || project.items_of_kind("Content").any(|i| i.include.eq_ignore_ascii_case("web.config"));
    if has_web_markers {
        return Sdk::Web;
    }

    Sdk::Default
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn defaults_to_vanilla_sdk() {
        let project = ParsedLegacyProject::default();
        assert_eq!(detect_sdk(&project), Sdk::Default);
    }

    #[test]
    fn wpf_property_selects_windows_desktop_sdk() {
        let mut project = ParsedLegacyProject::default();
        project.properties.insert("UseWPF".into(), "true".into());
        assert_eq!(detect_sdk(&project), Sdk::WindowsDesktop);
    }

    #[test]
    fn web_config_content_item_selects_web_sdk() {
        let mut project = ParsedLegacyProject::default();
        project.items.push(resolve::ProjectItem {
            kind: "Content".into(),
            include: "Web.config".into(),
            metadata: BTreeMap::new(),
        });
        assert_eq!(detect_sdk(&project), Sdk::Web);
    }
}
