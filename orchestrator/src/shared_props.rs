//! Solution-wide shared properties file: properties from `classify::SHARED_PROPERTIES`
//! whose value is identical across at least two projects graduate out of every
//! individual project file into one shared file.

use std::collections::HashMap;

use resolve::classify::SHARED_PROPERTIES;
use resolve::ParsedLegacyProject;

/// Returns the properties to place in the shared file, plus the name of every property
/// that was promoted (so callers can drop it from the per-project output).
pub fn extract_shared_properties(projects: &[ParsedLegacyProject]) -> Vec<(String, String)> {
    let mut seen: HashMap<&str, HashMap<&str, usize>> = HashMap::new();

    for project in projects {
        for name in SHARED_PROPERTIES {
            if let Some(value) = project.property(name) {
                *seen.entry(name).or_default().entry(value).or_default() += 1;
            }
        }
    }

    let mut shared = Vec::new();
    for name in SHARED_PROPERTIES {
        if let Some(values) = seen.get(name) {
            if let Some((value, count)) = values.iter().max_by_key(|(_, count)| **count) {
                if *count >= 2 {
                    shared.push(((*name).to_string(), (*value).to_string()));
                }
            }
        }
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with(name: &str, value: &str) -> ParsedLegacyProject {
        let mut project = ParsedLegacyProject::default();
        project.properties.insert(name.to_string(), value.to_string());
        project
    }

    #[test]
    fn promotes_property_shared_by_at_least_two_projects() {
        let projects = vec![
            project_with("Company", "Contoso"),
            project_with("Company", "Contoso"),
            project_with("Company", "Fabrikam"),
        ];
        let shared = extract_shared_properties(&projects);
        assert_eq!(shared, vec![("Company".to_string(), "Contoso".to_string())]);
    }

    #[test]
    fn single_occurrence_is_not_promoted() {
        let projects = vec![project_with("Copyright", "2024 Contoso")];
        assert!(extract_shared_properties(&projects).is_empty());
    }
}
