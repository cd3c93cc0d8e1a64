//! Legacy `<TargetFrameworkVersion>vX.Y.Z</TargetFrameworkVersion>` → SDK-style moniker.

/// `v4.7.2` → `net472`; `v4.5` → `net45`. A leading `v` is optional on the input.
pub fn convert_target_framework_version(legacy: &str) -> Option<String> {
    let trimmed = legacy.trim().trim_start_matches('v');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    Some(format!("net{digits}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_v4_7_2() {
        assert_eq!(convert_target_framework_version("v4.7.2").as_deref(), Some("net472"));
    }

    #[test]
    fn handles_two_part_versions() {
        assert_eq!(convert_target_framework_version("v4.5").as_deref(), Some("net45"));
    }
}
