//! Static tables classifying legacy properties as removable, preservable, or
//! promotable to a solution-wide shared file, plus framework-intrinsic assemblies and
//! the problematic-target catalog.

/// Properties the SDK default-imports already cover; carrying them forward would be
/// redundant or actively wrong under the new format.
pub const REMOVE_PROPERTIES: &[&str] = &[
    "ProjectGuid",
    "OutputPath",
    "IntermediateOutputPath",
    "BaseIntermediateOutputPath",
    "AppDesignerFolder",
    "FileAlignment",
    "Configuration",
    "Platform",
    "SchemaVersion",
    "ErrorReport",
    "WarningLevel",
    "Deterministic",
    "TargetFrameworkProfile",
    "OldToolsVersion",
    "ProjectTypeGuids",
    "UpgradeBackupLocation",
];

/// Properties whose semantics differ from SDK defaults and must be copied verbatim.
pub const PRESERVE_PROPERTIES: &[&str] = &[
    "LangVersion",
    "Nullable",
    "AllowUnsafeBlocks",
    "DefineConstants",
    "NoWarn",
    "TreatWarningsAsErrors",
    "SignAssembly",
    "AssemblyOriginatorKeyFile",
    "DelaySign",
    "ApplicationIcon",
    "StartupObject",
];

/// Properties that graduate to a solution-wide shared properties file when their value
/// is identical across at least two projects.
pub const SHARED_PROPERTIES: &[&str] = &[
    "Company",
    "Copyright",
    "Version",
    "Authors",
    "Product",
    "NeutralLanguage",
    "PackageLicenseExpression",
    "RepositoryUrl",
];

/// Source extensions the SDK includes implicitly when the file lives inside the
/// project directory tree; no explicit `<Compile>` entry is needed for these.
pub const IMPLICIT_COMPILE_EXTENSIONS: &[&str] = &["cs", "vb", "fs"];

/// Legacy target names whose presence is almost always a sign of hand-edited build
/// customization that the SDK cannot absorb automatically.
pub const PROBLEMATIC_TARGETS: &[&str] = &[
    "BeforeBuild",
    "AfterBuild",
    "BeforeCompile",
    "AfterCompile",
    "BeforeResolveReferences",
];

/// Framework-intrinsic assembly names per moniker family: references to these are
/// dropped silently by the converter when they carry no hint path.
pub fn framework_intrinsics(framework: &str) -> &'static [&'static str] {
    if framework.starts_with("net4") || framework.starts_with("v4") {
        &[
            "mscorlib",
            "System",
            "System.Core",
            "System.Data",
            "System.Xml",
            "System.Xml.Linq",
            "System.Net.Http",
            "Microsoft.CSharp",
        ]
    } else {
        &["mscorlib", "System", "System.Core"]
    }
}

pub fn is_framework_intrinsic(framework: &str, assembly_name: &str) -> bool {
    framework_intrinsics(framework)
        .iter()
        .any(|n| n.eq_ignore_ascii_case(assembly_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mscorlib_is_intrinsic_everywhere() {
        assert!(is_framework_intrinsic("net472", "mscorlib"));
        assert!(is_framework_intrinsic("net8.0", "mscorlib"));
    }

    #[test]
    fn define_constants_is_preserved() {
        assert!(PRESERVE_PROPERTIES.contains(&"DefineConstants"));
    }
}
