//! A typed model of the SDK-style project XML (and the shared-properties / central
//! package list files, which share the same shape), plus its `quick_xml` serializer.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{Cursor, Write as _};

#[derive(Debug, Clone)]
pub struct XmlItem {
    pub kind: String,
    /// `"Include"` for new files, `"Update"` for metadata-only items on files already
    /// implicit in the project.
    pub include_attr: &'static str,
    pub include: String,
    pub attributes: Vec<(String, String)>,
    pub metadata: Vec<(String, String)>,
}

impl XmlItem {
    pub fn new(kind: impl Into<String>, include: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            include_attr: "Include",
            include: include.into(),
            attributes: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    pub fn update(mut self) -> Self {
        self.include_attr = "Update";
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewProjectDocument {
    pub sdk: Option<String>,
    pub properties: Vec<(String, String)>,
    pub item_groups: Vec<Vec<XmlItem>>,
    pub imports: Vec<String>,
    pub raw_targets: Vec<String>,
}

impl NewProjectDocument {
    pub fn to_xml_string(&self) -> String {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None))).expect("xml declaration write is infallible for an in-memory buffer");

        let mut root = BytesStart::new("Project");
        if let Some(sdk) = &self.sdk {
            root.push_attribute(("Sdk", sdk.as_str()));
        }
        writer.write_event(Event::Start(root)).expect("xml write is infallible for an in-memory buffer");

        if !self.properties.is_empty() {
            write_property_group(&mut writer, &self.properties);
        }

        for group in &self.item_groups {
            if group.is_empty() {
                continue;
            }
            writer.write_event(Event::Start(BytesStart::new("ItemGroup"))).unwrap();
            for item in group {
                write_item(&mut writer, item);
            }
            writer.write_event(Event::End(BytesEnd::new("ItemGroup"))).unwrap();
        }

        for import in &self.imports {
            let mut el = BytesStart::new("Import");
            el.push_attribute(("Project", import.as_str()));
            writer.write_event(Event::Empty(el)).unwrap();
        }

        for target in &self.raw_targets {
            writer
                .get_mut()
                .write_all(target.as_bytes())
                .expect("writing raw target xml into an in-memory buffer cannot fail");
        }

        writer.write_event(Event::End(BytesEnd::new("Project"))).unwrap();

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).expect("synthesized xml is always valid utf-8")
    }
}

fn write_property_group(writer: &mut Writer<Cursor<Vec<u8>>>, properties: &[(String, String)]) {
    writer.write_event(Event::Start(BytesStart::new("PropertyGroup"))).unwrap();
    for (name, value) in properties {
        writer.write_event(Event::Start(BytesStart::new(name.as_str()))).unwrap();
        writer.write_event(Event::Text(BytesText::new(value))).unwrap();
        writer.write_event(Event::End(BytesEnd::new(name.as_str()))).unwrap();
    }
    writer.write_event(Event::End(BytesEnd::new("PropertyGroup"))).unwrap();
}

fn write_item(writer: &mut Writer<Cursor<Vec<u8>>>, item: &XmlItem) {
    let mut el = BytesStart::new(item.kind.as_str());
    el.push_attribute((item.include_attr, item.include.as_str()));
    for (k, v) in &item.attributes {
        el.push_attribute((k.as_str(), v.as_str()));
    }
    if item.metadata.is_empty() {
        writer.write_event(Event::Empty(el)).unwrap();
    } else {
        writer.write_event(Event::Start(el)).unwrap();
        for (k, v) in &item.metadata {
            writer.write_event(Event::Start(BytesStart::new(k.as_str()))).unwrap();
            writer.write_event(Event::Text(BytesText::new(v))).unwrap();
            writer.write_event(Event::End(BytesEnd::new(k.as_str()))).unwrap();
        }
        writer.write_event(Event::End(BytesEnd::new(item.kind.as_str()))).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_sdk_attribute_and_property_group() {
        let doc = NewProjectDocument {
            sdk: Some("Microsoft.NET.Sdk".into()),
            properties: vec![("TargetFramework".into(), "net472".into())],
            item_groups: vec![],
            imports: vec![],
            raw_targets: vec![],
        };
        let xml = doc.to_xml_string();
        assert!(xml.contains(r#"Sdk="Microsoft.NET.Sdk""#));
        assert!(xml.contains("<TargetFramework>net472</TargetFramework>"));
    }

    #[test]
    fn package_reference_serializes_without_reference_entries() {
        let doc = NewProjectDocument {
            sdk: Some("Microsoft.NET.Sdk".into()),
            properties: vec![],
            item_groups: vec![vec![XmlItem::new("PackageReference", "Newtonsoft.Json").with_attr("Version", "12.0.3")]],
            imports: vec![],
            raw_targets: vec![],
        };
        let xml = doc.to_xml_string();
        assert!(xml.contains(r#"<PackageReference Include="Newtonsoft.Json" Version="12.0.3" />"#));
        assert!(!xml.contains("<Reference "));
    }
}
