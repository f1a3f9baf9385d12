//! # Rendering
//!
//! Turns a flattened retrieval result into console output.
//!
//! Collection-valued properties are rendered element by element. References,
//! whether standalone or inside a collection, print as an inner object type and
//! reference value pair.

use property_collector::{ObjectContent, PropertyValue};
use std::fmt;

pub const EMPTY_MESSAGE: &str = "No Managed Entities retrieved!";

/// Console form of a retrieval result.
pub struct TextReport<'a>(pub &'a [ObjectContent]);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "{EMPTY_MESSAGE}");
        }

        for content in self.0 {
            writeln!(f, "Object Type : {}", content.obj.type_name)?;
            writeln!(f, "Reference Value : {}", content.obj.value)?;
            for prop in &content.prop_set {
                writeln!(f, "   Property Name : {}", prop.name)?;
                match &prop.value {
                    PropertyValue::Collection(items) => {
                        for item in items {
                            write_inner(f, item)?;
                        }
                    }
                    PropertyValue::Reference(_) => write_inner(f, &prop.value)?,
                    scalar => writeln!(f, "   Property Value : {scalar}")?,
                }
            }
        }
        Ok(())
    }
}

fn write_inner(f: &mut fmt::Formatter<'_>, value: &PropertyValue) -> fmt::Result {
    match value {
        PropertyValue::Reference(reference) => {
            writeln!(f, "   Inner Object Type : {}", reference.type_name)?;
            writeln!(f, "   Inner Reference Value : {}", reference.value)
        }
        other => writeln!(f, "   Inner Property Value : {other}"),
    }
}

pub fn render_text(objects: &[ObjectContent]) -> String {
    TextReport(objects).to_string()
}

pub fn render_json(objects: &[ObjectContent]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(objects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use property_collector::{DynamicProperty, ManagedObjectReference};
    use std::fmt::Write as _;

    fn host(id: &str) -> PropertyValue {
        PropertyValue::Reference(ManagedObjectReference::new("HostSystem", id))
    }

    #[test]
    fn empty_result_prints_notice() {
        assert_eq!(render_text(&[]), "No Managed Entities retrieved!\n");
    }

    #[test]
    fn scalar_property() {
        let content = ObjectContent::new(
            ManagedObjectReference::new("Datacenter", "datacenter-3"),
            vec![DynamicProperty::new("name", PropertyValue::Text("dc1".into()))],
        );

        assert_eq!(
            render_text(&[content]),
            "Object Type : Datacenter\n\
             Reference Value : datacenter-3\n   \
             Property Name : name\n   \
             Property Value : dc1\n"
        );
    }

    #[test]
    fn every_collection_element_is_rendered() {
        let content = ObjectContent::new(
            ManagedObjectReference::new("ClusterComputeResource", "domain-c7"),
            vec![DynamicProperty::new(
                "host",
                PropertyValue::Collection(vec![host("host-8"), host("host-9")]),
            )],
        );

        let text = render_text(&[content]);
        assert!(text.contains("Inner Reference Value : host-8"));
        assert!(text.contains("Inner Reference Value : host-9"));
        assert_eq!(text.matches("Inner Object Type : HostSystem").count(), 2);
    }

    #[test]
    fn json_uses_wire_field_names() {
        let content = ObjectContent::new(
            ManagedObjectReference::new("HostSystem", "host-8"),
            vec![DynamicProperty::new("name", PropertyValue::Text("esx".into()))],
        );

        let json: serde_json::Value = serde_json::from_str(&render_json(&[content]).unwrap()).unwrap();
        assert_eq!(json[0]["obj"]["type"], "HostSystem");
        assert_eq!(json[0]["propSet"][0]["val"]["kind"], "Text");
        assert_eq!(json[0]["propSet"][0]["val"]["value"], "esx");
    }

    #[test]
    fn report_writes_through_any_formatter() {
        let content = ObjectContent::new(
            ManagedObjectReference::new("Folder", "group-d1"),
            vec![DynamicProperty::new("name", PropertyValue::Text("Datacenters".into()))],
        );
        let objects = [content];

        let mut out = String::new();
        write!(out, "{}", TextReport(&objects)).unwrap();
        assert_eq!(out, render_text(&objects));
        assert!(out.ends_with("   Property Value : Datacenters\n"));
    }
}
