/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! QuickFIX XML schema reader.
//!
//! Reads the QuickFIX data dictionary format into a [`Dictionary`]:
//!
//! ```xml
//! <fix type="FIX" major="4" minor="2" servicepack="0">
//!   <header>...</header>
//!   <trailer>...</trailer>
//!   <messages>...</messages>
//!   <components>...</components>
//!   <fields>...</fields>
//! </fix>
//! ```
//!
//! The document is first read into a small element tree, then resolved in
//! two passes: field definitions first, then every field, group and
//! component reference against them.

use crate::schema::{
    ComponentDef, ComponentRef, Dictionary, FieldDef, FieldRef, FieldType, GroupDef,
    MessageCategory, MessageDef,
};
use crate::version::Version;
use fixgate_core::error::SchemaError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Reads a schema document from a file.
///
/// # Errors
/// Returns [`SchemaError::Io`] if the file cannot be read, or any error of
/// [`parse_str`].
pub fn parse_file(path: &Path) -> Result<Dictionary, SchemaError> {
    let xml = std::fs::read_to_string(path).map_err(|e| SchemaError::Io(e.to_string()))?;
    parse_str(&xml)
}

/// Reads a schema document from an XML string.
///
/// # Errors
/// Returns a [`SchemaError`] if the XML is malformed, the root element is not
/// `<fix>`, the version is unsupported, or a reference cannot be resolved.
pub fn parse_str(xml: &str) -> Result<Dictionary, SchemaError> {
    let root = read_tree(xml)?;
    if root.name != "fix" {
        return Err(SchemaError::UnexpectedRoot(root.name));
    }
    Resolver::new(&root)?.resolve()
}

/// Minimal XML element tree.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, SchemaError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| SchemaError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| SchemaError::Xml(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required_attr(&self, key: &'static str) -> Result<&str, SchemaError> {
        self.attr(key).ok_or_else(|| SchemaError::MissingAttribute {
            element: self.name.clone(),
            attribute: key,
        })
    }

    fn numeric_attr(&self, key: &'static str) -> Result<Option<u32>, SchemaError> {
        self.attr(key)
            .map(|value| {
                value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| self.invalid(key, value))
            })
            .transpose()
    }

    fn flag_attr(&self, key: &'static str) -> Result<bool, SchemaError> {
        match self.attr(key) {
            None => Ok(false),
            Some(v) if v.eq_ignore_ascii_case("Y") => Ok(true),
            Some(v) if v.eq_ignore_ascii_case("N") => Ok(false),
            Some(v) => Err(self.invalid(key, v)),
        }
    }

    fn invalid(&self, attribute: &'static str, value: &str) -> SchemaError {
        SchemaError::InvalidAttribute {
            element: self.name.clone(),
            attribute,
            value: value.to_string(),
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn read_tree(xml: &str) -> Result<Element, SchemaError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SchemaError::Xml(e.to_string()))?;
        match event {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| SchemaError::Xml("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(SchemaError::Xml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| SchemaError::Xml("document has no root element".to_string()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), SchemaError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(SchemaError::Xml(format!(
                "unexpected second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

/// Fields, groups and components of one message body.
#[derive(Debug, Default)]
struct Body {
    fields: Vec<FieldRef>,
    groups: Vec<GroupDef>,
    components: Vec<ComponentRef>,
}

struct Resolver<'a> {
    root: &'a Element,
    dictionary: Dictionary,
    component_elements: HashMap<&'a str, &'a Element>,
}

impl<'a> Resolver<'a> {
    fn new(root: &'a Element) -> Result<Self, SchemaError> {
        let kind = root.attr("type").unwrap_or("FIX");
        let major = root
            .numeric_attr("major")?
            .ok_or_else(|| SchemaError::MissingAttribute {
                element: root.name.clone(),
                attribute: "major",
            })?;
        let minor = root
            .numeric_attr("minor")?
            .ok_or_else(|| SchemaError::MissingAttribute {
                element: root.name.clone(),
                attribute: "minor",
            })?;
        let service_pack = root.numeric_attr("servicepack")?.unwrap_or(0);

        let version = Version::from_parts(kind, major, minor, service_pack).ok_or_else(|| {
            SchemaError::UnsupportedVersion(format!("{kind}.{major}.{minor}SP{service_pack}"))
        })?;

        let mut component_elements = HashMap::new();
        if let Some(components) = root.child("components") {
            for element in components.children_named("component") {
                component_elements.insert(element.required_attr("name")?, element);
            }
        }

        Ok(Self {
            root,
            dictionary: Dictionary::new(version),
            component_elements,
        })
    }

    fn resolve(mut self) -> Result<Dictionary, SchemaError> {
        let root = self.root;
        if let Some(fields) = root.child("fields") {
            for element in fields.children_named("field") {
                self.define_field(element)?;
            }
        }

        if let Some(header) = root.child("header") {
            let body = self.body(header, "header")?;
            self.dictionary.header = component_from("header", body);
        }
        if let Some(trailer) = root.child("trailer") {
            let body = self.body(trailer, "trailer")?;
            self.dictionary.trailer = component_from("trailer", body);
        }

        let components: Vec<(&str, &Element)> = self
            .component_elements
            .iter()
            .map(|(name, element)| (*name, *element))
            .collect();
        for (name, element) in components {
            let body = self.body(element, &format!("component {name}"))?;
            self.dictionary.add_component(component_from(name, body));
        }

        if let Some(messages) = root.child("messages") {
            for element in messages.children_named("message") {
                let message = self.message(element)?;
                self.dictionary.add_message(message);
            }
        }

        Ok(self.dictionary)
    }

    fn define_field(&mut self, element: &Element) -> Result<(), SchemaError> {
        let tag = element
            .numeric_attr("number")?
            .ok_or_else(|| SchemaError::MissingAttribute {
                element: element.name.clone(),
                attribute: "number",
            })?;
        let name = element.required_attr("name")?;
        let type_name = element.required_attr("type")?;
        let field_type: FieldType = type_name
            .parse()
            .map_err(|_| element.invalid("type", type_name))?;

        if self.dictionary.fields.contains_key(&tag) {
            return Err(SchemaError::DuplicateField(tag));
        }
        if self.dictionary.fields_by_name.contains_key(name) {
            return Err(element.invalid("name", name));
        }

        let mut values = BTreeMap::new();
        for value in element.children_named("value") {
            values.insert(
                value.required_attr("enum")?.to_string(),
                value.attr("description").unwrap_or_default().to_string(),
            );
        }

        let mut field = FieldDef::new(tag, name, field_type);
        if !values.is_empty() {
            field = field.with_values(values);
        }
        self.dictionary.add_field(field);
        Ok(())
    }

    fn message(&self, element: &Element) -> Result<MessageDef, SchemaError> {
        let name = element.required_attr("name")?;
        let msg_type = element.required_attr("msgtype")?;
        let category = match element.attr("msgcat") {
            Some(cat) if cat.eq_ignore_ascii_case("admin") => MessageCategory::Admin,
            Some(cat) if cat.eq_ignore_ascii_case("app") => MessageCategory::App,
            None => MessageCategory::App,
            Some(cat) => return Err(element.invalid("msgcat", cat)),
        };

        let body = self.body(element, &format!("message {name}"))?;
        Ok(MessageDef {
            msg_type: msg_type.to_string(),
            name: name.to_string(),
            category,
            fields: body.fields,
            groups: body.groups,
            components: body.components,
        })
    }

    fn body(&self, element: &Element, context: &str) -> Result<Body, SchemaError> {
        let mut body = Body::default();
        for child in &element.children {
            match child.name.as_str() {
                "field" => body.fields.push(self.field_ref(child, context)?),
                "group" => body.groups.push(self.group(child, context)?),
                "component" => body.components.push(self.component_ref(child, context)?),
                _ => {}
            }
        }
        Ok(body)
    }

    fn field_ref(&self, element: &Element, context: &str) -> Result<FieldRef, SchemaError> {
        let name = element.required_attr("name")?;
        Ok(FieldRef {
            tag: self.tag_of(name, context)?,
            name: name.to_string(),
            required: element.flag_attr("required")?,
        })
    }

    fn component_ref(&self, element: &Element, context: &str) -> Result<ComponentRef, SchemaError> {
        let name = element.required_attr("name")?;
        if !self.component_elements.contains_key(name) {
            return Err(SchemaError::UnknownComponent {
                name: name.to_string(),
                context: context.to_string(),
            });
        }
        Ok(ComponentRef {
            name: name.to_string(),
            required: element.flag_attr("required")?,
        })
    }

    fn group(&self, element: &Element, context: &str) -> Result<GroupDef, SchemaError> {
        let name = element.required_attr("name")?;
        let count_tag = self.tag_of(name, context)?;
        let group_context = format!("group {name}");
        let body = self.body(element, &group_context)?;

        let first = element
            .children
            .iter()
            .find(|c| matches!(c.name.as_str(), "field" | "group" | "component"))
            .ok_or_else(|| SchemaError::EmptyGroup(name.to_string()))?;
        let delimiter_tag = self.first_tag(first, &group_context, 0)?;

        Ok(GroupDef {
            count_tag,
            name: name.to_string(),
            delimiter_tag,
            fields: body.fields,
            groups: body.groups,
            components: body.components,
            required: element.flag_attr("required")?,
        })
    }

    /// Tag that opens an entry starting with `element`.
    fn first_tag(&self, element: &Element, context: &str, depth: usize) -> Result<u32, SchemaError> {
        let name = element.required_attr("name")?;
        if element.name != "component" {
            return self.tag_of(name, context);
        }

        let component = self.component_elements.get(name).ok_or_else(|| {
            SchemaError::UnknownComponent {
                name: name.to_string(),
                context: context.to_string(),
            }
        })?;
        let first = component
            .children
            .iter()
            .find(|c| matches!(c.name.as_str(), "field" | "group" | "component"));
        match first {
            Some(first) if depth < self.component_elements.len() => {
                self.first_tag(first, context, depth + 1)
            }
            _ => Err(SchemaError::EmptyGroup(context.to_string())),
        }
    }

    fn tag_of(&self, name: &str, context: &str) -> Result<u32, SchemaError> {
        self.dictionary
            .fields_by_name
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::UnknownField {
                name: name.to_string(),
                context: context.to_string(),
            })
    }
}

fn component_from(name: &str, body: Body) -> ComponentDef {
    ComponentDef {
        name: name.to_string(),
        fields: body.fields,
        groups: body.groups,
        components: body.components,
    }
}
