/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Schema document definitions.
//!
//! A [`Dictionary`] is the parsed, validated description of one protocol
//! version: its fields, header, trailer, messages, components and repeating
//! groups. Once built it is never mutated and is shared by reference between
//! every session that uses it.

use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// FIX field data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Integer value.
    Int,
    /// Length field (for data fields).
    Length,
    /// Sequence number.
    SeqNum,
    /// Number of entries in a repeating group.
    NumInGroup,
    /// Tag number reference.
    TagNum,
    /// Day of month (1-31).
    DayOfMonth,
    /// Floating point number.
    Float,
    /// Quantity.
    Qty,
    /// Price.
    Price,
    /// Price offset.
    PriceOffset,
    /// Amount (price * quantity).
    Amt,
    /// Percentage.
    Percentage,
    /// Single character.
    Char,
    /// Boolean (Y/N).
    Boolean,
    /// String.
    String,
    /// Multiple character value (space-separated).
    MultipleCharValue,
    /// Multiple string value (space-separated).
    MultipleStringValue,
    /// Country code (ISO 3166).
    Country,
    /// Currency code (ISO 4217).
    Currency,
    /// Exchange code (ISO 10383 MIC).
    Exchange,
    /// Month-year (YYYYMM or YYYYMMDD or YYYYMMWW).
    MonthYear,
    /// UTC timestamp.
    UtcTimestamp,
    /// UTC time only.
    UtcTimeOnly,
    /// UTC date only.
    UtcDateOnly,
    /// Local market date.
    LocalMktDate,
    /// Local market time.
    LocalMktTime,
    /// Timezone.
    TzTimeOnly,
    /// Timezone with timestamp.
    TzTimestamp,
    /// Raw data (binary).
    Data,
    /// XML data.
    XmlData,
    /// Language code (ISO 639-1).
    Language,
    /// Pattern (regex).
    Pattern,
    /// Tenor (e.g., "1M", "3M").
    Tenor,
    /// Reserved for future use.
    Reserved,
}

/// Error returned for a `type` name no [`FieldType`] matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFieldType(pub String);

impl std::fmt::Display for UnknownFieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown field type {:?}", self.0)
    }
}

impl std::error::Error for UnknownFieldType {}

impl std::str::FromStr for FieldType {
    type Err = UnknownFieldType;

    /// Creates a FieldType from a string name.
    ///
    /// # Arguments
    /// * `s` - The type name from the FIX dictionary
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "INT" => Self::Int,
            "LENGTH" => Self::Length,
            "SEQNUM" => Self::SeqNum,
            "NUMINGROUP" => Self::NumInGroup,
            "TAGNUM" => Self::TagNum,
            "DAYOFMONTH" => Self::DayOfMonth,
            "FLOAT" => Self::Float,
            "QTY" | "QUANTITY" => Self::Qty,
            "PRICE" => Self::Price,
            "PRICEOFFSET" => Self::PriceOffset,
            "AMT" | "AMOUNT" => Self::Amt,
            "PERCENTAGE" => Self::Percentage,
            "CHAR" => Self::Char,
            "BOOLEAN" => Self::Boolean,
            "STRING" => Self::String,
            "MULTIPLECHARVALUE" => Self::MultipleCharValue,
            "MULTIPLESTRINGVALUE" | "MULTIPLEVALUESTRING" => Self::MultipleStringValue,
            "COUNTRY" => Self::Country,
            "CURRENCY" => Self::Currency,
            "EXCHANGE" => Self::Exchange,
            "MONTHYEAR" => Self::MonthYear,
            "UTCTIMESTAMP" | "TIME" => Self::UtcTimestamp,
            "UTCTIMEONLY" => Self::UtcTimeOnly,
            "UTCDATEONLY" | "UTCDATE" | "DATE" => Self::UtcDateOnly,
            "LOCALMKTDATE" => Self::LocalMktDate,
            "LOCALMKTTIME" => Self::LocalMktTime,
            "TZTIMEONLY" => Self::TzTimeOnly,
            "TZTIMESTAMP" => Self::TzTimestamp,
            "DATA" => Self::Data,
            "XMLDATA" => Self::XmlData,
            "LANGUAGE" => Self::Language,
            "PATTERN" => Self::Pattern,
            "TENOR" => Self::Tenor,
            "RESERVED" => Self::Reserved,
            _ => return Err(UnknownFieldType(s.to_string())),
        })
    }
}

/// Definition of a FIX field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field tag number.
    pub tag: u32,
    /// Field name.
    pub name: String,
    /// Field data type.
    pub field_type: FieldType,
    /// Valid values for enumerated fields, mapped to their descriptions.
    pub values: Option<BTreeMap<String, String>>,
    /// Field description.
    pub description: Option<String>,
}

impl FieldDef {
    /// Creates a new field definition.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    /// * `name` - The field name
    /// * `field_type` - The field data type
    #[must_use]
    pub fn new(tag: u32, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            tag,
            name: name.into(),
            field_type,
            values: None,
            description: None,
        }
    }

    /// Adds valid values for an enumerated field.
    #[must_use]
    pub fn with_values(mut self, values: BTreeMap<String, String>) -> Self {
        self.values = Some(values);
        self
    }

    /// Adds a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if the field restricts its values to an enumeration.
    #[must_use]
    pub fn is_enumerated(&self) -> bool {
        self.values.as_ref().is_some_and(|v| !v.is_empty())
    }

    /// Checks a value against the enumeration, if any.
    ///
    /// Non-enumerated fields accept every value.
    #[must_use]
    pub fn is_valid_value(&self, value: &str) -> bool {
        match &self.values {
            Some(values) if !values.is_empty() => values.contains_key(value),
            _ => true,
        }
    }
}

/// Reference to a field within a message or component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    /// Field tag number.
    pub tag: u32,
    /// Field name.
    pub name: String,
    /// Whether the field is required.
    pub required: bool,
}

/// Reference to a component within a message, component or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    /// Component name.
    pub name: String,
    /// Whether the component is required.
    pub required: bool,
}

/// Definition of a repeating group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDef {
    /// Tag of the count field (NumInGroup).
    pub count_tag: u32,
    /// Name of the group.
    pub name: String,
    /// Tag of the first field in each group entry (delimiter).
    pub delimiter_tag: u32,
    /// Fields within each group entry.
    pub fields: Vec<FieldRef>,
    /// Nested groups within this group.
    pub groups: Vec<GroupDef>,
    /// Components within each group entry.
    pub components: Vec<ComponentRef>,
    /// Whether the group is required.
    pub required: bool,
}

/// Definition of a reusable component.
///
/// The standard header and trailer are also represented as components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDef {
    /// Component name.
    pub name: String,
    /// Fields in this component.
    pub fields: Vec<FieldRef>,
    /// Groups in this component.
    pub groups: Vec<GroupDef>,
    /// Nested components.
    pub components: Vec<ComponentRef>,
}

impl ComponentDef {
    /// Creates an empty component.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Definition of a FIX message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDef {
    /// Message type value (tag 35).
    pub msg_type: String,
    /// Message name.
    pub name: String,
    /// Message category (admin or app).
    pub category: MessageCategory,
    /// Fields in this message.
    pub fields: Vec<FieldRef>,
    /// Groups in this message.
    pub groups: Vec<GroupDef>,
    /// Components used in this message.
    pub components: Vec<ComponentRef>,
}

/// Message category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageCategory {
    /// Administrative message (session level).
    Admin,
    /// Application message.
    App,
}

/// Complete schema document for one protocol version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    /// Protocol version described by this document.
    pub version: Version,
    /// Field definitions indexed by tag.
    pub fields: HashMap<u32, FieldDef>,
    /// Field tags indexed by name.
    pub fields_by_name: HashMap<String, u32>,
    /// Message definitions indexed by msg_type.
    pub messages: HashMap<String, MessageDef>,
    /// Component definitions indexed by name.
    pub components: HashMap<String, ComponentDef>,
    /// Standard header.
    pub header: ComponentDef,
    /// Standard trailer.
    pub trailer: ComponentDef,
}

impl Dictionary {
    /// Creates a new empty dictionary for the specified version.
    ///
    /// # Arguments
    /// * `version` - The FIX version
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self {
            version,
            fields: HashMap::new(),
            fields_by_name: HashMap::new(),
            messages: HashMap::new(),
            components: HashMap::new(),
            header: ComponentDef::new("header"),
            trailer: ComponentDef::new("trailer"),
        }
    }

    /// Adds a field definition.
    pub fn add_field(&mut self, field: FieldDef) {
        self.fields_by_name.insert(field.name.clone(), field.tag);
        self.fields.insert(field.tag, field);
    }

    /// Adds a message definition.
    pub fn add_message(&mut self, message: MessageDef) {
        self.messages.insert(message.msg_type.clone(), message);
    }

    /// Adds a component definition.
    pub fn add_component(&mut self, component: ComponentDef) {
        self.components.insert(component.name.clone(), component);
    }

    /// Returns the BeginString this document is used with.
    #[must_use]
    pub const fn begin_string(&self) -> &'static str {
        self.version.begin_string()
    }

    /// Returns true for a FIXT transport-layer document.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        self.version.is_transport()
    }

    /// Gets a field definition by tag.
    #[must_use]
    pub fn get_field(&self, tag: u32) -> Option<&FieldDef> {
        self.fields.get(&tag)
    }

    /// Gets a field definition by name.
    #[must_use]
    pub fn get_field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.fields_by_name
            .get(name)
            .and_then(|tag| self.fields.get(tag))
    }

    /// Gets a message definition by type.
    #[must_use]
    pub fn get_message(&self, msg_type: &str) -> Option<&MessageDef> {
        self.messages.get(msg_type)
    }

    /// Gets a component definition by name.
    #[must_use]
    pub fn get_component(&self, name: &str) -> Option<&ComponentDef> {
        self.components.get(name)
    }

    /// Returns an iterator over all field definitions.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    /// Returns an iterator over all message definitions.
    pub fn messages(&self) -> impl Iterator<Item = &MessageDef> {
        self.messages.values()
    }

    /// Returns an iterator over all component definitions.
    pub fn components(&self) -> impl Iterator<Item = &ComponentDef> {
        self.components.values()
    }

    /// Returns true if the tag belongs to the standard header.
    #[must_use]
    pub fn is_header_field(&self, tag: u32) -> bool {
        self.body_tags(&self.header, false).contains(&tag)
    }

    /// Returns true if the tag belongs to the standard trailer.
    #[must_use]
    pub fn is_trailer_field(&self, tag: u32) -> bool {
        self.body_tags(&self.trailer, false).contains(&tag)
    }

    /// Returns true if the message type is an administrative message.
    #[must_use]
    pub fn is_admin_message(&self, msg_type: &str) -> bool {
        self.get_message(msg_type)
            .is_some_and(|m| m.category == MessageCategory::Admin)
    }

    /// Returns every tag a message body may carry, with components expanded.
    ///
    /// Group members are included alongside their count tags.
    #[must_use]
    pub fn message_tags(&self, msg_type: &str) -> Option<BTreeSet<u32>> {
        let message = self.get_message(msg_type)?;
        let mut tags = BTreeSet::new();
        let mut visiting = Vec::new();
        self.collect_tags(
            &message.fields,
            &message.groups,
            &message.components,
            false,
            &mut visiting,
            &mut tags,
        );
        Some(tags)
    }

    /// Returns the tags a message body must carry.
    ///
    /// Required fields of required components are included; members of
    /// repeating groups are not, since a group may have no entries.
    #[must_use]
    pub fn required_tags(&self, msg_type: &str) -> Option<BTreeSet<u32>> {
        let message = self.get_message(msg_type)?;
        let mut tags = BTreeSet::new();
        let mut visiting = Vec::new();
        self.collect_tags(
            &message.fields,
            &message.groups,
            &message.components,
            true,
            &mut visiting,
            &mut tags,
        );
        Some(tags)
    }

    fn body_tags(&self, body: &ComponentDef, required_only: bool) -> BTreeSet<u32> {
        let mut tags = BTreeSet::new();
        let mut visiting = Vec::new();
        self.collect_tags(
            &body.fields,
            &body.groups,
            &body.components,
            required_only,
            &mut visiting,
            &mut tags,
        );
        tags
    }

    fn collect_tags<'a>(
        &'a self,
        fields: &[FieldRef],
        groups: &[GroupDef],
        components: &[ComponentRef],
        required_only: bool,
        visiting: &mut Vec<&'a str>,
        out: &mut BTreeSet<u32>,
    ) {
        out.extend(
            fields
                .iter()
                .filter(|f| !required_only || f.required)
                .map(|f| f.tag),
        );

        for group in groups {
            if required_only {
                if group.required {
                    out.insert(group.count_tag);
                }
                continue;
            }
            out.insert(group.count_tag);
            self.collect_tags(
                &group.fields,
                &group.groups,
                &group.components,
                false,
                visiting,
                out,
            );
        }

        for component_ref in components {
            if required_only && !component_ref.required {
                continue;
            }
            let Some((name, component)) = self.components.get_key_value(&component_ref.name)
            else {
                continue;
            };
            if visiting.contains(&name.as_str()) {
                continue;
            }
            visiting.push(name.as_str());
            self.collect_tags(
                &component.fields,
                &component.groups,
                &component.components,
                required_only,
                visiting,
                out,
            );
            visiting.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_ref(tag: u32, name: &str, required: bool) -> FieldRef {
        FieldRef {
            tag,
            name: name.to_string(),
            required,
        }
    }

    fn order_dictionary() -> Dictionary {
        let mut dict = Dictionary::new(Version::Fix44);
        dict.add_field(FieldDef::new(8, "BeginString", FieldType::String));
        dict.add_field(FieldDef::new(10, "CheckSum", FieldType::String));
        dict.add_field(FieldDef::new(11, "ClOrdID", FieldType::String));
        dict.add_field(FieldDef::new(55, "Symbol", FieldType::String));
        dict.add_field(FieldDef::new(48, "SecurityID", FieldType::String));
        dict.add_field(FieldDef::new(453, "NoPartyIDs", FieldType::NumInGroup));
        dict.add_field(FieldDef::new(448, "PartyID", FieldType::String));

        dict.header.fields.push(field_ref(8, "BeginString", true));
        dict.trailer.fields.push(field_ref(10, "CheckSum", true));

        dict.add_component(ComponentDef {
            name: "Instrument".to_string(),
            fields: vec![
                field_ref(55, "Symbol", true),
                field_ref(48, "SecurityID", false),
            ],
            groups: vec![],
            components: vec![],
        });

        dict.add_message(MessageDef {
            msg_type: "D".to_string(),
            name: "NewOrderSingle".to_string(),
            category: MessageCategory::App,
            fields: vec![field_ref(11, "ClOrdID", true)],
            groups: vec![GroupDef {
                count_tag: 453,
                name: "NoPartyIDs".to_string(),
                delimiter_tag: 448,
                fields: vec![field_ref(448, "PartyID", false)],
                groups: vec![],
                components: vec![],
                required: false,
            }],
            components: vec![ComponentRef {
                name: "Instrument".to_string(),
                required: true,
            }],
        });
        dict
    }

    #[test]
    fn test_field_type_from_str() {
        assert_eq!("INT".parse::<FieldType>().unwrap(), FieldType::Int);
        assert_eq!("STRING".parse::<FieldType>().unwrap(), FieldType::String);
        assert_eq!(
            "UTCTIMESTAMP".parse::<FieldType>().unwrap(),
            FieldType::UtcTimestamp
        );
        assert_eq!(
            "MULTIPLEVALUESTRING".parse::<FieldType>().unwrap(),
            FieldType::MultipleStringValue
        );
        assert_eq!("qty".parse::<FieldType>().unwrap(), FieldType::Qty);
        let err = "STRNG".parse::<FieldType>().unwrap_err();
        assert_eq!(err, UnknownFieldType("STRNG".to_string()));
        assert_eq!(err.to_string(), "unknown field type \"STRNG\"");
    }

    #[test]
    fn test_dictionary_field_operations() {
        let dict = order_dictionary();

        assert!(dict.get_field(55).is_some());
        assert_eq!(dict.get_field_by_name("Symbol").map(|f| f.tag), Some(55));
        assert!(dict.get_field(999).is_none());
        assert_eq!(dict.begin_string(), "FIX.4.4");
        assert!(!dict.is_transport());
    }

    #[test]
    fn test_field_def_enumeration() {
        let mut values = BTreeMap::new();
        values.insert("1".to_string(), "BUY".to_string());
        values.insert("2".to_string(), "SELL".to_string());
        let side = FieldDef::new(54, "Side", FieldType::Char).with_values(values);

        assert!(side.is_enumerated());
        assert!(side.is_valid_value("1"));
        assert!(!side.is_valid_value("X"));
        assert!(FieldDef::new(11, "ClOrdID", FieldType::String).is_valid_value("anything"));
    }

    #[test]
    fn test_header_and_trailer_membership() {
        let dict = order_dictionary();
        assert!(dict.is_header_field(8));
        assert!(!dict.is_header_field(10));
        assert!(dict.is_trailer_field(10));
    }

    #[test]
    fn test_message_tags_expand_components_and_groups() {
        let dict = order_dictionary();
        let tags = dict.message_tags("D").unwrap();
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec![11, 48, 55, 448, 453]
        );
        assert!(dict.message_tags("Z").is_none());
    }

    #[test]
    fn test_required_tags() {
        let dict = order_dictionary();
        let tags = dict.required_tags("D").unwrap();
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec![11, 55]);
    }

    #[test]
    fn test_component_cycle_terminates() {
        let mut dict = order_dictionary();
        dict.add_component(ComponentDef {
            name: "Loop".to_string(),
            fields: vec![field_ref(11, "ClOrdID", false)],
            groups: vec![],
            components: vec![ComponentRef {
                name: "Loop".to_string(),
                required: false,
            }],
        });
        dict.add_message(MessageDef {
            msg_type: "L".to_string(),
            name: "Looping".to_string(),
            category: MessageCategory::App,
            fields: vec![],
            groups: vec![],
            components: vec![ComponentRef {
                name: "Loop".to_string(),
                required: false,
            }],
        });
        assert_eq!(dict.message_tags("L").unwrap().len(), 1);
    }
}
