/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixGate Dictionary
//!
//! Schema documents and schema resolution for FixGate sessions.
//!
//! This crate provides:
//! - **Schema definitions**: Field, message, component and group definitions
//! - **Schema reader**: QuickFIX XML format parser
//! - **Version resolution**: BeginString and ApplVerID mapping
//! - **Schema cache**: One shared document per schema file path
//! - **Schema providers**: The per-session view over legacy or FIXT schemas

pub mod cache;
pub mod parser;
pub mod provider;
pub mod schema;
pub mod version;

pub use cache::{SchemaCache, SchemaLoader, XmlSchemaLoader};
pub use provider::{LayeredSchemas, LegacySchema, SchemaProvider, ValidationOptions};
pub use schema::{
    ComponentDef, ComponentRef, Dictionary, FieldDef, FieldRef, FieldType, GroupDef,
    MessageCategory, MessageDef, UnknownFieldType,
};
pub use version::{ApplVerId, FIXT_BEGIN_STRING, ProtocolFamily, Version};
