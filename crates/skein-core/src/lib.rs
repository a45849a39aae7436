//! Skein Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Skein parser and
//! compiler:
//!
//! - **Identifiers**: interned node, pin and entity ids ([`identifier::Id`])
//! - **Graph**: nodes, pins and connections ([`graph`] module)
//! - **Roles**: semantic roles and the type-tag table ([`role`] module)
//! - **Project**: flow tree, variables and entities ([`project`] module)

pub mod graph;
pub mod identifier;
pub mod project;
pub mod role;
