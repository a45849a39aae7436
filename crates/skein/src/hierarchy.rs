//! Output hierarchy built from the exported flow tree.
//!
//! Every container node reachable through the flow tree becomes a directory
//! (its [`Location`]) holding one script file. Nodes of other roles in the
//! flow tree are not locations; neither is anything below them.

use std::{collections::HashMap, fmt, path::PathBuf};

use log::debug;

use skein_core::{
    identifier::Id,
    project::{FlowEntry, Project},
    role::{Classification, Role},
};

use crate::{config::OutputConfig, text};

/// Directory of a container, relative to the output root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    segments: Vec<String>,
}

impl Location {
    /// The output root itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the location of a child directory.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Returns the enclosing location, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, i.e. the directory name.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn to_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// A container with its place in the output.
#[derive(Debug, Clone)]
pub struct Container {
    id: Id,
    location: Location,
    file_name: String,
}

impl Container {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Script path relative to the output root, `/`-separated.
    pub fn script(&self) -> String {
        if self.location.is_root() {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.location, self.file_name)
        }
    }

    pub fn script_path(&self) -> PathBuf {
        self.location.to_path().join(&self.file_name)
    }
}

/// All containers of a project, in pre-order of the flow tree.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    containers: Vec<Container>,
    index: HashMap<Id, usize>,
    roots: Vec<usize>,
}

impl Hierarchy {
    /// Builds the hierarchy of a project.
    ///
    /// Directory names come from [`text::slug`] of the display name, falling
    /// back to the node id; siblings with the same name get `_1`, `_2`, ...
    /// suffixes. Names of generated files in the same directory count as
    /// taken.
    pub fn build(project: &Project, classification: &Classification, output: &OutputConfig) -> Self {
        let mut hierarchy = Self::default();
        let root_files = [
            output.base_file(),
            output.characters_file(),
            output.variables_file(),
            output.log_file(),
        ];
        hierarchy.add_level(
            project,
            classification,
            output,
            project.flow(),
            &Location::root(),
            &root_files,
        );

        debug!(containers = hierarchy.len(), roots = hierarchy.roots.len(); "Hierarchy built");
        hierarchy
    }

    fn add_level(
        &mut self,
        project: &Project,
        classification: &Classification,
        output: &OutputConfig,
        entries: &[FlowEntry],
        parent: &Location,
        files: &[String],
    ) {
        let mut taken: Vec<String> = files.to_vec();

        for entry in entries {
            let Some(node) = project.graph().node(entry.id()) else {
                debug!(id:% = entry.id(); "Flow entry without a model skipped");
                continue;
            };
            if classification.role_of(node.type_tag()) != Some(Role::Container) {
                continue;
            }

            let base = text::slug(node.display_name())
                .filter(|slug| !slug.is_empty())
                .unwrap_or_else(|| node.id().to_string());
            let name = if taken.contains(&base) {
                (1..)
                    .map(|count| format!("{base}_{count}"))
                    .find(|candidate| !taken.contains(candidate))
                    .unwrap_or_default()
            } else {
                base
            };
            taken.push(name.clone());

            let location = parent.join(name.as_str());
            let position = self.containers.len();
            let file_name = output.script_file(&name);
            self.containers.push(Container {
                id: node.id(),
                location: location.clone(),
                file_name: file_name.clone(),
            });
            self.index.insert(node.id(), position);
            if parent.is_root() {
                self.roots.push(position);
            }

            self.add_level(
                project,
                classification,
                output,
                entry.children(),
                &location,
                &[file_name],
            );
        }
    }

    /// Returns the container with the given id.
    pub fn container(&self, id: Id) -> Option<&Container> {
        self.index.get(&id).map(|&position| &self.containers[position])
    }

    pub fn location_of(&self, container: Id) -> Option<&Location> {
        self.container(container).map(Container::location)
    }

    pub fn script_of(&self, container: Id) -> Option<String> {
        self.container(container).map(Container::script)
    }

    /// Iterates over containers in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter()
    }

    /// Iterates over the top-level containers.
    pub fn roots(&self) -> impl Iterator<Item = &Container> {
        self.roots.iter().map(|&position| &self.containers[position])
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
