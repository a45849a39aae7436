//! Skein - compiles articy:draft narrative graphs into Ren'Py scripts
//!
//! This library loads an articy:draft JSON export, walks its flow graph and
//! generates one Ren'Py script per flow container, plus the entry point,
//! character definitions, variable stores and a diagnostics report.

pub mod assets;
pub mod characters;
pub mod compile;
pub mod config;
pub mod diagnostics;
pub mod hierarchy;
pub mod output;
pub mod script;
pub mod symbols;
pub mod text;
pub mod variables;

mod error;

pub use skein_core::{graph, identifier, project, role};

pub use error::SkeinError;

use std::path::Path;

use log::{debug, info};

use skein_core::{identifier::Id, project::Project};

use assets::AssetCatalog;
use characters::Cast;
use compile::{Compiler, label_of};
use config::{AppConfig, OutputConfig};
use diagnostics::DiagnosticsLog;
use hierarchy::Hierarchy;
use output::GeneratedFile;
use script::{Instruction, Script};
use symbols::SymbolTable;

/// Builder for parsing exports and generating Ren'Py scripts.
///
/// # Examples
///
/// ```rust,no_run
/// use skein::{ScriptBuilder, assets::UncheckedAssets, config::AppConfig};
///
/// let source = std::fs::read_to_string("export.json").expect("Failed to read");
///
/// let builder = ScriptBuilder::new(AppConfig::default());
/// let project = builder.parse(&source).expect("Failed to parse");
/// let compilation = builder
///     .compile(&project, &UncheckedAssets)
///     .expect("Failed to compile");
///
/// builder
///     .write(&compilation, "game/generated".as_ref())
///     .expect("Failed to write");
/// ```
#[derive(Default)]
pub struct ScriptBuilder {
    config: AppConfig,
}

impl ScriptBuilder {
    /// Create a new script builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse an export into a project.
    ///
    /// # Errors
    ///
    /// Returns `SkeinError::Parse` when the source is not a usable export.
    pub fn parse(&self, source: &str) -> Result<Project, SkeinError> {
        info!(bytes = source.len(); "Loading export");
        let project = skein_parser::parse(source)
            .map_err(|err| SkeinError::new_parse_error(err, source))?;
        debug!(nodes = project.graph().len(); "Export loaded");
        Ok(project)
    }

    /// Compile a project into scripts.
    ///
    /// `assets` decides which asset paths referenced by code blocks exist;
    /// missing ones are reported, never fatal.
    ///
    /// # Errors
    ///
    /// Returns `SkeinError::Compile` for the first fatal problem, such as a
    /// label defined twice or a menu option without caption.
    pub fn compile(
        &self,
        project: &Project,
        assets: &dyn AssetCatalog,
    ) -> Result<Compilation, SkeinError> {
        let config = &self.config;
        let script_config = config.script();
        let output = config.output();
        let mut symbols = SymbolTable::new();
        let mut diagnostics = DiagnosticsLog::new();

        let cast = Cast::from_entities(project.entities(), config.characters(), &mut symbols);
        let variables = variables::variables_script(project.namespaces(), &mut symbols)?;

        let hierarchy = Hierarchy::build(project, config.classification(), output);
        info!(
            containers = hierarchy.len(),
            characters = cast.len();
            "Compiling hierarchy"
        );

        let terminal = script_config.terminal_label();
        symbols.issue("start")?;
        symbols.issue(terminal.as_str())?;

        let entry = hierarchy
            .roots()
            .next()
            .and_then(|root| project.graph().node(root.id()))
            .map(|node| label_of(node, script_config));
        let first_jump = match entry {
            Some(label) => label,
            None => {
                diagnostics.log(
                    output.base_file(),
                    "the export has no flow container, the game ends immediately",
                );
                terminal.clone()
            }
        };
        let base: Script = [
            Instruction::Comment("Entry point of the game".to_string()),
            Instruction::Label {
                name: "start".to_string(),
                body: vec![Instruction::Jump(first_jump)],
            },
            Instruction::Blank,
            Instruction::Label {
                name: terminal,
                body: vec![Instruction::Return],
            },
            Instruction::Blank,
        ]
        .into_iter()
        .collect();

        let compiler = Compiler::new(
            project.graph(),
            &hierarchy,
            config.classification(),
            script_config,
            &cast,
            assets,
        );
        let mut scripts = Vec::with_capacity(hierarchy.len());
        for container in hierarchy.iter() {
            let script = compiler.compile_container(container, &mut symbols, &mut diagnostics)?;
            scripts.push(CompiledScript {
                container: container.id(),
                path: container.script(),
                script,
            });
        }

        info!(
            scripts = scripts.len(),
            symbols = symbols.len(),
            diagnostics = diagnostics.len();
            "Compilation finished"
        );

        Ok(Compilation {
            base,
            characters: cast.to_script(),
            variables,
            scripts,
            root_dirs: hierarchy
                .roots()
                .filter_map(|root| root.location().name().map(str::to_string))
                .collect(),
            symbols,
            diagnostics,
            output: output.clone(),
        })
    }

    /// Replace the contents of `root` with the compiled files.
    ///
    /// # Errors
    ///
    /// Returns `SkeinError::Output` if `root` holds files this tool did not
    /// generate, or if writing fails.
    pub fn write(&self, compilation: &Compilation, root: &Path) -> Result<(), SkeinError> {
        output::clean_up(root, compilation.root_dirs(), self.config.output().file_prefix())?;
        output::write_files(root, &compilation.files())?;
        Ok(())
    }
}

/// The script generated for one container.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    container: Id,
    path: String,
    script: Script,
}

impl CompiledScript {
    pub fn container(&self) -> Id {
        self.container
    }

    /// Path relative to the output root, `/`-separated.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn script(&self) -> &Script {
        &self.script
    }
}

/// Everything one compilation produced.
#[derive(Debug, Clone)]
pub struct Compilation {
    base: Script,
    characters: Script,
    variables: Script,
    scripts: Vec<CompiledScript>,
    root_dirs: Vec<String>,
    symbols: SymbolTable,
    diagnostics: DiagnosticsLog,
    output: OutputConfig,
}

impl Compilation {
    /// The `start` label and the terminal label.
    pub fn base(&self) -> &Script {
        &self.base
    }

    pub fn characters(&self) -> &Script {
        &self.characters
    }

    pub fn variables(&self) -> &Script {
        &self.variables
    }

    /// Container scripts in hierarchy order.
    pub fn scripts(&self) -> &[CompiledScript] {
        &self.scripts
    }

    /// Top-level directories of the output.
    pub fn root_dirs(&self) -> &[String] {
        &self.root_dirs
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn diagnostics(&self) -> &DiagnosticsLog {
        &self.diagnostics
    }

    /// Every output file with its rendered contents.
    pub fn files(&self) -> Vec<GeneratedFile> {
        let output = &self.output;
        let mut files = vec![
            GeneratedFile::new(output.base_file(), self.base.render()),
            GeneratedFile::new(output.characters_file(), self.characters.render()),
            GeneratedFile::new(output.variables_file(), self.variables.render()),
        ];
        files.extend(
            self.scripts
                .iter()
                .map(|compiled| GeneratedFile::new(compiled.path.as_str(), compiled.script.render())),
        );
        files.push(GeneratedFile::new(output.log_file(), self.diagnostics.render()));
        files
    }
}
