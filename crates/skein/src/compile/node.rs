//! Per-node code generation.
//!
//! A [`Compiler`] turns one container at a time into a [`Script`]: the
//! container's own label first, then every direct child that is not itself
//! a container, in export order. Each emitting node becomes a label block
//! whose body is chosen by the node's role.

use log::debug;

use skein_core::{
    graph::{Graph, Node, Pin, PinDirection},
    identifier::Id,
    role::{Classification, Role},
};
use skein_parser::directive::{Directives, parse_directives};

use super::{
    Error,
    expression::{translate_condition, translate_statements},
    resolve::{Target, governing_pin, resolve_pin},
};
use crate::{
    assets::{AssetCatalog, AssetResolver},
    characters::SpeakerLookup,
    config::ScriptConfig,
    diagnostics::DiagnosticsLog,
    hierarchy::{Container, Hierarchy},
    script::{Instruction, Script},
    symbols::SymbolTable,
    text,
};

/// Returns the label of a node.
///
/// The `label` directive wins; nodes whose type takes its label from text
/// (entry points) use their trimmed text next; everything else gets the
/// label prefix followed by the node id.
pub fn label_of(node: &Node, config: &ScriptConfig) -> String {
    let (directives, _) = parse_directives(node.directives());
    if let Some(label) = directives.value("label").map(str::trim) {
        if !label.is_empty() {
            return label.to_string();
        }
    }
    if config.label_from_text(node.type_tag()) {
        let text = node.text().trim();
        if !text.is_empty() {
            return text.to_string();
        }
    }
    format!("{}{}", config.label_prefix(), node.id())
}

/// Read-only context shared by every container of one compilation.
pub struct Compiler<'a> {
    pub(super) graph: &'a Graph,
    hierarchy: &'a Hierarchy,
    pub(super) classification: &'a Classification,
    pub(super) config: &'a ScriptConfig,
    speakers: &'a dyn SpeakerLookup,
    assets: &'a dyn AssetCatalog,
}

impl<'a> Compiler<'a> {
    pub fn new(
        graph: &'a Graph,
        hierarchy: &'a Hierarchy,
        classification: &'a Classification,
        config: &'a ScriptConfig,
        speakers: &'a dyn SpeakerLookup,
        assets: &'a dyn AssetCatalog,
    ) -> Self {
        Self {
            graph,
            hierarchy,
            classification,
            config,
            speakers,
            assets,
        }
    }

    /// Compiles one container and its direct contents.
    ///
    /// Labels are issued in `symbols`; recoverable problems go to
    /// `diagnostics` under the container's script path.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`Error`]: a duplicate label, a menu option
    /// without caption, or a broken pin chain.
    pub fn compile_container(
        &self,
        container: &Container,
        symbols: &mut SymbolTable,
        diagnostics: &mut DiagnosticsLog,
    ) -> Result<Script, Error> {
        let graph = self.graph;
        let mut script = Script::new();
        let Some(node) = graph.node(container.id()) else {
            return Ok(script);
        };

        let mut session = Session {
            compiler: self,
            container,
            location: container.script(),
            symbols,
            diagnostics,
            menu_stack: Vec::new(),
        };

        script.extend(session.compile_node(node)?);
        for child in graph.children_of(container.id()) {
            if self.hierarchy.container(child.id()).is_some() {
                continue;
            }
            script.extend(session.compile_node(child)?);
        }

        debug!(
            container:% = container.id(),
            instructions = script.instructions().len();
            "Container compiled"
        );
        Ok(script)
    }
}

/// Mutable state while compiling one container.
pub(super) struct Session<'s, 'a> {
    pub(super) compiler: &'s Compiler<'a>,
    container: &'s Container,
    location: String,
    symbols: &'s mut SymbolTable,
    diagnostics: &'s mut DiagnosticsLog,
    /// Branching pins of the menus currently being built.
    pub(super) menu_stack: Vec<Id>,
}

impl Session<'_, '_> {
    /// Records a diagnostic for the current script.
    pub(super) fn report(&mut self, message: impl Into<String>) {
        self.diagnostics.log(&self.location, message);
    }

    pub(super) fn terminal_jump(&self) -> Instruction {
        Instruction::Jump(self.compiler.config.terminal_label())
    }

    fn compile_node(&mut self, node: &Node) -> Result<Vec<Instruction>, Error> {
        let compiler = self.compiler;
        let config = compiler.config;

        self.scan_attention(node);

        let Some(role) = compiler.classification.role_of(node.type_tag()) else {
            self.report(format!(
                "node {} has unsupported type `{}`",
                node.id(),
                node.type_tag()
            ));
            return Ok(Vec::new());
        };
        if role == Role::Ignored {
            return Ok(Vec::new());
        }

        let (directives, warnings) = parse_directives(node.directives());
        for warning in warnings {
            self.report(format!("node {}: {warning}", node.id()));
        }

        let label = label_of(node, config);
        self.symbols.issue(label.as_str())?;

        let mut body = Vec::new();
        if config.emit_comments() {
            body.extend(comment_header(node, role));
        }

        match role {
            Role::Container | Role::PassThroughHub => {
                body.extend(self.flow_logic(node, role)?);
            }
            Role::DialogueLine => {
                body.extend(self.say_lines(node, node.text(), &directives));
                body.extend(self.flow_logic(node, role)?);
            }
            Role::CustomCodeBlock => {
                body.extend(self.code_lines(node));
                let echo = if directives.has_flag("dont_repeat_menu_text") {
                    false
                } else if directives.has_flag("repeat_menu_text") {
                    true
                } else {
                    config.echo_menu_text(node.type_tag())
                };
                if echo {
                    body.extend(self.say_lines(node, node.menu_text(), &directives));
                }
                body.extend(self.flow_logic(node, role)?);
            }
            Role::BranchCondition => {
                body.push(self.branch(node)?);
            }
            Role::SideEffectInstruction => {
                body.extend(
                    translate_statements(node.expression())
                        .into_iter()
                        .map(Instruction::Statement),
                );
                body.extend(self.flow_logic(node, role)?);
            }
            Role::UnconditionalJump => {
                body.push(self.static_jump(node));
            }
            Role::Ignored => {}
        }

        Ok(vec![Instruction::Label { name: label, body }, Instruction::Blank])
    }

    fn scan_attention(&mut self, node: &Node) {
        let config = self.compiler.config;
        let prefixes = config.attention_prefixes();
        let flagged: Vec<&str> = node
            .text()
            .lines()
            .map(str::trim)
            .filter(|line| {
                let lower = line.to_lowercase();
                prefixes
                    .iter()
                    .any(|prefix| !prefix.is_empty() && lower.starts_with(&prefix.to_lowercase()))
            })
            .collect();

        for line in flagged {
            self.report(format!("node {}: {line}", node.id()));
        }
    }

    /// Logic after a node's content: statements, then a jump or a menu.
    fn flow_logic(&mut self, node: &Node, role: Role) -> Result<Vec<Instruction>, Error> {
        match governing_pin(node, role) {
            Some(pin) => self.pin_logic(node, pin),
            None => {
                self.report(format!(
                    "node {} has no outgoing pin, jumping to the end",
                    node.id()
                ));
                Ok(vec![self.terminal_jump()])
            }
        }
    }

    fn pin_logic(&mut self, node: &Node, pin: &Pin) -> Result<Vec<Instruction>, Error> {
        let graph = self.compiler.graph;
        let resolution = resolve_pin(graph, pin)?;
        let mut logic = chain_statements(&resolution.chain);

        match resolution.target {
            Target::Terminal => {
                self.report(format!(
                    "node {} has no connection, jumping to the end",
                    node.id()
                ));
                logic.push(self.terminal_jump());
            }
            Target::Node { node: destination, .. } => logic.push(self.jump_to(destination)),
            Target::Branch(branching) => {
                logic.push(Instruction::Menu(self.menu(node, branching)?));
            }
        }
        Ok(logic)
    }

    /// A jump to the label of `destination`, or to the end when that node
    /// emits no label.
    pub(super) fn jump_to(&mut self, destination: &Node) -> Instruction {
        let compiler = self.compiler;
        match compiler.classification.role_of(destination.type_tag()) {
            Some(role) if role != Role::Ignored => {
                Instruction::Jump(label_of(destination, compiler.config))
            }
            _ => {
                self.report(format!(
                    "jump target {} has no label, jumping to the end",
                    destination.id()
                ));
                self.terminal_jump()
            }
        }
    }

    fn static_jump(&mut self, node: &Node) -> Instruction {
        let graph = self.compiler.graph;
        match node.jump_target().and_then(|target| graph.node(target)) {
            Some(destination) => self.jump_to(destination),
            None => {
                self.report(format!(
                    "jump node {} has no valid target, jumping to the end",
                    node.id()
                ));
                self.terminal_jump()
            }
        }
    }

    fn branch(&mut self, node: &Node) -> Result<Instruction, Error> {
        let condition = translate_condition(node.expression());
        let outputs = node.pins(PinDirection::Output);

        let then = self.outcome(node, outputs.first())?;
        let otherwise = self.outcome(node, outputs.get(1))?;

        Ok(Instruction::If {
            condition: if condition.is_empty() {
                "True".to_string()
            } else {
                condition
            },
            then,
            otherwise,
        })
    }

    fn outcome(&mut self, node: &Node, pin: Option<&Pin>) -> Result<Vec<Instruction>, Error> {
        match pin {
            Some(pin) => self.pin_logic(node, pin),
            None => {
                self.report(format!(
                    "condition {} lacks an outcome pin, jumping to the end",
                    node.id()
                ));
                Ok(vec![self.terminal_jump()])
            }
        }
    }

    /// Say statements, one per non-empty paragraph of `body`.
    fn say_lines(&mut self, node: &Node, body: &str, directives: &Directives) -> Vec<Instruction> {
        let config = self.compiler.config;
        let markdown = markdown_enabled(directives, config);
        let speaker = self.speaker(node, directives);
        let pre = directives.value("pre").unwrap_or_default();
        let post = directives.value("post").unwrap_or_default();

        paragraphs(body, config.paragraph_separator())
            .into_iter()
            .map(|paragraph| text::dialogue_text(paragraph, markdown))
            .filter(|paragraph| !paragraph.trim().is_empty())
            .map(|paragraph| Instruction::Say {
                speaker: speaker.clone(),
                pre: pre.to_string(),
                text: paragraph,
                post: post.to_string(),
            })
            .collect()
    }

    fn speaker(&mut self, node: &Node, directives: &Directives) -> String {
        if let Some(speaker) = directives.value("speaker") {
            return text::python_string(speaker);
        }
        let Some(entity) = node.speaker() else {
            return String::new();
        };

        let speakers = self.compiler.speakers;
        match speakers.speaker_name(entity) {
            Some(name) => name.to_string(),
            None => {
                self.report(format!(
                    "speaker {entity} of node {} is not a character",
                    node.id()
                ));
                String::new()
            }
        }
    }

    /// Code lines with asset placeholders resolved.
    fn code_lines(&mut self, node: &Node) -> Vec<Instruction> {
        let compiler = self.compiler;
        let resolver = AssetResolver::new(compiler.config);
        let container = self.container;
        let location = container.location();
        let mut lines = Vec::new();

        for line in node.text().lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let (code, references) = resolver.rewrite(line, location);
            for reference in references {
                if reference.clamped {
                    self.report(format!(
                        "asset path in node {} climbs above the output root: {}",
                        node.id(),
                        reference.path
                    ));
                }
                if !compiler.assets.contains(&reference.path) {
                    self.report(format!(
                        "node {} uses missing asset {}",
                        node.id(),
                        reference.path
                    ));
                }
            }
            lines.push(Instruction::Code(code));
        }
        lines
    }
}

/// `$` statements of the output pins crossed by a resolution.
pub(super) fn chain_statements(chain: &[&Pin]) -> Vec<Instruction> {
    chain
        .iter()
        .flat_map(|pin| translate_statements(pin.text()))
        .map(Instruction::Statement)
        .collect()
}

pub(super) fn markdown_enabled(directives: &Directives, config: &ScriptConfig) -> bool {
    if directives.has_flag("no_markdown") {
        false
    } else if directives.has_flag("markdown") {
        true
    } else {
        config.markdown_text_styles()
    }
}

fn paragraphs<'t>(body: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        vec![body]
    } else {
        body.split(separator).collect()
    }
}

fn comment_header(node: &Node, role: Role) -> Vec<Instruction> {
    let mut header = vec![Instruction::Comment(node.type_tag().to_string())];
    let mut texts = vec![node.display_name(), node.directives()];
    if !matches!(role, Role::DialogueLine | Role::CustomCodeBlock) {
        texts.push(node.text());
    }

    header.extend(
        texts
            .into_iter()
            .flat_map(text::comment_lines)
            .map(|line| Instruction::Comment(line.to_string())),
    );
    header
}
