//! Menus for pins with more than one connection.
//!
//! Each connection becomes one option. Options leading to a node are ordered
//! by that node's priority (its explicit priority directive, else the
//! configured base plus the numeric node id), ties broken by id text and
//! then by connection order. Options ending anywhere else keep their
//! connection order after all of those.

use std::cmp::Ordering;

use skein_core::graph::{Connection, Node, Pin, PinDirection};
use skein_parser::directive::parse_directives;

use super::{
    Error,
    expression::{translate_condition, translate_statements},
    node::{Session, chain_statements, label_of, markdown_enabled},
    resolve::{Target, resolve_pin},
};
use crate::{
    script::{Instruction, Menu, MenuOption},
    text,
};

struct Candidate {
    /// `None` for options not leading to a node.
    rank: Option<(i64, String)>,
    option: MenuOption,
}

impl Session<'_, '_> {
    /// Builds the menu for `branching`, a pin reached while compiling
    /// `origin`.
    ///
    /// # Errors
    ///
    /// Fails on an option without any caption text, on broken or cyclic pin
    /// chains, and when a chained branch leads back into a menu being built.
    pub(super) fn menu(&mut self, origin: &Node, branching: &Pin) -> Result<Menu, Error> {
        if self.menu_stack.contains(&branching.id()) {
            return Err(Error::CyclicPinChain {
                start: self.menu_stack.first().copied().unwrap_or(branching.id()),
                pin: branching.id(),
            });
        }

        self.menu_stack.push(branching.id());
        let menu = self.build_menu(origin, branching);
        self.menu_stack.pop();
        menu
    }

    fn build_menu(&mut self, origin: &Node, branching: &Pin) -> Result<Menu, Error> {
        let compiler = self.compiler;
        let graph = compiler.graph;
        let config = compiler.config;

        let owner = graph.node(branching.owner()).unwrap_or(origin);
        let (owner_directives, _) = parse_directives(owner.directives());
        let extend = if owner_directives.has_flag("no_extend_menu") {
            false
        } else if owner_directives.has_flag("extend_menu") {
            true
        } else {
            config.menu_extend()
        };

        let statements: Vec<Instruction> = match branching.direction() {
            PinDirection::Output => translate_statements(branching.text())
                .into_iter()
                .map(Instruction::Statement)
                .collect(),
            PinDirection::Input => Vec::new(),
        };

        let mut candidates = Vec::with_capacity(branching.connections().len());
        for connection in branching.connections() {
            let Some((target_owner, target_pin)) = graph.pin(connection.target_pin()) else {
                return Err(Error::InvalidPinReference {
                    from: branching.id(),
                    pin: connection.target_pin(),
                });
            };
            let (chain, target) = match target_pin.direction() {
                PinDirection::Input => (
                    Vec::new(),
                    Target::Node {
                        node: target_owner,
                        entry: target_pin,
                    },
                ),
                PinDirection::Output => {
                    let resolution = resolve_pin(graph, target_pin)?;
                    (resolution.chain, resolution.target)
                }
            };

            let mut body = statements.clone();
            body.extend(chain_statements(&chain));

            let candidate = match target {
                Target::Node {
                    node: destination,
                    entry,
                } => {
                    let (directives, _) = parse_directives(destination.directives());
                    let caption = [destination.menu_text(), connection.label(), destination.text()]
                        .into_iter()
                        .find(|caption| !caption.trim().is_empty())
                        .ok_or_else(|| Error::EmptyOptionCaption {
                            origin: origin.id(),
                            destination: label_of(destination, config),
                        })?;
                    let guard = match entry.direction() {
                        PinDirection::Input => translate_condition(entry.text()),
                        PinDirection::Output => String::new(),
                    };
                    let priority = directives.priority().unwrap_or_else(|| {
                        let id = destination
                            .id()
                            .as_number()
                            .map_or(0, |number| i64::try_from(number).unwrap_or(i64::MAX));
                        config.priority_base().saturating_add(id)
                    });

                    body.push(self.jump_to(destination));
                    Candidate {
                        rank: Some((priority, destination.id().to_string())),
                        option: MenuOption {
                            caption: text::dialogue_text(
                                caption,
                                markdown_enabled(&directives, config),
                            ),
                            guard: (!guard.is_empty()).then_some(guard),
                            body,
                        },
                    }
                }
                Target::Terminal => {
                    let caption = self.connection_caption(origin, connection, || {
                        config.terminal_label()
                    })?;
                    self.report(format!(
                        "menu option `{}` of node {} leads nowhere, jumping to the end",
                        connection.label(),
                        origin.id()
                    ));
                    body.push(self.terminal_jump());
                    Candidate {
                        rank: None,
                        option: MenuOption {
                            caption,
                            guard: None,
                            body,
                        },
                    }
                }
                Target::Branch(next) => {
                    let caption = self.connection_caption(origin, connection, || {
                        format!("menu of pin {}", next.id())
                    })?;
                    body.push(Instruction::Menu(self.menu(origin, next)?));
                    Candidate {
                        rank: None,
                        option: MenuOption {
                            caption,
                            guard: None,
                            body,
                        },
                    }
                }
            };
            candidates.push(candidate);
        }

        candidates.sort_by(|a, b| match (&a.rank, &b.rank) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        Ok(Menu {
            extend,
            options: candidates
                .into_iter()
                .map(|candidate| candidate.option)
                .collect(),
        })
    }

    /// Caption of an option that does not lead to a node: the connection
    /// label or nothing.
    fn connection_caption(
        &self,
        origin: &Node,
        connection: &Connection,
        destination: impl FnOnce() -> String,
    ) -> Result<String, Error> {
        let label = connection.label();
        if label.trim().is_empty() {
            return Err(Error::EmptyOptionCaption {
                origin: origin.id(),
                destination: destination(),
            });
        }
        Ok(text::dialogue_text(
            label,
            self.compiler.config.markdown_text_styles(),
        ))
    }
}
