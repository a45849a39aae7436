//! Instruction model for generated Ren'Py scripts and its renderer.
//!
//! Emitters build [`Instruction`] trees; nesting is explicit (a label owns
//! its body, a menu owns its options), so indentation is derived at render
//! time and emitters never deal with whitespace.

use std::fmt::{self, Write as _};

const INDENT: &str = "    ";

/// One statement or block of a Ren'Py script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `label name:` followed by an indented body.
    Label { name: String, body: Vec<Instruction> },
    /// `# text`
    Comment(String),
    /// `speaker pre "text" post`; empty parts are omitted. `text` is
    /// already escaped.
    Say {
        speaker: String,
        pre: String,
        text: String,
        post: String,
    },
    /// `$ statement`
    Statement(String),
    /// A line of author-supplied code, emitted as is.
    Code(String),
    /// `jump label`
    Jump(String),
    /// `if condition:` / `else:`
    If {
        condition: String,
        then: Vec<Instruction>,
        otherwise: Vec<Instruction>,
    },
    Menu(Menu),
    Return,
    /// `define name = value`
    Define { name: String, value: String },
    /// `init python in name:` followed by an indented body.
    Store { name: String, body: Vec<Instruction> },
    /// `name = value`
    Assign { name: String, value: String },
    Blank,
}

/// A multi-way choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    /// Emit `extend ""` so the last dialogue line stays on screen.
    pub extend: bool,
    pub options: Vec<MenuOption>,
}

/// One choice of a [`Menu`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    /// Escaped caption text.
    pub caption: String,
    /// Python condition that must hold for the option to be shown.
    pub guard: Option<String>,
    pub body: Vec<Instruction>,
}

/// A generated script file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    instructions: Vec<Instruction>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Renders the script as Ren'Py source text.
    pub fn render(&self) -> String {
        let mut renderer = Renderer::default();
        renderer.block(&self.instructions, 0);
        renderer.out
    }
}

impl Extend<Instruction> for Script {
    fn extend<T: IntoIterator<Item = Instruction>>(&mut self, iter: T) {
        self.instructions.extend(iter);
    }
}

impl FromIterator<Instruction> for Script {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Default)]
struct Renderer {
    out: String,
}

impl Renderer {
    fn line(&mut self, depth: usize, text: impl fmt::Display) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        let _ = writeln!(self.out, "{text}");
    }

    fn block(&mut self, instructions: &[Instruction], depth: usize) {
        for instruction in instructions {
            self.instruction(instruction, depth);
        }
    }

    fn instruction(&mut self, instruction: &Instruction, depth: usize) {
        match instruction {
            Instruction::Label { name, body } => {
                self.line(depth, format_args!("label {name}:"));
                self.block(body, depth + 1);
            }
            Instruction::Comment(text) => self.line(depth, format_args!("# {text}")),
            Instruction::Say {
                speaker,
                pre,
                text,
                post,
            } => {
                let quoted = format!("\"{text}\"");
                let parts = [speaker.as_str(), pre.as_str(), quoted.as_str(), post.as_str()];
                let say = parts
                    .iter()
                    .filter(|part| !part.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ");
                self.line(depth, say);
            }
            Instruction::Statement(statement) => self.line(depth, format_args!("$ {statement}")),
            Instruction::Code(code) => self.line(depth, code),
            Instruction::Jump(label) => self.line(depth, format_args!("jump {label}")),
            Instruction::If {
                condition,
                then,
                otherwise,
            } => {
                self.line(depth, format_args!("if {condition}:"));
                self.block(then, depth + 1);
                self.line(depth, "else:");
                self.block(otherwise, depth + 1);
            }
            Instruction::Menu(menu) => self.menu(menu, depth),
            Instruction::Return => self.line(depth, "return"),
            Instruction::Define { name, value } => {
                self.line(depth, format_args!("define {name} = {value}"))
            }
            Instruction::Store { name, body } => {
                self.line(depth, format_args!("init python in {name}:"));
                self.block(body, depth + 1);
            }
            Instruction::Assign { name, value } => {
                self.line(depth, format_args!("{name} = {value}"))
            }
            Instruction::Blank => self.out.push('\n'),
        }
    }

    fn menu(&mut self, menu: &Menu, depth: usize) {
        self.line(depth, "menu:");
        if menu.extend {
            self.line(depth + 1, "extend \"\"");
            self.out.push('\n');
        }
        for option in &menu.options {
            match &option.guard {
                Some(guard) => self.line(
                    depth + 1,
                    format_args!("\"{}\" if {guard}:", option.caption),
                ),
                None => self.line(depth + 1, format_args!("\"{}\":", option.caption)),
            }
            self.block(&option.body, depth + 2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_label_with_say_and_jump() {
        let script: Script = [
            Instruction::Label {
                name: "label_0x10".to_string(),
                body: vec![
                    Instruction::Say {
                        speaker: "c_anna".to_string(),
                        pre: String::new(),
                        text: "Hello.".to_string(),
                        post: "with vpunch".to_string(),
                    },
                    Instruction::Jump("label_0x20".to_string()),
                ],
            },
            Instruction::Blank,
        ]
        .into_iter()
        .collect();

        assert_eq!(
            script.render(),
            "label label_0x10:\n    c_anna \"Hello.\" with vpunch\n    jump label_0x20\n\n"
        );
    }

    #[test]
    fn test_render_menu() {
        let menu = Menu {
            extend: true,
            options: vec![
                MenuOption {
                    caption: "Buy fish".to_string(),
                    guard: Some("gold > 2".to_string()),
                    body: vec![
                        Instruction::Statement("gold -= 3".to_string()),
                        Instruction::Jump("label_buy".to_string()),
                    ],
                },
                MenuOption {
                    caption: "Leave".to_string(),
                    guard: None,
                    body: vec![Instruction::Jump("label_end".to_string())],
                },
            ],
        };
        let mut script = Script::new();
        script.push(Instruction::Menu(menu));

        let expected = concat!(
            "menu:\n",
            "    extend \"\"\n",
            "\n",
            "    \"Buy fish\" if gold > 2:\n",
            "        $ gold -= 3\n",
            "        jump label_buy\n",
            "    \"Leave\":\n",
            "        jump label_end\n",
        );
        assert_eq!(script.render(), expected);
    }

    #[test]
    fn test_render_if_and_store() {
        let script: Script = [
            Instruction::If {
                condition: "met".to_string(),
                then: vec![Instruction::Jump("a".to_string())],
                otherwise: vec![Instruction::Jump("b".to_string())],
            },
            Instruction::Store {
                name: "story".to_string(),
                body: vec![Instruction::Assign {
                    name: "met".to_string(),
                    value: "False".to_string(),
                }],
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(
            script.render(),
            "if met:\n    jump a\nelse:\n    jump b\ninit python in story:\n    met = False\n"
        );
    }
}
