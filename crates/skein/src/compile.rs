//! Compilation of the narrative graph into script instructions.
//!
//! - [`resolve`](resolve_pin): where the flow goes after a pin
//! - [`translate`]: articy expressions to Python
//! - [`Compiler`]: label blocks for every node of a container, including
//!   menus for branching pins
//!
//! Fatal problems are [`Error`]s; everything recoverable is appended to the
//! [`DiagnosticsLog`](crate::diagnostics::DiagnosticsLog).

mod error;
mod expression;
mod menu;
mod node;
mod resolve;

pub use error::Error;
pub use expression::{translate, translate_condition, translate_statements};
pub use node::{Compiler, label_of};
pub use resolve::{Resolution, Target, governing_pin, resolve_pin};

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use skein_core::{
        graph::{Connection, Graph, Node, Pin, PinDirection},
        identifier::Id,
        project::{FlowEntry, Project},
        role::Classification,
    };

    use super::*;
    use crate::{
        assets::UncheckedAssets,
        config::{OutputConfig, ScriptConfig},
        diagnostics::DiagnosticsLog,
        hierarchy::Hierarchy,
        symbols::SymbolTable,
    };

    fn input(node: &str) -> Pin {
        Pin::new(Id::new(&format!("{node}.in")), Id::new(node), PinDirection::Input)
    }

    fn output(node: &str) -> Pin {
        Pin::new(Id::new(&format!("{node}.out")), Id::new(node), PinDirection::Output)
    }

    fn to(node: &str) -> Connection {
        Connection::new(Id::new(node), Id::new(&format!("{node}.in")))
    }

    fn market(first: &str, children: Vec<Node>) -> Project {
        let container = Node::new(Id::new("0x01"), "FlowFragment")
            .with_display_name("Market")
            .with_input_pin(input("0x01").with_connection(to(first)))
            .with_output_pin(output("0x01"));
        let mut nodes = vec![container];
        nodes.extend(
            children
                .into_iter()
                .map(|node| node.with_parent(Id::new("0x01"))),
        );
        Project::new(Graph::new(nodes).unwrap(), vec![FlowEntry::new(Id::new("0x01"))])
    }

    struct Output {
        script: String,
        diagnostics: DiagnosticsLog,
    }

    fn compile(project: &Project, assets: &dyn crate::assets::AssetCatalog) -> Result<Output, Error> {
        let config = ScriptConfig::default().with_emit_comments(false);
        let classification = Classification::default();
        let hierarchy = Hierarchy::build(project, &classification, &OutputConfig::default());
        let speakers: HashMap<Id, String> =
            HashMap::from([(Id::new("0x40"), "c_anna".to_string())]);
        let compiler = Compiler::new(
            project.graph(),
            &hierarchy,
            &classification,
            &config,
            &speakers,
            assets,
        );

        let mut symbols = SymbolTable::new();
        let mut diagnostics = DiagnosticsLog::new();
        let container = hierarchy.iter().next().unwrap();
        let script = compiler.compile_container(container, &mut symbols, &mut diagnostics)?;

        Ok(Output {
            script: script.render(),
            diagnostics,
        })
    }

    #[test]
    fn test_dialogue_chain() {
        let project = market(
            "0x10",
            vec![
                Node::new(Id::new("0x10"), "DialogueFragment")
                    .with_text("Fresh fish!\r\n\r\nCheap!")
                    .with_speaker(Id::new("0x40"))
                    .with_input_pin(input("0x10"))
                    .with_output_pin(output("0x10").with_connection(to("0x20"))),
                Node::new(Id::new("0x20"), "Hub")
                    .with_input_pin(input("0x20"))
                    .with_output_pin(output("0x20")),
            ],
        );

        let output = compile(&project, &UncheckedAssets).unwrap();

        assert_eq!(
            output.script,
            "label label_0x01:\n    jump label_0x10\n\n\
             label label_0x10:\n    c_anna \"Fresh fish!\"\n    c_anna \"Cheap!\"\n    jump label_0x20\n\n\
             label label_0x20:\n    jump label_end\n\n"
        );
        assert_eq!(output.diagnostics.len(), 1);
        let (location, _) = output.diagnostics.entries().next().unwrap();
        assert_eq!(location, "market/gen_market.rpy");
    }

    #[test]
    fn test_directives_shape_dialogue() {
        let project = market(
            "0x10",
            vec![
                Node::new(Id::new("0x10"), "DialogueFragment")
                    .with_text("**Sold** out")
                    .with_directives(r#"label="sold_out", speaker="Vendor", post="with vpunch", markdown"#)
                    .with_input_pin(input("0x10"))
                    .with_output_pin(output("0x10")),
            ],
        );

        let output = compile(&project, &UncheckedAssets).unwrap();

        assert!(output.script.contains("label label_0x01:\n    jump sold_out\n"));
        assert!(output.script.contains(
            "label sold_out:\n    \"Vendor\" \"{b}Sold{/b} out\" with vpunch\n    jump label_end\n"
        ));
    }

    #[test]
    fn test_menu_ordering_and_guards() {
        let project = market(
            "0x10",
            vec![
                Node::new(Id::new("0x10"), "DialogueFragment")
                    .with_text("What will it be?")
                    .with_input_pin(input("0x10"))
                    .with_output_pin(
                        output("0x10")
                            .with_text("asked = true")
                            .with_connection(to("0x30"))
                            .with_connection(to("0x20"))
                            .with_connection(to("0x50")),
                    ),
                Node::new(Id::new("0x20"), "DialogueFragment")
                    .with_menu_text("Haggle")
                    .with_directives("5")
                    .with_input_pin(input("0x20"))
                    .with_output_pin(output("0x20")),
                Node::new(Id::new("0x30"), "DialogueFragment")
                    .with_menu_text("Buy")
                    .with_input_pin(input("0x30").with_text("gold > 2 && !broke"))
                    .with_output_pin(output("0x30")),
                Node::new(Id::new("0x50"), "DialogueFragment")
                    .with_menu_text("Leave")
                    .with_input_pin(input("0x50"))
                    .with_output_pin(output("0x50")),
            ],
        );

        let output = compile(&project, &UncheckedAssets).unwrap();

        let expected = "    \"What will it be?\"\n    menu:\n        extend \"\"\n\n\
            \x20       \"Haggle\":\n            $ asked = True\n            jump label_0x20\n\
            \x20       \"Buy\" if gold > 2 and not broke:\n            $ asked = True\n            jump label_0x30\n\
            \x20       \"Leave\":\n            $ asked = True\n            jump label_0x50\n";
        assert!(output.script.contains(expected), "{}", output.script);
    }

    #[test]
    fn test_empty_caption_is_fatal() {
        let project = market(
            "0x10",
            vec![
                Node::new(Id::new("0x10"), "Hub")
                    .with_input_pin(input("0x10"))
                    .with_output_pin(
                        output("0x10")
                            .with_connection(to("0x20"))
                            .with_connection(to("0x30")),
                    ),
                Node::new(Id::new("0x20"), "Hub").with_input_pin(input("0x20")),
                Node::new(Id::new("0x30"), "Hub")
                    .with_menu_text("Go")
                    .with_input_pin(input("0x30")),
            ],
        );

        let err = compile(&project, &UncheckedAssets).err().unwrap();

        assert_eq!(
            err,
            Error::EmptyOptionCaption {
                origin: Id::new("0x10"),
                destination: "label_0x20".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_label_is_fatal() {
        let project = market(
            "0x10",
            vec![
                Node::new(Id::new("0x10"), "Hub")
                    .with_directives(r#"label="shop""#)
                    .with_input_pin(input("0x10"))
                    .with_output_pin(output("0x10").with_connection(to("0x20"))),
                Node::new(Id::new("0x20"), "Hub")
                    .with_directives(r#"label="shop""#)
                    .with_input_pin(input("0x20")),
            ],
        );

        let err = compile(&project, &UncheckedAssets).err().unwrap();

        assert_eq!(err, Error::DuplicateSymbol("shop".to_string()));
    }

    #[test]
    fn test_condition_and_instruction() {
        let project = market(
            "0x10",
            vec![
                Node::new(Id::new("0x10"), "Condition")
                    .with_expression("gold >= 3 && !broke")
                    .with_input_pin(input("0x10"))
                    .with_output_pin(output("0x10").with_connection(to("0x20")))
                    .with_output_pin(
                        Pin::new(Id::new("0x10.no"), Id::new("0x10"), PinDirection::Output)
                            .with_connection(to("0x30")),
                    ),
                Node::new(Id::new("0x20"), "Instruction")
                    .with_expression("gold -= 3;\r\nfish += 1;")
                    .with_input_pin(input("0x20"))
                    .with_output_pin(output("0x20").with_connection(to("0x30"))),
                Node::new(Id::new("0x30"), "Hub")
                    .with_input_pin(input("0x30"))
                    .with_output_pin(output("0x30")),
            ],
        );

        let output = compile(&project, &UncheckedAssets).unwrap();

        assert!(output.script.contains(
            "label label_0x10:\n    if gold >= 3 and not broke:\n        jump label_0x20\n    else:\n        jump label_0x30\n"
        ));
        assert!(output.script.contains(
            "label label_0x20:\n    $ gold -= 3\n    $ fish += 1\n    jump label_0x30\n"
        ));
    }

    #[test]
    fn test_code_block_assets() {
        let project = market(
            "0x10",
            vec![
                Node::new(Id::new("0x10"), "RenPyBox")
                    .with_text("scene {stall.png}\r\nshow {crate.png}")
                    .with_menu_text("Look around")
                    .with_directives("dont_repeat_menu_text")
                    .with_input_pin(input("0x10"))
                    .with_output_pin(output("0x10")),
            ],
        );
        let known: BTreeSet<String> = ["images/market/stall.png".to_string()].into();

        let output = compile(&project, &known).unwrap();

        assert!(output.script.contains(
            "label label_0x10:\n    scene 'images/market/stall.png'\n    show 'images/market/crate.png'\n    jump label_end\n"
        ));
        let messages: Vec<_> = output
            .diagnostics
            .entries()
            .flat_map(|(_, messages)| messages.to_vec())
            .collect();
        assert!(messages.iter().any(|message| message.contains("images/market/crate.png")));
        assert!(!messages.iter().any(|message| message.contains("stall.png")));
    }

    #[test]
    fn test_unknown_type_and_attention_lines() {
        let project = market(
            "0x10",
            vec![
                Node::new(Id::new("0x10"), "Hub")
                    .with_input_pin(input("0x10"))
                    .with_output_pin(output("0x10").with_connection(to("0x20"))),
                Node::new(Id::new("0x20"), "Hub")
                    .with_input_pin(input("0x20"))
                    .with_output_pin(output("0x20").with_connection(to("0x01"))),
                Node::new(Id::new("0x60"), "Location").with_text("  TODO: add gulls"),
            ],
        );

        let output = compile(&project, &UncheckedAssets).unwrap();

        assert!(!output.script.contains("0x60"));
        let messages: Vec<_> = output
            .diagnostics
            .entries()
            .flat_map(|(_, messages)| messages.to_vec())
            .collect();
        assert!(messages.iter().any(|message| message.contains("TODO: add gulls")));
        assert!(messages.iter().any(|message| message.contains("`Location`")));
    }

    #[test]
    fn test_menu_orders_by_priority_then_numeric_id() {
        let option = |id: &str, caption: &str| {
            Node::new(Id::new(id), "DialogueFragment")
                .with_menu_text(caption)
                .with_input_pin(input(id))
        };
        let project = market(
            "0x10",
            vec![
                Node::new(Id::new("0x10"), "Hub")
                    .with_input_pin(input("0x10"))
                    .with_output_pin(
                        output("0x10")
                            .with_connection(to("0x20"))
                            .with_connection(to("0x9"))
                            .with_connection(to("0x30"))
                            .with_connection(to("0x31")),
                    ),
                option("0x20", "Ten"),
                option("0x9", "Nine"),
                option("0x30", "P5").with_directives("5"),
                option("0x31", "P1").with_directives("1"),
            ],
        );

        let output = compile(&project, &UncheckedAssets).unwrap();

        let positions: Vec<usize> = ["\"P1\":", "\"P5\":", "\"Nine\":", "\"Ten\":"]
            .iter()
            .map(|caption| output.script.find(caption).unwrap())
            .collect();
        assert!(
            positions.windows(2).all(|pair| pair[0] < pair[1]),
            "{}",
            output.script
        );
    }

    #[test]
    fn test_entry_point_takes_label_from_text() {
        let project = market(
            "0x10",
            vec![
                Node::new(Id::new("0x10"), "RenPyEntryPoint")
                    .with_text(" chapter_two \r\n")
                    .with_input_pin(input("0x10"))
                    .with_output_pin(output("0x10").with_connection(to("0x20"))),
                Node::new(Id::new("0x20"), "Hub")
                    .with_input_pin(input("0x20"))
                    .with_output_pin(output("0x20")),
            ],
        );

        let output = compile(&project, &UncheckedAssets).unwrap();

        assert!(output.script.contains("label label_0x01:\n    jump chapter_two\n"));
        assert!(output.script.contains("label chapter_two:\n    jump label_0x20\n"));
    }

    #[test]
    fn test_label_precedence() {
        let config = ScriptConfig::default();
        let entry = |text: &str, directives: &str| {
            Node::new(Id::new("0x10"), "RenPyEntryPoint")
                .with_text(text)
                .with_directives(directives)
        };

        assert_eq!(label_of(&entry("chapter_two", r#"label="intro""#), &config), "intro");
        assert_eq!(label_of(&entry("chapter_two", ""), &config), "chapter_two");
        assert_eq!(label_of(&entry("  ", ""), &config), "label_0x10");
        assert_eq!(
            label_of(&Node::new(Id::new("0x20"), "Hub").with_text("chapter_two"), &config),
            "label_0x20"
        );
    }

    #[test]
    fn test_menu_text_echo_depends_on_type() {
        let project = market(
            "0x10",
            vec![
                Node::new(Id::new("0x10"), "RenPyBox")
                    .with_text("scene black")
                    .with_menu_text("Open the crate")
                    .with_input_pin(input("0x10"))
                    .with_output_pin(output("0x10").with_connection(to("0x20"))),
                Node::new(Id::new("0x20"), "RenPyBoxMenuChoice")
                    .with_text("scene black")
                    .with_menu_text("Open the crate")
                    .with_input_pin(input("0x20"))
                    .with_output_pin(output("0x20").with_connection(to("0x30"))),
                Node::new(Id::new("0x30"), "RenPyBox")
                    .with_text("scene white")
                    .with_menu_text("Close the crate")
                    .with_directives("repeat_menu_text")
                    .with_input_pin(input("0x30"))
                    .with_output_pin(output("0x30")),
            ],
        );

        let output = compile(&project, &UncheckedAssets).unwrap();

        assert!(output.script.contains(
            "label label_0x10:\n    scene black\n    jump label_0x20\n"
        ));
        assert!(output.script.contains(
            "label label_0x20:\n    scene black\n    \"Open the crate\"\n    jump label_0x30\n"
        ));
        assert!(output.script.contains(
            "label label_0x30:\n    scene white\n    \"Close the crate\"\n    jump label_end\n"
        ));
    }
}
