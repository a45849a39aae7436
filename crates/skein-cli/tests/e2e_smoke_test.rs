use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use skein_cli::{Args, run};

/// Collects all .json files from a directory
fn collect_exports(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn args(input: &Path, output: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        game_dir: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_exports() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let exports = collect_exports(fixtures());

    assert!(!exports.is_empty(), "No exports found in tests/fixtures/");

    let mut failed = Vec::new();
    for export in &exports {
        let output = temp_dir
            .path()
            .join("game")
            .join(export.file_stem().unwrap());

        if let Err(e) = run(&args(export, &output)) {
            failed.push((export.clone(), e));
        }
    }

    if !failed.is_empty() {
        eprintln!("\nValid exports that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid export(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_exports() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let exports = collect_exports(fixtures().join("errors"));

    assert!(
        !exports.is_empty(),
        "No error exports found in tests/fixtures/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();
    for export in &exports {
        let output = temp_dir.path().join(export.file_stem().unwrap());

        if run(&args(export, &output)).is_ok() {
            unexpectedly_succeeded.push(export.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError exports that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error export(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_harbour_output() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let game = temp_dir.path().join("game");
    let output = game.join("generated");
    fs::create_dir_all(game.join("images").join("harbour")).unwrap();
    fs::write(game.join("images").join("harbour").join("herring.png"), b"png").unwrap();

    run(&args(&fixtures().join("harbour.json"), &output)).expect("Failed to compile harbour");

    let read = |name: &str| fs::read_to_string(output.join(name)).unwrap();

    assert_eq!(
        read("gen_base.rpy"),
        "# Entry point of the game\nlabel start:\n    jump label_0x01\n\nlabel label_end:\n    return\n\n"
    );
    assert_eq!(
        read("gen_characters.rpy"),
        "define c_vendor = Character(\"Vendor\", dynamic=False)\n\
         define c_player = Character(\"Player.name\", dynamic=True)\n\n"
    );

    let variables = read("gen_variables.rpy");
    assert!(variables.contains("init python in market:\n    # Harbour market state\n"));
    assert!(variables.contains("    gold = 5\n"));
    assert!(variables.contains("init python in player:\n"));
    assert!(variables.contains("    name = \"Sam\"\n"));

    let script = read("harbour/gen_harbour.rpy");
    assert!(script.contains("    c_vendor \"Morning! Fresh {b}herring{/b} today.\"\n"));
    let looking = script.find("\"Just looking\":").unwrap();
    let buying = script.find("\"Buy a herring\" if Market.gold >= 2:").unwrap();
    assert!(looking < buying);
    assert!(script.contains("    $ Market.gold -= 2\n    $ Market.has_fish = True\n"));
    assert!(script.contains("    if Market.has_fish and not Market.sold_out:\n"));
    assert!(script.contains(
        "    show 'images/harbour/herring.png'\n    with dissolve\n    \"The herring glistens.\"\n    jump label_end\n"
    ));
    assert!(script.contains("label label_0x80:\n    # Jump\n    jump harbour_greeting\n"));

    let log = read("gen_log.txt");
    assert_eq!(
        log,
        "harbour/gen_harbour.rpy\n    node 0x70 has no connection, jumping to the end\n"
    );
}

#[test]
fn e2e_rerun_replaces_output() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("generated");
    let export = fixtures().join("harbour.json");

    run(&args(&export, &output)).unwrap();
    let first = fs::read_to_string(output.join("harbour/gen_harbour.rpy")).unwrap();
    run(&args(&export, &output)).unwrap();
    let second = fs::read_to_string(output.join("harbour/gen_harbour.rpy")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn e2e_refuses_foreign_output_directory() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    fs::write(temp_dir.path().join("script.rpy"), "label start:\n    return\n").unwrap();

    let result = run(&args(&fixtures().join("harbour.json"), temp_dir.path()));

    assert!(result.is_err());
    assert!(temp_dir.path().join("script.rpy").exists());
}
