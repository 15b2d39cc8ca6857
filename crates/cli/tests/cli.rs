#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use typegap_cli::commands::generate::{GenerateArgs, Outcome, generate};
use typegap_cli::commands::inspect::{InspectArgs, inspect};
use typegap_cli::run_from;

const DESCRIPTION: &str = r#"{
    "types": [
        { "name": "Shop.Order", "members": [
            { "name": "id", "type": "int" },
            { "name": "placed", "type": "System.DateTime" },
            { "name": "status", "type": "Shop.Status" }
        ] },
        { "name": "Shop.Status", "kind": "enum", "values": [{ "name": "Open" }, { "name": "Closed" }] }
    ],
    "controllers": [{
        "name": "OrdersController",
        "actions": [
            { "name": "Get", "method": "GET", "route": "{id}", "returns": "Shop.Order",
              "parameters": [{ "name": "id", "type": "int" }] },
            { "name": "Place", "method": "POST", "returns": "Shop.Order",
              "parameters": [{ "name": "order", "type": "Shop.Order" }] }
        ]
    }]
}"#;

const CONFIG: &str = r#"
transforms = ["moment-datetime"]

[output]
services = "orders.ts"
"#;

fn project(dir: &Path) -> (GenerateArgs, std::path::PathBuf) {
    let description = dir.join("api.json");
    fs::write(&description, DESCRIPTION).unwrap();
    let config = dir.join("typegap.toml");
    fs::write(&config, CONFIG).unwrap();
    let out_dir = dir.join("out");
    let args = GenerateArgs {
        description,
        config: Some(config),
        out_dir: Some(out_dir.clone()),
        check: false,
    };
    (args, out_dir)
}

#[test]
fn test_generate_writes_configured_files() {
    let dir = tempfile::tempdir().unwrap();
    let (args, out_dir) = project(dir.path());

    let outcome = generate(&args).unwrap();
    assert_eq!(outcome, Outcome::Written { written: 3, unchanged: 0 });

    let definitions = fs::read_to_string(out_dir.join("definitions.d.ts")).unwrap();
    assert!(definitions.contains("declare namespace Shop {"));
    assert!(definitions.contains("placed: moment.Moment;"));
    assert!(definitions.contains("status: Shop.Status;"));

    let enums = fs::read_to_string(out_dir.join("enums.ts")).unwrap();
    assert!(enums.contains("export enum Status {\n        Open = 0,\n        Closed = 1,\n    }"));

    let services = fs::read_to_string(out_dir.join("orders.ts")).unwrap();
    assert!(services.contains("export class OrdersService {"));
    assert!(services.contains("public place(order: Shop.Order, ajaxOptions?: IExtendedAjaxSettings): Promise<Shop.Order> {"));
}

#[test]
fn test_regenerating_leaves_files_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let (args, _) = project(dir.path());
    generate(&args).unwrap();
    assert_eq!(generate(&args).unwrap(), Outcome::Written { written: 0, unchanged: 3 });
}

#[test]
fn test_check_detects_drift() {
    let dir = tempfile::tempdir().unwrap();
    let (mut args, out_dir) = project(dir.path());
    args.check = true;

    let Outcome::Stale(paths) = generate(&args).unwrap() else {
        unreachable!("nothing has been generated yet");
    };
    assert_eq!(paths.len(), 3);
    assert!(!out_dir.exists());

    args.check = false;
    generate(&args).unwrap();
    args.check = true;
    assert_eq!(generate(&args).unwrap(), Outcome::UpToDate);

    fs::write(out_dir.join("enums.ts"), "// edited\n").unwrap();
    assert_eq!(generate(&args).unwrap(), Outcome::Stale(vec![out_dir.join("enums.ts")]));
}

#[test]
fn test_generation_errors_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (args, _) = project(dir.path());
    fs::write(
        &args.description,
        r#"{ "controllers": [{ "name": "OrdersController", "actions": [
            { "name": "Get", "route": "{id}", "parameters": [] }
        ] }] }"#,
    )
    .unwrap();
    let err = generate(&args).unwrap_err();
    assert!(err.contains("Route token 'id'"));
}

#[test]
fn test_inspect_reports_routes_and_types() {
    let dir = tempfile::tempdir().unwrap();
    let (args, _) = project(dir.path());
    let report = inspect(&InspectArgs {
        description: args.description,
        config: args.config,
        format: Default::default(),
    })
    .unwrap();
    assert_eq!(report.routes.len(), 2);
    assert_eq!(report.routes[0].template, "api/Orders/{id}");
    assert_eq!(report.routes[1].body.as_deref(), Some("order"));
    assert!(report.types.iter().any(|t| t.name == "Shop.Status" && t.kind == "enum"));
}

#[test]
fn test_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let (args, _) = project(dir.path());
    let description = args.description.to_str().unwrap();
    let config = args.config.as_ref().unwrap().to_str().unwrap();
    let out_dir = args.out_dir.as_ref().unwrap().to_str().unwrap();

    let check = ["typegap", "generate", "-d", description, "-c", config, "-o", out_dir, "--check"];
    assert_eq!(run_from(check), 2);
    assert_eq!(run_from(check[..check.len() - 1].iter().copied()), 0);
    assert_eq!(run_from(check), 0);
    assert_eq!(run_from(["typegap", "generate", "-d", "missing.json", "-c", config]), 1);
}
