//! Example compiling a small virtualization API into an XML schema.
//!
//! Run with: `cargo run --example generate [OUT_PATH]`
//!
//! Without an output path the schema is printed to stdout.

use ironmodel::prelude::*;
use std::path::PathBuf;

fn resource(name: &str) -> TypeDecl {
    TypeDecl::structure(name, "org.example.api.types")
        .extends(Supertype::Class("Identified".into()))
}

fn declarations() -> Vec<Declaration> {
    vec![
        TypeDecl::structure("Identified", "org.example.api.types")
            .with_member(MemberDecl::attribute("id", TypeRefDecl::named("String")))
            .with_member(MemberDecl::attribute("name", TypeRefDecl::named("String")))
            .with_member(MemberDecl::attribute("description", TypeRefDecl::named("String")))
            .into(),
        TypeDecl::structure("Api", "org.example.api.types")
            .with_member(MemberDecl::attribute("time", TypeRefDecl::named("Date")))
            .into(),
        resource("Vm")
            .with_meta(DeclMeta::doc("Represents a virtual machine."))
            .with_member(MemberDecl::attribute("memory", TypeRefDecl::named("Integer")))
            .with_member(MemberDecl::attribute("status", TypeRefDecl::named("VmStatus")))
            .with_member(MemberDecl::attribute("dnsServers", TypeRefDecl::array_of("String")))
            .with_member(MemberDecl::link("disks", TypeRefDecl::array_of("Disk")))
            .with_member(MemberDecl::link("host", TypeRefDecl::named("Host")))
            .into(),
        resource("Disk")
            .with_member(MemberDecl::attribute("provisionedSize", TypeRefDecl::named("Integer")))
            .with_member(MemberDecl::attribute("shareable", TypeRefDecl::named("Boolean")))
            .into(),
        resource("Host")
            .with_member(MemberDecl::attribute("memory", TypeRefDecl::named("Integer")))
            .into(),
        TypeDecl::enumeration(
            "VmStatus",
            "org.example.api.types",
            ["UP", "DOWN", "POWERING_UP", "POWERING_DOWN"],
        )
        .into(),
        ServiceDecl::new("SystemService", "org.example.api.services")
            .root()
            .with_locator(LocatorDecl::new("vms", "VmsService"))
            .into(),
        ServiceDecl::new("VmsService", "org.example.api.services")
            .with_method(
                MethodDecl::new("list").with_parameter(ParameterDecl::new(
                    "vms",
                    TypeRefDecl::array_of("Vm"),
                    Direction::Out,
                )),
            )
            .into(),
    ]
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let compilation = compile(declarations(), DEFAULT_BASE_SCHEMA)?;

    for diagnostic in &compilation.diagnostics {
        eprintln!("{diagnostic}");
    }

    match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            std::fs::write(&path, &compilation.schema)?;
            println!(
                "Wrote schema for {} types to {}",
                compilation.model.types().count(),
                path.display()
            );
        }
        None => println!("{}", compilation.schema),
    }

    Ok(())
}
