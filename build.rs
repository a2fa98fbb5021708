// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Repository/product ID list argument
fn ids_arg(help: &'static str) -> Arg {
    Arg::new("ids").num_args(0..).help(help)
}

fn build_cli() -> Command {
    Command::new("conary-mirror")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Conary Contributors")
        .about("Mirror package repositories for local distribution")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Configuration file (default: /etc/conary/mirror.toml)"),
        )
        .arg(
            Arg::new("db_path")
                .short('d')
                .long("db-path")
                .value_name("PATH")
                .default_value("/var/lib/conary/mirror.db")
                .global(true)
                .help("Path to the database file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable debug logging"),
        )
        .subcommand(Command::new("init").about("Initialize the mirror database"))
        .subcommand(
            Command::new("mirror")
                .about("Mirror repositories (all enabled repositories by default)")
                .subcommand(Command::new("all").about("Mirror all enabled repositories"))
                .subcommand(
                    Command::new("repository")
                        .about("Mirror enabled repositories with the given repository IDs")
                        .arg(ids_arg("Repository IDs (space or comma separated)")),
                )
                .subcommand(
                    Command::new("product")
                        .about("Mirror enabled repositories of the given products")
                        .arg(ids_arg("Product IDs or identifier/version[/arch] targets")),
                ),
        )
        .subcommand(
            Command::new("repos")
                .about("Repository management")
                .subcommand_required(true)
                .subcommand(
                    Command::new("list").about("List repositories marked for mirroring").arg(
                        Arg::new("all")
                            .short('a')
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("Show all repositories (including those not mirrored)"),
                    ),
                )
                .subcommand(
                    Command::new("enable")
                        .about("Enable mirroring of repositories")
                        .arg(ids_arg("Repository IDs").required(true)),
                )
                .subcommand(
                    Command::new("disable")
                        .about("Disable mirroring of repositories")
                        .arg(ids_arg("Repository IDs").required(true)),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import products and repositories from a JSON file")
                .arg(Arg::new("file").required(true).help("Path to the JSON document")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("conary-mirror.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
