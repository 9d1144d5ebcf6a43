// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::{Config, Strategy, parse_resource};
use rentview_app::{Resource, Role};
use runtime::TableSetup;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `rentview --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let api = config.api_config().with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;

    let setup = TableSetup {
        resource: options.resource.map_or_else(|| config.resource(), Ok)?,
        role: options.role,
        strategy: options.strategy.map_or_else(|| config.strategy(), Ok)?,
        page_size: config.page_size()?,
        demo: options.demo,
    };
    if options.check_only {
        return runtime::check(setup, &api);
    }

    logging::init(config.log_level(), &config.log_file()?)?;
    info!(config = %options.config_path.display(), "rentview starting");

    let mut table = runtime::open_table(setup, &api)?;
    if options.dump {
        runtime::settle(table.as_mut(), api.timeout + Duration::from_secs(1));
        let view = table.view();
        if let Some(error) = view.error {
            return Err(anyhow!("{error}"));
        }
        let columns = rentview_tui::table_columns(&view, setup.resource);
        print!("{}", rentview_tui::render_text_table(&view, &columns));
        return Ok(());
    }

    rentview_tui::run_table(table.as_mut(), setup.resource)
}

#[cfg(test)]
fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    demo: bool,
    dump: bool,
    resource: Option<Resource>,
    strategy: Option<Strategy>,
    role: Role,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        demo: false,
        dump: false,
        resource: None,
        strategy: None,
        role: Role::Admin,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--resource" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--resource requires cars, bookings, or users"))?;
                options.resource = Some(parse_resource(value.as_ref())?);
            }
            "--strategy" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--strategy requires client or server"))?;
                options.strategy = Some(Strategy::parse(value.as_ref())?);
            }
            "--role" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--role requires admin, staff, or customer"))?;
                let raw = value.as_ref();
                options.role = Role::parse(raw).ok_or_else(|| {
                    anyhow!("unknown role {raw:?}; use one of: admin, staff, customer")
                })?;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--dump" => {
                options.dump = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("rentview");
    println!("  --config <path>          Use a specific config path");
    println!("  --resource <name>        Table to open: cars, bookings, users");
    println!("  --strategy <name>        client (filter locally) or server (ask per page)");
    println!("  --role <name>            Viewer role: admin, staff, customer");
    println!("  --demo                   Use seeded in-memory data instead of the API");
    println!("  --dump                   Print the first page as text and exit");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and startup settings");
    println!("  --help                   Show this help");
}
