use anyhow::Result;
use clap::Parser;
use console::{Term, style};
use log::{info, warn};
use rust_i18n::t;
use scene_export::cli::{Cli, execute};
use scene_export::config::Config;
use scene_export::error::{CANCELLED_EXIT_CODE, is_cancelled};
use scene_export::init;
use scene_export::menu::show_main_menu;
use scene_export::signal::setup_shutdown_signal;
use std::process::ExitCode;

rust_i18n::i18n!("locales", fallback = "en-US");

fn main() -> ExitCode {
    init::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_cancelled(&e) => {
            warn!("程式被中斷: {e}");
            eprintln!("{} {e}", style(t!("main_menu.error_prefix")).yellow().bold());
            ExitCode::from(CANCELLED_EXIT_CODE)
        }
        Err(e) => {
            warn!("程式錯誤: {e:#}");
            eprintln!("{} {e:#}", style(t!("main_menu.error_prefix")).red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let shutdown_signal = setup_shutdown_signal()?;
    let mut config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());

    if let Some(command) = &cli.command {
        return execute(
            command,
            cli.projects_root.as_deref(),
            &mut config,
            &shutdown_signal,
        );
    }

    if let Some(root) = &cli.projects_root {
        config.settings.projects_root.clone_from(root);
    }

    let term = Term::stdout();
    while show_main_menu(&term, &shutdown_signal, &mut config)? {}

    term.clear_screen()?;
    println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
    info!("程式正常結束");
    Ok(())
}
