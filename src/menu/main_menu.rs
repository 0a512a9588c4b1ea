use crate::config::save::save_settings;
use crate::config::{Config, Language, TimeFormat, TimelineLayout};
use crate::menu::handlers::{
    run_all_steps, run_edl_generator, run_project_importer, run_thumbnail_generator,
    run_timeline_exporter,
};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_import"),
        t!("main_menu.opt_thumbnails"),
        t!("main_menu.opt_timeline"),
        t!("main_menu.opt_edl"),
        t!("main_menu.opt_all"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => run_project_importer(term, config)?,
        Some(1) => run_thumbnail_generator(term, shutdown_signal, config)?,
        Some(2) => run_timeline_exporter(term, config)?,
        Some(3) => run_edl_generator(term, config)?,
        Some(4) => run_all_steps(term, shutdown_signal, config)?,
        Some(5) => show_settings_menu(term, config)?,
        Some(6) | None => return Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }

    Ok(true)
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_thumbnail"),
            t!("settings.opt_timeline"),
            t!("settings.opt_edl"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_thumbnail_settings(term, config)?,
            Some(1) => show_timeline_settings(term, config)?,
            Some(2) => show_edl_settings(term, config)?,
            Some(3) => show_language_menu(term, config)?,
            Some(4) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn show_thumbnail_settings(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;
    println!("{}", style(t!("settings.thumbnail.title")).cyan().bold());

    let current = config.settings.thumbnail;
    let mut updated = current;

    updated.count = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.thumbnail.count"))
        .default(current.count)
        .validate_with(|value: &usize| {
            if *value >= 1 {
                Ok(())
            } else {
                Err(t!("settings.at_least_one").to_string())
            }
        })
        .interact_text_on(term)?;

    updated.concurrency = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.thumbnail.concurrency"))
        .default(current.concurrency)
        .validate_with(|value: &usize| {
            if *value >= 1 {
                Ok(())
            } else {
                Err(t!("settings.at_least_one").to_string())
            }
        })
        .interact_text_on(term)?;

    updated.keep_history = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.thumbnail.keep_history"))
        .default(current.keep_history)
        .interact_on(term)?;

    if updated != current {
        config.settings.thumbnail = updated;
        save_and_notify(config)?;
    }

    Ok(())
}

fn show_timeline_settings(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;
    println!("{}", style(t!("settings.timeline.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let formats = [TimeFormat::Clock, TimeFormat::Timecode, TimeFormat::Seconds];
    let Some(format_index) = select_option(
        term,
        &t!("settings.timeline.time_format"),
        &formats,
        config.settings.timeline.time_format,
    )?
    else {
        return Ok(());
    };

    let layouts = [TimelineLayout::Midpoint, TimelineLayout::Duration];
    let Some(layout_index) = select_option(
        term,
        &t!("settings.timeline.layout"),
        &layouts,
        config.settings.timeline.layout,
    )?
    else {
        return Ok(());
    };

    let current = config.settings.timeline;
    config.settings.timeline.time_format = formats[format_index];
    config.settings.timeline.layout = layouts[layout_index];

    if config.settings.timeline != current {
        save_and_notify(config)?;
    }

    Ok(())
}

fn show_edl_settings(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;
    println!("{}", style(t!("settings.edl.title")).cyan().bold());

    let current = config.settings.edl;
    let mut updated = current;

    updated.template_mode = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.edl.template_mode"))
        .default(current.template_mode)
        .interact_on(term)?;

    let framerate: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.edl.framerate"))
        .allow_empty(true)
        .with_initial_text(
            current
                .framerate_override
                .map(|fps| fps.to_string())
                .unwrap_or_default(),
        )
        .validate_with(|value: &String| {
            let value = value.trim();
            if value.is_empty() || value.parse::<f64>().is_ok_and(|fps| fps > 0.0) {
                Ok(())
            } else {
                Err(t!("settings.edl.invalid_framerate").to_string())
            }
        })
        .interact_text_on(term)?;
    updated.framerate_override = framerate.trim().parse::<f64>().ok();

    if updated != current {
        config.settings.edl = updated;
        save_and_notify(config)?;
    }

    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw];
    let Some(selection) = select_option(
        term,
        &t!("settings.language.prompt"),
        &languages,
        config.settings.language,
    )?
    else {
        return Ok(());
    };

    let selected_lang = languages[selection];
    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_and_notify(config)?;
    }

    Ok(())
}

/// ESC 回傳 `None`
fn select_option<T: PartialEq + ToString>(
    term: &Term,
    prompt: &str,
    choices: &[T],
    current: T,
) -> Result<Option<usize>> {
    let items: Vec<String> = choices.iter().map(ToString::to_string).collect();
    let default_index = choices.iter().position(|c| *c == current).unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    Ok(selection)
}

fn save_and_notify(config: &Config) -> Result<()> {
    save_settings(&config.settings)?;
    println!("\n{}", style(t!("settings.saved")).green());
    std::thread::sleep(std::time::Duration::from_secs(1));
    Ok(())
}
