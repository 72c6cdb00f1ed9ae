use reflectobot::audio::AlsaBackend;
use reflectobot::config::Settings;
use reflectobot::coordinator::AudioCoordinator;
use reflectobot::init_app_dirs;
use reflectobot::progress::{find_badge, ProgressStore, ALL_BADGES};
use reflectobot::ui::{
    format_event, printing_speech_options, run_interactive, Cli, Command, Gestures, InteractiveOptions, ToggleTarget,
};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const LOG_TARGET: &str = "reflectobot::main";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::new();
    if let Err(e) = run(&cli).await {
        cli.display_error(e.as_ref());
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    init_app_dirs()?;

    // Config file first, then command-line and environment overrides
    let config_path = match &cli.args.config {
        Some(path) => Path::new(path).to_path_buf(),
        None => Settings::default_path(),
    };
    let mut settings = Settings::load(&config_path)?;
    cli.apply_overrides(&mut settings);
    settings.validate()?;
    debug!(target: LOG_TARGET, "Using settings: {:?}", settings);

    let progress = Arc::new(ProgressStore::open(settings.progress_path())?);

    // Commands that never touch audio
    match &cli.args.command {
        Command::Settings => {
            cli.display_settings(&progress.load());
            return Ok(());
        }
        Command::Badges => {
            cli.display_badges(&progress.load());
            return Ok(());
        }
        Command::Export { path } => {
            progress.export_to(path)?;
            println!("Session saved to {}", path.display());
            return Ok(());
        }
        Command::Import { path } => {
            let loaded = progress.import_from(path)?;
            println!("Session loaded: {} of {} badges collected.", loaded.badge_count, ALL_BADGES.len());
            return Ok(());
        }
        Command::ResetBadge { id } => {
            let was_earned = progress.reset_badge(id)?;
            let name = find_badge(id).map_or(id.as_str(), |badge| badge.name);
            if was_earned {
                println!("Badge '{}' has been reset.", name);
            } else {
                println!("Badge '{}' was not earned.", name);
            }
            return Ok(());
        }
        Command::SkipTo { id } => {
            progress.skip_to_challenge(id)?;
            println!("Current challenge is now '{}'.", id);
            return Ok(());
        }
        Command::Erase => {
            progress.erase()?;
            println!("All progress erased.");
            return Ok(());
        }
        _ => {}
    }

    let backend = Arc::new(AlsaBackend::new(&settings.alsa_device, settings.assets_dir.clone()));
    let (coordinator, task) = AudioCoordinator::spawn(backend, progress.clone());
    let gestures = Gestures::new(coordinator.clone(), progress.clone(), &settings);

    let mut events = coordinator.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let Some(line) = format_event(&event) {
                println!("{}", line);
            }
        }
    });

    let result = play(&gestures, &settings, cli.args.command.clone()).await;

    coordinator.shutdown();
    let _ = task.await;
    // The printer ends once every event sender is gone.
    drop(gestures);
    drop(coordinator);
    let _ = printer.await;
    info!(target: LOG_TARGET, "Done.");
    result
}

async fn play(gestures: &Gestures, settings: &Settings, command: Command) -> Result<(), Box<dyn Error>> {
    let coordinator = gestures.coordinator();
    match command {
        Command::Greet { file, poses, idle } => {
            coordinator.play_primary(file, printing_speech_options(poses, idle));
        }
        Command::Hover { file } => {
            coordinator.play_hover(file.unwrap_or_else(|| settings.hover_sound.clone()));
        }
        Command::Click { file } => {
            coordinator.play_click(file.unwrap_or_else(|| settings.click_sound.clone()));
        }
        Command::Name { file } => coordinator.play_name(file),
        Command::Toggle { target } => {
            let enabled = match target {
                ToggleTarget::Voices => gestures.toggle_voices().await,
                ToggleTarget::Sounds => gestures.toggle_sounds().await,
            }?;
            println!("{:?} turned {}.", target, if enabled { "on" } else { "off" });
        }
        Command::Interactive { greeting, name, poses, idle } => {
            let options = InteractiveOptions {
                greeting,
                name,
                poses,
                idle_pose: idle,
            };
            run_interactive(gestures, options).await?;
            return Ok(());
        }
        _ => return Ok(()),
    }

    gestures.wait_until_idle().await;
    Ok(())
}
