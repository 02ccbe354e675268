//! CLI for NanoCanvas - couple fusion, logos, ads and photo edits.

use clap::{Args, Parser, Subcommand, ValueEnum};
use nanocanvas::image::UploadedImage;
use nanocanvas::studio::{
    Bounds, CompletedGeneration, CompletionOutcome, FormEdit, Partner, PointerEvent, Router,
    ShellCommand, Studio, View, SHELL_HELP,
};
use nanocanvas::{Config, EditorMode, GeminiModel, GeminiProviderBuilder, ImageProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "nanocanvas")]
#[command(about = "Couple fusion, logos, ads and photo edits via Gemini image generation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Gemini model to use
    #[arg(long, value_enum, global = true, default_value = "nano-banana")]
    model: ModelArg,

    /// Override the Gemini API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory results are saved into
    #[arg(short, long, global = true, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge two portraits into one couple photo
    Couple(CoupleArgs),

    /// Create a brand logo from a description
    Logo(TextArgs),

    /// Create an advertisement image from a description
    Ad(TextArgs),

    /// Add, remove or change something in a photo
    Edit(EditArgs),

    /// List the available tools
    Tools,

    /// Check that the API key and model are accepted
    Check,

    /// Interactive session: navigate tools, generate, save
    Shell,
}

#[derive(Args)]
struct CoupleArgs {
    /// First partner's photo
    first: PathBuf,

    /// Second partner's photo
    second: PathBuf,

    /// Custom instruction (defaults to a romantic couple photo)
    #[arg(short, long)]
    prompt: Option<String>,
}

#[derive(Args)]
struct TextArgs {
    /// What to create
    description: String,
}

#[derive(Args)]
struct EditArgs {
    /// Photo to edit
    image: PathBuf,

    /// What to add, remove or change
    subject: String,

    /// Kind of edit
    #[arg(short, long, value_enum, default_value = "add")]
    mode: ModeArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    NanoBanana,
    NanoBananaPro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::NanoBanana => GeminiModel::NanoBanana,
            ModelArg::NanoBananaPro => GeminiModel::NanoBananaPro,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Add,
    Remove,
    Change,
}

impl From<ModeArg> for EditorMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Add => EditorMode::Add,
            ModeArg::Remove => EditorMode::Remove,
            ModeArg::Change => EditorMode::Change,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Commands::Tools = cli.command {
        return list_tools(cli.json);
    }

    // The credential is checked before any screen is opened.
    let mut config = Config::from_env()?.with_model(cli.model.into());
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.as_str());
    }
    let provider: Arc<dyn ImageProvider> =
        Arc::new(GeminiProviderBuilder::from_config(&config).build()?);

    match cli.command {
        Commands::Couple(args) => {
            let first = open_image(&args.first)?;
            let second = open_image(&args.second)?;
            let mut studio = Studio::new(provider);
            studio.router_mut().navigate_to(View::CoupleGenerator);
            if let Some(screen) = studio.router_mut().couple_mut() {
                let form = screen.inputs_mut();
                form.set_partner(Partner::One, Some(first));
                form.set_partner(Partner::Two, Some(second));
                form.set_instruction(args.prompt.unwrap_or_default());
            }
            finish_one_shot(studio, &cli.output_dir, cli.json).await?;
        }
        Commands::Logo(args) => {
            let mut studio = Studio::new(provider);
            studio.router_mut().navigate_to(View::BrandLogo);
            if let Some(screen) = studio.router_mut().logo_mut() {
                screen.inputs_mut().set_description(args.description);
            }
            finish_one_shot(studio, &cli.output_dir, cli.json).await?;
        }
        Commands::Ad(args) => {
            let mut studio = Studio::new(provider);
            studio.router_mut().navigate_to(View::AdMaker);
            if let Some(screen) = studio.router_mut().ad_mut() {
                screen.inputs_mut().set_description(args.description);
            }
            finish_one_shot(studio, &cli.output_dir, cli.json).await?;
        }
        Commands::Edit(args) => {
            let image = open_image(&args.image)?;
            let mut studio = Studio::new(provider);
            studio.router_mut().navigate_to(View::PhotoEditor);
            if let Some(screen) = studio.router_mut().editor_mut() {
                let form = screen.inputs_mut();
                form.set_image(Some(image));
                form.set_mode(args.mode.into());
                form.set_subject(args.subject);
            }
            finish_one_shot(studio, &cli.output_dir, cli.json).await?;
        }
        Commands::Shell => {
            run_shell(provider, cli.output_dir).await?;
        }
        Commands::Check => {
            check_provider(provider.as_ref(), &config, cli.json).await?;
        }
        Commands::Tools => unreachable!("handled before configuration"),
    }

    Ok(())
}

async fn check_provider(provider: &dyn ImageProvider, config: &Config, json_output: bool) -> anyhow::Result<()> {
    let outcome = provider.health_check().await;
    if json_output {
        let result = serde_json::json!({
            "provider": provider.name(),
            "model": config.model.as_str(),
            "base_url": config.base_url,
            "ok": outcome.is_ok(),
            "error": outcome.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    match outcome {
        Ok(()) => {
            if !json_output {
                println!("{} ({}) is reachable", provider.name(), config.model.as_str());
            }
            Ok(())
        }
        Err(err) => anyhow::bail!("health check failed: {err}"),
    }
}

fn open_image(path: &Path) -> anyhow::Result<UploadedImage> {
    UploadedImage::open(path).map_err(|err| {
        tracing::warn!("{err}");
        anyhow::anyhow!(err.user_message())
    })
}

async fn finish_one_shot(mut studio: Studio, output_dir: &Path, json_output: bool) -> anyhow::Result<()> {
    let view = studio.router().view();
    let outcome = studio.generate().await;

    match outcome {
        Some(CompletionOutcome::Succeeded) => {}
        Some(CompletionOutcome::Failed(notice)) => anyhow::bail!(notice),
        Some(CompletionOutcome::Discarded) => anyhow::bail!("result was discarded"),
        None => anyhow::bail!("{} needs more input before it can generate", view.title()),
    }

    let viewer = studio
        .router_mut()
        .viewer_mut()
        .ok_or_else(|| anyhow::anyhow!("no result to save"))?;
    let path = viewer.save_to(output_dir)?;
    let image = viewer.image();

    if json_output {
        let result = serde_json::json!({
            "tool": view.slug(),
            "success": true,
            "output": path.display().to_string(),
            "size_bytes": image.size(),
            "format": image.format.extension(),
            "model": image.metadata.model,
            "duration_ms": image.metadata.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{}: saved {} ({} bytes)",
            view.title(),
            path.display(),
            image.size()
        );
        if let Some(duration) = image.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }

    studio.router_mut().close_viewer();
    Ok(())
}

fn list_tools(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ToolInfo {
        command: &'static str,
        title: &'static str,
        description: &'static str,
        inputs: &'static str,
    }

    let tools: Vec<ToolInfo> = View::TOOLS
        .iter()
        .map(|view| ToolInfo {
            command: view.slug(),
            title: view.title(),
            description: view.description(),
            inputs: match view {
                View::CoupleGenerator => "two images, optional instruction",
                View::PhotoEditor => "one image, mode, subject",
                _ => "description",
            },
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&tools)?);
    } else {
        println!("Available tools:\n");
        for t in &tools {
            println!("  {:<8} {} - {}", t.command, t.title, t.description);
            println!("           inputs: {}", t.inputs);
        }
    }

    Ok(())
}

async fn run_shell(provider: Arc<dyn ImageProvider>, output_dir: PathBuf) -> anyhow::Result<()> {
    let mut router = Router::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<CompletedGeneration>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("NanoCanvas shell ({}). Type 'help' for commands.", provider.name());
    print_menu();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<ShellCommand>() {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => handle_command(command, &mut router, &provider, &tx, &output_dir),
                    Err(err) => eprintln!("{err}"),
                }
            }
            Some(done) = rx.recv() => {
                match router.complete(done) {
                    CompletionOutcome::Succeeded => {
                        println!("Result ready: 'look <x> <y>' to zoom, 'save' to download, 'close' to return.");
                    }
                    CompletionOutcome::Failed(notice) => eprintln!("{notice}"),
                    CompletionOutcome::Discarded => {}
                }
            }
        }
    }

    Ok(())
}

fn handle_command(
    command: ShellCommand,
    router: &mut Router,
    provider: &Arc<dyn ImageProvider>,
    tx: &mpsc::UnboundedSender<CompletedGeneration>,
    output_dir: &Path,
) {
    match command {
        ShellCommand::Open(view) => {
            router.navigate_to(view);
            print_screen(router);
        }
        ShellCommand::Home => {
            router.navigate_home();
            print_menu();
        }
        ShellCommand::Image { slot, path } => match UploadedImage::open(&path) {
            Ok(image) => edit_form(router, FormEdit::Image { slot, image: Some(image) }),
            Err(err) => {
                tracing::warn!("{err}");
                eprintln!("{}", err.user_message());
            }
        },
        ShellCommand::Clear { slot } => edit_form(router, FormEdit::Image { slot, image: None }),
        ShellCommand::Text(text) => edit_form(router, FormEdit::Text(text)),
        ShellCommand::Mode(mode) => edit_form(router, FormEdit::Mode(mode)),
        ShellCommand::Generate => match router.trigger() {
            Some(pending) => {
                let provider = Arc::clone(provider);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let done = pending.run(provider.as_ref()).await;
                    // The shell may already be gone.
                    let _ = tx.send(done);
                });
                println!("Dreaming...");
            }
            None => eprintln!("{}", disabled_reason(router)),
        },
        ShellCommand::Save(dir) => match router.viewer_mut() {
            Some(viewer) => {
                let dir = dir.as_deref().unwrap_or(output_dir);
                match viewer.save_to(dir) {
                    Ok(path) => println!("Saved {}", path.display()),
                    Err(err) => eprintln!("could not save: {err}"),
                }
            }
            None => eprintln!("no result to save"),
        },
        ShellCommand::Look { x, y } => match router.viewer_mut() {
            Some(viewer) => {
                let surface = Bounds::new(0.0, 0.0, 100.0, 100.0);
                viewer.handle(PointerEvent::MouseMove { x, y }, &surface);
                let t = viewer.transform();
                println!(
                    "zoom {:.1}x at ({:.1}%, {:.1}%)",
                    t.scale, t.origin_x, t.origin_y
                );
            }
            None => eprintln!("no result open"),
        },
        ShellCommand::Close => {
            if router.close_viewer() {
                print_screen(router);
            } else {
                eprintln!("no result open");
            }
        }
        ShellCommand::Status => print_screen(router),
        ShellCommand::Tools => print_menu(),
        ShellCommand::Help => println!("{SHELL_HELP}"),
        ShellCommand::Quit => {}
    }
}

fn edit_form(router: &mut Router, edit: FormEdit) {
    match router.screen_mut() {
        Some(screen) => {
            if let Err(err) = screen.apply(edit) {
                eprintln!("{err}");
            }
        }
        None => eprintln!("open a tool first (try 'tools')"),
    }
}

fn disabled_reason(router: &Router) -> &'static str {
    match router.status() {
        None => "open a tool first (try 'tools')",
        Some(nanocanvas::ScreenStatus::Pending) => "already generating",
        Some(nanocanvas::ScreenStatus::Succeeded) => "close the current result first",
        _ => "fill in the required inputs first",
    }
}

fn print_menu() {
    println!("Tools:");
    for view in View::TOOLS {
        println!("  open {:<7} {} - {}", view.slug(), view.title(), view.description());
    }
}

fn print_screen(router: &Router) {
    let Some(screen) = router.screen() else {
        print_menu();
        return;
    };
    println!("[{}] {:?}", screen.view().title(), screen.status());
    for (label, value) in screen.fields() {
        println!("  {label}: {value}");
    }
    if let Some(notice) = screen.notice() {
        println!("  ! {notice}");
    }
}
