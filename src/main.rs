use std::env;
use std::sync::Arc;

use log::info;
use tokio::sync::mpsc;

use timber_reflex::capture::{FrameDump, FrameSource, primary_display_region};
use timber_reflex::config::AgentConfig;
use timber_reflex::controller::{Controller, KeyBindings};
use timber_reflex::error::AgentResult;
use timber_reflex::game_automation::{AutomationEvent, ChopAutomation, create_automation_channels};
use timber_reflex::input::{ActionQueue, KeyboardSink, spawn_key_listener};
use timber_reflex::matching::TemplateSet;

struct CliOptions {
    template_dir: String,
    dump_dir: Option<String>,
    bindings: KeyBindings,
    debug: bool,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Defaults
    let mut options = CliOptions {
        template_dir: "./img".to_string(),
        dump_dir: None,
        bindings: KeyBindings::default(),
        debug: false,
    };

    // Parse all flags (skip program name)
    for arg in args.iter().skip(1) {
        if arg == "--help" || arg == "-h" {
            print_help();
            return;
        } else if arg == "--version" || arg == "-v" {
            println!("timber-reflex v{}", env!("APP_VERSION_DISPLAY"));
            return;
        } else if arg == "--debug" {
            options.debug = true;
        } else if let Some(rest) = arg.strip_prefix("--templates=") {
            options.template_dir = rest.to_string();
        } else if let Some(rest) = arg.strip_prefix("--dump=") {
            options.dump_dir = Some(rest.to_string());
        } else if let Some(rest) = arg.strip_prefix("--keys=") {
            let mut chars = rest.split(',');
            let bindings = match (chars.next(), chars.next(), chars.next()) {
                (Some(left), Some(right), None)
                    if left.chars().count() == 1 && right.chars().count() == 1 =>
                {
                    KeyBindings::with_manual_chars(
                        left.chars().next().unwrap_or('j'),
                        right.chars().next().unwrap_or('l'),
                    )
                }
                _ => None,
            };
            match bindings {
                Some(bindings) => options.bindings = bindings,
                None => {
                    println!("❌ Invalid --keys '{rest}', expected two letters like --keys=j,l");
                    return;
                }
            }
        } else {
            println!("❌ Unknown argument: {arg}");
            print_help();
            return;
        }
    }

    let filter = if options.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async move {
        if let Err(e) = run_agent(options).await {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    });
}

async fn run_agent(options: CliOptions) -> AgentResult<()> {
    let templates = TemplateSet::load_from_dir(&options.template_dir)?;
    let region = primary_display_region()?;
    templates.validate_for_region(&region)?;
    info!("🖥️ capture region: {region:?}");

    let frame_dump = match &options.dump_dir {
        Some(dir) => {
            let dump = FrameDump::new(dir);
            dump.prepare().await?;
            info!("📸 dumping frames to {dir}");
            Some(dump)
        }
        None => None,
    };

    let screen = Arc::new(FrameSource::new(region));
    let queue = ActionQueue::spawn(KeyboardSink::new)?;

    let (cmd_tx, cmd_rx, event_tx, mut event_rx) = create_automation_channels();
    let mut automation = ChopAutomation::new(
        screen,
        Arc::new(templates),
        queue.sender(),
        cmd_rx,
        event_tx,
        AgentConfig::default(),
        frame_dump,
    );
    tokio::spawn(async move { automation.run().await });

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                AutomationEvent::StateChanged(state) => info!("🎮 state: {state:?}"),
                AutomationEvent::SideCalibrated(side) => info!("🧭 starting side: {side:?}"),
                AutomationEvent::GameOver => println!("🛑 Game over"),
                AutomationEvent::Error(message) => eprintln!("❌ {message}"),
            }
        }
    });

    let (key_tx, key_rx) = mpsc::unbounded_channel();
    spawn_key_listener(key_tx)?;

    println!("🌲 timber-reflex running");
    println!("   <Esc> stop | <Up> start | manual double-press: left/right letter keys");

    let controller = Controller::new(cmd_tx, queue.sender(), options.bindings);
    controller.run(key_rx).await;
    Ok(())
}

fn print_help() {
    println!("🌲 Timber Reflex Agent");
    println!();
    println!("USAGE:");
    println!("    timber-reflex [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --templates=DIR     Template image directory (default: ./img)");
    println!("                        Needs left_empty.png, left_twig.png, right_twig.png, end.png");
    println!("    --dump=DIR          Save every captured frame to DIR as <nanos>.png");
    println!("    --keys=<l>,<r>      Manual double-press keys (default: j,l)");
    println!("    --debug             Verbose logging");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    timber-reflex");
    println!("    timber-reflex --templates=assets/img --keys=a,d");
    println!("    timber-reflex --debug --dump=temp");
}
