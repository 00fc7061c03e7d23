//! dmboard CLI — interactive soundboard powered by the dmboard engine.
//!
//! Usage: dmboard <sounds_config.json> [sounds-dir]
//!
//! Commands at the prompt:
//!   play <category>      Play an ambient category (replaces current)
//!   fadein <category>    Fade a new ambient category in
//!   fadeout              Fade the current ambient out
//!   queue <category>     Queue an ambient category
//!   next                 Skip to the next queued category
//!   pause                Toggle pause/resume
//!   stop                 Stop ambient and clear the queue
//!   clear                Clear the queue
//!   effect <category>    Fire a one-shot effect
//!   vol <0-100>          Set ambient volume
//!   fxvol <0-100>        Set effect volume
//!   fade <seconds>       Set fade duration (1-10)
//!   status               Show current state
//!   list                 List available categories
//!   help                 Show this list
//!   quit                 Exit

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use dmboard_core::backend::output::{OutputStream, RodioBackend};
use dmboard_core::{AmbientEngine, AudioBackend, NullBackend, SoundCatalog, SoundKind};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        std::process::exit(2);
    }

    let config_path = PathBuf::from(&args[0]);
    let sounds_dir = args
        .get(1)
        .map(PathBuf::from)
        .or_else(|| config_path.parent().map(|p| p.join("normalized_sounds")))
        .unwrap_or_else(|| PathBuf::from("normalized_sounds"));

    let catalog = match SoundCatalog::load(&config_path, &sounds_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("dmboard: {}", e);
            std::process::exit(1);
        }
    };

    // The output stream must outlive the engine or audio goes silent.
    let (backend, _stream): (Arc<dyn AudioBackend>, Option<OutputStream>) =
        match RodioBackend::new() {
            Ok((backend, stream)) => (Arc::new(backend), Some(stream)),
            Err(e) => {
                log::warn!("dmboard: no audio output ({}), running silent", e);
                (Arc::new(NullBackend::new()), None)
            }
        };

    let engine = AmbientEngine::new(catalog, backend);
    println!("dmboard ready. Type 'help' for commands.");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else { continue };
        let arg = parts.next();

        let mut changed = true;
        match (command, arg) {
            ("play", Some(name)) => {
                if let Err(e) = engine.play_ambient(name) {
                    eprintln!("{}", e);
                }
            }
            ("fadein", Some(name)) => {
                if let Err(e) = engine.fade_in_ambient(name) {
                    eprintln!("{}", e);
                }
            }
            ("fadeout", _) => engine.fade_out_ambient(),
            ("queue", Some(name)) => engine.queue_ambient(name),
            ("next", _) => engine.skip_to_next(),
            ("pause", _) => engine.toggle_pause_resume(),
            ("stop", _) => engine.stop_ambient(),
            ("clear", _) => engine.clear_queue(),
            ("effect", Some(name)) => {
                changed = false;
                if let Err(e) = engine.play_effect(name) {
                    eprintln!("{}", e);
                }
            }
            ("vol", Some(v)) => match parse_percent(v) {
                Some(v) => engine.set_ambient_volume(v),
                None => eprintln!("vol expects 0-100"),
            },
            ("fxvol", Some(v)) => match parse_percent(v) {
                Some(v) => engine.set_effect_volume(v),
                None => eprintln!("fxvol expects 0-100"),
            },
            ("fade", Some(s)) => match s.parse::<f32>() {
                Ok(secs) => engine.set_fade_duration(secs),
                Err(_) => eprintln!("fade expects seconds, e.g. 'fade 3'"),
            },
            ("status", _) => {
                changed = false;
                print_status(&engine);
            }
            ("list", _) => {
                changed = false;
                print_categories(&engine);
            }
            ("help", _) => {
                changed = false;
                print_usage();
            }
            ("quit", _) | ("exit", _) => break,
            _ => {
                changed = false;
                eprintln!("unknown command, try 'help'");
            }
        }
        if changed {
            print_status(&engine);
        }
    }

    engine.stop_ambient();
}

fn parse_percent(s: &str) -> Option<f32> {
    let v: f32 = s.parse().ok()?;
    if (0.0..=100.0).contains(&v) {
        Some(v / 100.0)
    } else {
        None
    }
}

fn print_status(engine: &AmbientEngine) {
    let snap = engine.snapshot();
    match snap.current {
        Some(name) if snap.paused => println!("current: {} (paused)", name),
        Some(name) if snap.fading => println!("current: {} (fading)", name),
        Some(name) => println!("current: {}", name),
        None => println!("current: (idle)"),
    }
    if snap.queued.is_empty() {
        println!("queue:   (empty)");
    } else {
        println!("queue:   {}", snap.queued.join(", "));
    }
    println!(
        "volume:  ambient {:.0}%  effects {:.0}%  fade {:.0}s",
        snap.ambient_volume * 100.0,
        snap.effect_volume * 100.0,
        snap.fade_duration.as_secs_f32()
    );
}

fn print_categories(engine: &AmbientEngine) {
    let catalog = engine.catalog();
    println!("ambient:  {}", catalog.categories(SoundKind::Ambient).join(", "));
    println!("effects:  {}", catalog.categories(SoundKind::Effect).join(", "));
}

fn print_usage() {
    println!("usage: dmboard <sounds_config.json> [sounds-dir]");
    println!();
    println!("commands:");
    println!("  play <category>      play an ambient category");
    println!("  fadein <category>    fade a new ambient category in");
    println!("  fadeout              fade the current ambient out");
    println!("  queue <category>     queue an ambient category");
    println!("  next                 skip to the next queued category");
    println!("  pause                toggle pause/resume");
    println!("  stop                 stop ambient and clear the queue");
    println!("  clear                clear the queue");
    println!("  effect <category>    fire a one-shot effect");
    println!("  vol <0-100>          set ambient volume");
    println!("  fxvol <0-100>        set effect volume");
    println!("  fade <seconds>       set fade duration (1-10)");
    println!("  status               show current state");
    println!("  list                 list available categories");
    println!("  quit                 exit");
}
