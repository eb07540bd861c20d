//! langtts entry point
//!
//! Speaks text given on the command line, or raw legacy-encoded bytes read
//! from stdin, with a voice chosen for the requested language.

use langtts::config::Config;
use langtts::speech::{Dispatcher, NativeEngine, RecordingEngine, SpeechEngine, VoiceQueue};
use langtts::{debug_print, LangTtsError, Result};
use log::{debug, error, info, warn};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

const USAGE: &str = "\
Usage: langtts [OPTIONS] [TEXT...]

Speak TEXT, or the bytes on stdin when no TEXT is given.

Options:
  -l, --lang N       0 = English, 1 = Chinese, other = keep current voice
      --list-voices  Print installed voices and exit
      --json         With --list-voices, print JSON
  -c, --config PATH  Use PATH instead of ~/.langtts.cfg
      --dry-run      Log instead of speaking; voices are still read from
                     the platform engine when one is available
  -d, --debug        Write debug log to langtts.log
  -h, --help         Show this help";

/// Parsed command line
#[derive(Debug, Default)]
struct Args {
    lang: i32,
    list_voices: bool,
    json: bool,
    config: Option<PathBuf>,
    dry_run: bool,
    debug: bool,
    text: Vec<String>,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> std::result::Result<Args, String> {
    let mut args = Args {
        lang: -1,
        ..Args::default()
    };
    let mut raw = raw.into_iter();

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "-l" | "--lang" => {
                let value = raw.next().ok_or("--lang needs a value")?;
                args.lang = value
                    .parse()
                    .map_err(|_| format!("invalid language code: {}", value))?;
            }
            "-c" | "--config" => {
                let value = raw.next().ok_or("--config needs a path")?;
                args.config = Some(PathBuf::from(value));
            }
            "--list-voices" => args.list_voices = true,
            "--json" => args.json = true,
            "--dry-run" => args.dry_run = true,
            "-d" | "--debug" => args.debug = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ => args.text.push(arg),
        }
    }

    Ok(args)
}

fn init_logging(debug_mode: bool) {
    if debug_mode {
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("langtts.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open langtts.log for debug logging: {}", e);
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }
        info!("langtts version {} starting (debug mode)", langtts::VERSION);
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .parse_default_env()
            .init();
    }
}

fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(2);
        }
    };

    init_logging(args.debug);

    if let Err(e) = run(args) {
        error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    debug!("Config loaded from {:?}", config.path());

    let mut engine: Box<dyn SpeechEngine> = if args.dry_run {
        Box::new(dry_run_engine())
    } else {
        Box::new(NativeEngine::with_config(&config.speech())?)
    };

    if args.list_voices {
        return list_voices(&*engine, args.json);
    }

    let dispatcher = Dispatcher::new(&config.encoding())?;
    let payload = if args.text.is_empty() {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes)?;
        bytes
    } else {
        dispatcher.encode(&args.text.join(" "))?
    };

    if payload.is_empty() {
        return Err(LangTtsError::Config("nothing to say".to_string()));
    }

    let mut queue = VoiceQueue::new();
    queue.set_mute(config.mute());
    queue.push(payload, args.lang);
    let spoken = queue.drain(&mut engine, &dispatcher)?;
    info!("Spoke {} message(s)", spoken);

    Ok(())
}

/// Silent engine seeded with the platform's voices so selection still runs
fn dry_run_engine() -> RecordingEngine {
    let voices = NativeEngine::new().and_then(|native| native.voices());
    match voices {
        Ok(voices) => {
            debug!("Dry run with {} platform voices", voices.len());
            RecordingEngine::new(voices)
        }
        Err(e) => {
            warn!("No platform voices for dry run, voice selection will fail: {}", e);
            RecordingEngine::default()
        }
    }
}

fn list_voices(engine: &dyn SpeechEngine, json: bool) -> Result<()> {
    let voices = engine.voices()?;
    if json {
        debug_print(serde_json::to_string_pretty(&voices)?);
    } else {
        for voice in &voices {
            debug_print(voice);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> std::result::Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_default_lang_keeps_voice() {
        let parsed = args(&["hello", "world"]).unwrap();
        assert_eq!(parsed.lang, -1);
        assert_eq!(parsed.text, vec!["hello", "world"]);
    }

    #[test]
    fn test_flags() {
        let parsed = args(&["--lang", "1", "--dry-run", "-c", "x.cfg", "你好"]).unwrap();
        assert_eq!(parsed.lang, 1);
        assert!(parsed.dry_run);
        assert_eq!(parsed.config, Some(PathBuf::from("x.cfg")));
        assert_eq!(parsed.text, vec!["你好"]);
    }

    #[test]
    fn test_dry_run_engine_uses_platform_voices() {
        let engine = dry_run_engine();
        match NativeEngine::new().and_then(|native| native.voices()) {
            Ok(voices) => assert_eq!(engine.voices().unwrap(), voices),
            // Headless environments have no platform voices
            Err(_) => assert!(engine.voices().unwrap().is_empty()),
        }
    }

    #[test]
    fn test_bad_lang() {
        assert!(args(&["--lang", "zh"]).is_err());
        assert!(args(&["--lang"]).is_err());
    }
}
