//! takt CLI, a command-line metronome.
//!
//! Usage:
//!   takt 120 --meter 4 --accents 1
//!   takt 90 --engine sine --seconds 10
//!   takt 60 --wav click.wav --seconds 4

use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use std::{env, fs};

use takt_master::{Metronome, Settings, SoundEngine};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage();
        return;
    }

    let mut metronome = match flag_value(&args, "--config") {
        Some(path) => {
            let settings = Settings::load(Path::new(&path)).unwrap_or_else(|e| {
                eprintln!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            });
            Metronome::with_settings(&settings)
        }
        None => Metronome::new(),
    };

    if let Some(arg) = args.get(1).filter(|a| !a.starts_with("--")) {
        let bpm: i64 = arg.parse().unwrap_or_else(|_| {
            eprintln!("Invalid BPM: {}", arg);
            std::process::exit(1);
        });
        metronome.set_speed(bpm);
    }
    if let Some(value) = flag_value(&args, "--meter") {
        metronome.set_meter(parse_num(&value, "--meter"));
    }
    if let Some(list) = flag_value(&args, "--accents") {
        for part in list.split(',') {
            metronome.set_accent(parse_num(part, "--accents"), true);
        }
    }
    if let Some(name) = flag_value(&args, "--engine") {
        metronome.set_sound_engine(parse_engine(&name));
    }
    if let Some(value) = flag_value(&args, "--volume") {
        let volume: f32 = value.parse().unwrap_or_else(|_| {
            eprintln!("Invalid volume: {}", value);
            std::process::exit(1);
        });
        metronome.set_volume(volume);
    }

    let seconds = flag_value(&args, "--seconds").map(|v| parse_num(&v, "--seconds") as u64);

    match flag_value(&args, "--wav") {
        Some(path) => render_to_wav(&metronome, &path, seconds.unwrap_or(10) as u32),
        None => play(&mut metronome, seconds),
    }
}

fn usage() {
    println!("Usage: takt [BPM] [options]");
    println!();
    println!("Options:");
    println!("  --meter N        beats per measure (1-100, default 1)");
    println!("  --accents 1,3    comma-separated accented beat numbers");
    println!("  --engine NAME    file | sine | triangle | sawtooth");
    println!("  --volume V       volume from 0.0 to 1.0 (default 0.5)");
    println!("  --config FILE    load settings from a JSON file");
    println!("  --seconds S      stop after S seconds");
    println!("  --wav FILE       render to a WAV file instead of playing");
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_num(value: &str, flag: &str) -> i64 {
    value.trim().parse().unwrap_or_else(|_| {
        eprintln!("Invalid value for {}: {}", flag, value);
        std::process::exit(1);
    })
}

fn parse_engine(name: &str) -> SoundEngine {
    match name {
        "file" => SoundEngine::File,
        "sine" => SoundEngine::Sine,
        "triangle" => SoundEngine::Triangle,
        "sawtooth" => SoundEngine::Sawtooth,
        "midi" => SoundEngine::Midi,
        _ => {
            eprintln!(
                "Unknown engine: {} (expected file, sine, triangle, sawtooth)",
                name
            );
            std::process::exit(1);
        }
    }
}

fn play(metronome: &mut Metronome, seconds: Option<u64>) {
    if let Err(e) = metronome.start() {
        eprintln!("Failed to start: {}", e);
        std::process::exit(1);
    }

    println!(
        "{} BPM ({}), {} beats per measure",
        metronome.speed(),
        metronome.tempo_marking(),
        metronome.meter()
    );

    let started = Instant::now();
    while metronome.is_running() {
        if let Some(limit) = seconds {
            if started.elapsed() >= Duration::from_secs(limit) {
                break;
            }
        }
        if let Some(pos) = metronome.current_beat() {
            print!(
                "\rBeat {:>4} ({}/{})",
                pos.count, pos.beat_in_measure, metronome.meter()
            );
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    let failure = metronome.take_error();
    metronome.stop();
    if let Some(e) = failure {
        eprintln!("\rPlayback failed: {}", e);
        std::process::exit(1);
    }
    println!("\rDone.            ");
}

fn render_to_wav(metronome: &Metronome, path: &str, seconds: u32) {
    let sample_rate: u32 = 44100;
    println!("Rendering {} s to {} at {} Hz...", seconds, path, sample_rate);

    let wav = metronome.render_to_wav(sample_rate, seconds);
    fs::write(path, &wav).unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {}", path, e);
        std::process::exit(1);
    });

    println!("Wrote {} bytes", wav.len());
}
