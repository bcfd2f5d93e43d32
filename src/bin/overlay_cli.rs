use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use floating_lyric::channel::MethodCall;
use floating_lyric::config::AppConfig;
use floating_lyric::context::OverlayContext;
use floating_lyric::overlay::{TouchAction, TouchEvent};
use floating_lyric::platform::{HeadlessBackend, HeadlessProbe};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(
    name = "overlay_cli",
    about = "Headless harness for the floating lyric overlay router"
)]
struct Cli {
    /// JSON config file (defaults to built-in values)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start with the overlay permission denied
    #[arg(long)]
    deny_permission: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a single method call and print the response
    Call {
        #[arg(long)]
        method: String,
        /// JSON object with the call arguments
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Replay a JSON script of calls and touches, one result line per step
    Replay {
        #[arg(long)]
        script: PathBuf,
        /// Exit with code 2 if any call returned an error
        #[arg(long)]
        fail_on_error: bool,
    },
    /// Show the overlay and drag it along a straight line
    Drag {
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        from: Vec<f32>,
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        to: Vec<f32>,
        #[arg(long, default_value_t = 5)]
        steps: u32,
    },
}

/// One scripted step.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    Call {
        method: String,
        #[serde(default)]
        args: Value,
    },
    Touch {
        action: TouchAction,
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
    },
    Permission {
        granted: bool,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    if std::env::var_os("OVERLAY_CLI_LOG").is_some() {
        floating_lyric::init_logging();
    }

    let config = cli
        .config
        .as_ref()
        .map(AppConfig::load_from_file)
        .unwrap_or_default();

    let backend = HeadlessBackend::new();
    let probe = backend.probe();
    probe.set_permission(!cli.deny_permission);
    let context = OverlayContext::with_backend(Box::new(backend), &config);

    match cli.command {
        Commands::Call { method, args } => {
            println!("{}", context.invoke_json(&method, &args));
            Ok(ExitCode::from(0))
        }
        Commands::Replay {
            script,
            fail_on_error,
        } => run_replay(&context, &probe, script, fail_on_error),
        Commands::Drag { from, to, steps } => run_drag(&context, &from, &to, steps),
    }
}

fn run_replay(
    context: &OverlayContext,
    probe: &HeadlessProbe,
    script: PathBuf,
    fail_on_error: bool,
) -> Result<ExitCode> {
    let raw = fs::read_to_string(&script)
        .with_context(|| format!("reading script {}", script.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing script {}", script.display()))?;

    let mut saw_error = false;
    for step in steps {
        let line = match step {
            Step::Call { method, args } => {
                let response = context.handle_method_call(&MethodCall::new(method, args));
                saw_error |= response.error_code().is_some();
                response.to_json()
            }
            Step::Touch { action, x, y } => {
                let outcome = context.handle_touch(TouchEvent {
                    action,
                    raw_x: x,
                    raw_y: y,
                });
                serde_json::to_value(outcome)?
            }
            Step::Permission { granted } => {
                probe.set_permission(granted);
                json!({ "permission": granted })
            }
        };
        println!("{}", line);
    }

    println!("{}", state_json(context)?);

    if fail_on_error && saw_error {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::from(0))
    }
}

fn run_drag(context: &OverlayContext, from: &[f32], to: &[f32], steps: u32) -> Result<ExitCode> {
    let (&[from_x, from_y], &[to_x, to_y]) = (from, to) else {
        bail!("--from and --to take exactly two values");
    };
    if steps == 0 {
        bail!("--steps must be at least 1");
    }

    let shown = context.invoke_json("show", "{}");
    if !shown.contains("\"success\":true") {
        bail!("show failed: {}", shown);
    }

    let mut outcomes = vec![context.handle_touch(TouchEvent::down(from_x, from_y))];
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        outcomes.push(context.handle_touch(TouchEvent::moved(
            from_x + (to_x - from_x) * t,
            from_y + (to_y - from_y) * t,
        )));
    }
    outcomes.push(context.handle_touch(TouchEvent::up(to_x, to_y)));

    for outcome in outcomes {
        println!("{}", serde_json::to_string(&outcome)?);
    }
    println!("{}", state_json(context)?);
    Ok(ExitCode::from(0))
}

fn state_json(context: &OverlayContext) -> Result<Value> {
    let Some(state) = context.state() else {
        bail!("overlay state lock poisoned");
    };
    Ok(json!({
        "visible": state.visible,
        "text": state.current_text,
        "position": state.position,
        "style": state.style,
    }))
}
