//! Console command handlers
//!
//! Line-oriented input port: each line on stdin maps onto one
//! SessionController operation.

use crate::capture::Resolution;
use crate::config::AppConfig;
use crate::session::SessionController;
use crate::utils::error::{AppError, AppResult, ErrorResponse};
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const HELP: &str = "\
commands:
  start [session]   start capturing (camera + pipeline + 1s stats)
  stop              stop capturing and release the camera
  res WxH           change the send resolution
  net LABEL         change the network label
  export [dir]      write final_data_<session>.csv
  reset             clear accumulated records
  status            show the session status
  cameras           list attached cameras
  help              show this help
  quit              stop and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(Option<String>),
    Stop,
    Resolution(Resolution),
    Network(String),
    Export(Option<PathBuf>),
    Reset,
    Status,
    Cameras,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        match word.to_ascii_lowercase().as_str() {
            "start" => Ok(Command::Start(arg)),
            "stop" => Ok(Command::Stop),
            "res" | "resolution" => {
                let value = arg.ok_or_else(|| AppError::Command("usage: res WxH".to_string()))?;
                value
                    .parse()
                    .map(Command::Resolution)
                    .map_err(|e| AppError::Command(e.to_string()))
            }
            "net" | "network" => arg
                .map(Command::Network)
                .ok_or_else(|| AppError::Command("usage: net LABEL".to_string())),
            "export" => Ok(Command::Export(arg.map(PathBuf::from))),
            "reset" => Ok(Command::Reset),
            "status" => Ok(Command::Status),
            "cameras" => Ok(Command::Cameras),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(AppError::Command(format!("unknown command {:?}", other))),
        }
    }
}

/// Whether the console loop keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub async fn execute(
    controller: &mut SessionController,
    config: &AppConfig,
    command: Command,
) -> AppResult<Flow> {
    match command {
        Command::Start(session_id) => {
            let session_id = session_id.unwrap_or_else(|| controller.settings().session_id);
            let resolution = controller.settings().resolution;
            controller.start(session_id, resolution).await?;
        }
        Command::Stop => controller.stop().await,
        Command::Resolution(resolution) => controller.set_resolution(resolution),
        Command::Network(label) => controller.set_network_label(label),
        Command::Export(dir) => {
            let dir = dir.unwrap_or_else(|| config.output_dir.clone());
            if let Some(path) = controller.export(&dir)? {
                println!("exported {}", path.display());
            }
        }
        Command::Reset => {
            let dropped = controller.reset_export_log();
            println!("cleared {} records", dropped);
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&controller.status())?);
        }
        Command::Cameras => list_cameras(),
        Command::Help => println!("{}", HELP),
        Command::Quit => {
            controller.stop().await;
            return Ok(Flow::Quit);
        }
    }
    Ok(Flow::Continue)
}

#[cfg(feature = "webcam")]
fn list_cameras() {
    let cameras = crate::capture::webcam::get_cameras();
    if cameras.is_empty() {
        println!("no cameras found");
    }
    for camera in cameras {
        println!("{}  {}", camera.id, camera.name);
    }
}

#[cfg(not(feature = "webcam"))]
fn list_cameras() {
    println!("built without webcam support; only the synthetic source is available");
}

/// Read commands from stdin until `quit` or end of input
pub async fn run_console(controller: &mut SessionController, config: &AppConfig) -> AppResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let outcome = match line.parse::<Command>() {
            Ok(command) => execute(controller, config, command).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(Flow::Quit) => return Ok(()),
            Ok(Flow::Continue) => {}
            Err(e) => {
                let response = ErrorResponse::from(e);
                eprintln!("[{}] {}", response.code, response.message);
            }
        }
    }

    controller.stop().await;
    Ok(())
}
