#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(String),
    Poll(String),
    Pause,
    Capture,
    Analyze,
    Stop,
    Status,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "commands: open <camera url> | poll [snapshot url] | pause | capture | analyze | stop | status | help | quit";

/// The camera URL after `--probe`, if the flag is present.
pub fn probe_target(args: &[String]) -> anyhow::Result<Option<&str>> {
    let Some(pos) = args.iter().position(|arg| arg == "--probe") else {
        return Ok(None);
    };
    let camera_url = args
        .get(pos + 1)
        .map(|url| url.trim())
        .filter(|url| !url.is_empty() && !url.starts_with("--"))
        .ok_or_else(|| anyhow::anyhow!("usage: crowdcam-viewer --probe <camera url>"))?;
    Ok(Some(camera_url))
}

impl Command {
    /// Parses one input line. Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "open" => Self::Open(rest.to_owned()),
            "poll" => Self::Poll(rest.to_owned()),
            "pause" => Self::Pause,
            "capture" | "snap" => Self::Capture,
            "analyze" | "analyse" => Self::Analyze,
            "stop" | "close" => Self::Stop,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_owned()),
        };
        Some(command)
    }
}
