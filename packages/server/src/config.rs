//! Server configuration (command line with environment fallbacks).

use std::time::Duration;

use clap::Parser;

use crate::domain::PomodoroPolicy;

#[derive(Parser, Debug, Clone)]
#[command(name = "studyroom-server")]
#[command(about = "Study room signaling server (rooms, peer handshakes, chat, whiteboard, Pomodoro)", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Only browser origin allowed to open the signaling socket
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3000")]
    pub allowed_origin: String,

    /// Length of a Pomodoro work session, in minutes (at most a day)
    #[arg(long, default_value_t = 25, value_parser = clap::value_parser!(u32).range(1..=1440))]
    pub work_minutes: u32,

    /// Length of a Pomodoro break, in minutes (at most a day)
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=1440))]
    pub break_minutes: u32,

    /// Seconds between keep-alive pings; an unanswered ping closes the socket
    #[arg(long, default_value_t = 25, value_parser = clap::value_parser!(u64).range(1..))]
    pub heartbeat_interval_secs: u64,
}

impl ServerConfig {
    pub fn pomodoro_policy(&self) -> PomodoroPolicy {
        PomodoroPolicy::new(self.work_minutes * 60, self.break_minutes * 60)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
