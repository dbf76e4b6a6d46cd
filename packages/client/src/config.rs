//! Client command-line configuration.

use std::time::Duration;

use clap::Parser;
use uuid::Uuid;

use crate::pomodoro::PomodoroTimer;

#[derive(Parser, Debug, Clone)]
#[command(name = "studyroom-client")]
#[command(about = "Join a study room from the terminal", long_about = None)]
pub struct ClientConfig {
    /// Display name shown to the other members
    #[arg(short = 'n', long)]
    pub name: String,

    /// Room to join; a new room id is generated when omitted
    #[arg(short = 'r', long)]
    pub room: Option<String>,

    /// Signaling server URL
    #[arg(short = 'u', long, env = "STUDYROOM_URL", default_value = "ws://127.0.0.1:3001/ws")]
    pub url: String,

    /// Seconds a pending peer handshake may take before the peer is dropped
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub handshake_timeout_secs: u64,

    /// Pomodoro work length in minutes; keep in step with the server
    #[arg(long, default_value_t = 25, value_parser = clap::value_parser!(u32).range(1..=1440))]
    pub work_minutes: u32,

    /// Pomodoro break length in minutes; keep in step with the server
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=1440))]
    pub break_minutes: u32,

    /// Refuse camera/microphone access (the client then exits without joining)
    #[arg(long)]
    pub deny_media: bool,
}

impl ClientConfig {
    /// The room to join, generating one the way "create room" does.
    pub fn room_id(&self) -> String {
        self.room
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn pomodoro_timer(&self) -> PomodoroTimer {
        PomodoroTimer::new(self.work_minutes * 60, self.break_minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_room() {
        // テスト項目: --room を指定した場合はその部屋に参加する
        // given (前提条件):
        let args = ["studyroom-client", "--name", "Alice", "--room", "abc"];

        // when (操作):
        let config = ClientConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(config.room_id(), "abc");
        assert_eq!(config.handshake_timeout(), Duration::from_secs(30));
        assert_eq!(config.pomodoro_timer().state().time_left, 1500);
        assert!(!config.deny_media);
    }

    #[test]
    fn test_generated_room() {
        // テスト項目: --room を省略した場合は UUID の部屋 ID が生成される
        // given (前提条件):
        let args = ["studyroom-client", "-n", "Alice"];

        // when (操作):
        let config = ClientConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        assert!(Uuid::parse_str(&config.room_id()).is_ok());
    }

    #[test]
    fn test_name_is_required() {
        // テスト項目: --name を省略するとエラーになる
        // given (前提条件):
        let args = ["studyroom-client"];

        // when (操作):
        let result = ClientConfig::try_parse_from(args);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_pomodoro_lengths() {
        // テスト項目: Pomodoro の長さを分単位で指定でき、切り替え後の残り時間に反映される
        // given (前提条件):
        let args = [
            "studyroom-client",
            "-n",
            "A",
            "--work-minutes",
            "50",
            "--break-minutes",
            "10",
        ];
        let config = ClientConfig::try_parse_from(args).unwrap();
        let mut timer = config.pomodoro_timer();

        // when (操作):
        let initial = timer.state();
        let on_break = timer.switch_mode(false);
        let back_to_work = timer.switch_mode(false);

        // then (期待する結果):
        assert_eq!(initial.time_left, 3000);
        assert_eq!(on_break.time_left, 600);
        assert_eq!(back_to_work.time_left, 3000);
    }

    #[test]
    fn test_out_of_range_minutes_rejected() {
        // テスト項目: 0 分や 1 日を超える Pomodoro の長さは受け付けない
        // given (前提条件):
        let args = ["studyroom-client", "-n", "A", "--break-minutes", "0"];

        // when (操作):
        let result = ClientConfig::try_parse_from(args);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_handshake_timeout_rejected() {
        // テスト項目: ハンドシェイクのタイムアウトに 0 は指定できない
        // given (前提条件):
        let args = ["studyroom-client", "-n", "A", "--handshake-timeout-secs", "0"];

        // when (操作):
        let result = ClientConfig::try_parse_from(args);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
