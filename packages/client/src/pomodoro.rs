//! Client-side Pomodoro countdown.
//!
//! Every local transition returns the new state so the caller can emit
//! `sync-pomodoro`. Plain ticks are not synced.

use studyroom_shared::protocol::{
    DEFAULT_BREAK_SECONDS, DEFAULT_WORK_SECONDS, PomodoroMode, PomodoroState,
};

#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    state: PomodoroState,
    work_seconds: u32,
    break_seconds: u32,
}

impl PomodoroTimer {
    pub fn new(work_seconds: u32, break_seconds: u32) -> Self {
        Self {
            state: PomodoroState::initial(work_seconds),
            work_seconds,
            break_seconds,
        }
    }

    pub fn state(&self) -> PomodoroState {
        self.state
    }

    fn duration_of(&self, mode: PomodoroMode) -> u32 {
        match mode {
            PomodoroMode::Work => self.work_seconds,
            PomodoroMode::Break => self.break_seconds,
        }
    }

    /// Start or pause.
    pub fn toggle(&mut self) -> PomodoroState {
        self.state.is_running = !self.state.is_running;
        self.state
    }

    /// Flip work/break and reset the countdown to the new phase's length.
    pub fn switch_mode(&mut self, auto_start: bool) -> PomodoroState {
        let mode = self.state.mode.toggled();
        self.state = PomodoroState {
            mode,
            time_left: self.duration_of(mode),
            is_running: auto_start,
        };
        self.state
    }

    /// Advance one second. Returns the new state when the phase ended and
    /// the timer switched on its own.
    pub fn tick(&mut self) -> Option<PomodoroState> {
        if !self.state.is_running {
            return None;
        }
        if self.state.time_left <= 1 {
            return Some(self.switch_mode(true));
        }
        self.state.time_left -= 1;
        None
    }

    /// Snap to a state received from another member.
    pub fn apply_remote(&mut self, state: PomodoroState) {
        self.state = state;
    }

    /// Back to a stopped work session (joining a new room).
    pub fn reset(&mut self) {
        self.state = PomodoroState::initial(self.work_seconds);
    }
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_SECONDS, DEFAULT_BREAK_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_starts_and_pauses() {
        // テスト項目: toggle で開始と一時停止が切り替わる
        // given (前提条件):
        let mut timer = PomodoroTimer::default();

        // when (操作):
        let started = timer.toggle();
        let paused = timer.toggle();

        // then (期待する結果):
        assert!(started.is_running);
        assert!(!paused.is_running);
        assert_eq!(paused.time_left, 1500);
    }

    #[test]
    fn test_switch_mode_resets_time() {
        // テスト項目: モード切替で残り時間が新しいフェーズの長さに戻る
        // given (前提条件):
        let mut timer = PomodoroTimer::default();
        timer.toggle();
        timer.tick();

        // when (操作):
        let state = timer.switch_mode(false);

        // then (期待する結果):
        assert_eq!(
            state,
            PomodoroState {
                mode: PomodoroMode::Break,
                time_left: 300,
                is_running: false,
            }
        );
    }

    #[test]
    fn test_tick_counts_down_only_while_running() {
        // テスト項目: 停止中は tick しても残り時間が変わらず、動作中は 1 秒ずつ減る
        // given (前提条件):
        let mut timer = PomodoroTimer::default();

        // when (操作):
        let stopped = timer.tick();
        let before = timer.state().time_left;
        timer.toggle();
        let running = timer.tick();

        // then (期待する結果):
        assert_eq!(stopped, None);
        assert_eq!(before, 1500);
        assert_eq!(running, None);
        assert_eq!(timer.state().time_left, 1499);
    }

    #[test]
    fn test_phase_end_switches_and_auto_starts() {
        // テスト項目: 残り 1 秒で tick すると自動でモードが切り替わり、動作したままになる
        // given (前提条件):
        let mut timer = PomodoroTimer::new(2, 1);
        timer.toggle();

        // when (操作):
        let first = timer.tick();
        let second = timer.tick();

        // then (期待する結果):
        assert_eq!(first, None);
        assert_eq!(
            second,
            Some(PomodoroState {
                mode: PomodoroMode::Break,
                time_left: 1,
                is_running: true,
            })
        );
    }

    #[test]
    fn test_apply_remote_snaps() {
        // テスト項目: 受信した状態にそのまま置き換わる
        // given (前提条件):
        let mut timer = PomodoroTimer::default();
        let remote = PomodoroState {
            mode: PomodoroMode::Break,
            time_left: 42,
            is_running: true,
        };

        // when (操作):
        timer.apply_remote(remote);

        // then (期待する結果):
        assert_eq!(timer.state(), remote);
    }
}
